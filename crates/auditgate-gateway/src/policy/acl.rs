//! Per-consumer access control list.
//!
//! Each allowed method pattern is split on `/` into segments; a `*` segment
//! matches any single method segment at that position. Rules may be shorter
//! than the method they match (prefix match), never longer.

use std::collections::HashMap;

use auditgate_core::error::{AuditError, Result};

const WILDCARD: &str = "*";

/// Compiled method pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    segments: Vec<String>,
}

impl AccessRule {
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(AuditError::BadRequest("acl pattern must not be empty".into()));
        }
        Ok(Self {
            segments: pattern.split('/').map(str::to_string).collect(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True if every rule segment equals the method segment at the same
    /// position or is the wildcard.
    pub fn matches(&self, method: &[&str]) -> bool {
        if self.segments.len() > method.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(method)
            .all(|(rule, seg)| rule == WILDCARD || rule == seg)
    }
}

/// Consumer -> ordered rules. Construct once at startup, then share via Arc.
#[derive(Debug, Default)]
pub struct AccessPolicy {
    rules: HashMap<String, Vec<AccessRule>>,
}

impl AccessPolicy {
    /// Compile a consumer -> patterns table. Pattern order per consumer is
    /// preserved and decides which rule grants access first.
    pub fn from_table<I, P>(table: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, P)>,
        P: IntoIterator<Item = String>,
    {
        let mut rules = HashMap::new();
        for (consumer, patterns) in table {
            let compiled = patterns
                .into_iter()
                .map(|p| {
                    AccessRule::parse(&p).map_err(|e| {
                        AuditError::BadRequest(format!("acl for consumer {consumer:?}: {e}"))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            rules.insert(consumer, compiled);
        }
        Ok(Self { rules })
    }

    /// Parse a JSON document of the form `{"consumer": ["/svc/Method", ...]}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let table: HashMap<String, Vec<String>> = serde_json::from_str(raw)
            .map_err(|e| AuditError::BadRequest(format!("invalid acl json: {e}")))?;
        Self::from_table(table)
    }

    pub fn consumers(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn rules_for(&self, consumer: &str) -> Option<&[AccessRule]> {
        self.rules.get(consumer).map(Vec::as_slice)
    }

    pub fn is_allowed(&self, consumer: &str, method: &str) -> bool {
        let Some(rules) = self.rules.get(consumer) else {
            return false;
        };
        let segments: Vec<&str> = method.split('/').collect();
        rules.iter().any(|r| r.matches(&segments))
    }
}
