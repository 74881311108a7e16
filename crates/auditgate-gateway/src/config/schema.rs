use std::collections::HashMap;

use serde::Deserialize;
use auditgate_core::error::{AuditError, Result};

use crate::policy::AccessPolicy;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub bus: BusSection,

    /// consumer -> allowed method patterns.
    #[serde(default)]
    pub acl: Option<HashMap<String, Vec<String>>>,

    /// Same table as `acl`, given as a JSON document.
    #[serde(default)]
    pub acl_json: Option<String>,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(AuditError::UnsupportedVersion);
        }
        self.gateway.validate()?;
        self.bus.validate()?;
        self.compile_acl()?;
        Ok(())
    }

    /// Compile whichever ACL form is configured. Exactly one is required.
    pub fn compile_acl(&self) -> Result<AccessPolicy> {
        match (&self.acl, &self.acl_json) {
            (Some(table), None) => AccessPolicy::from_table(table.clone()),
            (None, Some(raw)) => AccessPolicy::from_json(raw),
            (Some(_), Some(_)) => Err(AuditError::BadRequest(
                "acl and acl_json are mutually exclusive".into(),
            )),
            (None, None) => Err(AuditError::BadRequest("acl must be configured".into())),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.trim().is_empty() {
            return Err(AuditError::BadRequest("gateway.listen must not be empty".into()));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "127.0.0.1:8082".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusSection {
    /// Per-subscriber queue length. Publishers block once it is full.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for BusSection {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl BusSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=65536).contains(&self.queue_capacity) {
            return Err(AuditError::BadRequest(
                "bus.queue_capacity must be between 1 and 65536".into(),
            ));
        }
        Ok(())
    }
}

fn default_queue_capacity() -> usize {
    1
}
