use async_trait::async_trait;
use serde_json::{json, Value};

use auditgate_core::error::{AuditError, Result};

use crate::dispatch::UnaryService;
use crate::intercept::CallMeta;

/// `main.Biz`: placeholder business methods. Every call returns an empty
/// message; the interesting part is the audit and ACL in front of it.
#[derive(Default)]
pub struct BizService;

impl BizService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UnaryService for BizService {
    fn service(&self) -> &'static str {
        "main.Biz"
    }

    fn methods(&self) -> &'static [&'static str] {
        &["Check", "Add", "Test"]
    }

    async fn call(&self, _call: &CallMeta, method: &str, _body: Value) -> Result<Value> {
        match method {
            "Check" | "Add" | "Test" => Ok(json!({})),
            other => Err(AuditError::NotFound(format!("main.Biz/{other}"))),
        }
    }
}
