use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use auditgate_core::error::{AuditError, Result};

use crate::intercept::CallMeta;

/// Business service answering unary calls for one RPC service name.
#[async_trait]
pub trait UnaryService: Send + Sync {
    /// Service part of the method path, e.g. `main.Biz`.
    fn service(&self) -> &'static str;
    fn methods(&self) -> &'static [&'static str];
    async fn call(&self, call: &CallMeta, method: &str, body: Value) -> Result<Value>;
}

/// Registry of unary services keyed by fully-qualified method.
#[derive(Default)]
pub struct Dispatcher {
    unary: DashMap<String, Arc<dyn UnaryService>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            unary: DashMap::new(),
        }
    }

    pub fn register(&self, svc: Arc<dyn UnaryService>) {
        for m in svc.methods() {
            self.unary
                .insert(format!("/{}/{}", svc.service(), m), Arc::clone(&svc));
        }
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.unary.contains_key(method)
    }

    pub fn registered_methods(&self) -> Vec<String> {
        self.unary.iter().map(|e| e.key().clone()).collect()
    }

    pub async fn dispatch(&self, call: &CallMeta, body: Value) -> Result<Value> {
        let handler = self
            .unary
            .get(&call.method)
            .ok_or_else(|| AuditError::NotFound(call.method.clone()))?
            .value()
            .clone();
        let method = call.method.rsplit('/').next().unwrap_or_default();
        handler.call(call, method, body).await
    }
}
