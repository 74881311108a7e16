//! Call interception: audit first, then authorize.
//!
//! Every call, unary or streaming, passes through [`Interceptor::intercept`].
//! The audit event is published before the ACL is consulted, so denied
//! attempts still reach every observer.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use auditgate_core::error::{AuditError, Result};
use auditgate_core::Event;

use crate::bus::EventBus;
use crate::obs::metrics::GatewayMetrics;
use crate::policy::AccessPolicy;

/// Transport-independent view of one inbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallMeta {
    pub method: String,
    pub consumer: String,
    pub host: String,
}

impl CallMeta {
    pub fn new(method: impl Into<String>, consumer: Option<&str>, peer: Option<SocketAddr>) -> Self {
        Self {
            method: method.into(),
            consumer: consumer.unwrap_or_default().to_string(),
            host: peer.map(|p| p.to_string()).unwrap_or_default(),
        }
    }

    fn to_event(&self) -> Event {
        Event::now(&self.method, &self.consumer, &self.host)
    }
}

pub struct Interceptor {
    bus: Arc<EventBus>,
    policy: Arc<AccessPolicy>,
    metrics: Arc<GatewayMetrics>,
}

impl Interceptor {
    pub fn new(bus: Arc<EventBus>, policy: Arc<AccessPolicy>, metrics: Arc<GatewayMetrics>) -> Self {
        Self { bus, policy, metrics }
    }

    /// Publish the audit event, then check the ACL.
    pub async fn admit(&self, call: &CallMeta) -> Result<()> {
        let started = Instant::now();
        let published = self.bus.publish(call.to_event()).await;
        self.metrics
            .publish_duration
            .observe(&[("method", call.method.as_str())], started.elapsed());

        if let Err(e) = published {
            tracing::warn!(method = %call.method, consumer = %call.consumer, "audit publish failed: {e}");
            self.metrics.record_call(&call.method, "unavailable");
            return Err(e);
        }

        if !self.policy.is_allowed(&call.consumer, &call.method) {
            tracing::info!(method = %call.method, consumer = %call.consumer, host = %call.host, "access denied");
            self.metrics.record_call(&call.method, "denied");
            return Err(AuditError::AccessDenied {
                consumer: call.consumer.clone(),
                method: call.method.clone(),
            });
        }

        self.metrics.record_call(&call.method, "allowed");
        Ok(())
    }

    /// Run `handler` only if the call is admitted; its result passes through
    /// unchanged.
    pub async fn intercept<F, Fut, T>(&self, call: &CallMeta, handler: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.admit(call).await?;
        handler().await
    }
}
