//! Shared application state for the auditgate gateway.
//!
//! Startup errors are explicit (Result instead of panic): a policy that does
//! not compile means the gateway never starts serving.

use std::sync::Arc;

use auditgate_core::error::Result;

use crate::bus::EventBus;
use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::intercept::Interceptor;
use crate::obs::metrics::GatewayMetrics;
use crate::policy::AccessPolicy;
use crate::services::BizService;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    bus: Arc<EventBus>,
    interceptor: Arc<Interceptor>,
    dispatcher: Arc<Dispatcher>,
    metrics: Arc<GatewayMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        // 1) Compile ACL (fatal on error)
        let policy = Arc::new(cfg.compile_acl()?);

        // 2) Core components
        let bus = Arc::new(EventBus::new(cfg.bus.queue_capacity));
        let metrics = Arc::new(GatewayMetrics::default());
        let interceptor = Arc::new(Interceptor::new(
            Arc::clone(&bus),
            Arc::clone(&policy),
            Arc::clone(&metrics),
        ));

        // 3) Business services
        let dispatcher = Dispatcher::new();
        dispatcher.register(Arc::new(BizService::new()));

        // ACL <-> dispatcher sanity check (warn only; patterns may target
        // observation streams or services registered later).
        let known = dispatcher.registered_methods();
        for consumer in policy.consumers() {
            for rule in policy.rules_for(consumer).unwrap_or_default() {
                let pattern = rule.segments().join("/");
                let is_admin = pattern.starts_with(crate::transport::ADMIN_PREFIX);
                let wildcard = rule.segments().iter().any(|s| s == "*");
                if !is_admin && !wildcard && !known.contains(&pattern) {
                    tracing::warn!(%consumer, %pattern, "acl refers to unknown method");
                }
            }
        }

        tracing::info!(
            consumers = policy.consumers().count(),
            queue_capacity = cfg.bus.queue_capacity,
            "gateway state ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, policy }),
            bus,
            interceptor,
            dispatcher: Arc::new(dispatcher),
            metrics,
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn policy(&self) -> Arc<AccessPolicy> {
        Arc::clone(&self.inner.policy)
    }

    pub fn bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.bus)
    }

    pub fn interceptor(&self) -> Arc<Interceptor> {
        Arc::clone(&self.interceptor)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }
}
