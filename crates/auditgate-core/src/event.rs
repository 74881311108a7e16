//! Audit records and statistics snapshots.
//!
//! Both types are plain data: they carry no channel or runtime handles and are
//! serialized as-is onto the observation streams.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Current wall-clock time in seconds since the unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// One call attempt, recorded before authorization runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Fully-qualified method, e.g. `/main.Biz/Check`.
    pub method: String,
    /// Caller identity from call metadata; empty if absent.
    pub consumer: String,
    /// Caller network address; empty if unavailable.
    pub host: String,
    pub timestamp: u64,
}

impl Event {
    /// Build an event stamped with the current time.
    pub fn now(
        method: impl Into<String>,
        consumer: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            consumer: consumer.into(),
            host: host.into(),
            timestamp: unix_now(),
        }
    }
}

/// Counts accumulated over one aggregation window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSnapshot {
    pub by_method: HashMap<String, u64>,
    pub by_consumer: HashMap<String, u64>,
    /// Window end, unix seconds.
    pub timestamp: u64,
}

impl StatSnapshot {
    /// Count one event into this window.
    pub fn record(&mut self, event: &Event) {
        *self.by_method.entry(event.method.clone()).or_insert(0) += 1;
        *self.by_consumer.entry(event.consumer.clone()).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.by_method.is_empty() && self.by_consumer.is_empty()
    }
}
