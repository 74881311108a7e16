use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use auditgate_core::error::{AuditError, Result};
use auditgate_core::event::unix_now;
use auditgate_core::StatSnapshot;

use crate::bus::{EventBus, Subscription};

/// Why the aggregation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The bus closed our queue (unsubscribe or shutdown).
    BusClosed,
    /// Nobody is reading snapshots any more.
    SinkClosed,
}

/// Counts events per method and per consumer, emitting one snapshot per
/// window and resetting afterwards.
pub struct StatsAggregator {
    sub: Subscription,
    window: Duration,
    guard: ReleaseOnDrop,
}

impl StatsAggregator {
    /// Subscribe to `bus`. `interval_secs` must be positive.
    pub async fn new(bus: Arc<EventBus>, interval_secs: u64) -> Result<Self> {
        if interval_secs == 0 {
            return Err(AuditError::BadRequest(
                "statistics interval must be a positive number of seconds".into(),
            ));
        }
        let sub = bus.subscribe().await?;
        let guard = ReleaseOnDrop {
            id: sub.id(),
            bus,
            armed: true,
        };
        Ok(Self {
            sub,
            window: Duration::from_secs(interval_secs),
            guard,
        })
    }

    pub fn subscription_id(&self) -> u64 {
        self.sub.id()
    }

    /// Run until the bus closes our queue or `sink` is dropped. The
    /// subscription is released on every exit path, including the future
    /// being dropped mid-await (e.g. an aborted task) or never polled.
    pub async fn run(self, sink: mpsc::Sender<StatSnapshot>) -> StopReason {
        let Self { mut sub, window, mut guard } = self;
        let id = sub.id();
        let bus = Arc::clone(&guard.bus);

        let mut tick = interval_at(Instant::now() + window, window);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut acc = StatSnapshot::default();

        let reason = loop {
            tokio::select! {
                // Queued events belong to the window that is closing.
                biased;

                maybe_ev = sub.recv() => {
                    match maybe_ev {
                        Some(ev) => acc.record(&ev),
                        None => break StopReason::BusClosed,
                    }
                }

                _ = tick.tick() => {
                    let mut snap = std::mem::take(&mut acc);
                    snap.timestamp = unix_now();
                    if sink.send(snap).await.is_err() {
                        break StopReason::SinkClosed;
                    }
                }

                _ = sink.closed() => break StopReason::SinkClosed,
            }
        };

        drop(tick);
        bus.release(sub).await;
        guard.armed = false;
        tracing::debug!(id, ?reason, "statistics aggregator stopped");
        reason
    }
}

/// Unsubscribes from a spawned task when the aggregator is dropped before
/// `run` reaches its own teardown. `Drop` cannot await the bus lock.
struct ReleaseOnDrop {
    bus: Arc<EventBus>,
    id: u64,
    armed: bool,
}

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(rt) = tokio::runtime::Handle::try_current() else {
            // No runtime left; the next publish prunes the entry.
            return;
        };
        let bus = Arc::clone(&self.bus);
        let id = self.id;
        rt.spawn(async move {
            if bus.unsubscribe(id).await {
                tracing::debug!(id, "statistics aggregator released after drop");
            }
        });
    }
}
