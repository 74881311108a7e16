//! Observation streams (`Logging`, `Statistics`).
//!
//! Both reporters are bus subscribers bound to one remote caller through a
//! [`StreamSink`]. They end when the sink fails, when the caller goes away
//! (`cancelled` resolves), or when the bus closes their queue, and they always
//! release their subscription before returning.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use auditgate_core::error::{AuditError, Result};
use auditgate_core::{Event, StatSnapshot};

use crate::bus::EventBus;
use crate::stats::StatsAggregator;

/// Outbound half of a streaming call.
#[async_trait]
pub trait StreamSink<T: Send + 'static>: Send {
    async fn send(&mut self, item: T) -> Result<()>;
}

#[async_trait]
impl<T: Send + 'static> StreamSink<T> for mpsc::Sender<T> {
    async fn send(&mut self, item: T) -> Result<()> {
        mpsc::Sender::send(self, item)
            .await
            .map_err(|_| AuditError::Transport("stream receiver dropped".into()))
    }
}

/// How a reporter stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Queue closed by the bus (shutdown).
    BusClosed,
    /// Sending to the caller failed.
    SinkFailed,
    /// Caller disconnected or the call was cancelled.
    Cancelled,
}

/// Forward every bus event verbatim to `sink`.
pub async fn run_logging<S, C>(bus: &EventBus, sink: &mut S, cancelled: C) -> Result<StreamEnd>
where
    S: StreamSink<Event> + ?Sized,
    C: Future<Output = ()>,
{
    let mut sub = bus.subscribe().await?;
    let id = sub.id();
    tokio::pin!(cancelled);

    let end = loop {
        tokio::select! {
            maybe_ev = sub.recv() => {
                let Some(ev) = maybe_ev else { break StreamEnd::BusClosed; };
                if let Err(e) = sink.send(ev).await {
                    tracing::debug!(id, "logging stream send failed: {e}");
                    break StreamEnd::SinkFailed;
                }
            }
            _ = &mut cancelled => break StreamEnd::Cancelled,
        }
    };

    bus.release(sub).await;
    tracing::info!(id, ?end, "logging stream ended");
    Ok(end)
}

/// Run a private aggregator over `interval_secs` windows and forward each
/// snapshot to `sink`.
pub async fn run_statistics<S, C>(
    bus: Arc<EventBus>,
    interval_secs: u64,
    sink: &mut S,
    cancelled: C,
) -> Result<StreamEnd>
where
    S: StreamSink<StatSnapshot> + ?Sized,
    C: Future<Output = ()>,
{
    let aggregator = StatsAggregator::new(bus, interval_secs).await?;
    let id = aggregator.subscription_id();
    let (snap_tx, mut snap_rx) = mpsc::channel(1);
    let worker = tokio::spawn(aggregator.run(snap_tx));
    tokio::pin!(cancelled);

    let end = loop {
        tokio::select! {
            maybe_snap = snap_rx.recv() => {
                let Some(snap) = maybe_snap else { break StreamEnd::BusClosed; };
                if let Err(e) = sink.send(snap).await {
                    tracing::debug!(id, "statistics stream send failed: {e}");
                    break StreamEnd::SinkFailed;
                }
            }
            _ = &mut cancelled => break StreamEnd::Cancelled,
        }
    };

    // Closing the snapshot channel stops the aggregator, which unsubscribes.
    drop(snap_rx);
    if let Err(e) = worker.await {
        tracing::warn!(id, "statistics aggregator task failed: {e}");
    }
    tracing::info!(id, interval_secs, ?end, "statistics stream ended");
    Ok(end)
}
