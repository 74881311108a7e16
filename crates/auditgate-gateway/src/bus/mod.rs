//! In-process event bus.
//!
//! A single `tokio::sync::Mutex` guards an id-ordered subscriber map. Publish
//! holds the lock for the whole fan-out and awaits each subscriber's bounded
//! queue in turn, so a subscriber that stops draining stalls publishers
//! (backpressure) instead of losing events. Events are never dropped for a
//! live subscriber.
//!
//! A subscriber whose receiving half was dropped is pruned at the next
//! publish. Shutdown wakes publishers stalled mid fan-out; any publish or
//! subscribe afterwards fails with `AuditError::BusClosed`.

use std::collections::BTreeMap;

use tokio::sync::{mpsc, watch, Mutex};

use auditgate_core::error::{AuditError, Result};
use auditgate_core::Event;

/// Receiving side of one registration.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<Event>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next event, or `None` once the bus closed this queue and every
    /// buffered event has been read.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: BTreeMap<u64, mpsc::Sender<Event>>,
    closed: bool,
}

pub struct EventBus {
    registry: Mutex<Registry>,
    queue_capacity: usize,
    shutdown: watch::Sender<bool>,
}

impl EventBus {
    /// `queue_capacity` is the per-subscriber buffer; 1 is the closest a
    /// tokio channel gets to a rendezvous handoff.
    pub fn new(queue_capacity: usize) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            registry: Mutex::new(Registry {
                next_id: 1,
                ..Registry::default()
            }),
            queue_capacity: queue_capacity.max(1),
            shutdown,
        }
    }

    pub async fn subscribe(&self) -> Result<Subscription> {
        let mut reg = self.registry.lock().await;
        if reg.closed {
            return Err(AuditError::BusClosed);
        }
        let id = reg.next_id;
        reg.next_id += 1;

        let (tx, rx) = mpsc::channel(self.queue_capacity);
        reg.subscribers.insert(id, tx);
        tracing::debug!(id, subscribers = reg.subscribers.len(), "subscribed");
        Ok(Subscription { id, rx })
    }

    /// Remove a registration and close its queue. Unknown or already removed
    /// ids are a no-op; returns whether an entry was removed.
    pub async fn unsubscribe(&self, id: u64) -> bool {
        let mut reg = self.registry.lock().await;
        let removed = reg.subscribers.remove(&id).is_some();
        if removed {
            tracing::debug!(id, subscribers = reg.subscribers.len(), "unsubscribed");
        }
        removed
    }

    /// Drop the receiving half first, then unsubscribe. A publisher blocked on
    /// this subscriber's full queue is woken before we wait for the lock.
    pub async fn release(&self, sub: Subscription) -> bool {
        let id = sub.id;
        drop(sub);
        self.unsubscribe(id).await
    }

    /// Close every queue and refuse further publish/subscribe.
    pub async fn shutdown_all(&self) {
        self.shutdown.send_replace(true);
        let mut reg = self.registry.lock().await;
        reg.closed = true;
        let n = reg.subscribers.len();
        reg.subscribers.clear();
        tracing::info!(released = n, "event bus shut down");
    }

    pub fn is_closed(&self) -> bool {
        *self.shutdown.borrow()
    }

    pub async fn subscriber_count(&self) -> usize {
        self.registry.lock().await.subscribers.len()
    }

    /// Deliver `event` to every subscriber in ascending id order, waiting on
    /// each queue in turn.
    pub async fn publish(&self, event: Event) -> Result<()> {
        let mut shutdown = self.shutdown.subscribe();
        let mut reg = self.registry.lock().await;
        if reg.closed || *shutdown.borrow() {
            return Err(AuditError::BusClosed);
        }

        let mut gone = Vec::new();
        for (&id, tx) in reg.subscribers.iter() {
            tokio::select! {
                biased;
                _ = shutdown.changed() => return Err(AuditError::BusClosed),
                sent = tx.send(event.clone()) => {
                    if sent.is_err() {
                        gone.push(id);
                    }
                }
            }
        }

        for id in gone {
            reg.subscribers.remove(&id);
            tracing::debug!(id, "pruned subscriber with dropped receiver");
        }
        Ok(())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1)
    }
}
