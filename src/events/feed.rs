//! Broadcast change feed for orders and the refresh binding consuming it.
//!
//! One subscription per mounted view, torn down deterministically and
//! exactly once. Subscribers get change notifications only; the payload
//! never carries row data, so every notification triggers a full re-fetch
//! of whatever query the view currently holds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A change notification for one order row.
#[derive(Clone, Copy, Debug)]
pub struct OrderChange {
    pub order_id: Uuid,
    pub kind: ChangeKind,
}

/// Fan-out point for order changes.
#[derive(Clone, Debug)]
pub struct OrderFeed {
    tx: broadcast::Sender<OrderChange>,
}

impl OrderFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a change. A feed with no live subscribers drops the
    /// notification, which is fine: a view that mounts later starts with a
    /// fresh fetch anyway.
    pub fn publish(&self, change: OrderChange) {
        let _ = self.tx.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderChange> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for OrderFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Ties one feed subscription to a re-fetch callback.
///
/// The binding holds the only handle to its subscription task; `detach`
/// (called at most once, also from Drop) aborts the task and with it the
/// broadcast receiver. A lagged receiver still forces a re-fetch; missed
/// notifications must never leave the view stale.
#[derive(Debug)]
pub struct RefreshBinding {
    handle: JoinHandle<()>,
    detached: Arc<AtomicBool>,
}

impl RefreshBinding {
    pub fn bind<F, Fut>(feed: &OrderFeed, mut refetch: F) -> Self
    where
        F: FnMut(OrderChange) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send,
    {
        let mut rx = feed.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) => refetch(change).await,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        debug!(missed, "feed lagged; forcing refetch");
                        refetch(OrderChange {
                            order_id: Uuid::nil(),
                            kind: ChangeKind::Updated,
                        })
                        .await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self {
            handle,
            detached: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Tear the subscription down. Idempotent: the second and later calls
    /// are no-ops, so Drop after an explicit detach never double-frees the
    /// subscription.
    pub fn detach(&self) {
        if !self.detached.swap(true, Ordering::SeqCst) {
            self.handle.abort();
        }
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

impl Drop for RefreshBinding {
    fn drop(&mut self) {
        self.detach();
    }
}
