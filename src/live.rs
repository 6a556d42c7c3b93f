//! Live order board: the auto-refreshing view state consumed by dashboard
//! tooling.
//!
//! One feed subscription per mounted board; every change notification
//! triggers a full re-fetch of the board's scoped query. Status transitions
//! apply optimistically to the local copy and roll back to the pre-write
//! snapshot when the backend rejects the write. A board that has been
//! unmounted never writes to its state again (the mounted-flag guard),
//! even if a re-fetch was already in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::auth::capabilities::Capabilities;
use crate::entities::order;
use crate::errors::ServiceError;
use crate::events::feed::{OrderFeed, RefreshBinding};
use crate::fulfillment;
use crate::optimistic;
use crate::services::orders::OrderService;

const BOARD_PAGE_SIZE: u64 = 100;

pub struct OrderBoard {
    orders: Arc<RwLock<Vec<order::Model>>>,
    service: Arc<OrderService>,
    caps: Capabilities,
    binding: RefreshBinding,
    mounted: Arc<AtomicBool>,
}

impl OrderBoard {
    /// Fetches the initial scoped order list and binds the refresh
    /// subscription.
    pub async fn mount(
        service: Arc<OrderService>,
        feed: &OrderFeed,
        caps: Capabilities,
    ) -> Result<Self, ServiceError> {
        let initial = service.list_orders(&caps, 1, BOARD_PAGE_SIZE).await?.orders;
        let orders = Arc::new(RwLock::new(initial));
        let mounted = Arc::new(AtomicBool::new(true));

        let binding = {
            let orders = orders.clone();
            let mounted = mounted.clone();
            let service = service.clone();
            let caps = caps.clone();
            RefreshBinding::bind(feed, move |_change| {
                let orders = orders.clone();
                let mounted = mounted.clone();
                let service = service.clone();
                let caps = caps.clone();
                async move {
                    if !mounted.load(Ordering::SeqCst) {
                        return;
                    }
                    match service.list_orders(&caps, 1, BOARD_PAGE_SIZE).await {
                        Ok(page) => {
                            // Re-check after the await: the board may have
                            // unmounted while the fetch was in flight.
                            if mounted.load(Ordering::SeqCst) {
                                *orders.write().await = page.orders;
                            }
                        }
                        Err(e) => warn!(error = %e, "order board refresh failed"),
                    }
                }
            })
        };

        Ok(Self {
            orders,
            service,
            caps,
            binding,
            mounted,
        })
    }

    pub async fn snapshot(&self) -> Vec<order::Model> {
        self.orders.read().await.clone()
    }

    /// Applies the order's single available action: the local copy flips
    /// optimistically, the backend write follows, and a rejection restores
    /// the pre-write snapshot and surfaces the error.
    pub async fn transition(&self, order_id: Uuid) -> Result<order::Model, ServiceError> {
        let mut guard = self.orders.write().await;

        let expected = guard.iter().find(|o| o.id == order_id).and_then(|o| {
            let status = o.status().ok()?;
            let kind = o.fulfillment_kind().ok()?;
            fulfillment::next_transition(status, kind)
        });

        optimistic::write(
            &mut *guard,
            |orders| {
                if let Some(transition) = expected {
                    if let Some(order) = orders.iter_mut().find(|o| o.id == order_id) {
                        order.status = transition.to.as_str().to_string();
                    }
                }
            },
            self.service.transition(order_id, &self.caps),
        )
        .await
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Tears the board down: no further refreshes, subscription detached
    /// exactly once. Safe to call more than once.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        self.binding.detach();
    }
}

impl Drop for OrderBoard {
    fn drop(&mut self) {
        self.unmount();
    }
}
