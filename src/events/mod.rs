//! Domain events.
//!
//! Services emit events onto an mpsc channel; the [`process_events`] loop
//! logs them and republishes order changes onto the broadcast
//! [`feed::OrderFeed`] that live views subscribe to.

pub mod feed;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::fulfillment::OrderStatus;
use feed::{ChangeKind, OrderChange, OrderFeed};

/// The events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Order events
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },

    // Inventory events
    StockChanged {
        product_id: Uuid,
        location_id: Uuid,
        quantity: i32,
    },
    ProductArchived {
        product_id: Uuid,
        archived: bool,
    },

    // Admin events
    LocationDeleted(Uuid),
    StaffProvisioned(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }
}

/// Event processing loop. Runs until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, feed: OrderFeed) {
    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderCreated(order_id) => {
                info!(%order_id, "order created");
                feed.publish(OrderChange {
                    order_id: *order_id,
                    kind: ChangeKind::Created,
                });
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(%order_id, %old_status, %new_status, "order status changed");
                feed.publish(OrderChange {
                    order_id: *order_id,
                    kind: ChangeKind::Updated,
                });
            }
            Event::StockChanged {
                product_id,
                location_id,
                quantity,
            } => {
                info!(%product_id, %location_id, quantity, "stock changed");
            }
            Event::ProductArchived {
                product_id,
                archived,
            } => {
                info!(%product_id, archived, "product archive flag changed");
            }
            Event::LocationDeleted(location_id) => {
                info!(%location_id, "location deleted");
            }
            Event::StaffProvisioned(profile_id) => {
                info!(%profile_id, "staff profile provisioned");
            }
        }
    }
    warn!("event channel closed; processor stopping");
}
