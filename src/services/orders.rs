use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::auth::capabilities::Capabilities;
use crate::entities::{order, order_item};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::fulfillment::{self, FulfillmentKind};
use crate::scope::{self, Visibility};

/// Service for creating, listing, and advancing orders.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

#[derive(Clone, Debug)]
pub struct CreateOrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub size_name: Option<String>,
    pub unit_price: Decimal,
}

#[derive(Clone, Debug)]
pub struct CreateOrderInput {
    pub fulfillment_kind: FulfillmentKind,
    pub customer_id: Option<Uuid>,
    pub cashier_id: Option<Uuid>,
    pub pickup_location_id: Option<Uuid>,
    pub delivery_address: Option<String>,
    pub items: Vec<CreateOrderItemInput>,
}

/// One page of scoped orders plus the total row count for that scope.
#[derive(Debug)]
pub struct OrderPage {
    pub orders: Vec<order::Model>,
    pub total: u64,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Creates an order with its items. Point-of-sale orders are created
    /// already complete; everything else starts at `paid`.
    #[instrument(skip(self, input), fields(kind = %input.fulfillment_kind))]
    pub async fn create_order(&self, input: CreateOrderInput) -> Result<order::Model, ServiceError> {
        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "An order needs at least one item".into(),
            ));
        }
        if input.items.iter().any(|item| item.quantity < 1) {
            return Err(ServiceError::ValidationError(
                "Item quantities must be at least 1".into(),
            ));
        }
        match input.fulfillment_kind {
            FulfillmentKind::Courier => {
                if input.delivery_address.as_deref().map_or(true, str::is_empty) {
                    return Err(ServiceError::ValidationError(
                        "Courier orders need a delivery address".into(),
                    ));
                }
            }
            FulfillmentKind::Pickup | FulfillmentKind::WarehousePickup => {
                if input.pickup_location_id.is_none() {
                    return Err(ServiceError::ValidationError(
                        "Pickup orders need a pickup location".into(),
                    ));
                }
            }
            FulfillmentKind::Pos => {
                if input.cashier_id.is_none() {
                    return Err(ServiceError::ValidationError(
                        "POS sales need the cashier recorded".into(),
                    ));
                }
            }
        }

        let total_amount: Decimal = input
            .items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum();

        let order_id = Uuid::new_v4();
        let now = Utc::now();
        let status = input.fulfillment_kind.initial_status();

        let txn = self.db.begin().await?;

        let order = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(generate_order_number(&order_id)),
            status: Set(status.as_str().to_string()),
            fulfillment_kind: Set(input.fulfillment_kind.as_str().to_string()),
            customer_id: Set(input.customer_id),
            cashier_id: Set(input.cashier_id),
            pickup_location_id: Set(input.pickup_location_id),
            delivery_address: Set(input.delivery_address),
            total_amount: Set(total_amount),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await?;

        for item in &input.items {
            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                size_name: Set(item.size_name.clone()),
                unit_price: Set(item.unit_price),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!(%order_id, order_number = %order.order_number, "order created");
        self.event_sender
            .send(Event::OrderCreated(order_id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(order)
    }

    /// Lists orders through the session's visibility scope, newest first.
    #[instrument(skip(self, caps))]
    pub async fn list_orders(
        &self,
        caps: &Capabilities,
        page: u64,
        limit: u64,
    ) -> Result<OrderPage, ServiceError> {
        let vis = Visibility::for_orders(caps);
        let select = scope::orders(vis).order_by_desc(order::Column::CreatedAt);

        let paginator = select.paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(OrderPage { orders, total })
    }

    /// Fetches one order, hidden entirely when outside the session's scope.
    pub async fn get_order(&self, id: Uuid, caps: &Capabilities) -> Result<order::Model, ServiceError> {
        let order = order::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {id} not found")))?;

        let visible = match Visibility::for_orders(caps) {
            Visibility::Global => true,
            Visibility::Location(location_id) => order.pickup_location_id == Some(location_id),
            Visibility::DriverTasks => {
                fulfillment::is_driver_task(order.status()?, order.fulfillment_kind()?)
            }
            Visibility::Nothing => false,
        };

        if !visible {
            return Err(ServiceError::NotFound(format!("Order {id} not found")));
        }
        Ok(order)
    }

    pub async fn order_items(&self, order_id: Uuid) -> Result<Vec<order_item::Model>, ServiceError> {
        Ok(order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?)
    }

    /// Applies the single legal next transition for the order's composite
    /// (status, fulfillment kind) state. Rejected outright when the table
    /// has no row for the pair or when the session cannot act as the
    /// transition's owner; no write happens on rejection.
    #[instrument(skip(self, caps), fields(order_id = %order_id))]
    pub async fn transition(
        &self,
        order_id: Uuid,
        caps: &Capabilities,
    ) -> Result<order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let order = order::Entity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let status = order.status()?;
        let kind = order.fulfillment_kind()?;

        let transition = fulfillment::next_transition(status, kind).ok_or_else(|| {
            error!(%order_id, status = %status, kind = %kind, "no legal transition");
            ServiceError::InvalidTransition(format!(
                "Order in status '{status}' with fulfillment '{kind}' accepts no further transition"
            ))
        })?;

        if !caps.acts_as(transition.actor) {
            return Err(ServiceError::Forbidden(format!(
                "Action '{}' is not available to the '{}' role",
                transition.action, caps.role
            )));
        }

        let old_status = status;
        let mut active: order::ActiveModel = order.into();
        active.status = Set(transition.to.as_str().to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            %order_id,
            from = %old_status,
            to = %transition.to,
            action = transition.action,
            "order status advanced"
        );

        self.event_sender
            .send(Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status: transition.to,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// The driver work list: a derived view over the fulfillment machine,
    /// re-queried on every call rather than cached.
    #[instrument(skip(self, caps))]
    pub async fn driver_tasks(&self, caps: &Capabilities) -> Result<Vec<order::Model>, ServiceError> {
        if !caps.is_driver {
            return Err(ServiceError::AccessDenied(
                "The driver task list is only available to drivers".into(),
            ));
        }

        Ok(scope::orders(Visibility::DriverTasks)
            .order_by_asc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }
}

fn generate_order_number(order_id: &Uuid) -> String {
    let short = order_id.simple().to_string();
    format!("SO-{}", short[..8].to_uppercase())
}
