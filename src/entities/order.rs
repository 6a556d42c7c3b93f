use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::fulfillment::{FulfillmentKind, OrderStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 50))]
    pub order_number: String,

    pub status: String,
    pub fulfillment_kind: String,

    pub customer_id: Option<Uuid>,
    /// Set for point-of-sale orders rung up by a staff member.
    pub cashier_id: Option<Uuid>,
    pub pickup_location_id: Option<Uuid>,
    pub delivery_address: Option<String>,

    pub total_amount: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn status(&self) -> Result<OrderStatus, ServiceError> {
        self.status
            .parse()
            .map_err(|_| ServiceError::InvalidStatus(format!("Unknown order status: {}", self.status)))
    }

    pub fn fulfillment_kind(&self) -> Result<FulfillmentKind, ServiceError> {
        self.fulfillment_kind.parse().map_err(|_| {
            ServiceError::InvalidStatus(format!(
                "Unknown fulfillment kind: {}",
                self.fulfillment_kind
            ))
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::PickupLocationId",
        to = "super::location::Column::Id"
    )]
    PickupLocation,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PickupLocation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
