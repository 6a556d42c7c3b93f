use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One named size of a product with its sparse measurement set.
///
/// Only the fields relevant to the product's detected category are expected
/// to be populated; that expectation is a data-entry convention, not a
/// stored constraint, and values outside the current category are preserved
/// across reclassification.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_sizes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub product_id: Uuid,

    /// Unique per product.
    pub size_name: String,

    /// Explicit display ordering within the product.
    pub position: i32,

    pub chest_cm: Option<Decimal>,
    pub waist_cm: Option<Decimal>,
    pub hip_cm: Option<Decimal>,
    pub inseam_cm: Option<Decimal>,
    pub shoulder_cm: Option<Decimal>,
    pub sleeve_cm: Option<Decimal>,
    pub front_length_cm: Option<Decimal>,
    pub back_length_cm: Option<Decimal>,
    pub thigh_cm: Option<Decimal>,
    pub shoe_size_us: Option<Decimal>,
    pub shoe_size_eu: Option<Decimal>,
    pub foot_length_cm: Option<Decimal>,
    pub foot_width_cm: Option<Decimal>,
    pub belt_length_cm: Option<Decimal>,
    pub belt_width_cm: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
