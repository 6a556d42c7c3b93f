use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter as StrumEnumIter, EnumString, IntoStaticStr};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;

/// What a location physically is. Virtual courier locations anchor the
/// delivery network and hold no walk-in stock.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    StrumEnumIter,
    IntoStaticStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LocationKind {
    Store,
    Warehouse,
    VirtualCourier,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 120))]
    pub name: String,

    pub kind: String,

    /// Free-text address; coordinates are optional enrichment.
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn kind(&self) -> Result<LocationKind, ServiceError> {
        self.kind.parse().map_err(|_| {
            ServiceError::InvalidStatus(format!("Unknown location kind: {}", self.kind))
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_level::Entity")]
    InventoryLevels,
    #[sea_orm(has_many = "super::profile::Entity")]
    Profiles,
}

impl Related<super::inventory_level::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryLevels.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
