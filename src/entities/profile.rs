use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::capabilities::Role;
use crate::errors::ServiceError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(email(message = "Profile email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, max = 120))]
    pub full_name: String,

    /// Argon2 hash; empty when credentials live with the hosted identity
    /// provider.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: String,
    pub assigned_location_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn role(&self) -> Result<Role, ServiceError> {
        self.role
            .parse()
            .map_err(|_| ServiceError::InvalidStatus(format!("Unknown profile role: {}", self.role)))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::AssignedLocationId",
        to = "super::location::Column::Id"
    )]
    Location,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
