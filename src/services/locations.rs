use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait, Value,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{inventory_level, location, order, profile};
use crate::entities::location::LocationKind;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::inventory::sync_archive_flag_by_id;

/// Service for store locations, warehouses, and courier anchors.
#[derive(Clone)]
pub struct LocationService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

#[derive(Clone, Debug)]
pub struct CreateLocationInput {
    pub name: String,
    pub kind: LocationKind,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct UpdateLocationInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: Option<bool>,
}

impl LocationService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(name = %input.name, kind = %input.kind))]
    pub async fn create_location(
        &self,
        input: CreateLocationInput,
    ) -> Result<location::Model, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "A location needs a non-empty name".into(),
            ));
        }

        let created = location::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            kind: Set(input.kind.as_str().to_string()),
            address: Set(input.address),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(location_id = %created.id, "location created");
        Ok(created)
    }

    pub async fn get_location(&self, id: Uuid) -> Result<location::Model, ServiceError> {
        location::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Location {id} not found")))
    }

    pub async fn list_locations(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<location::Model>, ServiceError> {
        let mut select = location::Entity::find().order_by_asc(location::Column::Name);
        if !include_inactive {
            select = select.filter(location::Column::IsActive.eq(true));
        }
        Ok(select.all(&*self.db).await?)
    }

    #[instrument(skip(self, input), fields(location_id = %id))]
    pub async fn update_location(
        &self,
        id: Uuid,
        input: UpdateLocationInput,
    ) -> Result<location::Model, ServiceError> {
        let existing = self.get_location(id).await?;

        let mut active: location::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        if let Some(latitude) = input.latitude {
            active.latitude = Set(Some(latitude));
        }
        if let Some(longitude) = input.longitude {
            active.longitude = Set(Some(longitude));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }

        Ok(active.update(&*self.db).await?)
    }

    /// Deletes a location after dereferencing everything that points at it:
    /// orders lose their pickup reference, the location's stock rows are
    /// removed (re-deriving the archive flag of every affected product), and
    /// staff assignments are cleared. The whole cascade runs in a single
    /// transaction: a failing step aborts the deletion and reports which
    /// step refused, and nothing partial is left behind.
    #[instrument(skip(self), fields(location_id = %id))]
    pub async fn delete_location(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        // The row must exist before we start tearing down references.
        location::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Location {id} not found")))?;

        order::Entity::update_many()
            .col_expr(order::Column::PickupLocationId, Expr::value(Value::Uuid(None)))
            .filter(order::Column::PickupLocationId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| step_error("clear order references", e))?;

        let affected_products: HashSet<Uuid> = inventory_level::Entity::find()
            .filter(inventory_level::Column::LocationId.eq(id))
            .all(&txn)
            .await
            .map_err(|e| step_error("collect stocked products", e))?
            .into_iter()
            .map(|level| level.product_id)
            .collect();

        inventory_level::Entity::delete_many()
            .filter(inventory_level::Column::LocationId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| step_error("remove inventory", e))?;

        for product_id in affected_products {
            sync_archive_flag_by_id(&txn, product_id).await?;
        }

        profile::Entity::update_many()
            .col_expr(
                profile::Column::AssignedLocationId,
                Expr::value(Value::Uuid(None)),
            )
            .filter(profile::Column::AssignedLocationId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| step_error("clear staff assignments", e))?;

        location::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| step_error("delete location", e))?;

        txn.commit().await?;

        self.event_sender
            .send(Event::LocationDeleted(id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(location_id = %id, "location deleted");
        Ok(())
    }
}

fn step_error(step: &str, e: sea_orm::DbErr) -> ServiceError {
    ServiceError::Conflict(format!("Location deletion failed at step '{step}': {e}"))
}
