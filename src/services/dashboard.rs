use std::sync::Arc;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QuerySelect,
};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::auth::capabilities::{Capabilities, Role};
use crate::entities::{inventory_level, location, order, profile};
use crate::errors::ServiceError;
use crate::scope::{self, Visibility};

/// Role-scoped landing page aggregates.
#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub orders_by_status: Vec<StatusCount>,
    pub open_driver_tasks: u64,
    pub stock_on_hand: i64,
    pub active_locations: u64,
    pub staff_profiles: u64,
}

#[derive(Debug, FromQueryResult)]
struct StatusRow {
    status: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct SumRow {
    total: Option<i64>,
}

impl DashboardService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Computes the summary through the same visibility composer as the list
    /// pages, so a manager's dashboard only counts their location.
    #[instrument(skip(self, caps))]
    pub async fn summary(&self, caps: &Capabilities) -> Result<DashboardSummary, ServiceError> {
        let orders_by_status = scope::orders(Visibility::for_orders(caps))
            .select_only()
            .column(order::Column::Status)
            .column_as(order::Column::Id.count(), "count")
            .group_by(order::Column::Status)
            .into_model::<StatusRow>()
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|row| StatusCount {
                status: row.status,
                count: row.count,
            })
            .collect();

        let open_driver_tasks = scope::orders(Visibility::DriverTasks)
            .count(&*self.db)
            .await?;

        let stock_on_hand = scope::inventory(Visibility::for_inventory(caps))
            .select_only()
            .column_as(inventory_level::Column::Quantity.sum(), "total")
            .into_model::<SumRow>()
            .one(&*self.db)
            .await?
            .and_then(|row| row.total)
            .unwrap_or(0);

        let active_locations = match caps.role {
            Role::Admin => {
                location::Entity::find()
                    .filter(location::Column::IsActive.eq(true))
                    .count(&*self.db)
                    .await?
            }
            Role::Manager => match caps.assigned_location {
                Some(location_id) => {
                    location::Entity::find_by_id(location_id)
                        .filter(location::Column::IsActive.eq(true))
                        .count(&*self.db)
                        .await?
                }
                None => 0,
            },
            _ => 0,
        };

        let staff_profiles = match caps.role {
            Role::Admin => {
                profile::Entity::find()
                    .filter(profile::Column::Role.ne(Role::Customer.as_str()))
                    .count(&*self.db)
                    .await?
            }
            Role::Manager => match caps.assigned_location {
                Some(location_id) => {
                    profile::Entity::find()
                        .filter(profile::Column::Role.ne(Role::Customer.as_str()))
                        .filter(profile::Column::AssignedLocationId.eq(location_id))
                        .count(&*self.db)
                        .await?
                }
                None => 0,
            },
            _ => 0,
        };

        Ok(DashboardSummary {
            orders_by_status,
            open_driver_tasks,
            stock_on_hand,
            active_locations,
            staff_profiles,
        })
    }
}
