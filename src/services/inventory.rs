use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::capabilities::Capabilities;
use crate::entities::{inventory_level, product};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::scope::{self, Visibility};

/// Service for stock levels and the product archive invariant.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

/// One stock write for a (product, location, optional size) triple.
#[derive(Clone, Debug)]
pub struct StockWrite {
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub size_name: Option<String>,
    pub quantity: i32,
    /// NULL means "use the default price".
    pub price: Option<Decimal>,
}

#[derive(Debug)]
pub struct InventoryPage {
    pub levels: Vec<inventory_level::Model>,
    pub total: u64,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Sets the stock level for a triple. A quantity of zero deletes the row
    /// rather than storing a zero. Runs in one transaction with the archive
    /// invariant: all stock mutations must go through here, or the flag can
    /// drift.
    #[instrument(skip(self, write), fields(product_id = %write.product_id, location_id = %write.location_id, quantity = write.quantity))]
    pub async fn set_stock(
        &self,
        write: StockWrite,
    ) -> Result<Option<inventory_level::Model>, ServiceError> {
        if write.quantity < 0 {
            return Err(ServiceError::ValidationError(
                "Stock quantity cannot be negative".into(),
            ));
        }

        let txn = self.db.begin().await?;

        let product = product::Entity::find_by_id(write.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", write.product_id))
            })?;

        let existing = find_level(&txn, &write).await?;

        let stored = if write.quantity == 0 {
            if let Some(row) = existing {
                row.delete(&txn).await?;
            }
            None
        } else {
            let now = Utc::now();
            let model = match existing {
                Some(row) => {
                    let mut active: inventory_level::ActiveModel = row.into();
                    active.quantity = Set(write.quantity);
                    active.price = Set(write.price);
                    active.updated_at = Set(now);
                    active.update(&txn).await?
                }
                None => inventory_level::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    product_id: Set(write.product_id),
                    location_id: Set(write.location_id),
                    size_name: Set(write.size_name.clone()),
                    quantity: Set(write.quantity),
                    price: Set(write.price),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?,
            };
            Some(model)
        };

        let archive_change = sync_archive_flag(&txn, product).await?;

        txn.commit().await?;

        self.event_sender
            .send(Event::StockChanged {
                product_id: write.product_id,
                location_id: write.location_id,
                quantity: write.quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        if let Some(archived) = archive_change {
            info!(product_id = %write.product_id, archived, "archive flag flipped");
            self.event_sender
                .send(Event::ProductArchived {
                    product_id: write.product_id,
                    archived,
                })
                .await
                .map_err(ServiceError::EventError)?;
        }

        Ok(stored)
    }

    /// Lists stock through the session's visibility scope.
    #[instrument(skip(self, caps))]
    pub async fn list_levels(
        &self,
        caps: &Capabilities,
        page: u64,
        limit: u64,
    ) -> Result<InventoryPage, ServiceError> {
        let vis = Visibility::for_inventory(caps);
        let select = scope::inventory(vis).order_by_desc(inventory_level::Column::UpdatedAt);

        let paginator = select.paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let levels = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(InventoryPage { levels, total })
    }

    /// Reads one level without scoping; absent row means "no stock".
    pub async fn get_level(
        &self,
        product_id: Uuid,
        location_id: Uuid,
        size_name: Option<&str>,
    ) -> Result<Option<inventory_level::Model>, ServiceError> {
        let write = StockWrite {
            product_id,
            location_id,
            size_name: size_name.map(str::to_string),
            quantity: 0,
            price: None,
        };
        find_level(&*self.db, &write).await
    }
}

async fn find_level<C: ConnectionTrait>(
    conn: &C,
    write: &StockWrite,
) -> Result<Option<inventory_level::Model>, ServiceError> {
    let mut select = inventory_level::Entity::find()
        .filter(inventory_level::Column::ProductId.eq(write.product_id))
        .filter(inventory_level::Column::LocationId.eq(write.location_id));

    select = match &write.size_name {
        Some(size) => select.filter(inventory_level::Column::SizeName.eq(size)),
        None => select.filter(inventory_level::Column::SizeName.is_null()),
    };

    Ok(select.one(conn).await?)
}

/// Re-derives the product archive flag from row existence: zero inventory
/// rows across all locations archives the product, the first row back
/// unarchives it. Returns the new flag value when it flipped.
pub(crate) async fn sync_archive_flag<C: ConnectionTrait>(
    conn: &C,
    product: product::Model,
) -> Result<Option<bool>, ServiceError> {
    let rows = inventory_level::Entity::find()
        .filter(inventory_level::Column::ProductId.eq(product.id))
        .count(conn)
        .await?;

    let should_archive = rows == 0;
    if product.is_archived == should_archive {
        return Ok(None);
    }

    let mut active: product::ActiveModel = product.into();
    active.is_archived = Set(should_archive);
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn).await?;

    Ok(Some(should_archive))
}

/// Variant keyed by id, for callers that mutated stock without a loaded
/// product row (e.g. the location deletion cascade).
pub(crate) async fn sync_archive_flag_by_id<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<Option<bool>, ServiceError> {
    let Some(product) = product::Entity::find_by_id(product_id).one(conn).await? else {
        return Ok(None);
    };
    sync_archive_flag(conn, product).await
}
