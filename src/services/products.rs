use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{product, product_size};
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::sizing::{self, MeasurementField, SizeCategory};

/// Service for the product catalog and per-size measurements.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    #[allow(dead_code)]
    event_sender: EventSender,
}

#[derive(Clone, Debug)]
pub struct CreateProductInput {
    pub name: String,
    pub sku: String,
    pub tags: Vec<String>,
    pub clothing_type: Option<String>,
    pub allow_custom_measurements: bool,
    pub weight_grams: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub clothing_type: Option<String>,
    pub allow_custom_measurements: Option<bool>,
    pub weight_grams: Option<i32>,
    pub image_url: Option<String>,
}

/// The sparse measurement set submitted by the size entry form. Only the
/// fields the form carried are set; everything else stays untouched in
/// storage, which is how out-of-category values survive reclassification.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct MeasurementSet {
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
}

impl MeasurementSet {
    fn apply(&self, active: &mut product_size::ActiveModel) {
        if let Some(v) = self.chest_cm {
            active.chest_cm = Set(Some(v));
        }
        if let Some(v) = self.waist_cm {
            active.waist_cm = Set(Some(v));
        }
        if let Some(v) = self.hip_cm {
            active.hip_cm = Set(Some(v));
        }
        if let Some(v) = self.inseam_cm {
            active.inseam_cm = Set(Some(v));
        }
        if let Some(v) = self.shoulder_cm {
            active.shoulder_cm = Set(Some(v));
        }
        if let Some(v) = self.sleeve_cm {
            active.sleeve_cm = Set(Some(v));
        }
        if let Some(v) = self.front_length_cm {
            active.front_length_cm = Set(Some(v));
        }
        if let Some(v) = self.back_length_cm {
            active.back_length_cm = Set(Some(v));
        }
        if let Some(v) = self.thigh_cm {
            active.thigh_cm = Set(Some(v));
        }
        if let Some(v) = self.shoe_size_us {
            active.shoe_size_us = Set(Some(v));
        }
        if let Some(v) = self.shoe_size_eu {
            active.shoe_size_eu = Set(Some(v));
        }
        if let Some(v) = self.foot_length_cm {
            active.foot_length_cm = Set(Some(v));
        }
        if let Some(v) = self.foot_width_cm {
            active.foot_width_cm = Set(Some(v));
        }
        if let Some(v) = self.belt_length_cm {
            active.belt_length_cm = Set(Some(v));
        }
        if let Some(v) = self.belt_width_cm {
            active.belt_width_cm = Set(Some(v));
        }
    }
}

#[derive(Clone, Debug)]
pub struct SizeInput {
    pub size_name: String,
    pub position: Option<i32>,
    pub measurements: MeasurementSet,
}

#[derive(Debug)]
pub struct ProductPage {
    pub products: Vec<product::Model>,
    pub total: u64,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Creates a product. It starts archived: the archive flag tracks
    /// inventory row existence and a new product has none.
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let existing = product::Entity::find()
            .filter(product::Column::Sku.eq(input.sku.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "SKU '{}' is already in use",
                input.sku
            )));
        }

        let product_id = Uuid::new_v4();
        let created = product::ActiveModel {
            id: Set(product_id),
            name: Set(input.name),
            sku: Set(input.sku),
            tags: Set(product::join_list(&input.tags)),
            clothing_type: Set(input.clothing_type),
            sizes: Set(String::new()),
            allow_custom_measurements: Set(false),
            weight_grams: Set(input.weight_grams),
            image_url: Set(input.image_url),
            is_archived: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        if input.allow_custom_measurements {
            self.try_set_custom_measurements_flag(product_id, true).await;
        }

        info!(%product_id, "product created");
        Ok(created)
    }

    /// The custom-measurements flag is an optional, backward-compatible
    /// column: deployments that have not migrated yet simply miss it. The
    /// write is isolated and its failure logged and swallowed.
    async fn try_set_custom_measurements_flag(&self, product_id: Uuid, allowed: bool) {
        let result = product::Entity::update_many()
            .col_expr(product::Column::AllowCustomMeasurements, Expr::value(allowed))
            .filter(product::Column::Id.eq(product_id))
            .exec(&*self.db)
            .await;

        if let Err(e) = result {
            warn!(%product_id, error = %e, "skipping custom-measurements flag write (column may not exist yet)");
        }
    }

    pub async fn get_product(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {id} not found")))
    }

    pub async fn get_by_sku(&self, sku: &str) -> Result<product::Model, ServiceError> {
        product::Entity::find()
            .filter(product::Column::Sku.eq(sku))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product with SKU '{sku}' not found")))
    }

    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        include_archived: bool,
        search: Option<&str>,
        page: u64,
        limit: u64,
    ) -> Result<ProductPage, ServiceError> {
        let mut select = product::Entity::find().order_by_asc(product::Column::Name);
        if !include_archived {
            select = select.filter(product::Column::IsArchived.eq(false));
        }
        if let Some(term) = search {
            let pattern = format!("%{term}%");
            select = select.filter(
                product::Column::Name
                    .like(pattern.clone())
                    .or(product::Column::Sku.like(pattern)),
            );
        }

        let paginator = select.paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(ProductPage { products, total })
    }

    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let existing = self.get_product(id).await?;

        let allow_custom = input.allow_custom_measurements;
        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(tags) = input.tags {
            active.tags = Set(product::join_list(&tags));
        }
        if let Some(clothing_type) = input.clothing_type {
            active.clothing_type = Set(Some(clothing_type));
        }
        if let Some(weight) = input.weight_grams {
            active.weight_grams = Set(Some(weight));
        }
        if let Some(url) = input.image_url {
            active.image_url = Set(Some(url));
        }
        active.updated_at = Set(Some(Utc::now()));
        let mut updated = active.update(&*self.db).await?;

        if let Some(allowed) = allow_custom {
            self.try_set_custom_measurements_flag(id, allowed).await;
            updated.allow_custom_measurements = allowed;
        }

        Ok(updated)
    }

    pub async fn set_image(&self, id: Uuid, url: String) -> Result<product::Model, ServiceError> {
        let existing = self.get_product(id).await?;
        let mut active: product::ActiveModel = existing.into();
        active.image_url = Set(Some(url));
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db).await?)
    }

    /// The measurement schema the entry form shows for this product:
    /// exactly the fields for its detected category.
    pub async fn measurement_schema(
        &self,
        id: Uuid,
    ) -> Result<(SizeCategory, &'static [MeasurementField]), ServiceError> {
        let product = self.get_product(id).await?;
        let category = sizing::detect_category(product.detection_tags());
        Ok((category, sizing::fields_for(category)))
    }

    /// Inserts or updates one size. Only the submitted measurement fields
    /// are written; the denormalized size-name list on the product is
    /// rebuilt afterwards.
    #[instrument(skip(self, input), fields(product_id = %product_id, size = %input.size_name))]
    pub async fn upsert_size(
        &self,
        product_id: Uuid,
        input: SizeInput,
    ) -> Result<product_size::Model, ServiceError> {
        let size_name = input.size_name.trim().to_string();
        if size_name.is_empty() {
            return Err(ServiceError::ValidationError(
                "A size needs a non-empty name".into(),
            ));
        }

        let txn = self.db.begin().await?;

        // Size rows must hang off an existing product.
        product::Entity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {product_id} not found")))?;

        let existing = product_size::Entity::find()
            .filter(product_size::Column::ProductId.eq(product_id))
            .filter(product_size::Column::SizeName.eq(size_name.clone()))
            .one(&txn)
            .await?;

        let now = Utc::now();
        let stored = match existing {
            Some(row) => {
                let mut active: product_size::ActiveModel = row.into();
                if let Some(position) = input.position {
                    active.position = Set(position);
                }
                input.measurements.apply(&mut active);
                active.updated_at = Set(Some(now));
                active.update(&txn).await?
            }
            None => {
                let position = match input.position {
                    Some(p) => p,
                    None => {
                        let count = product_size::Entity::find()
                            .filter(product_size::Column::ProductId.eq(product_id))
                            .count(&txn)
                            .await?;
                        count as i32
                    }
                };
                let mut active = product_size::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    product_id: Set(product_id),
                    size_name: Set(size_name.clone()),
                    position: Set(position),
                    created_at: Set(now),
                    updated_at: Set(None),
                    ..Default::default()
                };
                input.measurements.apply(&mut active);
                active.insert(&txn).await?
            }
        };

        rebuild_size_list(&txn, product_id).await?;
        txn.commit().await?;

        Ok(stored)
    }

    #[instrument(skip(self), fields(product_id = %product_id, size = %size_name))]
    pub async fn delete_size(
        &self,
        product_id: Uuid,
        size_name: &str,
    ) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let existing = product_size::Entity::find()
            .filter(product_size::Column::ProductId.eq(product_id))
            .filter(product_size::Column::SizeName.eq(size_name))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Size '{size_name}' not found on product {product_id}"
                ))
            })?;

        existing.delete(&txn).await?;
        rebuild_size_list(&txn, product_id).await?;
        txn.commit().await?;

        Ok(())
    }

    pub async fn list_sizes(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<product_size::Model>, ServiceError> {
        Ok(product_size::Entity::find()
            .filter(product_size::Column::ProductId.eq(product_id))
            .order_by_asc(product_size::Column::Position)
            .order_by_asc(product_size::Column::SizeName)
            .all(&*self.db)
            .await?)
    }
}

/// Rebuilds the ordered size-name list denormalized onto the product row.
async fn rebuild_size_list<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<(), ServiceError> {
    let sizes = product_size::Entity::find()
        .filter(product_size::Column::ProductId.eq(product_id))
        .order_by_asc(product_size::Column::Position)
        .order_by_asc(product_size::Column::SizeName)
        .all(conn)
        .await?;

    let names: Vec<String> = sizes.into_iter().map(|s| s.size_name).collect();

    product::Entity::update_many()
        .col_expr(product::Column::Sizes, Expr::value(product::join_list(&names)))
        .filter(product::Column::Id.eq(product_id))
        .exec(conn)
        .await?;

    Ok(())
}
