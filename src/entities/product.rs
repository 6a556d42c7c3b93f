use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[sea_orm(unique)]
    #[validate(length(min = 1, max = 64))]
    pub sku: String,

    /// Free-text category tags, comma-separated.
    pub tags: String,

    /// Single tag feeding measurement-schema selection only; never part of
    /// the category tag set.
    pub clothing_type: Option<String>,

    /// Ordered size names, denormalized from product_sizes on every size
    /// mutation.
    pub sizes: String,

    pub allow_custom_measurements: bool,
    pub weight_grams: Option<i32>,
    pub image_url: Option<String>,

    /// Maintained by the stock-update path: true exactly while the product
    /// has no inventory rows at any location.
    pub is_archived: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn tag_list(&self) -> Vec<String> {
        split_list(&self.tags)
    }

    pub fn size_list(&self) -> Vec<String> {
        split_list(&self.sizes)
    }

    /// Tags considered for measurement-category detection: the clothing type
    /// first (when present), then the category tags.
    pub fn detection_tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if let Some(ct) = &self.clothing_type {
            if !ct.trim().is_empty() {
                tags.push(ct.trim().to_string());
            }
        }
        tags.extend(self.tag_list());
        tags
    }
}

/// Join a tag/size list into its stored comma-separated form.
pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_size::Entity")]
    ProductSizes,
    #[sea_orm(has_many = "super::inventory_level::Entity")]
    InventoryLevels,
}

impl Related<super::product_size::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductSizes.def()
    }
}

impl Related<super::inventory_level::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryLevels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
