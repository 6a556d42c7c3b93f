//! Category detection and per-category measurement schemas.
//!
//! A product's free-text tags are matched against an ordered table of trigger
//! substrings; the first matching category wins and `generic` is the
//! fallback. The field list for a category drives both the entry form and
//! which measurement columns are expected to be populated. Stale values from
//! a prior reclassification are left in storage untouched.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use utoipa::ToSchema;

/// Measurement category assigned to a product.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SizeCategory {
    Shirts,
    Pants,
    Shoes,
    Belts,
    Dresses,
    Jackets,
    Perfumes,
    Generic,
}

impl SizeCategory {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Parse a category key, falling back to `Generic` for anything
    /// unrecognized. Lookups through this path never fail.
    pub fn from_key(key: &str) -> Self {
        key.parse().unwrap_or(SizeCategory::Generic)
    }
}

/// One detection rule: a category and the substrings that trigger it.
pub struct CategoryRule {
    pub category: SizeCategory,
    pub keywords: &'static [&'static str],
}

/// Ordered rule table; earlier rows win. Footwear and accessories come before
/// the broad garment buckets so "Running Sneakers" never lands in shirts.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: SizeCategory::Shoes,
        keywords: &[
            "shoe", "sneaker", "boot", "sandal", "heel", "trainer", "loafer", "footwear",
        ],
    },
    CategoryRule {
        category: SizeCategory::Belts,
        keywords: &["belt"],
    },
    CategoryRule {
        category: SizeCategory::Perfumes,
        keywords: &["perfume", "fragrance", "cologne", "eau de"],
    },
    CategoryRule {
        category: SizeCategory::Dresses,
        keywords: &["dress", "gown", "skirt"],
    },
    CategoryRule {
        category: SizeCategory::Jackets,
        keywords: &["jacket", "coat", "blazer", "parka", "windbreaker"],
    },
    CategoryRule {
        category: SizeCategory::Pants,
        keywords: &[
            "pant", "trouser", "jean", "chino", "legging", "jogger", "short",
        ],
    },
    CategoryRule {
        category: SizeCategory::Shirts,
        keywords: &[
            "shirt", "tee", "polo", "blouse", "top", "hoodie", "sweater", "sweatshirt", "cardigan",
        ],
    },
];

/// Detect the measurement category for a set of tags. Case-insensitive
/// substring matching, first matching rule wins, `Generic` if nothing
/// matches. Pure: the same tag set always yields the same category.
pub fn detect_category<I, S>(tags: I) -> SizeCategory
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lowered: Vec<String> = tags
        .into_iter()
        .map(|t| t.as_ref().to_lowercase())
        .collect();

    for rule in CATEGORY_RULES {
        for tag in &lowered {
            if rule.keywords.iter().any(|kw| tag.contains(kw)) {
                return rule.category;
            }
        }
    }
    SizeCategory::Generic
}

/// One measurement field as presented to data entry.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct MeasurementField {
    /// Column key on the product size row.
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub placeholder: &'static str,
}

const fn field(
    key: &'static str,
    label: &'static str,
    unit: &'static str,
    placeholder: &'static str,
) -> MeasurementField {
    MeasurementField {
        key,
        label,
        unit,
        placeholder,
    }
}

const CHEST: MeasurementField = field("chest_cm", "Chest", "cm", "e.g. 96");
const WAIST: MeasurementField = field("waist_cm", "Waist", "cm", "e.g. 80");
const HIP: MeasurementField = field("hip_cm", "Hip", "cm", "e.g. 102");
const INSEAM: MeasurementField = field("inseam_cm", "Inseam", "cm", "e.g. 76");
const SHOULDER: MeasurementField = field("shoulder_cm", "Shoulder width", "cm", "e.g. 44");
const SLEEVE: MeasurementField = field("sleeve_cm", "Sleeve length", "cm", "e.g. 61");
const FRONT_LENGTH: MeasurementField = field("front_length_cm", "Front length", "cm", "e.g. 70");
const BACK_LENGTH: MeasurementField = field("back_length_cm", "Back length", "cm", "e.g. 72");
const THIGH: MeasurementField = field("thigh_cm", "Thigh width", "cm", "e.g. 30");
const SHOE_US: MeasurementField = field("shoe_size_us", "US size", "US", "e.g. 10.5");
const SHOE_EU: MeasurementField = field("shoe_size_eu", "EU size", "EU", "e.g. 44");
const FOOT_LENGTH: MeasurementField = field("foot_length_cm", "Foot length", "cm", "e.g. 27.5");
const FOOT_WIDTH: MeasurementField = field("foot_width_cm", "Foot width", "cm", "e.g. 10");
const BELT_LENGTH: MeasurementField = field("belt_length_cm", "Belt length", "cm", "e.g. 110");
const BELT_WIDTH: MeasurementField = field("belt_width_cm", "Belt width", "cm", "e.g. 3.5");

const SHIRT_FIELDS: &[MeasurementField] = &[CHEST, SHOULDER, SLEEVE, FRONT_LENGTH];
const PANTS_FIELDS: &[MeasurementField] = &[WAIST, HIP, INSEAM, THIGH];
const SHOE_FIELDS: &[MeasurementField] = &[SHOE_US, SHOE_EU, FOOT_LENGTH, FOOT_WIDTH];
const BELT_FIELDS: &[MeasurementField] = &[BELT_LENGTH, BELT_WIDTH];
const DRESS_FIELDS: &[MeasurementField] = &[CHEST, WAIST, HIP, FRONT_LENGTH, BACK_LENGTH];
const JACKET_FIELDS: &[MeasurementField] = &[CHEST, SHOULDER, SLEEVE, FRONT_LENGTH, BACK_LENGTH];
// Scent products carry no garment measurements; sizes are plain names ("50ml").
const PERFUME_FIELDS: &[MeasurementField] = &[];
const GENERIC_FIELDS: &[MeasurementField] = &[CHEST, WAIST, HIP, FRONT_LENGTH];

/// Fields applicable to a category. Total over the enum, so the generic
/// fallback is only reachable through [`SizeCategory::from_key`].
pub fn fields_for(category: SizeCategory) -> &'static [MeasurementField] {
    match category {
        SizeCategory::Shirts => SHIRT_FIELDS,
        SizeCategory::Pants => PANTS_FIELDS,
        SizeCategory::Shoes => SHOE_FIELDS,
        SizeCategory::Belts => BELT_FIELDS,
        SizeCategory::Dresses => DRESS_FIELDS,
        SizeCategory::Jackets => JACKET_FIELDS,
        SizeCategory::Perfumes => PERFUME_FIELDS,
        SizeCategory::Generic => GENERIC_FIELDS,
    }
}
