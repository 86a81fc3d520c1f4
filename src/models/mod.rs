use serde::{Deserialize, Serialize};

/// Identifier of the source listing site, stored on every imported vehicle.
pub const SOURCE_PLATFORM: &str = "gebrauchtwagen24";

/// Prefix for the stable external reference derived from the source id.
pub const EXTERNAL_REF_PREFIX: &str = "IMP";

/// Default location for imported vehicles (all listings come from Germany).
pub const DEFAULT_LOCATION: &str = "Allemagne";

/// One listing as embedded in the source site's page payload.
///
/// Everything beyond id/make/model/price is optional on the source side and
/// must deserialize as absent rather than fail, so every such field carries
/// a serde default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSourceRecord {
    #[serde(default)]
    pub id: u64,
    /// Mongo-style secondary id assigned by the source backend.
    #[serde(rename = "_id", default)]
    pub mongo_id: Option<String>,
    /// Human-readable dealer reference, when the listing carries one.
    #[serde(default)]
    pub reference: Option<String>,
    /// Source brand code.
    #[serde(default)]
    pub make: u32,
    /// Source model code.
    #[serde(default)]
    pub model: u32,
    /// Free-text model version, e.g. "X5 3.0d".
    #[serde(default)]
    pub model_version_input: Option<String>,
    /// Total price in source currency units.
    #[serde(default)]
    pub total_price: f64,
    /// First registration year.
    #[serde(default)]
    pub first_registration_date: Option<i32>,
    /// Mileage in km.
    #[serde(default)]
    pub mileage: Option<u64>,
    #[serde(default)]
    pub transmission_type: Option<u32>,
    #[serde(default)]
    pub body_type: Option<u32>,
    #[serde(default)]
    pub hp: Option<u32>,
    #[serde(default)]
    pub fuel_category: Option<u32>,
    #[serde(default)]
    pub exterior_color: Option<u32>,
    #[serde(default)]
    pub interior_color: Option<u32>,
    /// HTML-ish free text description, German.
    #[serde(default)]
    pub description: Option<String>,
    /// Image metadata; shape varies per listing and is ignored by the
    /// pipeline (image URLs are fetched separately).
    #[serde(default)]
    pub images: Option<serde_json::Value>,
    #[serde(default)]
    pub doors: Option<u32>,
    #[serde(default)]
    pub seats: Option<u32>,
    /// Equipment text blob, when present separately from the description.
    #[serde(default)]
    pub equipment: Option<String>,
}

/// Structured attributes extracted from a listing description.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exterior_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interior_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upholstery: Option<String>,
}

impl Specifications {
    pub fn is_empty(&self) -> bool {
        self.engine.is_none()
            && self.power.is_none()
            && self.consumption.is_none()
            && self.exterior_color.is_none()
            && self.interior_color.is_none()
            && self.upholstery.is_none()
    }
}

/// Canonical vehicle shape sent to the CMS.
///
/// After normalization, brand/category/transmission/fuel always hold one of
/// their closed-set values; unknown source codes have already been mapped to
/// their fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedVehicle {
    pub external_id: String,
    /// Stable idempotency key, "IMP-{id}".
    pub external_reference: String,
    pub title: String,
    pub brand: String,
    pub model: String,
    pub category: String,
    pub price: f64,
    pub year: i32,
    pub mileage: u64,
    pub fuel: String,
    pub transmission: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    pub location: String,
    pub source_url: String,
    pub source_platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<Specifications>,
    pub features: Vec<String>,
    pub packages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doors: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
}

/// Result of parsing one free-text description.
///
/// Feature and package lists are distinct strings in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedEquipment {
    pub features: Vec<String>,
    pub packages: Vec<String>,
    pub exterior_color: Option<String>,
    pub interior_color: Option<String>,
    pub upholstery: Option<String>,
}

/// Aggregate counters for one import run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub total: u64,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errors: u64,
    pub error_details: Vec<String>,
}

impl ImportStats {
    /// Folds another run's counters into this one (used by multi-brand runs).
    pub fn merge(&mut self, other: ImportStats) {
        self.total += other.total;
        self.created += other.created;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.errors += other.errors;
        self.error_details.extend(other.error_details);
    }
}

/// One importable brand: the source site's numeric make code plus the URL
/// slug used both for listing pages and reconstructed detail URLs.
#[derive(Debug, Clone, Copy)]
pub struct BrandConfig {
    pub key: &'static str,
    pub source_make_id: u32,
    pub slug: &'static str,
    pub display_name: &'static str,
}

/// Brands currently imported. Order is the order of multi-brand runs.
pub const BRANDS: &[BrandConfig] = &[
    BrandConfig { key: "audi", source_make_id: 9, slug: "audi", display_name: "Audi" },
    BrandConfig { key: "bmw", source_make_id: 13, slug: "bmw", display_name: "BMW" },
    BrandConfig { key: "mercedes", source_make_id: 47, slug: "mercedes-benz", display_name: "Mercedes-Benz" },
    BrandConfig { key: "mini", source_make_id: 41, slug: "mini", display_name: "MINI" },
    BrandConfig { key: "porsche", source_make_id: 57, slug: "porsche", display_name: "Porsche" },
    BrandConfig { key: "volkswagen", source_make_id: 74, slug: "volkswagen", display_name: "Volkswagen" },
];

/// Looks up a brand by its key, case-insensitively.
pub fn find_brand(key: &str) -> Option<&'static BrandConfig> {
    BRANDS.iter().find(|b| b.key.eq_ignore_ascii_case(key))
}
