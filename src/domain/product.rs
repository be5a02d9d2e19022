//! Product models for the upstream catalog feed.
//!
//! The feed is loosely typed: prices arrive as strings or numbers and absent
//! fields are common, so every field coerces and defaults instead of failing
//! the whole payload.

use super::taxonomy::lenient;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// One sellable style with its color/size variations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Product {
    #[serde(default, deserialize_with = "lenient::i64")]
    pub style_id: i64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub brand: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub dept: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub typ: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub subtyp: String,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub selling_price: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub regular_price: f64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub image_url: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub thumbnail_url: String,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub variations: Vec<Variation>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub alternate_images: Vec<String>,
}

impl Product {
    /// Whether the style is currently discounted.
    pub fn on_sale(&self) -> bool {
        self.selling_price > 0.0 && self.selling_price < self.regular_price
    }

    /// Total stock across all variations.
    pub fn total_quantity(&self) -> u64 {
        self.variations.iter().map(|v| v.quantity).sum()
    }
}

/// One color/size/stock combination of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Variation {
    #[serde(default, deserialize_with = "lenient::string")]
    pub color: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub size: String,
    #[serde(default, deserialize_with = "quantity")]
    pub quantity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

/// Stock counts are never negative; upstream oversells are clamped to zero.
fn quantity<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::i64(deserializer)?.max(0) as u64)
}
