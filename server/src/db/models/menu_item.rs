//! Menu Item Model

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::Timestamp;
use surrealdb::RecordId;

pub type MenuItemId = RecordId;

/// Menu item model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<MenuItemId>,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Record link to menu_category
    #[serde(with = "serde_helpers::record_id")]
    pub category: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub availability: bool,
    /// Lowercased free-form tags for filtering and search
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    /// Minutes
    #[serde(default = "default_preparation_time")]
    pub preparation_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_vegetarian: bool,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_vegan: bool,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_gluten_free: bool,
    /// Cumulative ordered quantity; only ever incremented
    #[serde(default)]
    pub popularity_score: i64,
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Timestamp,
}

fn default_true() -> bool {
    true
}

fn default_preparation_time() -> u32 {
    15
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Category id ("menu_category:xxx")
    pub category: String,
    pub image_url: Option<String>,
    pub availability: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    pub preparation_time: Option<u32>,
    pub calories: Option<u32>,
    pub is_vegetarian: Option<bool>,
    pub is_vegan: Option<bool>,
    pub is_gluten_free: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergens: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preparation_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_vegetarian: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_vegan: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_gluten_free: Option<bool>,
}
