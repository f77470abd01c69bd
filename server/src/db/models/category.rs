//! Menu Category Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::Timestamp;
use surrealdb::RecordId;

pub type CategoryId = RecordId;

/// Menu category model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategory {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<CategoryId>,
    pub name: String,
    /// Presentation sequence (ascending)
    #[serde(default)]
    pub display_order: u32,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Timestamp,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategoryCreate {
    pub name: String,
    pub display_order: u32,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
