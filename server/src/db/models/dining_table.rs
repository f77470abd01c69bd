//! Dining Table Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::Timestamp;
use surrealdb::RecordId;

pub type DiningTableId = RecordId;

/// Dining table entity (桌台)
///
/// `qr_slug` 是打印在桌贴二维码里的公开标识，
/// 一旦分配后绝不更改 (改号不改 slug)。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<DiningTableId>,
    /// Human-readable table number, unique
    pub number: String,
    /// Stable public identifier embedded in the printed QR code, unique
    pub qr_slug: String,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Timestamp,
}

fn default_true() -> bool {
    true
}

fn default_capacity() -> u32 {
    4
}

fn default_location() -> String {
    "Main Dining".to_string()
}

/// Derive the public slug from a table number
///
/// Deterministic and idempotent: lowercased number, whitespace runs
/// collapsed to single hyphens, prefixed with `table-`.
pub fn derive_slug(number: &str) -> String {
    let normalized = number
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("table-{normalized}")
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub number: String,
    pub capacity: Option<u32>,
    pub location: Option<String>,
}

/// Update dining table payload
///
/// 注意: 没有 qr_slug 字段 — slug 不可变更。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_slug_basic() {
        assert_eq!(derive_slug("T1"), "table-t1");
        assert_eq!(derive_slug("12"), "table-12");
    }

    #[test]
    fn test_derive_slug_whitespace() {
        assert_eq!(derive_slug("Patio 3"), "table-patio-3");
        assert_eq!(derive_slug("  Window   Seat  "), "table-window-seat");
    }

    #[test]
    fn test_derive_slug_idempotent_input() {
        // Re-deriving from the same number always yields the same slug
        assert_eq!(derive_slug("T1"), derive_slug("T1"));
    }
}
