//! API Response types
//!
//! Standardized API response structures for the entire backend

use serde::{Deserialize, Serialize};

/// Unified API response structure
///
/// All API responses follow this format:
/// ```json
/// {
///     "success": true,
///     "message": "Order placed successfully",
///     "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Human-readable message (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Field-level error messages (validation failures only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: None,
        }
    }

    /// Create a successful response with custom message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            errors: None,
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: None,
        }
    }

    /// Create an error response with field-level messages
    pub fn error_with_details(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: Some(errors),
        }
    }
}

/// Pagination metadata
///
/// Serialized camelCase for the frontend.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page number (1-based)
    pub current_page: u32,
    /// Total number of pages
    pub total_pages: u32,
    /// Total number of items
    pub total_items: u64,
    /// Items per page
    pub items_per_page: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// Create a new pagination
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            ((total as f64) / (per_page as f64)).ceil() as u32
        };
        Self {
            current_page: page,
            total_pages,
            total_items: total,
            items_per_page: per_page,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// List of items
    pub items: Vec<T>,
    /// Pagination metadata
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    /// Create a new paginated response
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        Self {
            items,
            pagination: Pagination::new(page, per_page, total),
        }
    }
}
