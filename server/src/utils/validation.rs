//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits mirror the persisted schema constraints so handlers can
//! reject oversized input before it reaches the store.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Category names
pub const MAX_CATEGORY_NAME_LEN: usize = 50;

/// Menu item names
pub const MAX_ITEM_NAME_LEN: usize = 100;

/// Item / category descriptions
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Per-line order notes
pub const MAX_LINE_NOTE_LEN: usize = 200;

/// Order special instructions
pub const MAX_INSTRUCTIONS_LEN: usize = 500;

/// Table numbers
pub const MAX_TABLE_NUMBER_LEN: usize = 20;

/// Location labels
pub const MAX_LOCATION_LEN: usize = 50;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        )));
    }
    Ok(())
}

/// Flatten `validator` errors into field-level messages for the 400 envelope.
pub fn check_payload<T: validator::Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(|errs| {
        let mut messages: Vec<String> = errs
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();
        AppError::validation_with_errors("Validation failed", messages)
    })
}
