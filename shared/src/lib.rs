//! Shared types for the QR menu backend
//!
//! Common types used across crates: API envelope, pagination,
//! roles, and auth request/response DTOs.

pub mod client;
pub mod request;
pub mod response;
pub mod types;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use response::{ApiResponse, PaginatedResponse, Pagination};
pub use types::{Role, Timestamp};
