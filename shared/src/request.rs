//! Request types for the shared crate
//!
//! Common request types used across the backend

/// Pagination query parameters
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PaginationQuery {
    /// Page number (1-based, default: 1)
    #[serde(default = "default_page")]
    pub page: u32,

    /// Items per page (default: 20, max: 100)
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationQuery {
    /// Get the offset for database queries
    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1) as u64 * self.limit() as u64
    }

    /// Get the limit (clamped to max 100)
    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_calculation() {
        let q = PaginationQuery { page: 3, limit: 20 };
        assert_eq!(q.offset(), 40);
        assert_eq!(q.limit(), 20);
    }

    #[test]
    fn test_limit_clamped() {
        let q = PaginationQuery {
            page: 0,
            limit: 500,
        };
        assert_eq!(q.limit(), 100);
        assert_eq!(q.offset(), 0);
    }
}
