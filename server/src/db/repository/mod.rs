//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.
//!
//! # ID Convention
//!
//! 全栈统一使用 "table:id" 字符串格式：
//!   - 解析: `let id: RecordId = "menu_item:abc".parse()?;`
//!   - 模型中的引用字段以 "table:id" 字符串形式持久化，
//!     查询比较时绑定 `id.to_string()`，不绑定原生 RecordId。
//!   - 按主键取记录时使用 `db.select(record_id)`。

pub mod category;
pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod user;

// Re-exports
pub use category::CategoryRepository;
pub use dining_table::DiningTableRepository;
pub use menu_item::MenuItemRepository;
pub use order::OrderRepository;
pub use user::UserRepository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("{0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Parse a "table:id" string into a RecordId
pub fn parse_record_id(id: &str) -> RepoResult<surrealdb::RecordId> {
    id.parse()
        .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))
}
