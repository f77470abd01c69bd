//! Database Module
//!
//! 嵌入式 SurrealDB 连接与 schema 初始化。

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed database at the given path
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::init(db).await
    }

    /// In-memory database for tests
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::init(db).await
    }

    async fn init(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns("qrmenu")
            .use_db("main")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database connection established");
        Ok(Self { db })
    }
}

/// 定义 schema — 唯一索引承载存储层约束
///
/// 幂等 (IF NOT EXISTS)，每次启动执行。
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS uniq_user_email ON TABLE user COLUMNS email UNIQUE;

        DEFINE TABLE IF NOT EXISTS menu_category SCHEMALESS;

        DEFINE TABLE IF NOT EXISTS menu_item SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS idx_item_category ON TABLE menu_item COLUMNS category;
        DEFINE INDEX IF NOT EXISTS idx_item_availability ON TABLE menu_item COLUMNS availability;

        DEFINE TABLE IF NOT EXISTS dining_table SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS uniq_table_number ON TABLE dining_table COLUMNS number UNIQUE;
        DEFINE INDEX IF NOT EXISTS uniq_table_slug ON TABLE dining_table COLUMNS qr_slug UNIQUE;

        DEFINE TABLE IF NOT EXISTS order SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS uniq_order_number ON TABLE order COLUMNS order_number UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_order_status ON TABLE order COLUMNS status;
        DEFINE INDEX IF NOT EXISTS idx_order_created ON TABLE order COLUMNS created_at;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::MenuCategoryCreate;
    use crate::db::repository::CategoryRepository;

    #[tokio::test]
    async fn test_rocksdb_database_opens_and_stores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qrmenu.db");
        let service = DbService::new(&path.to_string_lossy()).await.unwrap();

        let repo = CategoryRepository::new(service.db.clone());
        repo.create(MenuCategoryCreate {
            name: "Mains".to_string(),
            display_order: 1,
            description: None,
            image_url: None,
        })
        .await
        .unwrap();

        let categories = repo.find_all_active().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Mains");
    }
}
