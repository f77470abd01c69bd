use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::UserRepository;
use crate::ordering::OrderingEngine;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc / 浅拷贝，克隆成本极低。配置加载一次后不可变，
/// 核心逻辑不读取任何环境全局状态。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | 嵌入式数据库 (SurrealDB) |
/// | jwt_service | JWT 认证服务 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库
    pub db: Surreal<Db>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/qrmenu.db) + schema
    /// 3. 种子管理员 (首次启动)
    /// 4. JWT 服务
    ///
    /// # Panics
    ///
    /// 目录或数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("qrmenu.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        Self::with_db(config, db_service).await
    }

    /// 使用内存数据库初始化 (测试用)
    pub async fn initialize_in_memory(config: &Config) -> Self {
        let db_service = DbService::memory()
            .await
            .expect("Failed to initialize in-memory database");
        Self::with_db(config, db_service).await
    }

    async fn with_db(config: &Config, db_service: DbService) -> Self {
        let db = db_service.db;

        // 首次启动种子管理员
        if let Err(e) = UserRepository::new(db.clone())
            .ensure_default_admin(&config.admin_email, &config.admin_password)
            .await
        {
            tracing::error!(error = %e, "Failed to seed default admin");
        }

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config: config.clone(),
            db,
            jwt_service,
        }
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 构造点单引擎 (配置显式注入)
    pub fn ordering_engine(&self) -> OrderingEngine {
        OrderingEngine::new(
            self.db.clone(),
            self.config.tax_rate,
            self.config.max_order_items,
        )
    }
}
