use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::auth::JwtConfig;

/// 服务器配置 - 所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/qrmenu | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 5000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | FRONTEND_URL | http://localhost:3000 | 前端地址 (二维码落地页) |
/// | TAX_RATE | 0.10 | 税率 |
/// | MAX_ORDER_ITEMS | 20 | 单笔订单行数上限 |
/// | DEFAULT_PREPARATION_TIME | 15 | 默认备餐时间 (分钟) |
/// | ADMIN_EMAIL | admin@example.com | 首次启动种子管理员邮箱 |
/// | ADMIN_PASSWORD | admin123 | 首次启动种子管理员密码 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/qrmenu HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 前端地址，拼接二维码落地页 URL
    pub frontend_url: String,
    /// 税率 (下单时用于计税，订单内不可协商)
    pub tax_rate: Decimal,
    /// 单笔订单行数上限
    pub max_order_items: usize,
    /// 默认备餐时间 (分钟)
    pub default_preparation_time: u32,
    /// 种子管理员邮箱
    pub admin_email: String,
    /// 种子管理员密码
    pub admin_password: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/qrmenu".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            tax_rate: std::env::var("TAX_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| Decimal::new(10, 2)), // 0.10
            max_order_items: std::env::var("MAX_ORDER_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            default_preparation_time: std::env::var("DEFAULT_PREPARATION_TIME")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            admin_email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@example.com".into()),
            admin_password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into()),
            jwt: JwtConfig::default(),
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 数据库目录
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
