//! QR Menu Server - 扫码点餐后端
//!
//! # 架构概述
//!
//! - **HTTP API** (`api`): RESTful 接口 (菜单、桌台、订单、认证)
//! - **点单引擎** (`ordering`): 校验、计价、订单号、状态机、统计
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储 (模型 + 仓库)
//! - **认证** (`auth`): JWT + Argon2 + 角色中间件
//!
//! # 模块结构
//!
//! ```text
//! server/src/
//! ├── core/          # 配置、状态、路由装配、服务器
//! ├── auth/          # JWT 认证、角色检查
//! ├── api/           # HTTP 路由和处理器
//! ├── ordering/      # 点单引擎 (核心业务规则)
//! ├── db/            # 数据库层 (模型 + 仓库)
//! └── utils/         # 错误、日志、时间、校验、二维码
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod ordering;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use ordering::OrderingEngine;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   ____  ____
  / __ \/ __ \   ____ ___  ___  ____  __  __
 / / / / /_/ /  / __ `__ \/ _ \/ __ \/ / / /
/ /_/ / _, _/  / / / / / /  __/ / / / /_/ /
\___\_\_/ |_|  /_/ /_/ /_/\___/_/ /_/\__,_/
    "#
    );
}
