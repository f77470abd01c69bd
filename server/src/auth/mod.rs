//! 认证模块
//!
//! - [`jwt`] - JWT 令牌服务
//! - [`middleware`] - 认证与角色检查中间件

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_role};
