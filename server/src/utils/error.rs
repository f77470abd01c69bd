//! 统一错误处理
//!
//! 提供应用级错误类型和响应辅助函数：
//! - [`AppError`] - 应用错误枚举
//! - [`ok`] / [`ok_with_message`] - 成功响应
//!
//! # 错误分类
//!
//! | 分类 | HTTP 状态码 |
//! |------|------------|
//! | 认证错误 | 401 |
//! | 权限错误 | 403 |
//! | 资源不存在 | 404 |
//! | 资源冲突 | 409 |
//! | 验证 / 非法状态转换 / 商品不可用 | 400 |
//! | 系统错误 | 500 |
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Order not found"))
//!
//! // 返回成功响应
//! Ok(ok(data))
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::ApiResponse;
use tracing::error;

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 认证错误 (401) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    // ========== 权限错误 (403) ==========
    #[error("Access denied: {0}")]
    Forbidden(String),

    // ========== 业务逻辑错误 (4xx) ==========
    /// 资源不存在 (404)
    #[error("{0}")]
    NotFound(String),

    /// 资源冲突 (409)
    #[error("{0}")]
    Conflict(String),

    /// 验证失败 (400)，可携带字段级错误
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<String>,
    },

    /// 非法状态转换 (400)
    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// 商品当前不可点 (400)
    #[error("Item \"{0}\" is currently unavailable")]
    Unavailable(String),

    // ========== 系统错误 (500) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiResponse::error("Authentication required"),
            ),
            AppError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, ApiResponse::error("Token expired"))
            }
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, ApiResponse::error("Invalid token"))
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiResponse::error(msg.clone())),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiResponse::error(msg.clone())),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiResponse::error(msg.clone())),
            AppError::Validation { message, errors } => (
                StatusCode::BAD_REQUEST,
                if errors.is_empty() {
                    ApiResponse::error(message.clone())
                } else {
                    ApiResponse::error_with_details(message.clone(), errors.clone())
                },
            ),
            AppError::InvalidTransition { .. } | AppError::Unavailable(_) => {
                (StatusCode::BAD_REQUEST, ApiResponse::error(self.to_string()))
            }
            // 系统错误: 细节只进日志，不泄漏给调用方
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::error("Database error"),
                )
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::error("Internal server error"),
                )
            }
        };

        (status, Json::<ApiResponse<()>>(body)).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            errors: Vec::new(),
        }
    }

    pub fn validation_with_errors(msg: impl Into<String>, errors: Vec<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            errors,
        }
    }

    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Unified message to prevent email enumeration during login
    pub fn invalid_credentials() -> Self {
        Self::validation("Invalid email or password")
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(err: surrealdb::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// Result type for handlers and services
pub type AppResult<T> = Result<T, AppError>;

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data))
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok_with_message(data, message))
}
