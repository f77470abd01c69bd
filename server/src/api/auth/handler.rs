//! Authentication Handlers
//!
//! Handles registration, login and current-user lookup

use std::time::Duration;

use axum::{Extension, Json, extract::State};
use shared::ApiResponse;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::UserCreate;
use crate::db::repository::UserRepository;
use crate::utils::validation::check_payload;
use crate::utils::{AppError, AppResult, ok, ok_with_message};

// Re-use shared DTOs for API consistency
use shared::client::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/register - 注册账户
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    check_payload(&req)?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .create(UserCreate {
            name: req.name,
            email: req.email,
            password: req.password,
            role: req.role.unwrap_or_default(),
        })
        .await?;

    tracing::info!(email = %user.email, role = %user.role, "User registered");

    Ok(ok_with_message(user.to_info(), "Registered successfully"))
}

/// POST /api/auth/login - 登录
///
/// 统一的错误消息 + 固定延迟，防止邮箱枚举和时间侧信道。
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    check_payload(&req)?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo.find_by_email(&req.email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match user {
        Some(u) => {
            if !u.is_active {
                return Err(AppError::forbidden("Account has been disabled"));
            }

            let password_valid = u
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;

            if !password_valid {
                tracing::warn!(email = %req.email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            u
        }
        None => {
            tracing::warn!(email = %req.email, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let user_id = user.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    let token = state
        .jwt_service
        .generate_token(&user_id, &user.name, &user.email, user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(
        user_id = %user_id,
        email = %user.email,
        role = %user.role,
        "User logged in successfully"
    );

    Ok(ok(LoginResponse {
        token,
        user: user.to_info(),
    }))
}

/// GET /api/auth/me - 当前用户信息
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    // Query fresh user data; the token may outlive account changes
    let repo = UserRepository::new(state.db.clone());
    let fresh = repo
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(ok(fresh.to_info()))
}

/// POST /api/auth/logout - 登出
///
/// 令牌是无状态的，这里只记录审计日志。
pub async fn logout(
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<()>>> {
    tracing::info!(user_id = %user.id, email = %user.email, "User logged out");
    Ok(ok_with_message((), "Logged out successfully"))
}
