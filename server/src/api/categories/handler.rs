//! Menu Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::ApiResponse;

use crate::core::ServerState;
use crate::db::models::{MenuCategory, MenuCategoryCreate, MenuCategoryUpdate};
use crate::db::repository::CategoryRepository;
use crate::utils::validation::{
    MAX_CATEGORY_NAME_LEN, MAX_DESCRIPTION_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppResult, ok, ok_with_message};

/// GET /api/menu/categories - 获取所有启用分类
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<MenuCategory>>>> {
    let repo = CategoryRepository::new(state.db.clone());
    let categories = repo.find_all_active().await?;
    Ok(ok(categories))
}

/// POST /api/menu/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuCategoryCreate>,
) -> AppResult<Json<ApiResponse<MenuCategory>>> {
    validate_required_text(&payload.name, "name", MAX_CATEGORY_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;

    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.create(payload).await?;
    Ok(ok_with_message(category, "Category created successfully"))
}

/// PUT /api/menu/categories/:id - 更新分类
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MenuCategoryUpdate>,
) -> AppResult<Json<ApiResponse<MenuCategory>>> {
    if let Some(ref name) = payload.name {
        validate_required_text(name, "name", MAX_CATEGORY_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;

    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.update(&id, payload).await?;
    Ok(ok_with_message(category, "Category updated successfully"))
}

/// DELETE /api/menu/categories/:id - 删除分类
///
/// 分类下仍有菜品时拒绝删除。
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let repo = CategoryRepository::new(state.db.clone());
    let result = repo.delete(&id).await?;
    Ok(ok_with_message(result, "Category deleted successfully"))
}
