//! Menu Item API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::request::PaginationQuery;
use shared::{ApiResponse, PaginatedResponse};

use crate::core::ServerState;
use crate::db::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use crate::db::repository::menu_item::{ItemSort, MenuItemFilter};
use crate::db::repository::{CategoryRepository, MenuItemRepository};
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_ITEM_NAME_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResult, ok, ok_with_message};

/// Query params for item listing
///
/// 分页参数单独一个 extractor，serde_urlencoded 不支持 flatten 数值字段。
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    /// Comma-separated, any-match
    pub tags: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// "true" (default) limits to available items; "false" shows everything
    pub availability: Option<String>,
    /// name | price-asc | price-desc | popularity
    pub sort: Option<String>,
}

/// GET /api/menu/items - 菜品列表 (过滤 + 搜索 + 分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<MenuItem>>>> {
    let filter = MenuItemFilter {
        search: query.search.filter(|s| !s.trim().is_empty()),
        category: query.category.filter(|c| !c.is_empty()),
        tags: query
            .tags
            .map(|t| {
                t.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        min_price: query.min_price,
        max_price: query.max_price,
        available_only: query.availability.as_deref() != Some("false"),
        sort: ItemSort::parse(query.sort.as_deref().unwrap_or("name")),
    };

    let repo = MenuItemRepository::new(state.db.clone());
    let (items, total) = repo
        .list(&filter, pagination.limit(), pagination.offset())
        .await?;

    Ok(ok(PaginatedResponse::new(
        items,
        pagination.page,
        pagination.limit(),
        total,
    )))
}

/// GET /api/menu/items/:id - 获取单个菜品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let repo = MenuItemRepository::new(state.db.clone());
    let item = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Menu item not found"))?;
    Ok(ok(item))
}

/// POST /api/menu/items - 创建菜品
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<MenuItemCreate>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    validate_payload(&payload.name, &payload.description, payload.price)?;
    // 未指定备餐时间时使用配置默认值
    payload.preparation_time = payload
        .preparation_time
        .or(Some(state.config.default_preparation_time));

    let repo = MenuItemRepository::new(state.db.clone());
    let item = repo.create(payload).await?;
    Ok(ok_with_message(item, "Menu item created successfully"))
}

/// PUT /api/menu/items/:id - 更新菜品
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    if let Some(ref name) = payload.name {
        validate_required_text(name, "name", MAX_ITEM_NAME_LEN)?;
    }
    if let Some(ref description) = payload.description {
        validate_required_text(description, "description", MAX_DESCRIPTION_LEN)?;
    }
    if let Some(price) = payload.price
        && price < Decimal::ZERO
    {
        return Err(AppError::validation("Price must be a non-negative number"));
    }

    let repo = MenuItemRepository::new(state.db.clone());
    let item = repo.update(&id, payload).await?;
    Ok(ok_with_message(item, "Menu item updated successfully"))
}

/// DELETE /api/menu/items/:id - 删除菜品
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let repo = MenuItemRepository::new(state.db.clone());
    let result = repo.delete(&id).await?;
    Ok(ok_with_message(result, "Menu item deleted successfully"))
}

/// PATCH /api/menu/items/:id/toggle-availability - 上下架开关
pub async fn toggle_availability(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let repo = MenuItemRepository::new(state.db.clone());
    let item = repo.toggle_availability(&id).await?;
    let message = if item.availability {
        "Item enabled successfully"
    } else {
        "Item disabled successfully"
    };
    Ok(ok_with_message(item, message))
}

// ============================================================================
// Analytics
// ============================================================================

/// Popular item entry
#[derive(Debug, Serialize)]
pub struct PopularItem {
    pub name: String,
    pub popularity_score: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Menu analytics response
#[derive(Debug, Serialize)]
pub struct MenuAnalytics {
    pub total_items: i64,
    pub available_items: i64,
    pub total_categories: i64,
    pub popular_items: Vec<PopularItem>,
}

/// GET /api/menu/analytics - 菜单统计
pub async fn analytics(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<MenuAnalytics>>> {
    let items = MenuItemRepository::new(state.db.clone());
    let categories = CategoryRepository::new(state.db.clone());

    let (total_items, available_items, total_categories, popular) = tokio::try_join!(
        items.count_all(),
        items.count_available(),
        categories.count_active(),
        items.top_popular(5),
    )?;

    Ok(ok(MenuAnalytics {
        total_items,
        available_items,
        total_categories,
        popular_items: popular
            .into_iter()
            .map(|i| PopularItem {
                name: i.name,
                popularity_score: i.popularity_score,
                price: i.price,
            })
            .collect(),
    }))
}

fn validate_payload(name: &str, description: &str, price: Decimal) -> AppResult<()> {
    validate_required_text(name, "name", MAX_ITEM_NAME_LEN)?;
    validate_required_text(description, "description", MAX_DESCRIPTION_LEN)?;
    if price < Decimal::ZERO {
        return Err(AppError::validation("Price must be a non-negative number"));
    }
    Ok(())
}
