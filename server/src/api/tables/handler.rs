//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::request::PaginationQuery;
use shared::{ApiResponse, PaginatedResponse};

use crate::core::ServerState;
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use crate::db::repository::DiningTableRepository;
use crate::utils::validation::{
    MAX_LOCATION_LEN, MAX_TABLE_NUMBER_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ok, ok_with_message, qr};

/// GET /api/tables/by-slug/:slug - 扫码解析桌台 (公开)
///
/// 只返回启用中的桌台；停用与不存在不可区分。
pub async fn get_by_slug(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::not_found("Table not found or inactive"))?;
    Ok(ok(table))
}

/// Query params for table listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// "true" / "false"
    pub active: Option<String>,
}

/// GET /api/tables - 桌台列表
pub async fn list(
    State(state): State<ServerState>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<DiningTable>>>> {
    let active = query.active.as_deref().map(|v| v == "true");

    let repo = DiningTableRepository::new(state.db.clone());
    let (tables, total) = repo
        .list(active, pagination.limit(), pagination.offset())
        .await?;

    Ok(ok(PaginatedResponse::new(
        tables,
        pagination.page,
        pagination.limit(),
        total,
    )))
}

/// GET /api/tables/:id - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Table not found"))?;
    Ok(ok(table))
}

/// POST /api/tables - 创建桌台 (slug 在此一次性生成)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    validate_required_text(&payload.number, "number", MAX_TABLE_NUMBER_LEN)?;
    validate_optional_text(&payload.location, "location", MAX_LOCATION_LEN)?;

    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo.create(payload).await?;
    Ok(ok_with_message(table, "Table created successfully"))
}

/// PUT /api/tables/:id - 更新桌台 (slug 永不变更)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    if let Some(ref number) = payload.number {
        validate_required_text(number, "number", MAX_TABLE_NUMBER_LEN)?;
    }
    validate_optional_text(&payload.location, "location", MAX_LOCATION_LEN)?;

    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo.update(&id, payload).await?;
    Ok(ok_with_message(table, "Table updated successfully"))
}

/// DELETE /api/tables/:id - 删除桌台
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let result = repo.delete(&id).await?;
    Ok(ok_with_message(result, "Table deleted successfully"))
}

/// PATCH /api/tables/:id/toggle-status - 启用/停用
pub async fn toggle_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo.toggle_status(&id).await?;
    let message = if table.is_active {
        "Table activated successfully"
    } else {
        "Table deactivated successfully"
    };
    Ok(ok_with_message(table, message))
}

// ============================================================================
// QR code generation
// ============================================================================

/// Per-table QR payload
#[derive(Debug, Serialize)]
pub struct TableQr {
    /// Record id ("dining_table:xxx")
    pub table_id: String,
    pub table_number: String,
    pub qr_slug: String,
    /// The URL embedded in the QR code
    pub qr_url: String,
    /// PNG data URL
    pub qr_code: String,
}

fn render_table_qr(frontend_url: &str, table: &DiningTable) -> AppResult<TableQr> {
    let qr_url = qr::table_url(frontend_url, &table.qr_slug);
    let qr_code = qr::render_data_url(&qr_url)?;
    Ok(TableQr {
        table_id: table.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        table_number: table.number.clone(),
        qr_slug: table.qr_slug.clone(),
        qr_url,
        qr_code,
    })
}

/// GET /api/tables/:id/qr - 生成单桌二维码
pub async fn generate_qr(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<TableQr>>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Table not found"))?;

    Ok(ok(render_table_qr(&state.config.frontend_url, &table)?))
}

/// GET /api/tables/qr/bulk-generate - 批量生成所有启用桌台的二维码
pub async fn bulk_generate_qr(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<TableQr>>>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let tables = repo.find_all_active().await?;

    let qr_codes = tables
        .iter()
        .map(|t| render_table_qr(&state.config.frontend_url, t))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ok(qr_codes))
}
