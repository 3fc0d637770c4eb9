//! Competitor tracking endpoints: list, add, remove, and recent posts.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use scriptspy_db::{CompetitorPostRow, CompetitorRow, DbError};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

const MAX_NAME_CHARS: usize = 255;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct CreateCompetitorRequest {
    pub name: String,
    pub handle: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PostsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct CompetitorItem {
    competitor_id: i64,
    name: String,
    handle: String,
    added_at: DateTime<Utc>,
    last_checked_at: Option<DateTime<Utc>>,
}

impl From<CompetitorRow> for CompetitorItem {
    fn from(row: CompetitorRow) -> Self {
        Self {
            competitor_id: row.id,
            name: row.name,
            handle: row.handle,
            added_at: row.added_at,
            last_checked_at: row.last_checked_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CompetitorPostItem {
    post_id: i64,
    post_url: String,
    caption: Option<String>,
    post_type: Option<String>,
    posted_at: Option<DateTime<Utc>>,
    detected_at: DateTime<Utc>,
    is_new: bool,
}

impl From<CompetitorPostRow> for CompetitorPostItem {
    fn from(row: CompetitorPostRow) -> Self {
        Self {
            post_id: row.id,
            post_url: row.post_url,
            caption: row.caption,
            post_type: row.post_type,
            posted_at: row.posted_at,
            detected_at: row.detected_at,
            is_new: row.is_new,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn map_competitor_error(req_id: &str, e: &DbError) -> ApiError {
    if matches!(e, DbError::NotFound) {
        return ApiError::new(req_id, "not_found", "competitor not found");
    }
    if e.is_unique_violation() {
        return ApiError::new(
            req_id,
            "conflict",
            "a competitor with that handle is already tracked",
        );
    }
    map_db_error(req_id.to_owned(), e)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/competitors
pub(super) async fn list_competitors(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<CompetitorItem>>>, ApiError> {
    let rows = scriptspy_db::list_competitors(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(CompetitorItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/competitors: start tracking a handle.
pub(super) async fn create_competitor(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateCompetitorRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CompetitorItem>>), ApiError> {
    let rid = &req_id.0;

    let name = body.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("name must be 1-{MAX_NAME_CHARS} characters"),
        ));
    }
    let handle = scriptspy_core::competitors::validate_handle(&body.handle)
        .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?;

    let row = scriptspy_db::create_competitor(&state.pool, name, &handle)
        .await
        .map_err(|e| map_competitor_error(rid, &e))?;
    tracing::info!(competitor = %row.handle, "competitor added");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: CompetitorItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// DELETE /api/v1/competitors/{id}: stop tracking; stored posts go with it.
pub(super) async fn delete_competitor(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    scriptspy_db::delete_competitor(&state.pool, id)
        .await
        .map_err(|e| map_competitor_error(&req_id.0, &e))?;
    tracing::info!(competitor_id = id, "competitor removed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/competitors/{id}/posts: most recent posts first.
pub(super) async fn list_competitor_posts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Query(query): Query<PostsQuery>,
) -> Result<Json<ApiResponse<Vec<CompetitorPostItem>>>, ApiError> {
    let rid = &req_id.0;
    let competitor = scriptspy_db::get_competitor(&state.pool, id)
        .await
        .map_err(|e| map_competitor_error(rid, &e))?;

    let rows =
        scriptspy_db::list_competitor_posts(&state.pool, competitor.id, normalize_limit(query.limit))
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(CompetitorPostItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
