use std::str::FromStr;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use scriptspy_core::TrendSource;
use scriptspy_db::TrendRow;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct TrendQuery {
    pub source: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct TrendItem {
    trend_id: i64,
    source: String,
    topic: String,
    description: Option<String>,
    url: Option<String>,
    relevance_score: Option<f64>,
    fetched_at: DateTime<Utc>,
    tags: Option<String>,
}

impl From<TrendRow> for TrendItem {
    fn from(row: TrendRow) -> Self {
        Self {
            trend_id: row.id,
            source: row.source,
            topic: row.topic,
            description: row.description,
            url: row.url,
            relevance_score: row.relevance_score,
            fetched_at: row.fetched_at,
            tags: row.tags,
        }
    }
}

/// GET /api/v1/trends: newest first, optionally filtered by source.
pub(super) async fn list_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<ApiResponse<Vec<TrendItem>>>, ApiError> {
    let source = match query.source.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            TrendSource::from_str(raw)
                .map_err(|e| ApiError::new(&req_id.0, "validation_error", e.to_string()))?,
        ),
    };

    let rows = scriptspy_db::list_trends(&state.pool, source, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(TrendItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
