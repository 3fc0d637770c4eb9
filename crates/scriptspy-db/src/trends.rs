//! Database operations for the `trends` table.

use chrono::{DateTime, Utc};
use scriptspy_core::{NewTrend, TrendSource};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `trends` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendRow {
    pub id: i64,
    /// One of `search`, `news`, `discussion` (enforced by a CHECK constraint).
    pub source: String,
    pub topic: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub relevance_score: Option<f64>,
    pub fetched_at: DateTime<Utc>,
    pub tags: Option<String>,
}

/// Insert a batch of trends in a single transaction.
///
/// Rows come back in input order with their assigned ids. If any insert
/// fails the transaction is dropped without commit, so nothing from the
/// batch is persisted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert or the commit fails.
pub async fn insert_trends(pool: &PgPool, trends: &[NewTrend]) -> Result<Vec<TrendRow>, DbError> {
    if trends.is_empty() {
        return Ok(Vec::new());
    }

    let mut tx = pool.begin().await?;
    let mut rows = Vec::with_capacity(trends.len());

    for trend in trends {
        let row = sqlx::query_as::<_, TrendRow>(
            "INSERT INTO trends \
                 (source, topic, description, url, relevance_score, fetched_at, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, source, topic, description, url, relevance_score, fetched_at, tags",
        )
        .bind(trend.source.as_str())
        .bind(&trend.topic)
        .bind(trend.description.as_deref())
        .bind(trend.url.as_deref())
        .bind(trend.relevance_score)
        .bind(trend.fetched_at)
        .bind(trend.tags.as_deref())
        .fetch_one(&mut *tx)
        .await?;
        rows.push(row);
    }

    tx.commit().await?;
    Ok(rows)
}

/// List trends newest first, optionally filtered by source.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_trends(
    pool: &PgPool,
    source: Option<TrendSource>,
    limit: i64,
) -> Result<Vec<TrendRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendRow>(
        "SELECT id, source, topic, description, url, relevance_score, fetched_at, tags \
         FROM trends \
         WHERE ($1::text IS NULL OR source = $1) \
         ORDER BY fetched_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(source.map(TrendSource::as_str))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Total number of persisted trends.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_trends(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trends")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
