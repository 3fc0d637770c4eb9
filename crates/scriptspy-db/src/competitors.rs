//! Database operations for `competitors` and `competitor_posts`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `competitors` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompetitorRow {
    pub id: i64,
    pub name: String,
    pub handle: String,
    pub added_at: DateTime<Utc>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

/// A row from the `competitor_posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompetitorPostRow {
    pub id: i64,
    pub competitor_id: i64,
    pub post_url: String,
    pub caption: Option<String>,
    pub post_type: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub detected_at: DateTime<Utc>,
    pub is_new: bool,
}

/// A post discovered for a competitor that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompetitorPost {
    pub post_url: String,
    pub caption: Option<String>,
    pub post_type: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub detected_at: DateTime<Utc>,
    pub is_new: bool,
}

const COMPETITOR_COLUMNS: &str = "id, name, handle, added_at, last_checked_at";

const POST_COLUMNS: &str =
    "id, competitor_id, post_url, caption, post_type, posted_at, detected_at, is_new";

// ---------------------------------------------------------------------------
// competitors
// ---------------------------------------------------------------------------

/// Insert a new competitor. The handle must already be normalized.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails; a duplicate handle surfaces
/// as a unique violation (see [`DbError::is_unique_violation`]).
pub async fn create_competitor(
    pool: &PgPool,
    name: &str,
    handle: &str,
) -> Result<CompetitorRow, DbError> {
    let row = sqlx::query_as::<_, CompetitorRow>(&format!(
        "INSERT INTO competitors (name, handle) VALUES ($1, $2) RETURNING {COMPETITOR_COLUMNS}"
    ))
    .bind(name)
    .bind(handle)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// All tracked competitors in the order they were added.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_competitors(pool: &PgPool) -> Result<Vec<CompetitorRow>, DbError> {
    let rows = sqlx::query_as::<_, CompetitorRow>(&format!(
        "SELECT {COMPETITOR_COLUMNS} FROM competitors ORDER BY added_at, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no competitor has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_competitor(pool: &PgPool, id: i64) -> Result<CompetitorRow, DbError> {
    sqlx::query_as::<_, CompetitorRow>(&format!(
        "SELECT {COMPETITOR_COLUMNS} FROM competitors WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Look up a competitor by its normalized handle.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_competitor_by_handle(
    pool: &PgPool,
    handle: &str,
) -> Result<Option<CompetitorRow>, DbError> {
    let row = sqlx::query_as::<_, CompetitorRow>(&format!(
        "SELECT {COMPETITOR_COLUMNS} FROM competitors WHERE handle = $1"
    ))
    .bind(handle)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Delete a competitor and, through the cascade, all of its posts.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no competitor has this id, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_competitor(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM competitors WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// competitor_posts
// ---------------------------------------------------------------------------

/// URLs of every post already stored for a competitor.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_competitor_post_urls(
    pool: &PgPool,
    competitor_id: i64,
) -> Result<Vec<String>, DbError> {
    let urls = sqlx::query_scalar::<_, String>(
        "SELECT post_url FROM competitor_posts WHERE competitor_id = $1",
    )
    .bind(competitor_id)
    .fetch_all(pool)
    .await?;

    Ok(urls)
}

/// Persist the outcome of one competitor check in a single transaction.
///
/// Inserts each post with `ON CONFLICT (post_url) DO NOTHING`, so a URL
/// already stored (for any competitor) is skipped, then sets
/// `last_checked_at`. Only rows that were actually inserted are returned.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the competitor no longer exists, or
/// [`DbError::Sqlx`] if any statement or the commit fails. Nothing is
/// persisted in either case.
pub async fn record_competitor_check(
    pool: &PgPool,
    competitor_id: i64,
    posts: &[NewCompetitorPost],
    checked_at: DateTime<Utc>,
) -> Result<Vec<CompetitorPostRow>, DbError> {
    let mut tx = pool.begin().await?;
    let mut inserted = Vec::new();

    for post in posts {
        let row = sqlx::query_as::<_, CompetitorPostRow>(&format!(
            "INSERT INTO competitor_posts \
                 (competitor_id, post_url, caption, post_type, posted_at, detected_at, is_new) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (post_url) DO NOTHING \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(competitor_id)
        .bind(&post.post_url)
        .bind(post.caption.as_deref())
        .bind(post.post_type.as_deref())
        .bind(post.posted_at)
        .bind(post.detected_at)
        .bind(post.is_new)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = row {
            inserted.push(row);
        }
    }

    let result = sqlx::query("UPDATE competitors SET last_checked_at = $1 WHERE id = $2")
        .bind(checked_at)
        .bind(competitor_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Posts for a competitor, most recently posted first. Posts without a
/// `posted_at` sort last, then by detection time.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_competitor_posts(
    pool: &PgPool,
    competitor_id: i64,
    limit: i64,
) -> Result<Vec<CompetitorPostRow>, DbError> {
    let rows = sqlx::query_as::<_, CompetitorPostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM competitor_posts \
         WHERE competitor_id = $1 \
         ORDER BY posted_at DESC NULLS LAST, detected_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(competitor_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_competitor_posts(pool: &PgPool, competitor_id: i64) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM competitor_posts WHERE competitor_id = $1",
    )
    .bind(competitor_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
