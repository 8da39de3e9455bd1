/// Comment collection
use crate::db::timestamp;
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite};

/// Comment record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub review_id: String,
    pub author_id: String,
    /// Username at the time the comment was written
    pub author_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

pub async fn insert<'e, E>(ex: E, comment: &Comment) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO comments (id, review_id, author_id, author_username, content, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(&comment.id)
    .bind(&comment.review_id)
    .bind(&comment.author_id)
    .bind(&comment.author_username)
    .bind(&comment.content)
    .bind(timestamp(comment.created_at))
    .execute(ex)
    .await?;

    Ok(())
}

/// Most recent comments on a review
pub async fn list_for_review<'e, E>(ex: E, review_id: &str, limit: i64) -> AppResult<Vec<Comment>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let comments = sqlx::query_as::<_, Comment>(
        "SELECT id, review_id, author_id, author_username, content, created_at
         FROM comments
         WHERE review_id = ?1
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?2",
    )
    .bind(review_id)
    .bind(limit)
    .fetch_all(ex)
    .await?;

    Ok(comments)
}

pub async fn count_for_review<'e, E>(ex: E, review_id: &str) -> AppResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = ?1")
        .bind(review_id)
        .fetch_one(ex)
        .await?;

    Ok(count)
}

pub async fn delete_for_review<'e, E>(ex: E, review_id: &str) -> AppResult<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM comments WHERE review_id = ?1")
        .bind(review_id)
        .execute(ex)
        .await?;

    Ok(result.rows_affected())
}
