/// Like collection; at most one row per (review, user)
use crate::db::{new_id, timestamp};
use crate::error::AppResult;
use chrono::Utc;
use sqlx::{Executor, Sqlite};

/// Insert a like. Fails with a unique violation if the pair already exists.
pub async fn insert<'e, E>(ex: E, review_id: &str, user_id: &str) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO likes (id, review_id, user_id, created_at)
         VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(new_id())
    .bind(review_id)
    .bind(user_id)
    .bind(timestamp(Utc::now()))
    .execute(ex)
    .await?;

    Ok(())
}

/// Remove the like for a pair; returns true if one was removed
pub async fn delete<'e, E>(ex: E, review_id: &str, user_id: &str) -> AppResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM likes WHERE review_id = ?1 AND user_id = ?2")
        .bind(review_id)
        .bind(user_id)
        .execute(ex)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn exists<'e, E>(ex: E, review_id: &str, user_id: &str) -> AppResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE review_id = ?1 AND user_id = ?2")
            .bind(review_id)
            .bind(user_id)
            .fetch_one(ex)
            .await?;

    Ok(count > 0)
}

pub async fn count_for_review<'e, E>(ex: E, review_id: &str) -> AppResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE review_id = ?1")
        .bind(review_id)
        .fetch_one(ex)
        .await?;

    Ok(count)
}

pub async fn delete_for_review<'e, E>(ex: E, review_id: &str) -> AppResult<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM likes WHERE review_id = ?1")
        .bind(review_id)
        .execute(ex)
        .await?;

    Ok(result.rows_affected())
}
