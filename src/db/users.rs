/// User collection
use crate::db::{fold_case, timestamp};
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use sqlx::{Executor, FromRow, Sqlite};

/// User row, including the password hash
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, email, username, password_hash, bio, avatar_url, created_at";

pub async fn insert<'e, E>(ex: E, user: &UserRecord) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO users (id, email, username, password_hash, bio, avatar_url, created_at,
                            username_folded)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.bio)
    .bind(&user.avatar_url)
    .bind(timestamp(user.created_at))
    .bind(fold_case(&user.username))
    .execute(ex)
    .await?;

    Ok(())
}

pub async fn find_by_id<'e, E>(ex: E, id: &str) -> AppResult<Option<UserRecord>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let user = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users WHERE id = ?1",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(ex)
    .await?;

    Ok(user)
}

pub async fn find_by_email<'e, E>(ex: E, email: &str) -> AppResult<Option<UserRecord>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let user = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users WHERE email = ?1",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(ex)
    .await?;

    Ok(user)
}

/// True if any user holds this email or this username
pub async fn email_or_username_taken<'e, E>(ex: E, email: &str, username: &str) -> AppResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?1 OR username = ?2")
            .bind(email)
            .bind(username)
            .fetch_one(ex)
            .await?;

    Ok(count > 0)
}

/// True if a user other than `except_id` holds this username
pub async fn username_taken_by_other<'e, E>(ex: E, username: &str, except_id: &str) -> AppResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?1 AND id != ?2")
            .bind(username)
            .bind(except_id)
            .fetch_one(ex)
            .await?;

    Ok(count > 0)
}

/// Overwrite only the provided profile fields
pub async fn update_profile<'e, E>(
    ex: E,
    id: &str,
    username: Option<&str>,
    bio: Option<&str>,
    avatar_url: Option<&str>,
) -> AppResult<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE users
         SET username = COALESCE(?1, username),
             username_folded = COALESCE(?5, username_folded),
             bio = COALESCE(?2, bio),
             avatar_url = COALESCE(?3, avatar_url)
         WHERE id = ?4",
    )
    .bind(username)
    .bind(bio)
    .bind(avatar_url)
    .bind(id)
    .bind(username.map(fold_case))
    .execute(ex)
    .await?;

    Ok(result.rows_affected())
}

/// Username substring search against the folded column; `pattern` must
/// already be folded
pub async fn search_by_username<'e, E>(ex: E, pattern: &str, limit: i64) -> AppResult<Vec<UserRecord>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let users = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users
         WHERE username_folded LIKE ?1 ESCAPE '\\'
         ORDER BY username ASC
         LIMIT ?2",
        USER_COLUMNS
    ))
    .bind(pattern)
    .bind(limit)
    .fetch_all(ex)
    .await?;

    Ok(users)
}
