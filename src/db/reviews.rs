/// Review collection and its collaborator set
use crate::db::{fold_case, timestamp, Page};
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use sqlx::{types::Json, Executor, FromRow, Sqlite};

/// Review row with the collaborator set folded in
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub game_name: String,
    pub category: String,
    pub tags: Json<Vec<String>>,
    pub rating: Option<i32>,
    pub cover_image: Option<String>,
    pub author_id: String,
    pub author_username: String,
    pub collaborator_ids: Json<Vec<String>>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content fields written on create and on patch
#[derive(Debug, Clone, Default)]
pub struct ReviewFields<'a> {
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
    pub game_name: Option<&'a str>,
    pub category: Option<&'a str>,
    pub tags: Option<&'a [String]>,
    pub rating: Option<i32>,
    pub cover_image: Option<&'a str>,
}

/// Minimal projection used by the popularity fold
#[derive(Debug, Clone, FromRow)]
pub struct PopularityRow {
    pub game_name: String,
    pub likes_count: i64,
    pub rating: Option<i32>,
    pub cover_image: Option<String>,
}

const REVIEW_SELECT: &str = "SELECT r.id, r.title, r.content, r.game_name, r.category, r.tags,
        r.rating, r.cover_image, r.author_id, r.author_username,
        (SELECT json_group_array(c.user_id) FROM review_collaborators c
         WHERE c.review_id = r.id) AS collaborator_ids,
        r.likes_count, r.comments_count, r.created_at, r.updated_at
    FROM reviews r";

const NEWEST_FIRST: &str = "ORDER BY r.created_at DESC, r.rowid DESC";

pub async fn insert<'e, E>(ex: E, review: &ReviewRow) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO reviews (id, title, content, game_name, category, tags, rating, cover_image,
                              author_id, author_username, likes_count, comments_count,
                              created_at, updated_at,
                              title_folded, game_name_folded, author_username_folded)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
    )
    .bind(&review.id)
    .bind(&review.title)
    .bind(&review.content)
    .bind(&review.game_name)
    .bind(&review.category)
    .bind(Json(&review.tags.0))
    .bind(review.rating)
    .bind(&review.cover_image)
    .bind(&review.author_id)
    .bind(&review.author_username)
    .bind(review.likes_count)
    .bind(review.comments_count)
    .bind(timestamp(review.created_at))
    .bind(timestamp(review.updated_at))
    .bind(fold_case(&review.title))
    .bind(fold_case(&review.game_name))
    .bind(fold_case(&review.author_username))
    .execute(ex)
    .await?;

    Ok(())
}

pub async fn find_by_id<'e, E>(ex: E, id: &str) -> AppResult<Option<ReviewRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, ReviewRow>(&format!("{} WHERE r.id = ?1", REVIEW_SELECT))
        .bind(id)
        .fetch_optional(ex)
        .await?;

    Ok(row)
}

pub async fn exists<'e, E>(ex: E, id: &str) -> AppResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE id = ?1")
        .bind(id)
        .fetch_one(ex)
        .await?;

    Ok(count > 0)
}

/// Newest first, optionally restricted to one category
pub async fn list<'e, E>(ex: E, category: Option<&str>, page: Page) -> AppResult<Vec<ReviewRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, ReviewRow>(&format!(
        "{} WHERE (?1 IS NULL OR r.category = ?1) {} LIMIT ?2 OFFSET ?3",
        REVIEW_SELECT, NEWEST_FIRST
    ))
    .bind(category)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(ex)
    .await?;

    Ok(rows)
}

pub async fn list_by_author<'e, E>(ex: E, author_id: &str, page: Page) -> AppResult<Vec<ReviewRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, ReviewRow>(&format!(
        "{} WHERE r.author_id = ?1 {} LIMIT ?2 OFFSET ?3",
        REVIEW_SELECT, NEWEST_FIRST
    ))
    .bind(author_id)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(ex)
    .await?;

    Ok(rows)
}

/// Substring match over the folded title, game name and author username.
/// `pattern` must already be folded with [`fold_case`].
pub async fn search<'e, E>(ex: E, pattern: &str, page: Page) -> AppResult<Vec<ReviewRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, ReviewRow>(&format!(
        "{} WHERE r.title_folded LIKE ?1 ESCAPE '\\'
            OR r.game_name_folded LIKE ?1 ESCAPE '\\'
            OR r.author_username_folded LIKE ?1 ESCAPE '\\'
         {} LIMIT ?2 OFFSET ?3",
        REVIEW_SELECT, NEWEST_FIRST
    ))
    .bind(pattern)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(ex)
    .await?;

    Ok(rows)
}

/// Write the provided content fields and bump `updated_at`
pub async fn update_fields<'e, E>(
    ex: E,
    id: &str,
    fields: &ReviewFields<'_>,
    updated_at: DateTime<Utc>,
) -> AppResult<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE reviews
         SET title = COALESCE(?1, title),
             content = COALESCE(?2, content),
             game_name = COALESCE(?3, game_name),
             category = COALESCE(?4, category),
             tags = COALESCE(?5, tags),
             rating = COALESCE(?6, rating),
             cover_image = COALESCE(?7, cover_image),
             updated_at = ?8,
             title_folded = COALESCE(?10, title_folded),
             game_name_folded = COALESCE(?11, game_name_folded)
         WHERE id = ?9",
    )
    .bind(fields.title)
    .bind(fields.content)
    .bind(fields.game_name)
    .bind(fields.category)
    .bind(fields.tags.map(Json))
    .bind(fields.rating)
    .bind(fields.cover_image)
    .bind(timestamp(updated_at))
    .bind(id)
    .bind(fields.title.map(fold_case))
    .bind(fields.game_name.map(fold_case))
    .execute(ex)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete<'e, E>(ex: E, id: &str) -> AppResult<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM reviews WHERE id = ?1")
        .bind(id)
        .execute(ex)
        .await?;

    Ok(result.rows_affected())
}

/// Atomic `likes_count += delta`
pub async fn adjust_likes<'e, E>(ex: E, id: &str, delta: i64) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE reviews SET likes_count = likes_count + ?1 WHERE id = ?2")
        .bind(delta)
        .bind(id)
        .execute(ex)
        .await?;

    Ok(())
}

/// Atomic `comments_count += 1`
pub async fn increment_comments<'e, E>(ex: E, id: &str) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE reviews SET comments_count = comments_count + 1 WHERE id = ?1")
        .bind(id)
        .execute(ex)
        .await?;

    Ok(())
}

/// Add a collaborator; returns false when already present
pub async fn add_collaborator<'e, E>(ex: E, review_id: &str, user_id: &str) -> AppResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "INSERT OR IGNORE INTO review_collaborators (review_id, user_id, added_at)
         VALUES (?1, ?2, ?3)",
    )
    .bind(review_id)
    .bind(user_id)
    .bind(timestamp(Utc::now()))
    .execute(ex)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn delete_collaborators<'e, E>(ex: E, review_id: &str) -> AppResult<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM review_collaborators WHERE review_id = ?1")
        .bind(review_id)
        .execute(ex)
        .await?;

    Ok(result.rows_affected())
}

/// Stream every review in insertion order through `f`
pub async fn for_each_popularity_row<'e, E, F>(ex: E, mut f: F) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
    F: FnMut(PopularityRow),
{
    let mut rows = sqlx::query_as::<_, PopularityRow>(
        "SELECT game_name, likes_count, rating, cover_image FROM reviews ORDER BY rowid ASC",
    )
    .fetch(ex);

    while let Some(row) = rows.try_next().await? {
        f(row);
    }

    Ok(())
}
