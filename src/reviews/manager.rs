/// Review manager: create, edit, list, collaborate and cascade-delete reviews
use crate::{
    account::User,
    db::{
        self,
        reviews::{ReviewFields, ReviewRow},
        Page,
    },
    error::{AppError, AppResult},
    reviews::{permissions, CreateReviewRequest, Review, ReviewPatch},
};
use chrono::Utc;
use sqlx::{types::Json, SqlitePool};
use validator::Validate;

/// Review manager service
#[derive(Clone)]
pub struct ReviewManager {
    pub(super) db: SqlitePool,
}

pub(super) fn review_not_found() -> AppError {
    AppError::NotFound("Review not found".to_string())
}

impl ReviewManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a review owned by `author`
    pub async fn create(&self, author: &User, req: CreateReviewRequest) -> AppResult<Review> {
        let req = req.normalized();
        req.validate()?;

        let now = Utc::now();

        let row = ReviewRow {
            id: db::new_id(),
            title: req.title,
            content: req.content,
            game_name: req.game_name,
            category: req.category,
            tags: Json(req.tags),
            rating: req.rating,
            cover_image: req.cover_image,
            author_id: author.id.clone(),
            author_username: author.username.clone(),
            collaborator_ids: Json(Vec::new()),
            likes_count: 0,
            comments_count: 0,
            created_at: now,
            updated_at: now,
        };

        db::reviews::insert(&self.db, &row).await?;

        tracing::info!(
            "Review {} created by {} for {}",
            row.id,
            author.id,
            row.game_name
        );

        Ok(row.into())
    }

    /// Fetch one review
    pub async fn get(&self, id: &str) -> AppResult<Review> {
        db::reviews::find_by_id(&self.db, id)
            .await?
            .map(Review::from)
            .ok_or_else(review_not_found)
    }

    /// Newest reviews, optionally filtered by exact category
    pub async fn list(&self, category: Option<&str>, page: Page) -> AppResult<Vec<Review>> {
        let category = category.filter(|c| !c.is_empty());
        let rows = db::reviews::list(&self.db, category, page).await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Newest reviews written by one user
    pub async fn list_by_author(&self, author_id: &str, page: Page) -> AppResult<Vec<Review>> {
        let rows = db::reviews::list_by_author(&self.db, author_id, page).await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Apply the set fields of `patch`; author or collaborators only
    pub async fn update(&self, id: &str, user: &User, patch: ReviewPatch) -> AppResult<Review> {
        let patch = patch.normalized();
        patch.validate().map_err(AppError::Validation)?;

        let review = self.get(id).await?;
        permissions::ensure_can_edit(user, &review)?;

        let fields = ReviewFields {
            title: patch.title.as_deref(),
            content: patch.content.as_deref(),
            game_name: patch.game_name.as_deref(),
            category: patch.category.as_deref(),
            tags: patch.tags.as_set().map(Vec::as_slice),
            rating: patch.rating.as_set().copied(),
            cover_image: patch.cover_image.as_deref(),
        };

        let mut tx = self.db.begin().await?;

        if db::reviews::update_fields(&mut *tx, id, &fields, Utc::now()).await? == 0 {
            return Err(review_not_found());
        }

        let updated = db::reviews::find_by_id(&mut *tx, id)
            .await?
            .map(Review::from)
            .ok_or_else(review_not_found)?;

        tx.commit().await?;

        tracing::debug!("Review {} updated by {}", id, user.id);

        Ok(updated)
    }

    /// Delete a review together with its likes, comments and collaborator links
    pub async fn delete(&self, id: &str, user: &User) -> AppResult<()> {
        let review = self.get(id).await?;
        permissions::ensure_can_delete(user, &review)?;

        let mut tx = self.db.begin().await?;

        let likes = db::likes::delete_for_review(&mut *tx, id).await?;
        let comments = db::comments::delete_for_review(&mut *tx, id).await?;
        db::reviews::delete_collaborators(&mut *tx, id).await?;

        if db::reviews::delete(&mut *tx, id).await? == 0 {
            return Err(review_not_found());
        }

        tx.commit().await?;

        tracing::info!(
            "Review {} deleted by {} ({} comments, {} likes removed)",
            id,
            user.id,
            comments,
            likes
        );

        Ok(())
    }

    /// Grant edit rights to another user; author only. Returns false if the
    /// user was already a collaborator.
    pub async fn add_collaborator(
        &self,
        id: &str,
        user: &User,
        collaborator_id: &str,
    ) -> AppResult<bool> {
        let review = self.get(id).await?;
        permissions::ensure_can_manage_collaborators(user, &review)?;

        if db::users::find_by_id(&self.db, collaborator_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let added = db::reviews::add_collaborator(&self.db, id, collaborator_id).await?;
        if added {
            tracing::info!("User {} added as collaborator on review {}", collaborator_id, id);
        }

        Ok(added)
    }
}
