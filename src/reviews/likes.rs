/// Like toggling with counter maintenance
use super::manager::{review_not_found, ReviewManager};
use crate::{
    account::User,
    db,
    error::{AppError, AppResult},
};
use serde::Serialize;

/// Outcome of a like toggle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikeToggle {
    pub liked: bool,
    pub message: String,
}

impl ReviewManager {
    /// Flip the caller's like on a review.
    ///
    /// The delete runs first so an existing like is removed without a prior
    /// read. The (review, user) UNIQUE constraint rejects a racing duplicate
    /// insert instead of letting the counter drift.
    pub async fn toggle_like(&self, review_id: &str, user: &User) -> AppResult<LikeToggle> {
        if !db::reviews::exists(&self.db, review_id).await? {
            return Err(review_not_found());
        }

        let mut tx = self.db.begin().await?;

        let liked = if db::likes::delete(&mut *tx, review_id, &user.id).await? {
            db::reviews::adjust_likes(&mut *tx, review_id, -1).await?;
            false
        } else {
            db::likes::insert(&mut *tx, review_id, &user.id)
                .await
                .map_err(|e| {
                    if e.is_unique_violation() {
                        AppError::Conflict("Like already recorded".to_string())
                    } else if e.is_foreign_key_violation() {
                        review_not_found()
                    } else {
                        e
                    }
                })?;
            db::reviews::adjust_likes(&mut *tx, review_id, 1).await?;
            true
        };

        tx.commit().await?;

        tracing::debug!(
            "User {} {} review {}",
            user.id,
            if liked { "liked" } else { "unliked" },
            review_id
        );

        Ok(LikeToggle {
            liked,
            message: if liked { "Review liked" } else { "Like removed" }.to_string(),
        })
    }

    pub async fn has_liked(&self, review_id: &str, user_id: &str) -> AppResult<bool> {
        db::likes::exists(&self.db, review_id, user_id).await
    }
}
