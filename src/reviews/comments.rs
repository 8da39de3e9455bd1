/// Comments on reviews
use super::manager::{review_not_found, ReviewManager};
use crate::{
    account::User,
    db::{self, comments::Comment},
    error::{AppError, AppResult},
};
use chrono::Utc;

pub const MAX_COMMENT_CHARS: usize = 2000;
const COMMENT_PAGE: i64 = 100;

impl ReviewManager {
    /// Add a comment and bump the review's comment counter in one transaction
    pub async fn add_comment(&self, review_id: &str, user: &User, content: &str) -> AppResult<Comment> {
        let content = content.trim();
        let len = content.chars().count();
        if len == 0 || len > MAX_COMMENT_CHARS {
            return Err(AppError::Validation(format!(
                "content must be 1 to {} characters",
                MAX_COMMENT_CHARS
            )));
        }

        if !db::reviews::exists(&self.db, review_id).await? {
            return Err(review_not_found());
        }

        let comment = Comment {
            id: db::new_id(),
            review_id: review_id.to_string(),
            author_id: user.id.clone(),
            author_username: user.username.clone(),
            content: content.to_string(),
            created_at: Utc::now(),
        };

        let mut tx = self.db.begin().await?;

        // Review deleted since the existence check
        db::comments::insert(&mut *tx, &comment).await.map_err(|e| {
            if e.is_foreign_key_violation() {
                review_not_found()
            } else {
                e
            }
        })?;
        db::reviews::increment_comments(&mut *tx, review_id).await?;

        tx.commit().await?;

        tracing::debug!("Comment {} added to review {} by {}", comment.id, review_id, user.id);

        Ok(comment)
    }

    /// Most recent comments first
    pub async fn list_comments(&self, review_id: &str) -> AppResult<Vec<Comment>> {
        db::comments::list_for_review(&self.db, review_id, COMMENT_PAGE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::manager::tests::fixture;

    #[tokio::test]
    async fn test_comment_increments_counter() {
        let f = fixture().await;

        let comment = f
            .reviews
            .add_comment(&f.review.id, &f.stranger, "  Great write-up  ")
            .await
            .unwrap();
        assert_eq!(comment.content, "Great write-up");
        assert_eq!(comment.author_username, "stranger");

        f.reviews
            .add_comment(&f.review.id, &f.author, "Thanks!")
            .await
            .unwrap();

        let review = f.reviews.get(&f.review.id).await.unwrap();
        assert_eq!(review.comments_count, 2);
        assert_eq!(
            db::comments::count_for_review(&f.reviews.db, &f.review.id)
                .await
                .unwrap(),
            2
        );

        let listed = f.reviews.list_comments(&f.review.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].content, "Thanks!");
    }

    #[tokio::test]
    async fn test_comment_validation_and_missing_review() {
        let f = fixture().await;

        let empty = f.reviews.add_comment(&f.review.id, &f.author, "   ").await;
        assert!(matches!(empty, Err(AppError::Validation(_))));

        let long = "x".repeat(MAX_COMMENT_CHARS + 1);
        let too_long = f.reviews.add_comment(&f.review.id, &f.author, &long).await;
        assert!(matches!(too_long, Err(AppError::Validation(_))));

        let missing = f.reviews.add_comment("missing", &f.author, "hello").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let review = f.reviews.get(&f.review.id).await.unwrap();
        assert_eq!(review.comments_count, 0);
    }

    #[tokio::test]
    async fn test_delete_cascades_comments_and_likes() {
        let f = fixture().await;
        f.reviews
            .add_comment(&f.review.id, &f.stranger, "first")
            .await
            .unwrap();
        f.reviews.toggle_like(&f.review.id, &f.stranger).await.unwrap();

        f.reviews.delete(&f.review.id, &f.author).await.unwrap();

        assert!(f.reviews.list_comments(&f.review.id).await.unwrap().is_empty());
        assert_eq!(
            db::likes::count_for_review(&f.reviews.db, &f.review.id)
                .await
                .unwrap(),
            0
        );
        assert!(!f.reviews.has_liked(&f.review.id, &f.stranger.id).await.unwrap());
    }
}
