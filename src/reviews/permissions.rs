/// Ownership and collaborator rules for review mutations
use crate::{
    account::User,
    error::{AppError, AppResult},
    reviews::Review,
};

/// Author or any listed collaborator may edit content
pub fn can_edit_review(user: &User, review: &Review) -> bool {
    user.id == review.author_id || review.collaborator_ids.iter().any(|id| *id == user.id)
}

/// Only the author may delete
pub fn can_delete_review(user: &User, review: &Review) -> bool {
    user.id == review.author_id
}

/// Only the author may change the collaborator set
pub fn can_manage_collaborators(user: &User, review: &Review) -> bool {
    user.id == review.author_id
}

pub fn ensure_can_edit(user: &User, review: &Review) -> AppResult<()> {
    if can_edit_review(user, review) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Not authorized to edit this review".to_string(),
        ))
    }
}

pub fn ensure_can_delete(user: &User, review: &Review) -> AppResult<()> {
    if can_delete_review(user, review) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Not authorized to delete this review".to_string(),
        ))
    }
}

pub fn ensure_can_manage_collaborators(user: &User, review: &Review) -> AppResult<()> {
    if can_manage_collaborators(user, review) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author can add collaborators".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            username: id.to_string(),
            bio: None,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    fn review() -> Review {
        Review {
            id: "review".to_string(),
            title: "Title".to_string(),
            content: "Content".to_string(),
            game_name: "Outer Wilds".to_string(),
            category: "Macera".to_string(),
            tags: vec![],
            rating: Some(10),
            cover_image: None,
            author_id: "author".to_string(),
            author_username: "author".to_string(),
            collaborator_ids: vec!["collab".to_string()],
            likes_count: 0,
            comments_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_author_has_every_right() {
        let (author, review) = (user("author"), review());
        assert!(can_edit_review(&author, &review));
        assert!(can_delete_review(&author, &review));
        assert!(can_manage_collaborators(&author, &review));
    }

    #[test]
    fn test_collaborator_can_only_edit() {
        let (collab, review) = (user("collab"), review());
        assert!(can_edit_review(&collab, &review));
        assert!(!can_delete_review(&collab, &review));
        assert!(!can_manage_collaborators(&collab, &review));
    }

    #[test]
    fn test_stranger_has_no_rights() {
        let (stranger, review) = (user("stranger"), review());
        assert!(!can_edit_review(&stranger, &review));
        assert!(!can_delete_review(&stranger, &review));
        assert!(!can_manage_collaborators(&stranger, &review));
        assert!(matches!(
            ensure_can_edit(&stranger, &review),
            Err(AppError::Forbidden(_))
        ));
    }
}
