/// Review lifecycle: creation, edits, collaboration, comments, likes and
/// cascading deletion.

mod comments;
mod likes;
pub(crate) mod manager;
pub mod permissions;

pub use likes::LikeToggle;
pub use manager::ReviewManager;

use crate::{db::reviews::ReviewRow, patch::Patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Fixed category list offered to clients
pub const CATEGORIES: &[&str] = &[
    "Aksiyon",
    "RPG",
    "Strateji",
    "Macera",
    "Korku",
    "Simülasyon",
    "Spor",
    "Yarış",
    "Bulmaca",
    "FPS",
    "MOBA",
    "Battle Royale",
    "Platform",
    "Metroidvania",
    "Rogue-like",
    "Sandbox",
    "Survival",
    "Indie",
    "MMORPG",
    "Fighting",
    "Rhythm",
    "Visual Novel",
    "Diğer",
];

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 10;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_GAME_NAME_CHARS: usize = 200;
pub const MAX_CATEGORY_CHARS: usize = 100;

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

/// Trim tags and drop the blank ones
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(trimmed)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Text fields must be non-blank and, when capped, at most `max` characters
fn check_text(field: &str, value: &str, max: Option<usize>) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    if let Some(max) = max {
        if value.chars().count() > max {
            return Err(format!("{} must be at most {} characters", field, max));
        }
    }
    Ok(())
}

/// A game review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub title: String,
    pub content: String,
    pub game_name: String,
    pub category: String,
    pub tags: Vec<String>,
    pub rating: Option<i32>,
    pub cover_image: Option<String>,
    pub author_id: String,
    /// Username at the time the review was created
    pub author_username: String,
    pub collaborator_ids: Vec<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            game_name: row.game_name,
            category: row.category,
            tags: row.tags.0,
            rating: row.rating,
            cover_image: row.cover_image,
            author_id: row.author_id,
            author_username: row.author_username,
            collaborator_ids: row.collaborator_ids.0,
            likes_count: row.likes_count,
            comments_count: row.comments_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// New review request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub game_name: String,
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(range(min = 1, max = 10, message = "must be between 1 and 10"))]
    pub rating: Option<i32>,
    pub cover_image: Option<String>,
}

impl CreateReviewRequest {
    /// Trim the text fields and tags before validation
    pub fn normalized(self) -> Self {
        Self {
            title: trimmed(self.title),
            content: trimmed(self.content),
            game_name: trimmed(self.game_name),
            category: trimmed(self.category),
            tags: normalize_tags(self.tags),
            ..self
        }
    }
}

/// Partial review update; only `Set` fields are written
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewPatch {
    pub title: Patch<String>,
    pub content: Patch<String>,
    pub game_name: Patch<String>,
    pub category: Patch<String>,
    pub tags: Patch<Vec<String>>,
    pub rating: Patch<i32>,
    pub cover_image: Patch<String>,
}

impl ReviewPatch {
    /// Trim set text fields and tags the same way creation does
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.map(trimmed),
            content: self.content.map(trimmed),
            game_name: self.game_name.map(trimmed),
            category: self.category.map(trimmed),
            tags: self.tags.map(normalize_tags),
            ..self
        }
    }

    /// Apply the creation rules to every field that is set
    pub fn validate(&self) -> Result<(), String> {
        let text = [
            ("title", &self.title, Some(MAX_TITLE_CHARS)),
            ("content", &self.content, None),
            ("gameName", &self.game_name, Some(MAX_GAME_NAME_CHARS)),
            ("category", &self.category, Some(MAX_CATEGORY_CHARS)),
        ];
        for (field, value, max) in text {
            if let Some(v) = value.as_deref() {
                check_text(field, v, max)?;
            }
        }

        if let Some(rating) = self.rating.as_set() {
            if !(MIN_RATING..=MAX_RATING).contains(rating) {
                return Err(format!(
                    "rating must be between {} and {}",
                    MIN_RATING, MAX_RATING
                ));
            }
        }

        Ok(())
    }
}
