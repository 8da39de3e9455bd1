/// Text search over reviews and users, and the popular games ranking
mod popularity;

pub use popularity::PopularGame;

use crate::{
    account::User,
    db::{self, Page},
    error::AppResult,
    reviews::Review,
};
use popularity::PopularityTally;
use serde::Serialize;
use sqlx::SqlitePool;

/// Shortest query that triggers a lookup
pub const MIN_QUERY_CHARS: usize = 2;
/// Users branch size, independent of paging
pub const USER_RESULTS: i64 = 10;
pub const DEFAULT_POPULAR_LIMIT: usize = 3;
pub const MAX_POPULAR_LIMIT: usize = 50;

#[derive(Debug, Default, Serialize)]
pub struct SearchResults {
    pub reviews: Vec<Review>,
    pub users: Vec<User>,
}

#[derive(Clone)]
pub struct SearchEngine {
    db: SqlitePool,
}

impl SearchEngine {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Case-insensitive substring search. Queries shorter than two
    /// characters return nothing.
    pub async fn search(&self, query: &str, page: Page) -> AppResult<SearchResults> {
        let term = query.trim();
        if term.chars().count() < MIN_QUERY_CHARS {
            return Ok(SearchResults::default());
        }

        let pattern = db::like_pattern(&db::fold_case(term));

        let reviews = db::reviews::search(&self.db, &pattern, page)
            .await?
            .into_iter()
            .map(Review::from)
            .collect();
        let users = db::users::search_by_username(&self.db, &pattern, USER_RESULTS)
            .await?
            .into_iter()
            .map(User::from)
            .collect();

        Ok(SearchResults { reviews, users })
    }

    /// Games ranked by review count, likes and average rating
    pub async fn popular_games(&self, limit: Option<usize>) -> AppResult<Vec<PopularGame>> {
        let limit = limit
            .unwrap_or(DEFAULT_POPULAR_LIMIT)
            .clamp(1, MAX_POPULAR_LIMIT);

        let mut tally = PopularityTally::default();
        db::reviews::for_each_popularity_row(&self.db, |row| tally.add(row)).await?;

        Ok(tally.rank(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::manager::tests::{create_test_manager, register};
    use crate::account::ProfilePatch;
    use crate::patch::Patch;
    use crate::reviews::{manager::tests::sample_review, ReviewManager, ReviewPatch};

    async fn setup() -> (SearchEngine, ReviewManager, User) {
        let db = db::test_pool().await;
        let accounts = create_test_manager(db.clone()).await;
        let author = register(&accounts, "mariofan").await;
        register(&accounts, "zelda_player").await;
        (SearchEngine::new(db.clone()), ReviewManager::new(db), author)
    }

    #[tokio::test]
    async fn test_short_query_returns_nothing() {
        let (search, reviews, author) = setup().await;
        reviews
            .create(&author, sample_review("Super Mario Odyssey"))
            .await
            .unwrap();

        let results = search.search("a", Page::default()).await.unwrap();
        assert!(results.reviews.is_empty());
        assert!(results.users.is_empty());

        let padded = search.search("  m  ", Page::default()).await.unwrap();
        assert!(padded.reviews.is_empty());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let (search, reviews, author) = setup().await;
        reviews
            .create(&author, sample_review("Super Mario Odyssey"))
            .await
            .unwrap();
        reviews
            .create(&author, sample_review("Hollow Knight"))
            .await
            .unwrap();

        let results = search.search("MARIO", Page::default()).await.unwrap();
        // Game name on one review, author username on both
        assert_eq!(results.reviews.len(), 2);
        assert_eq!(results.users.len(), 1);
        assert_eq!(results.users[0].username, "mariofan");

        let by_game = search.search("odyssey", Page::default()).await.unwrap();
        assert_eq!(by_game.reviews.len(), 1);
        assert_eq!(by_game.reviews[0].game_name, "Super Mario Odyssey");
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_letters() {
        let (search, reviews, author) = setup().await;
        let created = reviews
            .create(&author, sample_review("ÖLÜMSÜZ ŞÖVALYE"))
            .await
            .unwrap();

        let upper = search.search("ÖLÜMSÜZ", Page::default()).await.unwrap();
        let lower = search.search("ölümsüz", Page::default()).await.unwrap();
        assert_eq!(upper.reviews.len(), 1);
        assert_eq!(lower.reviews.len(), 1);
        assert_eq!(lower.reviews[0].game_name, "ÖLÜMSÜZ ŞÖVALYE");

        // Edited titles are searchable under their new text
        reviews
            .update(
                &created.id,
                &author,
                ReviewPatch {
                    title: Patch::Set("Çılgın Yarış".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let edited = search.search("çılgın", Page::default()).await.unwrap();
        assert_eq!(edited.reviews.len(), 1);
    }

    #[tokio::test]
    async fn test_user_search_follows_renames() {
        let db = db::test_pool().await;
        let accounts = create_test_manager(db.clone()).await;
        let user = register(&accounts, "gamer").await;
        let search = SearchEngine::new(db);

        accounts
            .update_profile(
                &user,
                ProfilePatch {
                    username: Patch::Set("ŞAMPİYON".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let results = search.search("şampi", Page::default()).await.unwrap();
        assert_eq!(results.users.len(), 1);
        assert_eq!(results.users[0].username, "ŞAMPİYON");

        let old = search.search("gamer", Page::default()).await.unwrap();
        assert!(old.users.is_empty());
    }

    #[tokio::test]
    async fn test_wildcards_are_literal() {
        let (search, reviews, author) = setup().await;
        reviews
            .create(&author, sample_review("Hollow Knight"))
            .await
            .unwrap();

        let results = search.search("%%", Page::default()).await.unwrap();
        assert!(results.reviews.is_empty());

        let underscore = search.search("a_p", Page::default()).await.unwrap();
        assert!(underscore.reviews.is_empty());
        assert_eq!(underscore.users.len(), 1);
    }

    #[tokio::test]
    async fn test_popular_games_from_store() {
        let (search, reviews, author) = setup().await;

        let mut first = sample_review("X");
        first.rating = Some(8);
        let first = reviews.create(&author, first).await.unwrap();
        let mut second = sample_review("X");
        second.rating = None;
        reviews.create(&author, second).await.unwrap();
        reviews.create(&author, sample_review("Y")).await.unwrap();

        reviews.toggle_like(&first.id, &author).await.unwrap();

        let games = search.popular_games(None).await.unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].game_name, "X");
        assert_eq!(games[0].review_count, 2);
        assert_eq!(games[0].total_likes, 1);
        assert_eq!(games[0].avg_rating, Some(8.0));
        assert_eq!(games[0].popularity_score, 41.0);

        let top = search.popular_games(Some(0)).await.unwrap();
        assert_eq!(top.len(), 1);
    }
}
