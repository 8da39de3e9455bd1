/// Per-game popularity aggregation
use crate::db::reviews::PopularityRow;
use serde::Serialize;
use std::collections::HashMap;

const REVIEW_WEIGHT: f64 = 10.0;
const LIKE_WEIGHT: f64 = 5.0;
const RATING_WEIGHT: f64 = 2.0;

/// Ranked game summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularGame {
    pub game_name: String,
    pub review_count: i64,
    pub total_likes: i64,
    pub avg_rating: Option<f64>,
    pub cover_image: Option<String>,
    pub popularity_score: f64,
}

/// Running totals for one game
#[derive(Debug, Default)]
struct GameStats {
    review_count: i64,
    total_likes: i64,
    rating_sum: i64,
    rated: i64,
    cover_image: Option<String>,
}

impl GameStats {
    fn add(&mut self, row: PopularityRow) {
        if self.review_count == 0 {
            self.cover_image = row.cover_image;
        }
        self.review_count += 1;
        self.total_likes += row.likes_count;
        if let Some(rating) = row.rating {
            self.rating_sum += i64::from(rating);
            self.rated += 1;
        }
    }

    /// Mean of the rated reviews only
    fn avg_rating(&self) -> Option<f64> {
        (self.rated > 0).then(|| self.rating_sum as f64 / self.rated as f64)
    }

    fn score(&self) -> f64 {
        self.review_count as f64 * REVIEW_WEIGHT
            + self.total_likes as f64 * LIKE_WEIGHT
            + self.avg_rating().unwrap_or(0.0) * RATING_WEIGHT
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Groups rows by game name in the order they are fed
#[derive(Debug, Default)]
pub struct PopularityTally {
    games: HashMap<String, GameStats>,
}

impl PopularityTally {
    pub fn add(&mut self, row: PopularityRow) {
        self.games.entry(row.game_name.clone()).or_default().add(row);
    }

    /// Highest score first; equal scores fall back to game name
    pub fn rank(self, limit: usize) -> Vec<PopularGame> {
        let mut ranked: Vec<(f64, PopularGame)> = self
            .games
            .into_iter()
            .map(|(game_name, stats)| {
                let score = stats.score();
                let game = PopularGame {
                    game_name,
                    review_count: stats.review_count,
                    total_likes: stats.total_likes,
                    avg_rating: stats.avg_rating().map(round1),
                    cover_image: stats.cover_image,
                    popularity_score: round1(score),
                };
                (score, game)
            })
            .collect();

        ranked.sort_by(|(a_score, a), (b_score, b)| {
            b_score
                .total_cmp(a_score)
                .then_with(|| a.game_name.cmp(&b.game_name))
        });

        ranked.into_iter().take(limit).map(|(_, game)| game).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(game: &str, likes: i64, rating: Option<i32>, cover: Option<&str>) -> PopularityRow {
        PopularityRow {
            game_name: game.to_string(),
            likes_count: likes,
            rating,
            cover_image: cover.map(str::to_string),
        }
    }

    #[test]
    fn test_unrated_reviews_do_not_drag_average() {
        let mut tally = PopularityTally::default();
        tally.add(row("X", 3, Some(8), Some("first.png")));
        tally.add(row("X", 5, None, Some("second.png")));

        let ranked = tally.rank(3);
        assert_eq!(ranked.len(), 1);

        let x = &ranked[0];
        assert_eq!(x.review_count, 2);
        assert_eq!(x.total_likes, 8);
        assert_eq!(x.avg_rating, Some(8.0));
        // 2*10 + 8*5 + 8.0*2
        assert_eq!(x.popularity_score, 76.0);
        assert_eq!(x.cover_image.as_deref(), Some("first.png"));
    }

    #[test]
    fn test_unrated_game_has_null_average() {
        let mut tally = PopularityTally::default();
        tally.add(row("Y", 1, None, None));

        let ranked = tally.rank(3);
        assert_eq!(ranked[0].avg_rating, None);
        assert_eq!(ranked[0].popularity_score, 15.0);
    }

    #[test]
    fn test_rank_orders_and_limits() {
        let mut tally = PopularityTally::default();
        tally.add(row("Low", 0, None, None));
        tally.add(row("High", 10, Some(9), None));
        tally.add(row("Beta", 2, None, None));
        tally.add(row("Alpha", 2, None, None));

        let names: Vec<_> = tally
            .rank(3)
            .into_iter()
            .map(|g| g.game_name)
            .collect();
        assert_eq!(names, vec!["High", "Alpha", "Beta"]);
    }

    #[test]
    fn test_rounding_to_one_decimal() {
        let mut tally = PopularityTally::default();
        tally.add(row("Z", 0, Some(7), None));
        tally.add(row("Z", 0, Some(8), None));
        tally.add(row("Z", 0, Some(8), None));

        let z = &tally.rank(1)[0];
        assert_eq!(z.avg_rating, Some(7.7));
        // 30 + 0 + 7.666..*2 = 45.33..
        assert_eq!(z.popularity_score, 45.3);
    }
}
