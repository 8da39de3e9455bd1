/// Categories, search and popular games
use crate::{
    context::AppContext,
    db::Page,
    error::AppResult,
    reviews::CATEGORIES,
    search::{PopularGame, SearchResults},
};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/categories", get(categories))
        .route("/search", get(search))
        .route("/popular-games", get(popular_games))
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularGamesResponse {
    pub popular_games: Vec<PopularGame>,
}

async fn categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: CATEGORIES,
    })
}

async fn search(
    State(ctx): State<AppContext>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<SearchResults>> {
    let page = Page::new(query.skip, query.limit);
    Ok(Json(ctx.search.search(&query.q, page).await?))
}

async fn popular_games(
    State(ctx): State<AppContext>,
    Query(query): Query<PopularQuery>,
) -> AppResult<Json<PopularGamesResponse>> {
    let popular_games = ctx.search.popular_games(query.limit).await?;
    Ok(Json(PopularGamesResponse { popular_games }))
}
