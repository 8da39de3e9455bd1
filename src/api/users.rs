/// Public profiles and profile editing
use crate::{
    account::{ProfilePatch, User},
    auth::AuthUser,
    context::AppContext,
    db::Page,
    error::AppResult,
    reviews::Review,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/users/me", put(update_profile))
        .route("/users/:id", get(get_user))
        .route("/users/:id/reviews", get(user_reviews))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

async fn get_user(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> AppResult<Json<User>> {
    Ok(Json(ctx.accounts.get_user(&id).await?))
}

async fn update_profile(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Json(patch): Json<ProfilePatch>,
) -> AppResult<Json<User>> {
    Ok(Json(ctx.accounts.update_profile(&user, patch).await?))
}

async fn user_reviews(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Vec<Review>>> {
    let page = Page::new(query.skip, query.limit);
    Ok(Json(ctx.reviews.list_by_author(&id, page).await?))
}
