/// API routes and handlers
pub mod ai;
pub mod auth;
pub mod discover;
pub mod middleware;
pub mod reviews;
pub mod users;


use crate::context::AppContext;
use axum::Router;

/// Build API routes, mounted under `/api`
pub fn routes(ctx: &AppContext) -> Router<AppContext> {
    Router::new()
        .merge(auth::routes())
        .merge(reviews::routes())
        .merge(users::routes())
        .merge(discover::routes())
        .merge(ai::routes(ctx))
}
