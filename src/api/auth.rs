/// Registration, login and current-user endpoints
use crate::{
    account::{LoginRequest, RegisterRequest, TokenResponse, User},
    auth::AuthUser,
    context::AppContext,
    error::AppResult,
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<TokenResponse>> {
    Ok(Json(ctx.accounts.register(req).await?))
}

async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    Ok(Json(ctx.accounts.login(req).await?))
}

async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
