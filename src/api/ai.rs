/// Language model assistance endpoints
use crate::{
    ai::{AssistRequest, AssistResponse, ExplainRequest, ExplainResponse},
    auth::{require_user, AuthUser},
    context::AppContext,
    error::AppResult,
    rate_limit::ai_rate_limit,
};
use axum::{extract::State, middleware, routing::post, Json, Router};

pub fn routes(ctx: &AppContext) -> Router<AppContext> {
    let limit = middleware::from_fn_with_state(ctx.clone(), ai_rate_limit);

    // Layers run outermost first, so assist authenticates before spending budget
    Router::new()
        .route(
            "/ai/assist",
            post(assist)
                .route_layer(limit.clone())
                .route_layer(middleware::from_fn_with_state(ctx.clone(), require_user)),
        )
        .route("/ai/explain", post(explain).route_layer(limit))
}

async fn assist(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Json(req): Json<AssistRequest>,
) -> AppResult<Json<AssistResponse>> {
    Ok(Json(ctx.assistant.assist(&user, req).await?))
}

async fn explain(
    State(ctx): State<AppContext>,
    Json(req): Json<ExplainRequest>,
) -> AppResult<Json<ExplainResponse>> {
    Ok(Json(ctx.assistant.explain(req).await?))
}
