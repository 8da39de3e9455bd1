/// Review endpoints: CRUD, collaborators, comments and likes
use crate::{
    auth::AuthUser,
    context::AppContext,
    db::{comments::Comment, Page},
    error::AppResult,
    reviews::{CreateReviewRequest, LikeToggle, Review, ReviewPatch},
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/reviews", post(create_review).get(list_reviews))
        .route(
            "/reviews/:id",
            get(get_review).put(update_review).delete(delete_review),
        )
        .route(
            "/reviews/:id/collaborators/:user_id",
            post(add_collaborator),
        )
        .route("/reviews/:id/comments", post(add_comment).get(list_comments))
        .route("/reviews/:id/like", post(toggle_like))
        .route("/reviews/:id/liked", get(has_liked))
}

#[derive(Debug, Deserialize)]
pub struct ListReviewsQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LikedResponse {
    pub liked: bool,
}

async fn create_review(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateReviewRequest>,
) -> AppResult<Json<Review>> {
    Ok(Json(ctx.reviews.create(&user, req).await?))
}

async fn list_reviews(
    State(ctx): State<AppContext>,
    Query(query): Query<ListReviewsQuery>,
) -> AppResult<Json<Vec<Review>>> {
    let page = Page::new(query.skip, query.limit);
    Ok(Json(
        ctx.reviews.list(query.category.as_deref(), page).await?,
    ))
}

async fn get_review(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> AppResult<Json<Review>> {
    Ok(Json(ctx.reviews.get(&id).await?))
}

async fn update_review(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<ReviewPatch>,
) -> AppResult<Json<Review>> {
    Ok(Json(ctx.reviews.update(&id, &user, patch).await?))
}

async fn delete_review(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    ctx.reviews.delete(&id, &user).await?;

    Ok(Json(MessageResponse {
        message: "Review deleted successfully".to_string(),
    }))
}

async fn add_collaborator(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path((id, collaborator_id)): Path<(String, String)>,
) -> AppResult<Json<MessageResponse>> {
    let added = ctx
        .reviews
        .add_collaborator(&id, &user, &collaborator_id)
        .await?;

    let message = if added {
        "Collaborator added successfully"
    } else {
        "User is already a collaborator"
    };

    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

async fn add_comment(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<Json<Comment>> {
    Ok(Json(ctx.reviews.add_comment(&id, &user, &req.content).await?))
}

async fn list_comments(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(ctx.reviews.list_comments(&id).await?))
}

async fn toggle_like(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<LikeToggle>> {
    Ok(Json(ctx.reviews.toggle_like(&id, &user).await?))
}

async fn has_liked(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<LikedResponse>> {
    let liked = ctx.reviews.has_liked(&id, &user.id).await?;
    Ok(Json(LikedResponse { liked }))
}
