/// Authentication extractors
use crate::{
    account::User, api::middleware::extract_bearer_token, context::AppContext, error::AppError,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

/// Signed-in user resolved from the bearer token
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppContext> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by `require_user`
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = extract_bearer_token(&parts.headers).ok_or_else(|| {
            AppError::Unauthenticated("Not authenticated".to_string())
        })?;

        let user = state.accounts.authenticate(&token).await?;

        Ok(AuthUser(user))
    }
}

/// Reject unauthenticated requests before any inner layer runs
pub async fn require_user(user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}
