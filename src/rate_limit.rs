/// Rate limiting for the language model endpoints
use crate::{context::AppContext, error::AppError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use std::{num::NonZeroU32, sync::Arc};

/// Process-wide request budget shared by all callers
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RateLimiter {
    /// `per_minute` requests per minute, bursting up to the same amount
    pub fn per_minute(per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(GovernorLimiter::direct(quota)),
        }
    }

    pub fn check(&self) -> Result<(), AppError> {
        self.limiter.check().map_err(|_| AppError::RateLimited)
    }
}

/// Reject with 429 once the AI budget is spent
pub async fn ai_rate_limit(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(e) = ctx.ai_limiter.check() {
        tracing::warn!("AI rate limit exceeded on {}", request.uri().path());
        return e.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_burst_then_limits() {
        let limiter = RateLimiter::per_minute(3);

        for _ in 0..3 {
            assert!(limiter.check().is_ok());
        }

        assert!(matches!(limiter.check(), Err(AppError::RateLimited)));
    }

    #[test]
    fn test_zero_quota_still_admits_one() {
        let limiter = RateLimiter::per_minute(0);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }

    #[test]
    fn test_clones_share_budget() {
        let limiter = RateLimiter::per_minute(1);
        let clone = limiter.clone();

        assert!(limiter.check().is_ok());
        assert!(clone.check().is_err());
    }
}
