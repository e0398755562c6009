/// Rate Limiting System
use crate::{
    api::middleware::extract_bearer_token,
    config::RateLimitConfig,
    context::AppContext,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use std::{num::NonZeroU32, sync::Arc, time::Duration};

/// Rate limiter manager
#[derive(Clone)]
pub struct RateLimiter {
    enabled: bool,
    authenticated: Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    unauthenticated: Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

fn non_zero(value: u32, fallback: NonZeroU32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(fallback)
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let burst = non_zero(config.burst_size, NonZeroU32::MIN);

        let auth_quota = Quota::per_second(non_zero(config.authenticated_rps, NonZeroU32::MIN))
            .allow_burst(burst);

        let unauth_quota =
            Quota::per_second(non_zero(config.unauthenticated_rps, NonZeroU32::MIN))
                .allow_burst(non_zero(config.burst_size / 4, NonZeroU32::MIN));

        Self {
            enabled: config.enabled,
            authenticated: Arc::new(GovernorLimiter::direct(auth_quota)),
            unauthenticated: Arc::new(GovernorLimiter::direct(unauth_quota)),
        }
    }

    /// Check rate limit for a request carrying a bearer token
    pub fn check_authenticated(&self) -> ApiResult<()> {
        if !self.enabled {
            return Ok(());
        }

        self.authenticated
            .check()
            .map_err(|_| ApiError::RateLimitExceeded {
                retry_after: Duration::from_secs(1),
            })
    }

    /// Check rate limit for an anonymous request
    pub fn check_unauthenticated(&self) -> ApiResult<()> {
        if !self.enabled {
            return Ok(());
        }

        self.unauthenticated
            .check()
            .map_err(|_| ApiError::RateLimitExceeded {
                retry_after: Duration::from_secs(1),
            })
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if extract_bearer_token(request.headers()).is_some() {
        ctx.rate_limiter.check_authenticated()?;
    } else {
        ctx.rate_limiter.check_unauthenticated()?;
    }

    Ok(next.run(request).await)
}
