/// User profile endpoints
use crate::{
    auth::AuthContext,
    context::AppContext,
    error::ApiResult,
    profile::ProfileUpdate,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::put,
    Json, Router,
};

/// Build user routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/users/:id", put(update_user))
}

/// Update the requester's own profile
async fn update_user(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    auth: AuthContext,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<StatusCode> {
    ctx.profiles.update_profile(id, auth.user_id, update).await?;

    Ok(StatusCode::NO_CONTENT)
}
