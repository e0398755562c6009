/// API routes and handlers
pub mod assets;
pub mod middleware;
pub mod photos;
pub mod users;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(photos::routes())
        .merge(users::routes())
        .merge(assets::routes())
}
