/// HTTP server setup and routing
use crate::{
    context::AppContext,
    error::{ApiError, ApiResult},
    metrics::{render_metrics, track_http_metrics},
    rate_limit::rate_limit_middleware,
};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Build the main application router
/// Returns Router<()> because state is already provided
pub fn build_router(ctx: AppContext) -> Router {
    // Create CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::LOCATION]);

    let upload_limit = ctx.config.service.photo_upload_limit;

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .merge(crate::api::routes())
        .route_layer(middleware::from_fn(track_http_metrics))
        // Provide state - converts Router<AppContext> to Router<()>
        .with_state(ctx.clone())
        .layer(middleware::from_fn_with_state(ctx, rate_limit_middleware))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .fallback(not_found)
}

/// Health check handler
async fn health_check(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    let database = match crate::db::test_connection(&ctx.db).await {
        Ok(()) => "ok",
        Err(_) => "unavailable",
    };

    Json(json!({
        "status": "ok",
        "database": database,
        "version": ctx.config.service.version
    }))
}

/// Prometheus metrics handler
async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        render_metrics(),
    )
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NotFound",
            "message": "Endpoint not found"
        })),
    )
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> ApiResult<()> {
    let addr = format!("{}:{}", ctx.config.service.hostname, ctx.config.service.port);

    info!("Dating API listening on {}", addr);
    info!("   Service URL: {}", ctx.service_url());

    let app = build_router(ctx);

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
