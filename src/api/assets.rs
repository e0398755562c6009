/// Serving of disk-backed photo assets
use crate::{
    context::AppContext,
    error::{ApiError, ApiResult},
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::get,
    Router,
};

/// Build asset routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/assets/:public_id", get(get_asset))
}

/// Get a stored image by public id
///
/// Assets are immutable once written, so the public id doubles as ETag.
async fn get_asset(
    State(ctx): State<AppContext>,
    Path(public_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let store = ctx
        .disk_assets
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("Assets are not served by this host".to_string()))?;

    // Existence is checked first so deleted assets stop revalidating
    let data = store
        .get(&public_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Asset not found: {}", public_id)))?;

    let etag = format!("\"{}\"", public_id);

    if headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == etag)
    {
        return Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header(header::ETAG, etag)
            .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
            .body(Body::empty())
            .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)));
    }

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header(header::CONTENT_LENGTH, data.len().to_string())
        .header(header::ETAG, etag)
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(Body::from(data))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
