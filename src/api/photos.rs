/// Photo gallery endpoints under /api/users/:user_id/photos
use crate::{
    auth::AuthContext,
    context::AppContext,
    db::Photo,
    error::{ApiError, ApiResult},
    gallery::{guard, PhotoUpload},
};
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Build photo routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/users/:user_id/photos", post(add_photo))
        .route(
            "/api/users/:user_id/photos/:id",
            get(get_photo).delete(delete_photo),
        )
        .route("/api/users/:user_id/photos/:id/setMain", post(set_main_photo))
}

/// Photo as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub id: i64,
    pub url: String,
    pub description: Option<String>,
    pub date_added: DateTime<Utc>,
    pub is_main: bool,
    pub public_id: Option<String>,
}

impl From<&Photo> for PhotoResponse {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id,
            url: photo.url.clone(),
            description: photo.description.clone(),
            date_added: photo.date_added,
            is_main: photo.is_main,
            public_id: photo.public_id.clone(),
        }
    }
}

/// Get a single photo of a user
async fn get_photo(
    State(ctx): State<AppContext>,
    Path((user_id, id)): Path<(i64, i64)>,
    _auth: AuthContext,
) -> ApiResult<Json<PhotoResponse>> {
    let photo = ctx.gallery.get_photo(id).await?;

    if photo.user_id != user_id {
        return Err(ApiError::NotFound(format!("Photo {} not found", id)));
    }

    Ok(Json(PhotoResponse::from(&photo)))
}

/// Add a photo to the requester's gallery
///
/// Multipart form: `file` (image bytes) and optional `description`.
async fn add_photo(
    State(ctx): State<AppContext>,
    Path(user_id): Path<i64>,
    auth: AuthContext,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    // Reject foreign galleries before the body is buffered
    guard::ensure_owner(user_id, auth.user_id)?;

    let upload = read_upload(multipart).await?;

    tracing::debug!(
        "Photo upload from {} ({} bytes)",
        auth.username.as_deref().unwrap_or("unknown"),
        upload.data.len()
    );

    let photo = ctx.gallery.add_photo(user_id, auth.user_id, upload).await?;
    let location = format!("/api/users/{}/photos/{}", user_id, photo.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PhotoResponse::from(&photo)),
    ))
}

/// Promote a photo to main
async fn set_main_photo(
    State(ctx): State<AppContext>,
    Path((user_id, id)): Path<(i64, i64)>,
    auth: AuthContext,
) -> ApiResult<StatusCode> {
    ctx.gallery.set_main_photo(user_id, auth.user_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a non-main photo
async fn delete_photo(
    State(ctx): State<AppContext>,
    Path((user_id, id)): Path<(i64, i64)>,
    auth: AuthContext,
) -> ApiResult<StatusCode> {
    ctx.gallery.delete_photo(user_id, auth.user_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Collect the upload form. A missing `file` part is treated as an empty payload.
async fn read_upload(mut multipart: Multipart) -> ApiResult<PhotoUpload> {
    let mut upload = PhotoUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                upload.file_name = field.file_name().unwrap_or("upload").to_string();
                upload.data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read file: {}", e)))?
                    .to_vec();
            }
            Some("description") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::Validation(format!("Failed to read description: {}", e))
                })?;
                upload.description = Some(text).filter(|t| !t.trim().is_empty());
            }
            _ => {}
        }
    }

    Ok(upload)
}
