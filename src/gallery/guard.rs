/// Ownership checks applied before any gallery mutation
use crate::{
    db::{Photo, User},
    error::{ApiError, ApiResult},
};

/// Requester must be the owner of the gallery
pub fn ensure_owner(owner_id: i64, requester: i64) -> ApiResult<()> {
    if owner_id != requester {
        tracing::warn!(
            "User {} attempted to modify the gallery of user {}",
            requester,
            owner_id
        );
        return Err(ApiError::Unauthorized(
            "You can only modify your own gallery".to_string(),
        ));
    }

    Ok(())
}

/// Photo must belong to the owner's collection.
///
/// Membership is checked against the loaded collection, so a photo id that
/// exists for another user is rejected the same way as a missing one.
pub fn owned_photo(owner: &User, photo_id: i64) -> ApiResult<&Photo> {
    owner.photo(photo_id).ok_or_else(|| {
        ApiError::Unauthorized(format!(
            "Photo {} is not part of the gallery of user {}",
            photo_id,
            owner.id()
        ))
    })
}
