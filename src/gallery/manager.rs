/// Gallery manager
///
/// Sequences photo record changes against asset store side effects so the
/// single-main-photo rule holds and local records never point at assets that
/// were never stored.
use crate::{
    asset_store::{AssetStore, UploadedAsset, PROFILE_PHOTO_TRANSFORMATION},
    db::{Photo, User},
    error::{ApiError, ApiResult},
    gallery::{guard, locks::OwnerLocks, ChangeSet, NewPhoto, PhotoRepository},
    metrics,
};
use chrono::Utc;
use std::{future::Future, sync::Arc, time::Duration};
use tracing::{error, info, warn};

/// An image submitted for a user's gallery
#[derive(Debug, Clone, Default)]
pub struct PhotoUpload {
    pub data: Vec<u8>,
    pub file_name: String,
    pub description: Option<String>,
}

/// Enforces gallery invariants across add, promote and delete
pub struct GalleryManager {
    repo: Arc<dyn PhotoRepository>,
    assets: Arc<dyn AssetStore>,
    locks: OwnerLocks,
    asset_timeout: Duration,
}

impl GalleryManager {
    pub fn new(
        repo: Arc<dyn PhotoRepository>,
        assets: Arc<dyn AssetStore>,
        asset_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            assets,
            locks: OwnerLocks::new(),
            asset_timeout,
        }
    }

    /// Get a photo by id
    pub async fn get_photo(&self, photo_id: i64) -> ApiResult<Photo> {
        self.repo
            .find_photo(photo_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Photo {} not found", photo_id)))
    }

    /// Add a photo to the owner's gallery.
    ///
    /// The first photo becomes main. An empty payload skips the upload and
    /// stores a record with no remote asset.
    pub async fn add_photo(
        &self,
        owner_id: i64,
        requester: i64,
        upload: PhotoUpload,
    ) -> ApiResult<Photo> {
        guard::ensure_owner(owner_id, requester)?;
        let _guard = self.locks.lock(owner_id).await;

        let owner = self.load_owner(owner_id).await?;

        let asset = if upload.data.is_empty() {
            warn!("User {} submitted an empty photo payload", owner_id);
            None
        } else {
            Some(self.upload_asset(upload.data, &upload.file_name).await?)
        };

        let new_photo = NewPhoto {
            user_id: owner_id,
            url: asset.as_ref().map(|a| a.url.clone()).unwrap_or_default(),
            description: upload.description,
            date_added: Utc::now(),
            is_main: owner.main_photo().is_none(),
            public_id: asset.as_ref().map(|a| a.public_id.clone()),
        };

        let mut changes = ChangeSet::new();
        changes.add(new_photo.clone());

        let receipt = match self.repo.commit(changes).await {
            Ok(receipt) => receipt,
            Err(e) => {
                if let Some(asset) = &asset {
                    warn!(
                        "Asset {} uploaded for user {} has no photo record: {}",
                        asset.public_id, owner_id, e
                    );
                }
                metrics::record_gallery_operation("add", "persistence_failure");
                return Err(persistence_failure("Could not add the photo.", e));
            }
        };

        let id = receipt.inserted_ids.first().copied().ok_or_else(|| {
            ApiError::Internal("Commit did not report the new photo id".to_string())
        })?;

        info!(
            "Added photo {} to gallery of user {} (main: {})",
            id, owner_id, new_photo.is_main
        );
        metrics::record_gallery_operation("add", "success");

        Ok(Photo {
            id,
            url: new_photo.url,
            description: new_photo.description,
            date_added: new_photo.date_added,
            is_main: new_photo.is_main,
            public_id: new_photo.public_id,
            user_id: owner_id,
        })
    }

    /// Make a photo the owner's main photo, demoting the current one
    pub async fn set_main_photo(
        &self,
        owner_id: i64,
        requester: i64,
        photo_id: i64,
    ) -> ApiResult<()> {
        guard::ensure_owner(owner_id, requester)?;
        let _guard = self.locks.lock(owner_id).await;

        let owner = self.load_owner(owner_id).await?;
        let target = guard::owned_photo(&owner, photo_id)?;

        if target.is_main {
            return Err(ApiError::InvalidState(
                "This is already the main photo".to_string(),
            ));
        }

        let mut changes = ChangeSet::new();
        match self.repo.find_main_photo(owner_id).await? {
            Some(current) => changes.set_main(&current, false),
            None => error!(
                "User {} owns photos but has no main photo; promoting {}",
                owner_id, photo_id
            ),
        }
        changes.set_main(target, true);

        if let Err(e) = self.repo.commit(changes).await {
            metrics::record_gallery_operation("set_main", "persistence_failure");
            return Err(persistence_failure(
                "Could not set photo as main photo.",
                e,
            ));
        }

        info!("Photo {} is now the main photo of user {}", photo_id, owner_id);
        metrics::record_gallery_operation("set_main", "success");

        Ok(())
    }

    /// Delete a non-main photo, removing its remote asset first
    pub async fn delete_photo(
        &self,
        owner_id: i64,
        requester: i64,
        photo_id: i64,
    ) -> ApiResult<()> {
        guard::ensure_owner(owner_id, requester)?;
        let _guard = self.locks.lock(owner_id).await;

        let owner = self.load_owner(owner_id).await?;
        let photo = guard::owned_photo(&owner, photo_id)?;

        if photo.is_main {
            return Err(ApiError::InvalidState(
                "You cannot delete your main photo".to_string(),
            ));
        }

        if let Some(public_id) = &photo.public_id {
            if let Err(e) = self.delete_asset(public_id).await {
                warn!(
                    "Keeping photo {} of user {}: remote asset {} not deleted: {}",
                    photo_id, owner_id, public_id, e
                );
                metrics::record_gallery_operation("delete", "remote_failure");
                return Err(e);
            }
        }

        let mut changes = ChangeSet::new();
        changes.mark_for_deletion(photo);

        if let Err(e) = self.repo.commit(changes).await {
            if let Some(public_id) = &photo.public_id {
                error!(
                    "Remote asset {} deleted but photo {} of user {} remains: {}",
                    public_id, photo_id, owner_id, e
                );
            }
            metrics::record_gallery_operation("delete", "persistence_failure");
            return Err(persistence_failure("Failed to delete the photo", e));
        }

        info!("Deleted photo {} from gallery of user {}", photo_id, owner_id);
        metrics::record_gallery_operation("delete", "success");

        Ok(())
    }

    async fn load_owner(&self, owner_id: i64) -> ApiResult<User> {
        self.repo
            .find_user(owner_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", owner_id)))
    }

    async fn upload_asset(&self, data: Vec<u8>, file_name: &str) -> ApiResult<UploadedAsset> {
        let upload = self
            .assets
            .upload(data, file_name, &PROFILE_PHOTO_TRANSFORMATION);

        self.bounded(upload, "upload", ApiError::UploadFailure)
            .await
            .map_err(|e| match e {
                ApiError::UploadFailure(_) => e,
                other => ApiError::UploadFailure(other.to_string()),
            })
            .inspect_err(|_| metrics::record_gallery_operation("add", "upload_failure"))
    }

    async fn delete_asset(&self, public_id: &str) -> ApiResult<()> {
        self.bounded(
            self.assets.delete(public_id),
            "delete",
            ApiError::RemoteDeletionFailure,
        )
        .await
        .map_err(|e| match e {
            ApiError::RemoteDeletionFailure(_) => e,
            other => ApiError::RemoteDeletionFailure(other.to_string()),
        })
    }

    /// Run an asset store call under the configured timeout.
    ///
    /// A timeout is reported through `on_timeout`, the failure kind of the call.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = ApiResult<T>>,
        what: &str,
        on_timeout: fn(String) -> ApiError,
    ) -> ApiResult<T> {
        match tokio::time::timeout(self.asset_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout(format!(
                "Asset store {} timed out after {:?}",
                what, self.asset_timeout
            ))),
        }
    }
}

fn persistence_failure(message: &str, cause: ApiError) -> ApiError {
    error!("{} Commit failed: {}", message, cause);
    ApiError::PersistenceFailure(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        asset_store::ImageTransformation,
        db::{insert_test_photo, insert_test_user, test_pool},
        gallery::{CommitReceipt, SqlitePhotoRepository},
    };
    use async_trait::async_trait;
    use sqlx::SqlitePool;
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    };

    /// Records calls; failures and delays are switchable per test
    #[derive(Default)]
    struct FakeAssetStore {
        uploads: AtomicUsize,
        deletes: Mutex<Vec<String>>,
        fail_upload: AtomicBool,
        fail_delete: AtomicBool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl AssetStore for FakeAssetStore {
        async fn upload(
            &self,
            _data: Vec<u8>,
            _file_name: &str,
            transformation: &ImageTransformation,
        ) -> ApiResult<UploadedAsset> {
            assert_eq!(*transformation, PROFILE_PHOTO_TRANSFORMATION);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_upload.load(Ordering::SeqCst) {
                return Err(ApiError::UploadFailure("host unavailable".to_string()));
            }
            let n = self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok(UploadedAsset {
                public_id: format!("asset{}", n),
                url: format!("http://assets.test/asset{}", n),
            })
        }

        async fn delete(&self, public_id: &str) -> ApiResult<()> {
            self.deletes.lock().unwrap().push(public_id.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(ApiError::RemoteDeletionFailure("not found".to_string()));
            }
            Ok(())
        }
    }

    /// Delegates reads, fails commits on demand
    struct FlakyRepository {
        inner: SqlitePhotoRepository,
        fail_commit: AtomicBool,
    }

    #[async_trait]
    impl PhotoRepository for FlakyRepository {
        async fn find_photo(&self, id: i64) -> ApiResult<Option<Photo>> {
            self.inner.find_photo(id).await
        }

        async fn find_main_photo(&self, user_id: i64) -> ApiResult<Option<Photo>> {
            self.inner.find_main_photo(user_id).await
        }

        async fn find_user(&self, id: i64) -> ApiResult<Option<User>> {
            self.inner.find_user(id).await
        }

        async fn commit(&self, changes: ChangeSet) -> ApiResult<CommitReceipt> {
            if self.fail_commit.load(Ordering::SeqCst) {
                return Err(ApiError::Internal("disk full".to_string()));
            }
            self.inner.commit(changes).await
        }
    }

    struct Harness {
        pool: SqlitePool,
        repo: Arc<FlakyRepository>,
        assets: Arc<FakeAssetStore>,
        manager: GalleryManager,
    }

    async fn harness_with(assets: FakeAssetStore) -> Harness {
        let pool = test_pool().await;
        let repo = Arc::new(FlakyRepository {
            inner: SqlitePhotoRepository::new(pool.clone()),
            fail_commit: AtomicBool::new(false),
        });
        let assets = Arc::new(assets);
        let manager = GalleryManager::new(
            repo.clone(),
            assets.clone(),
            Duration::from_millis(200),
        );

        Harness {
            pool,
            repo,
            assets,
            manager,
        }
    }

    async fn harness() -> Harness {
        harness_with(FakeAssetStore::default()).await
    }

    fn upload() -> PhotoUpload {
        PhotoUpload {
            data: vec![0xFF, 0xD8, 0xFF],
            file_name: "me.jpg".to_string(),
            description: Some("at the beach".to_string()),
        }
    }

    async fn gallery(h: &Harness, user_id: i64) -> Vec<Photo> {
        h.repo.find_user(user_id).await.unwrap().unwrap().photos
    }

    fn main_count(photos: &[Photo]) -> usize {
        photos.iter().filter(|p| p.is_main).count()
    }

    #[tokio::test]
    async fn test_first_photo_is_main() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;

        let photo = h.manager.add_photo(alice, alice, upload()).await.unwrap();

        assert!(photo.is_main);
        assert_eq!(photo.public_id.as_deref(), Some("asset0"));
        assert_eq!(photo.url, "http://assets.test/asset0");
        assert_eq!(photo.description.as_deref(), Some("at the beach"));
        assert_eq!(h.manager.get_photo(photo.id).await.unwrap(), photo);
    }

    #[tokio::test]
    async fn test_single_main_across_adds_and_promotions() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;

        let p1 = h.manager.add_photo(alice, alice, upload()).await.unwrap();
        let p2 = h.manager.add_photo(alice, alice, upload()).await.unwrap();
        let p3 = h.manager.add_photo(alice, alice, upload()).await.unwrap();
        assert!(!p2.is_main);
        assert!(!p3.is_main);
        assert_eq!(main_count(&gallery(&h, alice).await), 1);

        for target in [p3.id, p2.id, p1.id, p3.id] {
            h.manager.set_main_photo(alice, alice, target).await.unwrap();

            let photos = gallery(&h, alice).await;
            assert_eq!(main_count(&photos), 1);
            assert!(photos.iter().find(|p| p.id == target).unwrap().is_main);
        }
    }

    #[tokio::test]
    async fn test_set_main_swaps_flags() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;
        let p1 = insert_test_photo(&h.pool, alice, true, None).await;
        let p2 = insert_test_photo(&h.pool, alice, false, None).await;

        h.manager.set_main_photo(alice, alice, p2).await.unwrap();

        assert!(!h.manager.get_photo(p1).await.unwrap().is_main);
        assert!(h.manager.get_photo(p2).await.unwrap().is_main);
        assert_eq!(main_count(&gallery(&h, alice).await), 1);
    }

    #[tokio::test]
    async fn test_set_main_on_main_is_rejected() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;
        let p1 = insert_test_photo(&h.pool, alice, true, None).await;
        let before = gallery(&h, alice).await;

        let result = h.manager.set_main_photo(alice, alice, p1).await;

        assert!(matches!(result, Err(ApiError::InvalidState(_))));
        assert_eq!(gallery(&h, alice).await, before);
    }

    #[tokio::test]
    async fn test_cross_owner_promotion_is_unauthorized() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;
        let bob = insert_test_user(&h.pool, "bob").await;
        insert_test_photo(&h.pool, alice, true, None).await;
        insert_test_photo(&h.pool, bob, true, None).await;
        let bobs_second = insert_test_photo(&h.pool, bob, false, None).await;
        let bob_before = gallery(&h, bob).await;

        let result = h.manager.set_main_photo(alice, alice, bobs_second).await;

        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
        assert_eq!(gallery(&h, bob).await, bob_before);
    }

    #[tokio::test]
    async fn test_requester_must_be_owner() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;
        let bob = insert_test_user(&h.pool, "bob").await;
        let p1 = insert_test_photo(&h.pool, alice, true, None).await;
        let p2 = insert_test_photo(&h.pool, alice, false, None).await;

        assert!(matches!(
            h.manager.add_photo(alice, bob, upload()).await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            h.manager.set_main_photo(alice, bob, p2).await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            h.manager.delete_photo(alice, bob, p2).await,
            Err(ApiError::Unauthorized(_))
        ));

        assert_eq!(h.assets.uploads.load(Ordering::SeqCst), 0);
        assert!(h.manager.get_photo(p1).await.unwrap().is_main);
        assert_eq!(gallery(&h, alice).await.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_main_photo_is_rejected() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;
        let p1 = insert_test_photo(&h.pool, alice, true, Some("abc")).await;

        let result = h.manager.delete_photo(alice, alice, p1).await;

        assert!(matches!(result, Err(ApiError::InvalidState(_))));
        let photo = h.manager.get_photo(p1).await.unwrap();
        assert!(photo.is_main);
        assert!(h.assets.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_remote_then_local() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;
        insert_test_photo(&h.pool, alice, true, None).await;
        let p2 = insert_test_photo(&h.pool, alice, false, Some("abc")).await;

        h.manager.delete_photo(alice, alice, p2).await.unwrap();

        assert_eq!(*h.assets.deletes.lock().unwrap(), vec!["abc".to_string()]);
        assert!(matches!(
            h.manager.get_photo(p2).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remote_delete_failure_keeps_record() {
        let h = harness().await;
        h.assets.fail_delete.store(true, Ordering::SeqCst);
        let alice = insert_test_user(&h.pool, "alice").await;
        insert_test_photo(&h.pool, alice, true, None).await;
        let p2 = insert_test_photo(&h.pool, alice, false, Some("abc")).await;

        let result = h.manager.delete_photo(alice, alice, p2).await;

        assert!(matches!(result, Err(ApiError::RemoteDeletionFailure(_))));
        assert!(h.manager.get_photo(p2).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_timeout_keeps_record() {
        let h = harness_with(FakeAssetStore {
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        })
        .await;
        let alice = insert_test_user(&h.pool, "alice").await;
        insert_test_photo(&h.pool, alice, true, None).await;
        let p2 = insert_test_photo(&h.pool, alice, false, Some("slow")).await;

        let result = h.manager.delete_photo(alice, alice, p2).await;

        match result {
            Err(ApiError::RemoteDeletionFailure(message)) => {
                assert!(message.contains("timed out"));
                assert!(!message.contains("Internal error"));
            }
            other => panic!("expected RemoteDeletionFailure, got {:?}", other),
        }
        assert!(h.manager.get_photo(p2).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_without_asset_skips_remote() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;
        insert_test_photo(&h.pool, alice, true, None).await;
        let p2 = insert_test_photo(&h.pool, alice, false, None).await;

        h.manager.delete_photo(alice, alice, p2).await.unwrap();

        assert!(h.assets.deletes.lock().unwrap().is_empty());
        assert_eq!(gallery(&h, alice).await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_other_users_photo_is_unauthorized() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;
        let bob = insert_test_user(&h.pool, "bob").await;
        insert_test_photo(&h.pool, bob, true, None).await;
        let bobs = insert_test_photo(&h.pool, bob, false, Some("bobs")).await;

        let result = h.manager.delete_photo(alice, alice, bobs).await;

        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
        assert!(h.assets.deletes.lock().unwrap().is_empty());
        assert!(h.manager.get_photo(bobs).await.is_ok());
    }

    #[tokio::test]
    async fn test_upload_failure_creates_no_record() {
        let h = harness().await;
        h.assets.fail_upload.store(true, Ordering::SeqCst);
        let alice = insert_test_user(&h.pool, "alice").await;

        let result = h.manager.add_photo(alice, alice, upload()).await;

        assert!(matches!(result, Err(ApiError::UploadFailure(_))));
        assert!(gallery(&h, alice).await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_timeout_is_upload_failure() {
        let h = harness_with(FakeAssetStore {
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        })
        .await;
        let alice = insert_test_user(&h.pool, "alice").await;

        let result = h.manager.add_photo(alice, alice, upload()).await;

        match result {
            Err(ApiError::UploadFailure(message)) => {
                assert_eq!(message, "Asset store upload timed out after 200ms");
            }
            other => panic!("expected UploadFailure, got {:?}", other),
        }
        assert!(gallery(&h, alice).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_payload_skips_upload() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;

        let photo = h
            .manager
            .add_photo(alice, alice, PhotoUpload::default())
            .await
            .unwrap();

        assert_eq!(h.assets.uploads.load(Ordering::SeqCst), 0);
        assert!(photo.public_id.is_none());
        assert!(photo.url.is_empty());
        assert!(photo.is_main);
    }

    #[tokio::test]
    async fn test_add_commit_failure_is_persistence_failure() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;
        h.repo.fail_commit.store(true, Ordering::SeqCst);

        let result = h.manager.add_photo(alice, alice, upload()).await;

        assert!(matches!(result, Err(ApiError::PersistenceFailure(_))));
        // Uploaded asset is not compensated
        assert_eq!(h.assets.uploads.load(Ordering::SeqCst), 1);
        assert!(gallery(&h, alice).await.is_empty());
    }

    #[tokio::test]
    async fn test_set_main_commit_failure_leaves_flags() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;
        let p1 = insert_test_photo(&h.pool, alice, true, None).await;
        let p2 = insert_test_photo(&h.pool, alice, false, None).await;
        h.repo.fail_commit.store(true, Ordering::SeqCst);

        let result = h.manager.set_main_photo(alice, alice, p2).await;

        assert!(matches!(result, Err(ApiError::PersistenceFailure(_))));
        assert!(h.manager.get_photo(p1).await.unwrap().is_main);
        assert!(!h.manager.get_photo(p2).await.unwrap().is_main);
    }

    #[tokio::test]
    async fn test_delete_commit_failure_after_remote_delete() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;
        insert_test_photo(&h.pool, alice, true, None).await;
        let p2 = insert_test_photo(&h.pool, alice, false, Some("abc")).await;
        h.repo.fail_commit.store(true, Ordering::SeqCst);

        let result = h.manager.delete_photo(alice, alice, p2).await;

        assert!(matches!(result, Err(ApiError::PersistenceFailure(_))));
        assert_eq!(h.assets.deletes.lock().unwrap().len(), 1);
        assert!(h.manager.get_photo(p2).await.is_ok());
    }

    #[tokio::test]
    async fn test_set_main_repairs_missing_main() {
        let h = harness().await;
        let alice = insert_test_user(&h.pool, "alice").await;
        insert_test_photo(&h.pool, alice, false, None).await;
        let p2 = insert_test_photo(&h.pool, alice, false, None).await;

        h.manager.set_main_photo(alice, alice, p2).await.unwrap();

        let photos = gallery(&h, alice).await;
        assert_eq!(main_count(&photos), 1);
        assert!(photos.iter().find(|p| p.id == p2).unwrap().is_main);
    }

    #[tokio::test]
    async fn test_missing_owner_is_not_found() {
        let h = harness().await;

        assert!(matches!(
            h.manager.add_photo(7, 7, upload()).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_promotions_keep_one_main() {
        let h = Arc::new(harness().await);
        let alice = insert_test_user(&h.pool, "alice").await;
        insert_test_photo(&h.pool, alice, true, None).await;
        let mut targets = Vec::new();
        for _ in 0..4 {
            targets.push(insert_test_photo(&h.pool, alice, false, None).await);
        }

        let tasks: Vec<_> = targets
            .into_iter()
            .map(|target| {
                let h = Arc::clone(&h);
                tokio::spawn(async move { h.manager.set_main_photo(alice, alice, target).await })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(main_count(&gallery(&h, alice).await), 1);
    }
}
