/// Photo gallery subsystem
///
/// Keeps a user's photo collection consistent: at most one main photo per
/// user, main photos never deleted directly, and remote assets removed before
/// their local records.

pub mod guard;
pub mod locks;
pub mod manager;
pub mod repository;

pub use manager::{GalleryManager, PhotoUpload};
pub use repository::SqlitePhotoRepository;

use crate::{
    db::{Photo, User},
    error::ApiResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Photo row to be inserted on commit
#[derive(Debug, Clone, PartialEq)]
pub struct NewPhoto {
    pub user_id: i64,
    pub url: String,
    pub description: Option<String>,
    pub date_added: DateTime<Utc>,
    pub is_main: bool,
    pub public_id: Option<String>,
}

/// A single staged mutation
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoChange {
    Insert(NewPhoto),
    SetMain { photo_id: i64, is_main: bool },
    Delete { photo_id: i64 },
}

/// Ordered list of staged mutations, applied together or not at all
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<PhotoChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a new photo
    pub fn add(&mut self, photo: NewPhoto) {
        self.changes.push(PhotoChange::Insert(photo));
    }

    /// Stage a change of the main flag
    pub fn set_main(&mut self, photo: &Photo, is_main: bool) {
        self.changes.push(PhotoChange::SetMain {
            photo_id: photo.id,
            is_main,
        });
    }

    /// Stage removal of a photo record
    pub fn mark_for_deletion(&mut self, photo: &Photo) {
        self.changes.push(PhotoChange::Delete { photo_id: photo.id });
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[PhotoChange] {
        &self.changes
    }

    #[cfg(test)]
    pub(crate) fn push_raw(&mut self, change: PhotoChange) {
        self.changes.push(change);
    }
}

/// Result of a successful commit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitReceipt {
    /// Ids assigned to `Insert` changes, in staging order
    pub inserted_ids: Vec<i64>,
}

/// Persistence contract the gallery manager relies on
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Look up a photo by id
    async fn find_photo(&self, id: i64) -> ApiResult<Option<Photo>>;

    /// Look up the owner's current main photo
    async fn find_main_photo(&self, user_id: i64) -> ApiResult<Option<Photo>>;

    /// Look up a user with its photo collection
    async fn find_user(&self, id: i64) -> ApiResult<Option<User>>;

    /// Apply every staged change as one unit
    async fn commit(&self, changes: ChangeSet) -> ApiResult<CommitReceipt>;
}
