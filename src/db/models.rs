/// Persisted user and photo records
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Photo record in the database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub url: String,
    pub description: Option<String>,
    pub date_added: DateTime<Utc>,
    pub is_main: bool,
    /// Remote asset identifier; absent for seeded images
    pub public_id: Option<String>,
    pub user_id: i64,
}

/// User record in the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub known_as: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub introduction: Option<String>,
    pub looking_for: Option<String>,
    pub interests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

/// A user together with the photos it owns, ordered by id
#[derive(Debug, Clone)]
pub struct User {
    pub record: UserRecord,
    pub photos: Vec<Photo>,
}

impl User {
    pub fn id(&self) -> i64 {
        self.record.id
    }

    /// Photo from this user's gallery
    pub fn photo(&self, photo_id: i64) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == photo_id)
    }

    /// Current main photo, if any
    pub fn main_photo(&self) -> Option<&Photo> {
        self.photos.iter().find(|p| p.is_main)
    }
}
