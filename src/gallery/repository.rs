/// SQLite-backed photo repository
use crate::{
    db::{models::UserRecord, Photo, User},
    error::{ApiError, ApiResult},
    gallery::{ChangeSet, CommitReceipt, PhotoChange, PhotoRepository},
    metrics,
};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::time::Instant;

const PHOTO_COLUMNS: &str = "id, url, description, date_added, is_main, public_id, user_id";

/// Photo repository over the shared SQLite pool
#[derive(Clone)]
pub struct SqlitePhotoRepository {
    db: SqlitePool,
}

impl SqlitePhotoRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    async fn photos_for_user(&self, user_id: i64) -> ApiResult<Vec<Photo>> {
        let photos = sqlx::query_as::<_, Photo>(&format!(
            "SELECT {} FROM photos WHERE user_id = ?1 ORDER BY id",
            PHOTO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(photos)
    }
}

#[async_trait]
impl PhotoRepository for SqlitePhotoRepository {
    async fn find_photo(&self, id: i64) -> ApiResult<Option<Photo>> {
        let started = Instant::now();
        let photo = sqlx::query_as::<_, Photo>(&format!(
            "SELECT {} FROM photos WHERE id = ?1",
            PHOTO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        metrics::record_db_query("select", "photos", started.elapsed().as_secs_f64());

        Ok(photo)
    }

    async fn find_main_photo(&self, user_id: i64) -> ApiResult<Option<Photo>> {
        let started = Instant::now();
        let photo = sqlx::query_as::<_, Photo>(&format!(
            "SELECT {} FROM photos WHERE user_id = ?1 AND is_main = 1",
            PHOTO_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        metrics::record_db_query("select", "photos", started.elapsed().as_secs_f64());

        Ok(photo)
    }

    async fn find_user(&self, id: i64) -> ApiResult<Option<User>> {
        let started = Instant::now();
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, known_as, gender, date_of_birth, city, country,
                   introduction, looking_for, interests, created_at, last_active
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        let user = match record {
            Some(record) => {
                let photos = self.photos_for_user(record.id).await?;
                Some(User { record, photos })
            }
            None => None,
        };
        metrics::record_db_query("select", "users", started.elapsed().as_secs_f64());

        Ok(user)
    }

    async fn commit(&self, changes: ChangeSet) -> ApiResult<CommitReceipt> {
        if changes.is_empty() {
            return Ok(CommitReceipt::default());
        }

        tracing::debug!("Committing {} photo changes", changes.len());
        let started = Instant::now();
        let mut tx = self.db.begin().await?;
        let mut receipt = CommitReceipt::default();

        for change in changes.changes() {
            match change {
                PhotoChange::Insert(photo) => {
                    let result = sqlx::query(
                        "INSERT INTO photos (url, description, date_added, is_main, public_id, user_id)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    )
                    .bind(&photo.url)
                    .bind(&photo.description)
                    .bind(photo.date_added)
                    .bind(photo.is_main)
                    .bind(&photo.public_id)
                    .bind(photo.user_id)
                    .execute(&mut *tx)
                    .await?;

                    receipt.inserted_ids.push(result.last_insert_rowid());
                }
                PhotoChange::SetMain { photo_id, is_main } => {
                    let result = sqlx::query("UPDATE photos SET is_main = ?1 WHERE id = ?2")
                        .bind(is_main)
                        .bind(photo_id)
                        .execute(&mut *tx)
                        .await?;

                    if result.rows_affected() != 1 {
                        // Dropping the transaction rolls it back
                        return Err(ApiError::Internal(format!(
                            "Photo {} disappeared while updating main flag",
                            photo_id
                        )));
                    }
                }
                PhotoChange::Delete { photo_id } => {
                    let result = sqlx::query("DELETE FROM photos WHERE id = ?1")
                        .bind(photo_id)
                        .execute(&mut *tx)
                        .await?;

                    if result.rows_affected() != 1 {
                        return Err(ApiError::Internal(format!(
                            "Photo {} disappeared before deletion",
                            photo_id
                        )));
                    }
                }
            }
        }

        tx.commit().await?;
        metrics::record_db_query("commit", "photos", started.elapsed().as_secs_f64());

        Ok(receipt)
    }
}
