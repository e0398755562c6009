/// User profile management
///
/// Owner-only updates of the free-text profile fields.

use crate::{
    error::{ApiError, ApiResult},
    gallery::guard,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

/// Profile fields a user may edit
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(max = 2000))]
    pub introduction: Option<String>,
    #[validate(length(max = 2000))]
    pub looking_for: Option<String>,
    #[validate(length(max = 2000))]
    pub interests: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,
}

/// Profile manager
#[derive(Clone)]
pub struct ProfileManager {
    db: SqlitePool,
}

impl ProfileManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Replace the editable profile fields of a user
    pub async fn update_profile(
        &self,
        user_id: i64,
        requester: i64,
        update: ProfileUpdate,
    ) -> ApiResult<()> {
        guard::ensure_owner(user_id, requester)?;

        update
            .validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET introduction = ?1, looking_for = ?2, interests = ?3,
                city = ?4, country = ?5, last_active = ?6
            WHERE id = ?7
            "#,
        )
        .bind(&update.introduction)
        .bind(&update.looking_for)
        .bind(&update.interests)
        .bind(&update.city)
        .bind(&update.country)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("User {} not found", user_id)));
        }

        tracing::info!("Updated profile of user {}", user_id);

        Ok(())
    }
}
