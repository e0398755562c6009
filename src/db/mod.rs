/// Database layer for the dating API
///
/// Manages the SQLite connection pool, embedded migrations, and the
/// persisted user/photo record types.

pub mod models;

pub use models::{Photo, User};

use crate::error::{ApiError, ApiResult};
use sqlx::sqlite::SqlitePool;
use std::path::Path;

/// Database connection options
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub enable_wal: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            enable_wal: true,
        }
    }
}

/// Create a SQLite connection pool
pub async fn create_pool(path: &Path, options: DatabaseOptions) -> ApiResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .connect_with(
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(if options.enable_wal {
                    sqlx::sqlite::SqliteJournalMode::Wal
                } else {
                    sqlx::sqlite::SqliteJournalMode::Delete
                })
                .foreign_keys(true)
                .busy_timeout(std::time::Duration::from_secs(5)),
        )
        .await?;

    Ok(pool)
}

/// Run migrations for a database
/// Migrations are embedded at compile time from ./migrations directory
pub async fn run_migrations(pool: &SqlitePool) -> ApiResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| ApiError::Internal(format!("Migration failed: {}", e)))?;

    Ok(())
}

/// Test database connection
pub async fn test_connection(pool: &SqlitePool) -> ApiResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// In-memory database with the schema applied.
///
/// Single connection, otherwise every pooled connection would see its own
/// empty `:memory:` database.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(":memory:")
                .foreign_keys(true),
        )
        .await
        .unwrap();

    run_migrations(&pool).await.unwrap();
    pool
}

/// Insert a bare user row and return its id
#[cfg(test)]
pub(crate) async fn insert_test_user(pool: &SqlitePool, username: &str) -> i64 {
    let now = chrono::Utc::now();
    sqlx::query("INSERT INTO users (username, created_at, last_active) VALUES (?1, ?2, ?3)")
        .bind(username)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

/// Insert a photo row directly, bypassing gallery rules
#[cfg(test)]
pub(crate) async fn insert_test_photo(
    pool: &SqlitePool,
    user_id: i64,
    is_main: bool,
    public_id: Option<&str>,
) -> i64 {
    sqlx::query(
        "INSERT INTO photos (url, description, date_added, is_main, public_id, user_id)
         VALUES (?1, NULL, ?2, ?3, ?4, ?5)",
    )
    .bind(format!("http://assets.test/{}", public_id.unwrap_or("seed")))
    .bind(chrono::Utc::now())
    .bind(is_main)
    .bind(public_id)
    .bind(user_id)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_pool_and_migrate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dating.sqlite");

        let pool = create_pool(&path, DatabaseOptions::default()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        test_connection(&pool).await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_schema_rejects_second_main_photo() {
        let pool = test_pool().await;
        let user_id = insert_test_user(&pool, "alice").await;
        insert_test_photo(&pool, user_id, true, None).await;

        let second_main = sqlx::query(
            "INSERT INTO photos (url, date_added, is_main, user_id) VALUES ('u', ?1, 1, ?2)",
        )
        .bind(chrono::Utc::now())
        .bind(user_id)
        .execute(&pool)
        .await;

        assert!(second_main.is_err());
    }
}
