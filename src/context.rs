/// Application context and dependency injection
use crate::{
    asset_store::{AssetStore, CloudinaryAssetStore, DiskAssetStore},
    config::{AssetBackendConfig, ServerConfig},
    db,
    error::{ApiError, ApiResult},
    gallery::{GalleryManager, SqlitePhotoRepository},
    profile::ProfileManager,
    rate_limit::RateLimiter,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub gallery: Arc<GalleryManager>,
    pub profiles: Arc<ProfileManager>,
    /// Set when assets live on local disk and are served by this host
    pub disk_assets: Option<Arc<DiskAssetStore>>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directories if they don't exist
        Self::ensure_directories(&config).await?;

        // Initialize database
        let db = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        Self::from_parts(config, db)
    }

    /// Wire services over an already prepared database
    pub fn from_parts(config: ServerConfig, db: SqlitePool) -> ApiResult<Self> {
        let (assets, disk_assets): (Arc<dyn AssetStore>, _) = match &config.asset_store.backend {
            AssetBackendConfig::Disk {
                location,
                public_base_url,
            } => {
                tracing::info!("Using disk asset store at {:?}", location);
                let disk = Arc::new(DiskAssetStore::new(
                    location.clone(),
                    public_base_url.clone(),
                ));
                (disk.clone(), Some(disk))
            }
            AssetBackendConfig::Cloudinary {
                cloud_name,
                api_key,
                api_secret,
                api_base_url,
            } => {
                tracing::info!("Using Cloudinary asset store (cloud: {})", cloud_name);
                let remote = CloudinaryAssetStore::new(
                    api_base_url.clone(),
                    cloud_name.clone(),
                    api_key.clone(),
                    api_secret.clone(),
                    config.asset_store.timeout,
                )?;
                (Arc::new(remote), None)
            }
        };

        let repository = Arc::new(SqlitePhotoRepository::new(db.clone()));
        let gallery = Arc::new(GalleryManager::new(
            repository,
            assets,
            config.asset_store.timeout,
        ));
        let profiles = Arc::new(ProfileManager::new(db.clone()));
        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limit));

        Ok(Self {
            config: Arc::new(config),
            db,
            gallery,
            profiles,
            disk_assets,
            rate_limiter,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> ApiResult<()> {
        tokio::fs::create_dir_all(&config.storage.data_directory)
            .await
            .map_err(|e| {
                ApiError::Internal(format!(
                    "Failed to create directory {:?}: {}",
                    config.storage.data_directory, e
                ))
            })?;

        if let AssetBackendConfig::Disk { location, .. } = &config.asset_store.backend {
            tokio::fs::create_dir_all(location).await?;
        }

        Ok(())
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
