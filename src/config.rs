/// Configuration management for the dating API
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub asset_store: AssetStoreConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
    /// Largest accepted photo upload in bytes
    pub photo_upload_limit: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the token issuer
    pub jwt_secret: String,
}

/// Asset store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetStoreConfig {
    pub backend: AssetBackendConfig,
    /// Upper bound for a single upload or delete call
    pub timeout: Duration,
}

/// Asset store backend selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AssetBackendConfig {
    Disk {
        location: PathBuf,
        /// Base URL under which `/assets/:public_id` is reachable
        public_base_url: String,
    },
    Cloudinary {
        cloud_name: String,
        api_key: String,
        api_secret: String,
        api_base_url: String,
    },
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub authenticated_rps: u32,
    pub unauthenticated_rps: u32,
    pub burst_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("DATING_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("DATING_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| ApiError::Validation("Invalid port number".to_string()))?;
        let version = env::var("DATING_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let photo_upload_limit = env::var("DATING_PHOTO_UPLOAD_LIMIT")
            .unwrap_or_else(|_| "10485760".to_string())
            .parse()
            .unwrap_or(10485760);

        let data_directory: PathBuf = env::var("DATING_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("DATING_DATABASE_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("dating.sqlite"));

        let jwt_secret = env::var("DATING_JWT_SECRET")
            .map_err(|_| ApiError::Validation("JWT secret required".to_string()))?;

        let backend = if let Ok(cloud_name) = env::var("DATING_CLOUDINARY_CLOUD_NAME") {
            AssetBackendConfig::Cloudinary {
                cloud_name,
                api_key: env::var("DATING_CLOUDINARY_API_KEY").map_err(|_| {
                    ApiError::Validation("Cloudinary API key required".to_string())
                })?,
                api_secret: env::var("DATING_CLOUDINARY_API_SECRET").map_err(|_| {
                    ApiError::Validation("Cloudinary API secret required".to_string())
                })?,
                api_base_url: env::var("DATING_CLOUDINARY_API_BASE_URL")
                    .unwrap_or_else(|_| "https://api.cloudinary.com/v1_1".to_string()),
            }
        } else {
            AssetBackendConfig::Disk {
                location: env::var("DATING_ASSET_DISK_LOCATION")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| data_directory.join("assets")),
                public_base_url: env::var("DATING_ASSET_PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| format!("http://{}:{}", hostname, port)),
            }
        };
        let asset_timeout_secs: u64 = env::var("DATING_ASSET_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let rate_limit_enabled = env::var("DATING_RATE_LIMITS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);
        let authenticated_rps = env::var("DATING_RATE_LIMIT_AUTHENTICATED_RPS")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .unwrap_or(50);
        let unauthenticated_rps = env::var("DATING_RATE_LIMIT_UNAUTHENTICATED_RPS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);
        let burst_size = env::var("DATING_RATE_LIMIT_BURST")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .unwrap_or(20);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
                photo_upload_limit,
            },
            storage: StorageConfig {
                data_directory,
                database,
            },
            authentication: AuthConfig { jwt_secret },
            asset_store: AssetStoreConfig {
                backend,
                timeout: Duration::from_secs(asset_timeout_secs),
            },
            rate_limit: RateLimitConfig {
                enabled: rate_limit_enabled,
                authenticated_rps,
                unauthenticated_rps,
                burst_size,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ApiError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(ApiError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.asset_store.timeout.is_zero() {
            return Err(ApiError::Validation(
                "Asset store timeout must be greater than zero".to_string(),
            ));
        }

        if let AssetBackendConfig::Cloudinary {
            cloud_name,
            api_key,
            api_secret,
            ..
        } = &self.asset_store.backend
        {
            if cloud_name.is_empty() || api_key.is_empty() || api_secret.is_empty() {
                return Err(ApiError::Validation(
                    "Cloudinary cloud name, API key and API secret must all be set".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config(asset_location: PathBuf) -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "localhost".to_string(),
            port: 5000,
            version: "0.1.0".to_string(),
            photo_upload_limit: 1024 * 1024,
        },
        storage: StorageConfig {
            data_directory: PathBuf::from("./data"),
            database: PathBuf::from(":memory:"),
        },
        authentication: AuthConfig {
            jwt_secret: "test-secret-key-for-testing-only".to_string(),
        },
        asset_store: AssetStoreConfig {
            backend: AssetBackendConfig::Disk {
                location: asset_location,
                public_base_url: "http://localhost:5000".to_string(),
            },
            timeout: Duration::from_secs(5),
        },
        rate_limit: RateLimitConfig {
            enabled: false,
            authenticated_rps: 50,
            unauthenticated_rps: 10,
            burst_size: 20,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = test_config(PathBuf::from("./data/assets"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut config = test_config(PathBuf::from("./data/assets"));
        config.authentication.jwt_secret = "short".to_string();
        assert!(matches!(config.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = test_config(PathBuf::from("./data/assets"));
        config.asset_store.timeout = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_incomplete_cloudinary_credentials_rejected() {
        let mut config = test_config(PathBuf::from("./data/assets"));
        config.asset_store.backend = AssetBackendConfig::Cloudinary {
            cloud_name: "demo".to_string(),
            api_key: String::new(),
            api_secret: "secret".to_string(),
            api_base_url: "https://api.cloudinary.com/v1_1".to_string(),
        };
        assert!(matches!(config.validate(), Err(ApiError::Validation(_))));
    }
}
