/// Authentication extractors and utilities
use crate::{api::middleware::extract_bearer_token, context::AppContext, error::ApiError};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

/// Access token claims.
///
/// The user id travels in `sub`; tokens from the legacy issuer carry it in
/// `nameid` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nameid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,
    pub exp: i64,
}

impl Claims {
    /// Numeric user id of the token holder
    pub fn user_id(&self) -> Result<i64, ApiError> {
        self.sub
            .as_deref()
            .or(self.nameid.as_deref())
            .ok_or_else(|| ApiError::Authentication("Token has no subject".to_string()))?
            .parse()
            .map_err(|_| ApiError::Authentication("Token subject is not a user id".to_string()))
    }
}

/// Authenticated requester, extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        // Extract bearer token from Authorization header
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Authentication("Missing authorization header".to_string()))?;

        let claims = verify_jwt_token(&token, &state.config.authentication.jwt_secret)?;
        let user_id = claims.user_id()?;

        Ok(AuthContext {
            user_id,
            username: claims.unique_name,
        })
    }
}

/// Verify a JWT token with full validation
///
/// This performs:
/// 1. JWT signature verification
/// 2. Expiration checking
/// 3. Claims decoding
pub fn verify_jwt_token(token: &str, jwt_secret: &str) -> Result<Claims, ApiError> {
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    // Allow some clock skew (5 minutes)
    validation.leeway = 300;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("JWT verification failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ApiError::Authentication("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    ApiError::Authentication("Invalid token signature".to_string())
                }
                _ => ApiError::Authentication(format!("Invalid token: {}", e)),
            }
        })
}

/// Mint an access token for a user id
#[cfg(test)]
pub(crate) fn issue_test_token(user_id: i64, jwt_secret: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        sub: Some(user_id.to_string()),
        nameid: None,
        unique_name: Some(format!("user{}", user_id)),
        exp: chrono::Utc::now().timestamp() + 3600,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .unwrap()
}
