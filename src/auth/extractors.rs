use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use subtle::ConstantTimeEq;
use tracing::warn;

use super::jwt::JwtKeys;
use crate::{error::ApiError, state::AppState};

pub const API_KEY_HEADER: &str = "x-api-key";

/// A caller admitted by the authentication gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCaller {
    ApiKey,
    Token { subject: String },
}

impl std::fmt::Display for ApiCaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiCaller::ApiKey => f.write_str("api-key"),
            ApiCaller::Token { subject } => write!(f, "token:{subject}"),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ApiCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cfg = &state.config;

        if let Some(presented) = parts.headers.get(API_KEY_HEADER) {
            let matches = cfg
                .api_key
                .as_deref()
                .is_some_and(|key| bool::from(presented.as_bytes().ct_eq(key.as_bytes())));
            if matches {
                return Ok(ApiCaller::ApiKey);
            }
            warn!("rejected api key");
            return Err(ApiError::Unauthorized("Invalid API key".into()));
        }

        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing credentials".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Invalid auth scheme".into()))?;

        let Some(jwt) = cfg.jwt.as_ref() else {
            return Err(ApiError::Unauthorized("Bearer tokens are not accepted".into()));
        };
        match JwtKeys::new(jwt).verify(token) {
            Ok(claims) => Ok(ApiCaller::Token {
                subject: claims.sub,
            }),
            Err(e) => {
                warn!(error = %e, "invalid or expired token");
                Err(ApiError::Unauthorized("Invalid or expired token".into()))
            }
        }
    }
}
