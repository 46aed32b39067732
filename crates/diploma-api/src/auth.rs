//! # Authentication Middleware
//!
//! Bearer-token authentication that establishes the caller's account.
//!
//! ## Token format
//!
//! - The authority: `Authorization: Bearer {authority}:{authority-secret}`.
//!   Only the dedicated authority secret (`AUTHORITY_TOKEN`) yields the
//!   authority identity. Without one, authority claims are always refused.
//! - Other accounts, with a shared secret configured:
//!   `Authorization: Bearer {account}:{secret}`.
//! - Other accounts, without a shared secret: `Authorization: Bearer {account}`.
//!   The account is taken at face value, which is only suitable for local use.
//!
//! Secrets are compared in constant time.
//!
//! The middleware runs on every `/v1` route. Requests without an
//! `Authorization` header pass through unauthenticated so that public reads
//! keep working; handlers that need a caller take a [`CallerIdentity`]
//! argument, which rejects with 401 when no identity was established.
//! A header that is present but invalid is rejected immediately.
//!
//! Whether the caller may perform an operation is decided by the registry,
//! which answers `Unauthorized` (403) for non-authority callers on
//! privileged operations.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;

use diploma_core::AccountId;

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// The authenticated account behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: AccountId,
}

impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("missing authorization header".into()))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Bearer secrets and the account they guard.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared secret for non-authority accounts. `None` disables the check.
    pub token: Option<String>,
    /// The registry authority.
    pub authority: AccountId,
    /// Secret required to act as [`AuthConfig::authority`]. `None` refuses
    /// every authority claim.
    pub authority_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("authority", &self.authority)
            .field(
                "authority_token",
                &self.authority_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        // Dummy comparison to keep timing constant regardless of length match.
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse the credential part of a bearer header into a caller identity.
///
/// The token splits at the first `:` into account and secret. The
/// authority account is only accepted with the authority secret; the
/// shared secret never grants it.
pub fn parse_bearer_token(provided: &str, config: &AuthConfig) -> Result<CallerIdentity, String> {
    let (account, secret) = match provided.split_once(':') {
        Some((account, secret)) => (account, Some(secret)),
        None => (provided, None),
    };
    let account =
        AccountId::new(account).map_err(|e| format!("invalid account in bearer token: {e}"))?;

    if account == config.authority {
        return match (config.authority_token.as_deref(), secret) {
            (Some(expected), Some(secret)) if constant_time_token_eq(secret, expected) => {
                Ok(CallerIdentity { account })
            }
            (None, _) => Err("authority credentials are not configured".into()),
            _ => Err("invalid authority credentials".into()),
        };
    }

    match (config.token.as_deref(), secret) {
        (Some(expected), Some(secret)) => {
            if !constant_time_token_eq(secret, expected) {
                return Err("invalid bearer token".into());
            }
        }
        (Some(_), None) => {
            return Err("invalid token format, expected {account}:{secret}".into());
        }
        (None, Some(_)) => {
            return Err("unexpected secret in bearer token".into());
        }
        (None, None) => {}
    }
    Ok(CallerIdentity { account })
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Authenticate the request if it carries an `Authorization` header.
///
/// Reads [`AuthConfig`] from request extensions. On success the
/// [`CallerIdentity`] is inserted into the extensions for handlers.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default().to_string());

    match auth_header {
        None => next.run(request).await,
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(provided) => {
                let Some(config) = request.extensions().get::<AuthConfig>() else {
                    tracing::error!("authentication failed: no AuthConfig installed");
                    return unauthorized_response("authentication is not configured");
                };
                match parse_bearer_token(provided, config) {
                    Ok(identity) => {
                        tracing::debug!(caller = %identity.account, "request authenticated");
                        request.extensions_mut().insert(identity);
                        next.run(request).await
                    }
                    Err(msg) => {
                        tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                        unauthorized_response(&msg)
                    }
                }
            }
            None => {
                tracing::warn!("authentication failed: non-Bearer authorization scheme");
                unauthorized_response("authorization header must use Bearer scheme")
            }
        },
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
