//! # Diploma Routes
//!
//! Issuance and verification of diploma signatures. Both are restricted to
//! the registry authority. Signatures travel as hex strings, with or
//! without a `0x` prefix.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use diploma_core::{CredentialSignature, DiplomaSignature};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::routes::{apply, EventView};
use crate::state::AppState;

/// A diploma signature paired with a credential signature.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DiplomaRequest {
    /// Hex-encoded diploma signature.
    pub diploma_signature: String,
    /// Hex-encoded credential signature.
    pub credential_signature: String,
}

impl DiplomaRequest {
    fn parse(&self) -> Result<(DiplomaSignature, CredentialSignature), AppError> {
        Ok((
            DiplomaSignature::from_hex(&self.diploma_signature)?,
            CredentialSignature::from_hex(&self.credential_signature)?,
        ))
    }
}

/// Verification outcome.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
}

/// Build the diplomas router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/diplomas", post(issue_diploma))
        .route("/v1/diplomas/verify", post(verify_diploma))
}

/// POST /v1/diplomas: Record a diploma signature.
///
/// Issuing an existing diploma signature again overwrites its credential
/// signature.
#[utoipa::path(
    post,
    path = "/v1/diplomas",
    request_body = DiplomaRequest,
    responses(
        (status = 201, description = "Diploma issued", body = EventView),
        (status = 403, description = "Caller is not the authority", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid hex", body = crate::error::ErrorBody),
    ),
    tag = "diplomas"
)]
async fn issue_diploma(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<DiplomaRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EventView>), AppError> {
    let (diploma, credential) = extract_json(body)?.parse()?;
    let view = apply(&state, |rt| {
        rt.issue_diploma(&caller.account, diploma, credential)
    })?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /v1/diplomas/verify: Check a diploma against a credential signature.
#[utoipa::path(
    post,
    path = "/v1/diplomas/verify",
    request_body = DiplomaRequest,
    responses(
        (status = 200, description = "Verification outcome", body = VerifyResponse),
        (status = 403, description = "Caller is not the authority", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid hex", body = crate::error::ErrorBody),
    ),
    tag = "diplomas"
)]
async fn verify_diploma(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<DiplomaRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, AppError> {
    let (diploma, credential) = extract_json(body)?.parse()?;
    let valid = state
        .runtime
        .lock()
        .verify_diploma(&caller.account, &diploma, &credential)?;
    Ok(Json(VerifyResponse { valid }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{call, university_app, AUTHORITY};
    use serde_json::json;

    fn pair(d: &str, c: &str) -> serde_json::Value {
        json!({"diploma_signature": d, "credential_signature": c})
    }

    #[tokio::test]
    async fn issue_then_verify() {
        let (app, _) = university_app(0);
        let (status, body) =
            call(&app, "POST", "/v1/diplomas", Some(AUTHORITY), Some(pair("0xd1", "c1"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "diploma_issued");
        assert_eq!(body["event"]["diploma_signature"], "d1");

        let verify = |d: &'static str, c: &'static str| {
            call(&app, "POST", "/v1/diplomas/verify", Some(AUTHORITY), Some(pair(d, c)))
        };
        assert_eq!(verify("d1", "C1").await.1, json!({"valid": true}));
        assert_eq!(verify("d1", "c2").await.1, json!({"valid": false}));
        assert_eq!(verify("ff", "c1").await.1, json!({"valid": false}));
    }

    #[tokio::test]
    async fn non_authority_cannot_issue_or_verify() {
        let (app, state) = university_app(0);
        for uri in ["/v1/diplomas", "/v1/diplomas/verify"] {
            let (status, body) = call(&app, "POST", uri, Some("eve"), Some(pair("d1", "c1"))).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        }
        assert!(state.runtime.lock().registry.diplomas().is_empty());
    }

    #[tokio::test]
    async fn invalid_hex_is_a_validation_error() {
        let (app, _) = university_app(0);
        let (status, body) =
            call(&app, "POST", "/v1/diplomas", Some(AUTHORITY), Some(pair("zz", "c1"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
