//! # Request Extraction Helpers
//!
//! Maps JSON body and path rejections onto [`AppError`] so that every
//! failure leaves the service in the same structured error format.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use diploma_core::CredentialId;

use crate::error::AppError;

/// Extract a JSON body.
///
/// Well-formed JSON that does not fit the request type (wrong field types,
/// invalid identifiers) is a validation error. Anything else, such as a
/// missing content type or a syntax error, is a bad request.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result.map(|Json(v)| v).map_err(|err| match err {
        JsonRejection::JsonDataError(_) => AppError::Validation(err.body_text()),
        other => AppError::BadRequest(other.body_text()),
    })
}

/// Parse a credential identifier taken from the request path.
pub fn credential_id(raw: String) -> Result<CredentialId, AppError> {
    Ok(CredentialId::new(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_id_rejects_oversized_path_segment() {
        let long = "x".repeat(CredentialId::MAX_LEN + 1);
        assert!(matches!(credential_id(long), Err(AppError::Validation(_))));
        assert_eq!(credential_id("alice".into()).unwrap().as_str(), "alice");
    }
}
