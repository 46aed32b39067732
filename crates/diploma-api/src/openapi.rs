//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI document
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Diploma Registry API",
        version = "0.1.0",
        description = "Student credential registration, eligibility, fee payment, and diploma issuance.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Students
        crate::routes::students::list_students,
        crate::routes::students::submit_credential,
        crate::routes::students::get_student,
        crate::routes::students::remove_student,
        crate::routes::students::set_eligibility,
        crate::routes::students::pay_for_credential,
        crate::routes::students::reset_payment,
        // Diplomas
        crate::routes::diplomas::issue_diploma,
        crate::routes::diplomas::verify_diploma,
        // Registry
        crate::routes::registry::registry_info,
        crate::routes::registry::list_events,
        crate::routes::registry::account_balance,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::EventView,
        crate::routes::students::SubmitCredentialRequest,
        crate::routes::students::EligibilityRequest,
        crate::routes::students::PaymentRequest,
        crate::routes::students::StudentView,
        crate::routes::students::StudentListResponse,
        crate::routes::diplomas::DiplomaRequest,
        crate::routes::diplomas::VerifyResponse,
        crate::routes::registry::RegistryInfo,
        crate::routes::registry::EventsResponse,
        crate::routes::registry::BalanceResponse,
    )),
    tags(
        (name = "students", description = "Student registration, eligibility, and payment"),
        (name = "diplomas", description = "Diploma issuance and verification"),
        (name = "registry", description = "Registry settings, events, and balances"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/v1/students",
            "/v1/students/{id}",
            "/v1/students/{id}/eligibility",
            "/v1/students/{id}/payment",
            "/v1/diplomas",
            "/v1/diplomas/verify",
            "/v1/registry",
            "/v1/events",
            "/v1/accounts/{id}/balance",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }
}
