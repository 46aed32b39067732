//! # Student Routes
//!
//! ## Endpoints
//!
//! - `GET /v1/students`: all active students in index order
//! - `POST /v1/students`: register a credential identifier
//! - `GET /v1/students/{id}`: one student record
//! - `DELETE /v1/students/{id}`: remove a student (authority)
//! - `PUT /v1/students/{id}/eligibility`: grant or revoke eligibility (authority)
//! - `POST /v1/students/{id}/payment`: pay the fee
//! - `DELETE /v1/students/{id}/payment`: clear the paid flag (authority)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use diploma_core::{Amount, CredentialId};
use diploma_state::{RegistryRuntime, StudentRecord};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{credential_id, extract_json};
use crate::routes::{apply, EventView};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to register a credential identifier.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitCredentialRequest {
    #[schema(value_type = String)]
    pub id: CredentialId,
}

/// Request to change a student's eligibility.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EligibilityRequest {
    pub eligible: bool,
}

/// Request to pay the fee for a credential.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentRequest {
    /// Attached value. Must equal the registry fee exactly.
    pub amount: u64,
}

/// A student record with its 1-based position in the active index.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentView {
    pub id: String,
    pub position: usize,
    pub eligible: bool,
    pub paid: bool,
}

impl StudentView {
    fn new(record: &StudentRecord, position: usize) -> Self {
        Self {
            id: record.id.to_string(),
            position,
            eligible: record.eligible,
            paid: record.paid,
        }
    }
}

/// All active students.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentListResponse {
    pub count: usize,
    pub students: Vec<StudentView>,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the students router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/students", get(list_students).post(submit_credential))
        .route(
            "/v1/students/{id}",
            get(get_student).delete(remove_student),
        )
        .route("/v1/students/{id}/eligibility", put(set_eligibility))
        .route(
            "/v1/students/{id}/payment",
            post(pay_for_credential).delete(reset_payment),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/students: List all active students in index order.
#[utoipa::path(
    get,
    path = "/v1/students",
    responses(
        (status = 200, description = "Active students", body = StudentListResponse),
    ),
    tag = "students"
)]
async fn list_students(State(state): State<AppState>) -> Json<StudentListResponse> {
    let runtime = state.runtime.lock();
    let students: Vec<StudentView> = runtime
        .registry
        .list_all_students()
        .iter()
        .enumerate()
        .map(|(i, record)| StudentView::new(record, i + 1))
        .collect();
    Json(StudentListResponse {
        count: students.len(),
        students,
    })
}

/// POST /v1/students: Register a credential identifier.
#[utoipa::path(
    post,
    path = "/v1/students",
    request_body = SubmitCredentialRequest,
    responses(
        (status = 201, description = "Credential registered", body = EventView),
        (status = 401, description = "Missing or invalid credentials", body = crate::error::ErrorBody),
        (status = 409, description = "Already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid identifier", body = crate::error::ErrorBody),
    ),
    tag = "students"
)]
async fn submit_credential(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<SubmitCredentialRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EventView>), AppError> {
    let req = extract_json(body)?;
    let view = apply(&state, |rt| rt.submit_credential(&caller.account, req.id))?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /v1/students/{id}: Get one student record.
#[utoipa::path(
    get,
    path = "/v1/students/{id}",
    params(("id" = String, Path, description = "Credential identifier")),
    responses(
        (status = 200, description = "Student record", body = StudentView),
        (status = 404, description = "Not registered", body = crate::error::ErrorBody),
    ),
    tag = "students"
)]
async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudentView>, AppError> {
    let id = credential_id(id)?;
    let runtime = state.runtime.lock();
    lookup(&runtime, &id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("credential {id} is not registered")))
}

fn lookup(runtime: &RegistryRuntime, id: &CredentialId) -> Option<StudentView> {
    let record = runtime.registry.student(id)?;
    let position = runtime
        .registry
        .students()
        .active()
        .position(id)
        .map_or(0, |p| p.get());
    Some(StudentView::new(record, position))
}

/// DELETE /v1/students/{id}: Remove a student.
#[utoipa::path(
    delete,
    path = "/v1/students/{id}",
    params(("id" = String, Path, description = "Credential identifier")),
    responses(
        (status = 200, description = "Student removed", body = EventView),
        (status = 403, description = "Caller is not the authority", body = crate::error::ErrorBody),
        (status = 404, description = "Not registered", body = crate::error::ErrorBody),
    ),
    tag = "students"
)]
async fn remove_student(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<EventView>, AppError> {
    let id = credential_id(id)?;
    apply(&state, |rt| rt.remove_student(&caller.account, &id)).map(Json)
}

/// PUT /v1/students/{id}/eligibility: Grant or revoke eligibility.
///
/// Repeating the current value succeeds and reports an
/// `already_eligible` or `already_ineligible` event.
#[utoipa::path(
    put,
    path = "/v1/students/{id}/eligibility",
    params(("id" = String, Path, description = "Credential identifier")),
    request_body = EligibilityRequest,
    responses(
        (status = 200, description = "Eligibility recorded", body = EventView),
        (status = 403, description = "Caller is not the authority", body = crate::error::ErrorBody),
        (status = 404, description = "Not registered", body = crate::error::ErrorBody),
    ),
    tag = "students"
)]
async fn set_eligibility(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
    body: Result<Json<EligibilityRequest>, JsonRejection>,
) -> Result<Json<EventView>, AppError> {
    let id = credential_id(id)?;
    let req = extract_json(body)?;
    apply(&state, |rt| rt.set_eligible(&caller.account, &id, req.eligible)).map(Json)
}

/// POST /v1/students/{id}/payment: Pay the fee and forward it to the authority.
#[utoipa::path(
    post,
    path = "/v1/students/{id}/payment",
    params(("id" = String, Path, description = "Credential identifier")),
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment received", body = EventView),
        (status = 409, description = "Already paid", body = crate::error::ErrorBody),
        (status = 422, description = "Not eligible or wrong amount", body = crate::error::ErrorBody),
        (status = 502, description = "Forwarding the fee failed", body = crate::error::ErrorBody),
    ),
    tag = "students"
)]
async fn pay_for_credential(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
    body: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<Json<EventView>, AppError> {
    let id = credential_id(id)?;
    let req = extract_json(body)?;
    apply(&state, |rt| {
        rt.pay_for_credential(&caller.account, &id, Amount::new(req.amount))
    })
    .map(Json)
}

/// DELETE /v1/students/{id}/payment: Clear a student's paid flag.
#[utoipa::path(
    delete,
    path = "/v1/students/{id}/payment",
    params(("id" = String, Path, description = "Credential identifier")),
    responses(
        (status = 200, description = "Payment reset", body = EventView),
        (status = 403, description = "Caller is not the authority", body = crate::error::ErrorBody),
        (status = 422, description = "Not eligible", body = crate::error::ErrorBody),
    ),
    tag = "students"
)]
async fn reset_payment(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<EventView>, AppError> {
    let id = credential_id(id)?;
    apply(&state, |rt| rt.reset_payment(&caller.account, &id)).map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{call, university_app, AUTHORITY};
    use serde_json::json;

    #[tokio::test]
    async fn submit_then_get_and_list() {
        let (app, _) = university_app(7);
        let (status, body) = call(&app, "POST", "/v1/students", Some("alice"), Some(json!({"id": "alice"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "credential_submitted");
        assert_eq!(body["sequence"], 1);
        assert_eq!(body["event"]["id"], "alice");

        let (status, body) = call(&app, "GET", "/v1/students/alice", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": "alice", "position": 1, "eligible": false, "paid": false}));

        let (_, body) = call(&app, "GET", "/v1/students", None, None).await;
        assert_eq!(body["count"], 1);
    }

    #[tokio::test]
    async fn duplicate_submission_conflicts() {
        let (app, _) = university_app(7);
        call(&app, "POST", "/v1/students", Some("alice"), Some(json!({"id": "a"}))).await;
        let (status, body) =
            call(&app, "POST", "/v1/students", Some("bob"), Some(json!({"id": "a"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "ALREADY_REGISTERED");
    }

    #[tokio::test]
    async fn submission_requires_caller() {
        let (app, _) = university_app(7);
        let (status, _) = call(&app, "POST", "/v1/students", None, Some(json!({"id": "a"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (_, body) = call(&app, "GET", "/v1/students", None, None).await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn malformed_bodies_are_rejected() {
        let (app, _) = university_app(7);
        let (status, body) =
            call(&app, "POST", "/v1/students", Some("alice"), Some(json!({"id": ""}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = call(
            &app,
            "POST",
            "/v1/students/alice/payment",
            Some("alice"),
            Some(json!({"amount": -1})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn eligibility_is_authority_only_and_idempotent() {
        let (app, _) = university_app(7);
        call(&app, "POST", "/v1/students", Some("alice"), Some(json!({"id": "alice"}))).await;

        let (status, body) = call(
            &app,
            "PUT",
            "/v1/students/alice/eligibility",
            Some("alice"),
            Some(json!({"eligible": true})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        for expected in ["student_eligible", "already_eligible"] {
            let (status, body) = call(
                &app,
                "PUT",
                "/v1/students/alice/eligibility",
                Some(AUTHORITY),
                Some(json!({"eligible": true})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["name"], expected);
        }

        let (status, _) = call(
            &app,
            "PUT",
            "/v1/students/nobody/eligibility",
            Some(AUTHORITY),
            Some(json!({"eligible": true})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn payment_flow_and_reset() {
        let (app, state) = university_app(7);
        call(&app, "POST", "/v1/students", Some("alice"), Some(json!({"id": "alice"}))).await;

        let pay = |amount: u64| {
            call(
                &app,
                "POST",
                "/v1/students/alice/payment",
                Some("alice"),
                Some(json!({ "amount": amount })),
            )
        };

        let (status, body) = pay(7).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "NOT_ELIGIBLE");

        call(
            &app,
            "PUT",
            "/v1/students/alice/eligibility",
            Some(AUTHORITY),
            Some(json!({"eligible": true})),
        )
        .await;

        let (status, body) = pay(6).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"]["expected"], 7);

        let (status, body) = pay(7).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "payment_received");
        assert_eq!(body["event"]["payer"], "alice");

        let (status, body) = pay(7).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "ALREADY_PAID");

        let (status, _) = call(&app, "DELETE", "/v1/students/alice/payment", Some(AUTHORITY), None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&app, "GET", "/v1/students/alice", None, None).await;
        assert_eq!(body["paid"], false);

        let balance = state
            .runtime
            .lock()
            .balance(&diploma_core::AccountId::new("university").unwrap());
        assert_eq!(balance, Amount::new(7));
    }

    #[tokio::test]
    async fn transfer_failure_maps_to_bad_gateway() {
        let (app, state) = university_app(7);
        call(&app, "POST", "/v1/students", Some("alice"), Some(json!({"id": "alice"}))).await;
        call(
            &app,
            "PUT",
            "/v1/students/alice/eligibility",
            Some(AUTHORITY),
            Some(json!({"eligible": true})),
        )
        .await;
        state
            .runtime
            .lock()
            .accounts
            .set_rejecting(diploma_core::AccountId::new("university").unwrap(), true);

        let (status, body) = call(
            &app,
            "POST",
            "/v1/students/alice/payment",
            Some("alice"),
            Some(json!({"amount": 7})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "TRANSFER_FAILED");
        let (_, body) = call(&app, "GET", "/v1/students/alice", None, None).await;
        assert_eq!(body["paid"], false);
    }

    #[tokio::test]
    async fn removal_moves_last_student_into_slot() {
        let (app, _) = university_app(0);
        for id in ["a", "b", "c"] {
            call(&app, "POST", "/v1/students", Some(id), Some(json!({ "id": id }))).await;
        }
        let (status, body) = call(&app, "DELETE", "/v1/students/a", Some(AUTHORITY), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "student_removed");

        let (_, body) = call(&app, "GET", "/v1/students", None, None).await;
        let ids: Vec<&str> = body["students"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["c", "b"]);

        let (status, _) = call(&app, "GET", "/v1/students/a", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "DELETE", "/v1/students/a", Some(AUTHORITY), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
