//! # Registry Routes
//!
//! Public read-only views: registry settings, event history, and account
//! balances. None of these require credentials.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use diploma_core::AccountId;

use crate::error::AppError;
use crate::routes::EventView;
use crate::state::AppState;

/// Registry settings and counters.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistryInfo {
    pub authority: String,
    pub fee: u64,
    pub students: usize,
    pub diplomas: usize,
    pub events: usize,
}

/// Event history filter.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    /// Only return events with a sequence number greater than this.
    pub since: Option<u64>,
}

/// A page of the event history.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventsResponse {
    pub count: usize,
    pub events: Vec<EventView>,
}

/// An account balance in the service's account book.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    pub account: String,
    pub balance: u64,
}

/// Build the registry router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/registry", get(registry_info))
        .route("/v1/events", get(list_events))
        .route("/v1/accounts/{id}/balance", get(account_balance))
}

/// GET /v1/registry: Authority, fee, and counters.
#[utoipa::path(
    get,
    path = "/v1/registry",
    responses(
        (status = 200, description = "Registry settings", body = RegistryInfo),
    ),
    tag = "registry"
)]
async fn registry_info(State(state): State<AppState>) -> Json<RegistryInfo> {
    let runtime = state.runtime.lock();
    let registry = &runtime.registry;
    Json(RegistryInfo {
        authority: registry.authority().to_string(),
        fee: registry.fee().units(),
        students: registry.students().len(),
        diplomas: registry.diplomas().len(),
        events: runtime.events.len(),
    })
}

/// GET /v1/events: Event history, oldest first.
#[utoipa::path(
    get,
    path = "/v1/events",
    params(EventsQuery),
    responses(
        (status = 200, description = "Event history", body = EventsResponse),
    ),
    tag = "registry"
)]
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<EventsResponse> {
    let runtime = state.runtime.lock();
    let events: Vec<EventView> = runtime
        .events
        .since(query.since.unwrap_or(0))
        .iter()
        .map(EventView::from)
        .collect();
    Json(EventsResponse {
        count: events.len(),
        events,
    })
}

/// GET /v1/accounts/{id}/balance: Balance of one account.
#[utoipa::path(
    get,
    path = "/v1/accounts/{id}/balance",
    params(("id" = String, Path, description = "Account identifier")),
    responses(
        (status = 200, description = "Account balance", body = BalanceResponse),
        (status = 422, description = "Invalid account identifier", body = crate::error::ErrorBody),
    ),
    tag = "registry"
)]
async fn account_balance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BalanceResponse>, AppError> {
    let account = AccountId::new(id)?;
    let balance = state.runtime.lock().balance(&account).units();
    Ok(Json(BalanceResponse {
        account: account.to_string(),
        balance,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{call, university_app};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn registry_info_reports_configuration() {
        let (app, _) = university_app(42);
        let (status, body) = call(&app, "GET", "/v1/registry", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authority"], "university");
        assert_eq!(body["fee"], 42);
        assert_eq!(body["students"], 0);
    }

    #[tokio::test]
    async fn events_since_filters_history() {
        let (app, _) = university_app(0);
        for id in ["a", "b", "c"] {
            call(&app, "POST", "/v1/students", Some(id), Some(json!({ "id": id }))).await;
        }
        let (_, body) = call(&app, "GET", "/v1/events", None, None).await;
        assert_eq!(body["count"], 3);
        let (_, body) = call(&app, "GET", "/v1/events?since=2", None, None).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["events"][0]["sequence"], 3);
        assert_eq!(body["events"][0]["event"]["id"], "c");
    }

    #[tokio::test]
    async fn balances_start_at_zero() {
        let (app, _) = university_app(0);
        let (status, body) = call(&app, "GET", "/v1/accounts/nobody/balance", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"account": "nobody", "balance": 0}));
    }
}
