//! # diploma-api: HTTP Service for the Diploma Registry
//!
//! Exposes one in-memory [`diploma_state::RegistryRuntime`] over REST.
//!
//! ## API Surface
//!
//! | Prefix                 | Module                  | Auth for writes |
//! |------------------------|-------------------------|-----------------|
//! | `/v1/students/*`       | [`routes::students`]    | bearer          |
//! | `/v1/diplomas/*`       | [`routes::diplomas`]    | bearer          |
//! | `/v1/registry`, `/v1/events`, `/v1/accounts/*` | [`routes::registry`] | none |
//! | `/health/liveness`     | this module             | none            |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Generated via utoipa derive macros and served at `/openapi.json`.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;

pub use error::AppError;
pub use state::{AppConfig, AppState};

/// Maximum accepted request body size.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// The liveness probe is mounted outside the auth middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
        authority: state.runtime.lock().registry.authority().clone(),
        authority_token: state.config.authority_token.clone(),
    };

    let api = Router::new()
        .merge(routes::students::router())
        .merge(routes::diplomas::router())
        .merge(routes::registry::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    let health = Router::new().route("/health/liveness", axum::routing::get(liveness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use diploma_core::{AccountId, Amount, RegistryConfig};

    use crate::state::{AppConfig, AppState};

    /// Bearer credentials of the authority in [`university_app`].
    pub const AUTHORITY: &str = "university:uni-key";

    /// An app whose authority is `university`, with no shared secret.
    pub fn university_app(fee: u64) -> (Router, AppState) {
        let registry = RegistryConfig::new(AccountId::new("university").unwrap(), Amount::new(fee));
        let config = AppConfig {
            authority_token: Some("uni-key".into()),
            ..AppConfig::default()
        };
        let state = AppState::new(registry, config);
        (super::app(state.clone()), state)
    }

    /// Send one request as `caller` and decode the JSON response.
    pub async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        caller: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(caller) = caller {
            builder = builder.header("Authorization", format!("Bearer {caller}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }
}
