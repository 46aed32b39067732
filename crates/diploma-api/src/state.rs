//! # Application State
//!
//! Shared state for the Axum application: one [`RegistryRuntime`] behind a
//! mutex, plus the service configuration.
//!
//! Every operation locks the runtime for its whole duration, so operations
//! are totally ordered. Handlers never hold the guard across an `.await`.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use diploma_core::{AccountId, Amount, DiplomaError, RegistryConfig};
use diploma_state::RegistryRuntime;

/// Application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared bearer secret. If `None`, the bearer token is the bare account.
    pub auth_token: Option<String>,
    /// Secret that authenticates the registry authority. If `None`, no
    /// caller can act as the authority.
    pub authority_token: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "authority_token",
                &self.authority_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            authority_token: None,
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `AUTH_TOKEN` and `AUTHORITY_TOKEN` from the process
    /// environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// An unparsable `PORT` falls back to the default. Empty tokens count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let auth_token = lookup("AUTH_TOKEN").filter(|t| !t.is_empty());
        let authority_token = lookup("AUTHORITY_TOKEN").filter(|t| !t.is_empty());
        Self {
            port,
            auth_token,
            authority_token,
        }
    }
}

/// Resolve the registry configuration from the process environment.
pub fn registry_config_from_env() -> Result<RegistryConfig, DiplomaError> {
    registry_config_from_lookup(|key| std::env::var(key).ok())
}

/// Resolve the registry configuration from an arbitrary variable source.
///
/// `DIPLOMA_CONFIG` names a YAML file and takes precedence. Otherwise
/// `DIPLOMA_AUTHORITY` is required and `DIPLOMA_FEE` defaults to zero.
pub fn registry_config_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<RegistryConfig, DiplomaError> {
    if let Some(path) = lookup("DIPLOMA_CONFIG") {
        return RegistryConfig::load(Path::new(&path));
    }

    let authority = lookup("DIPLOMA_AUTHORITY").ok_or_else(|| {
        DiplomaError::Config("set DIPLOMA_CONFIG or DIPLOMA_AUTHORITY".to_string())
    })?;
    let authority = AccountId::new(authority)?;

    let fee = match lookup("DIPLOMA_FEE") {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| DiplomaError::Config(format!("invalid DIPLOMA_FEE {raw:?}: {e}")))?,
        None => 0,
    };

    Ok(RegistryConfig::new(authority, Amount::new(fee)))
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub runtime: Arc<Mutex<RegistryRuntime>>,
    pub config: AppConfig,
}

impl AppState {
    /// Create state around a fresh registry.
    pub fn new(registry: RegistryConfig, config: AppConfig) -> Self {
        Self::from_runtime(RegistryRuntime::new(registry), config)
    }

    /// Create state around an existing runtime.
    pub fn from_runtime(runtime: RegistryRuntime, config: AppConfig) -> Self {
        Self {
            runtime: Arc::new(Mutex::new(runtime)),
            config,
        }
    }
}
