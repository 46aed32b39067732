//! # Registry Configuration
//!
//! The authority identity and the fee are fixed when a registry is
//! constructed. Neither has a setter anywhere in the workspace.
//!
//! ## File Format
//!
//! ```yaml
//! authority: university
//! fee: 100
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::DiplomaError;
use crate::identity::AccountId;

/// Construction-time configuration of a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// The single privileged identity (the deployer).
    pub authority: AccountId,
    /// Exact amount a student must attach to pay for a credential.
    pub fee: Amount,
}

impl RegistryConfig {
    /// Build a configuration from its parts.
    pub fn new(authority: AccountId, fee: Amount) -> Self {
        Self { authority, fee }
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, DiplomaError> {
        serde_yaml::from_str(text)
            .map_err(|e| DiplomaError::Config(format!("invalid registry config: {e}")))
    }

    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, DiplomaError> {
        if !path.exists() {
            return Err(DiplomaError::Config(format!(
                "registry config not found: {}",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}
