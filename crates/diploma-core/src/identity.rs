//! # Identity Newtypes
//!
//! Domain-primitive newtypes for the identifiers and opaque byte strings
//! that flow through the registry. Each is a distinct type: you cannot
//! pass a [`DiplomaSignature`] where a [`CredentialSignature`] is expected,
//! or an [`AccountId`] where a [`CredentialId`] is expected.
//!
//! ## Validation
//!
//! String identifiers validate at construction and at deserialization.
//! Signatures accept any byte string, including the empty one; their
//! meaning is external to the registry.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// String identifiers
// ---------------------------------------------------------------------------

/// A student's credential identifier.
///
/// Opaque to the registry (typically a hash of personal data computed
/// off-system). Unique per active registration.
///
/// # Validation
///
/// - Must not be empty.
/// - At most [`CredentialId::MAX_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CredentialId(String);

impl_validating_deserialize!(CredentialId);

impl CredentialId {
    /// Maximum length of a credential identifier in bytes.
    pub const MAX_LEN: usize = 512;

    /// Create a credential identifier, rejecting empty or oversized values.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::EmptyCredentialId);
        }
        if s.len() > Self::MAX_LEN {
            return Err(ValidationError::CredentialIdTooLong {
                len: s.len(),
                max: Self::MAX_LEN,
            });
        }
        Ok(Self(s))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CredentialId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// The identity of a party calling into the registry: a student, the
/// authority, or any payer.
///
/// # Validation
///
/// - Must not be empty.
/// - Must not contain whitespace or `:` (the bearer token separator).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AccountId(String);

impl_validating_deserialize!(AccountId);

impl AccountId {
    /// Create an account identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == ':') {
            return Err(ValidationError::InvalidAccountId(s));
        }
        Ok(Self(s))
    }

    /// Access the account string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for AccountId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// Opaque signature bytes
// ---------------------------------------------------------------------------

/// Signature over an issued diploma. Key of the diploma ledger.
///
/// Serializes as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiplomaSignature(#[serde(with = "hex")] Vec<u8>);

impl DiplomaSignature {
    /// Wrap raw signature bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse a hex string (case-insensitive, optional `0x` prefix).
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        decode_signature_hex(s).map(Self)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Render as lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl std::fmt::Display for DiplomaSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl std::str::FromStr for DiplomaSignature {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Signature over a student's credential, as claimed at issuance.
///
/// Serializes as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialSignature(#[serde(with = "hex")] Vec<u8>);

impl CredentialSignature {
    /// Wrap raw signature bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse a hex string (case-insensitive, optional `0x` prefix).
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        decode_signature_hex(s).map(Self)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Render as lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl std::fmt::Display for CredentialSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl std::str::FromStr for CredentialSignature {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

fn decode_signature_hex(s: &str) -> Result<Vec<u8>, ValidationError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| ValidationError::InvalidSignatureHex(format!("{s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- CredentialId --

    #[test]
    fn credential_id_accepts_opaque_text() {
        let id = CredentialId::new("sha256:9f86d081884c7d65").unwrap();
        assert_eq!(id.as_str(), "sha256:9f86d081884c7d65");
        assert_eq!(id.to_string(), "sha256:9f86d081884c7d65");
    }

    #[test]
    fn credential_id_rejects_empty() {
        assert_eq!(
            CredentialId::new(""),
            Err(ValidationError::EmptyCredentialId)
        );
    }

    #[test]
    fn credential_id_rejects_oversized() {
        let long = "x".repeat(CredentialId::MAX_LEN + 1);
        assert!(matches!(
            CredentialId::new(long),
            Err(ValidationError::CredentialIdTooLong { len: 513, max: 512 })
        ));
        assert!(CredentialId::new("x".repeat(CredentialId::MAX_LEN)).is_ok());
    }

    #[test]
    fn credential_id_deserialize_validates() {
        let ok: CredentialId = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(ok.as_str(), "alice");
        let err = serde_json::from_str::<CredentialId>("\"\"");
        assert!(err.is_err());
    }

    // -- AccountId --

    #[test]
    fn account_id_rejects_separator_and_whitespace() {
        assert!(AccountId::new("university").is_ok());
        assert!(AccountId::new("0xAbC123").is_ok());
        assert!(AccountId::new("").is_err());
        assert!(AccountId::new("uni:secret").is_err());
        assert!(AccountId::new("two words").is_err());
    }

    #[test]
    fn account_id_from_str() {
        let a: AccountId = "registrar".parse().unwrap();
        assert_eq!(a.as_str(), "registrar");
    }

    // -- Signatures --

    #[test]
    fn signature_hex_parsing_accepts_prefix_and_case() {
        let a = DiplomaSignature::from_hex("0xDEADbeef").unwrap();
        let b = DiplomaSignature::from_hex("deadbeef").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(a.to_hex(), "deadbeef");
        assert_eq!(a.to_string(), "0xdeadbeef");
    }

    #[test]
    fn signature_hex_parsing_rejects_garbage() {
        assert!(CredentialSignature::from_hex("xyz").is_err());
        assert!(CredentialSignature::from_hex("abc").is_err());
    }

    #[test]
    fn empty_signature_is_permitted() {
        let s = CredentialSignature::from_hex("").unwrap();
        assert!(s.as_bytes().is_empty());
    }

    #[test]
    fn signature_serializes_as_hex_string() {
        let s = CredentialSignature::new(vec![0x01, 0xab]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"01ab\"");
        let parsed: CredentialSignature = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, s);
    }
}
