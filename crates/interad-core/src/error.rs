#![forbid(unsafe_code)]

//! Error taxonomy for the ad session subsystem.
//!
//! Errors are values throughout: construction failures are returned from the
//! factory, provider/initialization failures flow through the registry's
//! failure continuations, and native load/show failures are wrapped with the
//! original code and message intact.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::bridge::BridgeError;

/// Synthetic code for a provider identifier with no native plugin.
pub const CODE_UNKNOWN_PROVIDER: i64 = -1;
/// Synthetic code for invalid session construction input.
pub const CODE_INVALID_OPTIONS: i64 = -2;
/// Synthetic code for registration against an undeclared event name.
pub const CODE_UNKNOWN_EVENT: i64 = -3;

/// Which stage of the lifecycle produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdErrorKind {
    /// Missing or empty required identity field at construction.
    InvalidOptions,
    /// The provider identifier resolved to no native plugin.
    UnknownProvider,
    /// The native initializer reported non-success.
    InitFailed,
    /// A native load/show call invoked its failure callback.
    Native,
    /// Registration against an undeclared event name.
    UnknownEvent,
}

/// Structured error carrying a stable code and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdError {
    pub kind: AdErrorKind,
    pub code: i64,
    pub message: String,
}

impl AdError {
    /// Construction-time validation failure for a named field.
    #[must_use]
    pub fn invalid_options(field: &str) -> Self {
        Self {
            kind: AdErrorKind::InvalidOptions,
            code: CODE_INVALID_OPTIONS,
            message: format!("{field} invalid"),
        }
    }

    /// The host knows no plugin for this provider identifier.
    #[must_use]
    pub fn unknown_provider(provider: &str) -> Self {
        Self {
            kind: AdErrorKind::UnknownProvider,
            code: CODE_UNKNOWN_PROVIDER,
            message: format!("provider [{provider}] invalid"),
        }
    }

    /// The native initializer reported non-success; code/message verbatim.
    #[must_use]
    pub fn init_failed(code: i64, message: impl Into<String>) -> Self {
        Self {
            kind: AdErrorKind::InitFailed,
            code,
            message: message.into(),
        }
    }

    /// Registration against an event name the session never declared.
    #[must_use]
    pub fn unknown_event(name: &str) -> Self {
        Self {
            kind: AdErrorKind::UnknownEvent,
            code: CODE_UNKNOWN_EVENT,
            message: format!("event [{name}] invalid"),
        }
    }

    /// JSON payload for event dispatch (`{ code, message }`).
    #[must_use]
    pub fn to_payload(&self) -> Value {
        serde_json::json!({ "code": self.code, "message": self.message })
    }
}

impl fmt::Display for AdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for AdError {}

impl From<BridgeError> for AdError {
    fn from(err: BridgeError) -> Self {
        Self {
            kind: AdErrorKind::Native,
            code: err.code,
            message: err.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_names_the_provider() {
        let err = AdError::unknown_provider("csj");
        assert_eq!(err.code, CODE_UNKNOWN_PROVIDER);
        assert_eq!(err.message, "provider [csj] invalid");
        assert_eq!(err.kind, AdErrorKind::UnknownProvider);
    }

    #[test]
    fn native_error_keeps_code_and_message() {
        let err = AdError::from(BridgeError::new(1005, "no ad"));
        assert_eq!(err.kind, AdErrorKind::Native);
        assert_eq!(err.code, 1005);
        assert_eq!(err.message, "no ad");
    }

    #[test]
    fn payload_has_code_and_message_only() {
        let err = AdError::invalid_options("provider");
        assert_eq!(
            err.to_payload(),
            serde_json::json!({ "code": CODE_INVALID_OPTIONS, "message": "provider invalid" })
        );
    }

    #[test]
    fn display_includes_code() {
        let err = AdError::init_failed(-5, "sdk refused");
        assert_eq!(err.to_string(), "sdk refused (code -5)");
    }
}
