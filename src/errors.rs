// Copyright 2025 Cowboy AI, LLC.

//! Error types for scope configuration
//!
//! Wrapping and invoking composite operations never fail on their own: any
//! failure comes from the caller's effect or target and is propagated as-is.
//! The errors here only arise while building a scope from external
//! configuration.

use thiserror::Error;

/// Errors that can occur while configuring an effect scope
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    /// Options were well-formed but not acceptable
    #[error("Invalid scope options: {0}")]
    InvalidOptions(String),

    /// Options could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for scope configuration
pub type EffectResult<T> = Result<T, EffectError>;

impl From<serde_json::Error> for EffectError {
    fn from(err: serde_json::Error) -> Self {
        EffectError::Serialization(err.to_string())
    }
}

impl EffectError {
    /// Create an invalid options error
    pub fn invalid_options(msg: impl Into<String>) -> Self {
        EffectError::InvalidOptions(msg.into())
    }

    /// Check if this error came from decoding
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, EffectError::Serialization(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ScopeOptions;

    #[test]
    fn test_error_display_messages() {
        let err = EffectError::InvalidOptions("label must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid scope options: label must not be empty"
        );

        let err = EffectError::Serialization("unexpected end of input".to_string());
        assert_eq!(
            err.to_string(),
            "Serialization error: unexpected end of input"
        );
    }

    #[test]
    fn test_invalid_options_constructor() {
        let err = EffectError::invalid_options("bad");
        assert_eq!(err, EffectError::InvalidOptions("bad".to_string()));
        assert!(!err.is_serialization_error());
    }

    #[test]
    fn test_malformed_json_maps_to_serialization() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();

        let err: EffectError = serde_err.into();

        assert!(err.is_serialization_error());
        match err {
            EffectError::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization"),
        }
    }

    #[test]
    fn test_options_errors_by_cause() {
        assert!(ScopeOptions::from_json(r#"{ "auto_prune": 1 }"#)
            .unwrap_err()
            .is_serialization_error());
        assert!(ScopeOptions::from_json(r#"{ "retries": 3 }"#)
            .unwrap_err()
            .is_serialization_error());
        assert_eq!(
            ScopeOptions::from_json(r#"{ "label": "  " }"#),
            Err(EffectError::invalid_options("label must not be blank"))
        );
    }
}
