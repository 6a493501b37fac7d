// Copyright 2025 Cowboy AI, LLC.

//! Scope options
//!
//! None of these change what a composite does or which composite `wrap`
//! returns; they only affect bookkeeping and logging.

use serde::{Deserialize, Serialize};

use crate::errors::{EffectError, EffectResult};

/// Options for an effect scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScopeOptions {
    /// Name recorded in log events
    pub label: Option<String>,
    /// Sweep orphaned entries on a miss once the table has doubled
    pub auto_prune: bool,
    /// Emit a trace event every time a composite runs
    pub trace_invocations: bool,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            label: None,
            auto_prune: true,
            trace_invocations: false,
        }
    }
}

impl ScopeOptions {
    /// Options with a label
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Parse options from JSON, filling omitted fields with defaults
    pub fn from_json(raw: &str) -> EffectResult<Self> {
        let options: ScopeOptions = serde_json::from_str(raw)?;
        options.validate()?;
        Ok(options)
    }

    /// Check field values
    pub fn validate(&self) -> EffectResult<()> {
        if let Some(label) = &self.label {
            if label.trim().is_empty() {
                return Err(EffectError::invalid_options("label must not be blank"));
            }
        }
        Ok(())
    }

    /// Label for log fields
    pub(crate) fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or("anonymous")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ScopeOptions::default();
        assert_eq!(options.label, None);
        assert!(options.auto_prune);
        assert!(!options.trace_invocations);
        assert_eq!(options.label_or_default(), "anonymous");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options = ScopeOptions::from_json(r#"{ "label": "toolbar" }"#).unwrap();
        assert_eq!(options, ScopeOptions::labeled("toolbar"));
    }

    #[test]
    fn test_full_json() {
        let options = ScopeOptions::from_json(
            r#"{ "label": "grid", "auto_prune": false, "trace_invocations": true }"#,
        )
        .unwrap();

        assert_eq!(options.label.as_deref(), Some("grid"));
        assert!(!options.auto_prune);
        assert!(options.trace_invocations);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ScopeOptions::from_json(r#"{ "ttl": 30 }"#).unwrap_err();
        assert!(err.is_serialization_error());
    }

    #[test]
    fn test_blank_label_rejected() {
        let err = ScopeOptions::from_json(r#"{ "label": "  " }"#).unwrap_err();
        assert_eq!(
            err,
            EffectError::InvalidOptions("label must not be blank".to_string())
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let options = ScopeOptions {
            label: Some("menu".to_string()),
            auto_prune: false,
            trace_invocations: true,
        };

        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(ScopeOptions::from_json(&json).unwrap(), options);
    }
}
