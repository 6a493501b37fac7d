// Copyright 2025 Cowboy AI, LLC.

//! Identifier types for scopes and epochs

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Scope ID - identifies one effect scope (one logical call-site)
///
/// Only used to correlate log events; scopes never look each other up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(Uuid);

impl ScopeId {
    /// Create a new random scope ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ScopeId> for Uuid {
    fn from(id: ScopeId) -> Self {
        id.0
    }
}

/// Epoch ID - position of an epoch within its scope
///
/// `EpochId::NONE` means no base operation has been resolved yet; the first
/// resolution starts epoch 1 and every identity change advances by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EpochId(u64);

impl EpochId {
    /// Before the first resolution
    pub const NONE: EpochId = EpochId(0);

    /// The epoch after this one
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EpochId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_id_uniqueness() {
        let a = ScopeId::new();
        let b = ScopeId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_scope_id_uuid_round_trip() {
        let uuid = Uuid::new_v4();
        let id = ScopeId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(Uuid::from(id), uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_epoch_progression() {
        let first = EpochId::NONE.next();
        assert_eq!(first.value(), 1);
        assert!(first.next() > first);
        assert_eq!(first.to_string(), "epoch-1");
    }

    #[test]
    fn test_epoch_serde() {
        let epoch = EpochId::NONE.next().next();
        let json = serde_json::to_string(&epoch).unwrap();
        assert_eq!(json, "2");
        let back: EpochId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, epoch);
    }
}
