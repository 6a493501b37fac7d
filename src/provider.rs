// Copyright 2025 Cowboy AI, LLC.

//! Dependency-gated identity for base operations
//!
//! A provider turns "the effect as written at this call-site right now" into
//! "the effect whose identity the cache is keyed on". Hosts that already
//! memoize callbacks (a UI framework's own hook, for example) can implement
//! [`IdentityProvider`] themselves; everything else uses
//! [`DependencyGatedProvider`].

use std::rc::Rc;

use tracing::trace;

use crate::dependency::Dependencies;
use crate::memo_cell::DependencyCell;
use crate::operation::{BaseOperation, OperationKey};

/// Supplies a base operation whose identity only changes with its dependencies
///
/// Contract: for one provider, two consecutive calls with shallow-equal
/// dependency sequences return the same `Rc` allocation; otherwise the
/// returned allocation is one never returned before.
pub trait IdentityProvider {
    /// Resolve the base operation for this call
    fn resolve(&mut self, effect: BaseOperation, deps: Dependencies) -> BaseOperation;
}

/// Default provider backed by a [`DependencyCell`]
///
/// While dependencies are unchanged the effect passed in is discarded and
/// the remembered one returned, so the remembered effect keeps observing
/// whatever it captured when it was stored.
#[derive(Default)]
pub struct DependencyGatedProvider {
    cell: DependencyCell<BaseOperation>,
}

impl DependencyGatedProvider {
    /// Create a provider with nothing remembered
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently remembered base operation
    pub fn current(&self) -> Option<&BaseOperation> {
        self.cell.current()
    }
}

impl IdentityProvider for DependencyGatedProvider {
    fn resolve(&mut self, effect: BaseOperation, deps: Dependencies) -> BaseOperation {
        let resolved = self.cell.resolve(deps, || effect);
        let key = OperationKey::of(resolved.value);
        trace!(
            base = %key,
            recomputed = resolved.recomputed,
            "Resolved base operation"
        );
        Rc::clone(resolved.value)
    }
}
