// Copyright 2025 Cowboy AI, LLC.

//! # CIM Effect Cache
//!
//! Identity-stable composition of a side effect with arbitrary operations.
//!
//! Given a base effect, gated by a dependency list, and any target
//! operation, this crate produces a composite operation that runs the effect
//! first and then forwards its arguments to the target. Composites are cached
//! per target identity, so asking again for the same base effect and the same
//! target yields the *same* composite. Consumers that compare handlers by
//! identity (to skip re-subscription or re-binding) can rely on that.
//!
//! - **Dependencies**: shallow, position-sensitive dependency sequences
//! - **Identity Provider**: keeps the base effect's identity until its
//!   dependencies change
//! - **Composition Cache**: one composite per target, for one base effect
//! - **Effect Scope**: one call-site; starts a new cache whenever the base
//!   effect's identity changes
//!
//! ## Design Principles
//!
//! 1. **Identity over equality**: operations are compared by allocation,
//!    never by behavior
//! 2. **Epochs**: a cache never outlives the base effect it was built for
//! 3. **Transparency**: composites add no error handling; whatever the
//!    effect or target does propagates unchanged
//! 4. **Confinement**: everything is `Rc`-based and stays on one thread
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use cim_effect_cache::{deps, operation, EffectScope, Operation};
//!
//! let counter = Rc::new(Cell::new(0));
//! let mut increments = EffectScope::new();
//! let mut doubles = EffectScope::new();
//!
//! let c = counter.clone();
//! let with_increment = increments.create_with_effect(move || c.set(c.get() + 1), deps![]);
//! let c = counter.clone();
//! let with_double = doubles.create_with_effect(move || c.set(c.get() * 2), deps![]);
//!
//! let noop: Operation<(), ()> = operation(|()| ());
//! let increment_then_double = with_increment.wrap(&with_double.wrap(&noop));
//!
//! increment_then_double(());
//! assert_eq!(counter.get(), 2);
//! ```

#![warn(missing_docs)]

mod composition_cache;
mod dependency;
mod errors;
mod identifiers;
mod memo_cell;
mod operation;
mod options;
mod provider;
mod retention;
mod scope;
mod stats;

pub use composition_cache::{CacheState, CompositionCache};
pub use dependency::{Dependencies, Dependency, RefIdentity};
pub use errors::{EffectError, EffectResult};
pub use identifiers::{EpochId, ScopeId};
pub use memo_cell::{DependencyCell, Resolved};
pub use operation::{
    base_operation, operation, same_operation, BaseOperation, Operation, OperationKey,
};
pub use options::ScopeOptions;
pub use provider::{DependencyGatedProvider, IdentityProvider};
pub use scope::{EffectScope, WithEffect};
pub use stats::CacheStats;
