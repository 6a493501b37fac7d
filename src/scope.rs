// Copyright 2025 Cowboy AI, LLC.

//! Effect scopes
//!
//! An [`EffectScope`] stands for one logical call-site. It owns the identity
//! provider for that call-site's base operation and the composition cache
//! of the current epoch. The host drives it:
//!
//! - [`on_dependencies_changed`](EffectScope::on_dependencies_changed) each
//!   time the call-site runs (a render, a job tick, a config reload)
//! - [`handle`](EffectScope::handle) or
//!   [`create_with_effect`](EffectScope::create_with_effect) to get the
//!   `wrap` function of the current epoch
//! - [`dispose`](EffectScope::dispose) when the call-site goes away
//!
//! Handles borrow the scope, so no handle survives an epoch change.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use cim_effect_cache::{deps, operation, same_operation, EffectScope, Operation};
//!
//! let clicks = Rc::new(Cell::new(0));
//! let mut scope = EffectScope::new();
//!
//! let c = clicks.clone();
//! let with_click = scope.create_with_effect(move || c.set(c.get() + 1), deps![]);
//!
//! let handler: Operation<(i32,), i32> = operation(|(x,)| x * 2);
//! let wrapped = with_click.wrap(&handler);
//!
//! assert!(same_operation(&wrapped, &with_click.wrap(&handler)));
//! assert_eq!(wrapped((21,)), 42);
//! assert_eq!(clicks.get(), 1);
//! ```

use std::fmt;

use tracing::debug;

use crate::composition_cache::{CacheState, CompositionCache};
use crate::dependency::Dependencies;
use crate::errors::EffectResult;
use crate::identifiers::{EpochId, ScopeId};
use crate::operation::{base_operation, BaseOperation, Operation, OperationKey};
use crate::options::ScopeOptions;
use crate::provider::{DependencyGatedProvider, IdentityProvider};
use crate::stats::CacheStats;

/// Owner of one call-site's base operation and composition cache
pub struct EffectScope<P: IdentityProvider = DependencyGatedProvider> {
    id: ScopeId,
    options: ScopeOptions,
    provider: P,
    epoch: EpochId,
    cache: Option<CompositionCache>,
    retired: CacheStats,
}

impl EffectScope {
    /// Create a scope with default options
    pub fn new() -> Self {
        Self::with_options(ScopeOptions::default())
    }

    /// Create a scope with the given options
    pub fn with_options(options: ScopeOptions) -> Self {
        Self::with_provider(DependencyGatedProvider::new(), options)
    }

    /// Create a scope from JSON options
    pub fn from_json(raw: &str) -> EffectResult<Self> {
        Ok(Self::with_options(ScopeOptions::from_json(raw)?))
    }
}

impl Default for EffectScope {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: IdentityProvider> EffectScope<P> {
    /// Create a scope that resolves base operations through `provider`
    pub fn with_provider(provider: P, options: ScopeOptions) -> Self {
        Self {
            id: ScopeId::new(),
            options,
            provider,
            epoch: EpochId::NONE,
            cache: None,
            retired: CacheStats::default(),
        }
    }

    /// Report the call-site's current effect and dependencies
    ///
    /// Returns `true` when the base operation's identity changed, which
    /// discards the previous epoch's cache and starts a new, empty one.
    pub fn on_dependencies_changed<F>(&mut self, effect: F, deps: Dependencies) -> bool
    where
        F: Fn() + 'static,
    {
        self.resolve(base_operation(effect), deps).0
    }

    /// Like [`on_dependencies_changed`](Self::on_dependencies_changed) for an
    /// effect that is already a shared handle
    pub fn on_dependencies_changed_with(
        &mut self,
        effect: BaseOperation,
        deps: Dependencies,
    ) -> bool {
        self.resolve(effect, deps).0
    }

    /// Report the current effect and dependencies, then return the `wrap`
    /// function of the resulting epoch
    pub fn create_with_effect<F>(&mut self, effect: F, deps: Dependencies) -> WithEffect<'_>
    where
        F: Fn() + 'static,
    {
        let (_, cache) = self.resolve(base_operation(effect), deps);
        WithEffect { cache }
    }

    /// The `wrap` function of the current epoch, if one has started
    pub fn handle(&self) -> Option<WithEffect<'_>> {
        self.cache.as_ref().map(|cache| WithEffect { cache })
    }

    /// Scope identifier
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Current epoch; [`EpochId::NONE`] before the first resolution
    pub fn epoch(&self) -> EpochId {
        self.epoch
    }

    /// Options this scope was built with
    pub fn options(&self) -> &ScopeOptions {
        &self.options
    }

    /// State of the current epoch's table
    pub fn state(&self) -> CacheState {
        self.cache
            .as_ref()
            .map_or(CacheState::Uninitialized, CompositionCache::state)
    }

    /// Counters across every epoch of this scope
    pub fn stats(&self) -> CacheStats {
        let current = self
            .cache
            .as_ref()
            .map(CompositionCache::stats)
            .unwrap_or_default();
        CacheStats {
            epochs: self.epoch.value(),
            ..self.retired + current
        }
    }

    /// Tear the scope down, dropping the current cache
    pub fn dispose(mut self) -> CacheStats {
        let stats = self.stats();
        if let Some(cache) = self.cache.take() {
            debug!(
                scope = %self.id,
                label = self.options.label_or_default(),
                epoch = %self.epoch,
                entries = cache.len(),
                "Disposing effect scope"
            );
        }
        stats
    }

    fn resolve(&mut self, effect: BaseOperation, deps: Dependencies) -> (bool, &CompositionCache) {
        let base = self.provider.resolve(effect, deps);

        let (cache, changed) = match self.cache.take() {
            Some(cache) if cache.is_for(&base) => (cache, false),
            previous => {
                if let Some(previous) = previous {
                    debug!(
                        scope = %self.id,
                        label = self.options.label_or_default(),
                        epoch = %self.epoch,
                        entries = previous.len(),
                        "Discarding composition cache"
                    );
                    self.retired = self.retired + previous.stats();
                }
                self.epoch = self.epoch.next();
                let key = OperationKey::of(&base);
                debug!(
                    scope = %self.id,
                    label = self.options.label_or_default(),
                    epoch = %self.epoch,
                    base = %key,
                    "Starting epoch"
                );
                (
                    CompositionCache::with_context(base, self.id, self.epoch, &self.options),
                    true,
                )
            }
        };

        let cache: &CompositionCache = self.cache.insert(cache);
        (changed, cache)
    }
}

impl<P: IdentityProvider> fmt::Debug for EffectScope<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectScope")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("epoch", &self.epoch)
            .field("cache", &self.cache)
            .finish()
    }
}

/// The `wrap` function of one epoch
#[derive(Debug, Clone, Copy)]
pub struct WithEffect<'s> {
    cache: &'s CompositionCache,
}

impl<'s> WithEffect<'s> {
    /// Composite of this epoch's base operation and `target`
    ///
    /// See [`CompositionCache::wrap`].
    pub fn wrap<A: 'static, R: 'static>(&self, target: &Operation<A, R>) -> Operation<A, R> {
        self.cache.wrap(target)
    }

    /// Whether a composite for `target` is cached in this epoch
    pub fn contains<A: 'static, R: 'static>(&self, target: &Operation<A, R>) -> bool {
        self.cache.contains(target)
    }

    /// Entries cached in this epoch
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether nothing is cached in this epoch
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Epoch this handle belongs to
    pub fn epoch(&self) -> EpochId {
        self.cache.epoch()
    }

    /// The epoch's base operation
    pub fn base(&self) -> &'s BaseOperation {
        self.cache.base()
    }

    /// The underlying cache
    pub fn cache(&self) -> &'s CompositionCache {
        self.cache
    }
}
