// Copyright 2025 Cowboy AI, LLC.

//! Composition cache
//!
//! One cache belongs to one base operation. For every target handed to
//! [`CompositionCache::wrap`] it builds at most one composite, a closure
//! that runs the base operation and then forwards its arguments to the
//! target, and keeps returning that same composite for as long as the
//! entry is live.
//!
//! # Entry lifetime
//!
//! The table keys on the target's allocation and keeps only a `Weak` handle
//! to it; the composite owns the target. An entry is orphaned once neither
//! the target nor the composite is owned by anything but composition caches
//! (tables and the composites they hold, in this or any other scope on the
//! thread). At that point nobody can ask for the composite again, so
//! dropping the entry is unobservable. Orphans are dropped by
//! [`prune`](CompositionCache::prune). With auto-pruning enabled, a miss
//! also sweeps the table once it has grown to a watermark, which is then
//! set to twice the surviving size, so filling a table stays linear.
//! Anything else lives until the cache itself is dropped.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::identifiers::{EpochId, ScopeId};
use crate::operation::{BaseOperation, Operation, OperationKey};
use crate::options::ScopeOptions;
use crate::retention;
use crate::stats::{CacheStats, StatsRecorder};

/// Lifecycle state of a cache's lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No `wrap` call yet; the table is not allocated
    Uninitialized,
    /// The table exists
    Populated {
        /// Entries currently held
        entries: usize,
    },
}

trait CacheEntry {
    fn is_orphaned(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
}

struct Entry<A, R> {
    target: Weak<dyn Fn(A) -> R>,
    composite: Operation<A, R>,
    target_key: OperationKey,
    composite_key: OperationKey,
}

impl<A, R> Entry<A, R> {
    fn new(target: &Operation<A, R>, composite: Operation<A, R>) -> Self {
        let target_key = OperationKey::of(target);
        let composite_key = OperationKey::of(&composite);
        retention::register(target_key, composite_key);
        Self {
            target: Rc::downgrade(target),
            composite,
            target_key,
            composite_key,
        }
    }
}

impl<A, R> Drop for Entry<A, R> {
    fn drop(&mut self) {
        retention::release(self.target_key, self.composite_key);
    }
}

impl<A: 'static, R: 'static> CacheEntry for Entry<A, R> {
    fn is_orphaned(&self) -> bool {
        let external = |strong: usize, key: OperationKey| {
            strong.saturating_sub(retention::internal_references(key))
        };
        external(Rc::strong_count(&self.composite), self.composite_key) == 0
            && external(self.target.strong_count(), self.target_key) == 0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

type Table = HashMap<OperationKey, Box<dyn CacheEntry>>;

/// Table size that triggers the first automatic sweep
const MIN_PRUNE_AT: usize = 32;

/// Composites of one base operation, keyed by target identity
pub struct CompositionCache {
    base: BaseOperation,
    scope: ScopeId,
    epoch: EpochId,
    auto_prune: bool,
    trace_invocations: bool,
    table: RefCell<Option<Table>>,
    prune_at: Cell<usize>,
    stats: StatsRecorder,
}

impl CompositionCache {
    /// Create a standalone cache for `base` with default options
    pub fn new(base: BaseOperation) -> Self {
        Self::with_context(
            base,
            ScopeId::new(),
            EpochId::NONE.next(),
            &ScopeOptions::default(),
        )
    }

    /// Create a cache for one epoch of a scope
    pub fn with_context(
        base: BaseOperation,
        scope: ScopeId,
        epoch: EpochId,
        options: &ScopeOptions,
    ) -> Self {
        Self {
            base,
            scope,
            epoch,
            auto_prune: options.auto_prune,
            trace_invocations: options.trace_invocations,
            table: RefCell::new(None),
            prune_at: Cell::new(MIN_PRUNE_AT),
            stats: StatsRecorder::default(),
        }
    }

    /// The base operation every composite runs first
    pub fn base(&self) -> &BaseOperation {
        &self.base
    }

    /// Whether this cache was built for exactly this base operation
    pub fn is_for(&self, base: &BaseOperation) -> bool {
        Rc::ptr_eq(&self.base, base)
    }

    /// Epoch this cache belongs to
    pub fn epoch(&self) -> EpochId {
        self.epoch
    }

    /// Return the composite for `target`, building it on first request
    ///
    /// The composite runs the base operation, ignores its output, then calls
    /// `target` with the arguments it received and returns whatever `target`
    /// returns. Panics from either unwind through the composite untouched;
    /// if the base operation panics, `target` is not called.
    pub fn wrap<A: 'static, R: 'static>(&self, target: &Operation<A, R>) -> Operation<A, R> {
        let key = OperationKey::of(target);
        let mut evicted: Vec<Box<dyn CacheEntry>> = Vec::new();

        let composite = {
            let mut slot = self.table.borrow_mut();
            let table = slot.get_or_insert_with(|| {
                trace!(scope = %self.scope, epoch = %self.epoch, "Allocating composition table");
                HashMap::new()
            });

            let cached = table
                .get(&key)
                .map(|entry| entry.as_any().downcast_ref::<Entry<A, R>>());
            // a live entry pins the target's allocation, which has exactly one `dyn Fn` type
            debug_assert!(!matches!(cached, Some(None)), "entry for {key} has another shape");
            if let Some(Some(entry)) = cached {
                self.stats.hit();
                trace!(
                    scope = %self.scope,
                    epoch = %self.epoch,
                    target = %key,
                    "Composite cache hit"
                );
                return Rc::clone(&entry.composite);
            }

            self.stats.miss();
            trace!(
                scope = %self.scope,
                epoch = %self.epoch,
                target = %key,
                "Composite cache miss"
            );

            if self.auto_prune && table.len() >= self.prune_at.get() {
                evicted = self.sweep(table);
            }

            let composite = self.compose(Rc::clone(target));
            let entry = Entry::new(target, Rc::clone(&composite));
            if let Some(previous) = table.insert(key, Box::new(entry)) {
                evicted.push(previous);
            }
            composite
        };

        // entries may own user closures whose drop re-enters this cache
        drop(evicted);
        composite
    }

    /// Whether a composite for `target` is held
    pub fn contains<A: 'static, R: 'static>(&self, target: &Operation<A, R>) -> bool {
        let key = OperationKey::of(target);
        self.table
            .borrow()
            .as_ref()
            .and_then(|table| table.get(&key))
            .is_some_and(|entry| entry.as_any().is::<Entry<A, R>>())
    }

    /// Drop orphaned entries, returning how many were dropped
    pub fn prune(&self) -> usize {
        let evicted = match self.table.borrow_mut().as_mut() {
            Some(table) => self.sweep(table),
            None => return 0,
        };
        let pruned = evicted.len();
        drop(evicted);
        pruned
    }

    /// Number of entries held
    pub fn len(&self) -> usize {
        self.table.borrow().as_ref().map_or(0, HashMap::len)
    }

    /// Whether no entries are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lifecycle state of the table
    pub fn state(&self) -> CacheState {
        match self.table.borrow().as_ref() {
            None => CacheState::Uninitialized,
            Some(table) => CacheState::Populated {
                entries: table.len(),
            },
        }
    }

    /// Counters for this cache
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Remove orphans from `table` and move the watermark past its new size
    ///
    /// The removed entries are returned so the caller can drop them once the
    /// table borrow is released.
    fn sweep(&self, table: &mut Table) -> Vec<Box<dyn CacheEntry>> {
        let evicted = drain_orphans(table);
        let pruned = evicted.len();
        self.stats.swept(pruned);
        self.prune_at.set((2 * table.len()).max(MIN_PRUNE_AT));
        if pruned > 0 {
            debug!(
                scope = %self.scope,
                epoch = %self.epoch,
                pruned,
                remaining = table.len(),
                "Pruned orphaned composites"
            );
        }
        evicted
    }

    fn compose<A: 'static, R: 'static>(&self, target: Operation<A, R>) -> Operation<A, R> {
        let base = Rc::clone(&self.base);
        let traced = self.trace_invocations;
        let scope = self.scope;
        let epoch = self.epoch;
        let key = OperationKey::of(&target);

        Rc::new(move |args: A| {
            if traced {
                trace!(scope = %scope, epoch = %epoch, target = %key, "Invoking composite");
            }
            base();
            target(args)
        })
    }
}

fn drain_orphans(table: &mut Table) -> Vec<Box<dyn CacheEntry>> {
    let orphaned: Vec<OperationKey> = table
        .iter()
        .filter(|(_, entry)| entry.is_orphaned())
        .map(|(key, _)| *key)
        .collect();

    orphaned
        .into_iter()
        .filter_map(|key| table.remove(&key))
        .collect()
}

impl fmt::Debug for CompositionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositionCache")
            .field("base", &OperationKey::of(&self.base))
            .field("scope", &self.scope)
            .field("epoch", &self.epoch)
            .field("state", &self.state())
            .finish()
    }
}
