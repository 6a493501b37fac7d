// Copyright 2025 Cowboy AI, LLC.

//! Per-thread accounting of references owned by composition caches
//!
//! Every cache entry owns two strong references that do not count as
//! "someone outside still uses this": the table's reference to the
//! composite, and the composite's captured reference to the target. When
//! composites are wrapped again by another scope these internal references
//! chain across caches, so a plain strong count cannot tell a live entry
//! from an orphaned one. The registry records them so pruning can subtract
//! them out.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::operation::OperationKey;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Retention {
    tables: usize,
    captures: usize,
}

impl Retention {
    fn total(&self) -> usize {
        self.tables + self.captures
    }
}

thread_local! {
    static RETAINED: RefCell<HashMap<OperationKey, Retention>> = RefCell::new(HashMap::new());
}

/// Record a new entry: `composite` is held by a table and holds `target`
pub(crate) fn register(target: OperationKey, composite: OperationKey) {
    RETAINED.with(|retained| {
        let mut retained = retained.borrow_mut();
        retained.entry(composite).or_default().tables += 1;
        retained.entry(target).or_default().captures += 1;
    });
}

/// Undo [`register`]
pub(crate) fn release(target: OperationKey, composite: OperationKey) {
    // the registry may already be gone during thread teardown
    let _ = RETAINED.try_with(|retained| {
        let mut retained = retained.borrow_mut();
        if let Some(retention) = retained.get_mut(&composite) {
            retention.tables = retention.tables.saturating_sub(1);
        }
        if let Some(retention) = retained.get_mut(&target) {
            retention.captures = retention.captures.saturating_sub(1);
        }
        for key in [composite, target] {
            if retained.get(&key).is_some_and(|retention| retention.total() == 0) {
                retained.remove(&key);
            }
        }
    });
}

/// Strong references to `key` owned by caches
pub(crate) fn internal_references(key: OperationKey) -> usize {
    RETAINED
        .try_with(|retained| retained.borrow().get(&key).map_or(0, Retention::total))
        .unwrap_or(0)
}
