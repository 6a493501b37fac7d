// Copyright 2025 Cowboy AI, LLC.

//! Memoize-on-dependency-change cell

use crate::dependency::Dependencies;

/// Outcome of a [`DependencyCell::resolve`] call
#[derive(Debug)]
pub struct Resolved<'a, V> {
    /// The current value
    pub value: &'a V,
    /// Whether the value was (re)computed by this call
    pub recomputed: bool,
}

/// Holds the last dependency sequence and the value computed for it
///
/// The value is recomputed only when the sequence handed to
/// [`resolve`](Self::resolve) is not shallow-equal to the remembered one.
#[derive(Debug)]
pub struct DependencyCell<V> {
    slot: Option<(Dependencies, V)>,
}

impl<V> DependencyCell<V> {
    /// Create an empty cell
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Return the remembered value, recomputing it if `deps` changed
    pub fn resolve<F>(&mut self, deps: Dependencies, compute: F) -> Resolved<'_, V>
    where
        F: FnOnce() -> V,
    {
        let (entry, recomputed) = match self.slot.take() {
            Some((last, value)) if last.shallow_eq(&deps) => ((last, value), false),
            previous => {
                // still remembered if `compute` panics
                self.slot = previous;
                ((deps, compute()), true)
            }
        };

        let (_, value) = self.slot.insert(entry);
        Resolved {
            value: &*value,
            recomputed,
        }
    }

    /// The remembered value, if any
    pub fn current(&self) -> Option<&V> {
        self.slot.as_ref().map(|(_, value)| value)
    }

    /// The remembered dependency sequence, if any
    pub fn dependencies(&self) -> Option<&Dependencies> {
        self.slot.as_ref().map(|(deps, _)| deps)
    }

    /// Forget the remembered value
    pub fn clear(&mut self) {
        self.slot = None;
    }
}

impl<V> Default for DependencyCell<V> {
    fn default() -> Self {
        Self::new()
    }
}
