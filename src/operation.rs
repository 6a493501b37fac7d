// Copyright 2025 Cowboy AI, LLC.

//! Operation handles and their identity
//!
//! Operations are reference-counted closures. Two handles denote the same
//! operation when they point at the same allocation; what the closures do
//! is never compared. Arguments are passed as a single tuple so one
//! signature covers every arity: `Operation<(), R>`, `Operation<(i32,), R>`,
//! `Operation<(i32, i32), R>` and so on.

use std::fmt;
use std::rc::{Rc, Weak};

/// A target or composite operation taking its arguments as a tuple `A`
pub type Operation<A, R> = Rc<dyn Fn(A) -> R>;

/// A zero-argument operation run for its side effect
pub type BaseOperation = Rc<dyn Fn()>;

/// Wrap a closure as a shareable [`Operation`]
///
/// Every call allocates, so every call yields a distinct identity.
pub fn operation<A, R, F>(f: F) -> Operation<A, R>
where
    F: Fn(A) -> R + 'static,
{
    Rc::new(f)
}

/// Wrap a closure as a shareable [`BaseOperation`]
pub fn base_operation<F>(f: F) -> BaseOperation
where
    F: Fn() + 'static,
{
    Rc::new(f)
}

/// Identity of an operation: the address of its allocation
///
/// A key is only meaningful while something keeps the allocation alive
/// (a strong or weak handle); afterwards the address may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationKey(usize);

impl OperationKey {
    /// Key of a strong handle
    pub fn of<T: ?Sized>(handle: &Rc<T>) -> Self {
        Self(Rc::as_ptr(handle) as *const () as usize)
    }

    /// Key of a weak handle
    pub fn of_weak<T: ?Sized>(handle: &Weak<T>) -> Self {
        Self(Weak::as_ptr(handle) as *const () as usize)
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op@{:#x}", self.0)
    }
}

/// Whether two handles denote the same operation
pub fn same_operation<T: ?Sized, U: ?Sized>(a: &Rc<T>, b: &Rc<U>) -> bool {
    OperationKey::of(a) == OperationKey::of(b)
}
