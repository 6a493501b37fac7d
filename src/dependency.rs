// Copyright 2025 Cowboy AI, LLC.

//! Dependency values and sequences
//!
//! A dependency sequence decides when a base operation keeps its identity.
//! Comparison is shallow and position-sensitive: two sequences are equal
//! when they have the same length and every pair of elements at the same
//! position is the same value.
//!
//! Element equality follows same-value semantics:
//! - floats: every NaN equals every NaN, `+0.0` differs from `-0.0`
//! - references: equal only when they point at the same allocation
//! - values of different variants are never equal (`Int(1) != Float(1.0)`)

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::operation::{Operation, OperationKey};

/// A single comparable dependency value
#[derive(Clone)]
pub enum Dependency {
    /// The unit value
    Unit,
    /// A boolean
    Bool(bool),
    /// A signed integer
    Int(i64),
    /// An unsigned integer
    UInt(u64),
    /// A float, compared with same-value semantics
    Float(f64),
    /// A character
    Char(char),
    /// Owned text
    Text(String),
    /// A shared object, compared by identity
    Ref(RefIdentity),
}

/// Reference identity held by a [`Dependency::Ref`]
///
/// Keeps the referenced allocation alive so its address cannot be reused
/// while the dependency is remembered.
#[derive(Clone)]
pub struct RefIdentity {
    key: OperationKey,
    _anchor: Rc<dyn Any>,
}

impl RefIdentity {
    /// Identity of the referenced allocation
    pub fn key(&self) -> OperationKey {
        self.key
    }
}

impl PartialEq for RefIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl fmt::Debug for RefIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({})", self.key)
    }
}

impl Dependency {
    /// Depend on the identity of a shared value
    pub fn by_ref<T: 'static>(value: &Rc<T>) -> Self {
        Dependency::Ref(RefIdentity {
            key: OperationKey::of(value),
            _anchor: value.clone(),
        })
    }

    /// Depend on the identity of an operation
    pub fn operation<A: 'static, R: 'static>(op: &Operation<A, R>) -> Self {
        Dependency::Ref(RefIdentity {
            key: OperationKey::of(op),
            _anchor: Rc::new(op.clone()),
        })
    }

    /// Same-value comparison
    pub fn same_value(&self, other: &Dependency) -> bool {
        use Dependency::*;
        match (self, other) {
            (Unit, Unit) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (UInt(a), UInt(b)) => a == b,
            (Float(a), Float(b)) => (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits(),
            (Char(a), Char(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            (Ref(a), Ref(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Unit => write!(f, "()"),
            Dependency::Bool(v) => write!(f, "{v:?}"),
            Dependency::Int(v) => write!(f, "{v:?}i"),
            Dependency::UInt(v) => write!(f, "{v:?}u"),
            Dependency::Float(v) => write!(f, "{v:?}f"),
            Dependency::Char(v) => write!(f, "{v:?}"),
            Dependency::Text(v) => write!(f, "{v:?}"),
            Dependency::Ref(r) => write!(f, "{r:?}"),
        }
    }
}

impl From<()> for Dependency {
    fn from(_: ()) -> Self {
        Dependency::Unit
    }
}

impl From<bool> for Dependency {
    fn from(v: bool) -> Self {
        Dependency::Bool(v)
    }
}

macro_rules! signed_dependency {
    ($($t:ty),*) => {
        $(impl From<$t> for Dependency {
            fn from(v: $t) -> Self {
                Dependency::Int(v as i64)
            }
        })*
    };
}

macro_rules! unsigned_dependency {
    ($($t:ty),*) => {
        $(impl From<$t> for Dependency {
            fn from(v: $t) -> Self {
                Dependency::UInt(v as u64)
            }
        })*
    };
}

signed_dependency!(i8, i16, i32, i64, isize);
unsigned_dependency!(u8, u16, u32, u64, usize);

impl From<f32> for Dependency {
    fn from(v: f32) -> Self {
        Dependency::Float(v as f64)
    }
}

impl From<f64> for Dependency {
    fn from(v: f64) -> Self {
        Dependency::Float(v)
    }
}

impl From<char> for Dependency {
    fn from(v: char) -> Self {
        Dependency::Char(v)
    }
}

impl From<&str> for Dependency {
    fn from(v: &str) -> Self {
        Dependency::Text(v.to_string())
    }
}

impl From<String> for Dependency {
    fn from(v: String) -> Self {
        Dependency::Text(v)
    }
}

/// An ordered dependency sequence
///
/// An untracked sequence stands for "no dependency list at all" and never
/// compares equal, not even to itself.
#[derive(Clone, Debug, Default)]
pub struct Dependencies {
    items: Vec<Dependency>,
    untracked: bool,
}

impl Dependencies {
    /// The empty sequence: identity fixed for the owner's lifetime
    pub fn new() -> Self {
        Self::default()
    }

    /// No dependency list: identity changes on every resolution
    pub fn untracked() -> Self {
        Self {
            items: Vec::new(),
            untracked: true,
        }
    }

    /// Append a dependency
    pub fn with(mut self, dep: impl Into<Dependency>) -> Self {
        self.items.push(dep.into());
        self
    }

    /// Append a dependency in place
    pub fn push(&mut self, dep: impl Into<Dependency>) {
        self.items.push(dep.into());
    }

    /// Whether this sequence is untracked
    pub fn is_untracked(&self) -> bool {
        self.untracked
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the sequence has no elements
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements in order
    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.items.iter()
    }

    /// Shallow, position-sensitive comparison
    pub fn shallow_eq(&self, other: &Dependencies) -> bool {
        if self.untracked || other.untracked {
            return false;
        }
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(other.items.iter())
                .all(|(a, b)| a.same_value(b))
    }
}

impl PartialEq for Dependencies {
    fn eq(&self, other: &Self) -> bool {
        self.shallow_eq(other)
    }
}

impl From<Vec<Dependency>> for Dependencies {
    fn from(items: Vec<Dependency>) -> Self {
        Self {
            items,
            untracked: false,
        }
    }
}

impl FromIterator<Dependency> for Dependencies {
    fn from_iter<I: IntoIterator<Item = Dependency>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Build a [`Dependencies`] sequence from values convertible to [`Dependency`]
///
/// ```rust
/// use cim_effect_cache::{deps, Dependencies};
///
/// let counter = 3;
/// let a = deps![counter, "mode", true];
/// let b = deps![3, "mode", true];
/// assert_eq!(a, b);
/// assert_eq!(deps![], Dependencies::new());
/// ```
#[macro_export]
macro_rules! deps {
    () => {
        $crate::Dependencies::new()
    };
    ($($dep:expr),+ $(,)?) => {
        $crate::Dependencies::from(::std::vec![$($crate::Dependency::from($dep)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::operation;
    use test_case::test_case;

    #[test_case(Dependency::Unit, Dependency::Unit, true; "unit")]
    #[test_case(Dependency::from(1), Dependency::from(1), true; "equal ints")]
    #[test_case(Dependency::from(1), Dependency::from(2), false; "different ints")]
    #[test_case(Dependency::from(1), Dependency::from(1.0), false; "int is not float")]
    #[test_case(Dependency::from(1u32), Dependency::from(1i32), false; "unsigned is not signed")]
    #[test_case(Dependency::from(f64::NAN), Dependency::from(f64::NAN), true; "nan equals nan")]
    #[test_case(Dependency::from(0.0), Dependency::from(-0.0), false; "signed zeros differ")]
    #[test_case(Dependency::from(0.5), Dependency::from(0.5), true; "equal floats")]
    #[test_case(Dependency::from("a"), Dependency::from(String::from("a")), true; "text")]
    #[test_case(Dependency::from('x'), Dependency::from("x"), false; "char is not text")]
    #[test_case(Dependency::from(true), Dependency::from(false), false; "bools")]
    fn test_same_value(a: Dependency, b: Dependency, expected: bool) {
        assert_eq!(a.same_value(&b), expected);
        assert_eq!(b.same_value(&a), expected);
    }

    #[test]
    fn test_reference_identity() {
        let shared = Rc::new(vec![1, 2, 3]);
        let twin = Rc::new(vec![1, 2, 3]);

        assert_eq!(Dependency::by_ref(&shared), Dependency::by_ref(&shared.clone()));
        assert_ne!(Dependency::by_ref(&shared), Dependency::by_ref(&twin));
    }

    #[test]
    fn test_reference_keeps_allocation_alive() {
        let shared = Rc::new(String::from("state"));
        let dep = Dependency::by_ref(&shared);

        assert_eq!(Rc::strong_count(&shared), 2);
        drop(dep);
        assert_eq!(Rc::strong_count(&shared), 1);
    }

    #[test]
    fn test_operation_identity() {
        let f: Operation<(), ()> = operation(|()| ());
        let g: Operation<(), ()> = operation(|()| ());

        assert_eq!(Dependency::operation(&f), Dependency::operation(&f));
        assert_ne!(Dependency::operation(&f), Dependency::operation(&g));
    }

    #[test]
    fn test_sequences_are_position_sensitive() {
        assert_eq!(deps![1, 2], deps![1, 2]);
        assert_ne!(deps![1, 2], deps![2, 1]);
    }

    #[test]
    fn test_sequence_length_matters() {
        assert_ne!(deps![1], deps![1, 2]);
        assert_ne!(deps![], deps![()]);
        assert_eq!(deps![], Dependencies::new());
    }

    #[test]
    fn test_untracked_never_equal() {
        let untracked = Dependencies::untracked();

        assert!(untracked.is_untracked());
        assert_ne!(untracked, untracked.clone());
        assert_ne!(untracked, Dependencies::new());
    }

    #[test]
    fn test_builders_agree() {
        let mut pushed = Dependencies::new();
        pushed.push(7);
        pushed.push("seven");

        let chained = Dependencies::new().with(7).with("seven");
        let collected: Dependencies = vec![Dependency::from(7), Dependency::from("seven")]
            .into_iter()
            .collect();

        assert_eq!(pushed, chained);
        assert_eq!(chained, collected);
        assert_eq!(collected.len(), 2);
        assert!(!collected.is_empty());
        assert_eq!(collected.iter().count(), 2);
    }
}
