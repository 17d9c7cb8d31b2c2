//! Variables and their generators.

use core::fmt;

/// Number of binders between a bound variable and its binder.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DebruijnIndex(u32);

impl DebruijnIndex {
    /// The binder closest to a bound variable.
    pub const INNERMOST: Self = Self(0);

    pub const fn from_u32(n: u32) -> Self {
        Self(n)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Return the index that refers to the same binder after entering `amount` binders.
    pub fn shifted_in(self, amount: u32) -> Self {
        Self(self.0 + amount)
    }

    /// Return the index that refers to the same binder after leaving `amount` binders.
    ///
    /// Leaving more binders than there are yields the innermost binder.
    pub fn shifted_out(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }

    pub fn shift_in(&mut self, amount: u32) {
        *self = self.shifted_in(amount)
    }

    pub fn shift_out(&mut self, amount: u32) {
        *self = self.shifted_out(amount)
    }
}

/// The `index`-th variable of the binder `debruijn` levels out.
///
/// ~~~
/// # use refterm::{BoundVar, DebruijnIndex};
/// let v = BoundVar::new(DebruijnIndex::from_u32(1), 2);
/// assert_eq!(v.to_string(), "β1.2");
/// assert_eq!(BoundVar::NU, BoundVar::new(DebruijnIndex::INNERMOST, 0));
/// ~~~
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoundVar {
    pub debruijn: DebruijnIndex,
    pub index: u32,
}

impl BoundVar {
    /// The first variable of the innermost binder.
    pub const NU: Self = Self::new(DebruijnIndex::INNERMOST, 0);

    pub const fn new(debruijn: DebruijnIndex, index: u32) -> Self {
        Self { debruijn, index }
    }
}

impl fmt::Display for BoundVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "β{}.{}", self.debruijn.0, self.index)
    }
}

macro_rules! counter {
    ($(#[$meta:meta])* $name:ident, $gen:ident, $fmt:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(n: u32) -> Self {
                Self(n)
            }

            pub fn as_u32(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, $fmt, self.0)
            }
        }

        #[doc = concat!("Generator of fresh [`", stringify!($name), "`]s.")]
        #[derive(Clone, Debug, Default)]
        pub struct $gen {
            next: u32,
        }

        impl $gen {
            pub fn new() -> Self {
                Self::default()
            }

            /// Return a value that was not returned before by this generator.
            pub fn fresh(&mut self) -> $name {
                let x = $name(self.next);
                self.next += 1;
                x
            }

            /// Iterate over all values that were generated so far.
            pub fn generated(&self) -> impl Iterator<Item = $name> {
                (0..self.next).map($name)
            }
        }
    };
}

counter!(
    /// Free variable.
    Name,
    NameGen,
    "a{}"
);

counter!(
    /// Existential variable, to be solved by unification.
    EVar,
    EVarGen,
    "?{}"
);

counter!(
    /// Identifier of an unknown refinement predicate.
    KVid,
    KVidGen,
    "${}"
);

/// Generic type parameter, given by its position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamTy {
    pub index: u32,
}

impl fmt::Display for ParamTy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

#[test]
fn shifting() {
    let d = DebruijnIndex::from_u32(2);
    assert_eq!(d.shifted_in(3).shifted_out(3), d);
    assert_eq!(d.shifted_out(5), DebruijnIndex::INNERMOST);
}

#[test]
fn generators() {
    use alloc::{string::ToString, vec::Vec};
    let mut gen = NameGen::new();
    let (a, b) = (gen.fresh(), gen.fresh());
    assert_ne!(a, b);
    assert_eq!(gen.generated().collect::<Vec<_>>(), [a, b]);
    assert_eq!(b.to_string(), "a1");
    assert_eq!(EVarGen::new().fresh().to_string(), "?0");
}
