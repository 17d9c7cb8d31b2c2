//! Primitive base types and reference kinds.

use core::fmt;

macro_rules! prims {
    ($(#[$meta:meta])* $ty:ident { $($var:ident => $name:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $ty {
            $($var),*
        }

        impl $ty {
            pub const ALL: &'static [Self] = &[$(Self::$var),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$var => $name),*
                }
            }

            /// Return the type with the given name, such as `i32`.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$var),)*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                self.name().fmt(f)
            }
        }
    };
}

prims!(
    /// Signed integer type.
    IntTy {
        Isize => "isize",
        I8 => "i8",
        I16 => "i16",
        I32 => "i32",
        I64 => "i64",
        I128 => "i128",
    }
);

prims!(
    /// Unsigned integer type.
    UintTy {
        Usize => "usize",
        U8 => "u8",
        U16 => "u16",
        U32 => "u32",
        U64 => "u64",
        U128 => "u128",
    }
);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RefKind {
    Shr,
    Mut,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Shr => write!(f, "&"),
            Self::Mut => write!(f, "&mut "),
        }
    }
}

#[test]
fn names() {
    use alloc::string::ToString;
    for ty in IntTy::ALL {
        assert_eq!(IntTy::from_name(ty.name()), Some(*ty));
    }
    for ty in UintTy::ALL {
        assert_eq!(UintTy::from_name(&ty.to_string()), Some(*ty));
    }
    assert_eq!(IntTy::from_name("u8"), None);
}
