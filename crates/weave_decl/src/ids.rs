//! Opaque ID newtypes for declarations.
//!
//! Each ID is a thin `u32` wrapper that is `Copy` and `Hash`, so it can be
//! used directly as an analysis key.

use crate::arena::ArenaId;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// ID of a package in a [`PackageGroup`](crate::PackageGroup).
    PackageId
);

define_id!(
    /// ID of a package-level function.
    FuncId
);

define_id!(
    /// ID of a struct declaration.
    StructId
);

define_id!(
    /// ID of an enum declaration.
    EnumId
);
