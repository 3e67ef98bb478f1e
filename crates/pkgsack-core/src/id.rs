//! Dense integer identifiers handed out by a [`Pool`](crate::Pool).
//!
//! Every namespace (strings, packages, reldeps) gets its own newtype so an
//! id from one namespace can never be used to index another. Ids start at 1;
//! index 0 is the reserved "unset" value and cannot be constructed. A lookup
//! that finds nothing returns `None` instead of a sentinel.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};

/// Conversion between a typed id and its slot index.
pub(crate) trait DenseId: Copy {
    fn from_index(index: usize) -> Option<Self>;

    fn to_index(self) -> usize;
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Build an id from its raw value. Returns `None` for 0.
            #[must_use]
            pub const fn new(raw: u32) -> Option<Self> {
                match NonZeroU32::new(raw) {
                    Some(n) => Some(Self(n)),
                    None => None,
                }
            }

            /// The raw id value (always non-zero).
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0.get()
            }

            /// The id as a bit/slot index.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0.get() as usize
            }
        }

        impl DenseId for $name {
            fn from_index(index: usize) -> Option<Self> {
                u32::try_from(index).ok().and_then(Self::new)
            }

            fn to_index(self) -> usize {
                self.index()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of an interned package.
    PackageId
);

define_id!(
    /// Identifier of an interned relational dependency.
    RelDepId
);

define_id!(
    /// Identifier of an interned string (names, evrs, arches, repos).
    StrId
);

static NEXT_POOL_TAG: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a pool.
///
/// Handles carry the tag of the pool that produced them so a collection can
/// refuse ids that belong to a different pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolTag(u64);

impl PoolTag {
    pub(crate) fn next() -> Self {
        Self(NEXT_POOL_TAG.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for PoolTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_an_id() {
        assert!(PackageId::new(0).is_none());
        assert!(RelDepId::from_index(0).is_none());
        assert_eq!(StrId::new(7).map(StrId::get), Some(7));
    }

    #[test]
    fn from_index_rejects_overflow() {
        assert!(PackageId::from_index(u32::MAX as usize + 1).is_none());
        assert_eq!(PackageId::from_index(3).map(PackageId::index), Some(3));
    }

    #[test]
    fn pool_tags_are_unique() {
        let a = PoolTag::next();
        let b = PoolTag::next();
        assert_ne!(a, b);
    }
}
