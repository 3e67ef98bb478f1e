//! Deduplicated package sets backed by a bitset over the pool's id space.
//!
//! Package id `n` maps to bit `n` of the set's [`IdBitset`]. A new set is sized
//! to the pool's package count at creation and grows whenever a larger id is
//! added, so sets created at different pool sizes can be combined freely: the
//! shorter bitset behaves as if zero-padded. Iteration is ascending id order.

use crate::bitset::{IdBitset, Ones};
use crate::convert::{self, BoxError, ConvertError, ForeignHandle, HandleSequence, HandleSink};
use crate::id::{DenseId, PackageId};
use crate::package::Package;
use crate::packagelist::PackageList;
use crate::pool::{CollectionError, Pool};
use std::collections::TryReserveError;

#[derive(Debug, Clone)]
pub struct PackageSet<'p> {
    pool: &'p Pool,
    bits: IdBitset,
}

impl PartialEq for PackageSet<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.pool, other.pool) && self.bits == other.bits
    }
}

impl Eq for PackageSet<'_> {}

impl<'p> PackageSet<'p> {
    /// An empty set with room for every id the pool currently holds.
    pub fn new(pool: &'p Pool) -> Result<Self, TryReserveError> {
        Ok(Self {
            pool,
            bits: IdBitset::with_bits(pool.package_count() + 1)?,
        })
    }

    /// Collect ids into a set. Fails on the first id the pool never issued.
    pub fn from_ids(
        pool: &'p Pool,
        ids: impl IntoIterator<Item = PackageId>,
    ) -> Result<Self, CollectionError> {
        let mut set = Self::new(pool)?;
        for id in ids {
            set.add(id)?;
        }
        Ok(set)
    }

    /// Build a set by cloning every handle of `source` into a [`Package`]
    /// record; duplicate ids collapse. All-or-nothing like
    /// [`PackageList::from_sequence`].
    pub fn from_sequence<S, E, F>(pool: &'p Pool, source: &S, mut clone: F) -> Result<Self, ConvertError>
    where
        S: HandleSequence + ?Sized,
        E: Into<BoxError>,
        F: FnMut(S::Handle) -> Result<Package, E>,
    {
        let mut set = Self::new(pool)?;
        convert::ingest(
            source,
            |handle| -> Result<PackageId, BoxError> {
                let package = clone(handle).map_err(Into::<BoxError>::into)?;
                if package.pool_tag() != pool.tag() {
                    return Err(BoxError::from(ForeignHandle {
                        expected: pool.tag(),
                        found: package.pool_tag(),
                    }));
                }
                Ok(package.id())
            },
            |id| set.add(id).map(drop),
        )?;
        Ok(set)
    }

    /// Project every member, ascending, into a fresh external sequence.
    pub fn to_sequence<K, E, F>(&self, wrap: F) -> Result<K, ConvertError>
    where
        K: HandleSink,
        E: Into<BoxError>,
        F: FnMut(PackageId) -> Result<K::Handle, E>,
    {
        convert::project(self.iter(), wrap)
    }

    pub fn pool(&self) -> &'p Pool {
        self.pool
    }

    /// Add an id. Returns whether it was not already present.
    ///
    /// Ids the pool never issued are rejected and leave the set unchanged.
    pub fn add(&mut self, id: PackageId) -> Result<bool, CollectionError> {
        self.pool.check_package(id)?;
        Ok(self.bits.insert(id.index())?)
    }

    /// Remove an id. Returns whether it was present.
    pub fn remove(&mut self, id: PackageId) -> bool {
        self.bits.remove(id.index())
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: PackageId) -> bool {
        self.bits.contains(id.index())
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().next().is_none()
    }

    /// The `index`-th member in ascending id order.
    pub fn get(&self, index: usize) -> Option<PackageId> {
        self.bits.nth_set(index).and_then(PackageId::from_index)
    }

    /// Members in ascending id order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            ones: self.bits.iter(),
        }
    }

    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Members as a list, ascending.
    pub fn to_list(&self) -> Result<PackageList<'p>, CollectionError> {
        let mut list = PackageList::with_capacity(self.pool, self.len())?;
        for id in self {
            list.push(id)?;
        }
        Ok(list)
    }

    fn same_pool(&self, other: &Self) -> Result<(), CollectionError> {
        if std::ptr::eq(self.pool, other.pool) {
            Ok(())
        } else {
            Err(CollectionError::PoolMismatch)
        }
    }

    /// Add every member of `other`.
    pub fn union_with(&mut self, other: &Self) -> Result<(), CollectionError> {
        self.same_pool(other)?;
        Ok(self.bits.union_with(&other.bits)?)
    }

    /// Keep only members also in `other`.
    pub fn intersect_with(&mut self, other: &Self) -> Result<(), CollectionError> {
        self.same_pool(other)?;
        self.bits.intersect_with(&other.bits);
        Ok(())
    }

    /// Remove every member of `other`.
    pub fn difference_with(&mut self, other: &Self) -> Result<(), CollectionError> {
        self.same_pool(other)?;
        self.bits.difference_with(&other.bits);
        Ok(())
    }

    /// Members of either set.
    pub fn union(&self, other: &Self) -> Result<Self, CollectionError> {
        let mut out = self.clone();
        out.union_with(other)?;
        Ok(out)
    }

    /// Members of both sets.
    pub fn intersection(&self, other: &Self) -> Result<Self, CollectionError> {
        let mut out = self.clone();
        out.intersect_with(other)?;
        Ok(out)
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Result<Self, CollectionError> {
        let mut out = self.clone();
        out.difference_with(other)?;
        Ok(out)
    }

    /// Members of exactly one of the two sets.
    pub fn symmetric_difference(&self, other: &Self) -> Result<Self, CollectionError> {
        self.same_pool(other)?;
        let mut out = self.clone();
        out.bits.symmetric_difference_with(&other.bits)?;
        Ok(out)
    }

    /// Every package of the pool, as of now, that is not a member.
    pub fn complement(&self) -> Result<Self, TryReserveError> {
        let mut out = self.clone();
        out.bits.complement_within(1, self.pool.package_count())?;
        Ok(out)
    }

    /// Whether every member is also in `other`.
    pub fn is_subset(&self, other: &Self) -> Result<bool, CollectionError> {
        self.same_pool(other)?;
        Ok(self.bits.is_subset(&other.bits))
    }

    /// Whether the sets share no member.
    pub fn is_disjoint(&self, other: &Self) -> Result<bool, CollectionError> {
        self.same_pool(other)?;
        Ok(self.bits.is_disjoint(&other.bits))
    }

    /// Number of ids representable without growing.
    pub fn capacity(&self) -> usize {
        self.bits.capacity_bits()
    }
}

/// Ascending iterator over the members of a [`PackageSet`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    ones: Ones<'a>,
}

impl Iterator for Iter<'_> {
    type Item = PackageId;

    fn next(&mut self) -> Option<PackageId> {
        self.ones.by_ref().find_map(PackageId::from_index)
    }
}

impl<'a> IntoIterator for &'a PackageSet<'_> {
    type Item = PackageId;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
