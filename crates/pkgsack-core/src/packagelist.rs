//! Ordered package lists.

use crate::convert::{self, BoxError, ConvertError, ForeignHandle, HandleSequence, HandleSink};
use crate::id::PackageId;
use crate::package::Package;
use crate::packageset::PackageSet;
use crate::pool::{CollectionError, Pool};
use std::collections::TryReserveError;

/// An ordered sequence of package ids; duplicates allowed, insertion order
/// is iteration order.
#[derive(Debug, Clone)]
pub struct PackageList<'p> {
    pool: &'p Pool,
    ids: Vec<PackageId>,
}

impl<'p> PackageList<'p> {
    /// An empty list with no backing storage.
    pub fn new(pool: &'p Pool) -> Self {
        Self {
            pool,
            ids: Vec::new(),
        }
    }

    pub fn with_capacity(pool: &'p Pool, capacity: usize) -> Result<Self, TryReserveError> {
        let mut ids = Vec::new();
        ids.try_reserve(capacity)?;
        Ok(Self { pool, ids })
    }

    /// Build a list by cloning every handle of `source` into an owned
    /// [`Package`] record.
    ///
    /// Records from another pool are rejected. Either every element converts
    /// or no list is returned.
    pub fn from_sequence<S, E, F>(pool: &'p Pool, source: &S, mut clone: F) -> Result<Self, ConvertError>
    where
        S: HandleSequence + ?Sized,
        E: Into<BoxError>,
        F: FnMut(S::Handle) -> Result<Package, E>,
    {
        let mut list = Self::new(pool);
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
            |id| list.push(id),
        )?;
        Ok(list)
    }

    /// Project every id, in order, into a fresh external sequence.
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

    /// Append an id. Ids the pool never issued are rejected.
    pub fn push(&mut self, id: PackageId) -> Result<(), CollectionError> {
        self.pool.check_package(id)?;
        self.ids.try_reserve(1)?;
        self.ids.push(id);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<PackageId> {
        self.ids.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: PackageId) -> bool {
        self.ids.contains(&id)
    }

    /// Ids in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = PackageId> + '_ {
        self.ids.iter().copied()
    }

    /// Fresh owned records for every entry, in order. One record per entry,
    /// since every stored id was issued by the pool.
    pub fn packages(&self) -> impl Iterator<Item = Package> + '_ {
        self.ids.iter().filter_map(|&id| self.pool.package(id))
    }

    pub fn as_slice(&self) -> &[PackageId] {
        &self.ids
    }

    /// Drop every entry, keeping the allocation.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// The distinct ids of this list as a set.
    pub fn to_set(&self) -> Result<PackageSet<'p>, CollectionError> {
        PackageSet::from_ids(self.pool, self.iter())
    }
}

impl<'a> IntoIterator for &'a PackageList<'_> {
    type Item = PackageId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, PackageId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{InstallStatus, PackageKey};

    fn pool_with(names: &[&str]) -> (Pool, Vec<PackageId>) {
        let pool = Pool::new();
        let ids = names
            .iter()
            .map(|n| pool.intern_package(&PackageKey::new(*n, "1-1", "noarch", "base")).unwrap())
            .collect();
        (pool, ids)
    }

    #[test]
    fn push_keeps_order_and_duplicates() {
        let (pool, ids) = pool_with(&["a", "b"]);
        let mut list = PackageList::new(&pool);
        list.push(ids[1]).unwrap();
        list.push(ids[0]).unwrap();
        list.push(ids[1]).unwrap();
        assert_eq!(list.as_slice(), &[ids[1], ids[0], ids[1]]);
        assert_eq!(list.len(), 3);
        assert!(list.contains(ids[0]));
    }

    #[test]
    fn iteration_is_restartable() {
        let (pool, ids) = pool_with(&["a", "b", "c"]);
        let mut list = PackageList::new(&pool);
        for &id in &ids {
            list.push(id).unwrap();
        }
        let first: Vec<_> = list.iter().collect();
        let second: Vec<_> = (&list).into_iter().collect();
        assert_eq!(first, ids);
        assert_eq!(first, second);
    }

    #[test]
    fn from_sequence_clones_records() {
        let (pool, ids) = pool_with(&["a", "b"]);
        let mut installed = pool.package(ids[0]).unwrap();
        installed.set_status(InstallStatus::Installed);
        let source = vec![installed.clone(), pool.package(ids[1]).unwrap()];

        let list = PackageList::from_sequence(&pool, source.as_slice(), |mut p: Package| {
            p.set_status(InstallStatus::PendingErase);
            Ok::<_, BoxError>(p)
        })
        .unwrap();

        assert_eq!(list.as_slice(), &ids[..]);
        assert_eq!(source[0].status(), InstallStatus::Installed);
        assert!(list.packages().all(|p| p.status() == InstallStatus::Available));
    }

    #[test]
    fn from_sequence_rejects_foreign_pool() {
        let (pool, _) = pool_with(&["a"]);
        let (other, other_ids) = pool_with(&["a"]);
        let source = vec![other.package(other_ids[0]).unwrap()];
        let err = PackageList::from_sequence(&pool, source.as_slice(), Ok::<_, BoxError>).unwrap_err();
        match err {
            ConvertError::Resolution { index, source } => {
                assert_eq!(index, 0);
                assert!(source.downcast_ref::<ForeignHandle>().is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn to_sequence_preserves_order() {
        let (pool, ids) = pool_with(&["x", "y", "z"]);
        let mut list = PackageList::new(&pool);
        for &id in ids.iter().rev() {
            list.push(id).unwrap();
        }
        let names: Vec<String> = list
            .to_sequence(|id| pool.package_key(id).map(|k| k.name).ok_or("unknown id"))
            .unwrap();
        assert_eq!(names, vec!["z", "y", "x"]);
    }

    #[test]
    fn push_rejects_ids_the_pool_never_issued() {
        let (pool, ids) = pool_with(&["a"]);
        let mut list = PackageList::new(&pool);
        list.push(ids[0]).unwrap();
        let err = list.push(PackageId::new(50_000_000).unwrap()).unwrap_err();
        assert!(matches!(err, CollectionError::UnknownId { id: 50_000_000, .. }));
        assert_eq!(list.len(), 1);
        assert_eq!(list.packages().count(), list.len());
    }

    #[test]
    fn to_set_drops_duplicates() {
        let (pool, ids) = pool_with(&["a", "b"]);
        let mut list = PackageList::new(&pool);
        for &id in &[ids[1], ids[0], ids[1]] {
            list.push(id).unwrap();
        }
        let set = list.to_set().unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), ids);
    }
}
