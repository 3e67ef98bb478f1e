//! Ordered lists of relational dependencies.
//!
//! Unlike package collections, ingestion does not copy anything: a reldep
//! handle already names an immutable interned value, so its id is stored as
//! is.

use crate::convert::{self, BoxError, ConvertError, ForeignHandle, HandleSequence, HandleSink};
use crate::id::RelDepId;
use crate::pool::{CollectionError, Pool};
use crate::reldep::RelDep;

/// An ordered sequence of reldep ids; duplicates allowed.
#[derive(Debug, Clone)]
pub struct RelDepList<'p> {
    pool: &'p Pool,
    ids: Vec<RelDepId>,
}

impl<'p> RelDepList<'p> {
    /// An empty list with no backing storage.
    pub fn new(pool: &'p Pool) -> Self {
        Self {
            pool,
            ids: Vec::new(),
        }
    }

    /// Build a list from external reldep handles. Either every element
    /// resolves or no list is returned.
    pub fn from_sequence<S, E, F>(pool: &'p Pool, source: &S, mut resolve: F) -> Result<Self, ConvertError>
    where
        S: HandleSequence + ?Sized,
        E: Into<BoxError>,
        F: FnMut(S::Handle) -> Result<RelDep, E>,
    {
        let mut list = Self::new(pool);
        convert::ingest(
            source,
            |handle| -> Result<RelDepId, BoxError> {
                let reldep = resolve(handle).map_err(Into::<BoxError>::into)?;
                if reldep.pool_tag() != pool.tag() {
                    return Err(BoxError::from(ForeignHandle {
                        expected: pool.tag(),
                        found: reldep.pool_tag(),
                    }));
                }
                Ok(reldep.id())
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
        F: FnMut(RelDepId) -> Result<K::Handle, E>,
    {
        convert::project(self.ids.iter().copied(), wrap)
    }

    pub fn pool(&self) -> &'p Pool {
        self.pool
    }

    /// Append an id. Ids the pool never issued are rejected.
    pub fn push(&mut self, id: RelDepId) -> Result<(), CollectionError> {
        self.pool.check_reldep(id)?;
        self.ids.try_reserve(1)?;
        self.ids.push(id);
        Ok(())
    }

    /// Handle for the entry at `index`.
    pub fn get(&self, index: usize) -> Option<RelDep> {
        self.ids.get(index).and_then(|&id| self.pool.reldep(id))
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: RelDepId) -> bool {
        self.ids.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = RelDepId> + '_ {
        self.ids.iter().copied()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Display strings of every entry, e.g. `"foo >= 1.2"`, one per entry.
    pub fn to_strings(&self) -> Vec<String> {
        self.ids
            .iter()
            .filter_map(|&id| self.pool.reldep_to_string(id))
            .collect()
    }
}

impl<'a> IntoIterator for &'a RelDepList<'_> {
    type Item = RelDepId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, RelDepId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_sequence_shares_identity() {
        let pool = Pool::new();
        let deps: Vec<RelDep> = ["glibc >= 2.34", "sh", "glibc >= 2.34"]
            .iter()
            .map(|s| pool.parse_reldep(s).unwrap())
            .collect();
        let list = RelDepList::from_sequence(&pool, deps.as_slice(), Ok::<_, BoxError>).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(0), list.get(2));
        assert_eq!(list.get(0).map(RelDep::id), Some(deps[0].id()));
        assert_eq!(pool.reldep_count(), 2);
        assert_eq!(list.to_strings(), vec!["glibc >= 2.34", "sh", "glibc >= 2.34"]);
    }

    #[test]
    fn from_sequence_fails_whole() {
        let pool = Pool::new();
        let texts = ["ok", "not ok", "fine"];
        let err = RelDepList::from_sequence(&pool, texts.as_slice(), |t: &str| pool.parse_reldep(t))
            .unwrap_err();
        assert_eq!(err.index(), Some(1));
    }

    #[test]
    fn from_sequence_rejects_foreign_pool() {
        let pool = Pool::new();
        let other = Pool::new();
        let dep = other.parse_reldep("foo").unwrap();
        let err = RelDepList::from_sequence(&pool, [dep].as_slice(), Ok::<_, BoxError>).unwrap_err();
        assert!(matches!(err, ConvertError::Resolution { index: 0, .. }));
    }

    #[test]
    fn push_rejects_ids_the_pool_never_issued() {
        let pool = Pool::new();
        let dep = pool.parse_reldep("sh").unwrap();
        let mut list = RelDepList::new(&pool);
        list.push(dep.id()).unwrap();
        let err = list.push(RelDepId::new(50_000_000).unwrap()).unwrap_err();
        assert!(matches!(err, CollectionError::UnknownId { count: 1, .. }));
        assert_eq!(list.len(), 1);
        assert_eq!(list.to_strings(), vec!["sh"]);
    }

    #[test]
    fn to_sequence_in_order() {
        let pool = Pool::new();
        let mut list = RelDepList::new(&pool);
        let b = pool.parse_reldep("b < 2").unwrap();
        let a = pool.parse_reldep("a").unwrap();
        list.push(b.id()).unwrap();
        list.push(a.id()).unwrap();
        let raw: Vec<u32> = list.to_sequence(|id| Ok::<_, BoxError>(id.get())).unwrap();
        assert_eq!(raw, vec![b.id().get(), a.id().get()]);
        assert!(list.contains(a.id()));
        assert_eq!((&list).into_iter().count(), 2);
    }
}
