//! The interning pool.
//!
//! A [`Pool`] owns the bidirectional mapping between canonical keys and
//! dense ids for three namespaces: strings, packages and reldeps. Ids are
//! never reclaimed, so the id space of each namespace only grows and a
//! bitset built against an older pool size stays valid.
//!
//! Interning takes `&self`; collections borrow the pool for their whole
//! lifetime and the pool can still grow underneath them. The pool uses
//! `RefCell` internally and is confined to one thread.

use crate::config::{ConfigError, PoolConfig};
use crate::id::{DenseId, PackageId, PoolTag, RelDepId, StrId};
use crate::package::{Package, PackageKey};
use crate::reldep::{self, Comparator, RelDep, RelDepKey, RelDepRecord};
use std::borrow::Borrow;
use std::cell::RefCell;
use std::collections::{HashMap, TryReserveError};
use std::hash::Hash;
use std::rc::Rc;
use thiserror::Error;

/// The identifier namespaces of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Interned text shared by package keys and reldeps.
    Strings,
    /// Package keys, addressed by [`PackageId`].
    Packages,
    /// Relational dependencies, addressed by [`RelDepId`].
    RelDeps,
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strings => write!(f, "strings"),
            Self::Packages => write!(f, "packages"),
            Self::RelDeps => write!(f, "reldeps"),
        }
    }
}

/// Errors that can occur while interning.
#[derive(Error, Debug)]
pub enum PoolError {
    /// The namespace reached its configured id limit.
    #[error("{namespace} id space exhausted (limit {limit})")]
    Exhausted { namespace: Namespace, limit: u32 },

    /// The allocator refused to grow a table.
    #[error("pool allocation failed: {0}")]
    Alloc(#[from] TryReserveError),

    /// Reldep text could not be parsed.
    #[error("invalid reldep '{input}': {reason}")]
    InvalidRelDep { input: String, reason: &'static str },

    /// The configuration handed to [`Pool::with_config`] was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised by package and reldep collections.
#[derive(Error, Debug)]
pub enum CollectionError {
    /// The id was never handed out by the collection's pool.
    #[error("{namespace} id {id} was never issued by this pool (count {count})")]
    UnknownId {
        namespace: Namespace,
        id: u32,
        count: usize,
    },

    /// Set algebra was attempted between sets of two different pools.
    #[error("set algebra between package sets of different pools")]
    PoolMismatch,

    /// The allocator refused to grow the collection.
    #[error("collection allocation failed: {0}")]
    Alloc(#[from] TryReserveError),
}

/// Id of a package interned in the pool: each field is a string id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PackageRecord {
    name: StrId,
    evr: StrId,
    arch: StrId,
    repo: StrId,
}

#[derive(Debug)]
struct Interner<K, I> {
    namespace: Namespace,
    map: HashMap<K, I>,
    keys: Vec<K>,
}

impl<K, I> Interner<K, I>
where
    K: Hash + Eq + Clone,
    I: DenseId,
{
    fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            map: HashMap::new(),
            keys: Vec::new(),
        }
    }

    fn reserve(&mut self, capacity: usize) -> Result<(), TryReserveError> {
        self.keys.try_reserve(capacity)?;
        self.map.try_reserve(capacity)
    }

    /// Fails unless `extra` more keys fit under `limit`.
    fn ensure_room(&self, extra: usize, limit: u32) -> Result<(), PoolError> {
        if self.keys.len().saturating_add(extra) > limit as usize {
            tracing::warn!(namespace = %self.namespace, limit, "id space exhausted");
            return Err(PoolError::Exhausted {
                namespace: self.namespace,
                limit,
            });
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.keys.len()
    }

    fn find<Q>(&self, key: &Q) -> Option<I>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).copied()
    }

    fn intern<Q>(&mut self, key: &Q, owned: impl FnOnce() -> K, limit: u32) -> Result<I, PoolError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(id) = self.find(key) {
            return Ok(id);
        }
        self.ensure_room(1, limit)?;
        let Some(id) = I::from_index(self.keys.len() + 1) else {
            return Err(PoolError::Exhausted {
                namespace: self.namespace,
                limit,
            });
        };
        self.keys.try_reserve(1)?;
        self.map.try_reserve(1)?;
        let owned = owned();
        self.keys.push(owned.clone());
        self.map.insert(owned, id);
        Ok(id)
    }

    fn get(&self, id: I) -> Option<&K> {
        self.keys.get(id.to_index().checked_sub(1)?)
    }
}

#[derive(Debug)]
struct Tables {
    strings: Interner<Rc<str>, StrId>,
    packages: Interner<PackageRecord, PackageId>,
    reldeps: Interner<RelDepRecord, RelDepId>,
}

/// Interning authority for package and reldep identifiers.
#[derive(Debug)]
pub struct Pool {
    tag: PoolTag,
    config: PoolConfig,
    tables: RefCell<Tables>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    /// Create an empty pool with the default limits. Tables start
    /// unallocated and grow on demand.
    pub fn new() -> Self {
        Self::empty(PoolConfig::default())
    }

    /// Create an empty pool with `config`, reserving its capacity hints up
    /// front. Hints are capped at `max_ids`.
    pub fn with_config(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let limit = config.max_ids as usize;
        let pool = Self::empty(config);
        {
            let mut tables = pool.tables.borrow_mut();
            let config = &pool.config;
            tables.strings.reserve(config.initial_strings.min(limit))?;
            tables.packages.reserve(config.initial_packages.min(limit))?;
            tables.reldeps.reserve(config.initial_reldeps.min(limit))?;
        }
        Ok(pool)
    }

    fn empty(config: PoolConfig) -> Self {
        let tables = Tables {
            strings: Interner::new(Namespace::Strings),
            packages: Interner::new(Namespace::Packages),
            reldeps: Interner::new(Namespace::RelDeps),
        };
        let tag = PoolTag::next();
        tracing::debug!(%tag, max_ids = config.max_ids, "pool created");
        Self {
            tag,
            config,
            tables: RefCell::new(tables),
        }
    }

    /// Identity stamped on every handle this pool gives out.
    pub fn tag(&self) -> PoolTag {
        self.tag
    }

    /// The limits this pool was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of distinct strings in `texts` not yet interned.
    fn missing_strings(&self, texts: &[&str]) -> usize {
        let tables = self.tables.borrow();
        let mut missing: Vec<&str> = Vec::new();
        for &text in texts {
            if tables.strings.find(text).is_none() && !missing.contains(&text) {
                missing.push(text);
            }
        }
        missing.len()
    }

    // ---- strings ----

    /// Intern a string, returning the existing id for equal text.
    pub fn intern_str(&self, text: &str) -> Result<StrId, PoolError> {
        self.tables
            .borrow_mut()
            .strings
            .intern(text, || Rc::from(text), self.config.max_ids)
    }

    /// Look up a string id.
    pub fn str(&self, id: StrId) -> Option<Rc<str>> {
        self.tables.borrow().strings.get(id).cloned()
    }

    /// Number of interned strings.
    pub fn str_count(&self) -> usize {
        self.tables.borrow().strings.len()
    }

    // ---- packages ----

    /// Intern a package key.
    ///
    /// Room in the package and string namespaces is checked before anything
    /// is interned, so an exhausted pool is left exactly as it was.
    pub fn intern_package(&self, key: &PackageKey) -> Result<PackageId, PoolError> {
        if let Some(id) = self.find_package(key) {
            return Ok(id);
        }
        let missing = self.missing_strings(&[
            key.name.as_str(),
            key.evr.as_str(),
            key.arch.as_str(),
            key.repo.as_str(),
        ]);
        {
            let tables = self.tables.borrow();
            tables.packages.ensure_room(1, self.config.max_ids)?;
            tables.strings.ensure_room(missing, self.config.max_ids)?;
        }
        let record = PackageRecord {
            name: self.intern_str(&key.name)?,
            evr: self.intern_str(&key.evr)?,
            arch: self.intern_str(&key.arch)?,
            repo: self.intern_str(&key.repo)?,
        };
        self.tables
            .borrow_mut()
            .packages
            .intern(&record, || record, self.config.max_ids)
    }

    /// Find a package id without interning.
    pub fn find_package(&self, key: &PackageKey) -> Option<PackageId> {
        let tables = self.tables.borrow();
        let record = PackageRecord {
            name: tables.strings.find(key.name.as_str())?,
            evr: tables.strings.find(key.evr.as_str())?,
            arch: tables.strings.find(key.arch.as_str())?,
            repo: tables.strings.find(key.repo.as_str())?,
        };
        tables.packages.find(&record)
    }

    /// The key a package id was interned from.
    pub fn package_key(&self, id: PackageId) -> Option<PackageKey> {
        let tables = self.tables.borrow();
        let record = *tables.packages.get(id)?;
        let text = |s: StrId| tables.strings.get(s).map(|t| t.to_string());
        Some(PackageKey {
            name: text(record.name)?,
            evr: text(record.evr)?,
            arch: text(record.arch)?,
            repo: text(record.repo)?,
        })
    }

    /// A fresh owned record for a package id.
    pub fn package(&self, id: PackageId) -> Option<Package> {
        self.package_key(id).map(|key| Package::new(self.tag, id, key))
    }

    /// Number of interned packages; valid ids are `1..=package_count()`.
    pub fn package_count(&self) -> usize {
        self.tables.borrow().packages.len()
    }

    /// Every package id in the pool, ascending.
    pub fn package_ids(&self) -> impl Iterator<Item = PackageId> {
        (1..=self.package_count()).filter_map(PackageId::from_index)
    }

    // ---- reldeps ----

    /// Intern a reldep. `evr` is required iff `cmp` is not
    /// [`Comparator::None`].
    pub fn intern_reldep(
        &self,
        name: &str,
        cmp: Comparator,
        evr: Option<&str>,
    ) -> Result<RelDepId, PoolError> {
        let invalid = |reason| PoolError::InvalidRelDep {
            input: RelDepKey {
                name: name.to_string(),
                cmp,
                evr: evr.map(str::to_string),
            }
            .to_string(),
            reason,
        };
        if name.is_empty() {
            return Err(invalid("missing name"));
        }
        match (cmp, evr) {
            (Comparator::None, Some(_)) => return Err(invalid("version without operator")),
            (Comparator::None, None) | (_, Some(_)) => {}
            (_, None) => return Err(invalid("missing version after operator")),
        }
        if let Some(id) = self.find_reldep(name, cmp, evr) {
            return Ok(id);
        }
        let missing = self.missing_strings(&[name, evr.unwrap_or(name)]);
        {
            let tables = self.tables.borrow();
            tables.reldeps.ensure_room(1, self.config.max_ids)?;
            tables.strings.ensure_room(missing, self.config.max_ids)?;
        }
        let evr = evr.map(|evr| self.intern_str(evr)).transpose()?;
        let record = RelDepRecord {
            name: self.intern_str(name)?,
            cmp,
            evr,
        };
        self.tables
            .borrow_mut()
            .reldeps
            .intern(&record, || record, self.config.max_ids)
    }

    fn find_reldep(&self, name: &str, cmp: Comparator, evr: Option<&str>) -> Option<RelDepId> {
        let tables = self.tables.borrow();
        let record = RelDepRecord {
            name: tables.strings.find(name)?,
            cmp,
            evr: match evr {
                Some(evr) => Some(tables.strings.find(evr)?),
                None => None,
            },
        };
        tables.reldeps.find(&record)
    }

    /// Parse and intern reldep text such as `"foo >= 1.2"`.
    pub fn parse_reldep(&self, text: &str) -> Result<RelDep, PoolError> {
        let (name, cmp, evr) = reldep::split(text).map_err(|reason| PoolError::InvalidRelDep {
            input: text.to_string(),
            reason,
        })?;
        let id = self.intern_reldep(name, cmp, evr)?;
        Ok(RelDep::new(self.tag, id))
    }

    /// Handle for an interned reldep id.
    pub fn reldep(&self, id: RelDepId) -> Option<RelDep> {
        self.tables
            .borrow()
            .reldeps
            .get(id)
            .map(|_| RelDep::new(self.tag, id))
    }

    /// The parts a reldep id was interned from.
    pub fn reldep_key(&self, id: RelDepId) -> Option<RelDepKey> {
        let tables = self.tables.borrow();
        let record = *tables.reldeps.get(id)?;
        let name = tables.strings.get(record.name)?.to_string();
        let evr = match record.evr {
            Some(evr) => Some(tables.strings.get(evr)?.to_string()),
            None => None,
        };
        Some(RelDepKey {
            name,
            cmp: record.cmp,
            evr,
        })
    }

    /// Display form of a reldep, e.g. `"foo >= 1.2"`.
    pub fn reldep_to_string(&self, id: RelDepId) -> Option<String> {
        self.reldep_key(id).map(|key| key.to_string())
    }

    /// Number of interned reldeps.
    pub fn reldep_count(&self) -> usize {
        self.tables.borrow().reldeps.len()
    }

    /// Fails if this pool never issued package `id`.
    pub(crate) fn check_package(&self, id: PackageId) -> Result<(), CollectionError> {
        check_issued(Namespace::Packages, id.to_index(), self.package_count())
    }

    /// Fails if this pool never issued reldep `id`.
    pub(crate) fn check_reldep(&self, id: RelDepId) -> Result<(), CollectionError> {
        check_issued(Namespace::RelDeps, id.to_index(), self.reldep_count())
    }
}

fn check_issued(namespace: Namespace, index: usize, count: usize) -> Result<(), CollectionError> {
    if index > count {
        return Err(CollectionError::UnknownId {
            namespace,
            id: u32::try_from(index).unwrap_or(u32::MAX),
            count,
        });
    }
    Ok(())
}
