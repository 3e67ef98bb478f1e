//! Package set and relational-dependency collection engine.
//!
//! This crate provides:
//! - An interning [`Pool`] mapping package and reldep keys to dense ids
//! - Ordered [`PackageList`]s and [`RelDepList`]s
//! - Bitset-backed [`PackageSet`]s with set algebra
//! - All-or-nothing bulk conversion to and from external sequences, for
//!   host-language adapters

mod bitset;
mod config;
mod convert;
mod id;
mod package;
mod packagelist;
mod packageset;
mod pool;
mod reldep;
mod reldeplist;

pub use config::{ConfigError, PoolConfig, DEFAULT_MAX_IDS};
pub use convert::{
    string_array_to_sequence, BoxError, ConvertError, ForeignHandle, HandleSequence, HandleSink,
    OutOfRange,
};
pub use id::{PackageId, PoolTag, RelDepId, StrId};
pub use package::{InstallStatus, Package, PackageKey};
pub use packagelist::PackageList;
pub use packageset::{Iter as PackageSetIter, PackageSet};
pub use pool::{CollectionError, Namespace, Pool, PoolError};
pub use reldep::{Comparator, RelDep, RelDepKey};
pub use reldeplist::RelDepList;
