//! Package keys and owned package records.

use crate::id::{PackageId, PoolTag};
use serde::{Deserialize, Serialize};

/// Canonical identity of a package: name, epoch-version-release, architecture
/// and the repository it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageKey {
    /// Package name, e.g. `bash`.
    pub name: String,
    /// `[epoch:]version-release`, kept as opaque text.
    pub evr: String,
    /// Architecture, e.g. `x86_64` or `noarch`.
    pub arch: String,
    /// Name of the repository the package came from.
    pub repo: String,
}

impl PackageKey {
    pub fn new(
        name: impl Into<String>,
        evr: impl Into<String>,
        arch: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            evr: evr.into(),
            arch: arch.into(),
            repo: repo.into(),
        }
    }

    /// `name-evr.arch`, the usual human-readable package spelling.
    #[must_use]
    pub fn nevra(&self) -> String {
        format!("{}-{}.{}", self.name, self.evr, self.arch)
    }
}

impl std::fmt::Display for PackageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}.{}@{}", self.name, self.evr, self.arch, self.repo)
    }
}

/// Per-instance install state carried by a [`Package`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InstallStatus {
    #[default]
    Available,
    Installed,
    /// Marked for installation by the caller.
    PendingInstall,
    /// Marked for removal by the caller.
    PendingErase,
}

/// An owned package record.
///
/// Records are values: cloning one copies the key and the install status, so
/// two records for the same [`PackageId`] never share mutable state. Package
/// collections ingest handles by cloning them into records and then keep
/// only the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pool: PoolTag,
    id: PackageId,
    key: PackageKey,
    status: InstallStatus,
}

impl Package {
    pub(crate) fn new(pool: PoolTag, id: PackageId, key: PackageKey) -> Self {
        Self {
            pool,
            id,
            key,
            status: InstallStatus::default(),
        }
    }

    pub fn id(&self) -> PackageId {
        self.id
    }

    /// Tag of the pool this record was produced by.
    pub fn pool_tag(&self) -> PoolTag {
        self.pool
    }

    pub fn key(&self) -> &PackageKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn evr(&self) -> &str {
        &self.key.evr
    }

    pub fn arch(&self) -> &str {
        &self.key.arch
    }

    pub fn repo(&self) -> &str {
        &self.key.repo
    }

    pub fn status(&self) -> InstallStatus {
        self.status
    }

    pub fn set_status(&mut self, status: InstallStatus) {
        self.status = status;
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key.nevra())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nevra_formatting() {
        let key = PackageKey::new("bash", "5.2.15-3", "x86_64", "fedora");
        assert_eq!(key.nevra(), "bash-5.2.15-3.x86_64");
        assert_eq!(key.to_string(), "bash-5.2.15-3.x86_64@fedora");
    }

    #[test]
    fn clones_do_not_share_status() {
        let key = PackageKey::new("zsh", "5.9-1", "noarch", "updates");
        let id = PackageId::new(1).unwrap();
        let original = Package::new(PoolTag::next(), id, key);
        let mut copy = original.clone();
        copy.set_status(InstallStatus::PendingInstall);
        assert_eq!(original.status(), InstallStatus::Available);
        assert_eq!(copy.status(), InstallStatus::PendingInstall);
        assert_eq!(copy.id(), original.id());
    }
}
