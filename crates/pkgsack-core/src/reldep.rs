//! Relational dependencies: `name`, or `name OP evr`.

use crate::id::{PoolTag, RelDepId, StrId};

/// Comparison operator of a relational dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Comparator {
    /// Bare name, no version constraint.
    #[default]
    None,
    /// `=`: exactly this version.
    Eq,
    /// `<`: strictly older.
    Lt,
    /// `>`: strictly newer.
    Gt,
    /// `<=`: this version or older.
    Le,
    /// `>=`: this version or newer.
    Ge,
}

impl Comparator {
    /// Operator spelling; empty for [`Comparator::None`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }

    fn from_op(op: &str) -> Option<Self> {
        match op {
            "=" | "==" => Some(Self::Eq),
            "<" => Some(Self::Lt),
            ">" => Some(Self::Gt),
            "<=" | "=<" => Some(Self::Le),
            ">=" | "=>" => Some(Self::Ge),
            _ => None,
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interned form of a reldep inside the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RelDepRecord {
    pub(crate) name: StrId,
    pub(crate) cmp: Comparator,
    pub(crate) evr: Option<StrId>,
}

/// Resolved, owned view of an interned reldep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelDepKey {
    /// Name the dependency is on.
    pub name: String,
    pub cmp: Comparator,
    /// Version bound; present iff `cmp` is not [`Comparator::None`].
    pub evr: Option<String>,
}

impl std::fmt::Display for RelDepKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.evr {
            Some(evr) => write!(f, "{} {} {}", self.name, self.cmp, evr),
            None => f.write_str(&self.name),
        }
    }
}

/// Handle to an interned reldep.
///
/// Reldeps are immutable once interned, so a handle is just the owning
/// pool's tag and the id; copying it shares identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelDep {
    pool: PoolTag,
    id: RelDepId,
}

impl RelDep {
    pub(crate) fn new(pool: PoolTag, id: RelDepId) -> Self {
        Self { pool, id }
    }

    /// Id of the reldep inside its pool.
    pub fn id(self) -> RelDepId {
        self.id
    }

    pub fn pool_tag(self) -> PoolTag {
        self.pool
    }
}

/// Split reldep text into its parts.
///
/// Accepted forms are `name`, `name OP evr` and `nameOPevr`, where `OP` is
/// one of `=`, `==`, `<`, `>`, `<=`, `>=` (and the reversed `=<`, `=>`).
pub(crate) fn split(input: &str) -> Result<(&str, Comparator, Option<&str>), &'static str> {
    let text = input.trim();
    if text.is_empty() {
        return Err("reldep is empty");
    }
    let Some(op_start) = text.find(['<', '>', '=']) else {
        if text.contains(char::is_whitespace) {
            return Err("name contains whitespace");
        }
        return Ok((text, Comparator::None, None));
    };

    let name = text[..op_start].trim_end();
    let rest = &text[op_start..];
    let op_len = rest
        .find(|c: char| !matches!(c, '<' | '>' | '='))
        .unwrap_or(rest.len());
    let (op, evr) = (&rest[..op_len], rest[op_len..].trim_start());

    if name.is_empty() {
        return Err("missing name");
    }
    if name.contains(char::is_whitespace) {
        return Err("name contains whitespace");
    }
    let cmp = Comparator::from_op(op).ok_or("unknown comparison operator")?;
    if evr.is_empty() {
        return Err("missing version after operator");
    }
    if evr.contains(char::is_whitespace) {
        return Err("version contains whitespace");
    }
    Ok((name, cmp, Some(evr)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_bare_name() {
        assert_eq!(split("  glibc "), Ok(("glibc", Comparator::None, None)));
    }

    #[test]
    fn split_spaced_operator() {
        assert_eq!(split("foo >= 1.2"), Ok(("foo", Comparator::Ge, Some("1.2"))));
        assert_eq!(split("foo == 2:1-3"), Ok(("foo", Comparator::Eq, Some("2:1-3"))));
    }

    #[test]
    fn split_tight_operator() {
        assert_eq!(split("libfoo.so.1<3"), Ok(("libfoo.so.1", Comparator::Lt, Some("3"))));
        assert_eq!(split("bar=<4"), Ok(("bar", Comparator::Le, Some("4"))));
    }

    #[test]
    fn split_rejects_malformed() {
        assert!(split("").is_err());
        assert!(split(">= 1").is_err());
        assert!(split("foo >=").is_err());
        assert!(split("foo <> 1").is_err());
        assert!(split("foo bar").is_err());
        assert!(split("foo >= 1 2").is_err());
    }

    #[test]
    fn key_display() {
        let key = RelDepKey {
            name: "python3".into(),
            cmp: Comparator::Gt,
            evr: Some("3.11".into()),
        };
        assert_eq!(key.to_string(), "python3 > 3.11");
        let bare = RelDepKey {
            name: "sh".into(),
            cmp: Comparator::None,
            evr: None,
        };
        assert_eq!(bare.to_string(), "sh");
    }
}
