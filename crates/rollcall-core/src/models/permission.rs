//! Permission set domain model.
//!
//! Permissions are opaque `<module>.<action>` strings (e.g.
//! `students.manage`). Module access uses the same set type with plain
//! module identifiers (e.g. `fees`).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Persisted form of [`PermissionSet::All`].
pub const WILDCARD: &str = "*";

/// A set of permission (or module) identifiers, or the wildcard grant.
///
/// Stored and serialized as a list of strings where `["*"]` means
/// [`PermissionSet::All`]. Any list containing `"*"` loads as `All`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum PermissionSet {
    /// Grants every identifier, including ones that do not exist yet.
    All,
    /// Grants exactly the listed identifiers.
    Only(BTreeSet<String>),
}

impl PermissionSet {
    pub fn empty() -> Self {
        PermissionSet::Only(BTreeSet::new())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, PermissionSet::All)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            PermissionSet::All => false,
            PermissionSet::Only(ids) => ids.is_empty(),
        }
    }

    /// Whether `id` is granted by this set.
    pub fn grants(&self, id: &str) -> bool {
        match self {
            PermissionSet::All => true,
            PermissionSet::Only(ids) => ids.contains(id),
        }
    }

    /// Add an identifier. Inserting `"*"` widens the set to `All`.
    ///
    /// Returns `true` if the set changed.
    pub fn insert(&mut self, id: &str) -> bool {
        match self {
            PermissionSet::All => false,
            PermissionSet::Only(_) if id == WILDCARD => {
                *self = PermissionSet::All;
                true
            }
            PermissionSet::Only(ids) => ids.insert(id.to_string()),
        }
    }

    /// Remove an identifier.
    ///
    /// Removing `"*"` from `All` empties the set. A literal cannot be
    /// carved out of `All`, so that case leaves the set unchanged.
    ///
    /// Returns `true` if the set changed.
    pub fn remove(&mut self, id: &str) -> bool {
        match self {
            PermissionSet::All if id == WILDCARD => {
                *self = PermissionSet::empty();
                true
            }
            PermissionSet::All => false,
            PermissionSet::Only(ids) => ids.remove(id),
        }
    }

    pub fn union(&self, other: &PermissionSet) -> PermissionSet {
        match (self, other) {
            (PermissionSet::Only(a), PermissionSet::Only(b)) => {
                PermissionSet::Only(a.union(b).cloned().collect())
            }
            _ => PermissionSet::All,
        }
    }

    /// Literal members; empty for `All`.
    pub fn literals(&self) -> impl Iterator<Item = &str> {
        let ids = match self {
            PermissionSet::All => None,
            PermissionSet::Only(ids) => Some(ids),
        };
        ids.into_iter().flatten().map(String::as_str)
    }

    /// The persisted list form.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            PermissionSet::All => vec![WILDCARD.to_string()],
            PermissionSet::Only(ids) => ids.iter().cloned().collect(),
        }
    }
}

impl Default for PermissionSet {
    fn default() -> Self {
        PermissionSet::empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut ids = BTreeSet::new();
        for id in iter {
            let id = id.into();
            if id == WILDCARD {
                return PermissionSet::All;
            }
            ids.insert(id);
        }
        PermissionSet::Only(ids)
    }
}

impl From<Vec<String>> for PermissionSet {
    fn from(ids: Vec<String>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<PermissionSet> for Vec<String> {
    fn from(set: PermissionSet) -> Self {
        set.to_vec()
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, id) in self.to_vec().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(id)?;
        }
        f.write_str("]")
    }
}
