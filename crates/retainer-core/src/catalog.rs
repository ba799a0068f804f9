//! Published versions and the catalog snapshot they form.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque registry-assigned version identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub u64);

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for VersionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One published artifact version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Identifier used for deletion.
    pub id: VersionId,

    /// Tags attached to this version, in registry order. May be empty.
    pub tags: Vec<String>,

    /// Creation timestamp. Display only; never used for retention.
    pub created_at: DateTime<Utc>,
}

impl VersionRecord {
    /// Creates a version record.
    #[must_use]
    pub fn new<I, S>(id: impl Into<VersionId>, tags: I, created_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            created_at,
        }
    }

    /// Returns true if the version has no tags (a dangling manifest).
    #[must_use]
    pub fn is_untagged(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Immutable snapshot of every version of one package.
///
/// Each [`VersionId`] appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    records: Vec<VersionRecord>,
}

impl Catalog {
    /// Builds a catalog, keeping the first record seen for each id.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use retainer_core::{Catalog, VersionRecord};
    ///
    /// let now = Utc::now();
    /// let catalog = Catalog::from_records(vec![
    ///     VersionRecord::new(1, ["1.0.0"], now),
    ///     VersionRecord::new(1, ["1.0.0"], now),
    ///     VersionRecord::new(2, Vec::<String>::new(), now),
    /// ]);
    /// assert_eq!(catalog.len(), 2);
    /// ```
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = VersionRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut deduplicated = Vec::new();

        for record in records {
            if seen.insert(record.id) {
                deduplicated.push(record);
            } else {
                tracing::debug!(id = %record.id, "dropping duplicate version record");
            }
        }

        Self {
            records: deduplicated,
        }
    }

    /// Returns the records in the order they were received.
    #[must_use]
    pub fn records(&self) -> &[VersionRecord] {
        &self.records
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, VersionRecord> {
        self.records.iter()
    }

    /// Returns the number of versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the catalog holds no versions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of tags across all versions.
    #[must_use]
    pub fn total_tags(&self) -> usize {
        self.records.iter().map(|r| r.tags.len()).sum()
    }

    /// Looks up a record by id.
    #[must_use]
    pub fn get(&self, id: VersionId) -> Option<&VersionRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a VersionRecord;
    type IntoIter = std::slice::Iter<'a, VersionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<VersionRecord> for Catalog {
    fn from_iter<T: IntoIterator<Item = VersionRecord>>(iter: T) -> Self {
        Self::from_records(iter)
    }
}
