//! The diff result: three lazily populated path mappings.
//!
//! `Change` and `Del` map a path to the old value found there. `Add` maps a
//! path to `null` (or to the new value when configured to record it).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path;

/// Which mapping of a [`DiffDetails`] an entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffKind {
    Change,
    Add,
    Del,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiffKind::Change => "Change",
            DiffKind::Add => "Add",
            DiffKind::Del => "Del",
        })
    }
}

/// The result of comparing two snapshots.
///
/// Each mapping is `None` until its first entry is written. Callers must not
/// rely on key order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffDetails {
    #[serde(rename = "Change", default, skip_serializing_if = "Option::is_none")]
    pub change: Option<BTreeMap<String, Value>>,
    #[serde(rename = "Del", default, skip_serializing_if = "Option::is_none")]
    pub del: Option<BTreeMap<String, Value>>,
    #[serde(rename = "Add", default, skip_serializing_if = "Option::is_none")]
    pub add: Option<BTreeMap<String, Value>>,
}

impl DiffDetails {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no entries were recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of entries across all three mappings.
    pub fn len(&self) -> usize {
        self.modifications() + self.additions() + self.deletions()
    }

    /// Number of `Change` entries.
    pub fn modifications(&self) -> usize {
        self.change.as_ref().map_or(0, BTreeMap::len)
    }

    /// Number of `Add` entries.
    pub fn additions(&self) -> usize {
        self.add.as_ref().map_or(0, BTreeMap::len)
    }

    /// Number of `Del` entries.
    pub fn deletions(&self) -> usize {
        self.del.as_ref().map_or(0, BTreeMap::len)
    }

    /// The mapping for `kind`, if it has been allocated.
    pub fn entries_of(&self, kind: DiffKind) -> Option<&BTreeMap<String, Value>> {
        match kind {
            DiffKind::Change => self.change.as_ref(),
            DiffKind::Add => self.add.as_ref(),
            DiffKind::Del => self.del.as_ref(),
        }
    }

    /// Look up the value recorded for `path` under `kind`.
    pub fn get(&self, kind: DiffKind, path: &str) -> Option<&Value> {
        self.entries_of(kind)?.get(path)
    }

    /// Every entry as `(kind, path, value)`: changes, then deletions, then additions.
    pub fn iter(&self) -> impl Iterator<Item = (DiffKind, &str, &Value)> + '_ {
        [DiffKind::Change, DiffKind::Del, DiffKind::Add]
            .into_iter()
            .flat_map(move |kind| {
                self.entries_of(kind)
                    .into_iter()
                    .flatten()
                    .map(move |(path, value)| (kind, path.as_str(), value))
            })
    }

    /// Record an entry, allocating its mapping on first use.
    pub fn record(&mut self, kind: DiffKind, path: String, value: Value) {
        let slot = match kind {
            DiffKind::Change => &mut self.change,
            DiffKind::Add => &mut self.add,
            DiffKind::Del => &mut self.del,
        };
        slot.get_or_insert_with(BTreeMap::new).insert(path, value);
    }

    /// Move every entry of `nested` into `self`, prefixing its path with `prefix`.
    pub fn merge_prefixed(&mut self, prefix: &str, nested: DiffDetails) {
        let DiffDetails { change, del, add } = nested;
        for (kind, entries) in [
            (DiffKind::Change, change),
            (DiffKind::Del, del),
            (DiffKind::Add, add),
        ] {
            for (nested_path, value) in entries.into_iter().flatten() {
                self.record(kind, path::join(prefix, &nested_path), value);
            }
        }
    }
}
