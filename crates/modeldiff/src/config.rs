use serde::{Deserialize, Serialize};

/// What to do when one keyed sequence holds two elements with the same key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicateKeyPolicy {
    /// Fail with [`DiffError::DuplicateKey`](crate::DiffError::DuplicateKey).
    #[default]
    Reject,
    /// Match against the first element with the key; later ones are shadowed.
    FirstMatch,
}

/// Configuration for a diff run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Handling of duplicate keys inside keyed sequences.
    pub duplicate_keys: DuplicateKeyPolicy,
    /// When `true`, `Add` entries carry the new value instead of `null`.
    pub record_added_values: bool,
}

impl DiffConfig {
    /// First-match key resolution and value-less additions.
    ///
    /// Never fails on duplicate keys; a sequence with repeated keys reports
    /// against the first occurrence only.
    pub fn lenient() -> Self {
        Self {
            duplicate_keys: DuplicateKeyPolicy::FirstMatch,
            ..Default::default()
        }
    }

    pub fn with_added_values(mut self, enabled: bool) -> Self {
        self.record_added_values = enabled;
        self
    }
}
