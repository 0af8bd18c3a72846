//! Per-field comparison annotations.
//!
//! An annotation is a short string attached to a record field when the
//! record is declared (see [`record!`](crate::record)). It is parsed once,
//! when the record's descriptor is first built, into a [`FieldAnnotation`].
//!
//! | Raw             | Meaning                                              |
//! |-----------------|------------------------------------------------------|
//! | `""`            | recurse field by field                               |
//! | `"-"`           | skip the field                                       |
//! | `"Name"`        | sequence: match elements by `Name`, recurse per pair |
//! | `"Name,direct"` | sequence: match by `Name`, compare pairs as a whole  |
//! | `"direct"`      | compare the whole value as one opaque unit           |

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

const DIRECT: &str = "direct";
const EXCLUDED: &str = "-";

/// How a matched pair of composite values is compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareMode {
    /// Descend into sub-fields and report differences at their own paths.
    #[default]
    Recursive,
    /// Compare as a whole; any difference is reported at the value's path.
    Direct,
}

/// Parsed form of a field annotation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAnnotation {
    /// Sub-field used to match sequence elements, if any.
    pub key_field: Option<String>,
    pub mode: CompareMode,
    /// The field is skipped entirely.
    pub excluded: bool,
}

impl FieldAnnotation {
    /// The annotation of an unannotated field.
    pub const NONE: FieldAnnotation = FieldAnnotation {
        key_field: None,
        mode: CompareMode::Recursive,
        excluded: false,
    };

    /// Parse a raw annotation string.
    ///
    /// Parsing never fails. Options after the comma other than `direct`
    /// are ignored with a warning.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == EXCLUDED {
            return Self::excluded();
        }

        let (key, option) = match raw.split_once(',') {
            Some((key, option)) => (key.trim(), Some(option.trim())),
            None => (raw, None),
        };

        if option.is_none() && key == DIRECT {
            return Self::direct();
        }

        let mode = match option {
            None | Some("") => CompareMode::Recursive,
            Some(DIRECT) => CompareMode::Direct,
            Some(other) => {
                warn!(annotation = raw, option = other, "ignoring unknown annotation option");
                CompareMode::Recursive
            }
        };

        Self {
            key_field: (!key.is_empty()).then(|| key.to_string()),
            mode,
            excluded: false,
        }
    }

    /// An annotation that skips the field.
    pub fn excluded() -> Self {
        Self {
            excluded: true,
            ..Self::NONE
        }
    }

    /// Whole-value comparison without a key field.
    pub fn direct() -> Self {
        Self {
            mode: CompareMode::Direct,
            ..Self::NONE
        }
    }

    /// Match sequence elements by `key_field`, comparing pairs in `mode`.
    pub fn keyed(key_field: impl Into<String>, mode: CompareMode) -> Self {
        Self {
            key_field: Some(key_field.into()),
            mode,
            excluded: false,
        }
    }

    /// Returns `true` for the annotation of an unannotated field.
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Returns `true` when elements are matched by a key field.
    pub fn is_keyed(&self) -> bool {
        self.key_field.is_some()
    }
}

/// Renders back to the raw annotation syntax.
impl fmt::Display for FieldAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.excluded {
            return f.write_str(EXCLUDED);
        }
        match (&self.key_field, self.mode) {
            (None, CompareMode::Recursive) => Ok(()),
            (None, CompareMode::Direct) => f.write_str(DIRECT),
            (Some(key), CompareMode::Recursive) => f.write_str(key),
            (Some(key), CompareMode::Direct) => write!(f, "{key},{DIRECT}"),
        }
    }
}
