//! Annotation-driven structural diff.
//!
//! Compares a "new" and an "old" snapshot of the same type and reports the
//! differences as three flat mappings from path to value: `Change` (old
//! value), `Add` (`null`), and `Del` (old value). Per-field annotations,
//! declared with [`record!`], choose for each field whether to recurse, to
//! compare the whole value at once, to match sequence elements by a key
//! field, or to skip it.
//!
//! ```
//! use modeldiff::{diff, record, DiffKind};
//!
//! record! {
//!     #[derive(Clone, Debug)]
//!     pub struct Subject {
//!         pub name: String as "Name",
//!         pub score: f64 as "Score",
//!     }
//! }
//!
//! record! {
//!     #[derive(Clone, Debug)]
//!     pub struct Student {
//!         pub subjects: Vec<Subject> as "Subjects" => "Name",
//!     }
//! }
//!
//! let old = Student { subjects: vec![Subject { name: "Math".into(), score: 80.0 }] };
//! let new = Student { subjects: vec![Subject { name: "Math".into(), score: 88.0 }] };
//!
//! let details = diff(&new, &old).unwrap();
//! assert_eq!(
//!     details.get(DiffKind::Change, r#"Subjects.#(Name=="Math").Score"#),
//!     Some(&serde_json::json!(80.0)),
//! );
//! ```
//!
//! # Key Types
//!
//! - [`Differ`] / [`DiffConfig`] -- Configured entry point
//! - [`DiffDetails`] / [`DiffKind`] -- The three result mappings
//! - [`Path`] / [`Segment`] -- Where a difference was found
//! - [`DiffError`] -- Why no result is available

mod compare;
pub mod config;
pub mod details;
pub mod error;
mod keyed;
pub mod path;

use tracing::debug;

pub use config::{DiffConfig, DuplicateKeyPolicy};
pub use details::{DiffDetails, DiffKind};
pub use error::{DiffError, DiffResult};
pub use path::{Path, Segment};

pub use modeldiff_types::{
    record, CompareMode, FieldAnnotation, FieldDescriptor, Model, RecordDescriptor, RecordModel,
    Scalar, ScalarModel, Shape, View,
};

use crate::compare::Comparator;

/// Runs diffs under one configuration.
///
/// A `Differ` holds no mutable state; every call owns its own result, so one
/// instance can serve concurrent callers.
#[derive(Clone, Debug, Default)]
pub struct Differ {
    config: DiffConfig,
}

impl Differ {
    pub fn new(config: DiffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Compare two snapshots of the same type.
    ///
    /// Any error aborts the whole comparison; no partial result is returned.
    pub fn diff<T: Model>(&self, new: &T, old: &T) -> DiffResult<DiffDetails> {
        debug!(type_name = new.type_name(), "starting diff");
        let mut comparator = Comparator::new(&self.config);
        comparator.compare(&Path::root(), &FieldAnnotation::NONE, new, old)?;
        let details = comparator.finish();
        debug!(
            changes = details.modifications(),
            additions = details.additions(),
            deletions = details.deletions(),
            "diff complete"
        );
        Ok(details)
    }

    /// `true` when a full comparison finds no difference.
    pub fn deep_equal<T: Model>(&self, new: &T, old: &T) -> DiffResult<bool> {
        Comparator::new(&self.config).values_equal(new, old)
    }
}

/// Compare two snapshots with the default configuration.
pub fn diff<T: Model>(new: &T, old: &T) -> DiffResult<DiffDetails> {
    Differ::default().diff(new, old)
}

/// Whole-value equality with the default configuration.
pub fn deep_equal<T: Model>(new: &T, old: &T) -> DiffResult<bool> {
    Differ::default().deep_equal(new, old)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn diff_of_identical_scalars_is_empty() {
        assert!(diff(&1u32, &1u32).unwrap().is_empty());
    }

    #[test]
    fn deep_equal_reports_inequality() {
        assert!(deep_equal(&"a".to_string(), &"a".to_string()).unwrap());
        assert!(!deep_equal(&vec![1, 2], &vec![2, 1]).unwrap());
    }

    #[test]
    fn differ_uses_its_config() {
        let differ = Differ::new(DiffConfig::default().with_added_values(true));
        let details = differ.diff(&json!({"a": 1, "b": 2}), &json!({"a": 1})).unwrap();
        assert_eq!(details.get(DiffKind::Add, "b"), Some(&json!(2)));
        assert!(differ.config().record_added_values);
    }

    #[test]
    fn errors_leave_no_result() {
        let result = diff(&json!({"a": [1]}), &json!({"a": {"b": 1}}));
        assert!(matches!(result, Err(DiffError::TypeMismatch { .. })));
    }
}
