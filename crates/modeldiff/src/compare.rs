//! The recursive comparator.
//!
//! [`Comparator::compare`] inspects the shape of a new/old pair and
//! dispatches to scalar, optional, sequence, record, or mapping handling.
//! Keyed sequences are delegated to the matcher in [`crate::keyed`].

use std::collections::HashMap;

use serde_json::Value;
use tracing::trace;

use modeldiff_types::{CompareMode, FieldAnnotation, Model, RecordView, Scalar, Shape, View};

use crate::config::DiffConfig;
use crate::details::{DiffDetails, DiffKind};
use crate::error::{DiffError, DiffResult};
use crate::path::Path;

/// Walks a pair of values and accumulates their differences.
///
/// One comparator owns one [`DiffDetails`]; nested comparisons (direct-mode
/// equality, keyed elements) run on fresh comparators sharing the config.
pub(crate) struct Comparator<'c> {
    pub(crate) config: &'c DiffConfig,
    pub(crate) details: DiffDetails,
}

impl<'c> Comparator<'c> {
    pub(crate) fn new(config: &'c DiffConfig) -> Self {
        Self {
            config,
            details: DiffDetails::new(),
        }
    }

    pub(crate) fn finish(self) -> DiffDetails {
        self.details
    }

    /// Compare `new` against `old` at `path` under `annotation`.
    pub(crate) fn compare(
        &mut self,
        path: &Path,
        annotation: &FieldAnnotation,
        new: &dyn Model,
        old: &dyn Model,
    ) -> DiffResult<()> {
        if annotation.excluded {
            return Ok(());
        }

        if new.is_null() || old.is_null() {
            if new.is_null() != old.is_null() {
                self.record(DiffKind::Change, path, old.to_json());
            }
            return Ok(());
        }

        let (new_name, old_name) = (new.type_name(), old.type_name());
        if new_name != old_name {
            return Err(DiffError::TypeMismatch {
                path: path.to_string(),
                new: new_name,
                old: old_name,
            });
        }

        match (new.view(), old.view()) {
            (View::Scalar(n), View::Scalar(o)) => {
                self.ensure_unannotated(path, annotation, Shape::Scalar)?;
                if n != o {
                    self.record(DiffKind::Change, path, old.to_json());
                }
                Ok(())
            }
            (View::Sequence(n), View::Sequence(o)) => match &annotation.key_field {
                Some(key_field) => self.match_by_key(path, key_field, annotation.mode, &n, &o),
                None => {
                    self.ensure_unannotated(path, annotation, Shape::Sequence)?;
                    if !structurally_equal(new, old) {
                        self.record(DiffKind::Change, path, old.to_json());
                    }
                    Ok(())
                }
            },
            (View::Optional(n), View::Optional(o)) => match (n, o) {
                (None, None) => Ok(()),
                (Some(n), Some(o)) => self.compare(path, annotation, n, o),
                _ => {
                    self.record(DiffKind::Change, path, old.to_json());
                    Ok(())
                }
            },
            (View::Record(n), View::Record(o)) => {
                self.compare_records(path, annotation, (new, n), (old, o))
            }
            (View::Mapping(n), View::Mapping(o)) => {
                self.ensure_unannotated(path, annotation, Shape::Mapping)?;
                self.compare_mappings(path, n, o)
            }
            (n, o) => Err(DiffError::TypeMismatch {
                path: path.to_string(),
                new: n.shape().as_str(),
                old: o.shape().as_str(),
            }),
        }
    }

    fn compare_records(
        &mut self,
        path: &Path,
        annotation: &FieldAnnotation,
        (new_value, new): (&dyn Model, RecordView<'_>),
        (old_value, old): (&dyn Model, RecordView<'_>),
    ) -> DiffResult<()> {
        if annotation.is_keyed() {
            return Err(invalid_annotation(path, annotation, Shape::Record));
        }

        match annotation.mode {
            CompareMode::Direct => {
                if !self.values_equal(new_value, old_value)? {
                    self.record(DiffKind::Change, path, old_value.to_json());
                }
                Ok(())
            }
            CompareMode::Recursive => {
                for ((field, n), (_, o)) in new.exported().zip(old.exported()) {
                    self.compare(&path.field(field.name), &field.annotation, n, o)?;
                }
                Ok(())
            }
        }
    }

    fn compare_mappings(
        &mut self,
        path: &Path,
        new: Vec<(Scalar, &dyn Model)>,
        old: Vec<(Scalar, &dyn Model)>,
    ) -> DiffResult<()> {
        let old_by_key: HashMap<String, &dyn Model> =
            old.iter().map(|(k, v)| (k.key_text(), *v)).collect();
        let new_by_key: HashMap<String, &dyn Model> =
            new.iter().map(|(k, v)| (k.key_text(), *v)).collect();

        for (key, n) in &new {
            let entry_path = path.key(key);
            match old_by_key.get(&key.key_text()) {
                Some(o) => self.compare(&entry_path, &FieldAnnotation::NONE, *n, *o)?,
                None => {
                    let value = self.added_value(*n);
                    self.record(DiffKind::Add, &entry_path, value);
                }
            }
        }

        for (key, o) in &old {
            if !new_by_key.contains_key(&key.key_text()) {
                self.record(DiffKind::Del, &path.key(key), o.to_json());
            }
        }
        Ok(())
    }

    /// Whole-value equality: a full sub-comparison that finds nothing.
    pub(crate) fn values_equal(&self, new: &dyn Model, old: &dyn Model) -> DiffResult<bool> {
        let mut sub = Comparator::new(self.config);
        sub.compare(&Path::root(), &FieldAnnotation::NONE, new, old)?;
        Ok(sub.details.is_empty())
    }

    /// The value stored for an `Add` entry.
    pub(crate) fn added_value(&self, new: &dyn Model) -> Value {
        if self.config.record_added_values {
            new.to_json()
        } else {
            Value::Null
        }
    }

    pub(crate) fn record(&mut self, kind: DiffKind, path: &Path, value: Value) {
        let path = path.to_string();
        trace!(%kind, path = %path, "recording difference");
        self.details.record(kind, path, value);
    }

    fn ensure_unannotated(
        &self,
        path: &Path,
        annotation: &FieldAnnotation,
        shape: Shape,
    ) -> DiffResult<()> {
        if annotation.is_none() {
            Ok(())
        } else {
            Err(invalid_annotation(path, annotation, shape))
        }
    }
}

/// Annotation-blind deep equality, used for unkeyed sequences.
///
/// Type names, lengths, optional presence, scalars and exported record
/// fields must all agree. Mapping entries pair up by key text.
pub(crate) fn structurally_equal(new: &dyn Model, old: &dyn Model) -> bool {
    if new.is_null() || old.is_null() {
        return new.is_null() == old.is_null();
    }
    if new.type_name() != old.type_name() {
        return false;
    }

    match (new.view(), old.view()) {
        (View::Scalar(n), View::Scalar(o)) => n == o,
        (View::Optional(n), View::Optional(o)) => match (n, o) {
            (None, None) => true,
            (Some(n), Some(o)) => structurally_equal(n, o),
            _ => false,
        },
        (View::Sequence(n), View::Sequence(o)) => {
            n.len() == o.len() && n.iter().zip(&o).all(|(n, o)| structurally_equal(*n, *o))
        }
        (View::Record(n), View::Record(o)) => n
            .exported()
            .zip(o.exported())
            .all(|((_, n), (_, o))| structurally_equal(n, o)),
        (View::Mapping(n), View::Mapping(o)) => {
            if n.len() != o.len() {
                return false;
            }
            let old_by_key: HashMap<String, &dyn Model> =
                o.iter().map(|(k, v)| (k.key_text(), *v)).collect();
            n.iter().all(|(key, n)| {
                old_by_key
                    .get(&key.key_text())
                    .is_some_and(|o| structurally_equal(*n, *o))
            })
        }
        _ => false,
    }
}

fn invalid_annotation(path: &Path, annotation: &FieldAnnotation, shape: Shape) -> DiffError {
    DiffError::InvalidAnnotation {
        path: path.to_string(),
        annotation: annotation.to_string(),
        shape,
    }
}
