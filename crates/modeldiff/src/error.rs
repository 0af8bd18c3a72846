//! Error types for the diff engine.

use modeldiff_types::Shape;

/// Errors that abort a diff. No partial result is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// New and old values at some path are not the same type.
    #[error("type mismatch at {path:?}: new is {new}, old is {old}")]
    TypeMismatch {
        path: String,
        new: &'static str,
        old: &'static str,
    },

    /// An annotation was attached to a value that does not accept it.
    #[error("annotation {annotation:?} is not allowed on a {shape} at {path:?}")]
    InvalidAnnotation {
        path: String,
        annotation: String,
        shape: Shape,
    },

    /// The key field is absent from a sequence element or not exported.
    #[error("key field {key:?} is missing or not exported on an element of {path:?}")]
    MissingKeyField { path: String, key: String },

    /// The key field's value is not a scalar.
    #[error("key field {key:?} of an element of {path:?} is a {shape}, expected a scalar")]
    UnsupportedKeyType {
        path: String,
        key: String,
        shape: Shape,
    },

    /// A keyed sequence element does not resolve to a record.
    #[error("element of keyed sequence {path:?} is a {shape}, expected a record")]
    InvalidElement { path: String, shape: Shape },

    /// Two elements of one keyed sequence share a key value.
    #[error("duplicate key {key}=={value} in sequence {path:?}")]
    DuplicateKey {
        path: String,
        key: String,
        value: String,
    },
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
