//! Value model for modeldiff.
//!
//! This crate describes *what* can be compared: a closed set of shapes, the
//! scalars that appear at the leaves, and per-type record descriptors that
//! carry each field's parsed comparison annotation. The diff engine in the
//! `modeldiff` crate walks values through this model.
//!
//! # Key Types
//!
//! - [`Model`] -- Object-safe trait implemented by every comparable type
//! - [`View`] / [`Shape`] -- Borrowed, shape-tagged view of a value
//! - [`Scalar`] -- Leaf values with one canonical textual form
//! - [`RecordDescriptor`] / [`FieldDescriptor`] -- Cached per-type field metadata
//! - [`FieldAnnotation`] -- Parsed per-field comparison policy
//! - [`record!`] -- Declares a struct and registers it as a record

pub mod annotation;
pub mod json;
pub mod model;
pub mod record;
pub mod scalar;

pub use annotation::{CompareMode, FieldAnnotation};
pub use model::{Model, ScalarModel, Shape, View};
pub use record::{
    record_to_json, view_record, FieldDescriptor, RecordDescriptor, RecordModel, RecordView,
};
pub use scalar::{Scalar, ScalarKind};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
