//! Records: composite values with named fields.
//!
//! Each record type owns one [`RecordDescriptor`], built on first use and
//! cached for the life of the process. The descriptor carries the parsed
//! [`FieldAnnotation`] of every field, so annotations are never re-parsed
//! during a comparison.
//!
//! Records are normally declared through [`record!`](crate::record), which
//! emits the struct together with its [`RecordModel`] and [`Model`] impls.

use serde_json::{Map, Value};

use crate::annotation::FieldAnnotation;
use crate::model::{Model, View};

/// Static description of one record field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name used as the path segment.
    pub name: &'static str,
    pub annotation: FieldAnnotation,
    /// Only exported fields are compared, used as key fields, or recorded.
    pub exported: bool,
}

impl FieldDescriptor {
    /// Describe a field, parsing its raw annotation.
    pub fn new(name: &'static str, raw_annotation: &str, exported: bool) -> Self {
        Self {
            name,
            annotation: FieldAnnotation::parse(raw_annotation),
            exported,
        }
    }
}

/// Static description of a record type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordDescriptor {
    pub name: &'static str,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    pub fn new(name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self { name, fields }
    }

    /// Position and descriptor of the field called `name`.
    pub fn field(&self, name: &str) -> Option<(usize, &FieldDescriptor)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    /// Number of exported fields.
    pub fn exported_len(&self) -> usize {
        self.fields.iter().filter(|f| f.exported).count()
    }
}

/// A record type: a cached descriptor plus field values in descriptor order.
pub trait RecordModel {
    fn descriptor() -> &'static RecordDescriptor;

    /// Field values, one per descriptor field, in the same order.
    fn field_values(&self) -> Vec<&dyn Model>;
}

/// Borrowed view of a record's fields.
pub struct RecordView<'a> {
    descriptor: &'static RecordDescriptor,
    values: Vec<&'a dyn Model>,
}

impl<'a> RecordView<'a> {
    /// Pair a descriptor with its field values.
    ///
    /// `values` must be in descriptor order and of the same length.
    pub fn new(descriptor: &'static RecordDescriptor, values: Vec<&'a dyn Model>) -> Self {
        debug_assert_eq!(descriptor.fields.len(), values.len());
        Self { descriptor, values }
    }

    pub fn descriptor(&self) -> &'static RecordDescriptor {
        self.descriptor
    }

    /// All fields with their values, exported or not.
    pub fn fields(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &'a dyn Model)> + '_ {
        self.descriptor.fields.iter().zip(self.values.iter().copied())
    }

    /// Exported fields with their values.
    pub fn exported(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &'a dyn Model)> + '_ {
        self.fields().filter(|(f, _)| f.exported)
    }

    /// Look up a field by its path name.
    pub fn field(&self, name: &str) -> Option<(&'static FieldDescriptor, &'a dyn Model)> {
        let (index, field) = self.descriptor.field(name)?;
        self.values.get(index).map(|value| (field, *value))
    }
}

/// [`Model::view`] for a record type.
pub fn view_record<R: RecordModel>(record: &R) -> View<'_> {
    View::Record(RecordView::new(R::descriptor(), record.field_values()))
}

/// [`Model::to_json`] for a record type: an object of its exported fields.
pub fn record_to_json<R: RecordModel>(record: &R) -> Value {
    let map: Map<String, Value> = R::descriptor()
        .fields
        .iter()
        .zip(record.field_values())
        .filter(|(f, _)| f.exported)
        .map(|(f, v)| (f.name.to_string(), v.to_json()))
        .collect();
    Value::Object(map)
}

/// Declare a record type that can be diffed.
///
/// The struct is emitted as written, minus the diff-specific suffixes, and
/// gains [`RecordModel`] and [`Model`] impls. Each field may carry:
///
/// - `as "Name"`: the path segment for the field (defaults to the identifier);
/// - `=> "annotation"`: the field's comparison annotation.
///
/// Only fields declared plain `pub` are exported. Generic records are not
/// supported; implement [`RecordModel`] by hand for those.
///
/// ```
/// modeldiff_types::record! {
///     #[derive(Clone, Debug)]
///     pub struct Subject {
///         pub name: String as "Name",
///         pub score: f64 as "Score",
///     }
/// }
///
/// modeldiff_types::record! {
///     #[derive(Clone, Debug)]
///     pub struct Student {
///         pub subjects: Vec<Subject> as "Subjects" => "Name",
///         notes: String,
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    (@name $field:ident) => {
        stringify!($field)
    };
    (@name $field:ident $rename:literal) => {
        $rename
    };
    (@annotation) => {
        ""
    };
    (@annotation $annotation:literal) => {
        $annotation
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty $(as $rename:literal)? $(=> $annotation:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::RecordModel for $name {
            fn descriptor() -> &'static $crate::RecordDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<$crate::RecordDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    $crate::RecordDescriptor::new(
                        stringify!($name),
                        ::std::vec![
                            $(
                                $crate::FieldDescriptor::new(
                                    $crate::record!(@name $field $($rename)?),
                                    $crate::record!(@annotation $($annotation)?),
                                    stringify!($fvis) == "pub",
                                ),
                            )*
                        ],
                    )
                })
            }

            fn field_values(&self) -> ::std::vec::Vec<&dyn $crate::Model> {
                ::std::vec![$(&self.$field as &dyn $crate::Model),*]
            }
        }

        impl $crate::Model for $name {
            fn view(&self) -> $crate::View<'_> {
                $crate::view_record(self)
            }

            fn to_json(&self) -> $crate::__private::serde_json::Value {
                $crate::record_to_json(self)
            }
        }
    };
}
