//! The comparable value model.
//!
//! Any type taking part in a diff implements [`Model`]. A model exposes its
//! type name (two values are only comparable when names agree), a borrowed
//! [`View`] that classifies it into one of the closed [`Shape`]s, and the
//! JSON form recorded in diff results.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::RecordView;
use crate::scalar::Scalar;

/// A value that can be structurally compared.
///
/// The trait is object safe; the comparator walks `&dyn Model` trees.
pub trait Model {
    /// Name of the concrete type. New and old values must agree on it.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether this is a dynamically typed null. A null compares against a
    /// value of any type: it is a presence change, never a type mismatch.
    fn is_null(&self) -> bool {
        false
    }

    /// Classify this value and borrow its parts.
    fn view(&self) -> View<'_>;

    /// The representation stored in diff results.
    fn to_json(&self) -> Value;
}

/// A [`Model`] that is always a scalar. Required for mapping keys.
pub trait ScalarModel: Model {
    fn to_scalar(&self) -> Scalar;
}

/// Structural category of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Scalar,
    Optional,
    Sequence,
    Record,
    Mapping,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Scalar => "scalar",
            Shape::Optional => "optional",
            Shape::Sequence => "sequence",
            Shape::Record => "record",
            Shape::Mapping => "mapping",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A borrowed, shape-tagged view of a [`Model`].
pub enum View<'a> {
    Scalar(Scalar),
    /// Nullable or indirect value. `None` when absent.
    Optional(Option<&'a dyn Model>),
    /// Ordered elements.
    Sequence(Vec<&'a dyn Model>),
    Record(RecordView<'a>),
    /// Unordered entries with unique scalar keys.
    Mapping(Vec<(Scalar, &'a dyn Model)>),
}

impl View<'_> {
    pub fn shape(&self) -> Shape {
        match self {
            View::Scalar(_) => Shape::Scalar,
            View::Optional(_) => Shape::Optional,
            View::Sequence(_) => Shape::Sequence,
            View::Record(_) => Shape::Record,
            View::Mapping(_) => Shape::Mapping,
        }
    }
}

impl fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Scalar(s) => f.debug_tuple("Scalar").field(s).finish(),
            View::Optional(v) => f.debug_tuple("Optional").field(&v.is_some()).finish(),
            View::Sequence(v) => f.debug_tuple("Sequence").field(&v.len()).finish(),
            View::Record(r) => f.debug_tuple("Record").field(&r.descriptor().name).finish(),
            View::Mapping(v) => f.debug_tuple("Mapping").field(&v.len()).finish(),
        }
    }
}

// ---------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------

macro_rules! scalar_model {
    ($($ty:ty => $variant:ident as $cast:ty),* $(,)?) => {
        $(
            impl Model for $ty {
                fn view(&self) -> View<'_> {
                    View::Scalar(self.to_scalar())
                }

                fn to_json(&self) -> Value {
                    self.to_scalar().to_json()
                }
            }

            impl ScalarModel for $ty {
                fn to_scalar(&self) -> Scalar {
                    Scalar::$variant(*self as $cast)
                }
            }
        )*
    };
}

scalar_model! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    isize => Int as i64,
    u8 => Uint as u64,
    u16 => Uint as u64,
    u32 => Uint as u64,
    u64 => Uint as u64,
    usize => Uint as u64,
    f32 => Float as f64,
    f64 => Float as f64,
}

impl Model for bool {
    fn view(&self) -> View<'_> {
        View::Scalar(Scalar::Bool(*self))
    }

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ScalarModel for bool {
    fn to_scalar(&self) -> Scalar {
        Scalar::Bool(*self)
    }
}

impl Model for char {
    fn view(&self) -> View<'_> {
        View::Scalar(self.to_scalar())
    }

    fn to_json(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ScalarModel for char {
    fn to_scalar(&self) -> Scalar {
        Scalar::Str(self.to_string())
    }
}

impl Model for str {
    fn view(&self) -> View<'_> {
        View::Scalar(self.to_scalar())
    }

    fn to_json(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ScalarModel for str {
    fn to_scalar(&self) -> Scalar {
        Scalar::Str(self.to_string())
    }
}

impl Model for String {
    fn view(&self) -> View<'_> {
        View::Scalar(self.to_scalar())
    }

    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ScalarModel for String {
    fn to_scalar(&self) -> Scalar {
        Scalar::Str(self.clone())
    }
}

// ---------------------------------------------------------------
// References and optionals
// ---------------------------------------------------------------

/// Borrows are transparent: they are not part of the data.
impl<T: Model + ?Sized> Model for &T {
    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn is_null(&self) -> bool {
        (**self).is_null()
    }

    fn view(&self) -> View<'_> {
        (**self).view()
    }

    fn to_json(&self) -> Value {
        (**self).to_json()
    }
}

impl<T: ScalarModel + ?Sized> ScalarModel for &T {
    fn to_scalar(&self) -> Scalar {
        (**self).to_scalar()
    }
}

impl<T: Model> Model for Option<T> {
    fn view(&self) -> View<'_> {
        View::Optional(self.as_ref().map(|v| v as &dyn Model))
    }

    fn to_json(&self) -> Value {
        self.as_ref().map_or(Value::Null, Model::to_json)
    }
}

macro_rules! pointer_model {
    ($($ptr:ident),*) => {
        $(
            impl<T: Model> Model for $ptr<T> {
                fn view(&self) -> View<'_> {
                    View::Optional(Some(&**self as &dyn Model))
                }

                fn to_json(&self) -> Value {
                    (**self).to_json()
                }
            }
        )*
    };
}

pointer_model!(Box, Rc, Arc);

// ---------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------

fn sequence_json<'a, T: Model + 'a>(items: impl IntoIterator<Item = &'a T>) -> Value {
    Value::Array(items.into_iter().map(Model::to_json).collect())
}

impl<T: Model> Model for [T] {
    fn view(&self) -> View<'_> {
        View::Sequence(self.iter().map(|v| v as &dyn Model).collect())
    }

    fn to_json(&self) -> Value {
        sequence_json(self)
    }
}

impl<T: Model, const N: usize> Model for [T; N] {
    fn view(&self) -> View<'_> {
        View::Sequence(self.iter().map(|v| v as &dyn Model).collect())
    }

    fn to_json(&self) -> Value {
        sequence_json(self)
    }
}

impl<T: Model> Model for Vec<T> {
    fn view(&self) -> View<'_> {
        View::Sequence(self.iter().map(|v| v as &dyn Model).collect())
    }

    fn to_json(&self) -> Value {
        sequence_json(self)
    }
}

impl<T: Model> Model for VecDeque<T> {
    fn view(&self) -> View<'_> {
        View::Sequence(self.iter().map(|v| v as &dyn Model).collect())
    }

    fn to_json(&self) -> Value {
        sequence_json(self)
    }
}

// ---------------------------------------------------------------
// Mappings
// ---------------------------------------------------------------

fn mapping_json<'a, K, V>(entries: impl IntoIterator<Item = (&'a K, &'a V)>) -> Value
where
    K: ScalarModel + 'a,
    V: Model + 'a,
{
    let map: Map<String, Value> = entries
        .into_iter()
        .map(|(k, v)| (k.to_scalar().key_text(), v.to_json()))
        .collect();
    Value::Object(map)
}

impl<K: ScalarModel, V: Model> Model for BTreeMap<K, V> {
    fn view(&self) -> View<'_> {
        View::Mapping(
            self.iter()
                .map(|(k, v)| (k.to_scalar(), v as &dyn Model))
                .collect(),
        )
    }

    fn to_json(&self) -> Value {
        mapping_json(self)
    }
}

impl<K: ScalarModel, V: Model, S: BuildHasher> Model for HashMap<K, V, S> {
    fn view(&self) -> View<'_> {
        View::Mapping(
            self.iter()
                .map(|(k, v)| (k.to_scalar(), v as &dyn Model))
                .collect(),
        )
    }

    fn to_json(&self) -> Value {
        mapping_json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_widen() {
        match 7u8.view() {
            View::Scalar(s) => assert_eq!(s, Scalar::Uint(7)),
            other => panic!("expected scalar, got {:?}", other),
        }
        assert_eq!((-7i16).to_scalar(), Scalar::Int(-7));
    }

    #[test]
    fn type_names_distinguish_types() {
        assert_ne!(5i32.type_name(), "five".to_string().type_name());
        assert_eq!(5i32.type_name(), 6i32.type_name());
    }

    #[test]
    fn borrows_are_transparent() {
        let s = String::from("x");
        let r = &s;
        assert_eq!(Model::type_name(&r), s.type_name());
        assert_eq!(r.view().shape(), Shape::Scalar);
    }

    #[test]
    fn option_and_box_are_optional() {
        let some = Some(1i64);
        let none: Option<i64> = None;
        let boxed = Box::new(1i64);
        assert!(matches!(some.view(), View::Optional(Some(_))));
        assert!(matches!(none.view(), View::Optional(None)));
        assert!(matches!(boxed.view(), View::Optional(Some(_))));
        assert_eq!(none.to_json(), Value::Null);
        assert_eq!(boxed.to_json(), json!(1));
    }

    #[test]
    fn sequences_keep_order() {
        let v = vec![3u32, 1, 2];
        match v.view() {
            View::Sequence(items) => assert_eq!(items.len(), 3),
            other => panic!("expected sequence, got {:?}", other),
        }
        assert_eq!(v.to_json(), json!([3, 1, 2]));
        assert_eq!([true, false].to_json(), json!([true, false]));
    }

    #[test]
    fn mappings_render_keys_bare() {
        let mut m = BTreeMap::new();
        m.insert("env".to_string(), 1i32);
        m.insert("tier".to_string(), 2i32);
        assert_eq!(m.to_json(), json!({"env": 1, "tier": 2}));

        let mut by_id = HashMap::new();
        by_id.insert(10u32, "ten".to_string());
        match by_id.view() {
            View::Mapping(entries) => assert_eq!(entries[0].0, Scalar::Uint(10)),
            other => panic!("expected mapping, got {:?}", other),
        }
    }
}
