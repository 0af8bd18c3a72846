//! [`Model`] for untyped JSON documents.
//!
//! Objects are mappings, arrays are unkeyed sequences, `null` is an absent
//! optional, and the remaining kinds are scalars. Each non-null kind has its
//! own type name, so a value changing between two non-null kinds is a type
//! mismatch. A value becoming or leaving `null` is a presence change.

use serde_json::Value;

use crate::model::{Model, View};
use crate::scalar::Scalar;

fn number_scalar(n: &serde_json::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i)
    } else if let Some(u) = n.as_u64() {
        Scalar::Uint(u)
    } else {
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

impl Model for Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    fn is_null(&self) -> bool {
        Value::is_null(self)
    }

    fn view(&self) -> View<'_> {
        match self {
            Value::Null => View::Optional(None),
            Value::Bool(b) => View::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => View::Scalar(number_scalar(n)),
            Value::String(s) => View::Scalar(Scalar::Str(s.clone())),
            Value::Array(items) => View::Sequence(items.iter().map(|v| v as &dyn Model).collect()),
            Value::Object(map) => View::Mapping(
                map.iter()
                    .map(|(k, v)| (Scalar::Str(k.clone()), v as &dyn Model))
                    .collect(),
            ),
        }
    }

    fn to_json(&self) -> Value {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Shape;
    use serde_json::json;

    #[test]
    fn kinds_map_to_shapes() {
        assert_eq!(json!(null).view().shape(), Shape::Optional);
        assert_eq!(json!(true).view().shape(), Shape::Scalar);
        assert_eq!(json!([1]).view().shape(), Shape::Sequence);
        assert_eq!(json!({"a": 1}).view().shape(), Shape::Mapping);
    }

    #[test]
    fn numbers_keep_their_kind() {
        assert!(matches!(json!(-1).view(), View::Scalar(Scalar::Int(-1))));
        assert!(matches!(json!(u64::MAX).view(), View::Scalar(Scalar::Uint(u64::MAX))));
        assert!(matches!(json!(1.5).view(), View::Scalar(Scalar::Float(_))));
    }

    #[test]
    fn each_kind_has_its_own_name() {
        assert_ne!(json!(1).type_name(), json!("1").type_name());
        assert_eq!(json!({}).type_name(), json!({"x": 1}).type_name());
    }

    #[test]
    fn only_null_is_null() {
        assert!(Model::is_null(&json!(null)));
        assert!(!Model::is_null(&json!(0)));
        assert!(!Model::is_null(&json!([])));
    }
}
