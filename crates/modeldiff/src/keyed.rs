//! Keyed sequence matching.
//!
//! Elements of a keyed sequence are paired across snapshots by the value of
//! a designated key field instead of by position. Unpaired new elements are
//! additions, unpaired old elements are deletions, and paired elements are
//! compared either as opaque wholes (direct mode) or field by field with
//! their nested paths re-keyed under a selector.
//!
//! Matching is a linear scan per element, O(n·m). It is meant for short,
//! configuration-like lists.

use tracing::{debug, trace};

use modeldiff_types::{CompareMode, FieldAnnotation, Model, RecordView, Scalar, View};

use crate::compare::Comparator;
use crate::config::DuplicateKeyPolicy;
use crate::details::DiffKind;
use crate::error::{DiffError, DiffResult};
use crate::path::Path;

/// A sequence element together with its extracted key value.
struct KeyedElement<'a> {
    key: Scalar,
    value: &'a dyn Model,
}

impl Comparator<'_> {
    /// Match `new` against `old` by `key_field` and record the differences.
    pub(crate) fn match_by_key(
        &mut self,
        path: &Path,
        key_field: &str,
        mode: CompareMode,
        new: &[&dyn Model],
        old: &[&dyn Model],
    ) -> DiffResult<()> {
        let new = keyed_elements(path, key_field, new)?;
        let old = keyed_elements(path, key_field, old)?;

        if self.config.duplicate_keys == DuplicateKeyPolicy::Reject {
            ensure_unique_keys(path, key_field, &new)?;
            ensure_unique_keys(path, key_field, &old)?;
        }

        debug!(
            path = %path,
            key = key_field,
            new = new.len(),
            old = old.len(),
            "matching keyed sequence"
        );

        for element in &new {
            let selector = path.selector(key_field, &element.key);
            let Some(matched) = old.iter().find(|o| o.key == element.key) else {
                let value = self.added_value(element.value);
                self.record(DiffKind::Add, &selector, value);
                continue;
            };

            trace!(selector = %selector, ?mode, "matched keyed element");
            match mode {
                CompareMode::Direct => {
                    if !self.values_equal(element.value, matched.value)? {
                        self.record(DiffKind::Change, &selector, matched.value.to_json());
                    }
                }
                CompareMode::Recursive => {
                    let mut nested = Comparator::new(self.config);
                    nested.compare(&Path::root(), &FieldAnnotation::NONE, element.value, matched.value)?;
                    self.details
                        .merge_prefixed(&selector.to_string(), nested.finish());
                }
            }
        }

        for element in &old {
            if !new.iter().any(|n| n.key == element.key) {
                let selector = path.selector(key_field, &element.key);
                self.record(DiffKind::Del, &selector, element.value.to_json());
            }
        }
        Ok(())
    }
}

/// Extract the key of every element, validating element and key shapes.
fn keyed_elements<'a>(
    path: &Path,
    key_field: &str,
    elements: &[&'a dyn Model],
) -> DiffResult<Vec<KeyedElement<'a>>> {
    elements
        .iter()
        .map(|&value| {
            let record = resolve_record(path, value)?;
            let key = key_value(path, key_field, &record)?;
            Ok(KeyedElement { key, value })
        })
        .collect()
}

/// Follow optional and reference layers down to a record.
fn resolve_record<'a>(path: &Path, value: &'a dyn Model) -> DiffResult<RecordView<'a>> {
    match value.view() {
        View::Record(record) => Ok(record),
        View::Optional(Some(inner)) => resolve_record(path, inner),
        other => Err(DiffError::InvalidElement {
            path: path.to_string(),
            shape: other.shape(),
        }),
    }
}

fn key_value(path: &Path, key_field: &str, record: &RecordView<'_>) -> DiffResult<Scalar> {
    let value = match record.field(key_field) {
        Some((field, value)) if field.exported => value,
        _ => {
            return Err(DiffError::MissingKeyField {
                path: path.to_string(),
                key: key_field.to_string(),
            })
        }
    };
    scalar_key(path, key_field, value)
}

/// Follow optional and reference layers down to a scalar.
fn scalar_key(path: &Path, key_field: &str, value: &dyn Model) -> DiffResult<Scalar> {
    match value.view() {
        View::Scalar(scalar) => Ok(scalar),
        View::Optional(Some(inner)) => scalar_key(path, key_field, inner),
        other => Err(DiffError::UnsupportedKeyType {
            path: path.to_string(),
            key: key_field.to_string(),
            shape: other.shape(),
        }),
    }
}

fn ensure_unique_keys(path: &Path, key_field: &str, elements: &[KeyedElement<'_>]) -> DiffResult<()> {
    for (i, element) in elements.iter().enumerate() {
        if elements[..i].iter().any(|earlier| earlier.key == element.key) {
            return Err(DiffError::DuplicateKey {
                path: path.to_string(),
                key: key_field.to_string(),
                value: element.key.selector_text(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::config::DiffConfig;
    use crate::details::DiffDetails;
    use modeldiff_types::Shape;

    modeldiff_types::record! {
        #[derive(Clone, Debug, PartialEq)]
        pub struct Subject {
            pub name: String as "Name",
            pub score: f64 as "Score",
        }
    }

    modeldiff_types::record! {
        #[derive(Clone, Debug)]
        pub struct Transcript {
            pub subjects: Vec<Subject> as "Subjects" => "Name",
            pub boxed: Vec<Option<Box<Subject>>> as "Boxed" => "Name",
            pub direct: Vec<Subject> as "Direct" => "Name,direct",
        }
    }

    modeldiff_types::record! {
        pub struct ScalarElements {
            pub items: Vec<u32> as "Items" => "Name",
        }
    }

    modeldiff_types::record! {
        pub struct WrongKey {
            pub subjects: Vec<Subject> as "Subjects" => "Grade",
        }
    }

    modeldiff_types::record! {
        #[derive(Clone)]
        pub struct Hidden {
            id: u32,
            pub value: u32 as "Value",
        }
    }

    modeldiff_types::record! {
        pub struct HiddenKey {
            pub items: Vec<Hidden> as "Items" => "id",
        }
    }

    modeldiff_types::record! {
        #[derive(Clone)]
        pub struct Tagged {
            pub tags: Vec<String> as "Tags",
        }
    }

    modeldiff_types::record! {
        pub struct CompositeKey {
            pub items: Vec<Tagged> as "Items" => "Tags",
        }
    }

    modeldiff_types::record! {
        #[derive(Clone)]
        pub struct MaybeNamed {
            pub name: Option<String> as "Name",
        }
    }

    modeldiff_types::record! {
        pub struct OptionalKeys {
            pub items: Vec<MaybeNamed> as "Items" => "Name",
        }
    }

    modeldiff_types::record! {
        #[derive(Clone)]
        pub struct Gauge {
            pub level: f64 as "Level",
            pub unit: String as "Unit",
        }
    }

    modeldiff_types::record! {
        pub struct Gauges {
            pub items: Vec<Gauge> as "Items" => "Level",
        }
    }

    fn subject(name: &str, score: f64) -> Subject {
        Subject {
            name: name.into(),
            score,
        }
    }

    fn transcript(subjects: Vec<Subject>) -> Transcript {
        Transcript {
            boxed: subjects.iter().cloned().map(|s| Some(Box::new(s))).collect(),
            direct: subjects.clone(),
            subjects,
        }
    }

    fn run_with(config: &DiffConfig, new: &dyn Model, old: &dyn Model) -> DiffResult<DiffDetails> {
        let mut comparator = Comparator::new(config);
        comparator.compare(&Path::root(), &FieldAnnotation::NONE, new, old)?;
        Ok(comparator.finish())
    }

    fn run(new: &dyn Model, old: &dyn Model) -> DiffResult<DiffDetails> {
        run_with(&DiffConfig::default(), new, old)
    }

    #[test]
    fn same_key_recurses_into_fields() {
        let old = transcript(vec![subject("Math", 80.0)]);
        let new = transcript(vec![subject("Math", 88.0)]);
        let details = run(&new, &old).unwrap();
        assert_eq!(
            details.get(DiffKind::Change, r#"Subjects.#(Name=="Math").Score"#),
            Some(&json!(80.0))
        );
        assert_eq!(
            details.get(DiffKind::Change, r#"Boxed.#(Name=="Math").Score"#),
            Some(&json!(80.0))
        );
        assert_eq!(
            details.get(DiffKind::Change, r#"Direct.#(Name=="Math")"#),
            Some(&json!({"Name": "Math", "Score": 80.0}))
        );
        assert_eq!(details.len(), 3);
    }

    #[test]
    fn nan_key_pairs_with_itself() {
        let gauge = |unit: &str| Gauge {
            level: f64::NAN,
            unit: unit.into(),
        };
        let old = Gauges {
            items: vec![gauge("kPa")],
        };
        assert!(run(&old, &old).unwrap().is_empty());

        let new = Gauges {
            items: vec![gauge("bar")],
        };
        let details = run(&new, &old).unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(
            details.get(DiffKind::Change, "Items.#(Level==NaN).Unit"),
            Some(&json!("kPa"))
        );
    }

    #[test]
    fn renamed_key_is_del_plus_add() {
        let old = Transcript {
            subjects: vec![subject("Math", 80.0)],
            boxed: vec![],
            direct: vec![],
        };
        let new = Transcript {
            subjects: vec![subject("Maths", 80.0)],
            boxed: vec![],
            direct: vec![],
        };
        let details = run(&new, &old).unwrap();
        assert_eq!(details.modifications(), 0);
        assert_eq!(
            details.get(DiffKind::Del, r#"Subjects.#(Name=="Math")"#),
            Some(&json!({"Name": "Math", "Score": 80.0}))
        );
        assert_eq!(
            details.get(DiffKind::Add, r#"Subjects.#(Name=="Maths")"#),
            Some(&Value::Null)
        );
    }

    #[test]
    fn order_does_not_matter() {
        let old = transcript(vec![subject("Math", 80.0), subject("Art", 70.0)]);
        let new = transcript(vec![subject("Art", 70.0), subject("Math", 80.0)]);
        assert!(run(&new, &old).unwrap().is_empty());
    }

    #[test]
    fn added_values_are_recorded_when_configured() {
        let config = DiffConfig::default().with_added_values(true);
        let old = transcript(vec![]);
        let new = transcript(vec![subject("Art", 70.0)]);
        let details = run_with(&config, &new, &old).unwrap();
        assert_eq!(
            details.get(DiffKind::Add, r#"Subjects.#(Name=="Art")"#),
            Some(&json!({"Name": "Art", "Score": 70.0}))
        );
    }

    #[test]
    fn duplicate_keys_are_rejected_by_default() {
        let old = transcript(vec![subject("Math", 80.0)]);
        let new = transcript(vec![subject("Math", 80.0), subject("Math", 90.0)]);
        let err = run(&new, &old).unwrap_err();
        assert_eq!(
            err,
            DiffError::DuplicateKey {
                path: "Subjects".into(),
                key: "Name".into(),
                value: "\"Math\"".into(),
            }
        );
    }

    #[test]
    fn first_match_policy_pairs_with_first_occurrence() {
        let old = Transcript {
            subjects: vec![subject("Math", 80.0), subject("Math", 90.0)],
            boxed: vec![],
            direct: vec![],
        };
        let new = Transcript {
            subjects: vec![subject("Math", 90.0)],
            boxed: vec![],
            direct: vec![],
        };
        let details = run_with(&DiffConfig::lenient(), &new, &old).unwrap();
        assert_eq!(
            details.get(DiffKind::Change, r#"Subjects.#(Name=="Math").Score"#),
            Some(&json!(80.0))
        );
        assert_eq!(details.len(), 1);
    }

    #[test]
    fn scalar_elements_are_invalid() {
        let v = ScalarElements { items: vec![1] };
        let err = run(&v, &v).unwrap_err();
        assert_eq!(
            err,
            DiffError::InvalidElement {
                path: "Items".into(),
                shape: Shape::Scalar,
            }
        );
    }

    #[test]
    fn absent_element_is_invalid() {
        let v = Transcript {
            subjects: vec![],
            boxed: vec![None],
            direct: vec![],
        };
        let err = run(&v, &v).unwrap_err();
        assert!(matches!(err, DiffError::InvalidElement { shape: Shape::Optional, .. }));
    }

    #[test]
    fn unknown_key_field_is_missing() {
        let v = WrongKey {
            subjects: vec![subject("Math", 1.0)],
        };
        let err = run(&v, &v).unwrap_err();
        assert!(matches!(err, DiffError::MissingKeyField { .. }));
    }

    #[test]
    fn unexported_key_field_is_missing() {
        let v = HiddenKey {
            items: vec![Hidden { id: 1, value: 2 }],
        };
        let err = run(&v, &v).unwrap_err();
        assert_eq!(
            err,
            DiffError::MissingKeyField {
                path: "Items".into(),
                key: "id".into(),
            }
        );
    }

    #[test]
    fn composite_key_is_unsupported() {
        let v = CompositeKey {
            items: vec![Tagged { tags: vec![] }],
        };
        let err = run(&v, &v).unwrap_err();
        assert!(matches!(err, DiffError::UnsupportedKeyType { shape: Shape::Sequence, .. }));
    }

    #[test]
    fn optional_keys_resolve_through_indirection() {
        let old = OptionalKeys {
            items: vec![MaybeNamed { name: Some("a".into()) }],
        };
        let new = OptionalKeys {
            items: vec![MaybeNamed { name: Some("b".into()) }],
        };
        let details = run(&new, &old).unwrap();
        assert!(details.get(DiffKind::Del, r#"Items.#(Name=="a")"#).is_some());
        assert!(details.get(DiffKind::Add, r#"Items.#(Name=="b")"#).is_some());

        let absent = OptionalKeys {
            items: vec![MaybeNamed { name: None }],
        };
        let err = run(&absent, &old).unwrap_err();
        assert!(matches!(err, DiffError::UnsupportedKeyType { shape: Shape::Optional, .. }));
    }

    #[test]
    fn empty_sequences_no_diff() {
        let v = transcript(vec![]);
        assert!(run(&v, &v).unwrap().is_empty());
    }
}
