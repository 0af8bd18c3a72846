//! Paths: where in a value a difference was found.
//!
//! A path renders as dot-separated segments. Record fields and mapping keys
//! are plain segments; a matched element of a keyed sequence is the selector
//! `#(keyField==value)`, e.g. `Subjects.#(Name=="Math").Score`. The root path
//! is empty, so the first segment owns the full name.

use std::fmt;

use modeldiff_types::Scalar;

/// One step of a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    /// Mapping key in its bare canonical text.
    Key(String),
    /// Keyed sequence element: key field and quoted canonical value.
    Selector { field: String, value: String },
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) | Segment::Key(name) => f.write_str(name),
            Segment::Selector { field, value } => write!(f, "#({field}=={value})"),
        }
    }
}

/// An ordered list of segments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The empty root path.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn push(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    /// Path of a record field below this one.
    pub fn field(&self, name: &str) -> Self {
        self.push(Segment::Field(name.to_string()))
    }

    /// Path of a mapping entry below this one.
    pub fn key(&self, key: &Scalar) -> Self {
        self.push(Segment::Key(key.key_text()))
    }

    /// Path of the keyed sequence element whose `field` equals `value`.
    pub fn selector(&self, field: &str, value: &Scalar) -> Self {
        self.push(Segment::Selector {
            field: field.to_string(),
            value: value.selector_text(),
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Prefix an already rendered path with `prefix`.
pub fn join(prefix: &str, nested: &str) -> String {
    match (prefix.is_empty(), nested.is_empty()) {
        (true, _) => nested.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}.{nested}"),
    }
}
