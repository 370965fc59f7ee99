//! FILENAME: labels/src/label.rs
//! PURPOSE: The hashable, totally ordered scalar used as an axis label.
//! CONTEXT: Labels are stored once per axis and looked up through a hash map,
//! so every variant must implement Eq + Hash. Floats go through `OrderedFloat`
//! which treats all NaNs as one value.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// ============================================================================
// ORDERED FLOAT
// ============================================================================

/// Wrapper around f64 that implements Eq, Ord and Hash for use as map keys.
/// NaN values are treated as equal to each other and sort last.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(#[serde(with = "float_repr")] pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            // All NaN values hash to the same thing
            u64::MAX.hash(state);
        } else if self.0 == 0.0 {
            // +0.0 and -0.0 compare equal
            0u64.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal),
        }
    }
}

impl OrderedFloat {
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

// ============================================================================
// NON-FINITE FLOATS
// ============================================================================

/// Serde representation of an f64 that survives JSON: finite values are
/// plain numbers, infinities and NaN are the strings "inf", "-inf" and "nan".
/// Use with `#[serde(with = "float_repr")]`.
pub mod float_repr {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("nan")
        } else if value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(D::Error::custom(format!("invalid float: {}", other))),
            },
        }
    }
}

// ============================================================================
// LABEL
// ============================================================================

/// A single axis label. `Tuple` labels make up hierarchical (multi-level) indexes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Int(i64),
    Float(OrderedFloat),
    Text(String),
    Bool(bool),
    Tuple(Vec<Label>),
}

impl Label {
    /// Numeric view of the label, used for cross-kind ordering of Int/Float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Label::Int(i) => Some(*i as f64),
            Label::Float(f) => Some(f.0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Label::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Number of levels: the tuple arity, or 1 for scalar labels.
    pub fn nlevels(&self) -> usize {
        match self {
            Label::Tuple(parts) => parts.len(),
            _ => 1,
        }
    }

    /// The component at `level` of a tuple label (a scalar label is its own level 0).
    pub fn level(&self, level: usize) -> Option<&Label> {
        match self {
            Label::Tuple(parts) => parts.get(level),
            other if level == 0 => Some(other),
            _ => None,
        }
    }

    /// Appends a suffix to the label's display form. Used when merging stores
    /// whose item labels collide.
    pub fn with_suffix(&self, suffix: &str) -> Label {
        Label::Text(format!("{}{}", self, suffix))
    }

    fn rank(&self) -> u8 {
        match self {
            Label::Int(_) | Label::Float(_) => 0,
            Label::Bool(_) => 1,
            Label::Text(_) => 2,
            Label::Tuple(_) => 3,
        }
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Label::Int(a), Label::Int(b)) => a.cmp(b),
            (Label::Float(a), Label::Float(b)) => a.cmp(b),
            // Mixed numeric labels compare by value; Int sorts first on ties
            (Label::Int(a), Label::Float(b)) => {
                OrderedFloat(*a as f64).cmp(b).then(Ordering::Less)
            }
            (Label::Float(a), Label::Int(b)) => {
                a.cmp(&OrderedFloat(*b as f64)).then(Ordering::Greater)
            }
            (Label::Bool(a), Label::Bool(b)) => a.cmp(b),
            (Label::Text(a), Label::Text(b)) => a.cmp(b),
            (Label::Tuple(a), Label::Tuple(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(i) => write!(f, "{}", i),
            Label::Float(x) => write!(f, "{}", x.0),
            Label::Text(s) => write!(f, "{}", s),
            Label::Bool(b) => write!(f, "{}", b),
            Label::Tuple(parts) => {
                write!(f, "(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", part)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Int(value)
    }
}

impl From<i32> for Label {
    fn from(value: i32) -> Self {
        Label::Int(value as i64)
    }
}

impl From<usize> for Label {
    fn from(value: usize) -> Self {
        Label::Int(value as i64)
    }
}

impl From<f64> for Label {
    fn from(value: f64) -> Self {
        Label::Float(OrderedFloat(value))
    }
}

impl From<bool> for Label {
    fn from(value: bool) -> Self {
        Label::Bool(value)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Text(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::Text(value)
    }
}

impl From<&Label> for Label {
    fn from(value: &Label) -> Self {
        value.clone()
    }
}

impl<A: Into<Label>, B: Into<Label>> From<(A, B)> for Label {
    fn from((a, b): (A, B)) -> Self {
        Label::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Label>, B: Into<Label>, C: Into<Label>> From<(A, B, C)> for Label {
    fn from((a, b, c): (A, B, C)) -> Self {
        Label::Tuple(vec![a.into(), b.into(), c.into()])
    }
}
