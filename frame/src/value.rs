//! FILENAME: frame/src/value.rs
//! PURPOSE: Defines the scalar cell value and the element kinds a column can hold.
//! CONTEXT: Columns are stored in one of three typed representations (`DType`).
//! The `Element` trait gives each representation its missing-value sentinel and
//! the casting rules to and from the boxed `Value`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FrameError;

/// The element kind of a column or 2D buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    /// f64 storage, NaN as missing.
    Float,
    /// Optional strings, None as missing.
    Text,
    /// Boxed `Value`s of any kind, `Value::Missing` as missing.
    Object,
}

impl DType {
    /// The narrowest kind able to hold both inputs.
    pub fn common(self, other: DType) -> DType {
        if self == other {
            self
        } else {
            DType::Object
        }
    }

    /// The narrowest kind able to hold every input; `Float` for no inputs.
    pub fn common_of<I: IntoIterator<Item = DType>>(dtypes: I) -> DType {
        let mut iter = dtypes.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, DType::common),
            None => DType::Float,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Float => "float64",
            DType::Text => "text",
            DType::Object => "object",
        };
        write!(f, "{}", name)
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Missing,
    Number(#[serde(with = "labels::label::float_repr")] f64),
    Text(String),
    Boolean(bool),
}

impl Value {
    /// True for `Missing` and for NaN numbers.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// True for values usable as an arithmetic scalar.
    pub fn is_scalar_numeric(&self) -> bool {
        matches!(self, Value::Missing | Value::Number(_) | Value::Boolean(_))
    }

    /// Numeric view: numbers, booleans as 1/0, missing as NaN. Text has none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Missing => Some(f64::NAN),
            Value::Number(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(_) => None,
        }
    }

    /// The storage kind a value of this variant naturally lives in.
    pub fn dtype(&self) -> DType {
        match self {
            Value::Missing | Value::Number(_) => DType::Float,
            Value::Text(_) => DType::Text,
            Value::Boolean(_) => DType::Object,
        }
    }

    /// Missing-aware equality: two missing values are equal.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self.is_missing(), other.is_missing()) {
            (true, true) => true,
            (false, false) => self == other,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, "NaN"),
            Value::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", if *b { "True" } else { "False" }),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Missing)
    }
}

// ============================================================================
// ELEMENT
// ============================================================================

/// A storable element type backing one of the `DType` representations.
pub trait Element: Clone + fmt::Debug + PartialEq {
    const DTYPE: DType;

    /// The missing-value sentinel for this representation.
    fn missing() -> Self;

    fn is_missing(&self) -> bool;

    fn to_value(&self) -> Value;

    /// Casts a boxed value into this representation.
    fn from_value(value: &Value) -> Result<Self, FrameError>;
}

impl Element for f64 {
    const DTYPE: DType = DType::Float;

    fn missing() -> Self {
        f64::NAN
    }

    fn is_missing(&self) -> bool {
        self.is_nan()
    }

    fn to_value(&self) -> Value {
        if self.is_nan() {
            Value::Missing
        } else {
            Value::Number(*self)
        }
    }

    fn from_value(value: &Value) -> Result<Self, FrameError> {
        value.as_f64().ok_or_else(|| FrameError::TypeMismatch {
            value: value.to_string(),
            dtype: DType::Float.to_string(),
        })
    }
}

impl Element for Option<String> {
    const DTYPE: DType = DType::Text;

    fn missing() -> Self {
        None
    }

    fn is_missing(&self) -> bool {
        self.is_none()
    }

    fn to_value(&self) -> Value {
        match self {
            Some(s) => Value::Text(s.clone()),
            None => Value::Missing,
        }
    }

    fn from_value(value: &Value) -> Result<Self, FrameError> {
        if value.is_missing() {
            Ok(None)
        } else {
            Ok(Some(value.to_string()))
        }
    }
}

impl Element for Value {
    const DTYPE: DType = DType::Object;

    fn missing() -> Self {
        Value::Missing
    }

    fn is_missing(&self) -> bool {
        Value::is_missing(self)
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: &Value) -> Result<Self, FrameError> {
        Ok(value.clone())
    }
}
