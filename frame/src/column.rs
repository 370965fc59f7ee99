//! FILENAME: frame/src/column.rs
//! PURPOSE: Typed column storage for tables.
//! CONTEXT: A `Column` is one of the three element representations. Generic
//! helpers operate on `Vec<T: Element>` and the `map_column!` macro dispatches
//! them across the variants so each operation is written once.

use labels::FillMethod;

use crate::error::FrameError;
use crate::value::{DType, Element, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<f64>),
    Text(Vec<Option<String>>),
    Object(Vec<Value>),
}

/// Applies a generic expression to the inner vector, rewrapping in the same variant.
macro_rules! map_column {
    ($column:expr, $v:ident => $body:expr) => {
        match $column {
            Column::Float($v) => Column::Float($body),
            Column::Text($v) => Column::Text($body),
            Column::Object($v) => Column::Object($body),
        }
    };
}

/// Applies a generic expression to the inner vector, returning its result directly.
macro_rules! with_column {
    ($column:expr, $v:ident => $body:expr) => {
        match $column {
            Column::Float($v) => $body,
            Column::Text($v) => $body,
            Column::Object($v) => $body,
        }
    };
}

// ============================================================================
// GENERIC VECTOR HELPERS
// ============================================================================

/// Gathers values by indexer, filling `None` positions with the missing sentinel.
pub fn take_vec<T: Element>(values: &[T], indexer: &[Option<usize>]) -> Vec<T> {
    indexer
        .iter()
        .map(|entry| match entry {
            Some(pos) => values[*pos].clone(),
            None => T::missing(),
        })
        .collect()
}

/// Fills missing entries from the nearest valid neighbour in the given direction.
pub fn fill_vec<T: Element>(values: &mut [T], method: FillMethod) {
    match method {
        FillMethod::Pad => {
            let mut last: Option<T> = None;
            for value in values.iter_mut() {
                if value.is_missing() {
                    if let Some(prev) = &last {
                        *value = prev.clone();
                    }
                } else {
                    last = Some(value.clone());
                }
            }
        }
        FillMethod::Backfill => {
            let mut next: Option<T> = None;
            for value in values.iter_mut().rev() {
                if value.is_missing() {
                    if let Some(following) = &next {
                        *value = following.clone();
                    }
                } else {
                    next = Some(value.clone());
                }
            }
        }
    }
}

/// Casts every element of one representation into another.
pub fn cast_vec<S: Element, T: Element>(values: &[S]) -> Result<Vec<T>, FrameError> {
    values.iter().map(|v| T::from_value(&v.to_value())).collect()
}

// ============================================================================
// COLUMN
// ============================================================================

impl Column {
    /// An all-missing column of the given kind.
    pub fn missing(dtype: DType, len: usize) -> Column {
        match dtype {
            DType::Float => Column::Float(vec![f64::NAN; len]),
            DType::Text => Column::Text(vec![None; len]),
            DType::Object => Column::Object(vec![Value::Missing; len]),
        }
    }

    /// Builds a column from boxed values, inferring the narrowest kind.
    pub fn from_values(values: Vec<Value>) -> Column {
        let all_numeric = values
            .iter()
            .all(|v| matches!(v, Value::Missing | Value::Number(_)));
        if all_numeric {
            return Column::Float(values.iter().map(|v| v.as_f64().unwrap_or(f64::NAN)).collect());
        }
        let all_text = values
            .iter()
            .all(|v| matches!(v, Value::Missing | Value::Text(_)));
        if all_text {
            return Column::Text(
                values
                    .into_iter()
                    .map(|v| match v {
                        Value::Text(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            );
        }
        Column::Object(values)
    }

    pub fn len(&self) -> usize {
        with_column!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            Column::Float(_) => DType::Float,
            Column::Text(_) => DType::Text,
            Column::Object(_) => DType::Object,
        }
    }

    pub fn get(&self, row: usize) -> Option<Value> {
        with_column!(self, v => v.get(row).map(Element::to_value))
    }

    pub fn is_missing(&self, row: usize) -> bool {
        with_column!(self, v => v.get(row).map_or(true, Element::is_missing))
    }

    pub fn missing_mask(&self) -> Vec<bool> {
        with_column!(self, v => v.iter().map(Element::is_missing).collect())
    }

    pub fn to_values(&self) -> Vec<Value> {
        with_column!(self, v => v.iter().map(Element::to_value).collect())
    }

    /// Numeric view of the column. Fails on text content.
    pub fn to_f64(&self) -> Result<Vec<f64>, FrameError> {
        match self {
            Column::Float(v) => Ok(v.clone()),
            Column::Text(v) => cast_vec::<Option<String>, f64>(v),
            Column::Object(v) => cast_vec::<Value, f64>(v),
        }
    }

    /// Casts to another kind. Text -> Float fails for non-missing entries.
    pub fn cast(&self, dtype: DType) -> Result<Column, FrameError> {
        if self.dtype() == dtype {
            return Ok(self.clone());
        }
        let values = self.to_values();
        Ok(match dtype {
            DType::Float => Column::Float(cast_vec::<Value, f64>(&values)?),
            DType::Text => Column::Text(cast_vec::<Value, Option<String>>(&values)?),
            DType::Object => Column::Object(values),
        })
    }

    /// Sets one entry, widening the column to `Object` when the value does not fit.
    pub fn set(&mut self, row: usize, value: Value) -> Result<(), FrameError> {
        let len = self.len();
        if row >= len {
            return Err(FrameError::LengthMismatch { expected: len, got: row + 1 });
        }
        let fits = value.is_missing() || value.dtype() == self.dtype() || self.dtype() == DType::Object;
        if !fits {
            *self = self.cast(DType::Object)?;
        }
        match self {
            Column::Float(v) => v[row] = f64::from_value(&value)?,
            Column::Text(v) => v[row] = Option::<String>::from_value(&value)?,
            Column::Object(v) => v[row] = value,
        }
        Ok(())
    }

    pub fn take(&self, indexer: &[Option<usize>]) -> Column {
        map_column!(self, v => take_vec(v, indexer))
    }

    /// Keeps the entries whose mask value is true.
    pub fn filter(&self, mask: &[bool]) -> Column {
        map_column!(self, v => v
            .iter()
            .zip(mask.iter())
            .filter(|(_, keep)| **keep)
            .map(|(x, _)| x.clone())
            .collect())
    }

    pub fn fill_method(&self, method: FillMethod) -> Column {
        let mut filled = self.clone();
        with_column!(&mut filled, v => fill_vec(v, method));
        filled
    }

    /// Replaces missing entries with `value`, widening the column if needed.
    pub fn fill_value(&self, value: &Value) -> Result<Column, FrameError> {
        if value.is_missing() {
            return Ok(self.clone());
        }
        let target = if value.dtype() == self.dtype() {
            self.clone()
        } else {
            self.cast(self.dtype().common(value.dtype()))?
        };
        Ok(match target {
            Column::Float(v) => {
                let fill = f64::from_value(value)?;
                Column::Float(v.into_iter().map(|x| if x.is_nan() { fill } else { x }).collect())
            }
            Column::Text(v) => {
                let fill = Option::<String>::from_value(value)?;
                Column::Text(v.into_iter().map(|x| x.or_else(|| fill.clone())).collect())
            }
            Column::Object(v) => Column::Object(
                v.into_iter()
                    .map(|x| if x.is_missing() { value.clone() } else { x })
                    .collect(),
            ),
        })
    }

    /// Missing-aware equality.
    pub fn equals(&self, other: &Column) -> bool {
        self.len() == other.len()
            && self.dtype() == other.dtype()
            && (0..self.len()).all(|row| match (self.get(row), other.get(row)) {
                (Some(a), Some(b)) => a.same_as(&b),
                _ => false,
            })
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::Float(values)
    }
}

impl From<Vec<&str>> for Column {
    fn from(values: Vec<&str>) -> Self {
        Column::Text(values.into_iter().map(|s| Some(s.to_string())).collect())
    }
}

impl From<Vec<Value>> for Column {
    fn from(values: Vec<Value>) -> Self {
        Column::Object(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_fills_missing() {
        let column = Column::from(vec![1.0, 2.0, 3.0]);
        let taken = column.take(&[Some(2), None, Some(0)]);
        match taken {
            Column::Float(v) => {
                assert_eq!(v[0], 3.0);
                assert!(v[1].is_nan());
                assert_eq!(v[2], 1.0);
            }
            _ => panic!("Expected float column"),
        }

        let text = Column::from(vec!["a"]).take(&[None, Some(0)]);
        assert_eq!(text, Column::Text(vec![None, Some("a".to_string())]));
    }

    #[test]
    fn test_fill_methods() {
        let column = Column::from(vec![f64::NAN, 1.0, f64::NAN, 3.0, f64::NAN]);
        let padded = column.fill_method(FillMethod::Pad).to_f64().unwrap();
        assert!(padded[0].is_nan());
        assert_eq!(&padded[1..], &[1.0, 1.0, 3.0, 3.0]);

        let backfilled = column.fill_method(FillMethod::Backfill).to_f64().unwrap();
        assert_eq!(&backfilled[..4], &[1.0, 1.0, 3.0, 3.0]);
        assert!(backfilled[4].is_nan());
    }

    #[test]
    fn test_set_widens_to_object() {
        let mut column = Column::from(vec![1.0, 2.0]);
        column.set(1, Value::from("x")).unwrap();
        assert_eq!(column.dtype(), DType::Object);
        assert_eq!(column.get(0), Some(Value::Number(1.0)));
        assert_eq!(column.get(1), Some(Value::from("x")));
    }

    #[test]
    fn test_from_values_inference() {
        assert_eq!(Column::from_values(vec![Value::Number(1.0), Value::Missing]).dtype(), DType::Float);
        assert_eq!(Column::from_values(vec![Value::from("a"), Value::Missing]).dtype(), DType::Text);
        assert_eq!(Column::from_values(vec![Value::from("a"), Value::Number(1.0)]).dtype(), DType::Object);
    }

    #[test]
    fn test_fill_value_and_cast() {
        let column = Column::from(vec![f64::NAN, 2.0]);
        let filled = column.fill_value(&Value::Number(0.0)).unwrap();
        assert_eq!(filled, Column::Float(vec![0.0, 2.0]));

        assert!(Column::from(vec!["a"]).cast(DType::Float).is_err());
        assert!(Column::from(vec!["a"]).to_f64().is_err());
    }
}
