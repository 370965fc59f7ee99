//! FILENAME: frame/src/matrix.rs
//! PURPOSE: Dense 2D buffers: the generic `Matrix<T>` and the kind-tagged `Plane`.
//! CONTEXT: A `Plane` is the raw (rows x cols) buffer behind one table or one
//! panel item. Data is stored row-major.

use crate::column::{cast_vec, Column};
use crate::error::FrameError;
use crate::value::{DType, Element, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Element> Matrix<T> {
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, FrameError> {
        if data.len() != rows * cols {
            return Err(FrameError::LengthMismatch {
                expected: rows * cols,
                got: data.len(),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn missing(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::missing())
    }

    /// Builds a matrix from row vectors, checking they are rectangular.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, FrameError> {
        let cols = rows.first().map_or(0, Vec::len);
        let nrows = rows.len();
        let mut data = Vec::with_capacity(nrows * cols);
        for row in rows {
            if row.len() != cols {
                return Err(FrameError::LengthMismatch { expected: cols, got: row.len() });
            }
            data.extend(row);
        }
        Ok(Matrix { rows: nrows, cols, data })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn column(&self, col: usize) -> Vec<T> {
        (0..self.rows).map(|r| self.get(r, col).clone()).collect()
    }

    /// Gathers rows and columns through two indexers at once; `None` entries
    /// on either side produce the missing sentinel.
    pub fn take_2d(&self, row_indexer: &[Option<usize>], col_indexer: &[Option<usize>]) -> Self {
        let mut data = Vec::with_capacity(row_indexer.len() * col_indexer.len());
        for row in row_indexer {
            for col in col_indexer {
                match (row, col) {
                    (Some(r), Some(c)) => data.push(self.get(*r, *c).clone()),
                    _ => data.push(T::missing()),
                }
            }
        }
        Matrix {
            rows: row_indexer.len(),
            cols: col_indexer.len(),
            data,
        }
    }

    /// Contiguous block of rows and columns.
    pub fn slice(&self, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> Self {
        let row_indexer: Vec<Option<usize>> = rows.map(Some).collect();
        let col_indexer: Vec<Option<usize>> = cols.map(Some).collect();
        self.take_2d(&row_indexer, &col_indexer)
    }

    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for c in 0..self.cols {
            for r in 0..self.rows {
                data.push(self.get(r, c).clone());
            }
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    pub fn map<U: Element>(&self, f: impl Fn(&T) -> U) -> Matrix<U> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }

    pub fn cast<U: Element>(&self) -> Result<Matrix<U>, FrameError> {
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: cast_vec::<T, U>(&self.data)?,
        })
    }
}

// ============================================================================
// PLANE
// ============================================================================

/// A dense 2D buffer of one element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Plane {
    Float(Matrix<f64>),
    Text(Matrix<Option<String>>),
    Object(Matrix<Value>),
}

/// Applies a generic expression to the inner matrix, rewrapping in the same variant.
#[macro_export]
macro_rules! map_plane {
    ($plane:expr, $m:ident => $body:expr) => {
        match $plane {
            $crate::Plane::Float($m) => $crate::Plane::Float($body),
            $crate::Plane::Text($m) => $crate::Plane::Text($body),
            $crate::Plane::Object($m) => $crate::Plane::Object($body),
        }
    };
}

/// Applies a generic expression to the inner matrix, returning its result directly.
#[macro_export]
macro_rules! with_plane {
    ($plane:expr, $m:ident => $body:expr) => {
        match $plane {
            $crate::Plane::Float($m) => $body,
            $crate::Plane::Text($m) => $body,
            $crate::Plane::Object($m) => $body,
        }
    };
}

impl Plane {
    pub fn missing(dtype: DType, rows: usize, cols: usize) -> Plane {
        match dtype {
            DType::Float => Plane::Float(Matrix::missing(rows, cols)),
            DType::Text => Plane::Text(Matrix::missing(rows, cols)),
            DType::Object => Plane::Object(Matrix::missing(rows, cols)),
        }
    }

    /// Broadcasts a scalar over a (rows x cols) plane of the scalar's kind.
    pub fn filled(value: &Value, rows: usize, cols: usize) -> Result<Plane, FrameError> {
        Ok(match value.dtype() {
            DType::Float => Plane::Float(Matrix::filled(rows, cols, f64::from_value(value)?)),
            DType::Text => Plane::Text(Matrix::filled(rows, cols, Option::<String>::from_value(value)?)),
            DType::Object => Plane::Object(Matrix::filled(rows, cols, value.clone())),
        })
    }

    /// Builds a plane from equally long columns, widening to their common kind.
    pub fn from_columns(columns: &[Column], rows: usize) -> Result<Plane, FrameError> {
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(FrameError::LengthMismatch { expected: rows, got: bad.len() });
        }
        let dtype = DType::common_of(columns.iter().map(Column::dtype));
        let cols = columns.len();
        let mut values = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for column in columns {
                values.push(column.get(r).unwrap_or(Value::Missing));
            }
        }
        let object = Matrix::new(rows, cols, values)?;
        Plane::Object(object).cast(dtype)
    }

    pub fn shape(&self) -> (usize, usize) {
        with_plane!(self, m => m.shape())
    }

    pub fn dtype(&self) -> DType {
        match self {
            Plane::Float(_) => DType::Float,
            Plane::Text(_) => DType::Text,
            Plane::Object(_) => DType::Object,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Value {
        with_plane!(self, m => m.get(row, col).to_value())
    }

    pub fn is_missing(&self, row: usize, col: usize) -> bool {
        with_plane!(self, m => m.get(row, col).is_missing())
    }

    /// Sets one cell, widening the plane to `Object` when the value does not fit.
    pub fn set(&mut self, row: usize, col: usize, value: Value) -> Result<(), FrameError> {
        let fits = value.is_missing() || value.dtype() == self.dtype() || self.dtype() == DType::Object;
        if !fits {
            *self = self.cast(DType::Object)?;
        }
        match self {
            Plane::Float(m) => m.set(row, col, f64::from_value(&value)?),
            Plane::Text(m) => m.set(row, col, Option::<String>::from_value(&value)?),
            Plane::Object(m) => m.set(row, col, value),
        }
        Ok(())
    }

    pub fn cast(&self, dtype: DType) -> Result<Plane, FrameError> {
        if self.dtype() == dtype {
            return Ok(self.clone());
        }
        Ok(match dtype {
            DType::Float => Plane::Float(with_plane!(self, m => m.cast::<f64>()?)),
            DType::Text => Plane::Text(with_plane!(self, m => m.cast::<Option<String>>()?)),
            DType::Object => Plane::Object(with_plane!(self, m => m.cast::<Value>()?)),
        })
    }

    pub fn to_f64(&self) -> Result<Matrix<f64>, FrameError> {
        match self {
            Plane::Float(m) => Ok(m.clone()),
            Plane::Text(m) => m.cast::<f64>(),
            Plane::Object(m) => m.cast::<f64>(),
        }
    }

    pub fn take_2d(&self, row_indexer: &[Option<usize>], col_indexer: &[Option<usize>]) -> Plane {
        map_plane!(self, m => m.take_2d(row_indexer, col_indexer))
    }

    pub fn slice(&self, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> Plane {
        map_plane!(self, m => m.slice(rows.clone(), cols.clone()))
    }

    pub fn transpose(&self) -> Plane {
        map_plane!(self, m => m.transpose())
    }

    pub fn row(&self, row: usize) -> Column {
        match self {
            Plane::Float(m) => Column::Float(m.row(row).to_vec()),
            Plane::Text(m) => Column::Text(m.row(row).to_vec()),
            Plane::Object(m) => Column::Object(m.row(row).to_vec()),
        }
    }

    pub fn column(&self, col: usize) -> Column {
        match self {
            Plane::Float(m) => Column::Float(m.column(col)),
            Plane::Text(m) => Column::Text(m.column(col)),
            Plane::Object(m) => Column::Object(m.column(col)),
        }
    }

    pub fn to_columns(&self) -> Vec<Column> {
        let (_, cols) = self.shape();
        (0..cols).map(|c| self.column(c)).collect()
    }

    /// Row-major missing mask.
    pub fn missing_mask(&self) -> Vec<bool> {
        with_plane!(self, m => m.data().iter().map(Element::is_missing).collect())
    }

    /// Missing-aware equality.
    pub fn equals(&self, other: &Plane) -> bool {
        let (rows, cols) = self.shape();
        self.dtype() == other.dtype()
            && self.shape() == other.shape()
            && (0..rows).all(|r| (0..cols).all(|c| self.get(r, c).same_as(&other.get(r, c))))
    }
}

impl From<Matrix<f64>> for Plane {
    fn from(matrix: Matrix<f64>) -> Self {
        Plane::Float(matrix)
    }
}

impl From<Matrix<Option<String>>> for Plane {
    fn from(matrix: Matrix<Option<String>>) -> Self {
        Plane::Text(matrix)
    }
}

impl From<Matrix<Value>> for Plane {
    fn from(matrix: Matrix<Value>) -> Self {
        Plane::Object(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Matrix<f64> {
        Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_take_2d_gathers_and_fills() {
        let m = grid().take_2d(&[Some(1), None], &[Some(2), Some(0)]);
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(*m.get(0, 0), 6.0);
        assert_eq!(*m.get(0, 1), 4.0);
        assert!(m.get(1, 0).is_nan());
    }

    #[test]
    fn test_transpose() {
        let t = grid().transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.row(2), &[3.0, 6.0]);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        assert!(Matrix::from_rows(vec![vec![1.0], vec![1.0, 2.0]]).is_err());
        assert!(Matrix::new(2, 2, vec![1.0]).is_err());
    }

    #[test]
    fn test_plane_set_widens() {
        let mut plane = Plane::from(grid());
        plane.set(0, 0, Value::from("a")).unwrap();
        assert_eq!(plane.dtype(), DType::Object);
        assert_eq!(plane.get(0, 0), Value::from("a"));
        assert_eq!(plane.get(1, 2), Value::Number(6.0));
    }

    #[test]
    fn test_plane_from_columns_common_kind() {
        let columns = vec![Column::from(vec![1.0, 2.0]), Column::from(vec!["a", "b"])];
        let plane = Plane::from_columns(&columns, 2).unwrap();
        assert_eq!(plane.dtype(), DType::Object);
        assert_eq!(plane.get(1, 1), Value::from("b"));

        let numeric = Plane::from_columns(&[Column::from(vec![1.0])], 1).unwrap();
        assert_eq!(numeric.dtype(), DType::Float);
    }

    #[test]
    fn test_filled_plane() {
        let plane = Plane::filled(&Value::Number(7.0), 2, 3).unwrap();
        assert_eq!(plane.shape(), (2, 3));
        assert_eq!(plane.get(1, 2), Value::Number(7.0));
    }
}
