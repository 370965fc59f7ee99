//! FILENAME: panel/src/array3.rs
//! PURPOSE: Dense 3D buffers addressed `[item, major, minor]`.
//! CONTEXT: `Array3<T>` is the contiguous representation used by the fused
//! multi-axis gather, transposition and reduction. Data is stored with the
//! minor axis varying fastest, so item `i` occupies one contiguous
//! (major x minor) row-major run, the same layout as a `Matrix`.

use frame::column::cast_vec;
use frame::{DType, Element, Matrix, Plane, Value};

use crate::error::{PanelError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Array3<T> {
    shape: [usize; 3],
    data: Vec<T>,
}

impl<T: Clone> Array3<T> {
    /// Wraps a flat buffer. The shape must have exactly three extents whose
    /// product is the buffer length.
    pub fn from_shape_vec(shape: &[usize], data: Vec<T>) -> Result<Self> {
        let shape: [usize; 3] = match shape {
            [n0, n1, n2] => [*n0, *n1, *n2],
            other => return Err(PanelError::InvalidDimensions(other.len())),
        };
        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(PanelError::InvalidInput(format!(
                "{} values do not fill shape {:?}",
                data.len(),
                shape
            )));
        }
        Ok(Array3 { shape, data })
    }

    /// Builds from `[item][major][minor]` nesting, rejecting ragged input.
    pub fn from_nested(values: Vec<Vec<Vec<T>>>) -> Result<Self> {
        let n0 = values.len();
        let n1 = values.first().map_or(0, Vec::len);
        let n2 = values
            .first()
            .and_then(|plane| plane.first())
            .map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n0 * n1 * n2);
        for plane in values {
            if plane.len() != n1 {
                return Err(PanelError::InvalidInput(format!(
                    "ragged major extent: expected {}, got {}",
                    n1,
                    plane.len()
                )));
            }
            for row in plane {
                if row.len() != n2 {
                    return Err(PanelError::InvalidInput(format!(
                        "ragged minor extent: expected {}, got {}",
                        n2,
                        row.len()
                    )));
                }
                data.extend(row);
            }
        }
        Ok(Array3 { shape: [n0, n1, n2], data })
    }

    pub fn filled(shape: [usize; 3], value: T) -> Self {
        Array3 {
            shape,
            data: vec![value; shape.iter().product()],
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    fn offset(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.shape[1] + j) * self.shape[2] + k
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> &T {
        &self.data[self.offset(i, j, k)]
    }

    pub fn set(&mut self, i: usize, j: usize, k: usize, value: T) {
        let at = self.offset(i, j, k);
        self.data[at] = value;
    }

    /// The contiguous (major x minor) run of item `i`.
    pub fn item_run(&self, i: usize) -> &[T] {
        let len = self.shape[1] * self.shape[2];
        &self.data[i * len..(i + 1) * len]
    }

    /// Reorders the axes: output axis `d` is input axis `perm[d]`.
    pub fn permuted(&self, perm: [usize; 3]) -> Self {
        let shape = [self.shape[perm[0]], self.shape[perm[1]], self.shape[perm[2]]];
        let mut data = Vec::with_capacity(self.data.len());
        let mut src = [0usize; 3];
        for a0 in 0..shape[0] {
            src[perm[0]] = a0;
            for a1 in 0..shape[1] {
                src[perm[1]] = a1;
                for a2 in 0..shape[2] {
                    src[perm[2]] = a2;
                    data.push(self.get(src[0], src[1], src[2]).clone());
                }
            }
        }
        Array3 { shape, data }
    }

    /// Values along `axis` with the other two axes fixed at `fixed`
    /// (given in storage order).
    pub fn lane(&self, axis: usize, fixed: [usize; 2]) -> Vec<T> {
        (0..self.shape[axis])
            .map(|t| {
                let [i, j, k] = match axis {
                    0 => [t, fixed[0], fixed[1]],
                    1 => [fixed[0], t, fixed[1]],
                    _ => [fixed[0], fixed[1], t],
                };
                self.get(i, j, k).clone()
            })
            .collect()
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Array3<U> {
        Array3 {
            shape: self.shape,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Elementwise combination of two arrays of the same shape.
    pub fn zip_map<U, V>(&self, other: &Array3<U>, f: impl Fn(&T, &U) -> V) -> Result<Array3<V>> {
        if self.shape != other.shape {
            return Err(PanelError::InvalidInput(format!(
                "shape {:?} does not match {:?}",
                other.shape, self.shape
            )));
        }
        Ok(Array3 {
            shape: self.shape,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        })
    }
}

impl<T: Element> Array3<T> {
    pub fn missing(shape: [usize; 3]) -> Self {
        Self::filled(shape, T::missing())
    }

    /// Stacks per-item planes, each of shape (rows x cols).
    pub fn from_planes(planes: &[Matrix<T>], rows: usize, cols: usize) -> Result<Self> {
        let mut data = Vec::with_capacity(planes.len() * rows * cols);
        for plane in planes {
            if plane.shape() != (rows, cols) {
                return Err(PanelError::ShapeMismatch {
                    expected: (rows, cols),
                    got: plane.shape(),
                });
            }
            data.extend_from_slice(plane.data());
        }
        Ok(Array3 {
            shape: [planes.len(), rows, cols],
            data,
        })
    }

    /// The (major x minor) plane of item `i`.
    pub fn plane(&self, i: usize) -> Result<Matrix<T>> {
        Ok(Matrix::new(self.shape[1], self.shape[2], self.item_run(i).to_vec())?)
    }

    /// Fused gather through one indexer per axis. `None` entries on any axis
    /// produce the missing sentinel. Loops item by item, gathering each
    /// (major, minor) submatrix straight into the output.
    pub fn take(
        &self,
        items: &[Option<usize>],
        major: &[Option<usize>],
        minor: &[Option<usize>],
    ) -> Self {
        let mut data = Vec::with_capacity(items.len() * major.len() * minor.len());
        for item in items {
            for row in major {
                for col in minor {
                    match (item, row, col) {
                        (Some(i), Some(j), Some(k)) => data.push(self.get(*i, *j, *k).clone()),
                        _ => data.push(T::missing()),
                    }
                }
            }
        }
        Array3 {
            shape: [items.len(), major.len(), minor.len()],
            data,
        }
    }

    pub fn cast<U: Element>(&self) -> Result<Array3<U>> {
        Ok(Array3 {
            shape: self.shape,
            data: cast_vec::<T, U>(&self.data)?,
        })
    }

    pub fn missing_mask(&self) -> Array3<bool> {
        self.map(T::is_missing)
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// A dense 3D buffer of one element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Float(Array3<f64>),
    Text(Array3<Option<String>>),
    Object(Array3<Value>),
}

macro_rules! map_values {
    ($values:expr, $a:ident => $body:expr) => {
        match $values {
            Values::Float($a) => Values::Float($body),
            Values::Text($a) => Values::Text($body),
            Values::Object($a) => Values::Object($body),
        }
    };
}

macro_rules! with_values {
    ($values:expr, $a:ident => $body:expr) => {
        match $values {
            Values::Float($a) => $body,
            Values::Text($a) => $body,
            Values::Object($a) => $body,
        }
    };
}

impl Values {
    pub fn missing(dtype: DType, shape: [usize; 3]) -> Values {
        match dtype {
            DType::Float => Values::Float(Array3::missing(shape)),
            DType::Text => Values::Text(Array3::missing(shape)),
            DType::Object => Values::Object(Array3::missing(shape)),
        }
    }

    /// Stacks item planes, widening them to their common kind first.
    pub fn from_planes(planes: &[Plane], rows: usize, cols: usize) -> Result<Values> {
        let dtype = DType::common_of(planes.iter().map(Plane::dtype));
        let widened = planes
            .iter()
            .map(|p| p.cast(dtype))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(match dtype {
            DType::Float => {
                let inner: Vec<Matrix<f64>> = widened
                    .into_iter()
                    .filter_map(|p| match p {
                        Plane::Float(m) => Some(m),
                        _ => None,
                    })
                    .collect();
                Values::Float(Array3::from_planes(&inner, rows, cols)?)
            }
            DType::Text => {
                let inner: Vec<Matrix<Option<String>>> = widened
                    .into_iter()
                    .filter_map(|p| match p {
                        Plane::Text(m) => Some(m),
                        _ => None,
                    })
                    .collect();
                Values::Text(Array3::from_planes(&inner, rows, cols)?)
            }
            DType::Object => {
                let inner: Vec<Matrix<Value>> = widened
                    .into_iter()
                    .filter_map(|p| match p {
                        Plane::Object(m) => Some(m),
                        _ => None,
                    })
                    .collect();
                Values::Object(Array3::from_planes(&inner, rows, cols)?)
            }
        })
    }

    /// Splits into one plane per item.
    pub fn to_planes(&self) -> Result<Vec<Plane>> {
        let n = self.shape()[0];
        (0..n).map(|i| self.plane(i)).collect()
    }

    pub fn plane(&self, i: usize) -> Result<Plane> {
        Ok(match self {
            Values::Float(a) => Plane::Float(a.plane(i)?),
            Values::Text(a) => Plane::Text(a.plane(i)?),
            Values::Object(a) => Plane::Object(a.plane(i)?),
        })
    }

    pub fn shape(&self) -> [usize; 3] {
        with_values!(self, a => a.shape())
    }

    pub fn dtype(&self) -> DType {
        match self {
            Values::Float(_) => DType::Float,
            Values::Text(_) => DType::Text,
            Values::Object(_) => DType::Object,
        }
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> Value {
        with_values!(self, a => a.get(i, j, k).to_value())
    }

    pub fn cast(&self, dtype: DType) -> Result<Values> {
        if self.dtype() == dtype {
            return Ok(self.clone());
        }
        Ok(match dtype {
            DType::Float => Values::Float(with_values!(self, a => a.cast::<f64>()?)),
            DType::Text => Values::Text(with_values!(self, a => a.cast::<Option<String>>()?)),
            DType::Object => Values::Object(with_values!(self, a => a.cast::<Value>()?)),
        })
    }

    /// Numeric view; text content fails with `NonNumeric`.
    pub fn to_f64(&self) -> Result<Array3<f64>> {
        match self {
            Values::Float(a) => Ok(a.clone()),
            other => with_values!(other, a => a.cast::<f64>())
                .map_err(|e| PanelError::NonNumeric(e.to_string())),
        }
    }

    pub fn permuted(&self, perm: [usize; 3]) -> Values {
        map_values!(self, a => a.permuted(perm))
    }

    pub fn take(
        &self,
        items: &[Option<usize>],
        major: &[Option<usize>],
        minor: &[Option<usize>],
    ) -> Values {
        map_values!(self, a => a.take(items, major, minor))
    }

    pub fn missing_mask(&self) -> Array3<bool> {
        with_values!(self, a => a.missing_mask())
    }
}

impl From<Array3<f64>> for Values {
    fn from(array: Array3<f64>) -> Self {
        Values::Float(array)
    }
}

impl From<Array3<Option<String>>> for Values {
    fn from(array: Array3<Option<String>>) -> Self {
        Values::Text(array)
    }
}

impl From<Array3<Value>> for Values {
    fn from(array: Array3<Value>) -> Self {
        Values::Object(array)
    }
}
