//! FILENAME: frame/src/frame.rs
//! PURPOSE: The 2D labeled table.
//! CONTEXT: A `Frame` pairs a row `Index` and a column `Index` with one typed
//! `Column` per column label. Columns may differ in kind; `values()` widens them
//! to a single `Plane` when a dense buffer is needed.

use labels::{FillMethod, Index, JoinHow, Label};

use crate::column::Column;
use crate::error::FrameError;
use crate::matrix::{Matrix, Plane};
use crate::value::{DType, Value};

#[derive(Debug, Clone)]
pub struct Frame {
    index: Index,
    columns: Index,
    data: Vec<Column>,
}

impl Frame {
    /// Builds a table, checking one column per column label and one entry per row label.
    pub fn new(index: Index, columns: Index, data: Vec<Column>) -> Result<Self, FrameError> {
        if data.len() != columns.len() {
            return Err(FrameError::LengthMismatch {
                expected: columns.len(),
                got: data.len(),
            });
        }
        if let Some(bad) = data.iter().find(|c| c.len() != index.len()) {
            return Err(FrameError::LengthMismatch {
                expected: index.len(),
                got: bad.len(),
            });
        }
        Ok(Frame { index, columns, data })
    }

    /// Builds a table over a dense plane whose shape must match the axes.
    pub fn from_plane(index: Index, columns: Index, plane: &Plane) -> Result<Self, FrameError> {
        let (rows, cols) = plane.shape();
        if rows != index.len() {
            return Err(FrameError::LengthMismatch { expected: index.len(), got: rows });
        }
        if cols != columns.len() {
            return Err(FrameError::LengthMismatch { expected: columns.len(), got: cols });
        }
        Ok(Frame {
            index,
            columns,
            data: plane.to_columns(),
        })
    }

    /// Builds a table from (label, column) pairs over a shared row index.
    pub fn from_columns<L: Into<Label>>(
        index: Index,
        columns: Vec<(L, Column)>,
    ) -> Result<Self, FrameError> {
        let (labels, data): (Vec<Label>, Vec<Column>) =
            columns.into_iter().map(|(l, c)| (l.into(), c)).unzip();
        Frame::new(index, Index::new(labels)?, data)
    }

    /// A table of the given axes holding only missing values.
    pub fn missing(index: Index, columns: Index, dtype: DType) -> Self {
        let data = (0..columns.len())
            .map(|_| Column::missing(dtype, index.len()))
            .collect();
        Frame { index, columns, data }
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn columns(&self) -> &Index {
        &self.columns
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.index.len(), self.columns.len())
    }

    pub fn column(&self, label: &Label) -> Option<&Column> {
        self.columns.get_loc(label).map(|pos| &self.data[pos])
    }

    pub fn column_at(&self, position: usize) -> Option<&Column> {
        self.data.get(position)
    }

    pub fn iter_columns(&self) -> impl Iterator<Item = (&Label, &Column)> {
        self.columns.iter().zip(self.data.iter())
    }

    pub fn dtypes(&self) -> Vec<DType> {
        self.data.iter().map(Column::dtype).collect()
    }

    /// The common element kind of all columns.
    pub fn dtype(&self) -> DType {
        DType::common_of(self.dtypes())
    }

    /// Dense (rows x cols) buffer of the table, widened to the common kind.
    pub fn values(&self) -> Result<Plane, FrameError> {
        Plane::from_columns(&self.data, self.index.len())
    }

    /// Dense numeric buffer. Fails on text content.
    pub fn to_f64(&self) -> Result<Matrix<f64>, FrameError> {
        let rows = self.index.len();
        let cols = self.columns.len();
        let numeric = self
            .data
            .iter()
            .map(Column::to_f64)
            .collect::<Result<Vec<_>, _>>()?;
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for column in &numeric {
                data.push(column[r]);
            }
        }
        Matrix::new(rows, cols, data)
    }

    pub fn get_value(&self, row: &Label, column: &Label) -> Result<Value, FrameError> {
        let r = self
            .index
            .get_loc(row)
            .ok_or_else(|| FrameError::KeyNotFound(row.to_string()))?;
        let c = self
            .columns
            .get_loc(column)
            .ok_or_else(|| FrameError::KeyNotFound(column.to_string()))?;
        Ok(self.data[c].get(r).unwrap_or(Value::Missing))
    }

    /// Sets one cell in place. Both labels must already exist.
    pub fn set_value(&mut self, row: &Label, column: &Label, value: Value) -> Result<(), FrameError> {
        let r = self
            .index
            .get_loc(row)
            .ok_or_else(|| FrameError::KeyNotFound(row.to_string()))?;
        let c = self
            .columns
            .get_loc(column)
            .ok_or_else(|| FrameError::KeyNotFound(column.to_string()))?;
        self.data[c].set(r, value)
    }

    /// Conforms the table to new row and/or column labels. The fill method
    /// applies along rows; new columns are all-missing float columns.
    pub fn reindex(
        &self,
        index: Option<&Index>,
        columns: Option<&Index>,
        method: Option<FillMethod>,
    ) -> Result<Frame, FrameError> {
        let mut data = self.data.clone();
        let mut new_index = self.index.clone();
        let mut new_columns = self.columns.clone();

        if let Some(target) = index {
            if !target.equals(&self.index) || method.is_some() {
                let indexer = self.index.get_indexer(target, method)?;
                data = data.iter().map(|c| c.take(&indexer)).collect();
            }
            new_index = target.clone();
        }

        if let Some(target) = columns {
            if !target.equals(&self.columns) {
                let indexer = self.columns.get_indexer(target, None)?;
                let rows = new_index.len();
                data = indexer
                    .iter()
                    .map(|entry| match entry {
                        Some(pos) => data[*pos].clone(),
                        None => Column::missing(DType::Float, rows),
                    })
                    .collect();
            }
            new_columns = target.clone();
        }

        Ok(Frame {
            index: new_index,
            columns: new_columns,
            data,
        })
    }

    /// Swaps rows and columns.
    pub fn transpose(&self) -> Result<Frame, FrameError> {
        let plane = self.values()?.transpose();
        Frame::from_plane(self.columns.clone(), self.index.clone(), &plane)
    }

    /// Applies a numeric function to every cell. Fails on text content.
    pub fn map_f64(&self, f: impl Fn(f64) -> f64) -> Result<Frame, FrameError> {
        let data = self
            .data
            .iter()
            .map(|c| c.to_f64().map(|v| Column::Float(v.into_iter().map(&f).collect())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Frame {
            index: self.index.clone(),
            columns: self.columns.clone(),
            data,
        })
    }

    pub fn fillna(&self, value: &Value) -> Result<Frame, FrameError> {
        let data = self
            .data
            .iter()
            .map(|c| c.fill_value(value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Frame {
            index: self.index.clone(),
            columns: self.columns.clone(),
            data,
        })
    }

    /// Fills missing values down each column.
    pub fn fillna_method(&self, method: FillMethod) -> Frame {
        Frame {
            index: self.index.clone(),
            columns: self.columns.clone(),
            data: self.data.iter().map(|c| c.fill_method(method)).collect(),
        }
    }

    /// Keeps the rows whose mask value is true.
    pub fn filter_rows(&self, mask: &[bool]) -> Frame {
        Frame {
            index: self.index.filter_mask(mask),
            columns: self.columns.clone(),
            data: self.data.iter().map(|c| c.filter(mask)).collect(),
        }
    }

    /// Modifies the table in place using non-missing values from `other`,
    /// aligned on this table's rows and columns.
    ///
    /// - `overwrite`: when false, only cells missing here are replaced
    /// - `filter_fn`: when given, only cells for which it returns true are replaced
    /// - `raise_conflict`: fail if both tables hold data in the same cell
    pub fn update(
        &mut self,
        other: &Frame,
        join: JoinHow,
        overwrite: bool,
        filter_fn: Option<&dyn Fn(&Value) -> bool>,
        raise_conflict: bool,
    ) -> Result<(), FrameError> {
        if join != JoinHow::Left {
            return Err(FrameError::UnsupportedJoin(format!("{:?}", join)));
        }
        let other = other.reindex(Some(&self.index), Some(&self.columns), None)?;

        for (c, column) in self.data.iter_mut().enumerate() {
            let that = &other.data[c];
            for r in 0..self.index.len() {
                let this_missing = column.is_missing(r);
                let that_missing = that.is_missing(r);

                if raise_conflict && !this_missing && !that_missing {
                    return Err(FrameError::DataConflict {
                        row: self.index.get(r).map(Label::to_string).unwrap_or_default(),
                        column: self.columns.get(c).map(Label::to_string).unwrap_or_default(),
                    });
                }

                let keep_this = match filter_fn {
                    Some(f) => {
                        let current = column.get(r).unwrap_or(Value::Missing);
                        !f(&current) || that_missing
                    }
                    None if overwrite => that_missing,
                    None => !this_missing,
                };
                if !keep_this {
                    let replacement = that.get(r).unwrap_or(Value::Missing);
                    column.set(r, replacement)?;
                }
            }
        }
        log::trace!("[UPDATE] frame updated shape={:?}", self.shape());
        Ok(())
    }

    /// Missing-aware equality of labels, kinds and values.
    pub fn equals(&self, other: &Frame) -> bool {
        self.index.equals(&other.index)
            && self.columns.equals(&other.columns)
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.equals(b))
    }
}
