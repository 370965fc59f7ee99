//! FILENAME: panel/src/reduce.rs
//! PURPOSE: Reductions along one axis, collapsing the panel to a 2D table.
//! CONTEXT: The result is indexed by the two axes orthogonal to the reduced
//! one, oriented by `AxisName::plane_axes`: reducing items yields
//! (major x minor), reducing major yields (minor x items), reducing minor
//! yields (major x items).

use frame::nanops;
use frame::{Frame, Matrix, Plane, ReduceOp};

use crate::array3::Array3;
use crate::axis::{AxisName, AxisRef};
use crate::error::Result;
use crate::panel::Panel;

impl Panel {
    /// Reduces every lane along `axis` with `op`.
    pub fn reduce(&self, op: ReduceOp, axis: impl Into<AxisRef>, skipna: bool) -> Result<Frame> {
        let axis = AxisName::resolve(axis)?;
        if op == ReduceOp::Count {
            return self.count(axis);
        }
        let values = self.store.to_f64()?;
        self.wrap_lanes(&values, axis, |lane| op.apply(lane, skipna))
    }

    /// Non-missing observations per lane along `axis`.
    pub fn count(&self, axis: impl Into<AxisRef>) -> Result<Frame> {
        let axis = AxisName::resolve(axis)?;
        let mask = self.store.missing_mask()?;
        self.wrap_lanes(&mask, axis, |lane| lane.iter().filter(|missing| !**missing).count() as f64)
    }

    /// Applies an arbitrary lane reducer along `axis`.
    pub fn apply(&self, func: impl Fn(&[f64]) -> f64, axis: impl Into<AxisRef>) -> Result<Frame> {
        let axis = AxisName::resolve(axis)?;
        let values = self.store.to_f64()?;
        self.wrap_lanes(&values, axis, func)
    }

    fn wrap_lanes<T: Clone>(
        &self,
        values: &Array3<T>,
        axis: AxisName,
        reducer: impl Fn(&[T]) -> f64,
    ) -> Result<Frame> {
        let (index_axis, columns_axis) = axis.plane_axes();
        let rows = self.axis(index_axis).len();
        let cols = self.axis(columns_axis).len();
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                // lane() wants the fixed positions in storage order
                let fixed = match axis {
                    AxisName::Items => [r, c],
                    AxisName::Major | AxisName::Minor => [c, r],
                };
                data.push(reducer(&values.lane(axis.position(), fixed)[..]));
            }
        }
        let plane = Plane::Float(Matrix::new(rows, cols, data)?);
        Ok(Frame::from_plane(
            self.axis(index_axis).clone(),
            self.axis(columns_axis).clone(),
            &plane,
        )?)
    }

    pub fn sum(&self, axis: impl Into<AxisRef>, skipna: bool) -> Result<Frame> {
        self.reduce(ReduceOp::Sum, axis, skipna)
    }

    pub fn mean(&self, axis: impl Into<AxisRef>, skipna: bool) -> Result<Frame> {
        self.reduce(ReduceOp::Mean, axis, skipna)
    }

    /// Unbiased variance.
    pub fn var(&self, axis: impl Into<AxisRef>, skipna: bool) -> Result<Frame> {
        self.reduce(ReduceOp::Var, axis, skipna)
    }

    pub fn std(&self, axis: impl Into<AxisRef>, skipna: bool) -> Result<Frame> {
        self.reduce(ReduceOp::Std, axis, skipna)
    }

    pub fn skew(&self, axis: impl Into<AxisRef>, skipna: bool) -> Result<Frame> {
        self.reduce(ReduceOp::Skew, axis, skipna)
    }

    pub fn prod(&self, axis: impl Into<AxisRef>, skipna: bool) -> Result<Frame> {
        self.reduce(ReduceOp::Prod, axis, skipna)
    }

    pub fn median(&self, axis: impl Into<AxisRef>, skipna: bool) -> Result<Frame> {
        self.reduce(ReduceOp::Median, axis, skipna)
    }

    pub fn min(&self, axis: impl Into<AxisRef>, skipna: bool) -> Result<Frame> {
        self.reduce(ReduceOp::Min, axis, skipna)
    }

    pub fn max(&self, axis: impl Into<AxisRef>, skipna: bool) -> Result<Frame> {
        self.reduce(ReduceOp::Max, axis, skipna)
    }

    /// Compounded return: the product of `1 + x` minus one.
    pub fn compound(&self, axis: impl Into<AxisRef>, skipna: bool) -> Result<Frame> {
        self.apply(
            |lane| {
                let growth: Vec<f64> = lane.iter().map(|x| 1.0 + x).collect();
                nanops::nanprod(&growth, skipna) - 1.0
            },
            axis,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::PanelAxes;
    use frame::Value;
    use labels::{Index, Label};

    fn cube() -> Panel {
        Panel::from_shape_vec(
            &[2, 3, 2],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 10.0, 20.0, 30.0, 40.0, 50.0, f64::NAN],
            PanelAxes::new()
                .items(Index::from_labels(["x", "y"]).unwrap())
                .minor(Index::from_labels(["a", "b"]).unwrap()),
        )
        .unwrap()
    }

    fn cell(frame: &Frame, row: impl Into<Label>, col: impl Into<Label>) -> Value {
        frame.get_value(&row.into(), &col.into()).unwrap()
    }

    #[test]
    fn test_sum_over_items() {
        let sum = cube().sum("items", true).unwrap();
        assert_eq!(sum.shape(), (3, 2));
        assert_eq!(cell(&sum, 0, "a"), Value::Number(11.0));
        assert_eq!(cell(&sum, 2, "b"), Value::Number(6.0));

        let strict = cube().sum("items", false).unwrap();
        assert!(cell(&strict, 2, "b").is_missing());
    }

    #[test]
    fn test_orientation_after_reducing_major() {
        let mean = cube().mean("major", true).unwrap();
        assert_eq!(mean.shape(), (2, 2));
        assert_eq!(mean.index().labels(), &[Label::from("a"), Label::from("b")]);
        assert_eq!(mean.columns().labels(), &[Label::from("x"), Label::from("y")]);
        assert_eq!(cell(&mean, "a", "x"), Value::Number(3.0));
        assert_eq!(cell(&mean, "b", "y"), Value::Number(30.0));
    }

    #[test]
    fn test_reduce_minor_matches_direct_pass() {
        let panel = cube();
        let max = panel.max(2usize, true).unwrap();
        assert_eq!(max.shape(), (3, 2));
        for item in ["x", "y"] {
            for major in 0..3 {
                let direct = ["a", "b"]
                    .iter()
                    .filter_map(|m| {
                        panel
                            .get_value(&Label::from(item), &Label::from(major), &Label::from(*m))
                            .unwrap()
                            .as_f64()
                    })
                    .filter(|v| !v.is_nan())
                    .fold(f64::NEG_INFINITY, f64::max);
                assert_eq!(cell(&max, major, item), Value::Number(direct));
            }
        }
    }

    #[test]
    fn test_count_and_std() {
        let panel = cube();
        let count = panel.count("minor").unwrap();
        assert_eq!(cell(&count, 2, "y"), Value::Number(1.0));
        assert_eq!(cell(&count, 0, "x"), Value::Number(2.0));
        let via_reduce = panel.reduce(ReduceOp::Count, "minor", true).unwrap();
        assert!(via_reduce.equals(&count));

        let std = panel.std("items", true).unwrap();
        let expected = (2.0f64 * 4.5f64.powi(2)).sqrt();
        match cell(&std, 0, "a") {
            Value::Number(v) => assert!((v - expected).abs() < 1e-12),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_compound_and_apply() {
        let panel = Panel::from_shape_vec(&[2, 1, 1], vec![0.1, 0.2], PanelAxes::new()).unwrap();
        let compound = panel.compound("items", true).unwrap();
        match cell(&compound, 0, 0) {
            Value::Number(v) => assert!((v - 0.32).abs() < 1e-12),
            other => panic!("unexpected {:?}", other),
        }
        let spread = panel
            .apply(|lane| lane.iter().cloned().fold(f64::NAN, f64::max) - lane[0], "items")
            .unwrap();
        match cell(&spread, 0, 0) {
            Value::Number(v) => assert!((v - 0.1).abs() < 1e-12),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_text_storage_is_rejected() {
        let mut panel = cube();
        panel.set_item("t", Value::from("word")).unwrap();
        assert!(panel.sum("items", true).is_err());
        assert!(panel.count("items").is_ok());
    }
}
