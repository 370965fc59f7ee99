//! FILENAME: panel/src/ops.rs
//! PURPOSE: Elementwise arithmetic between a panel and a scalar, a 2D table
//! broadcast along one axis, or another panel.
//! CONTEXT: Every operation routes through one `combine` entry point tagged
//! with a `BinaryOp`. Panel-panel combination unions all three axes first, so
//! labels present on only one side produce missing cells.

use frame::{Frame, Value};
use labels::Index;
use serde::{Deserialize, Serialize};

use crate::array3::{Array3, Values};
use crate::axis::{AxisName, AxisRef};
use crate::error::{PanelError, Result};
use crate::panel::Panel;
use crate::reindex::ReindexArgs;
use crate::store::ItemStore;

// ============================================================================
// OPERATIONS
// ============================================================================

/// The closed set of elementwise binary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    FloorDivide,
}

impl BinaryOp {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => a / b,
            BinaryOp::Power => a.powf(b),
            BinaryOp::FloorDivide => (a / b).floor(),
        }
    }
}

/// Right-hand side of a combination.
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    Scalar(Value),
    Frame(&'a Frame),
    Panel(&'a Panel),
}

impl From<Value> for Operand<'_> {
    fn from(value: Value) -> Self {
        Operand::Scalar(value)
    }
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Scalar(Value::Number(value))
    }
}

impl<'a> From<&'a Frame> for Operand<'a> {
    fn from(frame: &'a Frame) -> Self {
        Operand::Frame(frame)
    }
}

impl<'a> From<&'a Panel> for Operand<'a> {
    fn from(panel: &'a Panel) -> Self {
        Operand::Panel(panel)
    }
}

fn scalar_f64(value: &Value) -> Result<f64> {
    if value.is_missing() {
        return Ok(f64::NAN);
    }
    value
        .as_f64()
        .ok_or_else(|| PanelError::NonNumeric(format!("scalar operand {}", value)))
}

// ============================================================================
// COMBINATION
// ============================================================================

impl Panel {
    /// Builds a float panel over `axes` from a dense numeric buffer.
    pub(crate) fn from_f64(axes: [Index; 3], values: Array3<f64>) -> Result<Panel> {
        let store = ItemStore::from_values(axes, &Values::Float(values))?;
        Ok(Panel::from_parts(store))
    }

    /// Applies `op` between this panel and `other`. A table operand is
    /// conformed to the plane orthogonal to `axis` and broadcast along it;
    /// `axis` is ignored for scalar and panel operands.
    pub fn combine<'a>(
        &self,
        other: impl Into<Operand<'a>>,
        op: BinaryOp,
        axis: impl Into<AxisRef>,
    ) -> Result<Panel> {
        match other.into() {
            Operand::Scalar(value) => self.arith(op, value),
            Operand::Frame(frame) => self.combine_frame(frame, op, AxisName::resolve(axis)?),
            Operand::Panel(panel) => self.combine_panel(panel, op),
        }
    }

    /// Scalar-only arithmetic: `self op scalar`.
    pub fn arith<'a>(&self, op: BinaryOp, other: impl Into<Operand<'a>>) -> Result<Panel> {
        let b = match other.into() {
            Operand::Scalar(value) => scalar_f64(&value)?,
            _ => return Err(PanelError::NonScalarOperand),
        };
        let values = self.store.to_f64()?.map(|&a| op.apply(a, b));
        Panel::from_f64(self.store.axes().clone(), values)
    }

    /// Reversed scalar-only arithmetic: `scalar op self`.
    pub fn rarith<'a>(&self, op: BinaryOp, other: impl Into<Operand<'a>>) -> Result<Panel> {
        let a = match other.into() {
            Operand::Scalar(value) => scalar_f64(&value)?,
            _ => return Err(PanelError::NonScalarOperand),
        };
        let values = self.store.to_f64()?.map(|&b| op.apply(a, b));
        Panel::from_f64(self.store.axes().clone(), values)
    }

    fn combine_frame(&self, frame: &Frame, op: BinaryOp, axis: AxisName) -> Result<Panel> {
        let (index_axis, columns_axis) = axis.plane_axes();
        let conformed = frame.reindex(Some(self.axis(index_axis)), Some(self.axis(columns_axis)), None)?;
        let other = conformed
            .to_f64()
            .map_err(|e| PanelError::NonNumeric(e.to_string()))?;
        let mine = self.store.to_f64()?;
        let [n0, n1, n2] = mine.shape();

        let mut out = Array3::filled([n0, n1, n2], f64::NAN);
        for i in 0..n0 {
            for j in 0..n1 {
                for k in 0..n2 {
                    let (r, c) = axis.plane_coords([i, j, k]);
                    out.set(i, j, k, op.apply(*mine.get(i, j, k), *other.get(r, c)));
                }
            }
        }
        Panel::from_f64(self.store.axes().clone(), out)
    }

    fn combine_panel(&self, other: &Panel, op: BinaryOp) -> Result<Panel> {
        let axes = [
            self.items().append_unique(other.items()),
            self.major_axis().union(other.major_axis()),
            self.minor_axis().union(other.minor_axis()),
        ];
        let args = || {
            ReindexArgs::new()
                .items(axes[0].clone())
                .major(axes[1].clone())
                .minor(axes[2].clone())
        };
        let this = self.reindex(args())?;
        let that = other.reindex(args())?;
        let values = this
            .store
            .to_f64()?
            .zip_map(&that.store.to_f64()?, |&a, &b| op.apply(a, b))?;
        Panel::from_f64(axes, values)
    }

    pub fn add<'a>(&self, other: impl Into<Operand<'a>>, axis: impl Into<AxisRef>) -> Result<Panel> {
        self.combine(other, BinaryOp::Add, axis)
    }

    pub fn subtract<'a>(&self, other: impl Into<Operand<'a>>, axis: impl Into<AxisRef>) -> Result<Panel> {
        self.combine(other, BinaryOp::Subtract, axis)
    }

    pub fn multiply<'a>(&self, other: impl Into<Operand<'a>>, axis: impl Into<AxisRef>) -> Result<Panel> {
        self.combine(other, BinaryOp::Multiply, axis)
    }

    pub fn divide<'a>(&self, other: impl Into<Operand<'a>>, axis: impl Into<AxisRef>) -> Result<Panel> {
        self.combine(other, BinaryOp::Divide, axis)
    }

    pub fn neg(&self) -> Result<Panel> {
        self.rarith(BinaryOp::Multiply, -1.0)
    }
}
