//! FILENAME: panel/src/snapshot.rs
//! PURPOSE: JSON snapshots of a panel: its three axes plus one typed plane
//! per item.
//! CONTEXT: Missing cells are stored as `Missing` rather than NaN so the
//! document stays valid JSON. Loading also accepts the legacy four-part
//! layout `{values, items, major, minor}` on a best-effort basis.

use frame::{DType, Matrix, Plane, Value};
use labels::{Index, Label};
use serde::{Deserialize, Serialize};

use crate::array3::{Array3, Values};
use crate::construct::PanelAxes;
use crate::error::{PanelError, Result};
use crate::panel::Panel;
use crate::store::ItemStore;

pub const SNAPSHOT_VERSION: u32 = 1;

/// One item's plane in a snapshot, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPlane {
    pub dtype: DType,
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelSnapshot {
    pub version: u32,
    pub items: Index,
    pub major_axis: Index,
    pub minor_axis: Index,
    pub planes: Vec<SnapshotPlane>,
}

/// Dense nested values with bare label lists.
#[derive(Debug, Clone, Deserialize)]
struct LegacySnapshot {
    values: Vec<Vec<Vec<Value>>>,
    items: Vec<Label>,
    major: Vec<Label>,
    minor: Vec<Label>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SnapshotRepr {
    Current(PanelSnapshot),
    Legacy(LegacySnapshot),
}

impl SnapshotPlane {
    fn from_plane(plane: &Plane) -> Self {
        let (rows, cols) = plane.shape();
        let mut values = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                values.push(plane.get(r, c));
            }
        }
        SnapshotPlane {
            dtype: plane.dtype(),
            rows,
            cols,
            values,
        }
    }

    fn to_plane(&self) -> Result<Plane> {
        let boxed = Plane::Object(Matrix::new(self.rows, self.cols, self.values.clone())?);
        boxed
            .cast(self.dtype)
            .map_err(|e| PanelError::CastFailed(format!("{}: {}", self.dtype, e)))
    }
}

impl Panel {
    pub fn to_snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            version: SNAPSHOT_VERSION,
            items: self.items().clone(),
            major_axis: self.major_axis().clone(),
            minor_axis: self.minor_axis().clone(),
            planes: self.store.planes().iter().map(SnapshotPlane::from_plane).collect(),
        }
    }

    /// Rebuilds a panel, checking every plane against the axis extents.
    pub fn from_snapshot(snapshot: PanelSnapshot) -> Result<Panel> {
        let PanelSnapshot {
            items,
            major_axis,
            minor_axis,
            planes,
            ..
        } = snapshot;
        if planes.len() != items.len() {
            return Err(PanelError::AxisLengthMismatch {
                axis: "items".to_string(),
                expected: planes.len(),
                got: items.len(),
            });
        }
        let planes = planes
            .iter()
            .map(SnapshotPlane::to_plane)
            .collect::<Result<Vec<_>>>()?;
        let store = ItemStore::new([items, major_axis, minor_axis], planes)?;
        store.consolidate()?;
        Ok(Panel::from_parts(store))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Panel> {
        match serde_json::from_str::<SnapshotRepr>(json)? {
            SnapshotRepr::Current(snapshot) => Panel::from_snapshot(snapshot),
            SnapshotRepr::Legacy(legacy) => {
                log::warn!(
                    "[STORE] loading legacy snapshot with {} items",
                    legacy.items.len()
                );
                from_legacy(legacy)
            }
        }
    }
}

fn from_legacy(legacy: LegacySnapshot) -> Result<Panel> {
    let values = Array3::from_nested(legacy.values)?;
    let dtype = DType::common_of(values.data().iter().filter(|v| !v.is_missing()).map(Value::dtype));
    let axes = PanelAxes::new()
        .items(Index::new(legacy.items)?)
        .major(Index::new(legacy.major)?)
        .minor(Index::new(legacy.minor)?);
    Panel::from_array(Values::Object(values), axes, Some(dtype))
}
