//! FILENAME: panel/src/axis.rs
//! PURPOSE: Axis registry: canonical axis names, aliases, positions and slice roles.
//! CONTEXT: Every operation that takes an axis argument resolves it here. Callers
//! may pass a canonical name ("items", "major_axis", "minor_axis"), an alias
//! ("major", "minor"), a position (0, 1, 2) or an `AxisName` directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PanelError, Result};

/// The three panel axes, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AxisName {
    Items,
    Major,
    Minor,
}

/// Axes in storage order.
pub const AXIS_ORDER: [AxisName; 3] = [AxisName::Items, AxisName::Major, AxisName::Minor];

/// The role an axis plays in a 2D slice taken orthogonal to another axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceRole {
    Index,
    Columns,
}

impl AxisName {
    /// Resolves any accepted axis spelling to its canonical axis.
    pub fn resolve(axis: impl Into<AxisRef>) -> Result<AxisName> {
        match axis.into() {
            AxisRef::Axis(name) => Ok(name),
            AxisRef::Position(pos) => Self::from_position(pos),
            AxisRef::Name(name) => name.parse(),
        }
    }

    pub fn from_position(position: usize) -> Result<AxisName> {
        AXIS_ORDER
            .get(position)
            .copied()
            .ok_or_else(|| PanelError::InvalidAxis(position.to_string()))
    }

    pub fn position(self) -> usize {
        match self {
            AxisName::Items => 0,
            AxisName::Major => 1,
            AxisName::Minor => 2,
        }
    }

    /// Canonical name, as used in display output.
    pub fn name(self) -> &'static str {
        match self {
            AxisName::Items => "items",
            AxisName::Major => "major_axis",
            AxisName::Minor => "minor_axis",
        }
    }

    /// Role in 2D slices: major rows become the table index, minor the columns.
    /// The items axis has no slice role; it becomes columns only when the
    /// slice is taken along major or minor.
    pub fn slice_role(self) -> Option<SliceRole> {
        match self {
            AxisName::Items => None,
            AxisName::Major => Some(SliceRole::Index),
            AxisName::Minor => Some(SliceRole::Columns),
        }
    }

    /// The (index, columns) axes of the 2D table orthogonal to this axis.
    pub fn plane_axes(self) -> (AxisName, AxisName) {
        match self {
            AxisName::Items => (AxisName::Major, AxisName::Minor),
            AxisName::Major => (AxisName::Minor, AxisName::Items),
            AxisName::Minor => (AxisName::Major, AxisName::Items),
        }
    }

    /// The two other axes in storage order.
    pub fn others(self) -> (AxisName, AxisName) {
        match self {
            AxisName::Items => (AxisName::Major, AxisName::Minor),
            AxisName::Major => (AxisName::Items, AxisName::Minor),
            AxisName::Minor => (AxisName::Items, AxisName::Major),
        }
    }

    /// Storage coordinates `[item, major, minor]` of position `along` on this
    /// axis and cell `(row, col)` of the orthogonal plane.
    pub fn storage_coords(self, along: usize, row: usize, col: usize) -> [usize; 3] {
        match self {
            AxisName::Items => [along, row, col],
            AxisName::Major => [col, along, row],
            AxisName::Minor => [col, row, along],
        }
    }

    /// Inverse of `storage_coords`: the orthogonal plane cell holding `coords`.
    pub fn plane_coords(self, coords: [usize; 3]) -> (usize, usize) {
        let [i, j, k] = coords;
        match self {
            AxisName::Items => (j, k),
            AxisName::Major => (k, i),
            AxisName::Minor => (j, i),
        }
    }
}

impl FromStr for AxisName {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "items" => Ok(AxisName::Items),
            "major_axis" | "major" => Ok(AxisName::Major),
            "minor_axis" | "minor" => Ok(AxisName::Minor),
            other => Err(PanelError::InvalidAxis(other.to_string())),
        }
    }
}

impl fmt::Display for AxisName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An unresolved axis argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisRef {
    Name(String),
    Position(usize),
    Axis(AxisName),
}

impl From<&str> for AxisRef {
    fn from(name: &str) -> Self {
        AxisRef::Name(name.to_string())
    }
}

impl From<String> for AxisRef {
    fn from(name: String) -> Self {
        AxisRef::Name(name)
    }
}

impl From<usize> for AxisRef {
    fn from(position: usize) -> Self {
        AxisRef::Position(position)
    }
}

impl From<AxisName> for AxisRef {
    fn from(axis: AxisName) -> Self {
        AxisRef::Axis(axis)
    }
}
