//! FILENAME: panel/src/config.rs
//! PURPOSE: Serializable construction options for `Panel::from_dict`.

use frame::DType;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How the keys of a table mapping map onto the panel axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orient {
    /// Keys become items.
    Items,
    /// Table columns become items; keys become the minor axis.
    Minor,
}

impl Default for Orient {
    fn default() -> Self {
        Orient::Items
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelOptions {
    /// Intersect instead of union the major/minor axes of the input tables.
    pub intersect: bool,
    pub orient: Orient,
    /// Forced element kind for every item.
    pub dtype: Option<DType>,
}

impl PanelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intersect(mut self, intersect: bool) -> Self {
        self.intersect = intersect;
        self
    }

    pub fn orient(mut self, orient: Orient) -> Self {
        self.orient = orient;
        self
    }

    pub fn dtype(mut self, dtype: DType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
