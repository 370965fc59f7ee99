//! FILENAME: panel/src/groupby.rs
//! PURPOSE: Grouping the labels of one axis by a key function and
//! aggregating each group.

use std::collections::BTreeMap;

use frame::ReduceOp;
use labels::{Index, Label};

use crate::array3::Array3;
use crate::axis::{AxisName, AxisRef};
use crate::error::{PanelError, Result};
use crate::panel::Panel;

/// Positions along one axis, grouped by key. Keys iterate in sorted order.
#[derive(Debug, Clone)]
pub struct PanelGroupBy<'a> {
    panel: &'a Panel,
    axis: AxisName,
    groups: BTreeMap<Label, Vec<usize>>,
}

impl Panel {
    /// Groups the labels along `axis` by `key_fn`.
    pub fn groupby(&self, key_fn: impl Fn(&Label) -> Label, axis: impl Into<AxisRef>) -> Result<PanelGroupBy<'_>> {
        let axis = AxisName::resolve(axis)?;
        let mut groups: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
        for (pos, label) in self.axis(axis).iter().enumerate() {
            groups.entry(key_fn(label)).or_default().push(pos);
        }
        Ok(PanelGroupBy {
            panel: self,
            axis,
            groups,
        })
    }
}

impl<'a> PanelGroupBy<'a> {
    pub fn axis(&self) -> AxisName {
        self.axis
    }

    /// Group key to positions along the grouped axis.
    pub fn groups(&self) -> &BTreeMap<Label, Vec<usize>> {
        &self.groups
    }

    pub fn keys(&self) -> impl Iterator<Item = &Label> {
        self.groups.keys()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The sub-panel holding one group's labels.
    pub fn get_group(&self, key: &Label) -> Result<Panel> {
        let positions = self
            .groups
            .get(key)
            .ok_or_else(|| PanelError::KeyNotFound(key.to_string()))?;
        self.subpanel(positions)
    }

    /// Every (key, sub-panel) pair in key order.
    pub fn panels(&self) -> Result<Vec<(Label, Panel)>> {
        self.groups
            .iter()
            .map(|(key, positions)| -> Result<(Label, Panel)> { Ok((key.clone(), self.subpanel(positions)?)) })
            .collect()
    }

    fn subpanel(&self, positions: &[usize]) -> Result<Panel> {
        let index = self.panel.axis(self.axis).take(positions)?;
        let indexer: Vec<Option<usize>> = positions.iter().copied().map(Some).collect();
        let store = self.panel.store.reindex_axis(self.axis, index, &indexer)?;
        Ok(Panel::from_parts(store))
    }

    /// Reduces each group along the grouped axis. The result keeps the other
    /// two axes; the grouped axis holds the group keys.
    pub fn aggregate(&self, op: ReduceOp, skipna: bool) -> Result<Panel> {
        let mut shape = self.panel.shape();
        shape[self.axis.position()] = self.groups.len();
        let mut out = Array3::filled(shape, f64::NAN);

        for (g, positions) in self.groups.values().enumerate() {
            let reduced = self.subpanel(positions)?.reduce(op, self.axis, skipna)?;
            let plane = reduced.to_f64()?;
            let (rows, cols) = plane.shape();
            for r in 0..rows {
                for c in 0..cols {
                    let [i, j, k] = self.axis.storage_coords(g, r, c);
                    out.set(i, j, k, *plane.get(r, c));
                }
            }
        }

        let mut axes = self.panel.store.axes().clone();
        axes[self.axis.position()] = Index::new(self.groups.keys().cloned().collect())?;
        Panel::from_f64(axes, out)
    }

    pub fn sum(&self) -> Result<Panel> {
        self.aggregate(ReduceOp::Sum, true)
    }

    pub fn mean(&self) -> Result<Panel> {
        self.aggregate(ReduceOp::Mean, true)
    }
}
