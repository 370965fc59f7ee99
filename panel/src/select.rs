//! FILENAME: panel/src/select.rs
//! PURPOSE: Plane extraction along any axis, axis permutation, and dropping
//! positions with missing data.

use std::str::FromStr;

use frame::Frame;
use labels::Label;
use serde::{Deserialize, Serialize};

use crate::axis::{AxisName, AxisRef, AXIS_ORDER};
use crate::error::{PanelError, Result};
use crate::panel::Panel;
use crate::store::ItemStore;

/// Policy for `dropna`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropHow {
    /// Drop a position when any cell in its plane is missing.
    Any,
    /// Drop a position only when every cell in its plane is missing.
    All,
}

impl Default for DropHow {
    fn default() -> Self {
        DropHow::Any
    }
}

impl FromStr for DropHow {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "any" => Ok(DropHow::Any),
            "all" => Ok(DropHow::All),
            other => Err(PanelError::InvalidInput(format!("invalid dropna policy: {}", other))),
        }
    }
}

impl Panel {
    /// The 2D table at `key` along `axis`. Along items this is the item's own
    /// table; along major it is indexed by minor with one column per item;
    /// along minor it is indexed by major with one column per item.
    pub fn xs(&self, key: &Label, axis: impl Into<AxisRef>) -> Result<Frame> {
        let axis = AxisName::resolve(axis)?;
        if axis == AxisName::Items {
            return self.item(key);
        }
        let pos = self
            .axis(axis)
            .get_loc(key)
            .ok_or_else(|| PanelError::KeyNotFound(key.to_string()))?;
        let plane = self.store.xs(pos, axis)?;
        let (index_axis, columns_axis) = axis.plane_axes();
        Ok(Frame::from_plane(
            self.axis(index_axis).clone(),
            self.axis(columns_axis).clone(),
            &plane,
        )?)
    }

    pub fn major_xs(&self, key: &Label) -> Result<Frame> {
        self.xs(key, AxisName::Major)
    }

    pub fn minor_xs(&self, key: &Label) -> Result<Frame> {
        self.xs(key, AxisName::Minor)
    }

    /// Interchanges two axes.
    pub fn swapaxes(&self, axis1: impl Into<AxisRef>, axis2: impl Into<AxisRef>) -> Result<Panel> {
        let a = AxisName::resolve(axis1)?;
        let b = AxisName::resolve(axis2)?;
        if a == b {
            return Err(PanelError::DuplicateAxis(a.to_string()));
        }
        let mut perm = [0, 1, 2];
        perm.swap(a.position(), b.position());
        self.permute(perm)
    }

    /// Reorders all three axes: the result's items, major and minor axes are
    /// the given axes of this panel, in order. Always copies.
    pub fn transpose<A: Into<AxisRef> + Clone>(&self, axes: &[A]) -> Result<Panel> {
        if axes.len() != 3 {
            return Err(PanelError::WrongAxisCount {
                expected: 3,
                got: axes.len(),
            });
        }
        let mut perm = [0usize; 3];
        for (slot, axis) in perm.iter_mut().zip(axes) {
            *slot = AxisName::resolve(axis.clone())?.position();
        }
        if perm[0] == perm[1] || perm[0] == perm[2] || perm[1] == perm[2] {
            let names: Vec<&str> = perm
                .iter()
                .filter_map(|&p| AXIS_ORDER.get(p).map(|a| a.name()))
                .collect();
            return Err(PanelError::DuplicateAxis(names.join(", ")));
        }
        self.permute(perm)
    }

    fn permute(&self, perm: [usize; 3]) -> Result<Panel> {
        let axes = self.store.axes();
        let new_axes = [axes[perm[0]].clone(), axes[perm[1]].clone(), axes[perm[2]].clone()];
        let values = self.store.as_values()?.permuted(perm);
        let store = ItemStore::from_values(new_axes, &values)?;
        Ok(Panel::from_parts(store))
    }

    /// Drops every position along `axis` whose orthogonal plane is
    /// incomplete (`Any`) or entirely missing (`All`).
    pub fn dropna(&self, axis: impl Into<AxisRef>, how: DropHow) -> Result<Panel> {
        let axis = AxisName::resolve(axis)?;
        let mask = self.store.missing_mask()?;
        let shape = self.shape();
        let (rows_axis, cols_axis) = axis.plane_axes();
        let (rows, cols) = (shape[rows_axis.position()], shape[cols_axis.position()]);
        let per_slice = rows * cols;

        let positions: Vec<usize> = (0..shape[axis.position()])
            .filter(|&t| {
                let mut observed = 0;
                for r in 0..rows {
                    for c in 0..cols {
                        let [i, j, k] = axis.storage_coords(t, r, c);
                        if !*mask.get(i, j, k) {
                            observed += 1;
                        }
                    }
                }
                match how {
                    DropHow::All => observed > 0,
                    DropHow::Any => observed == per_slice,
                }
            })
            .collect();

        let index = self.axis(axis).take(&positions)?;
        let indexer: Vec<Option<usize>> = positions.into_iter().map(Some).collect();
        Ok(Panel::from_parts(self.store.reindex_axis(axis, index, &indexer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::PanelAxes;
    use frame::Value;
    use labels::Index;

    fn cube() -> Panel {
        Panel::from_shape_vec(
            &[2, 3, 4],
            (0..24).map(f64::from).collect(),
            PanelAxes::new()
                .items(Index::from_labels(["x", "y"]).unwrap())
                .minor(Index::from_labels(["a", "b", "c", "d"]).unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn test_xs_orientation() {
        let panel = cube();
        let major = panel.major_xs(&Label::from(1)).unwrap();
        assert_eq!(major.shape(), (4, 2));
        assert_eq!(major.get_value(&Label::from("c"), &Label::from("y")).unwrap(), Value::Number(18.0));

        let minor = panel.xs(&Label::from("b"), "minor").unwrap();
        assert_eq!(minor.shape(), (3, 2));
        assert_eq!(minor.get_value(&Label::from(2), &Label::from("x")).unwrap(), Value::Number(9.0));

        assert!(matches!(panel.xs(&Label::from(7), "major"), Err(PanelError::KeyNotFound(_))));
    }

    #[test]
    fn test_xs_reads_item_planes_without_blocks() {
        let mut panel = cube();
        panel.set_item("t", Value::from("tag")).unwrap();
        assert!(!panel.store().is_consolidated());

        let row = panel.major_xs(&Label::from(0)).unwrap();
        assert_eq!(row.get_value(&Label::from("a"), &Label::from("t")).unwrap(), Value::from("tag"));
        assert_eq!(row.get_value(&Label::from("b"), &Label::from("x")).unwrap(), Value::Number(1.0));
        assert!(!panel.store().is_consolidated());
    }

    #[test]
    fn test_swapaxes() {
        let panel = cube();
        let swapped = panel.swapaxes("items", "minor").unwrap();
        assert_eq!(swapped.shape(), [4, 3, 2]);
        assert_eq!(
            swapped.get_value(&Label::from("d"), &Label::from(2), &Label::from("y")).unwrap(),
            Value::Number(23.0)
        );
        assert!(matches!(panel.swapaxes("major", 1usize), Err(PanelError::DuplicateAxis(_))));
    }

    #[test]
    fn test_transpose_validation() {
        let panel = cube();
        assert!(matches!(
            panel.transpose(&["items", "major"]),
            Err(PanelError::WrongAxisCount { expected: 3, got: 2 })
        ));
        assert!(matches!(
            panel.transpose(&["items", "major", "major_axis"]),
            Err(PanelError::DuplicateAxis(_))
        ));
        assert!(matches!(panel.transpose(&["items", "major", "depth"]), Err(PanelError::InvalidAxis(_))));
    }

    #[test]
    fn test_transpose_roundtrip() {
        let panel = cube();
        let t = panel.transpose(&["minor", "items", "major"]).unwrap();
        assert_eq!(t.shape(), [4, 2, 3]);
        assert_eq!(t.items().labels(), panel.minor_axis().labels());
        let back = t.transpose(&["major", "minor", "items"]).unwrap();
        assert_eq!(back.shape(), panel.shape());
        assert!(back.values().unwrap() == panel.values().unwrap());
    }

    #[test]
    fn test_dropna_any_and_all() {
        let mut panel = cube();
        panel = panel.set_value("x", 0, "a", f64::NAN).unwrap();
        for item in ["x", "y"] {
            for minor in ["a", "b", "c", "d"] {
                panel = panel.set_value(item, 2, minor, f64::NAN).unwrap();
            }
        }
        let all = panel.dropna("major", DropHow::All).unwrap();
        assert_eq!(all.major_axis().labels(), &[Label::from(0), Label::from(1)]);
        let any = panel.dropna("major", DropHow::Any).unwrap();
        assert_eq!(any.major_axis().labels(), &[Label::from(1)]);
        let items = panel.dropna("items", DropHow::Any).unwrap();
        assert!(items.items().is_empty());
        assert_eq!("all".parse::<DropHow>().unwrap(), DropHow::All);
    }
}
