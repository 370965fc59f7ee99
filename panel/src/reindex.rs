//! FILENAME: panel/src/reindex.rs
//! PURPOSE: Axis conformance: single- and multi-axis reindexing, label
//! filtering and truncation, and missing-value filling.
//! CONTEXT: Reindexing all three axes at once without a fill method takes the
//! fused path: three indexers and one gather out of the consolidated buffer.
//! Every other request reindexes axis by axis (major, minor, then items).

use frame::{Frame, Plane, Value};
use labels::{FillMethod, Index, Label};

use crate::axis::{AxisName, AxisRef};
use crate::error::{PanelError, Result};
use crate::panel::Panel;

/// Target axes for `Panel::reindex`.
#[derive(Debug, Clone)]
pub struct ReindexArgs {
    pub items: Option<Index>,
    pub major: Option<Index>,
    pub minor: Option<Index>,
    pub method: Option<FillMethod>,
    pub copy: bool,
}

impl Default for ReindexArgs {
    fn default() -> Self {
        ReindexArgs {
            items: None,
            major: None,
            minor: None,
            method: None,
            copy: true,
        }
    }
}

impl ReindexArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(mut self, items: Index) -> Self {
        self.items = Some(items);
        self
    }

    pub fn major(mut self, major: Index) -> Self {
        self.major = Some(major);
        self
    }

    pub fn minor(mut self, minor: Index) -> Self {
        self.minor = Some(minor);
        self
    }

    pub fn method(mut self, method: FillMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn copy(mut self, copy: bool) -> Self {
        self.copy = copy;
        self
    }

    fn is_empty(&self) -> bool {
        self.items.is_none() && self.major.is_none() && self.minor.is_none()
    }
}

impl Panel {
    /// Conforms the panel to new labels on any of its axes.
    ///
    /// Fails with `NoAxisSpecified` when no axis is given and a copy is
    /// requested; without a copy the panel is returned unchanged.
    pub fn reindex(&self, args: ReindexArgs) -> Result<Panel> {
        if args.is_empty() {
            if args.copy {
                return Err(PanelError::NoAxisSpecified);
            }
            return Ok(self.clone());
        }

        if let (Some(items), Some(major), Some(minor), None) =
            (&args.items, &args.major, &args.minor, args.method)
        {
            if !self.is_mixed_type() {
                return self.reindex_multi(items, major, minor);
            }
        }

        let mut result = self.clone();
        let sequence = [
            (AxisName::Major, &args.major),
            (AxisName::Minor, &args.minor),
            (AxisName::Items, &args.items),
        ];
        for (axis, target) in sequence {
            if let Some(target) = target {
                result = result.reindex_axis_with(target, axis, args.method)?;
            }
        }
        log::debug!("[REINDEX] sequential path shape={:?}", result.shape());
        Ok(result)
    }

    /// Fused reindex of all three axes. The store must be homogeneous.
    pub fn reindex_multi(&self, items: &Index, major: &Index, minor: &Index) -> Result<Panel> {
        let item_indexer = self.items().get_indexer(items, None)?;
        let major_indexer = self.major_axis().get_indexer(major, None)?;
        let minor_indexer = self.minor_axis().get_indexer(minor, None)?;
        let store = self.store.take_multi(
            [items.clone(), major.clone(), minor.clone()],
            [&item_indexer[..], &major_indexer[..], &minor_indexer[..]],
        )?;
        log::debug!("[REINDEX] fused path shape={:?}", store.shape());
        Ok(Panel::from_parts(store))
    }

    /// Conforms one axis to `labels`. When the axis already equals `labels`
    /// and no method is set, the result is an unchanged copy.
    pub fn reindex_axis(
        &self,
        labels: &Index,
        axis: impl Into<AxisRef>,
        method: Option<FillMethod>,
    ) -> Result<Panel> {
        self.reindex_axis_with(labels, AxisName::resolve(axis)?, method)
    }

    fn reindex_axis_with(&self, labels: &Index, axis: AxisName, method: Option<FillMethod>) -> Result<Panel> {
        let current = self.axis(axis);
        if method.is_none() && current.equals(labels) {
            return Ok(self.clone());
        }
        let indexer = current.get_indexer(labels, method)?;
        log::trace!("[REINDEX] {} -> {} labels on {}", current.len(), labels.len(), axis);
        let store = self.store.reindex_axis(axis, labels.clone(), &indexer)?;
        Ok(Panel::from_parts(store))
    }

    /// Reindexes onto another panel's three axes.
    pub fn reindex_like(&self, other: &Panel, method: Option<FillMethod>) -> Result<Panel> {
        let mut args = ReindexArgs::new()
            .items(other.items().clone())
            .major(other.major_axis().clone())
            .minor(other.minor_axis().clone());
        args.method = method;
        self.reindex(args)
    }

    /// Conforms a table onto the plane orthogonal to `axis`.
    pub fn conform(&self, frame: &Frame, axis: impl Into<AxisRef>) -> Result<Frame> {
        let (index_axis, columns_axis) = AxisName::resolve(axis)?.plane_axes();
        Ok(frame.reindex(Some(self.axis(index_axis)), Some(self.axis(columns_axis)), None)?)
    }

    /// Restricts the items to those also present in `items`, keeping this
    /// panel's order.
    pub fn filter(&self, items: &[Label]) -> Result<Panel> {
        let mask: Vec<bool> = self.items().iter().map(|l| items.contains(l)).collect();
        let kept = self.items().filter_mask(&mask);
        self.reindex(ReindexArgs::new().items(kept))
    }

    /// Keeps the labels in `[before, after]` on a sorted axis.
    pub fn truncate(
        &self,
        before: Option<&Label>,
        after: Option<&Label>,
        axis: impl Into<AxisRef>,
    ) -> Result<Panel> {
        let axis = AxisName::resolve(axis)?;
        let index = self.axis(axis);
        let (start, end) = index.slice_locs(before, after)?;
        let store = self.store.get_slice(start..end, axis)?;
        Ok(Panel::from_parts(store))
    }

    // ========================================================================
    // FILLING
    // ========================================================================

    /// Fills missing values with a scalar or by propagation down the major
    /// axis of every item. Exactly one of `value` and `method` must be given.
    pub fn fillna(&self, value: Option<Value>, method: Option<FillMethod>) -> Result<Panel> {
        match (value, method) {
            (Some(_), Some(_)) => Err(PanelError::FillConflict),
            (None, None) => Err(PanelError::MissingFill),
            (Some(value), None) => Ok(Panel::from_parts(self.store.fillna(&value)?)),
            (None, Some(method)) => {
                let mut result = self.clone();
                let planes = (0..self.items().len())
                    .map(|pos| -> Result<Plane> { Ok(self.frame_at(pos)?.fillna_method(method).values()?) })
                    .collect::<Result<Vec<_>>>()?;
                result.store.replace_planes(planes)?;
                Ok(result)
            }
        }
    }

    pub fn ffill(&self) -> Result<Panel> {
        self.fillna(None, Some(FillMethod::Pad))
    }

    pub fn bfill(&self) -> Result<Panel> {
        self.fillna(None, Some(FillMethod::Backfill))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::PanelAxes;
    use frame::{Column, DType};

    fn numeric() -> Panel {
        Panel::from_shape_vec(
            &[2, 3, 2],
            (1..=12).map(f64::from).collect(),
            PanelAxes::new()
                .items(Index::from_labels(["x", "y"]).unwrap())
                .major(Index::from_labels([2000, 2001, 2002]).unwrap())
                .minor(Index::from_labels(["a", "b"]).unwrap()),
        )
        .unwrap()
    }

    fn value(p: &Panel, item: &str, major: i64, minor: &str) -> Value {
        p.get_value(&Label::from(item), &Label::from(major), &Label::from(minor)).unwrap()
    }

    #[test]
    fn test_reindex_requires_an_axis_when_copying() {
        let panel = numeric();
        assert!(matches!(panel.reindex(ReindexArgs::new()), Err(PanelError::NoAxisSpecified)));
        let same = panel.reindex(ReindexArgs::new().copy(false)).unwrap();
        assert_eq!(same.shape(), panel.shape());
    }

    #[test]
    fn test_fused_and_sequential_agree() {
        let panel = numeric();
        let items = Index::from_labels(["y", "z"]).unwrap();
        let major = Index::from_labels([2001, 2003]).unwrap();
        let minor = Index::from_labels(["b"]).unwrap();
        let fused = panel.reindex_multi(&items, &major, &minor).unwrap();
        let sequential = panel
            .reindex_axis(&major, "major", None)
            .and_then(|p| p.reindex_axis(&minor, "minor", None))
            .and_then(|p| p.reindex_axis(&items, "items", None))
            .unwrap();
        assert_eq!(fused.shape(), [2, 2, 1]);
        assert_eq!(value(&fused, "y", 2001, "b"), Value::Number(10.0));
        assert!(value(&fused, "z", 2001, "b").is_missing());
        assert!(value(&fused, "y", 2003, "b").is_missing());
        let (a, b) = (fused.values().unwrap(), sequential.values().unwrap());
        assert_eq!(a.shape(), b.shape());
        for i in 0..2 {
            for j in 0..2 {
                assert!(a.get(i, j, 0).same_as(&b.get(i, j, 0)));
            }
        }
    }

    #[test]
    fn test_reindex_multi_rejects_mixed_store() {
        let mut panel = numeric();
        panel.set_item("t", Value::from("text")).unwrap();
        let items = panel.items().clone();
        let major = panel.major_axis().clone();
        let minor = panel.minor_axis().clone();
        assert!(matches!(
            panel.reindex_multi(&items, &major, &minor),
            Err(PanelError::MixedBlockFastPath(_))
        ));
        // The public entry point falls back to the sequential path
        let result = panel
            .reindex(ReindexArgs::new().items(items).major(major).minor(minor))
            .unwrap();
        assert_eq!(result.store().dtypes(), vec![DType::Float, DType::Float, DType::Text]);
    }

    #[test]
    fn test_reindex_with_pad() {
        let panel = numeric();
        let major = Index::from_labels([2000, 2001, 2002, 2003]).unwrap();
        let padded = panel.reindex(ReindexArgs::new().major(major).method(FillMethod::Pad)).unwrap();
        assert_eq!(value(&padded, "x", 2003, "a"), Value::Number(5.0));
    }

    #[test]
    fn test_truncate_and_filter() {
        let panel = numeric();
        let cut = panel
            .truncate(Some(&Label::from(2001)), None, "major")
            .unwrap();
        assert_eq!(cut.major_axis().labels(), &[Label::from(2001), Label::from(2002)]);
        assert_eq!(value(&cut, "x", 2001, "a"), Value::Number(3.0));

        let filtered = panel.filter(&[Label::from("y"), Label::from("q")]).unwrap();
        assert_eq!(filtered.items().labels(), &[Label::from("y")]);
    }

    #[test]
    fn test_conform_orients_by_axis() {
        let panel = numeric();
        let frame = Frame::from_columns(
            Index::from_labels(["a"]).unwrap(),
            vec![("x", Column::from(vec![1.0]))],
        )
        .unwrap();
        let conformed = panel.conform(&frame, "major").unwrap();
        assert_eq!(conformed.index().labels(), panel.minor_axis().labels());
        assert_eq!(conformed.columns().labels(), panel.items().labels());
    }

    #[test]
    fn test_fillna_rules() {
        let panel = numeric()
            .reindex(ReindexArgs::new().major(Index::from_labels([2000, 2001, 2002, 2003]).unwrap()))
            .unwrap();
        assert!(matches!(panel.fillna(None, None), Err(PanelError::MissingFill)));
        assert!(matches!(
            panel.fillna(Some(Value::Number(0.0)), Some(FillMethod::Pad)),
            Err(PanelError::FillConflict)
        ));
        let zeros = panel.fillna(Some(Value::Number(0.0)), None).unwrap();
        assert_eq!(value(&zeros, "y", 2003, "b"), Value::Number(0.0));
        let padded = panel.ffill().unwrap();
        assert_eq!(value(&padded, "y", 2003, "b"), Value::Number(12.0));
        let backed = panel.bfill().unwrap();
        assert!(value(&backed, "y", 2003, "b").is_missing());
    }
}
