//! FILENAME: panel/src/store.rs
//! PURPOSE: The item store behind a panel: one typed plane per item plus a
//! lazily built cache of consolidated same-kind blocks.
//! CONTEXT: The per-item planes are the source of truth. `consolidate()`
//! groups items of the same element kind into contiguous `Values` blocks for
//! bulk access (fused gathers, transposition); any mutation drops the cache.
//!
//! Invariants:
//! - one plane per item label, in item order
//! - every plane has shape (len(major), len(minor))

use std::cell::OnceCell;
use std::ops::Range;

use frame::{Column, DType, Plane, Value};
use labels::{is_identity, Index, IndexError, Label};

use crate::array3::{Array3, Values};
use crate::axis::AxisName;
use crate::error::{PanelError, Result};

// ============================================================================
// BLOCKS
// ============================================================================

/// Items sharing one element kind, stacked into a dense buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub dtype: DType,
    /// Item positions held by this block, ascending.
    pub items: Vec<usize>,
    pub values: Values,
}

// ============================================================================
// ITEM STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct ItemStore {
    axes: [Index; 3],
    planes: Vec<Plane>,
    blocks: OnceCell<Vec<Block>>,
}

impl ItemStore {
    /// Builds a store, checking one plane per item and each plane's shape.
    pub fn new(axes: [Index; 3], planes: Vec<Plane>) -> Result<Self> {
        if planes.len() != axes[0].len() {
            return Err(PanelError::AxisLengthMismatch {
                axis: AxisName::Items.to_string(),
                expected: planes.len(),
                got: axes[0].len(),
            });
        }
        let expected = (axes[1].len(), axes[2].len());
        if let Some(bad) = planes.iter().find(|p| p.shape() != expected) {
            return Err(PanelError::ShapeMismatch {
                expected,
                got: bad.shape(),
            });
        }
        Ok(ItemStore {
            axes,
            planes,
            blocks: OnceCell::new(),
        })
    }

    /// A store with three empty axes.
    pub fn empty() -> Self {
        ItemStore {
            axes: [Index::empty(), Index::empty(), Index::empty()],
            planes: Vec::new(),
            blocks: OnceCell::new(),
        }
    }

    /// Builds a store over a dense buffer whose extents must match the axes.
    pub fn from_values(axes: [Index; 3], values: &Values) -> Result<Self> {
        let shape = values.shape();
        for axis in crate::axis::AXIS_ORDER {
            let pos = axis.position();
            if axes[pos].len() != shape[pos] {
                return Err(PanelError::AxisLengthMismatch {
                    axis: axis.to_string(),
                    expected: shape[pos],
                    got: axes[pos].len(),
                });
            }
        }
        Self::new(axes, values.to_planes()?)
    }

    pub fn axes(&self) -> &[Index; 3] {
        &self.axes
    }

    pub fn axis(&self, axis: AxisName) -> &Index {
        &self.axes[axis.position()]
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.axes[0].len(), self.axes[1].len(), self.axes[2].len()]
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn plane(&self, position: usize) -> Option<&Plane> {
        self.planes.get(position)
    }

    pub fn dtypes(&self) -> Vec<DType> {
        self.planes.iter().map(Plane::dtype).collect()
    }

    pub fn is_mixed_type(&self) -> bool {
        self.planes
            .split_first()
            .map_or(false, |(first, rest)| rest.iter().any(|p| p.dtype() != first.dtype()))
    }

    // ========================================================================
    // CONSOLIDATION
    // ========================================================================

    /// Groups items by element kind into dense blocks, building the cache on
    /// first use.
    pub fn consolidate(&self) -> Result<&[Block]> {
        if let Some(blocks) = self.blocks.get() {
            return Ok(blocks.as_slice());
        }
        let blocks = self.build_blocks()?;
        log::trace!("[STORE] consolidated {} items into {} blocks", self.planes.len(), blocks.len());
        Ok(self.blocks.get_or_init(|| blocks).as_slice())
    }

    pub fn is_consolidated(&self) -> bool {
        self.blocks.get().is_some()
    }

    fn build_blocks(&self) -> Result<Vec<Block>> {
        let (rows, cols) = (self.axes[1].len(), self.axes[2].len());
        let mut order: Vec<DType> = Vec::new();
        for dtype in self.dtypes() {
            if !order.contains(&dtype) {
                order.push(dtype);
            }
        }
        order
            .into_iter()
            .map(|dtype| {
                let items: Vec<usize> = (0..self.planes.len())
                    .filter(|&i| self.planes[i].dtype() == dtype)
                    .collect();
                let members: Vec<Plane> = items.iter().map(|&i| self.planes[i].clone()).collect();
                let values = Values::from_planes(&members, rows, cols)?;
                Ok(Block { dtype, items, values })
            })
            .collect()
    }

    fn invalidate(&mut self) {
        self.blocks.take();
    }

    /// The whole store as one dense buffer: the single block when the store
    /// is homogeneous, otherwise every item widened to `Object`.
    pub fn as_values(&self) -> Result<Values> {
        let [n0, n1, n2] = self.shape();
        if n0 == 0 {
            return Ok(Values::missing(DType::Float, [0, n1, n2]));
        }
        let blocks = self.consolidate()?;
        if let [single] = blocks {
            return Ok(single.values.clone());
        }
        Values::from_planes(&self.planes, n1, n2)
    }

    /// Numeric view of the whole store.
    pub fn to_f64(&self) -> Result<Array3<f64>> {
        self.as_values()?.to_f64()
    }

    /// Missing mask over every cell, in storage order.
    pub fn missing_mask(&self) -> Result<Array3<bool>> {
        let data: Vec<bool> = self.planes.iter().flat_map(Plane::missing_mask).collect();
        Array3::from_shape_vec(&self.shape(), data)
    }

    // ========================================================================
    // SLICING AND REINDEXING
    // ========================================================================

    /// Contiguous positional slice along one axis.
    pub fn get_slice(&self, range: Range<usize>, axis: AxisName) -> Result<ItemStore> {
        let end = range.end.min(self.axis(axis).len());
        let start = range.start.min(end);
        let index = self.axis(axis).slice(start..end);
        let indexer: Vec<Option<usize>> = (start..end).map(Some).collect();
        self.reindex_axis(axis, index, &indexer)
    }

    /// Conforms one axis to `index` through a precomputed indexer.
    pub fn reindex_axis(&self, axis: AxisName, index: Index, indexer: &[Option<usize>]) -> Result<ItemStore> {
        let mut axes = self.axes.clone();
        if is_identity(indexer, self.axis(axis).len()) {
            log::trace!("[STORE] identity indexer on {}, planes reused", axis);
            axes[axis.position()] = index;
            return ItemStore::new(axes, self.planes.clone());
        }
        let (rows, cols) = (self.axes[1].len(), self.axes[2].len());
        let planes = match axis {
            AxisName::Items => indexer
                .iter()
                .map(|entry| match entry {
                    Some(pos) => self.planes[*pos].clone(),
                    None => Plane::missing(DType::Float, rows, cols),
                })
                .collect(),
            AxisName::Major => {
                let all_cols: Vec<Option<usize>> = (0..cols).map(Some).collect();
                self.planes.iter().map(|p| p.take_2d(indexer, &all_cols)).collect()
            }
            AxisName::Minor => {
                let all_rows: Vec<Option<usize>> = (0..rows).map(Some).collect();
                self.planes.iter().map(|p| p.take_2d(&all_rows, indexer)).collect()
            }
        };
        axes[axis.position()] = index;
        ItemStore::new(axes, planes)
    }

    /// Gathers all three axes at once from the consolidated buffer. Requires
    /// a homogeneous store.
    pub fn take_multi(&self, axes: [Index; 3], indexers: [&[Option<usize>]; 3]) -> Result<ItemStore> {
        if self.is_mixed_type() {
            let kinds: Vec<String> = self.dtypes().iter().map(DType::to_string).collect();
            return Err(PanelError::MixedBlockFastPath(kinds.join(", ")));
        }
        let gathered = self.as_values()?.take(indexers[0], indexers[1], indexers[2]);
        let store = ItemStore::from_values(axes, &gathered)?;
        // The gathered buffer is the consolidated form of the result
        let _ = store.blocks.set(vec![Block {
            dtype: gathered.dtype(),
            items: (0..gathered.shape()[0]).collect(),
            values: gathered,
        }]);
        Ok(store)
    }

    /// The plane orthogonal to `axis` at `position`, widened to the common
    /// kind of all items. Major and minor slices are laid out with one column
    /// per item.
    pub fn xs(&self, position: usize, axis: AxisName) -> Result<Plane> {
        let (rows, cols) = (self.axes[1].len(), self.axes[2].len());
        match axis {
            AxisName::Items => self
                .planes
                .get(position)
                .cloned()
                .ok_or_else(|| PanelError::KeyNotFound(position.to_string())),
            AxisName::Major => {
                let columns: Vec<Column> = self.planes.iter().map(|p| p.row(position)).collect();
                Ok(Plane::from_columns(&columns, cols)?)
            }
            AxisName::Minor => {
                let columns: Vec<Column> = self.planes.iter().map(|p| p.column(position)).collect();
                Ok(Plane::from_columns(&columns, rows)?)
            }
        }
    }

    // ========================================================================
    // ITEM MUTATION
    // ========================================================================

    /// Replaces the plane of an existing item or appends a new item.
    pub fn set_item(&mut self, label: Label, plane: Plane) -> Result<()> {
        let expected = (self.axes[1].len(), self.axes[2].len());
        if plane.shape() != expected {
            return Err(PanelError::ShapeMismatch {
                expected,
                got: plane.shape(),
            });
        }
        match self.axes[0].get_loc(&label) {
            Some(pos) => self.planes[pos] = plane,
            None => {
                let items = &self.axes[0];
                if items.is_hierarchical() && label.nlevels() != items.nlevels() {
                    return Err(IndexError::LevelMismatch {
                        expected: items.nlevels(),
                        got: label.nlevels(),
                    }
                    .into());
                }
                // keeps the axis name and level names
                self.axes[0] = items.append_unique(&Index::new(vec![label])?);
                self.planes.push(plane);
            }
        }
        self.invalidate();
        Ok(())
    }

    /// Removes an item, returning its plane.
    pub fn delete(&mut self, label: &Label) -> Result<Plane> {
        let pos = self.axes[0]
            .get_loc(label)
            .ok_or_else(|| PanelError::KeyNotFound(label.to_string()))?;
        let keep: Vec<usize> = (0..self.planes.len()).filter(|&i| i != pos).collect();
        self.axes[0] = self.axes[0].take(&keep)?;
        let plane = self.planes.remove(pos);
        self.invalidate();
        Ok(plane)
    }

    /// Sets one cell, widening the item's plane when needed.
    pub fn set_cell(&mut self, coords: [usize; 3], value: Value) -> Result<()> {
        let [i, j, k] = coords;
        let plane = self
            .planes
            .get_mut(i)
            .ok_or_else(|| PanelError::KeyNotFound(i.to_string()))?;
        plane.set(j, k, value)?;
        self.invalidate();
        Ok(())
    }

    pub fn cast_item(&mut self, position: usize, dtype: DType) -> Result<()> {
        if let Some(plane) = self.planes.get_mut(position) {
            *plane = plane
                .cast(dtype)
                .map_err(|_| PanelError::CastFailed(dtype.to_string()))?;
            self.invalidate();
        }
        Ok(())
    }

    pub fn replace_planes(&mut self, planes: Vec<Plane>) -> Result<()> {
        *self = ItemStore::new(self.axes.clone(), planes)?;
        Ok(())
    }

    // ========================================================================
    // MERGE AND FILL
    // ========================================================================

    /// Concatenates the items of two stores sharing major and minor axes.
    /// Overlapping item labels are renamed with the suffixes; without any
    /// suffix an overlap is an error.
    pub fn merge(&self, other: &ItemStore, lsuffix: &str, rsuffix: &str) -> Result<ItemStore> {
        if !self.axes[1].equals(&other.axes[1]) || !self.axes[2].equals(&other.axes[2]) {
            return Err(PanelError::InvalidInput(
                "merged stores must share major and minor axes".to_string(),
            ));
        }
        let overlap = self.axes[0].intersection(&other.axes[0]);
        if !overlap.is_empty() && lsuffix.is_empty() && rsuffix.is_empty() {
            let names: Vec<String> = overlap.iter().map(Label::to_string).collect();
            return Err(PanelError::OverlappingItems(names.join(", ")));
        }
        let rename = |label: &Label, suffix: &str| {
            if overlap.contains(label) && !suffix.is_empty() {
                label.with_suffix(suffix)
            } else {
                label.clone()
            }
        };
        let mut labels: Vec<Label> = self.axes[0].iter().map(|l| rename(l, lsuffix)).collect();
        labels.extend(other.axes[0].iter().map(|l| rename(l, rsuffix)));
        let items = Index::new(labels).map_err(|e| PanelError::OverlappingItems(e.to_string()))?;

        let mut planes = self.planes.clone();
        planes.extend(other.planes.iter().cloned());
        ItemStore::new([items, self.axes[1].clone(), self.axes[2].clone()], planes)
    }

    /// Replaces missing cells of every item with `value`.
    pub fn fillna(&self, value: &Value) -> Result<ItemStore> {
        let rows = self.axes[1].len();
        let planes = self
            .planes
            .iter()
            .map(|p| {
                let filled = p
                    .to_columns()
                    .iter()
                    .map(|c| c.fill_value(value))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(Plane::from_columns(&filled, rows)?)
            })
            .collect::<Result<Vec<_>>>()?;
        ItemStore::new(self.axes.clone(), planes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame::Matrix;

    fn float_plane(rows: Vec<Vec<f64>>) -> Plane {
        Plane::Float(Matrix::from_rows(rows).unwrap())
    }

    fn text_plane(rows: Vec<Vec<&str>>) -> Plane {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(|s| Some(s.to_string())).collect())
            .collect();
        Plane::Text(Matrix::from_rows(rows).unwrap())
    }

    fn axes(items: &[&str]) -> [Index; 3] {
        [
            Index::from_labels(items.iter().copied()).unwrap(),
            Index::range(2),
            Index::from_labels(["a", "b"]).unwrap(),
        ]
    }

    fn mixed() -> ItemStore {
        ItemStore::new(
            axes(&["x", "y", "z"]),
            vec![
                float_plane(vec![vec![1.0, 2.0], vec![3.0, 4.0]]),
                text_plane(vec![vec!["p", "q"], vec!["r", "s"]]),
                float_plane(vec![vec![5.0, 6.0], vec![7.0, 8.0]]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_validates_shapes() {
        let err = ItemStore::new(axes(&["x"]), vec![float_plane(vec![vec![1.0]])]).unwrap_err();
        assert!(matches!(err, PanelError::ShapeMismatch { .. }));
        let err = ItemStore::new(axes(&["x", "y"]), vec![]).unwrap_err();
        assert!(matches!(err, PanelError::AxisLengthMismatch { .. }));
    }

    #[test]
    fn test_consolidate_groups_by_kind() {
        let store = mixed();
        assert!(store.is_mixed_type());
        assert!(!store.is_consolidated());
        let blocks = store.consolidate().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].dtype, DType::Float);
        assert_eq!(blocks[0].items, vec![0, 2]);
        assert_eq!(blocks[1].items, vec![1]);
        assert_eq!(blocks[0].values.get(1, 1, 0), Value::Number(7.0));
        assert!(store.is_consolidated());
    }

    #[test]
    fn test_mutation_drops_block_cache() {
        let mut store = mixed();
        store.consolidate().unwrap();
        store.set_cell([0, 0, 0], Value::Number(10.0)).unwrap();
        assert!(!store.is_consolidated());
        assert_eq!(store.consolidate().unwrap()[0].values.get(0, 0, 0), Value::Number(10.0));
    }

    #[test]
    fn test_take_multi_rejects_mixed() {
        let store = mixed();
        let items: Vec<Option<usize>> = vec![Some(0), Some(1), Some(2)];
        let identity: Vec<Option<usize>> = vec![Some(0), Some(1)];
        let err = store
            .take_multi(store.axes().clone(), [&items[..], &identity[..], &identity[..]])
            .unwrap_err();
        assert!(matches!(err, PanelError::MixedBlockFastPath(_)));
    }

    #[test]
    fn test_xs_major_lays_items_as_columns() {
        let store = mixed();
        let plane = store.xs(1, AxisName::Major).unwrap();
        assert_eq!(plane.shape(), (2, 3));
        assert_eq!(plane.dtype(), DType::Object);
        assert_eq!(plane.get(0, 0), Value::Number(3.0));
        assert_eq!(plane.get(1, 1), Value::from("s"));
    }

    #[test]
    fn test_merge_overlap_requires_suffix() {
        let store = mixed();
        assert!(matches!(store.merge(&store, "", ""), Err(PanelError::OverlappingItems(_))));
        let merged = store.merge(&store, "_l", "_r").unwrap();
        assert_eq!(merged.shape(), [6, 2, 2]);
        assert!(merged.axis(AxisName::Items).contains(&Label::from("x_l")));
        assert!(merged.axis(AxisName::Items).contains(&Label::from("z_r")));
    }

    #[test]
    fn test_set_item_and_delete() {
        let mut store = mixed();
        store.set_item(Label::from("w"), float_plane(vec![vec![0.0, 0.0], vec![0.0, 0.0]])).unwrap();
        assert_eq!(store.shape(), [4, 2, 2]);
        let removed = store.delete(&Label::from("y")).unwrap();
        assert_eq!(removed.dtype(), DType::Text);
        assert_eq!(store.axis(AxisName::Items).labels(), &[Label::from("x"), Label::from("z"), Label::from("w")]);
        assert!(store.set_item(Label::from("v"), float_plane(vec![vec![1.0]])).is_err());
    }

    #[test]
    fn test_reindex_axis_minor() {
        let store = mixed();
        let target = Index::from_labels(["b", "c"]).unwrap();
        let indexer = store.axis(AxisName::Minor).get_indexer(&target, None).unwrap();
        let result = store.reindex_axis(AxisName::Minor, target, &indexer).unwrap();
        assert_eq!(result.plane(0).unwrap().get(0, 0), Value::Number(2.0));
        assert!(result.plane(0).unwrap().is_missing(0, 1));
        assert!(result.plane(1).unwrap().is_missing(1, 1));
    }

    #[test]
    fn test_identity_reindex_relabels_without_gather() {
        let store = mixed();
        let renamed = Index::from_labels(["p", "q"]).unwrap();
        let result = store
            .reindex_axis(AxisName::Minor, renamed.clone(), &[Some(0), Some(1)])
            .unwrap();
        assert!(result.axis(AxisName::Minor).equals(&renamed));
        assert_eq!(result.planes(), store.planes());
    }

    #[test]
    fn test_missing_mask_follows_storage_order() {
        let mut store = mixed();
        store.set_cell([2, 1, 0], Value::Missing).unwrap();
        let mask = store.missing_mask().unwrap();
        assert_eq!(mask.shape(), [3, 2, 2]);
        assert!(*mask.get(2, 1, 0));
        assert_eq!(mask.data().iter().filter(|m| **m).count(), 1);
    }

    #[test]
    fn test_set_item_keeps_level_names() {
        let items = Index::from_tuples(
            vec![vec![Label::from("a"), Label::from(1)], vec![Label::from("b"), Label::from(1)]],
            [Some("outer".to_string()), Some("inner".to_string())],
        )
        .unwrap();
        let plane = || float_plane(vec![vec![0.0, 0.0], vec![0.0, 0.0]]);
        let mut store = ItemStore::new([items, Index::range(2), Index::range(2)], vec![plane(), plane()]).unwrap();

        store.set_item(Label::from(("c", 1)), plane()).unwrap();
        let items = store.axis(AxisName::Items);
        assert!(items.is_hierarchical());
        assert_eq!(items.len(), 3);

        let err = store.set_item(Label::from("d"), plane()).unwrap_err();
        assert!(matches!(err, PanelError::Index(IndexError::LevelMismatch { expected: 2, got: 1 })));
        assert_eq!(store.shape()[0], 3);
    }
}
