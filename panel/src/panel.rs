//! FILENAME: panel/src/panel.rs
//! PURPOSE: The `Panel` container: axis accessors, item access and assignment,
//! single-cell get/set, and display.
//! CONTEXT: Item assignment (`set_item`) and removal (`pop`) are the only
//! operations that mutate a panel in place. Everything else returns a new
//! panel; `set_value` takes the panel by value and hands it back, expanded
//! when a coordinate was missing.

use std::fmt;

use frame::{Frame, Plane, Value};
use labels::{Index, Label};

use crate::array3::Values;
use crate::axis::{AxisName, AxisRef, AXIS_ORDER};
use crate::error::{PanelError, Result};
use crate::reindex::ReindexArgs;
use crate::store::ItemStore;

/// A labeled 3D container of one (major x minor) table per item.
#[derive(Debug, Clone)]
pub struct Panel {
    pub(crate) store: ItemStore,
}

/// Anything assignable to an item.
#[derive(Debug, Clone)]
pub enum ItemValue {
    /// Reindexed onto the panel's major/minor axes.
    Frame(Frame),
    /// Must already have shape (len(major), len(minor)).
    Plane(Plane),
    /// Broadcast over the whole plane.
    Scalar(Value),
}

impl From<Frame> for ItemValue {
    fn from(frame: Frame) -> Self {
        ItemValue::Frame(frame)
    }
}

impl From<Plane> for ItemValue {
    fn from(plane: Plane) -> Self {
        ItemValue::Plane(plane)
    }
}

impl From<Value> for ItemValue {
    fn from(value: Value) -> Self {
        ItemValue::Scalar(value)
    }
}

impl From<f64> for ItemValue {
    fn from(value: f64) -> Self {
        ItemValue::Scalar(Value::Number(value))
    }
}

/// Result of a (possibly partial) key lookup on the items axis.
#[derive(Debug, Clone)]
pub enum ItemSelection {
    Frame(Frame),
    Panel(Panel),
}

impl Panel {
    pub(crate) fn from_parts(store: ItemStore) -> Panel {
        Panel { store }
    }

    /// A panel with three empty axes.
    pub fn empty() -> Panel {
        Panel {
            store: ItemStore::empty(),
        }
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    // ========================================================================
    // AXES
    // ========================================================================

    pub fn items(&self) -> &Index {
        self.store.axis(AxisName::Items)
    }

    pub fn major_axis(&self) -> &Index {
        self.store.axis(AxisName::Major)
    }

    pub fn minor_axis(&self) -> &Index {
        self.store.axis(AxisName::Minor)
    }

    pub fn axis(&self, axis: AxisName) -> &Index {
        self.store.axis(axis)
    }

    /// Looks up an axis by any accepted spelling.
    pub fn get_axis(&self, axis: impl Into<AxisRef>) -> Result<&Index> {
        Ok(self.axis(AxisName::resolve(axis)?))
    }

    /// (len(items), len(major), len(minor)).
    pub fn shape(&self) -> [usize; 3] {
        self.store.shape()
    }

    pub fn is_empty(&self) -> bool {
        self.shape().iter().any(|&n| n == 0)
    }

    pub fn is_mixed_type(&self) -> bool {
        self.store.is_mixed_type()
    }

    /// Dense values of the whole panel, widened to a common kind.
    pub fn values(&self) -> Result<Values> {
        self.store.as_values()
    }

    // ========================================================================
    // ITEM ACCESS
    // ========================================================================

    /// Iterates over item labels.
    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.items().iter()
    }

    pub fn keys(&self) -> &Index {
        self.items()
    }

    pub fn contains(&self, item: &Label) -> bool {
        self.items().contains(item)
    }

    /// Iterates over (item label, table) pairs.
    pub fn iter_items(&self) -> impl Iterator<Item = Result<(&Label, Frame)>> + '_ {
        self.items()
            .iter()
            .enumerate()
            .map(move |(pos, label)| Ok((label, self.frame_at(pos)?)))
    }

    pub(crate) fn frame_at(&self, position: usize) -> Result<Frame> {
        let plane = self
            .store
            .plane(position)
            .ok_or_else(|| PanelError::KeyNotFound(position.to_string()))?;
        Ok(Frame::from_plane(
            self.major_axis().clone(),
            self.minor_axis().clone(),
            plane,
        )?)
    }

    /// The table stored for an item.
    pub fn item(&self, item: &Label) -> Result<Frame> {
        let pos = self
            .items()
            .get_loc(item)
            .ok_or_else(|| PanelError::KeyNotFound(item.to_string()))?;
        self.frame_at(pos)
    }

    pub fn get(&self, item: &Label) -> Option<Frame> {
        self.item(item).ok()
    }

    /// Key lookup on a hierarchical items axis. A full key returns the item's
    /// table; a partial key returns the sub-panel of matching items with the
    /// matched leading levels dropped.
    pub fn select(&self, key: &[Label]) -> Result<ItemSelection> {
        let items = self.items();
        if !items.is_hierarchical() {
            return match key {
                [single] => Ok(ItemSelection::Frame(self.item(single)?)),
                _ => Err(PanelError::KeyNotFound(Label::Tuple(key.to_vec()).to_string())),
            };
        }
        let positions = items.get_loc_partial(key);
        if positions.is_empty() {
            return Err(PanelError::KeyNotFound(Label::Tuple(key.to_vec()).to_string()));
        }
        if key.len() >= items.nlevels() {
            return Ok(ItemSelection::Frame(self.frame_at(positions[0])?));
        }
        let indexer: Vec<Option<usize>> = positions.iter().copied().map(Some).collect();
        let sub_items = items.take(&positions)?.droplevels(key.len())?;
        let store = self.store.reindex_axis(AxisName::Items, sub_items, &indexer)?;
        Ok(ItemSelection::Panel(Panel::from_parts(store)))
    }

    /// Assigns an item in place, replacing an existing item or appending a
    /// new one.
    pub fn set_item(&mut self, item: impl Into<Label>, value: impl Into<ItemValue>) -> Result<()> {
        let (rows, cols) = (self.major_axis().len(), self.minor_axis().len());
        let plane = match value.into() {
            ItemValue::Frame(frame) => frame
                .reindex(Some(self.major_axis()), Some(self.minor_axis()), None)?
                .values()?,
            ItemValue::Plane(plane) => {
                if plane.shape() != (rows, cols) {
                    return Err(PanelError::ShapeMismatch {
                        expected: (rows, cols),
                        got: plane.shape(),
                    });
                }
                plane
            }
            ItemValue::Scalar(value) => Plane::filled(&value, rows, cols)?,
        };
        self.store.set_item(item.into(), plane)
    }

    /// Removes an item in place and returns its table.
    pub fn pop(&mut self, item: &Label) -> Result<Frame> {
        let frame = self.item(item)?;
        self.store.delete(item)?;
        Ok(frame)
    }

    // ========================================================================
    // CELL ACCESS
    // ========================================================================

    fn locate(&self, item: &Label, major: &Label, minor: &Label) -> [Option<usize>; 3] {
        [
            self.items().get_loc(item),
            self.major_axis().get_loc(major),
            self.minor_axis().get_loc(minor),
        ]
    }

    /// The value at one (item, major, minor) coordinate.
    pub fn get_value(&self, item: &Label, major: &Label, minor: &Label) -> Result<Value> {
        let [i, j, k] = self.locate(item, major, minor);
        let missing = |label: &Label| PanelError::KeyNotFound(label.to_string());
        let plane = i
            .and_then(|i| self.store.plane(i))
            .ok_or_else(|| missing(item))?;
        let j = j.ok_or_else(|| missing(major))?;
        let k = k.ok_or_else(|| missing(minor))?;
        Ok(plane.get(j, k))
    }

    /// Sets one value. When any coordinate is absent its axis is extended by
    /// that label, the panel is reindexed onto the extended axes and a newly
    /// created item takes the value's element kind.
    pub fn set_value(
        mut self,
        item: impl Into<Label>,
        major: impl Into<Label>,
        minor: impl Into<Label>,
        value: impl Into<Value>,
    ) -> Result<Panel> {
        let (item, major, minor, value) = (item.into(), major.into(), minor.into(), value.into());
        if let [Some(i), Some(j), Some(k)] = self.locate(&item, &major, &minor) {
            self.store.set_cell([i, j, k], value)?;
            return Ok(self);
        }

        let expand = |index: &Index, label: &Label| -> Result<Index> {
            Ok(index.append_unique(&Index::new(vec![label.clone()])?))
        };
        let args = ReindexArgs::new()
            .items(expand(self.items(), &item)?)
            .major(expand(self.major_axis(), &major)?)
            .minor(expand(self.minor_axis(), &minor)?);
        let made_bigger = !self.items().contains(&item);
        let mut result = self.reindex(args)?;
        log::debug!(
            "[SETVALUE] expanded to {:?} for ({}, {}, {})",
            result.shape(),
            item,
            major,
            minor
        );

        if made_bigger && !value.is_missing() {
            if let Some(pos) = result.items().get_loc(&item) {
                result.store.cast_item(pos, value.dtype())?;
            }
        }
        result.set_value(item, major, minor, value)
    }
}

impl Default for Panel {
    fn default() -> Self {
        Panel::empty()
    }
}

// ============================================================================
// DISPLAY
// ============================================================================

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Panel")?;
        let dims: Vec<String> = AXIS_ORDER
            .iter()
            .map(|axis| format!("{} ({})", self.axis(*axis).len(), axis.name()))
            .collect();
        write!(f, "Dimensions: {}", dims.join(" x "))?;
        for axis in AXIS_ORDER {
            let name = axis.name();
            let title = format!("{}{}", name[..1].to_uppercase(), &name[1..]);
            let index = self.axis(axis);
            match (index.first(), index.last()) {
                (Some(first), Some(last)) => write!(f, "\n{} axis: {} to {}", title, first, last)?,
                _ => write!(f, "\n{} axis: None", title)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame::{Column, DType, Matrix};

    fn sample() -> Panel {
        let data = Values::Float(
            crate::array3::Array3::from_shape_vec(&[2, 2, 2], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0])
                .unwrap(),
        );
        Panel::from_array(
            data,
            crate::construct::PanelAxes::new()
                .items(Index::from_labels(["x", "y"]).unwrap())
                .minor(Index::from_labels(["a", "b"]).unwrap()),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_item_lookup() {
        let panel = sample();
        let x = panel.item(&Label::from("x")).unwrap();
        assert_eq!(x.get_value(&Label::from(1), &Label::from("a")).unwrap(), Value::Number(3.0));
        assert!(panel.get(&Label::from("q")).is_none());
        assert!(matches!(panel.item(&Label::from("q")), Err(PanelError::KeyNotFound(_))));
    }

    #[test]
    fn test_set_item_variants() {
        let mut panel = sample();
        panel.set_item("s", 9.0).unwrap();
        assert_eq!(panel.shape(), [3, 2, 2]);
        assert_eq!(
            panel.get_value(&Label::from("s"), &Label::from(1), &Label::from("b")).unwrap(),
            Value::Number(9.0)
        );

        let frame = Frame::from_columns(
            Index::from_labels([1, 5]).unwrap(),
            vec![("b", Column::from(vec![10.0, 11.0]))],
        )
        .unwrap();
        panel.set_item("x", frame).unwrap();
        let x = panel.item(&Label::from("x")).unwrap();
        assert_eq!(x.get_value(&Label::from(1), &Label::from("b")).unwrap(), Value::Number(10.0));
        assert!(x.get_value(&Label::from(0), &Label::from("a")).unwrap().is_missing());

        let wrong = Plane::Float(Matrix::missing(3, 2));
        assert!(matches!(panel.set_item("w", wrong), Err(PanelError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_pop_mutates() {
        let mut panel = sample();
        let y = panel.pop(&Label::from("y")).unwrap();
        assert_eq!(y.shape(), (2, 2));
        assert_eq!(panel.items().labels(), &[Label::from("x")]);
        assert!(panel.pop(&Label::from("y")).is_err());
    }

    #[test]
    fn test_set_value_hit_and_expand() {
        let panel = sample().set_value("x", 0, "a", 100.0).unwrap();
        assert_eq!(panel.shape(), [2, 2, 2]);
        assert_eq!(
            panel.get_value(&Label::from("x"), &Label::from(0), &Label::from("a")).unwrap(),
            Value::Number(100.0)
        );

        let grown = panel.set_value("z", 2, "a", "hello").unwrap();
        assert_eq!(grown.shape(), [3, 3, 2]);
        assert_eq!(
            grown.get_value(&Label::from("z"), &Label::from(2), &Label::from("a")).unwrap(),
            Value::from("hello")
        );
        let z = grown.store().plane(2).unwrap();
        assert_eq!(z.dtype(), DType::Text);
        assert!(grown
            .get_value(&Label::from("x"), &Label::from(2), &Label::from("b"))
            .unwrap()
            .is_missing());
    }

    #[test]
    fn test_display() {
        let text = sample().to_string();
        assert_eq!(
            text,
            "Panel\nDimensions: 2 (items) x 2 (major_axis) x 2 (minor_axis)\n\
             Items axis: x to y\nMajor_axis axis: 0 to 1\nMinor_axis axis: a to b"
        );
        let empty = Panel::empty().to_string();
        assert!(empty.ends_with("Minor_axis axis: None"));
    }

    #[test]
    fn test_select_partial_key() {
        let items = Index::from_tuples(
            vec![
                vec![Label::from("a"), Label::from(1)],
                vec![Label::from("a"), Label::from(2)],
                vec![Label::from("b"), Label::from(1)],
            ],
            [Some("outer".to_string()), Some("inner".to_string())],
        )
        .unwrap();
        let data = Values::missing(DType::Float, [3, 1, 1]);
        let panel =
            Panel::from_array(data, crate::construct::PanelAxes::new().items(items), None).unwrap();

        match panel.select(&[Label::from("a")]).unwrap() {
            ItemSelection::Panel(sub) => {
                assert_eq!(sub.items().labels(), &[Label::from(1), Label::from(2)]);
                assert_eq!(sub.items().name(), Some("inner"));
            }
            ItemSelection::Frame(_) => panic!("expected a sub-panel"),
        }
        assert!(matches!(
            panel.select(&[Label::from("b"), Label::from(1)]).unwrap(),
            ItemSelection::Frame(_)
        ));
        assert!(panel.select(&[Label::from("c")]).is_err());
    }

    #[test]
    fn test_select_after_set_item_on_hierarchical_items() {
        let items = Index::from_tuples(
            vec![
                vec![Label::from("a"), Label::from(1)],
                vec![Label::from("a"), Label::from(2)],
                vec![Label::from("b"), Label::from(1)],
            ],
            [Some("outer".to_string()), Some("inner".to_string())],
        )
        .unwrap();
        let data = Values::missing(DType::Float, [3, 1, 1]);
        let mut panel =
            Panel::from_array(data, crate::construct::PanelAxes::new().items(items), None).unwrap();

        panel.set_item(("c", 1), 1.0).unwrap();
        assert!(panel.items().is_hierarchical());
        match panel.select(&[Label::from("a")]).unwrap() {
            ItemSelection::Panel(sub) => assert_eq!(sub.items().len(), 2),
            ItemSelection::Frame(_) => panic!("expected a sub-panel"),
        }
        match panel.select(&[Label::from("c"), Label::from(1)]).unwrap() {
            ItemSelection::Frame(frame) => {
                assert_eq!(frame.get_value(&Label::from(0), &Label::from(0)).unwrap(), Value::Number(1.0))
            }
            ItemSelection::Panel(_) => panic!("expected a table"),
        }
    }
}

