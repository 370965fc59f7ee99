//! FILENAME: panel/src/construct.rs
//! PURPOSE: Builds panels from table mappings, dense arrays and existing stores.
//! CONTEXT: Mapping construction resolves the three axes first (items from the
//! keys, major/minor from the union or intersection of the tables' axes), then
//! conforms every table onto the resolved (major, minor) pair. Raw planes in a
//! mapping take part in axis resolution only through their extents.

use std::collections::BTreeMap;

use frame::{Column, DType, Frame, Plane};
use labels::{combine_indexes, Index, Label};

use crate::array3::{Array3, Values};
use crate::axis::AxisName;
use crate::config::{Orient, PanelOptions};
use crate::error::{PanelError, Result};
use crate::panel::Panel;
use crate::store::ItemStore;

/// One value of a panel mapping.
#[derive(Debug, Clone)]
pub enum PanelEntry {
    Frame(Frame),
    /// A raw (major x minor) buffer without labels.
    Plane(Plane),
}

impl From<Frame> for PanelEntry {
    fn from(frame: Frame) -> Self {
        PanelEntry::Frame(frame)
    }
}

impl From<Plane> for PanelEntry {
    fn from(plane: Plane) -> Self {
        PanelEntry::Plane(plane)
    }
}

/// Caller-supplied axes; `None` means infer.
#[derive(Debug, Clone, Default)]
pub struct PanelAxes {
    pub items: Option<Index>,
    pub major: Option<Index>,
    pub minor: Option<Index>,
}

impl PanelAxes {
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

    fn get(&self, axis: AxisName) -> Option<&Index> {
        match axis {
            AxisName::Items => self.items.as_ref(),
            AxisName::Major => self.major.as_ref(),
            AxisName::Minor => self.minor.as_ref(),
        }
    }
}

fn cast_plane(plane: &Plane, dtype: Option<DType>) -> Result<Plane> {
    match dtype {
        Some(dtype) => plane
            .cast(dtype)
            .map_err(|e| PanelError::CastFailed(format!("{}: {}", dtype, e))),
        None => Ok(plane.clone()),
    }
}

impl Panel {
    /// Builds a panel over a dense array. Missing axes default to `0..n-1`;
    /// supplied axes must match the array's extents.
    pub fn from_array(values: Values, axes: PanelAxes, dtype: Option<DType>) -> Result<Panel> {
        let shape = values.shape();
        let resolved: Vec<Index> = crate::axis::AXIS_ORDER
            .iter()
            .map(|axis| {
                let n = shape[axis.position()];
                match axes.get(*axis) {
                    Some(index) if index.len() != n => Err(PanelError::AxisLengthMismatch {
                        axis: axis.to_string(),
                        expected: n,
                        got: index.len(),
                    }),
                    Some(index) => Ok(index.clone()),
                    None => Ok(Index::range(n)),
                }
            })
            .collect::<Result<_>>()?;
        let values = match dtype {
            Some(dtype) => values
                .cast(dtype)
                .map_err(|e| PanelError::CastFailed(format!("{}: {}", dtype, e)))?,
            None => values,
        };
        let [items, major, minor]: [Index; 3] = resolved
            .try_into()
            .map_err(|_| PanelError::InvalidDimensions(shape.len()))?;
        let store = ItemStore::from_values([items, major, minor], &values)?;
        log::debug!("[CONSTRUCT] from array shape={:?} dtype={}", shape, values.dtype());
        Ok(Panel::from_parts(store))
    }

    /// Builds a float panel from a flat buffer and a shape of exactly three
    /// extents.
    pub fn from_shape_vec(shape: &[usize], data: Vec<f64>, axes: PanelAxes) -> Result<Panel> {
        let array = Array3::from_shape_vec(shape, data)?;
        Panel::from_array(Values::Float(array), axes, None)
    }

    /// Wraps an existing store. Each supplied axis overrides the store's own
    /// by reindexing onto it.
    pub fn from_store(store: ItemStore, axes: PanelAxes) -> Result<Panel> {
        let mut store = store;
        for axis in crate::axis::AXIS_ORDER {
            if let Some(target) = axes.get(axis) {
                let current = store.axis(axis);
                if !current.equals(target) {
                    let indexer = current.get_indexer(target, None)?;
                    store = store.reindex_axis(axis, target.clone(), &indexer)?;
                }
            }
        }
        Ok(Panel::from_parts(store))
    }

    /// Builds a panel from a mapping of item label to table or raw plane.
    ///
    /// Items default to the sorted keys; when supplied, keys outside them are
    /// dropped and items without an entry become all-missing planes. Major
    /// and minor default to the union (or intersection, with
    /// `options.intersect`) of the tables' axes.
    pub fn from_mapping(
        data: BTreeMap<Label, PanelEntry>,
        axes: PanelAxes,
        options: &PanelOptions,
    ) -> Result<Panel> {
        let items = match axes.items {
            Some(items) => items,
            None => Index::new(data.keys().cloned().collect())?,
        };
        let data: BTreeMap<Label, PanelEntry> = data
            .into_iter()
            .filter(|(key, _)| items.contains(key))
            .collect();

        let frames: Vec<&Frame> = data
            .values()
            .filter_map(|entry| match entry {
                PanelEntry::Frame(frame) => Some(frame),
                PanelEntry::Plane(_) => None,
            })
            .collect();
        let raw_shape = raw_plane_shape(&data)?;

        let major = match axes.major {
            Some(major) => major,
            None => extract_axis(&frames, raw_shape.map(|s| s.0), options.intersect, Frame::index),
        };
        let minor = match axes.minor {
            Some(minor) => minor,
            None => extract_axis(&frames, raw_shape.map(|s| s.1), options.intersect, Frame::columns),
        };
        if let Some((rows, cols)) = raw_shape {
            if rows != major.len() {
                return Err(PanelError::AxisLengthMismatch {
                    axis: AxisName::Major.to_string(),
                    expected: major.len(),
                    got: rows,
                });
            }
            if cols != minor.len() {
                return Err(PanelError::AxisLengthMismatch {
                    axis: AxisName::Minor.to_string(),
                    expected: minor.len(),
                    got: cols,
                });
            }
        }

        let planes = items
            .iter()
            .map(|item| -> Result<Plane> {
                let plane = match data.get(item) {
                    Some(PanelEntry::Frame(frame)) => {
                        log::trace!("[CONSTRUCT] conforming item {}", item);
                        frame.reindex(Some(&major), Some(&minor), None)?.values()?
                    }
                    Some(PanelEntry::Plane(plane)) => plane.clone(),
                    None => Plane::missing(DType::Float, major.len(), minor.len()),
                };
                cast_plane(&plane, options.dtype)
            })
            .collect::<Result<Vec<_>>>()?;

        let store = ItemStore::new([items, major, minor], planes)?;
        let blocks = store.consolidate()?.len();
        log::debug!(
            "[CONSTRUCT] from mapping shape={:?} blocks={}",
            store.shape(),
            blocks
        );
        Ok(Panel::from_parts(store))
    }

    /// Builds a panel from a mapping of tables, driven by `options`. With
    /// `Orient::Minor` the tables' columns become the items and the mapping
    /// keys become the minor axis.
    pub fn from_dict(data: BTreeMap<Label, Frame>, options: &PanelOptions) -> Result<Panel> {
        let data = match options.orient {
            Orient::Items => data,
            Orient::Minor => regroup_by_column(data)?,
        };
        let entries = data
            .into_iter()
            .map(|(key, frame)| (key, PanelEntry::Frame(frame)))
            .collect();
        Panel::from_mapping(entries, PanelAxes::default(), options)
    }

    /// Convenience over `from_dict` with default options.
    pub fn from_frames<L, I>(frames: I) -> Result<Panel>
    where
        L: Into<Label>,
        I: IntoIterator<Item = (L, Frame)>,
    {
        let data = frames.into_iter().map(|(l, f)| (l.into(), f)).collect();
        Panel::from_dict(data, &PanelOptions::default())
    }
}

/// Common (rows, cols) of the raw planes in a mapping, if any.
fn raw_plane_shape(data: &BTreeMap<Label, PanelEntry>) -> Result<Option<(usize, usize)>> {
    let mut shape: Option<(usize, usize)> = None;
    for entry in data.values() {
        let PanelEntry::Plane(plane) = entry else {
            continue;
        };
        let (rows, cols) = plane.shape();
        match shape {
            None => shape = Some((rows, cols)),
            Some((r, _)) if r != rows => {
                return Err(PanelError::LengthMismatch(AxisName::Major.to_string()))
            }
            Some((_, c)) if c != cols => {
                return Err(PanelError::LengthMismatch(AxisName::Minor.to_string()))
            }
            Some(_) => {}
        }
    }
    Ok(shape)
}

/// Resolves one of the major/minor axes from the tables, falling back to a
/// range over the raw planes' extent.
fn extract_axis(
    frames: &[&Frame],
    raw_len: Option<usize>,
    intersect: bool,
    axis_of: fn(&Frame) -> &Index,
) -> Index {
    if frames.is_empty() {
        return Index::range(raw_len.unwrap_or(0));
    }
    let indexes: Vec<&Index> = frames.iter().map(|f| axis_of(f)).collect();
    combine_indexes(&indexes, intersect)
}

/// `{key: table}` to `{column: table keyed by the original keys}`. Each new
/// table is indexed by the union of the input tables' indexes.
fn regroup_by_column(data: BTreeMap<Label, Frame>) -> Result<BTreeMap<Label, Frame>> {
    let indexes: Vec<&Index> = data.values().map(Frame::index).collect();
    let index = combine_indexes(&indexes, false);

    let mut grouped: BTreeMap<Label, Vec<(Label, Column)>> = BTreeMap::new();
    for (key, frame) in &data {
        let indexer = frame.index().get_indexer(&index, None)?;
        for (column_label, column) in frame.iter_columns() {
            grouped
                .entry(column_label.clone())
                .or_default()
                .push((key.clone(), column.take(&indexer)));
        }
    }
    grouped
        .into_iter()
        .map(|(column_label, columns)| -> Result<(Label, Frame)> {
            Ok((column_label, Frame::from_columns(index.clone(), columns)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame::{Matrix, Value};

    fn table(index: &[i64], columns: &[(&str, Vec<f64>)]) -> Frame {
        Frame::from_columns(
            Index::from_labels(index.iter().copied()).unwrap(),
            columns
                .iter()
                .map(|(name, values)| (*name, Column::from(values.clone())))
                .collect(),
        )
        .unwrap()
    }

    fn raw(rows: usize, cols: usize) -> PanelEntry {
        PanelEntry::Plane(Plane::Float(Matrix::filled(rows, cols, 1.0)))
    }

    #[test]
    fn test_from_array_defaults_and_checks() {
        let panel = Panel::from_shape_vec(&[2, 3, 4], vec![0.0; 24], PanelAxes::new()).unwrap();
        assert_eq!(panel.shape(), [2, 3, 4]);
        assert_eq!(panel.major_axis().labels(), Index::range(3).labels());

        let err = Panel::from_shape_vec(&[2, 12], vec![0.0; 24], PanelAxes::new()).unwrap_err();
        assert!(matches!(err, PanelError::InvalidDimensions(2)));

        let bad_axes = PanelAxes::new().items(Index::from_labels(["a"]).unwrap());
        let err = Panel::from_shape_vec(&[2, 3, 4], vec![0.0; 24], bad_axes).unwrap_err();
        assert!(matches!(err, PanelError::AxisLengthMismatch { .. }));
    }

    #[test]
    fn test_from_array_cast_failure() {
        let text = Values::Text(Array3::filled([1, 1, 1], Some("abc".to_string())));
        let err = Panel::from_array(text, PanelAxes::new(), Some(DType::Float)).unwrap_err();
        assert!(matches!(err, PanelError::CastFailed(_)));
    }

    #[test]
    fn test_from_mapping_union_and_intersect() {
        let mut data = BTreeMap::new();
        data.insert(Label::from("b"), PanelEntry::from(table(&[0, 1], &[("a", vec![1.0, 2.0])])));
        data.insert(Label::from("a"), PanelEntry::from(table(&[1, 2], &[("c", vec![3.0, 4.0])])));

        let union = Panel::from_mapping(data.clone(), PanelAxes::new(), &PanelOptions::default()).unwrap();
        assert_eq!(union.items().labels(), &[Label::from("a"), Label::from("b")]);
        assert_eq!(union.shape(), [2, 3, 2]);

        let options = PanelOptions::new().intersect(true);
        let inter = Panel::from_mapping(data, PanelAxes::new(), &options).unwrap();
        assert_eq!(inter.major_axis().labels(), &[Label::from(1)]);
        assert!(inter.minor_axis().is_empty());
    }

    #[test]
    fn test_supplied_items_drop_and_fill() {
        let mut data = BTreeMap::new();
        data.insert(Label::from("x"), PanelEntry::from(table(&[0], &[("a", vec![1.0])])));
        data.insert(Label::from("y"), PanelEntry::from(table(&[0], &[("a", vec![2.0])])));
        let axes = PanelAxes::new().items(Index::from_labels(["y", "z"]).unwrap());
        let panel = Panel::from_mapping(data, axes, &PanelOptions::default()).unwrap();
        assert_eq!(panel.items().labels(), &[Label::from("y"), Label::from("z")]);
        assert!(panel
            .get_value(&Label::from("z"), &Label::from(0), &Label::from("a"))
            .unwrap()
            .is_missing());
    }

    #[test]
    fn test_raw_planes_must_agree() {
        let mut data = BTreeMap::new();
        data.insert(Label::from("x"), raw(2, 3));
        data.insert(Label::from("y"), raw(2, 4));
        let err = Panel::from_mapping(data, PanelAxes::new(), &PanelOptions::default()).unwrap_err();
        assert!(matches!(err, PanelError::LengthMismatch(_)));

        let mut data = BTreeMap::new();
        data.insert(Label::from("x"), raw(2, 1));
        data.insert(Label::from("y"), PanelEntry::from(table(&[0, 1, 2], &[("a", vec![1.0, 2.0, 3.0])])));
        let err = Panel::from_mapping(data, PanelAxes::new(), &PanelOptions::default()).unwrap_err();
        assert!(matches!(err, PanelError::AxisLengthMismatch { .. }));

        let mut data = BTreeMap::new();
        data.insert(Label::from("x"), raw(2, 3));
        let panel = Panel::from_mapping(data, PanelAxes::new(), &PanelOptions::default()).unwrap();
        assert_eq!(panel.shape(), [1, 2, 3]);
    }

    #[test]
    fn test_from_dict_orient_minor() {
        let mut data = BTreeMap::new();
        data.insert(Label::from("k1"), table(&[0, 1], &[("a", vec![1.0, 2.0]), ("b", vec![3.0, 4.0])]));
        data.insert(Label::from("k2"), table(&[1, 2], &[("a", vec![5.0, 6.0])]));
        let options = PanelOptions::new().orient(Orient::Minor);
        let panel = Panel::from_dict(data, &options).unwrap();
        assert_eq!(panel.items().labels(), &[Label::from("a"), Label::from("b")]);
        assert_eq!(panel.minor_axis().labels(), &[Label::from("k1"), Label::from("k2")]);
        assert_eq!(
            panel.get_value(&Label::from("a"), &Label::from(2), &Label::from("k2")).unwrap(),
            Value::Number(6.0)
        );
        assert!(panel
            .get_value(&Label::from("b"), &Label::from(0), &Label::from("k2"))
            .unwrap()
            .is_missing());
    }

    #[test]
    fn test_from_store_overrides_axis() {
        let panel = Panel::from_shape_vec(&[1, 2, 2], vec![1.0, 2.0, 3.0, 4.0], PanelAxes::new()).unwrap();
        let axes = PanelAxes::new().major(Index::from_labels([1, 5]).unwrap());
        let rebuilt = Panel::from_store(panel.store().clone(), axes).unwrap();
        assert_eq!(rebuilt.major_axis().labels(), &[Label::from(1), Label::from(5)]);
        assert_eq!(
            rebuilt.get_value(&Label::from(0), &Label::from(1), &Label::from(0)).unwrap(),
            Value::Number(3.0)
        );
    }

    #[test]
    fn test_forced_dtype() {
        let mut data = BTreeMap::new();
        data.insert(Label::from("x"), PanelEntry::from(table(&[0], &[("a", vec![1.0])])));
        let options = PanelOptions::new().dtype(DType::Object);
        let panel = Panel::from_mapping(data, PanelAxes::new(), &options).unwrap();
        assert_eq!(panel.store().dtypes(), vec![DType::Object]);
    }
}
