//! FILENAME: panel/src/lib.rs
//! Labeled three-dimensional containers.
//!
//! A `Panel` holds one (major x minor) table per item. It is built on the
//! `labels` axis structures and the `frame` 2D tables.
//!
//! Layers:
//! - `axis`: axis names, aliases and plane orientation
//! - `array3`: dense 3D buffers (`Array3<T>`, kind-tagged `Values`)
//! - `store`: per-item plane storage with a derived block consolidation
//! - `panel`: the container, item access and display
//! - `construct`, `reindex`, `select`, `ops`, `reduce`, `reshape`, `join`,
//!   `groupby`: operations on panels
//! - `config`, `snapshot`: serializable options and JSON snapshots

pub mod array3;
pub mod axis;
pub mod config;
pub mod construct;
pub mod error;
pub mod groupby;
pub mod join;
pub mod ops;
pub mod panel;
pub mod reduce;
pub mod reindex;
pub mod reshape;
pub mod select;
pub mod snapshot;
pub mod store;

pub use array3::{Array3, Values};
pub use axis::{AxisName, AxisRef, SliceRole, AXIS_ORDER};
pub use config::{Orient, PanelOptions};
pub use construct::{PanelAxes, PanelEntry};
pub use error::{PanelError, Result};
pub use groupby::PanelGroupBy;
pub use ops::{BinaryOp, Operand};
pub use panel::{ItemSelection, ItemValue, Panel};
pub use reindex::ReindexArgs;
pub use reshape::panel_index;
pub use select::DropHow;
pub use snapshot::{PanelSnapshot, SnapshotPlane, SNAPSHOT_VERSION};
pub use store::{Block, ItemStore};

pub use frame::{DType, Frame, ReduceOp, Value};
pub use labels::{FillMethod, Index, JoinHow, Label};
