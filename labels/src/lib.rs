//! FILENAME: labels/src/lib.rs
//! Axis label sets for labeled containers.
//!
//! This crate provides the ordered label structures shared by `frame` (2D tables)
//! and `panel` (3D containers):
//! - `label`: the hashable scalar `Label` and `OrderedFloat`
//! - `index`: `Index`, a unique ordered label sequence with fast lookup
//! - `multi`: hierarchical (tuple-labeled) index construction and partial keys
//! - `indexer`: indexers with fill methods, join rules and index combination

pub mod error;
pub mod index;
pub mod indexer;
pub mod label;
pub mod multi;

pub use error::IndexError;
pub use index::{Index, LevelNames};
pub use indexer::{combine_indexes, is_identity, FillMethod, Indexer, JoinHow};
pub use label::{Label, OrderedFloat};
