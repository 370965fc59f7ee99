//! FILENAME: frame/src/lib.rs
//! Two-dimensional labeled tables.
//!
//! Layers:
//! - `value`: cell `Value`, element kinds (`DType`) and the `Element` trait
//! - `column`: typed column storage and gather/fill helpers
//! - `matrix`: dense `Matrix<T>` buffers and the kind-tagged `Plane`
//! - `frame`: the `Frame` table (reindex, get/set value, update, fill)
//! - `nanops`: NA-skipping reduction kernels

pub mod column;
pub mod error;
pub mod frame;
pub mod matrix;
pub mod nanops;
pub mod value;

pub use column::{take_vec, Column};
pub use error::FrameError;
pub use frame::Frame;
pub use matrix::{Matrix, Plane};
pub use nanops::ReduceOp;
pub use value::{DType, Element, Value};
