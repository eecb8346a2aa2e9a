//! JSON-backed values
//!
//! - [`wrapper`] - The value cell with typed access and dirty tracking
//! - [`fields`] - Per-kind accessor tables
//! - [`factory`] - Element factories for list and nested fields

pub mod factory;
pub mod fields;
pub mod wrapper;

pub use factory::{ElementFactory, StringFactory, WrapperFactory};
pub use fields::{FieldKind, FieldSpec};
pub use wrapper::JsonWrapper;
