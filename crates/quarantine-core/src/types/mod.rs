//! Collection aliases shared across the workspace.

pub mod collections;

pub use collections::{FxHashMap, SmallVec, SmallVec1, SmallVec2};
