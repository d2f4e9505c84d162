//! Re-exports of performance-oriented collection types.

pub use rustc_hash::FxHashMap;
pub use smallvec::SmallVec;

/// SmallVec for name lookups that almost always resolve to one record.
pub type SmallVec1<T> = SmallVec<[T; 1]>;

/// SmallVec sized for decorator argument lists and class nesting (usually <=2).
pub type SmallVec2<T> = SmallVec<[T; 2]>;
