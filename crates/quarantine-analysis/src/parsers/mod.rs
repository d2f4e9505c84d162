//! Tree-sitter Python parser: lossless parse/serialize over owned source text.

pub mod error_tolerant;
pub mod python;
pub mod types;

pub use python::SourceTree;
pub use types::{ByteSpan, DecoratorArgument, DecoratorInfo, Position, Range};
