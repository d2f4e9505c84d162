//! Marker grammar: the textual shape of a quarantine marker and the
//! metadata encoded in its reason string.

pub mod grammar;
pub mod literal;
pub mod types;

pub use grammar::MarkerGrammar;
pub use types::{Marker, ParsedReason};
