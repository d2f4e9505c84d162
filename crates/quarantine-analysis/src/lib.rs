//! quarantine-analysis: the quarantine marker engine.
//!
//! Data flows one way: `parsers` → `discovery` → `classifier` → `scanner`,
//! with `aggregator` and `reconciler` consuming the scanner's inventory
//! read-only. `mutator` is the only component that writes to disk.

pub mod aggregator;
pub mod classifier;
pub mod dates;
pub mod discovery;
pub mod edit;
pub mod marker;
pub mod mutator;
pub mod parsers;
pub mod reconciler;
pub mod scanner;
pub mod signals;

pub use aggregator::{aggregate, Aggregation, TeamStat};
pub use classifier::{TeamResolver, TestRecord, TestStatus};
pub use marker::MarkerGrammar;
pub use mutator::Mutator;
pub use parsers::SourceTree;
pub use reconciler::{CandidateSet, Reconciler};
pub use scanner::{ScanReport, Scanner};
