//! Core types for Tafel: random tables, their entries, and roll templates.
//!
//! This crate owns the data model and the two pieces of invariant-bearing
//! logic that do not need storage: selecting an entry from a table
//! ([`RandomTable::roll`]) and scanning template strings for
//! `{{title::tableId::tableName::rollCount::separator}}` references
//! ([`RollTemplate`]). Recursive resolution lives in `tafel-engine`.

/// Table entries and partial entry updates.
pub mod entry;
/// Error types used throughout the crate.
pub mod error;
/// Uniform random sources consumed by the roll algorithm.
pub mod random;
/// Closed integer ranges used by ranged tables.
pub mod range;
/// Parsed `{{...}}` references.
pub mod reference;
/// Outcome of a single roll.
pub mod roll;
/// The random table aggregate and its selection algorithm.
pub mod table;
/// Template strings and persisted templates.
pub mod template;

/// Re-export entry types.
pub use entry::{EntryPatch, TableEntry};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export random source types.
pub use random::{RandomSource, SeededRandom, SequenceRandom};
/// Re-export the range value type.
pub use range::Range;
/// Re-export the reference value type.
pub use reference::TemplateReference;
/// Re-export the roll outcome.
pub use roll::RollResult;
/// Re-export the table aggregate.
pub use table::RandomTable;
/// Re-export template types.
pub use template::{MAX_RESOLUTION_DEPTH, RollTemplate, SavedTemplate};
