//! Archive extraction.
//!
//! Each selected entry is checked against the destination tree and ends in
//! exactly one outcome: extracted, overwrote, skipped or error. Destination
//! conflicts and unsafe entry paths are per-entry errors; the run continues
//! past them.

mod conflict;
mod engine;
mod path;

pub use conflict::ConflictDecision;
pub use conflict::Destination;
pub use conflict::OverwritePrompt;
pub use conflict::PlannedTree;
pub use conflict::ReaderPrompt;
pub use conflict::inspect;
pub use conflict::resolve_overwrite;
pub use engine::Extractor;
pub use path::destination_for;
