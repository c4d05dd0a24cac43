//! Finding paths that one archive shadows in another.
//!
//! Numbered archives (`pak0.pak`, `pak1.pak`, …) load in ascending order, so
//! a higher-numbered archive overrides the same path in a lower one. Search
//! locations are ranked in the order given, the first location taking
//! precedence.

mod discovery;
mod finder;

pub use discovery::discover_archives;
pub use discovery::load_order;
pub use finder::DuplicateOwner;
pub use finder::DuplicateRecord;
pub use finder::entry_checksum;
pub use finder::find_duplicates;
