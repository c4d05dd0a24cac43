//! Reading, writing and comparing PAK game-asset archives.
//!
//! A PAK archive is a 12-byte header, the raw bytes of every file, and a
//! table of fixed 64-byte records naming each file's path, offset and size.
//! `pakfile-core` lists and streams archives, extracts them with per-entry
//! conflict handling, builds them from directory trees, and finds paths that
//! one numbered archive shadows in another.
//!
//! # Examples
//!
//! ```no_run
//! use pakfile_core::PakConfig;
//! use pakfile_core::find_duplicates;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PakConfig::default().with_case_fold(true);
//! for record in find_duplicates(&["quake/id1", "quake/hipnotic"], &config)? {
//!     println!("{record}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archive;
pub mod config;
pub mod copy;
pub mod creation;
pub mod duplicates;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod io;
pub mod report;

#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use api::create;
pub use api::extract;
pub use api::find_duplicates;
pub use api::list;
pub use api::stream_to;
pub use archive::PakArchive;
pub use config::PakConfig;
pub use config::PathFilter;
pub use creation::CreationReport;
pub use duplicates::DuplicateOwner;
pub use duplicates::DuplicateRecord;
pub use error::ConflictKind;
pub use error::PakError;
pub use error::Result;
pub use extraction::ConflictDecision;
pub use extraction::OverwritePrompt;
pub use formats::ArchiveHeader;
pub use formats::DirectoryEntry;
pub use report::EntryOutcome;
pub use report::EntryRecord;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
