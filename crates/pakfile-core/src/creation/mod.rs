//! Archive creation.
//!
//! A source tree is walked in sorted order and written as one contiguous
//! body followed by the directory table. Validation failures abort the whole
//! run.

pub mod creator;
pub mod report;
pub mod walker;
pub mod writer;

pub use creator::create_pak;
pub use creator::create_pak_from;
pub use report::CreationReport;
pub use walker::SourceFile;
pub use walker::SourceWalker;
pub use writer::PakWriter;
