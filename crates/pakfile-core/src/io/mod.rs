//! I/O adapters used while writing archives.

pub mod position;

pub use position::PositionWriter;
