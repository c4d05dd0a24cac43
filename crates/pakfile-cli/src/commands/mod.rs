//! Command implementations.

pub mod cat;
pub mod create;
pub mod dupes;
pub mod extract;
pub mod list;
