//! CLI command implementations

pub mod exists;
pub mod parse;
