//! File adapters around the core: project loading and report export.

pub mod export;
pub mod input;
pub mod output;
