//! Shared utilities for the particle-sim CLI

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
