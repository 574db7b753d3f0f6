//! Command implementations

pub mod kinds;
pub mod run;
pub mod scene;
