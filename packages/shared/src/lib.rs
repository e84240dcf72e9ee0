//! Utilities shared by the Hiroba server binary and its tests.

pub mod logger;
pub mod time;
