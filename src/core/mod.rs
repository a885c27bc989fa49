//! Core types and constants for the tracking session

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
