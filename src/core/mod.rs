//! Core constants and error types shared by all layers.

pub mod constants;
mod error;

pub use error::*;
