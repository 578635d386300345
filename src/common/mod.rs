//! Shared infrastructure used across the reader.

pub mod error;

pub use error::{Error, Result};
