//! Unified error types.
//!
//! Every layer of the reader (container, stream, record parser and query
//! API) reports failures through the single [`Error`] enum so that callers
//! match on one type.

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{Error, Result};
