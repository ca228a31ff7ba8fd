//! shelf application library
//!
//! The library book catalog module plus the bootstrap that wires it to the
//! kernel, storage and HTTP server.

pub mod bootstrap;
pub mod modules;

/// Re-export commonly used types
pub use modules::*;
