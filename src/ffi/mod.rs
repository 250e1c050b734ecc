//! Native call layer
//!
//! A one-to-one mirror of the NVML C ABI. Nothing in this module checks
//! statuses or decodes buffers; see [`crate::nvml`] for that.

pub mod loader;
pub mod symbols;
pub mod types;

pub use loader::{library_candidates, NativeLibrary};
pub use symbols::NativeSymbols;
