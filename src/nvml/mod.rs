//! Safe facade over the native layer
//!
//! [`Nvml`] owns a session, [`Device`] borrows it. Every operation checks the
//! native status and returns owned Rust values or a typed [`NvmlError`].
//!
//! [`NvmlError`]: crate::error::NvmlError

mod control;
pub mod device;
pub mod marshal;
pub mod session;

pub use device::Device;
pub use marshal::{check, decode_text};
pub use session::{InitMode, Nvml, ShutdownError};
