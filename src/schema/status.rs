//! Native status codes (`nvmlReturn_t`)
//!
//! Each native call returns one of these. Anything else is still a valid
//! status and is preserved by [`crate::error::NvmlError::Vendor`].

pub const SUCCESS: u32 = 0;
pub const UNINITIALIZED: u32 = 1;
pub const INVALID_ARGUMENT: u32 = 2;
pub const NOT_SUPPORTED: u32 = 3;
pub const NO_PERMISSION: u32 = 4;
pub const ALREADY_INITIALIZED: u32 = 5;
pub const NOT_FOUND: u32 = 6;
pub const INSUFFICIENT_SIZE: u32 = 7;
pub const INSUFFICIENT_POWER: u32 = 8;
pub const DRIVER_NOT_LOADED: u32 = 9;
pub const TIMEOUT: u32 = 10;
pub const IRQ_ISSUE: u32 = 11;
pub const LIBRARY_NOT_FOUND: u32 = 12;
pub const FUNCTION_NOT_FOUND: u32 = 13;
pub const CORRUPTED_INFOROM: u32 = 14;
pub const GPU_IS_LOST: u32 = 15;
pub const RESET_REQUIRED: u32 = 16;
pub const OPERATING_SYSTEM: u32 = 17;
pub const LIB_RM_VERSION_MISMATCH: u32 = 18;
pub const IN_USE: u32 = 19;
pub const MEMORY: u32 = 20;
pub const NO_DATA: u32 = 21;
pub const VGPU_ECC_NOT_SUPPORTED: u32 = 22;
pub const INSUFFICIENT_RESOURCES: u32 = 23;
pub const FREQ_NOT_SUPPORTED: u32 = 24;
pub const ARGUMENT_VERSION_MISMATCH: u32 = 25;
pub const DEPRECATED: u32 = 26;
pub const NOT_READY: u32 = 27;
pub const GPU_NOT_FOUND: u32 = 28;
pub const INVALID_STATE: u32 = 29;
pub const UNKNOWN: u32 = 999;
