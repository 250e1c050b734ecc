//! Buffer capacities and scalar constants
//!
//! Text queries hand NVML a buffer of exactly one of these sizes. The values
//! match the `NVML_*_BUFFER_SIZE` macros of the vendor header.

pub const INFOROM_VERSION: u32 = 16;
pub const UUID: u32 = 80;
pub const UUID_V2: u32 = 96;
pub const BOARD_PART_NUMBER: u32 = 80;
pub const SYSTEM_DRIVER_VERSION: u32 = 80;
pub const SYSTEM_NVML_VERSION: u32 = 80;
pub const DEVICE_NAME: u32 = 64;
pub const DEVICE_NAME_V2: u32 = 96;
pub const SERIAL: u32 = 30;
pub const VBIOS_VERSION: u32 = 32;

/// `nvmlPciInfo_t::busId`
pub const PCI_BUS_ID: usize = 32;
/// `nvmlPciInfo_t::busIdLegacy`
pub const PCI_BUS_ID_LEGACY: usize = 16;

/// Default capacity for `nvmlSystemGetProcessName`. NVML takes any length.
pub const PROCESS_NAME: u32 = 256;

/// Upper bound on bridge chips in a hierarchy
pub const MAX_PHYSICAL_BRIDGE: usize = 128;
/// Upper bound on clock domains reported by the clock monitor
pub const MAX_CLK_DOMAINS: usize = 32;

/// The CUDA driver version is reported as `major * 1000 + minor * 10`.
pub const CUDA_VERSION_SCALE: i32 = 1000;

/// Sentinel for "value not available" in 64-bit memory fields.
pub const VALUE_NOT_AVAILABLE_U64: u64 = u64::MAX;
/// Sentinel for "value not available" in 32-bit id fields.
pub const VALUE_NOT_AVAILABLE_U32: u32 = u32::MAX;
