//! Domain models for nvbind
//!
//! Owned values produced by the facade from native records, plus the
//! validated input types (fan speed, power limit) used by setters.

pub mod fan;
pub mod gpu;
pub mod memory;
pub mod performance;
pub mod power;
pub mod process;
pub mod video;

pub use fan::{FanSpeed, FanSpeedRange};
pub use gpu::{
    BridgeChip, ComputeCapability, CudaDriverVersion, DeviceAttributes, GpuInfo, PciInfo, PcieLink,
};
pub use memory::{Bar1Memory, EccErrorCounts, EccTotals, MemoryInfo};
pub use performance::{
    AutoBoostState, ClockMonitorFault, ClockMonitorStatus, ClockOffsetRange, PendingState,
    Utilization, VideoUtilization,
};
pub use power::{PowerLimit, PowerLimitConstraints};
pub use process::{GpuProcess, ProcessInfo, ProcessList, ProcessType};
pub use video::{EncoderSession, EncoderStats, FbcSession, FbcStats};
