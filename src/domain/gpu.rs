//! Device identity records
//!
//! PCI location, static attributes, compute capability and the CUDA driver
//! version, plus the [`GpuInfo`] summary used by the CLI.

use crate::schema::buffers::CUDA_VERSION_SCALE;
use crate::schema::{Architecture, BridgeChipType, Brand};
use serde::{Serialize, Serializer};
use std::fmt;

/// GPU summary assembled from several identity queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GpuInfo {
    /// GPU index (0-based)
    pub index: u32,
    /// GPU name (e.g., "NVIDIA GeForce RTX 4090")
    pub name: String,
    /// Unique GPU UUID
    pub uuid: String,
    /// PCI bus ID
    pub pci_bus_id: Option<String>,
    /// VBIOS version
    pub vbios_version: Option<String>,
    /// Board serial number
    pub serial: Option<String>,
    pub brand: Option<Brand>,
    pub architecture: Option<Architecture>,
    /// Number of fans
    pub fan_count: u32,
}

impl GpuInfo {
    /// Create new GPU info
    pub fn new(index: u32, name: String, uuid: String) -> Self {
        Self {
            index,
            name,
            uuid,
            pci_bus_id: None,
            vbios_version: None,
            serial: None,
            brand: None,
            architecture: None,
            fan_count: 0,
        }
    }

    /// Set the PCI bus ID
    pub fn with_pci_bus_id(mut self, bus_id: String) -> Self {
        self.pci_bus_id = Some(bus_id);
        self
    }

    /// Set the VBIOS version
    pub fn with_vbios_version(mut self, version: String) -> Self {
        self.vbios_version = Some(version);
        self
    }

    pub fn with_serial(mut self, serial: String) -> Self {
        self.serial = Some(serial);
        self
    }

    pub fn with_brand(mut self, brand: Brand) -> Self {
        self.brand = Some(brand);
        self
    }

    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = Some(architecture);
        self
    }

    /// Set the fan count
    pub fn with_fan_count(mut self, count: u32) -> Self {
        self.fan_count = count;
        self
    }
}

impl fmt::Display for GpuInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.name)
    }
}

/// PCI location of a device (`nvmlPciInfo_t`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PciInfo {
    /// Domain:bus:device.function, e.g. `00000000:01:00.0`
    pub bus_id: String,
    /// Short form kept for older callers, e.g. `0000:01:00.0`
    pub bus_id_legacy: String,
    pub domain: u32,
    pub bus: u32,
    pub device: u32,
    /// Combined device and vendor id
    pub pci_device_id: u32,
    /// Combined subsystem and subvendor id
    pub pci_sub_system_id: u32,
}

impl PciInfo {
    /// PCI vendor id (low 16 bits of the combined id)
    pub fn vendor_id(&self) -> u16 {
        (self.pci_device_id & 0xFFFF) as u16
    }

    /// PCI device id (high 16 bits of the combined id)
    pub fn device_id(&self) -> u16 {
        (self.pci_device_id >> 16) as u16
    }
}

/// PCIe link state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PcieLink {
    pub current_generation: u32,
    pub current_width: u32,
    pub max_generation: u32,
    pub max_width: u32,
}

impl PcieLink {
    /// True when the link trained below what the slot and card support.
    pub fn is_degraded(&self) -> bool {
        self.current_generation < self.max_generation || self.current_width < self.max_width
    }
}

/// Static partitioning attributes (`nvmlDeviceAttributes_t`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceAttributes {
    pub multiprocessor_count: u32,
    pub shared_copy_engine_count: u32,
    pub shared_decoder_count: u32,
    pub shared_encoder_count: u32,
    pub shared_jpeg_count: u32,
    pub shared_ofa_count: u32,
    pub gpu_instance_slice_count: u32,
    pub compute_instance_slice_count: u32,
    pub memory_size_mb: u64,
}

/// One bridge chip between the host and the GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BridgeChip {
    pub kind: BridgeChipType,
    pub firmware_version: u32,
}

/// CUDA compute capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ComputeCapability {
    pub major: i32,
    pub minor: i32,
}

impl fmt::Display for ComputeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// CUDA driver version as reported by NVML (`major * 1000 + minor * 10`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CudaDriverVersion(i32);

impl CudaDriverVersion {
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> i32 {
        self.0
    }

    pub const fn major(&self) -> i32 {
        self.0 / CUDA_VERSION_SCALE
    }

    pub const fn minor(&self) -> i32 {
        (self.0 % CUDA_VERSION_SCALE) / 10
    }
}

impl fmt::Display for CudaDriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

impl Serialize for CudaDriverVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
