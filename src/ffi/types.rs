//! ABI mirrors of the NVML records and enum typedefs
//!
//! Field names and layouts follow `nvml.h`. Nothing here is decoded; the
//! facade turns these into owned [`crate::domain`] values.

#![allow(non_camel_case_types, non_snake_case)]

use crate::schema::buffers::{MAX_CLK_DOMAINS, MAX_PHYSICAL_BRIDGE, PCI_BUS_ID, PCI_BUS_ID_LEGACY};
use std::os::raw::{c_char, c_uchar, c_uint, c_ulonglong};

pub use nvml_wrapper_sys::bindings::nvmlDevice_t;

pub type nvmlReturn_t = nvml_wrapper_sys::bindings::nvmlReturn_enum;

pub type nvmlBrandType_t = c_uint;
pub type nvmlBridgeChipType_t = c_uint;
pub type nvmlClockId_t = c_uint;
pub type nvmlClockType_t = c_uint;
pub type nvmlComputeMode_t = c_uint;
pub type nvmlDeviceArchitecture_t = c_uint;
pub type nvmlDriverModel_t = c_uint;
pub type nvmlEccCounterType_t = c_uint;
pub type nvmlEnableState_t = c_uint;
pub type nvmlEncoderType_t = c_uint;
pub type nvmlFanControlPolicy_t = c_uint;
pub type nvmlGpuOperationMode_t = c_uint;
pub type nvmlMemoryErrorType_t = c_uint;
pub type nvmlMemoryLocation_t = c_uint;
pub type nvmlPstates_t = c_uint;
pub type nvmlRestrictedAPI_t = c_uint;
pub type nvmlTemperatureSensors_t = c_uint;
pub type nvmlTemperatureThresholds_t = c_uint;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlMemory_t {
    pub total: c_ulonglong,
    pub free: c_ulonglong,
    pub used: c_ulonglong,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlBAR1Memory_t {
    pub bar1Total: c_ulonglong,
    pub bar1Free: c_ulonglong,
    pub bar1Used: c_ulonglong,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlPciInfo_t {
    pub busIdLegacy: [c_char; PCI_BUS_ID_LEGACY],
    pub domain: c_uint,
    pub bus: c_uint,
    pub device: c_uint,
    pub pciDeviceId: c_uint,
    pub pciSubSystemId: c_uint,
    pub busId: [c_char; PCI_BUS_ID],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlUtilization_t {
    pub gpu: c_uint,
    pub memory: c_uint,
}

/// Element type of the unversioned `*RunningProcesses` entry points.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlProcessInfo_v1_t {
    pub pid: c_uint,
    pub usedGpuMemory: c_ulonglong,
}

/// Element type of the `_v2` and `_v3` `*RunningProcesses` entry points.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlProcessInfo_t {
    pub pid: c_uint,
    pub usedGpuMemory: c_ulonglong,
    pub gpuInstanceId: c_uint,
    pub computeInstanceId: c_uint,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlEccErrorCounts_t {
    pub l1Cache: c_ulonglong,
    pub l2Cache: c_ulonglong,
    pub deviceMemory: c_ulonglong,
    pub registerFile: c_ulonglong,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlEncoderSessionInfo_t {
    pub sessionId: c_uint,
    pub pid: c_uint,
    pub vgpuInstance: c_uint,
    pub codecType: nvmlEncoderType_t,
    pub hResolution: c_uint,
    pub vResolution: c_uint,
    pub averageFps: c_uint,
    pub averageLatency: c_uint,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlFBCStats_t {
    pub sessionsCount: c_uint,
    pub averageFPS: c_uint,
    pub averageLatency: c_uint,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlFBCSessionInfo_t {
    pub sessionId: c_uint,
    pub pid: c_uint,
    pub vgpuInstance: c_uint,
    pub displayOrdinal: c_uint,
    pub sessionType: c_uint,
    pub sessionFlags: c_uint,
    pub hMaxResolution: c_uint,
    pub vMaxResolution: c_uint,
    pub hResolution: c_uint,
    pub vResolution: c_uint,
    pub averageFPS: c_uint,
    pub averageLatency: c_uint,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlBridgeChipInfo_t {
    pub r#type: nvmlBridgeChipType_t,
    pub fwVersion: c_uint,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct nvmlBridgeChipHierarchy_t {
    pub bridgeCount: c_uchar,
    pub bridgeChipInfo: [nvmlBridgeChipInfo_t; MAX_PHYSICAL_BRIDGE],
}

impl Default for nvmlBridgeChipHierarchy_t {
    fn default() -> Self {
        Self {
            bridgeCount: 0,
            bridgeChipInfo: [nvmlBridgeChipInfo_t::default(); MAX_PHYSICAL_BRIDGE],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlClkMonFaultInfo_t {
    pub clkApiDomain: c_uint,
    pub clkDomainFaultMask: c_uint,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlClkMonStatus_t {
    pub bGlobalStatus: c_uint,
    pub clkMonListSize: c_uint,
    pub clkMonList: [nvmlClkMonFaultInfo_t; MAX_CLK_DOMAINS],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct nvmlDeviceAttributes_t {
    pub multiprocessorCount: c_uint,
    pub sharedCopyEngineCount: c_uint,
    pub sharedDecoderCount: c_uint,
    pub sharedEncoderCount: c_uint,
    pub sharedJpegCount: c_uint,
    pub sharedOfaCount: c_uint,
    pub gpuInstanceSliceCount: c_uint,
    pub computeInstanceSliceCount: c_uint,
    pub memorySizeMB: c_ulonglong,
}
