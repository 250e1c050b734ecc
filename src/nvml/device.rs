//! Device queries
//!
//! A [`Device`] is a borrowed view of one native handle. Every method makes
//! exactly the native call(s) named in its docs, checks the status and
//! decodes the result into an owned value. Setters live in `control.rs`.

use crate::domain::{
    AutoBoostState, Bar1Memory, BridgeChip, ClockMonitorFault, ClockMonitorStatus,
    ClockOffsetRange, ComputeCapability, DeviceAttributes, EccErrorCounts, EccTotals,
    EncoderSession, EncoderStats, FanSpeedRange, FbcSession, FbcStats, MemoryInfo, PciInfo,
    PcieLink, PendingState, PowerLimit, PowerLimitConstraints, ProcessInfo, Utilization,
    VideoUtilization,
};
use crate::error::NvmlError;
use crate::ffi::types::*;
use crate::ffi::NativeSymbols;
use crate::nvml::marshal::{check, fetch_list, field_text, out, out2, read_text};
use crate::nvml::session::Nvml;
use crate::schema::buffers;
use crate::schema::{
    Architecture, Brand, ClockId, ClockType, ComputeMode, DriverModel, EccCounterType,
    EnableState, EncoderType, EventTypes, FanControlPolicy, FbcSessionType, GpuOperationMode,
    MemoryErrorType, MemoryLocation, PerformanceState, RestrictedApi, TemperatureSensor,
    TemperatureThreshold, ThrottleReasons,
};

use std::fmt;
use std::os::raw::{c_int, c_uint, c_ulonglong};

/// Opaque native device handle.
#[derive(Clone, Copy)]
struct DeviceHandle(nvmlDevice_t);

// SAFETY: the handle is an opaque token owned by NVML. It is only passed back
// to NVML, and every such call is serialized by the native call lock.
unsafe impl Send for DeviceHandle {}
unsafe impl Sync for DeviceHandle {}

/// A GPU within an [`Nvml`] session
pub struct Device<'nvml> {
    handle: DeviceHandle,
    nvml: &'nvml Nvml,
}

impl<'nvml> Device<'nvml> {
    pub(crate) fn new(nvml: &'nvml Nvml, handle: nvmlDevice_t) -> Self {
        Self {
            handle: DeviceHandle(handle),
            nvml,
        }
    }

    /// The raw native handle, for calls this crate does not wrap
    pub fn handle(&self) -> nvmlDevice_t {
        self.handle.0
    }

    /// The session this device belongs to
    pub fn session(&self) -> &'nvml Nvml {
        self.nvml
    }

    pub(crate) fn call<R>(
        &self,
        f: impl FnOnce(&NativeSymbols, nvmlDevice_t) -> Result<R, NvmlError>,
    ) -> Result<R, NvmlError> {
        let handle = self.handle.0;
        self.nvml.with(|sym| f(sym, handle))
    }

    fn text(
        &self,
        capacity: u32,
        f: impl FnOnce(&NativeSymbols, nvmlDevice_t, *mut std::os::raw::c_char, c_uint) -> Result<u32, NvmlError>,
    ) -> Result<String, NvmlError> {
        self.call(|sym, h| read_text(capacity, |buf, len| f(sym, h, buf, len)))
    }

    // Identity

    /// `nvmlDeviceGetIndex`
    pub fn index(&self) -> Result<u32, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetIndex(h, v) }))
    }

    /// `nvmlDeviceGetName`
    pub fn name(&self) -> Result<String, NvmlError> {
        self.text(buffers::DEVICE_NAME_V2, |sym, h, buf, len| unsafe {
            sym.nvmlDeviceGetName(h, buf, len)
        })
    }

    /// `nvmlDeviceGetUUID`
    pub fn uuid(&self) -> Result<String, NvmlError> {
        self.text(buffers::UUID_V2, |sym, h, buf, len| unsafe {
            sym.nvmlDeviceGetUUID(h, buf, len)
        })
    }

    /// `nvmlDeviceGetSerial`
    pub fn serial(&self) -> Result<String, NvmlError> {
        self.text(buffers::SERIAL, |sym, h, buf, len| unsafe {
            sym.nvmlDeviceGetSerial(h, buf, len)
        })
    }

    /// `nvmlDeviceGetVbiosVersion`
    pub fn vbios_version(&self) -> Result<String, NvmlError> {
        self.text(buffers::VBIOS_VERSION, |sym, h, buf, len| unsafe {
            sym.nvmlDeviceGetVbiosVersion(h, buf, len)
        })
    }

    /// `nvmlDeviceGetBoardPartNumber`. Many consumer boards report `NotSupported`.
    pub fn board_part_number(&self) -> Result<String, NvmlError> {
        self.text(buffers::BOARD_PART_NUMBER, |sym, h, buf, len| unsafe {
            sym.nvmlDeviceGetBoardPartNumber(h, buf, len)
        })
    }

    /// `nvmlDeviceGetInforomImageVersion`
    pub fn inforom_image_version(&self) -> Result<String, NvmlError> {
        self.text(buffers::INFOROM_VERSION, |sym, h, buf, len| unsafe {
            sym.nvmlDeviceGetInforomImageVersion(h, buf, len)
        })
    }

    /// `nvmlDeviceGetInforomConfigurationChecksum`
    pub fn inforom_configuration_checksum(&self) -> Result<u32, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetInforomConfigurationChecksum(h, v) })
        })
    }

    /// `nvmlDeviceGetBoardId`
    pub fn board_id(&self) -> Result<u32, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetBoardId(h, v) }))
    }

    /// `nvmlDeviceGetBrand`
    pub fn brand(&self) -> Result<Brand, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetBrand(h, v) }))
            .map(Brand::from_raw)
    }

    /// `nvmlDeviceGetArchitecture`
    pub fn architecture(&self) -> Result<Architecture, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetArchitecture(h, v) }))
            .map(Architecture::from_raw)
    }

    /// `nvmlDeviceGetAttributes_v2`
    pub fn attributes(&self) -> Result<DeviceAttributes, NvmlError> {
        let raw = self.call(|sym, h| {
            out::<nvmlDeviceAttributes_t>(|v| unsafe { sym.nvmlDeviceGetAttributes_v2(h, v) })
        })?;
        Ok(DeviceAttributes {
            multiprocessor_count: raw.multiprocessorCount,
            shared_copy_engine_count: raw.sharedCopyEngineCount,
            shared_decoder_count: raw.sharedDecoderCount,
            shared_encoder_count: raw.sharedEncoderCount,
            shared_jpeg_count: raw.sharedJpegCount,
            shared_ofa_count: raw.sharedOfaCount,
            gpu_instance_slice_count: raw.gpuInstanceSliceCount,
            compute_instance_slice_count: raw.computeInstanceSliceCount,
            memory_size_mb: raw.memorySizeMB,
        })
    }

    /// `nvmlDeviceGetCudaComputeCapability`
    pub fn cuda_compute_capability(&self) -> Result<ComputeCapability, NvmlError> {
        let (major, minor) = self.call(|sym, h| {
            out2::<c_int, c_int>(|major, minor| unsafe {
                sym.nvmlDeviceGetCudaComputeCapability(h, major, minor)
            })
        })?;
        Ok(ComputeCapability { major, minor })
    }

    /// `nvmlDeviceGetNumGpuCores`
    pub fn num_gpu_cores(&self) -> Result<u32, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetNumGpuCores(h, v) }))
    }

    /// `nvmlDeviceGetBridgeChipInfo`
    pub fn bridge_chips(&self) -> Result<Vec<BridgeChip>, NvmlError> {
        let raw = self.call(|sym, h| {
            out::<nvmlBridgeChipHierarchy_t>(|v| unsafe { sym.nvmlDeviceGetBridgeChipInfo(h, v) })
        })?;
        let count = usize::from(raw.bridgeCount).min(buffers::MAX_PHYSICAL_BRIDGE);
        Ok(raw.bridgeChipInfo[..count]
            .iter()
            .map(|chip| BridgeChip {
                kind: crate::schema::BridgeChipType::from_raw(chip.r#type),
                firmware_version: chip.fwVersion,
            })
            .collect())
    }

    // PCI

    /// `nvmlDeviceGetPciInfo_v3`
    pub fn pci_info(&self) -> Result<PciInfo, NvmlError> {
        let raw = self.call(|sym, h| {
            out::<nvmlPciInfo_t>(|v| unsafe { sym.nvmlDeviceGetPciInfo_v3(h, v) })
        })?;
        Ok(PciInfo {
            bus_id: field_text(&raw.busId)?,
            bus_id_legacy: field_text(&raw.busIdLegacy)?,
            domain: raw.domain,
            bus: raw.bus,
            device: raw.device,
            pci_device_id: raw.pciDeviceId,
            pci_sub_system_id: raw.pciSubSystemId,
        })
    }

    /// `nvmlDeviceGetCurrPcieLinkGeneration`
    pub fn curr_pcie_link_generation(&self) -> Result<u32, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetCurrPcieLinkGeneration(h, v) })
        })
    }

    /// `nvmlDeviceGetCurrPcieLinkWidth`
    pub fn curr_pcie_link_width(&self) -> Result<u32, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetCurrPcieLinkWidth(h, v) }))
    }

    /// `nvmlDeviceGetMaxPcieLinkGeneration`: the maximum of the card and
    /// the slot it sits in
    pub fn max_pcie_link_generation(&self) -> Result<u32, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetMaxPcieLinkGeneration(h, v) })
        })
    }

    /// `nvmlDeviceGetGpuMaxPcieLinkGeneration`: what the card alone supports
    pub fn gpu_max_pcie_link_generation(&self) -> Result<u32, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetGpuMaxPcieLinkGeneration(h, v) })
        })
    }

    /// `nvmlDeviceGetMaxPcieLinkWidth`
    pub fn max_pcie_link_width(&self) -> Result<u32, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetMaxPcieLinkWidth(h, v) }))
    }

    /// Current and maximum link generation and width (four native calls)
    pub fn pcie_link(&self) -> Result<PcieLink, NvmlError> {
        Ok(PcieLink {
            current_generation: self.curr_pcie_link_generation()?,
            current_width: self.curr_pcie_link_width()?,
            max_generation: self.max_pcie_link_generation()?,
            max_width: self.max_pcie_link_width()?,
        })
    }

    // Memory

    /// `nvmlDeviceGetMemoryInfo`
    pub fn memory_info(&self) -> Result<MemoryInfo, NvmlError> {
        let raw = self.call(|sym, h| {
            out::<nvmlMemory_t>(|v| unsafe { sym.nvmlDeviceGetMemoryInfo(h, v) })
        })?;
        Ok(MemoryInfo {
            total: raw.total,
            free: raw.free,
            used: raw.used,
        })
    }

    /// `nvmlDeviceGetBAR1MemoryInfo`
    pub fn bar1_memory_info(&self) -> Result<Bar1Memory, NvmlError> {
        let raw = self.call(|sym, h| {
            out::<nvmlBAR1Memory_t>(|v| unsafe { sym.nvmlDeviceGetBAR1MemoryInfo(h, v) })
        })?;
        Ok(Bar1Memory {
            total: raw.bar1Total,
            free: raw.bar1Free,
            used: raw.bar1Used,
        })
    }

    /// `nvmlDeviceGetMemoryBusWidth`, in bits
    pub fn memory_bus_width(&self) -> Result<u32, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetMemoryBusWidth(h, v) }))
    }

    /// `nvmlDeviceGetEccMode`
    pub fn ecc_mode(&self) -> Result<PendingState<EnableState>, NvmlError> {
        let (current, pending) = self.call(|sym, h| {
            out2::<c_uint, c_uint>(|c, p| unsafe { sym.nvmlDeviceGetEccMode(h, c, p) })
        })?;
        Ok(PendingState {
            current: EnableState::from_raw(current),
            pending: EnableState::from_raw(pending),
        })
    }

    /// `nvmlDeviceGetDetailedEccErrors`
    pub fn detailed_ecc_errors(
        &self,
        error_type: MemoryErrorType,
        counter_type: EccCounterType,
    ) -> Result<EccErrorCounts, NvmlError> {
        let raw = self.call(|sym, h| {
            out::<nvmlEccErrorCounts_t>(|v| unsafe {
                sym.nvmlDeviceGetDetailedEccErrors(h, error_type.as_raw(), counter_type.as_raw(), v)
            })
        })?;
        Ok(EccErrorCounts {
            l1_cache: raw.l1Cache,
            l2_cache: raw.l2Cache,
            device_memory: raw.deviceMemory,
            register_file: raw.registerFile,
        })
    }

    /// `nvmlDeviceGetTotalEccErrors`
    pub fn total_ecc_errors(
        &self,
        error_type: MemoryErrorType,
        counter_type: EccCounterType,
    ) -> Result<u64, NvmlError> {
        self.call(|sym, h| {
            out::<c_ulonglong>(|v| unsafe {
                sym.nvmlDeviceGetTotalEccErrors(h, error_type.as_raw(), counter_type.as_raw(), v)
            })
        })
    }

    /// Corrected and uncorrected totals (two native calls)
    pub fn ecc_totals(&self, counter_type: EccCounterType) -> Result<EccTotals, NvmlError> {
        Ok(EccTotals {
            corrected: self.total_ecc_errors(MemoryErrorType::Corrected, counter_type)?,
            uncorrected: self.total_ecc_errors(MemoryErrorType::Uncorrected, counter_type)?,
        })
    }

    /// `nvmlDeviceGetMemoryErrorCounter`
    pub fn memory_error_counter(
        &self,
        error_type: MemoryErrorType,
        counter_type: EccCounterType,
        location: MemoryLocation,
    ) -> Result<u64, NvmlError> {
        self.call(|sym, h| {
            out::<c_ulonglong>(|v| unsafe {
                sym.nvmlDeviceGetMemoryErrorCounter(
                    h,
                    error_type.as_raw(),
                    counter_type.as_raw(),
                    location.as_raw(),
                    v,
                )
            })
        })
    }

    // Utilization and video

    /// `nvmlDeviceGetUtilizationRates`
    pub fn utilization_rates(&self) -> Result<Utilization, NvmlError> {
        let raw = self.call(|sym, h| {
            out::<nvmlUtilization_t>(|v| unsafe { sym.nvmlDeviceGetUtilizationRates(h, v) })
        })?;
        Ok(Utilization {
            gpu: raw.gpu,
            memory: raw.memory,
        })
    }

    /// `nvmlDeviceGetEncoderUtilization`
    pub fn encoder_utilization(&self) -> Result<VideoUtilization, NvmlError> {
        let (utilization, sampling_period_us) = self.call(|sym, h| {
            out2::<c_uint, c_uint>(|u, p| unsafe { sym.nvmlDeviceGetEncoderUtilization(h, u, p) })
        })?;
        Ok(VideoUtilization {
            utilization,
            sampling_period_us,
        })
    }

    /// `nvmlDeviceGetDecoderUtilization`
    pub fn decoder_utilization(&self) -> Result<VideoUtilization, NvmlError> {
        let (utilization, sampling_period_us) = self.call(|sym, h| {
            out2::<c_uint, c_uint>(|u, p| unsafe { sym.nvmlDeviceGetDecoderUtilization(h, u, p) })
        })?;
        Ok(VideoUtilization {
            utilization,
            sampling_period_us,
        })
    }

    /// `nvmlDeviceGetEncoderCapacity`, as a percentage of full load
    pub fn encoder_capacity(&self, encoder: EncoderType) -> Result<u32, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetEncoderCapacity(h, encoder.as_raw(), v) })
        })
    }

    /// `nvmlDeviceGetEncoderStats`
    pub fn encoder_stats(&self) -> Result<EncoderStats, NvmlError> {
        self.call(|sym, h| {
            let mut stats = EncoderStats {
                session_count: 0,
                average_fps: 0,
                average_latency: 0,
            };
            let code = unsafe {
                sym.nvmlDeviceGetEncoderStats(
                    h,
                    &mut stats.session_count,
                    &mut stats.average_fps,
                    &mut stats.average_latency,
                )
            }?;
            check(code)?;
            Ok(stats)
        })
    }

    /// `nvmlDeviceGetEncoderSessions`
    pub fn encoder_sessions(&self) -> Result<Vec<EncoderSession>, NvmlError> {
        let raw = self.call(|sym, h| {
            fetch_list::<nvmlEncoderSessionInfo_t>(|count, infos| unsafe {
                sym.nvmlDeviceGetEncoderSessions(h, count, infos)
            })
        })?;
        Ok(raw
            .into_iter()
            .map(|s| EncoderSession {
                session_id: s.sessionId,
                pid: s.pid,
                vgpu_instance: s.vgpuInstance,
                codec: EncoderType::from_raw(s.codecType),
                h_resolution: s.hResolution,
                v_resolution: s.vResolution,
                average_fps: s.averageFps,
                average_latency: s.averageLatency,
            })
            .collect())
    }

    /// `nvmlDeviceGetFBCStats`
    pub fn fbc_stats(&self) -> Result<FbcStats, NvmlError> {
        let raw = self.call(|sym, h| {
            out::<nvmlFBCStats_t>(|v| unsafe { sym.nvmlDeviceGetFBCStats(h, v) })
        })?;
        Ok(FbcStats {
            sessions_count: raw.sessionsCount,
            average_fps: raw.averageFPS,
            average_latency: raw.averageLatency,
        })
    }

    /// `nvmlDeviceGetFBCSessions`
    pub fn fbc_sessions(&self) -> Result<Vec<FbcSession>, NvmlError> {
        let raw = self.call(|sym, h| {
            fetch_list::<nvmlFBCSessionInfo_t>(|count, infos| unsafe {
                sym.nvmlDeviceGetFBCSessions(h, count, infos)
            })
        })?;
        Ok(raw
            .into_iter()
            .map(|s| FbcSession {
                session_id: s.sessionId,
                pid: s.pid,
                vgpu_instance: s.vgpuInstance,
                display_ordinal: s.displayOrdinal,
                session_type: FbcSessionType::from_raw(s.sessionType),
                session_flags: s.sessionFlags,
                h_max_resolution: s.hMaxResolution,
                v_max_resolution: s.vMaxResolution,
                h_resolution: s.hResolution,
                v_resolution: s.vResolution,
                average_fps: s.averageFPS,
                average_latency: s.averageLatency,
            })
            .collect())
    }

    // Processes

    /// `nvmlDeviceGetComputeRunningProcesses_v3`
    pub fn running_compute_processes(&self) -> Result<Vec<ProcessInfo>, NvmlError> {
        self.process_list(|sym, h, count, infos| unsafe {
            sym.nvmlDeviceGetComputeRunningProcesses_v3(h, count, infos)
        })
    }

    /// `nvmlDeviceGetComputeRunningProcesses_v2`
    pub fn running_compute_processes_v2(&self) -> Result<Vec<ProcessInfo>, NvmlError> {
        self.process_list(|sym, h, count, infos| unsafe {
            sym.nvmlDeviceGetComputeRunningProcesses_v2(h, count, infos)
        })
    }

    /// `nvmlDeviceGetComputeRunningProcesses`, without MIG instance ids
    pub fn running_compute_processes_legacy(&self) -> Result<Vec<ProcessInfo>, NvmlError> {
        self.process_list_v1(|sym, h, count, infos| unsafe {
            sym.nvmlDeviceGetComputeRunningProcesses(h, count, infos)
        })
    }

    /// `nvmlDeviceGetGraphicsRunningProcesses_v3`
    pub fn running_graphics_processes(&self) -> Result<Vec<ProcessInfo>, NvmlError> {
        self.process_list(|sym, h, count, infos| unsafe {
            sym.nvmlDeviceGetGraphicsRunningProcesses_v3(h, count, infos)
        })
    }

    /// `nvmlDeviceGetGraphicsRunningProcesses_v2`
    pub fn running_graphics_processes_v2(&self) -> Result<Vec<ProcessInfo>, NvmlError> {
        self.process_list(|sym, h, count, infos| unsafe {
            sym.nvmlDeviceGetGraphicsRunningProcesses_v2(h, count, infos)
        })
    }

    /// `nvmlDeviceGetGraphicsRunningProcesses`, without MIG instance ids
    pub fn running_graphics_processes_legacy(&self) -> Result<Vec<ProcessInfo>, NvmlError> {
        self.process_list_v1(|sym, h, count, infos| unsafe {
            sym.nvmlDeviceGetGraphicsRunningProcesses(h, count, infos)
        })
    }

    fn process_list(
        &self,
        f: impl Fn(&NativeSymbols, nvmlDevice_t, *mut c_uint, *mut nvmlProcessInfo_t) -> Result<u32, NvmlError>,
    ) -> Result<Vec<ProcessInfo>, NvmlError> {
        let raw = self.call(|sym, h| {
            fetch_list::<nvmlProcessInfo_t>(|count, infos| f(sym, h, count, infos))
        })?;
        Ok(raw
            .into_iter()
            .map(|p| {
                ProcessInfo::from_raw(p.pid, p.usedGpuMemory, p.gpuInstanceId, p.computeInstanceId)
            })
            .collect())
    }

    fn process_list_v1(
        &self,
        f: impl Fn(&NativeSymbols, nvmlDevice_t, *mut c_uint, *mut nvmlProcessInfo_v1_t) -> Result<u32, NvmlError>,
    ) -> Result<Vec<ProcessInfo>, NvmlError> {
        let raw = self.call(|sym, h| {
            fetch_list::<nvmlProcessInfo_v1_t>(|count, infos| f(sym, h, count, infos))
        })?;
        Ok(raw
            .into_iter()
            .map(|p| {
                ProcessInfo::from_raw(
                    p.pid,
                    p.usedGpuMemory,
                    buffers::VALUE_NOT_AVAILABLE_U32,
                    buffers::VALUE_NOT_AVAILABLE_U32,
                )
            })
            .collect())
    }

    // Thermal

    /// `nvmlDeviceGetTemperature`, in °C
    pub fn temperature(&self, sensor: TemperatureSensor) -> Result<u32, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetTemperature(h, sensor.as_raw(), v) })
        })
    }

    /// `nvmlDeviceGetTemperatureThreshold`, in °C
    pub fn temperature_threshold(&self, threshold: TemperatureThreshold) -> Result<u32, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe {
                sym.nvmlDeviceGetTemperatureThreshold(h, threshold.as_raw(), v)
            })
        })
    }

    // Power

    /// `nvmlDeviceGetPerformanceState`
    pub fn performance_state(&self) -> Result<PerformanceState, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetPerformanceState(h, v) }))
            .map(PerformanceState::from_raw)
    }

    /// `nvmlDeviceGetPowerState`, deprecated by NVML in favour of
    /// [`Device::performance_state`]
    pub fn power_state(&self) -> Result<PerformanceState, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetPowerState(h, v) }))
            .map(PerformanceState::from_raw)
    }

    /// `nvmlDeviceGetPowerUsage`
    pub fn power_usage(&self) -> Result<PowerLimit, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetPowerUsage(h, v) }))
            .map(PowerLimit::from_milliwatts)
    }

    /// `nvmlDeviceGetTotalEnergyConsumption`, in millijoules since driver load
    pub fn total_energy_consumption(&self) -> Result<u64, NvmlError> {
        self.call(|sym, h| {
            out::<c_ulonglong>(|v| unsafe { sym.nvmlDeviceGetTotalEnergyConsumption(h, v) })
        })
    }

    /// `nvmlDeviceGetPowerManagementLimit`
    pub fn power_management_limit(&self) -> Result<PowerLimit, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetPowerManagementLimit(h, v) })
        })
        .map(PowerLimit::from_milliwatts)
    }

    /// `nvmlDeviceGetPowerManagementDefaultLimit`
    pub fn power_management_default_limit(&self) -> Result<PowerLimit, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetPowerManagementDefaultLimit(h, v) })
        })
        .map(PowerLimit::from_milliwatts)
    }

    /// `nvmlDeviceGetPowerManagementLimitConstraints`
    pub fn power_management_limit_constraints(&self) -> Result<PowerLimitConstraints, NvmlError> {
        let (min, max) = self.call(|sym, h| {
            out2::<c_uint, c_uint>(|min, max| unsafe {
                sym.nvmlDeviceGetPowerManagementLimitConstraints(h, min, max)
            })
        })?;
        Ok(PowerLimitConstraints::new(
            PowerLimit::from_milliwatts(min),
            PowerLimit::from_milliwatts(max),
        ))
    }

    /// `nvmlDeviceGetEnforcedPowerLimit`
    pub fn enforced_power_limit(&self) -> Result<PowerLimit, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetEnforcedPowerLimit(h, v) }))
            .map(PowerLimit::from_milliwatts)
    }

    // Modes

    /// `nvmlDeviceGetComputeMode`
    pub fn compute_mode(&self) -> Result<ComputeMode, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetComputeMode(h, v) }))
            .map(ComputeMode::from_raw)
    }

    /// `nvmlDeviceGetPersistenceMode`
    pub fn persistence_mode(&self) -> Result<EnableState, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetPersistenceMode(h, v) }))
            .map(EnableState::from_raw)
    }

    /// `nvmlDeviceGetDisplayMode`: whether a display is connected
    pub fn display_mode(&self) -> Result<EnableState, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetDisplayMode(h, v) }))
            .map(EnableState::from_raw)
    }

    /// `nvmlDeviceGetDisplayActive`: whether a display is initialized
    pub fn display_active(&self) -> Result<EnableState, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetDisplayActive(h, v) }))
            .map(EnableState::from_raw)
    }

    /// `nvmlDeviceGetDriverModel` (Windows only)
    pub fn driver_model(&self) -> Result<PendingState<DriverModel>, NvmlError> {
        let (current, pending) = self.call(|sym, h| {
            out2::<c_uint, c_uint>(|c, p| unsafe { sym.nvmlDeviceGetDriverModel(h, c, p) })
        })?;
        Ok(PendingState {
            current: DriverModel::from_raw(current),
            pending: DriverModel::from_raw(pending),
        })
    }

    /// `nvmlDeviceGetGpuOperationMode`
    pub fn gpu_operation_mode(&self) -> Result<PendingState<GpuOperationMode>, NvmlError> {
        let (current, pending) = self.call(|sym, h| {
            out2::<c_uint, c_uint>(|c, p| unsafe { sym.nvmlDeviceGetGpuOperationMode(h, c, p) })
        })?;
        Ok(PendingState {
            current: GpuOperationMode::from_raw(current),
            pending: GpuOperationMode::from_raw(pending),
        })
    }

    /// `nvmlDeviceGetAPIRestriction`: whether `api` requires root
    pub fn api_restriction(&self, api: RestrictedApi) -> Result<EnableState, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetAPIRestriction(h, api.as_raw(), v) })
        })
        .map(EnableState::from_raw)
    }

    // Clocks

    /// `nvmlDeviceGetClockInfo`, current clock in MHz
    pub fn clock_info(&self, clock: ClockType) -> Result<u32, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetClockInfo(h, clock.as_raw(), v) })
        })
    }

    /// `nvmlDeviceGetMaxClockInfo`, in MHz
    pub fn max_clock_info(&self, clock: ClockType) -> Result<u32, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetMaxClockInfo(h, clock.as_raw(), v) })
        })
    }

    /// `nvmlDeviceGetClock`, in MHz
    pub fn clock(&self, clock: ClockType, id: ClockId) -> Result<u32, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe {
                sym.nvmlDeviceGetClock(h, clock.as_raw(), id.as_raw(), v)
            })
        })
    }

    /// `nvmlDeviceGetApplicationsClock`, in MHz
    pub fn applications_clock(&self, clock: ClockType) -> Result<u32, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetApplicationsClock(h, clock.as_raw(), v) })
        })
    }

    /// `nvmlDeviceGetDefaultApplicationsClock`, in MHz
    pub fn default_applications_clock(&self, clock: ClockType) -> Result<u32, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe {
                sym.nvmlDeviceGetDefaultApplicationsClock(h, clock.as_raw(), v)
            })
        })
    }

    /// `nvmlDeviceGetAutoBoostedClocksEnabled`
    pub fn auto_boosted_clocks_enabled(&self) -> Result<AutoBoostState, NvmlError> {
        let (enabled, default_enabled) = self.call(|sym, h| {
            out2::<c_uint, c_uint>(|e, d| unsafe {
                sym.nvmlDeviceGetAutoBoostedClocksEnabled(h, e, d)
            })
        })?;
        Ok(AutoBoostState {
            enabled: EnableState::from_raw(enabled),
            default_enabled: EnableState::from_raw(default_enabled),
        })
    }

    /// `nvmlDeviceGetGpcClkVfOffset`, in MHz
    pub fn gpc_clk_vf_offset(&self) -> Result<i32, NvmlError> {
        self.call(|sym, h| out::<c_int>(|v| unsafe { sym.nvmlDeviceGetGpcClkVfOffset(h, v) }))
    }

    /// `nvmlDeviceGetGpcClkMinMaxVfOffset`
    pub fn gpc_clk_min_max_vf_offset(&self) -> Result<ClockOffsetRange, NvmlError> {
        let (min, max) = self.call(|sym, h| {
            out2::<c_int, c_int>(|min, max| unsafe {
                sym.nvmlDeviceGetGpcClkMinMaxVfOffset(h, min, max)
            })
        })?;
        Ok(ClockOffsetRange { min, max })
    }

    /// `nvmlDeviceGetMemClkVfOffset`, in MHz
    pub fn mem_clk_vf_offset(&self) -> Result<i32, NvmlError> {
        self.call(|sym, h| out::<c_int>(|v| unsafe { sym.nvmlDeviceGetMemClkVfOffset(h, v) }))
    }

    /// `nvmlDeviceGetMemClkMinMaxVfOffset`
    pub fn mem_clk_min_max_vf_offset(&self) -> Result<ClockOffsetRange, NvmlError> {
        let (min, max) = self.call(|sym, h| {
            out2::<c_int, c_int>(|min, max| unsafe {
                sym.nvmlDeviceGetMemClkMinMaxVfOffset(h, min, max)
            })
        })?;
        Ok(ClockOffsetRange { min, max })
    }

    /// `nvmlDeviceGetCurrentClocksThrottleReasons`
    pub fn current_throttle_reasons(&self) -> Result<ThrottleReasons, NvmlError> {
        self.call(|sym, h| {
            out::<c_ulonglong>(|v| unsafe { sym.nvmlDeviceGetCurrentClocksThrottleReasons(h, v) })
        })
        .map(ThrottleReasons::from_bits_retain)
    }

    /// `nvmlDeviceGetSupportedClocksThrottleReasons`
    pub fn supported_throttle_reasons(&self) -> Result<ThrottleReasons, NvmlError> {
        self.call(|sym, h| {
            out::<c_ulonglong>(|v| unsafe {
                sym.nvmlDeviceGetSupportedClocksThrottleReasons(h, v)
            })
        })
        .map(ThrottleReasons::from_bits_retain)
    }

    /// `nvmlDeviceGetClkMonStatus`
    pub fn clock_monitor_status(&self) -> Result<ClockMonitorStatus, NvmlError> {
        let raw = self.call(|sym, h| {
            out::<nvmlClkMonStatus_t>(|v| unsafe { sym.nvmlDeviceGetClkMonStatus(h, v) })
        })?;
        let count = (raw.clkMonListSize as usize).min(buffers::MAX_CLK_DOMAINS);
        Ok(ClockMonitorStatus {
            global_fault: raw.bGlobalStatus != 0,
            faults: raw.clkMonList[..count]
                .iter()
                .map(|f| ClockMonitorFault {
                    clock_domain: f.clkApiDomain,
                    fault_mask: f.clkDomainFaultMask,
                })
                .collect(),
        })
    }

    /// `nvmlDeviceGetSupportedEventTypes`
    pub fn supported_event_types(&self) -> Result<EventTypes, NvmlError> {
        self.call(|sym, h| {
            out::<c_ulonglong>(|v| unsafe { sym.nvmlDeviceGetSupportedEventTypes(h, v) })
        })
        .map(EventTypes::from_bits_retain)
    }

    // Fans

    /// `nvmlDeviceGetNumFans`
    pub fn num_fans(&self) -> Result<u32, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetNumFans(h, v) }))
    }

    /// `nvmlDeviceGetFanSpeed_v2`, target speed of one fan in percent
    pub fn fan_speed(&self, fan: u32) -> Result<u32, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetFanSpeed_v2(h, fan, v) }))
    }

    /// `nvmlDeviceGetFanSpeed`, first fan only
    pub fn fan_speed_legacy(&self) -> Result<u32, NvmlError> {
        self.call(|sym, h| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetFanSpeed(h, v) }))
    }

    /// `nvmlDeviceGetMinMaxFanSpeed`
    pub fn min_max_fan_speed(&self) -> Result<FanSpeedRange, NvmlError> {
        let (min, max) = self.call(|sym, h| {
            out2::<c_uint, c_uint>(|min, max| unsafe {
                sym.nvmlDeviceGetMinMaxFanSpeed(h, min, max)
            })
        })?;
        Ok(FanSpeedRange { min, max })
    }

    /// `nvmlDeviceGetFanControlPolicy_v2`
    pub fn fan_control_policy(&self, fan: u32) -> Result<FanControlPolicy, NvmlError> {
        self.call(|sym, h| {
            out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetFanControlPolicy_v2(h, fan, v) })
        })
        .map(FanControlPolicy::from_raw)
    }
}

impl fmt::Debug for Device<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("handle", &self.handle.0)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MockGpu};
    use crate::nvml::session::InitMode;
    use crate::schema::status;

    fn session(gpus: Vec<MockGpu>) -> Nvml {
        Nvml::init_from(mock::install(gpus), InitMode::Standard).unwrap()
    }

    #[test]
    fn test_identity_strings_use_v2_capacities() {
        let nvml = session(vec![MockGpu::new("NVIDIA GeForce RTX 3090").with_uuid("GPU-1234")]);
        let dev = nvml.device_by_index(0).unwrap();

        assert_eq!(dev.name().unwrap(), "NVIDIA GeForce RTX 3090");
        assert_eq!(dev.uuid().unwrap(), "GPU-1234");
        assert_eq!(dev.serial().unwrap(), "1320000000000");
        assert_eq!(dev.vbios_version().unwrap(), "95.02.18.80.5F");
    }

    #[test]
    fn test_name_with_interior_nul_is_joined() {
        let nvml = session(vec![MockGpu::new("NVIDIA\0 A100")]);
        let dev = nvml.device_by_index(0).unwrap();
        assert_eq!(dev.name().unwrap(), "NVIDIA A100");
    }

    #[test]
    fn test_name_too_long_for_buffer() {
        let nvml = session(vec![MockGpu::new(&"X".repeat(200))]);
        let dev = nvml.device_by_index(0).unwrap();
        assert_eq!(dev.name().unwrap_err(), NvmlError::InsufficientSize);
    }

    #[test]
    fn test_compound_records() {
        let mut gpu = MockGpu::new("GPU").with_pci_bus_id("00000000:41:00.0");
        gpu.pcie = (3, 8, 4, 16);
        let nvml = session(vec![gpu]);
        let dev = nvml.device_by_index(0).unwrap();

        let memory = dev.memory_info().unwrap();
        assert_eq!(memory.total, memory.free + memory.used);

        let pci = dev.pci_info().unwrap();
        assert_eq!(pci.bus_id, "00000000:41:00.0");
        assert_eq!(pci.bus_id_legacy, "0000:41:00.0");
        assert_eq!(pci.vendor_id(), 0x10DE);

        let link = dev.pcie_link().unwrap();
        assert!(link.is_degraded());

        let util = dev.utilization_rates().unwrap();
        assert_eq!((util.gpu, util.memory), (30, 10));

        let cap = dev.cuda_compute_capability().unwrap();
        assert_eq!((cap.major, cap.minor), (8, 6));
    }

    #[test]
    fn test_enum_results_keep_unknown_codes() {
        let mut gpu = MockGpu::new("GPU");
        gpu.architecture = 77;
        gpu.compute_mode = 2;
        let nvml = session(vec![gpu]);
        let dev = nvml.device_by_index(0).unwrap();

        assert_eq!(dev.architecture().unwrap(), Architecture::Unknown(77));
        assert_eq!(dev.architecture().unwrap().as_raw(), 77);
        assert_eq!(dev.compute_mode().unwrap(), ComputeMode::Prohibited);
    }

    #[test]
    fn test_empty_process_list_makes_one_call() {
        let nvml = session(vec![MockGpu::new("GPU")]);
        let dev = nvml.device_by_index(0).unwrap();

        assert!(dev.running_compute_processes().unwrap().is_empty());
        assert_eq!(
            mock::list_capacities("nvmlDeviceGetComputeRunningProcesses_v3"),
            vec![0]
        );
    }

    #[test]
    fn test_process_list_fetched_in_two_phases() {
        let gpu = MockGpu::new("GPU")
            .with_compute_process(100, 512 << 20)
            .with_compute_process(200, 1 << 30)
            .with_compute_process(300, u64::MAX);
        let nvml = session(vec![gpu]);
        let dev = nvml.device_by_index(0).unwrap();

        let procs = dev.running_compute_processes().unwrap();
        let pids: Vec<u32> = procs.iter().map(|p| p.pid).collect();
        assert_eq!(pids, [100, 200, 300]);
        assert_eq!(procs[2].used_gpu_memory, None);
        assert_eq!(procs[0].gpu_instance_id, None);
        assert_eq!(
            mock::list_capacities("nvmlDeviceGetComputeRunningProcesses_v3"),
            vec![0, 3]
        );
    }

    #[test]
    fn test_process_churn_is_reported() {
        let gpu = MockGpu::new("GPU")
            .with_graphics_process(100, 1)
            .with_graphics_process(200, 1);
        let nvml = session(vec![gpu]);
        mock::with_state(|s| s.churn = vec![(300, 1), (400, 1)]);
        let dev = nvml.device_by_index(0).unwrap();

        let err = dev.running_graphics_processes().unwrap_err();
        assert_eq!(
            err,
            NvmlError::InconsistentCount {
                expected: 2,
                actual: 4
            }
        );
        assert_eq!(
            mock::call_count("nvmlDeviceGetGraphicsRunningProcesses_v3"),
            2
        );
    }

    #[test]
    fn test_legacy_process_list_has_no_instance_ids() {
        let nvml = session(vec![MockGpu::new("GPU").with_compute_process(7, 4096)]);
        let dev = nvml.device_by_index(0).unwrap();

        let procs = dev.running_compute_processes_legacy().unwrap();
        assert_eq!(procs.len(), 1);
        assert_eq!(procs[0].used_gpu_memory, Some(4096));
        assert_eq!(procs[0].compute_instance_id, None);
        assert_eq!(mock::call_count("nvmlDeviceGetComputeRunningProcesses"), 2);
        assert_eq!(mock::call_count("nvmlDeviceGetComputeRunningProcesses_v3"), 0);
    }

    #[test]
    fn test_missing_revision_is_symbol_error() {
        let nvml = session(vec![MockGpu::new("GPU")]);
        let dev = nvml.device_by_index(0).unwrap();

        let err = dev.running_compute_processes_v2().unwrap_err();
        assert_eq!(
            err,
            NvmlError::SymbolNotFound("nvmlDeviceGetComputeRunningProcesses_v2")
        );
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_forced_status_surfaces_as_typed_error() {
        let nvml = session(vec![MockGpu::new("GPU")]);
        let dev = nvml.device_by_index(0).unwrap();

        mock::force_status("nvmlDeviceGetTemperature", status::GPU_IS_LOST);
        assert_eq!(
            dev.temperature(TemperatureSensor::Gpu).unwrap_err(),
            NvmlError::GpuLost
        );

        mock::force_status("nvmlDeviceGetPowerUsage", 4242);
        assert_eq!(dev.power_usage().unwrap_err(), NvmlError::Vendor(4242));
    }

    #[test]
    fn test_power_and_thermal_queries() {
        let nvml = session(vec![MockGpu::new("GPU")]);
        let dev = nvml.device_by_index(0).unwrap();

        assert_eq!(dev.power_usage().unwrap().as_watts(), 120);
        let constraints = dev.power_management_limit_constraints().unwrap();
        assert!(constraints.min <= constraints.max);
        assert_eq!(constraints.max.as_watts(), 400);
        assert_eq!(
            dev.temperature_threshold(TemperatureThreshold::Slowdown).unwrap(),
            90
        );
        assert_eq!(
            dev.temperature_threshold(TemperatureThreshold::AcousticMax).unwrap_err(),
            NvmlError::NotSupported
        );
    }

    #[test]
    fn test_fan_queries() {
        let nvml = session(vec![MockGpu::new("GPU")]);
        let dev = nvml.device_by_index(0).unwrap();

        assert_eq!(dev.num_fans().unwrap(), 2);
        assert_eq!(dev.fan_speed(1).unwrap(), 30);
        assert_eq!(dev.fan_speed_legacy().unwrap(), 30);
        assert_eq!(
            dev.fan_control_policy(0).unwrap(),
            FanControlPolicy::TemperatureContinuousSw
        );
        let range = dev.min_max_fan_speed().unwrap();
        assert!(range.min <= range.max);
        assert_eq!(dev.fan_speed(5).unwrap_err(), NvmlError::InvalidArg);
    }

    #[test]
    fn test_throttle_reasons_keep_unknown_bits() {
        let mut gpu = MockGpu::new("GPU");
        gpu.throttle_reasons = 0x4 | (1 << 40);
        let nvml = session(vec![gpu]);
        let dev = nvml.device_by_index(0).unwrap();

        let reasons = dev.current_throttle_reasons().unwrap();
        assert!(reasons.contains(ThrottleReasons::SW_POWER_CAP));
        assert_eq!(reasons.bits(), 0x4 | (1 << 40));
    }

    #[test]
    fn test_no_video_sessions_makes_one_call() {
        let nvml = session(vec![MockGpu::new("GPU")]);
        let dev = nvml.device_by_index(0).unwrap();

        assert!(dev.encoder_sessions().unwrap().is_empty());
        assert!(dev.fbc_sessions().unwrap().is_empty());
        assert_eq!(mock::list_capacities("nvmlDeviceGetEncoderSessions"), vec![0]);
        assert_eq!(mock::list_capacities("nvmlDeviceGetFBCSessions"), vec![0]);
    }

    #[test]
    fn test_encoder_sessions_fetched_in_two_phases() {
        let gpu = MockGpu::new("GPU")
            .with_encoder_session(100, 0, 60, 900)
            .with_encoder_session(200, 1, 30, 1500)
            .with_encoder_session(300, 9, 24, 2000);
        let nvml = session(vec![gpu]);
        let dev = nvml.device_by_index(0).unwrap();

        let sessions = dev.encoder_sessions().unwrap();
        assert_eq!(mock::list_capacities("nvmlDeviceGetEncoderSessions"), vec![0, 3]);
        let ids: Vec<u32> = sessions.iter().map(|s| s.session_id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(sessions[0].codec, EncoderType::H264);
        assert_eq!(sessions[1].codec, EncoderType::Hevc);
        assert_eq!(sessions[2].codec, EncoderType::Unknown(9));
        assert_eq!((sessions[1].h_resolution, sessions[1].v_resolution), (1920, 1080));
        assert_eq!(sessions[2].pid, 300);

        let stats = dev.encoder_stats().unwrap();
        assert_eq!(stats.session_count, 3);
        assert_eq!(stats.average_fps, 38);
        assert_eq!(stats.average_latency, 1466);
    }

    #[test]
    fn test_fbc_sessions_fetched_in_two_phases() {
        let gpu = MockGpu::new("GPU")
            .with_fbc_session(7, 4, 60, 100)
            .with_fbc_session(8, 4, 30, 300);
        let nvml = session(vec![gpu]);
        let dev = nvml.device_by_index(0).unwrap();

        let sessions = dev.fbc_sessions().unwrap();
        assert_eq!(mock::list_capacities("nvmlDeviceGetFBCSessions"), vec![0, 2]);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].pid, 7);
        assert_eq!(sessions[1].session_type, FbcSessionType::HardwareEncoder);
        assert_eq!(sessions[1].session_type.to_string(), "hwenc");
        assert_eq!(sessions[0].h_max_resolution, 3840);
        assert!(!sessions[0].diffmap_enabled());

        let stats = dev.fbc_stats().unwrap();
        assert_eq!(stats.sessions_count, 2);
        assert_eq!(stats.average_fps, 45);
        assert_eq!(stats.average_latency, 200);
    }

    #[test]
    fn test_bar1_and_bus_width() {
        let nvml = session(vec![MockGpu::new("GPU")]);
        let dev = nvml.device_by_index(0).unwrap();

        let bar1 = dev.bar1_memory_info().unwrap();
        assert_eq!(bar1.total, 256 << 20);
        assert_eq!(bar1.used, 8 << 20);
        assert_eq!(bar1.total, bar1.free + bar1.used);
        assert_eq!(dev.memory_bus_width().unwrap(), 384);
    }

    #[test]
    fn test_detailed_ecc_counts_per_error_type() {
        let mut gpu = MockGpu::new("GPU");
        gpu.ecc_mode = (1, 1);
        gpu.ecc_detailed[0] = nvmlEccErrorCounts_t {
            l1Cache: 1,
            l2Cache: 2,
            deviceMemory: 30,
            registerFile: 4,
        };
        gpu.ecc_detailed[1].deviceMemory = 5;
        let nvml = session(vec![gpu]);
        let dev = nvml.device_by_index(0).unwrap();

        let corrected = dev
            .detailed_ecc_errors(MemoryErrorType::Corrected, EccCounterType::Volatile)
            .unwrap();
        assert_eq!(corrected.l2_cache, 2);
        assert_eq!(corrected.device_memory, 30);
        assert_eq!(corrected.total(), 37);

        let uncorrected = dev
            .detailed_ecc_errors(MemoryErrorType::Uncorrected, EccCounterType::Aggregate)
            .unwrap();
        assert_eq!(uncorrected.device_memory, 5);
        assert_eq!(uncorrected.l1_cache, 0);
    }

    #[test]
    fn test_detailed_ecc_without_ecc_is_unsupported() {
        let nvml = session(vec![MockGpu::new("GPU")]);
        let dev = nvml.device_by_index(0).unwrap();

        let err = dev
            .detailed_ecc_errors(MemoryErrorType::Corrected, EccCounterType::Volatile)
            .unwrap_err();
        assert_eq!(err, NvmlError::NotSupported);
    }

    #[test]
    fn test_applications_clocks() {
        let mut gpu = MockGpu::new("GPU");
        gpu.default_applications_clocks = (1200, 9501);
        let nvml = session(vec![gpu]);
        let dev = nvml.device_by_index(0).unwrap();

        assert_eq!(dev.applications_clock(ClockType::Graphics).unwrap(), 1395);
        assert_eq!(dev.applications_clock(ClockType::Memory).unwrap(), 9751);
        assert_eq!(dev.default_applications_clock(ClockType::Graphics).unwrap(), 1200);
        assert_eq!(
            dev.applications_clock(ClockType::Video).unwrap_err(),
            NvmlError::NotSupported
        );
    }

    #[test]
    fn test_clock_monitor_faults() {
        let mut gpu = MockGpu::new("GPU");
        gpu.clock_monitor.bGlobalStatus = 1;
        gpu.clock_monitor.clkMonListSize = 2;
        gpu.clock_monitor.clkMonList[0] = nvmlClkMonFaultInfo_t {
            clkApiDomain: 0,
            clkDomainFaultMask: 0x3,
        };
        gpu.clock_monitor.clkMonList[1].clkApiDomain = 2;
        let nvml = session(vec![gpu]);
        let dev = nvml.device_by_index(0).unwrap();

        let status = dev.clock_monitor_status().unwrap();
        assert!(status.global_fault);
        assert_eq!(status.faults.len(), 2);
        assert_eq!(status.faults[0].fault_mask, 0x3);
        assert_eq!(status.faults[1].clock_domain, 2);
    }

    #[test]
    fn test_clock_monitor_size_is_clamped_to_array() {
        let mut gpu = MockGpu::new("GPU");
        gpu.clock_monitor.clkMonListSize = 1000;
        let nvml = session(vec![gpu]);
        let dev = nvml.device_by_index(0).unwrap();

        let status = dev.clock_monitor_status().unwrap();
        assert!(!status.global_fault);
        assert_eq!(status.faults.len(), buffers::MAX_CLK_DOMAINS);
    }

    #[test]
    fn test_bridge_chips() {
        let mut gpu = MockGpu::new("GPU");
        gpu.bridge_hierarchy.bridgeCount = 2;
        gpu.bridge_hierarchy.bridgeChipInfo[0] = nvmlBridgeChipInfo_t {
            r#type: 0,
            fwVersion: 0x0102,
        };
        gpu.bridge_hierarchy.bridgeChipInfo[1] = nvmlBridgeChipInfo_t {
            r#type: 6,
            fwVersion: 0,
        };
        let nvml = session(vec![gpu]);
        let dev = nvml.device_by_index(0).unwrap();

        let chips = dev.bridge_chips().unwrap();
        assert_eq!(chips.len(), 2);
        assert_eq!(chips[0].kind, crate::schema::BridgeChipType::Plx);
        assert_eq!(chips[0].firmware_version, 0x0102);
        assert_eq!(chips[1].kind, crate::schema::BridgeChipType::Unknown(6));
    }

    #[test]
    fn test_bridge_count_is_clamped_to_array() {
        let mut gpu = MockGpu::new("GPU");
        gpu.bridge_hierarchy.bridgeCount = 200;
        let nvml = session(vec![gpu, MockGpu::new("GPU")]);

        let dev = nvml.device_by_index(0).unwrap();
        assert_eq!(dev.bridge_chips().unwrap().len(), buffers::MAX_PHYSICAL_BRIDGE);

        let dev = nvml.device_by_index(1).unwrap();
        assert!(dev.bridge_chips().unwrap().is_empty());
    }
}
