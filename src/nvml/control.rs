//! Device setters
//!
//! These change GPU state and mostly need root. They take `&mut self` so a
//! caller cannot hold a read borrow across a change.

use crate::domain::{FanSpeed, PowerLimit};
use crate::error::NvmlError;
use crate::ffi::types::nvmlDevice_t;
use crate::ffi::NativeSymbols;
use crate::nvml::device::Device;
use crate::nvml::marshal::check;
use crate::schema::{
    ComputeMode, DriverModel, EccCounterType, EnableState, FanControlPolicy, GpuOperationMode,
    RestrictedApi, TemperatureThreshold,
};

use std::os::raw::{c_int, c_uint};

/// `NVML_DRIVER_MODEL_FORCE`
const DRIVER_MODEL_FORCE: c_uint = 0x1;

impl Device<'_> {
    fn command(
        &mut self,
        f: impl FnOnce(&NativeSymbols, nvmlDevice_t) -> Result<u32, NvmlError>,
    ) -> Result<(), NvmlError> {
        self.call(|sym, h| {
            let code = f(sym, h)?;
            check(code)
        })
    }

    /// `nvmlDeviceClearEccErrorCounts`
    pub fn clear_ecc_error_counts(&mut self, counter: EccCounterType) -> Result<(), NvmlError> {
        log::info!("Clearing {} ECC error counts", counter);
        self.command(|sym, h| unsafe { sym.nvmlDeviceClearEccErrorCounts(h, counter.as_raw()) })
    }

    /// `nvmlDeviceSetEccMode`; takes effect after the next reboot
    pub fn set_ecc_mode(&mut self, state: EnableState) -> Result<(), NvmlError> {
        self.command(|sym, h| unsafe { sym.nvmlDeviceSetEccMode(h, state.as_raw()) })
    }

    /// `nvmlDeviceSetGpuLockedClocks`, in MHz
    pub fn set_gpu_locked_clocks(&mut self, min_mhz: u32, max_mhz: u32) -> Result<(), NvmlError> {
        if min_mhz > max_mhz {
            return Err(NvmlError::InvalidArg);
        }
        self.command(|sym, h| unsafe { sym.nvmlDeviceSetGpuLockedClocks(h, min_mhz, max_mhz) })
    }

    /// `nvmlDeviceResetGpuLockedClocks`
    pub fn reset_gpu_locked_clocks(&mut self) -> Result<(), NvmlError> {
        self.command(|sym, h| unsafe { sym.nvmlDeviceResetGpuLockedClocks(h) })
    }

    /// `nvmlDeviceSetMemoryLockedClocks`, in MHz
    pub fn set_memory_locked_clocks(&mut self, min_mhz: u32, max_mhz: u32) -> Result<(), NvmlError> {
        if min_mhz > max_mhz {
            return Err(NvmlError::InvalidArg);
        }
        self.command(|sym, h| unsafe { sym.nvmlDeviceSetMemoryLockedClocks(h, min_mhz, max_mhz) })
    }

    /// `nvmlDeviceResetMemoryLockedClocks`
    pub fn reset_memory_locked_clocks(&mut self) -> Result<(), NvmlError> {
        self.command(|sym, h| unsafe { sym.nvmlDeviceResetMemoryLockedClocks(h) })
    }

    /// `nvmlDeviceSetApplicationsClocks`, in MHz
    pub fn set_applications_clocks(&mut self, memory_mhz: u32, graphics_mhz: u32) -> Result<(), NvmlError> {
        self.command(|sym, h| unsafe {
            sym.nvmlDeviceSetApplicationsClocks(h, memory_mhz, graphics_mhz)
        })
    }

    /// `nvmlDeviceResetApplicationsClocks`
    pub fn reset_applications_clocks(&mut self) -> Result<(), NvmlError> {
        self.command(|sym, h| unsafe { sym.nvmlDeviceResetApplicationsClocks(h) })
    }

    /// `nvmlDeviceSetAutoBoostedClocksEnabled`
    pub fn set_auto_boosted_clocks_enabled(&mut self, state: EnableState) -> Result<(), NvmlError> {
        self.command(|sym, h| unsafe {
            sym.nvmlDeviceSetAutoBoostedClocksEnabled(h, state.as_raw())
        })
    }

    /// `nvmlDeviceSetGpcClkVfOffset`, in MHz
    pub fn set_gpc_clk_vf_offset(&mut self, offset: i32) -> Result<(), NvmlError> {
        self.command(|sym, h| unsafe { sym.nvmlDeviceSetGpcClkVfOffset(h, offset as c_int) })
    }

    /// `nvmlDeviceSetMemClkVfOffset`, in MHz
    pub fn set_mem_clk_vf_offset(&mut self, offset: i32) -> Result<(), NvmlError> {
        self.command(|sym, h| unsafe { sym.nvmlDeviceSetMemClkVfOffset(h, offset as c_int) })
    }

    /// `nvmlDeviceSetAPIRestriction`
    pub fn set_api_restriction(&mut self, api: RestrictedApi, state: EnableState) -> Result<(), NvmlError> {
        self.command(|sym, h| unsafe {
            sym.nvmlDeviceSetAPIRestriction(h, api.as_raw(), state.as_raw())
        })
    }

    /// `nvmlDeviceSetComputeMode`
    pub fn set_compute_mode(&mut self, mode: ComputeMode) -> Result<(), NvmlError> {
        log::info!("Setting compute mode to {}", mode);
        self.command(|sym, h| unsafe { sym.nvmlDeviceSetComputeMode(h, mode.as_raw()) })
    }

    /// `nvmlDeviceSetPersistenceMode` (Linux only)
    pub fn set_persistence_mode(&mut self, state: EnableState) -> Result<(), NvmlError> {
        log::info!("Setting persistence mode to {}", state);
        self.command(|sym, h| unsafe { sym.nvmlDeviceSetPersistenceMode(h, state.as_raw()) })
    }

    /// `nvmlDeviceSetDriverModel` (Windows only). `force` skips the check
    /// for attached displays.
    pub fn set_driver_model(&mut self, model: DriverModel, force: bool) -> Result<(), NvmlError> {
        let flags = if force { DRIVER_MODEL_FORCE } else { 0 };
        self.command(|sym, h| unsafe { sym.nvmlDeviceSetDriverModel(h, model.as_raw(), flags) })
    }

    /// `nvmlDeviceSetGpuOperationMode`; takes effect after the next reboot
    pub fn set_gpu_operation_mode(&mut self, mode: GpuOperationMode) -> Result<(), NvmlError> {
        self.command(|sym, h| unsafe { sym.nvmlDeviceSetGpuOperationMode(h, mode.as_raw()) })
    }

    /// `nvmlDeviceSetConfComputeUnprotectedMemSize`, in KiB
    pub fn set_conf_compute_unprotected_mem_size(&mut self, size_kib: u64) -> Result<(), NvmlError> {
        self.command(|sym, h| unsafe {
            sym.nvmlDeviceSetConfComputeUnprotectedMemSize(h, size_kib)
        })
    }

    /// `nvmlDeviceSetPowerManagementLimit`
    pub fn set_power_management_limit(&mut self, limit: PowerLimit) -> Result<(), NvmlError> {
        log::info!("Setting power limit to {}", limit);
        self.command(|sym, h| unsafe {
            sym.nvmlDeviceSetPowerManagementLimit(h, limit.as_milliwatts())
        })
    }

    /// `nvmlDeviceSetFanSpeed_v2`. The fan switches to manual control until
    /// [`Device::set_default_fan_speed`] is called.
    pub fn set_fan_speed(&mut self, fan: u32, speed: FanSpeed) -> Result<(), NvmlError> {
        log::info!("Setting fan {} to {}", fan, speed);
        self.command(|sym, h| unsafe {
            sym.nvmlDeviceSetFanSpeed_v2(h, fan, speed.as_percentage())
        })
    }

    /// `nvmlDeviceSetDefaultFanSpeed_v2`: hand the fan back to the driver
    pub fn set_default_fan_speed(&mut self, fan: u32) -> Result<(), NvmlError> {
        self.command(|sym, h| unsafe { sym.nvmlDeviceSetDefaultFanSpeed_v2(h, fan) })
    }

    /// `nvmlDeviceSetFanControlPolicy`
    pub fn set_fan_control_policy(&mut self, fan: u32, policy: FanControlPolicy) -> Result<(), NvmlError> {
        self.command(|sym, h| unsafe {
            sym.nvmlDeviceSetFanControlPolicy(h, fan, policy.as_raw())
        })
    }

    /// `nvmlDeviceSetTemperatureThreshold`, in °C. Only the acoustic and
    /// GPS thresholds are writable on current drivers.
    pub fn set_temperature_threshold(
        &mut self,
        threshold: TemperatureThreshold,
        celsius: i32,
    ) -> Result<(), NvmlError> {
        let mut value: c_int = celsius;
        self.command(|sym, h| unsafe {
            sym.nvmlDeviceSetTemperatureThreshold(h, threshold.as_raw(), &mut value)
        })
    }
}
