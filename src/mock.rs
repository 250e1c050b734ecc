//! Native test double
//!
//! A fake NVML built from plain `extern "C"` functions, so tests exercise the
//! real facade, marshalling and two-phase list code without a GPU.
//!
//! State is thread-local: each test thread calls [`install`] with its own
//! fake devices and gets a [`NativeLibrary`] whose entry points read and
//! write that state. Device handles are `index + 1` cast to a pointer.

#![allow(non_snake_case)]

use crate::ffi::types::*;
use crate::ffi::{NativeLibrary, NativeSymbols};
use crate::schema::status;

use std::cell::RefCell;
use std::collections::HashMap;
use std::os::raw::{c_char, c_int, c_uint, c_ulonglong};
use std::ptr;
use std::sync::Arc;

/// One fake fan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFan {
    pub speed: u32,
    /// Raw `nvmlFanControlPolicy_t`
    pub policy: u32,
}

/// One fake GPU. Fields hold raw native values.
#[derive(Debug, Clone)]
pub struct MockGpu {
    /// Written to the buffer byte for byte, so it may contain NULs
    pub name: String,
    pub uuid: String,
    pub serial: String,
    pub vbios_version: String,
    pub pci_bus_id: String,
    pub brand: u32,
    pub architecture: u32,
    pub cuda_capability: (i32, i32),
    pub memory_total: u64,
    pub memory_used: u64,
    pub temperature: u32,
    pub slowdown_threshold: u32,
    pub shutdown_threshold: u32,
    pub power_usage_mw: u32,
    pub power_limit_mw: u32,
    pub power_default_mw: u32,
    pub power_min_mw: u32,
    pub power_max_mw: u32,
    pub compute_mode: u32,
    pub persistence_mode: u32,
    pub performance_state: u32,
    pub utilization: (u32, u32),
    pub encoder_utilization: u32,
    pub decoder_utilization: u32,
    pub graphics_clock: u32,
    pub memory_clock: u32,
    pub max_graphics_clock: u32,
    pub max_memory_clock: u32,
    pub locked_gpu_clocks: Option<(u32, u32)>,
    pub locked_memory_clocks: Option<(u32, u32)>,
    pub throttle_reasons: u64,
    /// (current gen, current width, max gen, max width)
    pub pcie: (u32, u32, u32, u32),
    pub fans: Vec<MockFan>,
    pub fan_range: (u32, u32),
    /// (pid, used bytes)
    pub compute_processes: Vec<(u32, u64)>,
    pub graphics_processes: Vec<(u32, u64)>,
    /// (current, pending)
    pub ecc_mode: (u32, u32),
    pub ecc_corrected: u64,
    pub ecc_uncorrected: u64,
    /// Indexed by `nvmlMemoryErrorType_t`
    pub ecc_detailed: [nvmlEccErrorCounts_t; 2],
    pub memory_bus_width: u32,
    /// (total, used) bytes
    pub bar1: (u64, u64),
    pub encoder_sessions: Vec<nvmlEncoderSessionInfo_t>,
    pub fbc_sessions: Vec<nvmlFBCSessionInfo_t>,
    /// Indexed by `nvmlRestrictedAPI_t`
    pub api_restrictions: [u32; 2],
    /// (graphics, memory) MHz
    pub applications_clocks: (u32, u32),
    pub default_applications_clocks: (u32, u32),
    pub clock_monitor: nvmlClkMonStatus_t,
    pub bridge_hierarchy: nvmlBridgeChipHierarchy_t,
    /// `None` reports the acoustic threshold as unsupported
    pub acoustic_threshold: Option<i32>,
    pub unprotected_mem_kib: u64,
}

impl MockGpu {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            uuid: "GPU-00000000-0000-0000-0000-000000000000".to_string(),
            serial: "1320000000000".to_string(),
            vbios_version: "95.02.18.80.5F".to_string(),
            pci_bus_id: "00000000:01:00.0".to_string(),
            brand: 5,
            architecture: 7,
            cuda_capability: (8, 6),
            memory_total: 24 * 1024 * 1024 * 1024,
            memory_used: 2 * 1024 * 1024 * 1024,
            temperature: 45,
            slowdown_threshold: 90,
            shutdown_threshold: 98,
            power_usage_mw: 120_000,
            power_limit_mw: 350_000,
            power_default_mw: 350_000,
            power_min_mw: 100_000,
            power_max_mw: 400_000,
            compute_mode: 0,
            persistence_mode: 0,
            performance_state: 2,
            utilization: (30, 10),
            encoder_utilization: 0,
            decoder_utilization: 0,
            graphics_clock: 1395,
            memory_clock: 9751,
            max_graphics_clock: 2100,
            max_memory_clock: 9751,
            locked_gpu_clocks: None,
            locked_memory_clocks: None,
            throttle_reasons: 0,
            pcie: (4, 16, 4, 16),
            fans: vec![MockFan { speed: 30, policy: 0 }; 2],
            fan_range: (30, 100),
            compute_processes: Vec::new(),
            graphics_processes: Vec::new(),
            ecc_mode: (0, 0),
            ecc_corrected: 0,
            ecc_uncorrected: 0,
            ecc_detailed: [nvmlEccErrorCounts_t::default(); 2],
            memory_bus_width: 384,
            bar1: (256 * 1024 * 1024, 8 * 1024 * 1024),
            encoder_sessions: Vec::new(),
            fbc_sessions: Vec::new(),
            api_restrictions: [1, 1],
            applications_clocks: (1395, 9751),
            default_applications_clocks: (1395, 9751),
            clock_monitor: nvmlClkMonStatus_t::default(),
            bridge_hierarchy: nvmlBridgeChipHierarchy_t::default(),
            acoustic_threshold: None,
            unprotected_mem_kib: 0,
        }
    }

    pub fn with_uuid(mut self, uuid: &str) -> Self {
        self.uuid = uuid.to_string();
        self
    }

    pub fn with_pci_bus_id(mut self, bus_id: &str) -> Self {
        self.pci_bus_id = bus_id.to_string();
        self
    }

    pub fn with_compute_process(mut self, pid: u32, used: u64) -> Self {
        self.compute_processes.push((pid, used));
        self
    }

    pub fn with_graphics_process(mut self, pid: u32, used: u64) -> Self {
        self.graphics_processes.push((pid, used));
        self
    }

    pub fn without_fans(mut self) -> Self {
        self.fans.clear();
        self
    }

    /// Add an encoder session with the next session id.
    pub fn with_encoder_session(mut self, pid: u32, codec: u32, fps: u32, latency: u32) -> Self {
        self.encoder_sessions.push(nvmlEncoderSessionInfo_t {
            sessionId: self.encoder_sessions.len() as c_uint + 1,
            pid,
            codecType: codec,
            hResolution: 1920,
            vResolution: 1080,
            averageFps: fps,
            averageLatency: latency,
            ..Default::default()
        });
        self
    }

    /// Add a frame capture session with the next session id.
    pub fn with_fbc_session(mut self, pid: u32, session_type: u32, fps: u32, latency: u32) -> Self {
        self.fbc_sessions.push(nvmlFBCSessionInfo_t {
            sessionId: self.fbc_sessions.len() as c_uint + 1,
            pid,
            sessionType: session_type,
            hMaxResolution: 3840,
            vMaxResolution: 2160,
            hResolution: 1920,
            vResolution: 1080,
            averageFPS: fps,
            averageLatency: latency,
            ..Default::default()
        });
        self
    }
}

/// Everything the fake library knows, per thread
#[derive(Debug, Default)]
pub struct MockState {
    /// NVML reference-counts init/shutdown pairs
    pub init_count: u32,
    /// Flags passed to the last `nvmlInitWithFlags`
    pub init_flags: u32,
    pub gpus: Vec<MockGpu>,
    pub driver_version: String,
    pub nvml_version: String,
    pub cuda_driver_version: i32,
    pub process_names: HashMap<u32, String>,
    /// Every entry point invoked, in order
    pub calls: Vec<&'static str>,
    /// Count argument seen on entry to each list call
    pub list_capacities: Vec<(&'static str, u32)>,
    /// Status returned instead of running the entry point
    pub forced: HashMap<&'static str, u32>,
    /// Processes added to the queried GPU between the two phases of the next
    /// process list call
    pub churn: Vec<(u32, u64)>,
    /// `nvmlSystemGet/SetConfComputeGpusReadyState`
    pub conf_compute_ready: u32,
}

thread_local! {
    static STATE: RefCell<MockState> = RefCell::new(MockState::default());
}

/// Replace this thread's fake state and return a library bound to it.
pub fn install(gpus: Vec<MockGpu>) -> Arc<NativeLibrary> {
    STATE.with(|state| {
        *state.borrow_mut() = MockState {
            gpus,
            driver_version: "550.54.15".to_string(),
            nvml_version: "12.550.54.15".to_string(),
            cuda_driver_version: 12040,
            ..Default::default()
        };
    });
    Arc::new(NativeLibrary::from_symbols(symbols(), "mock"))
}

/// Inspect or change this thread's fake state.
pub fn with_state<R>(f: impl FnOnce(&mut MockState) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

/// Entry points invoked so far.
pub fn calls() -> Vec<&'static str> {
    with_state(|s| s.calls.clone())
}

/// How many times `name` was invoked.
pub fn call_count(name: &str) -> usize {
    with_state(|s| s.calls.iter().filter(|c| **c == name).count())
}

/// Count arguments passed to list call `name`, in order.
pub fn list_capacities(name: &str) -> Vec<u32> {
    with_state(|s| {
        s.list_capacities
            .iter()
            .filter(|(n, _)| *n == name)
            .map(|(_, c)| *c)
            .collect()
    })
}

/// Make `name` return `code` without doing anything.
pub fn force_status(name: &'static str, code: u32) {
    with_state(|s| {
        s.forced.insert(name, code);
    });
}

/// The full fake entry point table.
pub fn symbols() -> NativeSymbols {
    NativeSymbols {
        nvmlInit: Some(fake_init),
        nvmlInit_v2: Some(fake_init_v2),
        nvmlInitWithFlags: Some(fake_init_with_flags),
        nvmlShutdown: Some(fake_shutdown),
        nvmlSystemGetDriverVersion: Some(fake_driver_version),
        nvmlSystemGetNVMLVersion: Some(fake_nvml_version),
        nvmlSystemGetCudaDriverVersion: Some(fake_cuda_version),
        nvmlSystemGetCudaDriverVersion_v2: Some(fake_cuda_version_v2),
        nvmlSystemGetProcessName: Some(fake_process_name),
        nvmlSystemGetConfComputeGpusReadyState: Some(fake_conf_compute_ready),
        nvmlSystemSetConfComputeGpusReadyState: Some(fake_set_conf_compute_ready),
        nvmlDeviceGetCount: Some(fake_count),
        nvmlDeviceGetCount_v2: Some(fake_count_v2),
        nvmlDeviceGetHandleByIndex: Some(fake_handle_by_index),
        nvmlDeviceGetHandleByIndex_v2: Some(fake_handle_by_index_v2),
        nvmlDeviceGetHandleByUUID: Some(fake_handle_by_uuid),
        nvmlDeviceGetHandleBySerial: Some(fake_handle_by_serial),
        nvmlDeviceGetHandleByPciBusId_v2: Some(fake_handle_by_pci_bus_id),
        nvmlDeviceGetIndex: Some(fake_index),
        nvmlDeviceGetName: Some(fake_name),
        nvmlDeviceGetUUID: Some(fake_uuid),
        nvmlDeviceGetSerial: Some(fake_serial),
        nvmlDeviceGetVbiosVersion: Some(fake_vbios_version),
        nvmlDeviceGetBrand: Some(fake_brand),
        nvmlDeviceGetArchitecture: Some(fake_architecture),
        nvmlDeviceGetCudaComputeCapability: Some(fake_cuda_capability),
        nvmlDeviceGetBridgeChipInfo: Some(fake_bridge_chip_info),
        nvmlDeviceGetPciInfo_v3: Some(fake_pci_info),
        nvmlDeviceGetCurrPcieLinkGeneration: Some(fake_curr_pcie_gen),
        nvmlDeviceGetCurrPcieLinkWidth: Some(fake_curr_pcie_width),
        nvmlDeviceGetMaxPcieLinkGeneration: Some(fake_max_pcie_gen),
        nvmlDeviceGetMaxPcieLinkWidth: Some(fake_max_pcie_width),
        nvmlDeviceGetMemoryInfo: Some(fake_memory_info),
        nvmlDeviceGetBAR1MemoryInfo: Some(fake_bar1_memory_info),
        nvmlDeviceGetMemoryBusWidth: Some(fake_memory_bus_width),
        nvmlDeviceGetEccMode: Some(fake_ecc_mode),
        nvmlDeviceSetEccMode: Some(fake_set_ecc_mode),
        nvmlDeviceGetDetailedEccErrors: Some(fake_detailed_ecc_errors),
        nvmlDeviceGetTotalEccErrors: Some(fake_total_ecc_errors),
        nvmlDeviceClearEccErrorCounts: Some(fake_clear_ecc_error_counts),
        nvmlDeviceGetUtilizationRates: Some(fake_utilization),
        nvmlDeviceGetEncoderUtilization: Some(fake_encoder_utilization),
        nvmlDeviceGetDecoderUtilization: Some(fake_decoder_utilization),
        nvmlDeviceGetEncoderStats: Some(fake_encoder_stats),
        nvmlDeviceGetEncoderSessions: Some(fake_encoder_sessions),
        nvmlDeviceGetFBCStats: Some(fake_fbc_stats),
        nvmlDeviceGetFBCSessions: Some(fake_fbc_sessions),
        nvmlDeviceGetComputeRunningProcesses: Some(fake_compute_processes_v1),
        nvmlDeviceGetComputeRunningProcesses_v3: Some(fake_compute_processes_v3),
        nvmlDeviceGetGraphicsRunningProcesses: Some(fake_graphics_processes_v1),
        nvmlDeviceGetGraphicsRunningProcesses_v3: Some(fake_graphics_processes_v3),
        nvmlDeviceGetTemperature: Some(fake_temperature),
        nvmlDeviceGetTemperatureThreshold: Some(fake_temperature_threshold),
        nvmlDeviceSetTemperatureThreshold: Some(fake_set_temperature_threshold),
        nvmlDeviceGetPerformanceState: Some(fake_performance_state),
        nvmlDeviceGetPowerUsage: Some(fake_power_usage),
        nvmlDeviceGetPowerManagementLimit: Some(fake_power_limit),
        nvmlDeviceGetPowerManagementDefaultLimit: Some(fake_power_default_limit),
        nvmlDeviceGetPowerManagementLimitConstraints: Some(fake_power_constraints),
        nvmlDeviceGetEnforcedPowerLimit: Some(fake_power_limit),
        nvmlDeviceSetPowerManagementLimit: Some(fake_set_power_limit),
        nvmlDeviceGetComputeMode: Some(fake_compute_mode),
        nvmlDeviceSetComputeMode: Some(fake_set_compute_mode),
        nvmlDeviceGetPersistenceMode: Some(fake_persistence_mode),
        nvmlDeviceSetPersistenceMode: Some(fake_set_persistence_mode),
        nvmlDeviceGetAPIRestriction: Some(fake_api_restriction),
        nvmlDeviceSetAPIRestriction: Some(fake_set_api_restriction),
        nvmlDeviceSetConfComputeUnprotectedMemSize: Some(fake_set_unprotected_mem_size),
        nvmlDeviceGetClockInfo: Some(fake_clock_info),
        nvmlDeviceGetMaxClockInfo: Some(fake_max_clock_info),
        nvmlDeviceGetApplicationsClock: Some(fake_applications_clock),
        nvmlDeviceGetDefaultApplicationsClock: Some(fake_default_applications_clock),
        nvmlDeviceSetApplicationsClocks: Some(fake_set_applications_clocks),
        nvmlDeviceResetApplicationsClocks: Some(fake_reset_applications_clocks),
        nvmlDeviceSetGpuLockedClocks: Some(fake_set_gpu_locked_clocks),
        nvmlDeviceResetGpuLockedClocks: Some(fake_reset_gpu_locked_clocks),
        nvmlDeviceSetMemoryLockedClocks: Some(fake_set_memory_locked_clocks),
        nvmlDeviceResetMemoryLockedClocks: Some(fake_reset_memory_locked_clocks),
        nvmlDeviceGetCurrentClocksThrottleReasons: Some(fake_throttle_reasons),
        nvmlDeviceGetClkMonStatus: Some(fake_clk_mon_status),
        nvmlDeviceGetNumFans: Some(fake_num_fans),
        nvmlDeviceGetFanSpeed: Some(fake_fan_speed),
        nvmlDeviceGetFanSpeed_v2: Some(fake_fan_speed_v2),
        nvmlDeviceSetFanSpeed_v2: Some(fake_set_fan_speed),
        nvmlDeviceSetDefaultFanSpeed_v2: Some(fake_set_default_fan_speed),
        nvmlDeviceGetMinMaxFanSpeed: Some(fake_min_max_fan_speed),
        nvmlDeviceGetFanControlPolicy_v2: Some(fake_fan_control_policy),
        nvmlDeviceSetFanControlPolicy: Some(fake_set_fan_control_policy),
        ..Default::default()
    }
}

// Plumbing shared by every fake

/// Record the call, apply a forced status, require an initialized library.
fn enter(state: &mut MockState, name: &'static str) -> Result<(), u32> {
    state.calls.push(name);
    if let Some(&code) = state.forced.get(name) {
        return Err(code);
    }
    if state.init_count == 0 {
        return Err(status::UNINITIALIZED);
    }
    Ok(())
}

fn system(name: &'static str, f: impl FnOnce(&mut MockState) -> u32) -> nvmlReturn_t {
    with_state(|state| match enter(state, name) {
        Ok(()) => f(state),
        Err(code) => code,
    })
}

fn gpu_index(handle: nvmlDevice_t) -> Option<usize> {
    (handle as usize).checked_sub(1)
}

fn device(
    name: &'static str,
    handle: nvmlDevice_t,
    f: impl FnOnce(&mut MockGpu) -> u32,
) -> nvmlReturn_t {
    system(name, |state| {
        match gpu_index(handle).and_then(|i| state.gpus.get_mut(i)) {
            Some(gpu) => f(gpu),
            None => status::INVALID_ARGUMENT,
        }
    })
}

unsafe fn write_text(buf: *mut c_char, len: c_uint, text: &str) -> u32 {
    let bytes = text.as_bytes();
    if buf.is_null() {
        return status::INVALID_ARGUMENT;
    }
    if bytes.len() + 1 > len as usize {
        return status::INSUFFICIENT_SIZE;
    }
    ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, buf, bytes.len());
    *buf.add(bytes.len()) = 0;
    status::SUCCESS
}

unsafe fn write<T>(dst: *mut T, value: T) -> u32 {
    if dst.is_null() {
        return status::INVALID_ARGUMENT;
    }
    *dst = value;
    status::SUCCESS
}

unsafe fn fill_list<T: Copy>(count: *mut c_uint, dst: *mut T, items: &[T]) -> u32 {
    if count.is_null() {
        return status::INVALID_ARGUMENT;
    }
    let needed = items.len() as c_uint;
    if dst.is_null() || *count < needed {
        *count = needed;
        return if needed == 0 {
            status::SUCCESS
        } else {
            status::INSUFFICIENT_SIZE
        };
    }
    ptr::copy_nonoverlapping(items.as_ptr(), dst, items.len());
    *count = needed;
    status::SUCCESS
}

// Session

fn init(name: &'static str) -> nvmlReturn_t {
    with_state(|state| {
        state.calls.push(name);
        if let Some(&code) = state.forced.get(name) {
            return code;
        }
        state.init_count += 1;
        status::SUCCESS
    })
}

unsafe extern "C" fn fake_init() -> nvmlReturn_t {
    init("nvmlInit")
}

unsafe extern "C" fn fake_init_v2() -> nvmlReturn_t {
    init("nvmlInit_v2")
}

unsafe extern "C" fn fake_init_with_flags(flags: c_uint) -> nvmlReturn_t {
    with_state(|s| s.init_flags = flags);
    init("nvmlInitWithFlags")
}

unsafe extern "C" fn fake_shutdown() -> nvmlReturn_t {
    system("nvmlShutdown", |state| {
        state.init_count -= 1;
        status::SUCCESS
    })
}

// System

unsafe extern "C" fn fake_driver_version(buf: *mut c_char, len: c_uint) -> nvmlReturn_t {
    system("nvmlSystemGetDriverVersion", |s| write_text(buf, len, &s.driver_version))
}

unsafe extern "C" fn fake_nvml_version(buf: *mut c_char, len: c_uint) -> nvmlReturn_t {
    system("nvmlSystemGetNVMLVersion", |s| write_text(buf, len, &s.nvml_version))
}

unsafe extern "C" fn fake_cuda_version(version: *mut c_int) -> nvmlReturn_t {
    system("nvmlSystemGetCudaDriverVersion", |s| write(version, s.cuda_driver_version))
}

unsafe extern "C" fn fake_cuda_version_v2(version: *mut c_int) -> nvmlReturn_t {
    system("nvmlSystemGetCudaDriverVersion_v2", |s| write(version, s.cuda_driver_version))
}

unsafe extern "C" fn fake_process_name(pid: c_uint, buf: *mut c_char, len: c_uint) -> nvmlReturn_t {
    system("nvmlSystemGetProcessName", |s| match s.process_names.get(&pid) {
        Some(name) => write_text(buf, len, name),
        None => status::NOT_FOUND,
    })
}

unsafe extern "C" fn fake_conf_compute_ready(ready: *mut c_uint) -> nvmlReturn_t {
    system("nvmlSystemGetConfComputeGpusReadyState", |s| write(ready, s.conf_compute_ready))
}

unsafe extern "C" fn fake_set_conf_compute_ready(ready: c_uint) -> nvmlReturn_t {
    system("nvmlSystemSetConfComputeGpusReadyState", |s| {
        if ready > 1 {
            return status::INVALID_ARGUMENT;
        }
        s.conf_compute_ready = ready;
        status::SUCCESS
    })
}

// Lookup

unsafe extern "C" fn fake_count(count: *mut c_uint) -> nvmlReturn_t {
    system("nvmlDeviceGetCount", |s| write(count, s.gpus.len() as c_uint))
}

unsafe extern "C" fn fake_count_v2(count: *mut c_uint) -> nvmlReturn_t {
    system("nvmlDeviceGetCount_v2", |s| write(count, s.gpus.len() as c_uint))
}

unsafe fn handle_by_index(name: &'static str, index: c_uint, out: *mut nvmlDevice_t) -> nvmlReturn_t {
    system(name, |s| {
        if index as usize >= s.gpus.len() {
            return status::INVALID_ARGUMENT;
        }
        write(out, (index as usize + 1) as nvmlDevice_t)
    })
}

unsafe extern "C" fn fake_handle_by_index(index: c_uint, out: *mut nvmlDevice_t) -> nvmlReturn_t {
    handle_by_index("nvmlDeviceGetHandleByIndex", index, out)
}

unsafe extern "C" fn fake_handle_by_index_v2(index: c_uint, out: *mut nvmlDevice_t) -> nvmlReturn_t {
    handle_by_index("nvmlDeviceGetHandleByIndex_v2", index, out)
}

unsafe fn handle_by(
    name: &'static str,
    key: *const c_char,
    out: *mut nvmlDevice_t,
    field: impl Fn(&MockGpu) -> &str,
) -> nvmlReturn_t {
    if key.is_null() {
        return status::INVALID_ARGUMENT;
    }
    let key = std::ffi::CStr::from_ptr(key).to_string_lossy().into_owned();
    system(name, |s| match s.gpus.iter().position(|g| field(g) == key) {
        Some(i) => write(out, (i + 1) as nvmlDevice_t),
        None => status::NOT_FOUND,
    })
}

unsafe extern "C" fn fake_handle_by_uuid(uuid: *const c_char, out: *mut nvmlDevice_t) -> nvmlReturn_t {
    handle_by("nvmlDeviceGetHandleByUUID", uuid, out, |g| &g.uuid)
}

unsafe extern "C" fn fake_handle_by_serial(serial: *const c_char, out: *mut nvmlDevice_t) -> nvmlReturn_t {
    handle_by("nvmlDeviceGetHandleBySerial", serial, out, |g| &g.serial)
}

unsafe extern "C" fn fake_handle_by_pci_bus_id(
    bus_id: *const c_char,
    out: *mut nvmlDevice_t,
) -> nvmlReturn_t {
    handle_by("nvmlDeviceGetHandleByPciBusId_v2", bus_id, out, |g| &g.pci_bus_id)
}

// Identity

unsafe extern "C" fn fake_index(dev: nvmlDevice_t, index: *mut c_uint) -> nvmlReturn_t {
    let i = gpu_index(dev).unwrap_or(0) as c_uint;
    device("nvmlDeviceGetIndex", dev, |_| write(index, i))
}

unsafe extern "C" fn fake_name(dev: nvmlDevice_t, buf: *mut c_char, len: c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetName", dev, |g| write_text(buf, len, &g.name))
}

unsafe extern "C" fn fake_uuid(dev: nvmlDevice_t, buf: *mut c_char, len: c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetUUID", dev, |g| write_text(buf, len, &g.uuid))
}

unsafe extern "C" fn fake_serial(dev: nvmlDevice_t, buf: *mut c_char, len: c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetSerial", dev, |g| write_text(buf, len, &g.serial))
}

unsafe extern "C" fn fake_vbios_version(
    dev: nvmlDevice_t,
    buf: *mut c_char,
    len: c_uint,
) -> nvmlReturn_t {
    device("nvmlDeviceGetVbiosVersion", dev, |g| write_text(buf, len, &g.vbios_version))
}

unsafe extern "C" fn fake_brand(dev: nvmlDevice_t, brand: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetBrand", dev, |g| write(brand, g.brand))
}

unsafe extern "C" fn fake_architecture(dev: nvmlDevice_t, arch: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetArchitecture", dev, |g| write(arch, g.architecture))
}

unsafe extern "C" fn fake_cuda_capability(
    dev: nvmlDevice_t,
    major: *mut c_int,
    minor: *mut c_int,
) -> nvmlReturn_t {
    device("nvmlDeviceGetCudaComputeCapability", dev, |g| {
        write(major, g.cuda_capability.0);
        write(minor, g.cuda_capability.1)
    })
}

unsafe extern "C" fn fake_bridge_chip_info(
    dev: nvmlDevice_t,
    hierarchy: *mut nvmlBridgeChipHierarchy_t,
) -> nvmlReturn_t {
    device("nvmlDeviceGetBridgeChipInfo", dev, |g| write(hierarchy, g.bridge_hierarchy))
}

unsafe extern "C" fn fake_pci_info(dev: nvmlDevice_t, pci: *mut nvmlPciInfo_t) -> nvmlReturn_t {
    device("nvmlDeviceGetPciInfo_v3", dev, |g| {
        if pci.is_null() {
            return status::INVALID_ARGUMENT;
        }
        let info = &mut *pci;
        let bus_id = g.pci_bus_id.as_bytes();
        for (dst, &src) in info.busId.iter_mut().zip(bus_id) {
            *dst = src as c_char;
        }
        let legacy = &bus_id[bus_id.len().saturating_sub(12)..];
        for (dst, &src) in info.busIdLegacy.iter_mut().zip(legacy) {
            *dst = src as c_char;
        }
        info.bus = 1;
        info.pciDeviceId = 0x2204_10DE;
        info.pciSubSystemId = 0x1454_10DE;
        status::SUCCESS
    })
}

unsafe extern "C" fn fake_curr_pcie_gen(dev: nvmlDevice_t, v: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetCurrPcieLinkGeneration", dev, |g| write(v, g.pcie.0))
}

unsafe extern "C" fn fake_curr_pcie_width(dev: nvmlDevice_t, v: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetCurrPcieLinkWidth", dev, |g| write(v, g.pcie.1))
}

unsafe extern "C" fn fake_max_pcie_gen(dev: nvmlDevice_t, v: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetMaxPcieLinkGeneration", dev, |g| write(v, g.pcie.2))
}

unsafe extern "C" fn fake_max_pcie_width(dev: nvmlDevice_t, v: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetMaxPcieLinkWidth", dev, |g| write(v, g.pcie.3))
}

// Memory and ECC

unsafe extern "C" fn fake_memory_info(dev: nvmlDevice_t, mem: *mut nvmlMemory_t) -> nvmlReturn_t {
    device("nvmlDeviceGetMemoryInfo", dev, |g| {
        write(
            mem,
            nvmlMemory_t {
                total: g.memory_total,
                free: g.memory_total - g.memory_used,
                used: g.memory_used,
            },
        )
    })
}

unsafe extern "C" fn fake_bar1_memory_info(dev: nvmlDevice_t, bar1: *mut nvmlBAR1Memory_t) -> nvmlReturn_t {
    device("nvmlDeviceGetBAR1MemoryInfo", dev, |g| {
        let (total, used) = g.bar1;
        write(
            bar1,
            nvmlBAR1Memory_t {
                bar1Total: total,
                bar1Free: total - used,
                bar1Used: used,
            },
        )
    })
}

unsafe extern "C" fn fake_memory_bus_width(dev: nvmlDevice_t, width: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetMemoryBusWidth", dev, |g| write(width, g.memory_bus_width))
}

unsafe extern "C" fn fake_ecc_mode(dev: nvmlDevice_t, cur: *mut c_uint, pend: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetEccMode", dev, |g| {
        write(cur, g.ecc_mode.0);
        write(pend, g.ecc_mode.1)
    })
}

unsafe extern "C" fn fake_set_ecc_mode(dev: nvmlDevice_t, mode: c_uint) -> nvmlReturn_t {
    device("nvmlDeviceSetEccMode", dev, |g| {
        g.ecc_mode.1 = mode;
        status::SUCCESS
    })
}

unsafe extern "C" fn fake_total_ecc_errors(
    dev: nvmlDevice_t,
    error_type: c_uint,
    _counter: c_uint,
    count: *mut c_ulonglong,
) -> nvmlReturn_t {
    device("nvmlDeviceGetTotalEccErrors", dev, |g| {
        if g.ecc_mode.0 == 0 {
            return status::NOT_SUPPORTED;
        }
        let value = if error_type == 0 {
            g.ecc_corrected
        } else {
            g.ecc_uncorrected
        };
        write(count, value)
    })
}

unsafe extern "C" fn fake_detailed_ecc_errors(
    dev: nvmlDevice_t,
    error_type: c_uint,
    _counter: c_uint,
    counts: *mut nvmlEccErrorCounts_t,
) -> nvmlReturn_t {
    device("nvmlDeviceGetDetailedEccErrors", dev, |g| {
        if g.ecc_mode.0 == 0 {
            return status::NOT_SUPPORTED;
        }
        match g.ecc_detailed.get(error_type as usize) {
            Some(&value) => write(counts, value),
            None => status::INVALID_ARGUMENT,
        }
    })
}

unsafe extern "C" fn fake_clear_ecc_error_counts(dev: nvmlDevice_t, _counter: c_uint) -> nvmlReturn_t {
    device("nvmlDeviceClearEccErrorCounts", dev, |g| {
        g.ecc_corrected = 0;
        g.ecc_uncorrected = 0;
        g.ecc_detailed = [nvmlEccErrorCounts_t::default(); 2];
        status::SUCCESS
    })
}

// Utilization

unsafe extern "C" fn fake_utilization(dev: nvmlDevice_t, util: *mut nvmlUtilization_t) -> nvmlReturn_t {
    device("nvmlDeviceGetUtilizationRates", dev, |g| {
        write(
            util,
            nvmlUtilization_t {
                gpu: g.utilization.0,
                memory: g.utilization.1,
            },
        )
    })
}

unsafe extern "C" fn fake_encoder_utilization(
    dev: nvmlDevice_t,
    util: *mut c_uint,
    period: *mut c_uint,
) -> nvmlReturn_t {
    device("nvmlDeviceGetEncoderUtilization", dev, |g| {
        write(util, g.encoder_utilization);
        write(period, 167_000)
    })
}

unsafe extern "C" fn fake_decoder_utilization(
    dev: nvmlDevice_t,
    util: *mut c_uint,
    period: *mut c_uint,
) -> nvmlReturn_t {
    device("nvmlDeviceGetDecoderUtilization", dev, |g| {
        write(util, g.decoder_utilization);
        write(period, 167_000)
    })
}

// Video sessions

fn average(values: impl ExactSizeIterator<Item = u32>) -> u32 {
    let n = values.len() as u32;
    if n == 0 {
        0
    } else {
        values.sum::<u32>() / n
    }
}

unsafe fn session_list<T: Copy>(
    name: &'static str,
    dev: nvmlDevice_t,
    count: *mut c_uint,
    dst: *mut T,
    sessions: impl Fn(&MockGpu) -> &[T],
) -> nvmlReturn_t {
    system(name, |state| {
        let seen = if count.is_null() { 0 } else { *count };
        state.list_capacities.push((name, seen));
        match gpu_index(dev).and_then(|i| state.gpus.get(i)) {
            Some(gpu) => fill_list(count, dst, sessions(gpu)),
            None => status::INVALID_ARGUMENT,
        }
    })
}

unsafe extern "C" fn fake_encoder_stats(
    dev: nvmlDevice_t,
    count: *mut c_uint,
    fps: *mut c_uint,
    latency: *mut c_uint,
) -> nvmlReturn_t {
    device("nvmlDeviceGetEncoderStats", dev, |g| {
        let sessions = &g.encoder_sessions;
        write(count, sessions.len() as c_uint);
        write(fps, average(sessions.iter().map(|s| s.averageFps)));
        write(latency, average(sessions.iter().map(|s| s.averageLatency)))
    })
}

unsafe extern "C" fn fake_encoder_sessions(
    dev: nvmlDevice_t,
    count: *mut c_uint,
    infos: *mut nvmlEncoderSessionInfo_t,
) -> nvmlReturn_t {
    session_list("nvmlDeviceGetEncoderSessions", dev, count, infos, |g| &g.encoder_sessions)
}

unsafe extern "C" fn fake_fbc_stats(dev: nvmlDevice_t, stats: *mut nvmlFBCStats_t) -> nvmlReturn_t {
    device("nvmlDeviceGetFBCStats", dev, |g| {
        let sessions = &g.fbc_sessions;
        write(
            stats,
            nvmlFBCStats_t {
                sessionsCount: sessions.len() as c_uint,
                averageFPS: average(sessions.iter().map(|s| s.averageFPS)),
                averageLatency: average(sessions.iter().map(|s| s.averageLatency)),
            },
        )
    })
}

unsafe extern "C" fn fake_fbc_sessions(
    dev: nvmlDevice_t,
    count: *mut c_uint,
    infos: *mut nvmlFBCSessionInfo_t,
) -> nvmlReturn_t {
    session_list("nvmlDeviceGetFBCSessions", dev, count, infos, |g| &g.fbc_sessions)
}

// Processes

unsafe fn process_list<T: Copy>(
    name: &'static str,
    dev: nvmlDevice_t,
    count: *mut c_uint,
    dst: *mut T,
    graphics: bool,
    convert: impl Fn(u32, u64) -> T,
) -> nvmlReturn_t {
    system(name, |state| {
        let seen = if count.is_null() { 0 } else { *count };
        state.list_capacities.push((name, seen));

        let Some(index) = gpu_index(dev).filter(|&i| i < state.gpus.len()) else {
            return status::INVALID_ARGUMENT;
        };
        let items: Vec<T> = {
            let gpu = &state.gpus[index];
            let source = if graphics {
                &gpu.graphics_processes
            } else {
                &gpu.compute_processes
            };
            source.iter().map(|&(pid, used)| convert(pid, used)).collect()
        };
        let code = fill_list(count, dst, &items);

        if dst.is_null() && !state.churn.is_empty() {
            let added = std::mem::take(&mut state.churn);
            let gpu = &mut state.gpus[index];
            if graphics {
                gpu.graphics_processes.extend(added);
            } else {
                gpu.compute_processes.extend(added);
            }
        }
        code
    })
}

fn v1(pid: u32, used: u64) -> nvmlProcessInfo_v1_t {
    nvmlProcessInfo_v1_t {
        pid,
        usedGpuMemory: used,
    }
}

fn v3(pid: u32, used: u64) -> nvmlProcessInfo_t {
    nvmlProcessInfo_t {
        pid,
        usedGpuMemory: used,
        gpuInstanceId: u32::MAX,
        computeInstanceId: u32::MAX,
    }
}

unsafe extern "C" fn fake_compute_processes_v1(
    dev: nvmlDevice_t,
    count: *mut c_uint,
    infos: *mut nvmlProcessInfo_v1_t,
) -> nvmlReturn_t {
    process_list("nvmlDeviceGetComputeRunningProcesses", dev, count, infos, false, v1)
}

unsafe extern "C" fn fake_compute_processes_v3(
    dev: nvmlDevice_t,
    count: *mut c_uint,
    infos: *mut nvmlProcessInfo_t,
) -> nvmlReturn_t {
    process_list("nvmlDeviceGetComputeRunningProcesses_v3", dev, count, infos, false, v3)
}

unsafe extern "C" fn fake_graphics_processes_v1(
    dev: nvmlDevice_t,
    count: *mut c_uint,
    infos: *mut nvmlProcessInfo_v1_t,
) -> nvmlReturn_t {
    process_list("nvmlDeviceGetGraphicsRunningProcesses", dev, count, infos, true, v1)
}

unsafe extern "C" fn fake_graphics_processes_v3(
    dev: nvmlDevice_t,
    count: *mut c_uint,
    infos: *mut nvmlProcessInfo_t,
) -> nvmlReturn_t {
    process_list("nvmlDeviceGetGraphicsRunningProcesses_v3", dev, count, infos, true, v3)
}

// Thermal and power

unsafe extern "C" fn fake_temperature(dev: nvmlDevice_t, sensor: c_uint, temp: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetTemperature", dev, |g| match sensor {
        0 => write(temp, g.temperature),
        _ => status::INVALID_ARGUMENT,
    })
}

unsafe extern "C" fn fake_temperature_threshold(
    dev: nvmlDevice_t,
    threshold: c_uint,
    temp: *mut c_uint,
) -> nvmlReturn_t {
    device("nvmlDeviceGetTemperatureThreshold", dev, |g| match threshold {
        0 => write(temp, g.shutdown_threshold),
        1 => write(temp, g.slowdown_threshold),
        5 => match g.acoustic_threshold {
            Some(celsius) => write(temp, celsius as c_uint),
            None => status::NOT_SUPPORTED,
        },
        _ => status::NOT_SUPPORTED,
    })
}

unsafe extern "C" fn fake_set_temperature_threshold(
    dev: nvmlDevice_t,
    threshold: c_uint,
    temp: *mut c_int,
) -> nvmlReturn_t {
    device("nvmlDeviceSetTemperatureThreshold", dev, |g| {
        if temp.is_null() {
            return status::INVALID_ARGUMENT;
        }
        match threshold {
            5 if *temp > 0 && (*temp as u32) < g.slowdown_threshold => {
                g.acoustic_threshold = Some(*temp);
                status::SUCCESS
            }
            5 => status::INVALID_ARGUMENT,
            0..=3 => status::NO_PERMISSION,
            _ => status::NOT_SUPPORTED,
        }
    })
}

unsafe extern "C" fn fake_performance_state(dev: nvmlDevice_t, state: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetPerformanceState", dev, |g| write(state, g.performance_state))
}

unsafe extern "C" fn fake_power_usage(dev: nvmlDevice_t, mw: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetPowerUsage", dev, |g| write(mw, g.power_usage_mw))
}

unsafe extern "C" fn fake_power_limit(dev: nvmlDevice_t, mw: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetPowerManagementLimit", dev, |g| write(mw, g.power_limit_mw))
}

unsafe extern "C" fn fake_power_default_limit(dev: nvmlDevice_t, mw: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetPowerManagementDefaultLimit", dev, |g| write(mw, g.power_default_mw))
}

unsafe extern "C" fn fake_power_constraints(
    dev: nvmlDevice_t,
    min: *mut c_uint,
    max: *mut c_uint,
) -> nvmlReturn_t {
    device("nvmlDeviceGetPowerManagementLimitConstraints", dev, |g| {
        write(min, g.power_min_mw);
        write(max, g.power_max_mw)
    })
}

unsafe extern "C" fn fake_set_power_limit(dev: nvmlDevice_t, mw: c_uint) -> nvmlReturn_t {
    device("nvmlDeviceSetPowerManagementLimit", dev, |g| {
        if mw < g.power_min_mw || mw > g.power_max_mw {
            return status::INVALID_ARGUMENT;
        }
        g.power_limit_mw = mw;
        status::SUCCESS
    })
}

// Modes

unsafe extern "C" fn fake_compute_mode(dev: nvmlDevice_t, mode: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetComputeMode", dev, |g| write(mode, g.compute_mode))
}

unsafe extern "C" fn fake_set_compute_mode(dev: nvmlDevice_t, mode: c_uint) -> nvmlReturn_t {
    device("nvmlDeviceSetComputeMode", dev, |g| {
        if mode > 3 {
            return status::INVALID_ARGUMENT;
        }
        g.compute_mode = mode;
        status::SUCCESS
    })
}

unsafe extern "C" fn fake_persistence_mode(dev: nvmlDevice_t, mode: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetPersistenceMode", dev, |g| write(mode, g.persistence_mode))
}

unsafe extern "C" fn fake_set_persistence_mode(dev: nvmlDevice_t, mode: c_uint) -> nvmlReturn_t {
    device("nvmlDeviceSetPersistenceMode", dev, |g| {
        g.persistence_mode = mode;
        status::SUCCESS
    })
}

unsafe extern "C" fn fake_api_restriction(dev: nvmlDevice_t, api: c_uint, state: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetAPIRestriction", dev, |g| match g.api_restrictions.get(api as usize) {
        Some(&restricted) => write(state, restricted),
        None => status::INVALID_ARGUMENT,
    })
}

unsafe extern "C" fn fake_set_api_restriction(dev: nvmlDevice_t, api: c_uint, state: c_uint) -> nvmlReturn_t {
    device("nvmlDeviceSetAPIRestriction", dev, |g| {
        match g.api_restrictions.get_mut(api as usize) {
            Some(restricted) if state <= 1 => {
                *restricted = state;
                status::SUCCESS
            }
            _ => status::INVALID_ARGUMENT,
        }
    })
}

unsafe extern "C" fn fake_set_unprotected_mem_size(dev: nvmlDevice_t, size_kib: c_ulonglong) -> nvmlReturn_t {
    device("nvmlDeviceSetConfComputeUnprotectedMemSize", dev, |g| {
        if size_kib.saturating_mul(1024) > g.memory_total {
            return status::INVALID_ARGUMENT;
        }
        g.unprotected_mem_kib = size_kib;
        status::SUCCESS
    })
}

// Clocks

unsafe extern "C" fn fake_clock_info(dev: nvmlDevice_t, clock: c_uint, mhz: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetClockInfo", dev, |g| match clock {
        0 | 1 => write(mhz, g.graphics_clock),
        2 => write(mhz, g.memory_clock),
        _ => status::NOT_SUPPORTED,
    })
}

unsafe extern "C" fn fake_max_clock_info(dev: nvmlDevice_t, clock: c_uint, mhz: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetMaxClockInfo", dev, |g| match clock {
        0 | 1 => write(mhz, g.max_graphics_clock),
        2 => write(mhz, g.max_memory_clock),
        _ => status::NOT_SUPPORTED,
    })
}

fn application_clock(clocks: (u32, u32), clock: c_uint) -> Result<u32, u32> {
    match clock {
        0 | 1 => Ok(clocks.0),
        2 => Ok(clocks.1),
        _ => Err(status::NOT_SUPPORTED),
    }
}

unsafe extern "C" fn fake_applications_clock(dev: nvmlDevice_t, clock: c_uint, mhz: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetApplicationsClock", dev, |g| {
        match application_clock(g.applications_clocks, clock) {
            Ok(value) => write(mhz, value),
            Err(code) => code,
        }
    })
}

unsafe extern "C" fn fake_default_applications_clock(
    dev: nvmlDevice_t,
    clock: c_uint,
    mhz: *mut c_uint,
) -> nvmlReturn_t {
    device("nvmlDeviceGetDefaultApplicationsClock", dev, |g| {
        match application_clock(g.default_applications_clocks, clock) {
            Ok(value) => write(mhz, value),
            Err(code) => code,
        }
    })
}

unsafe extern "C" fn fake_set_applications_clocks(
    dev: nvmlDevice_t,
    memory: c_uint,
    graphics: c_uint,
) -> nvmlReturn_t {
    device("nvmlDeviceSetApplicationsClocks", dev, |g| {
        if graphics > g.max_graphics_clock || memory > g.max_memory_clock {
            return status::INVALID_ARGUMENT;
        }
        g.applications_clocks = (graphics, memory);
        status::SUCCESS
    })
}

unsafe extern "C" fn fake_reset_applications_clocks(dev: nvmlDevice_t) -> nvmlReturn_t {
    device("nvmlDeviceResetApplicationsClocks", dev, |g| {
        g.applications_clocks = g.default_applications_clocks;
        status::SUCCESS
    })
}

unsafe extern "C" fn fake_set_gpu_locked_clocks(dev: nvmlDevice_t, min: c_uint, max: c_uint) -> nvmlReturn_t {
    device("nvmlDeviceSetGpuLockedClocks", dev, |g| {
        g.locked_gpu_clocks = Some((min, max));
        status::SUCCESS
    })
}

unsafe extern "C" fn fake_reset_gpu_locked_clocks(dev: nvmlDevice_t) -> nvmlReturn_t {
    device("nvmlDeviceResetGpuLockedClocks", dev, |g| {
        g.locked_gpu_clocks = None;
        status::SUCCESS
    })
}

unsafe extern "C" fn fake_set_memory_locked_clocks(
    dev: nvmlDevice_t,
    min: c_uint,
    max: c_uint,
) -> nvmlReturn_t {
    device("nvmlDeviceSetMemoryLockedClocks", dev, |g| {
        g.locked_memory_clocks = Some((min, max));
        status::SUCCESS
    })
}

unsafe extern "C" fn fake_reset_memory_locked_clocks(dev: nvmlDevice_t) -> nvmlReturn_t {
    device("nvmlDeviceResetMemoryLockedClocks", dev, |g| {
        g.locked_memory_clocks = None;
        status::SUCCESS
    })
}

unsafe extern "C" fn fake_throttle_reasons(dev: nvmlDevice_t, reasons: *mut c_ulonglong) -> nvmlReturn_t {
    device("nvmlDeviceGetCurrentClocksThrottleReasons", dev, |g| write(reasons, g.throttle_reasons))
}

unsafe extern "C" fn fake_clk_mon_status(dev: nvmlDevice_t, mon: *mut nvmlClkMonStatus_t) -> nvmlReturn_t {
    device("nvmlDeviceGetClkMonStatus", dev, |g| write(mon, g.clock_monitor))
}

// Fans

unsafe extern "C" fn fake_num_fans(dev: nvmlDevice_t, count: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetNumFans", dev, |g| write(count, g.fans.len() as c_uint))
}

unsafe extern "C" fn fake_fan_speed(dev: nvmlDevice_t, speed: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetFanSpeed", dev, |g| match g.fans.first() {
        Some(fan) => write(speed, fan.speed),
        None => status::NOT_SUPPORTED,
    })
}

unsafe extern "C" fn fake_fan_speed_v2(dev: nvmlDevice_t, fan: c_uint, speed: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetFanSpeed_v2", dev, |g| match g.fans.get(fan as usize) {
        Some(f) => write(speed, f.speed),
        None => status::INVALID_ARGUMENT,
    })
}

unsafe extern "C" fn fake_set_fan_speed(dev: nvmlDevice_t, fan: c_uint, speed: c_uint) -> nvmlReturn_t {
    device("nvmlDeviceSetFanSpeed_v2", dev, |g| {
        let (min, max) = g.fan_range;
        match g.fans.get_mut(fan as usize) {
            Some(f) if (min..=max).contains(&speed) => {
                f.speed = speed;
                f.policy = 1;
                status::SUCCESS
            }
            _ => status::INVALID_ARGUMENT,
        }
    })
}

unsafe extern "C" fn fake_set_default_fan_speed(dev: nvmlDevice_t, fan: c_uint) -> nvmlReturn_t {
    device("nvmlDeviceSetDefaultFanSpeed_v2", dev, |g| match g.fans.get_mut(fan as usize) {
        Some(f) => {
            f.policy = 0;
            status::SUCCESS
        }
        None => status::INVALID_ARGUMENT,
    })
}

unsafe extern "C" fn fake_min_max_fan_speed(dev: nvmlDevice_t, min: *mut c_uint, max: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetMinMaxFanSpeed", dev, |g| {
        write(min, g.fan_range.0);
        write(max, g.fan_range.1)
    })
}

unsafe extern "C" fn fake_fan_control_policy(dev: nvmlDevice_t, fan: c_uint, policy: *mut c_uint) -> nvmlReturn_t {
    device("nvmlDeviceGetFanControlPolicy_v2", dev, |g| match g.fans.get(fan as usize) {
        Some(f) => write(policy, f.policy),
        None => status::INVALID_ARGUMENT,
    })
}

unsafe extern "C" fn fake_set_fan_control_policy(dev: nvmlDevice_t, fan: c_uint, policy: c_uint) -> nvmlReturn_t {
    device("nvmlDeviceSetFanControlPolicy", dev, |g| match g.fans.get_mut(fan as usize) {
        Some(f) => {
            f.policy = policy;
            status::SUCCESS
        }
        None => status::INVALID_ARGUMENT,
    })
}
