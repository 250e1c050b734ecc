//! The NVML session
//!
//! [`Nvml`] is the explicit session context. Creating one initializes the
//! native library; [`Nvml::shutdown`] consumes it. Nothing is initialized or
//! shut down implicitly, and dropping a session does not call
//! `nvmlShutdown`.
//!
//! Device handles borrow the session, so the borrow checker rejects any use
//! of a handle after shutdown or across an init/shutdown cycle.

use crate::domain::CudaDriverVersion;
use crate::error::NvmlError;
use crate::ffi::types::nvmlDevice_t;
use crate::ffi::{NativeLibrary, NativeSymbols};
use crate::nvml::device::Device;
use crate::nvml::marshal::{check, out, read_text};
use crate::schema::buffers;
use crate::schema::InitFlags;

use std::ffi::CString;
use std::fmt;
use std::os::raw::{c_int, c_uint};
use std::ptr;
use std::sync::Arc;

/// Which native initializer starts the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitMode {
    /// `nvmlInit`, the original entry point
    Legacy,
    /// `nvmlInit_v2`
    #[default]
    Standard,
    /// `nvmlInitWithFlags`
    WithFlags(InitFlags),
}

/// An initialized NVML session
pub struct Nvml {
    lib: Arc<NativeLibrary>,
    mode: InitMode,
}

/// A failed shutdown. The session is handed back unchanged.
#[derive(Debug, thiserror::Error)]
#[error("failed to shut down NVML: {error}")]
pub struct ShutdownError {
    pub session: Nvml,
    #[source]
    pub error: NvmlError,
}

impl From<ShutdownError> for NvmlError {
    fn from(err: ShutdownError) -> Self {
        err.error
    }
}

impl Nvml {
    /// Load NVML from the platform default location and initialize it.
    pub fn init() -> Result<Self, NvmlError> {
        Self::init_from(Arc::new(NativeLibrary::open()?), InitMode::Standard)
    }

    /// Load NVML from the platform default location and initialize it with flags.
    pub fn init_with_flags(flags: InitFlags) -> Result<Self, NvmlError> {
        Self::init_from(Arc::new(NativeLibrary::open()?), InitMode::WithFlags(flags))
    }

    /// Initialize a session on an already loaded library.
    ///
    /// On failure nothing changes: no session exists and the library stays
    /// uninitialized.
    pub fn init_from(lib: Arc<NativeLibrary>, mode: InitMode) -> Result<Self, NvmlError> {
        lib.with(|sym| {
            // SAFETY: the initializers take no pointers.
            let code = unsafe {
                match mode {
                    InitMode::Legacy => sym.nvmlInit(),
                    InitMode::Standard => sym.nvmlInit_v2(),
                    InitMode::WithFlags(flags) => sym.nvmlInitWithFlags(flags.bits()),
                }
            }?;
            check(code)
        })?;

        log::debug!("NVML session started ({:?}, {})", mode, lib.origin());
        Ok(Self { lib, mode })
    }

    /// End the session.
    ///
    /// All device handles must have been dropped. If the native call fails
    /// the session is returned inside the error and remains usable.
    pub fn shutdown(self) -> Result<(), ShutdownError> {
        // SAFETY: nvmlShutdown takes no arguments.
        let result = self
            .lib
            .with(|sym| unsafe { sym.nvmlShutdown() }.and_then(check));

        match result {
            Ok(()) => {
                log::debug!("NVML session ended");
                Ok(())
            }
            Err(error) => Err(ShutdownError {
                session: self,
                error,
            }),
        }
    }

    /// The library this session runs on. Keep a clone to start a new
    /// session after shutdown.
    pub fn library(&self) -> Arc<NativeLibrary> {
        Arc::clone(&self.lib)
    }

    pub fn init_mode(&self) -> InitMode {
        self.mode
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&NativeSymbols) -> R) -> R {
        self.lib.with(f)
    }

    /// Installed driver version, e.g. "550.54.15"
    pub fn driver_version(&self) -> Result<String, NvmlError> {
        self.with(|sym| {
            read_text(buffers::SYSTEM_DRIVER_VERSION, |buf, len| unsafe {
                sym.nvmlSystemGetDriverVersion(buf, len)
            })
        })
    }

    /// NVML library version, e.g. "12.550.54.15"
    pub fn nvml_version(&self) -> Result<String, NvmlError> {
        self.with(|sym| {
            read_text(buffers::SYSTEM_NVML_VERSION, |buf, len| unsafe {
                sym.nvmlSystemGetNVMLVersion(buf, len)
            })
        })
    }

    /// Highest CUDA version the driver supports
    pub fn cuda_driver_version(&self) -> Result<CudaDriverVersion, NvmlError> {
        let raw = self.with(|sym| {
            out::<c_int>(|v| unsafe { sym.nvmlSystemGetCudaDriverVersion_v2(v) })
        })?;
        Ok(CudaDriverVersion::from_raw(raw))
    }

    /// [`Nvml::cuda_driver_version`] through the unversioned entry point
    pub fn cuda_driver_version_legacy(&self) -> Result<CudaDriverVersion, NvmlError> {
        let raw = self.with(|sym| {
            out::<c_int>(|v| unsafe { sym.nvmlSystemGetCudaDriverVersion(v) })
        })?;
        Ok(CudaDriverVersion::from_raw(raw))
    }

    /// Name of a running process
    pub fn process_name(&self, pid: u32) -> Result<String, NvmlError> {
        self.process_name_with_capacity(pid, buffers::PROCESS_NAME)
    }

    /// Name of a running process, read into a buffer of `capacity` bytes
    pub fn process_name_with_capacity(&self, pid: u32, capacity: u32) -> Result<String, NvmlError> {
        self.with(|sym| {
            read_text(capacity, |buf, len| unsafe {
                sym.nvmlSystemGetProcessName(pid, buf, len)
            })
        })
    }

    /// Whether confidential-compute GPUs accept work
    pub fn conf_compute_gpus_ready(&self) -> Result<bool, NvmlError> {
        let state = self.with(|sym| {
            out::<c_uint>(|v| unsafe { sym.nvmlSystemGetConfComputeGpusReadyState(v) })
        })?;
        Ok(state != 0)
    }

    pub fn set_conf_compute_gpus_ready(&self, ready: bool) -> Result<(), NvmlError> {
        self.with(|sym| {
            let code = unsafe { sym.nvmlSystemSetConfComputeGpusReadyState(c_uint::from(ready)) }?;
            check(code)
        })
    }

    /// Number of devices visible to this session
    pub fn device_count(&self) -> Result<u32, NvmlError> {
        self.with(|sym| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetCount_v2(v) }))
    }

    /// [`Nvml::device_count`] through the unversioned entry point
    pub fn device_count_legacy(&self) -> Result<u32, NvmlError> {
        self.with(|sym| out::<c_uint>(|v| unsafe { sym.nvmlDeviceGetCount(v) }))
    }

    pub fn device_by_index(&self, index: u32) -> Result<Device<'_>, NvmlError> {
        self.lookup(|sym, handle| unsafe { sym.nvmlDeviceGetHandleByIndex_v2(index, handle) })
    }

    /// [`Nvml::device_by_index`] through the unversioned entry point
    pub fn device_by_index_legacy(&self, index: u32) -> Result<Device<'_>, NvmlError> {
        self.lookup(|sym, handle| unsafe { sym.nvmlDeviceGetHandleByIndex(index, handle) })
    }

    /// Look up by PCI bus id, e.g. `00000000:01:00.0`
    pub fn device_by_pci_bus_id(&self, bus_id: &str) -> Result<Device<'_>, NvmlError> {
        let bus_id = to_c_string(bus_id)?;
        self.lookup(|sym, handle| unsafe {
            sym.nvmlDeviceGetHandleByPciBusId_v2(bus_id.as_ptr(), handle)
        })
    }

    /// [`Nvml::device_by_pci_bus_id`] through the unversioned entry point
    pub fn device_by_pci_bus_id_legacy(&self, bus_id: &str) -> Result<Device<'_>, NvmlError> {
        let bus_id = to_c_string(bus_id)?;
        self.lookup(|sym, handle| unsafe {
            sym.nvmlDeviceGetHandleByPciBusId(bus_id.as_ptr(), handle)
        })
    }

    pub fn device_by_uuid(&self, uuid: &str) -> Result<Device<'_>, NvmlError> {
        let uuid = to_c_string(uuid)?;
        self.lookup(|sym, handle| unsafe { sym.nvmlDeviceGetHandleByUUID(uuid.as_ptr(), handle) })
    }

    pub fn device_by_serial(&self, serial: &str) -> Result<Device<'_>, NvmlError> {
        let serial = to_c_string(serial)?;
        self.lookup(|sym, handle| unsafe {
            sym.nvmlDeviceGetHandleBySerial(serial.as_ptr(), handle)
        })
    }

    /// Every device, in index order
    pub fn devices(&self) -> Result<Vec<Device<'_>>, NvmlError> {
        (0..self.device_count()?)
            .map(|index| self.device_by_index(index))
            .collect()
    }

    fn lookup(
        &self,
        call: impl FnOnce(&NativeSymbols, *mut nvmlDevice_t) -> Result<u32, NvmlError>,
    ) -> Result<Device<'_>, NvmlError> {
        let mut handle: nvmlDevice_t = ptr::null_mut();
        self.with(|sym| call(sym, &mut handle).and_then(check))?;
        Ok(Device::new(self, handle))
    }
}

impl fmt::Debug for Nvml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Nvml")
            .field("library", &self.lib.origin())
            .field("mode", &self.mode)
            .finish()
    }
}

fn to_c_string(value: &str) -> Result<CString, NvmlError> {
    CString::new(value).map_err(|e| NvmlError::InteriorNul(e.nul_position()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MockGpu};
    use crate::schema::status;

    fn two_gpus() -> Vec<MockGpu> {
        vec![
            MockGpu::new("NVIDIA GeForce RTX 3090").with_uuid("GPU-aaaa"),
            MockGpu::new("NVIDIA A100-SXM4-40GB")
                .with_uuid("GPU-bbbb")
                .with_pci_bus_id("00000000:41:00.0"),
        ]
    }

    #[test]
    fn test_init_query_shutdown() {
        let lib = mock::install(two_gpus());
        let nvml = Nvml::init_from(lib, InitMode::Standard).unwrap();

        assert_eq!(nvml.driver_version().unwrap(), "550.54.15");
        assert_eq!(nvml.device_count().unwrap(), 2);
        let names: Vec<String> = nvml
            .devices()
            .unwrap()
            .iter()
            .map(|d| d.name().unwrap())
            .collect();
        assert_eq!(names, ["NVIDIA GeForce RTX 3090", "NVIDIA A100-SXM4-40GB"]);

        nvml.shutdown().unwrap();
        assert_eq!(mock::with_state(|s| s.init_count), 0);
    }

    #[test]
    fn test_init_modes_pick_their_entry_point() {
        let lib = mock::install(two_gpus());

        for (mode, symbol) in [
            (InitMode::Legacy, "nvmlInit"),
            (InitMode::Standard, "nvmlInit_v2"),
            (InitMode::WithFlags(InitFlags::NO_GPUS), "nvmlInitWithFlags"),
        ] {
            let nvml = Nvml::init_from(Arc::clone(&lib), mode).unwrap();
            assert_eq!(nvml.init_mode(), mode);
            nvml.shutdown().unwrap();
            let calls = mock::calls();
            assert_eq!(calls[calls.len() - 2..], [symbol, "nvmlShutdown"]);
        }
        assert_eq!(mock::with_state(|s| s.init_count), 0);
        assert_eq!(mock::with_state(|s| s.init_flags), InitFlags::NO_GPUS.bits());
    }

    #[test]
    fn test_failed_init_creates_no_session() {
        let lib = mock::install(two_gpus());
        mock::force_status("nvmlInit_v2", status::DRIVER_NOT_LOADED);

        let err = Nvml::init_from(lib, InitMode::Standard).unwrap_err();
        assert_eq!(err, NvmlError::DriverNotLoaded);
        assert_eq!(mock::with_state(|s| s.init_count), 0);
    }

    #[test]
    fn test_missing_initializer_is_symbol_error() {
        let mut symbols = mock::symbols();
        symbols.nvmlInitWithFlags = None;
        mock::install(Vec::new());
        let lib = Arc::new(NativeLibrary::from_symbols(symbols, "mock"));

        let err = Nvml::init_from(lib, InitMode::WithFlags(InitFlags::empty())).unwrap_err();
        assert_eq!(err, NvmlError::SymbolNotFound("nvmlInitWithFlags"));
    }

    #[test]
    fn test_failed_shutdown_returns_session() {
        let lib = mock::install(two_gpus());
        let nvml = Nvml::init_from(lib, InitMode::Standard).unwrap();
        mock::force_status("nvmlShutdown", status::UNKNOWN);

        let err = nvml.shutdown().unwrap_err();
        assert_eq!(err.error, NvmlError::Unknown);
        assert_eq!(err.session.device_count().unwrap(), 2);

        mock::with_state(|s| s.forced.clear());
        err.session.shutdown().unwrap();
    }

    #[test]
    fn test_reinit_after_shutdown() {
        let lib = mock::install(two_gpus());
        let nvml = Nvml::init_from(Arc::clone(&lib), InitMode::Standard).unwrap();
        let lib_again = nvml.library();
        nvml.shutdown().unwrap();

        let nvml = Nvml::init_from(lib_again, InitMode::Standard).unwrap();
        assert_eq!(nvml.device_by_index(1).unwrap().uuid().unwrap(), "GPU-bbbb");
        nvml.shutdown().unwrap();
    }

    #[test]
    fn test_calls_without_session_report_uninitialized() {
        let lib = mock::install(two_gpus());
        let nvml = Nvml::init_from(lib, InitMode::Standard).unwrap();
        // Another owner of the library shut it down underneath us.
        mock::with_state(|s| s.init_count = 0);

        assert_eq!(nvml.device_count(), Err(NvmlError::Uninitialized));
        assert_eq!(nvml.driver_version(), Err(NvmlError::Uninitialized));
    }

    #[test]
    fn test_cuda_driver_version() {
        let lib = mock::install(Vec::new());
        let nvml = Nvml::init_from(lib, InitMode::Standard).unwrap();

        let version = nvml.cuda_driver_version().unwrap();
        assert_eq!(version.major(), 12);
        assert_eq!(version.minor(), 4);
        assert_eq!(nvml.cuda_driver_version_legacy().unwrap(), version);
        assert_eq!(mock::call_count("nvmlSystemGetCudaDriverVersion_v2"), 1);
        assert_eq!(mock::call_count("nvmlSystemGetCudaDriverVersion"), 1);
    }

    #[test]
    fn test_legacy_entry_points_are_distinct() {
        let lib = mock::install(two_gpus());
        let nvml = Nvml::init_from(lib, InitMode::Legacy).unwrap();

        assert_eq!(nvml.device_count_legacy().unwrap(), 2);
        let dev = nvml.device_by_index_legacy(0).unwrap();
        assert_eq!(dev.uuid().unwrap(), "GPU-aaaa");
        assert_eq!(mock::call_count("nvmlDeviceGetCount"), 1);
        assert_eq!(mock::call_count("nvmlDeviceGetCount_v2"), 0);
        assert_eq!(mock::call_count("nvmlDeviceGetHandleByIndex"), 1);
    }

    #[test]
    fn test_lookup_by_uuid_and_bus_id() {
        let lib = mock::install(two_gpus());
        let nvml = Nvml::init_from(lib, InitMode::Standard).unwrap();

        let by_uuid = nvml.device_by_uuid("GPU-bbbb").unwrap();
        assert_eq!(by_uuid.index().unwrap(), 1);
        let by_bus = nvml.device_by_pci_bus_id("00000000:41:00.0").unwrap();
        assert_eq!(by_bus.index().unwrap(), 1);

        assert_eq!(nvml.device_by_uuid("GPU-none").unwrap_err(), NvmlError::NotFound);
        assert_eq!(nvml.device_by_index(7).unwrap_err(), NvmlError::InvalidArg);
        assert_eq!(
            nvml.device_by_uuid("GPU\0x").unwrap_err(),
            NvmlError::InteriorNul(3)
        );
    }

    #[test]
    fn test_process_name() {
        let lib = mock::install(Vec::new());
        mock::with_state(|s| {
            s.process_names.insert(4242, "/usr/bin/python3".to_string());
        });
        let nvml = Nvml::init_from(lib, InitMode::Standard).unwrap();

        assert_eq!(nvml.process_name(4242).unwrap(), "/usr/bin/python3");
        assert_eq!(nvml.process_name(1).unwrap_err(), NvmlError::NotFound);
        assert_eq!(
            nvml.process_name_with_capacity(4242, 8).unwrap_err(),
            NvmlError::InsufficientSize
        );
    }

    #[test]
    fn test_conf_compute_ready_state() {
        let lib = mock::install(Vec::new());
        let nvml = Nvml::init_from(lib, InitMode::Standard).unwrap();

        assert!(!nvml.conf_compute_gpus_ready().unwrap());
        nvml.set_conf_compute_gpus_ready(true).unwrap();
        assert!(nvml.conf_compute_gpus_ready().unwrap());
        assert_eq!(mock::with_state(|s| s.conf_compute_ready), 1);
    }

    #[test]
    fn test_lookup_by_serial() {
        let mut gpus = two_gpus();
        gpus[1].serial = "1324321000042".to_string();
        let lib = mock::install(gpus);
        let nvml = Nvml::init_from(lib, InitMode::Standard).unwrap();

        let dev = nvml.device_by_serial("1324321000042").unwrap();
        assert_eq!(dev.uuid().unwrap(), "GPU-bbbb");
        assert_eq!(nvml.device_by_serial("0").unwrap_err(), NvmlError::NotFound);
    }
}
