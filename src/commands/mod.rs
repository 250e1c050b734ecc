//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command. The
//! handlers take an open [`Nvml`] session so they can run against any
//! library, including the in-process fake used by the tests.

pub mod clocks;
pub mod compute_mode;
pub mod ecc;
pub mod fan;
pub mod info;
pub mod list;
pub mod persistence;
pub mod power;
pub mod processes;
pub mod version;
pub mod video;

pub use clocks::run_clocks;
pub use compute_mode::run_compute_mode;
pub use ecc::run_ecc;
pub use fan::run_fan;
pub use info::run_info;
pub use list::run_list;
pub use persistence::run_persistence;
pub use power::run_power;
pub use processes::run_processes;
pub use version::run_version;
pub use video::run_video;

use crate::cli::output::GpuReport;
use crate::config::Config;
use crate::error::{AppError, DomainError, NvmlError, Result};
use crate::ffi::NativeLibrary;
use crate::nvml::{Device, Nvml};

use std::sync::Arc;

/// Load the library the configuration points at.
pub fn open_library(config: &Config) -> Result<Arc<NativeLibrary>> {
    let lib = match &config.library.path {
        Some(path) => NativeLibrary::open_path(path)?,
        None => NativeLibrary::open()?,
    };
    log::info!("Loaded NVML from {}", lib.origin());
    Ok(Arc::new(lib))
}

/// Run `f` inside a session and always shut it down afterwards.
///
/// When both `f` and the shutdown fail, the error from `f` wins and the
/// shutdown failure is logged.
pub fn with_session<R>(
    lib: Arc<NativeLibrary>,
    config: &Config,
    f: impl FnOnce(&Nvml) -> Result<R>,
) -> Result<R> {
    let mode = config.session.init_mode()?;
    let nvml = Nvml::init_from(lib, mode)?;

    let result = f(&nvml);

    match (result, nvml.shutdown()) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(AppError::Nvml(err.error)),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(shutdown)) => {
            log::warn!("NVML shutdown failed: {}", shutdown.error);
            Err(err)
        }
    }
}

/// Resolve the `--gpu` selection to device handles.
pub fn select_devices(nvml: &Nvml, gpu: Option<u32>) -> Result<Vec<Device<'_>>> {
    let count = nvml.device_count()?;
    if count == 0 {
        return Err(AppError::NoGpusFound);
    }

    match gpu {
        Some(index) if index >= count => Err(DomainError::InvalidValue(format!(
            "GPU index {} out of range ({} GPUs found)",
            index, count
        ))
        .into()),
        Some(index) => Ok(vec![nvml.device_by_index(index)?]),
        None => (0..count)
            .map(|index| nvml.device_by_index(index).map_err(AppError::from))
            .collect(),
    }
}

/// Treat "not available on this device" as an absent value.
pub(crate) fn optional<T>(result: std::result::Result<T, NvmlError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_unsupported() => {
            log::debug!("query unavailable: {}", err);
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Label a section with the device it came from.
pub(crate) fn report<T>(device: &Device<'_>, section: T) -> Result<GpuReport<T>> {
    Ok(GpuReport {
        gpu_index: device.index()?,
        gpu_name: device.name()?,
        report: section,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MockGpu};
    use crate::schema::status;

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn test_with_session_shuts_down() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);

        let count = with_session(lib, &config(), |nvml| Ok(nvml.device_count()?)).unwrap();

        assert_eq!(count, 1);
        assert_eq!(mock::with_state(|s| s.init_count), 0);
        assert_eq!(mock::call_count("nvmlShutdown"), 1);
    }

    #[test]
    fn test_with_session_shuts_down_after_error() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);

        let result: Result<()> = with_session(lib, &config(), |_| Err(AppError::NoGpusFound));

        assert!(matches!(result, Err(AppError::NoGpusFound)));
        assert_eq!(mock::with_state(|s| s.init_count), 0);
    }

    #[test]
    fn test_with_session_reports_failed_shutdown() {
        let lib = mock::install(vec![]);
        mock::force_status("nvmlShutdown", status::UNKNOWN);

        let result = with_session(lib, &config(), |_| Ok(()));

        assert!(matches!(result, Err(AppError::Nvml(NvmlError::Unknown))));
    }

    #[test]
    fn test_with_session_rejects_bad_config() {
        let lib = mock::install(vec![]);
        let mut config = config();
        config.session.no_gpus = true;

        let result = with_session(lib, &config, |_| Ok(()));

        assert!(matches!(result, Err(AppError::Config(_))));
        assert_eq!(mock::call_count("nvmlInit_v2"), 0);
    }

    #[test]
    fn test_select_all_devices() {
        let lib = mock::install(vec![MockGpu::new("GPU A"), MockGpu::new("GPU B")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();

        let devices = select_devices(&nvml, None).unwrap();
        let names: Vec<String> = devices.iter().map(|d| d.name().unwrap()).collect();
        assert_eq!(names, vec!["GPU A", "GPU B"]);
    }

    #[test]
    fn test_select_out_of_range() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();

        assert!(matches!(
            select_devices(&nvml, Some(1)),
            Err(AppError::Domain(DomainError::InvalidValue(_)))
        ));
        assert_eq!(select_devices(&nvml, Some(0)).unwrap().len(), 1);
    }

    #[test]
    fn test_select_without_gpus() {
        let lib = mock::install(vec![]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();

        assert!(matches!(select_devices(&nvml, None), Err(AppError::NoGpusFound)));
    }

    #[test]
    fn test_optional_keeps_real_errors() {
        assert_eq!(optional(Ok::<_, NvmlError>(3)).unwrap(), Some(3));
        assert_eq!(optional::<u32>(Err(NvmlError::NotSupported)).unwrap(), None);
        assert!(optional::<u32>(Err(NvmlError::GpuLost)).is_err());
    }
}
