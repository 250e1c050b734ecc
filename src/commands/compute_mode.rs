//! Compute mode command implementation

use crate::cli::args::{ComputeModeArgs, ComputeModeCommands, OutputFormat};
use crate::cli::output::{print_output, Message, ModeStatus};
use crate::commands::{report, select_devices};
use crate::error::Result;
use crate::nvml::{Device, Nvml};
use crate::schema::ComputeMode;

/// Execute compute mode commands
pub fn run_compute_mode(
    nvml: &Nvml,
    args: &ComputeModeArgs,
    format: OutputFormat,
    gpu_index: Option<u32>,
) -> Result<()> {
    for mut device in select_devices(nvml, gpu_index)? {
        match &args.command {
            None | Some(ComputeModeCommands::Get) => {
                print_output(&report(&device, compute_mode_status(&device)?)?, format)?;
            }
            Some(ComputeModeCommands::Set { mode }) => {
                let message = set_compute_mode(&mut device, ComputeMode::from(*mode))?;
                print_output(&message, format)?;
            }
        }
    }

    Ok(())
}

pub fn compute_mode_status(device: &Device<'_>) -> Result<ModeStatus> {
    Ok(ModeStatus {
        setting: "Compute Mode",
        value: device.compute_mode()?.to_string(),
        pending: None,
    })
}

/// Change the compute mode and read it back.
pub fn set_compute_mode(device: &mut Device<'_>, mode: ComputeMode) -> Result<Message> {
    device.set_compute_mode(mode)?;
    let applied = device.compute_mode()?;

    Ok(Message::ok(format!(
        "GPU {}: compute mode set to {}",
        device.index()?,
        applied
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, NvmlError};
    use crate::mock::{self, MockGpu};
    use crate::schema::status;

    #[test]
    fn test_round_trip() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let mut device = nvml.device_by_index(0).unwrap();

        assert_eq!(compute_mode_status(&device).unwrap().value, "default");

        let message = set_compute_mode(&mut device, ComputeMode::ExclusiveProcess).unwrap();
        assert!(message.message.contains("exclusive-process"));
        assert_eq!(compute_mode_status(&device).unwrap().value, "exclusive-process");
    }

    #[test]
    fn test_unknown_mode_is_shown_raw() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        mock::with_state(|s| s.gpus[0].compute_mode = 9);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        assert_eq!(compute_mode_status(&device).unwrap().value, "unknown (9)");
    }

    #[test]
    fn test_permission_denied() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        mock::force_status("nvmlDeviceSetComputeMode", status::NO_PERMISSION);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let mut device = nvml.device_by_index(0).unwrap();

        let err = set_compute_mode(&mut device, ComputeMode::Prohibited).unwrap_err();
        assert!(matches!(err, AppError::Nvml(NvmlError::NoPermission)));
        assert_eq!(mock::with_state(|s| s.gpus[0].compute_mode), 0);
    }
}
