//! Power command implementation
//!
//! Handles power status and limit commands.

use crate::cli::args::{OutputFormat, PowerArgs, PowerCommands};
use crate::cli::output::{print_output, Message, PowerStatus};
use crate::commands::{optional, report, select_devices};
use crate::domain::PowerLimit;
use crate::error::Result;
use crate::nvml::{Device, Nvml};

/// Execute power commands
pub fn run_power(
    nvml: &Nvml,
    args: &PowerArgs,
    format: OutputFormat,
    gpu_index: Option<u32>,
) -> Result<()> {
    match args.command.as_ref().unwrap_or(&PowerCommands::Status) {
        PowerCommands::Status => {
            for device in select_devices(nvml, gpu_index)? {
                print_output(&report(&device, power_status(&device)?)?, format)?;
            }
        }
        PowerCommands::Limit { watts } => {
            for mut device in select_devices(nvml, gpu_index)? {
                let message = set_power_limit(&mut device, *watts)?;
                print_output(&message, format)?;
            }
        }
    }

    Ok(())
}

/// Read the power figures of one device.
pub fn power_status(device: &Device<'_>) -> Result<PowerStatus> {
    let constraints = optional(device.power_management_limit_constraints())?;

    Ok(PowerStatus {
        usage_watts: optional(device.power_usage())?.map(|p| p.as_watts()),
        limit_watts: optional(device.power_management_limit())?.map(|p| p.as_watts()),
        enforced_limit_watts: optional(device.enforced_power_limit())?.map(|p| p.as_watts()),
        default_limit_watts: optional(device.power_management_default_limit())?
            .map(|p| p.as_watts()),
        min_limit_watts: constraints.map(|c| c.min.as_watts()),
        max_limit_watts: constraints.map(|c| c.max.as_watts()),
        performance_state: optional(device.performance_state())?.map(|p| p.to_string()),
    })
}

/// Apply a power limit after checking it against the board's range.
pub fn set_power_limit(device: &mut Device<'_>, watts: u32) -> Result<Message> {
    let limit = PowerLimit::from_watts(watts);
    let constraints = device.power_management_limit_constraints()?;
    limit.validate(&constraints)?;

    device.set_power_management_limit(limit)?;

    Ok(Message::ok(format!(
        "GPU {}: power limit set to {}",
        device.index()?,
        limit
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, DomainError};
    use crate::mock::{self, MockGpu};
    use crate::schema::status;

    #[test]
    fn test_power_status_from_device() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let status = power_status(&device).unwrap();

        assert_eq!(status.usage_watts, Some(120));
        assert_eq!(status.limit_watts, Some(350));
        assert_eq!(status.min_limit_watts, Some(100));
        assert_eq!(status.max_limit_watts, Some(400));
        assert_eq!(status.performance_state.as_deref(), Some("P2"));
    }

    #[test]
    fn test_power_status_without_telemetry() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        mock::force_status("nvmlDeviceGetPowerUsage", status::NOT_SUPPORTED);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let status = power_status(&device).unwrap();
        assert_eq!(status.usage_watts, None);
        assert_eq!(status.limit_watts, Some(350));
    }

    #[test]
    fn test_set_power_limit() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let mut device = nvml.device_by_index(0).unwrap();

        let message = set_power_limit(&mut device, 300).unwrap();

        assert!(message.success);
        assert_eq!(mock::with_state(|s| s.gpus[0].power_limit_mw), 300_000);
    }

    #[test]
    fn test_set_power_limit_out_of_range() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let mut device = nvml.device_by_index(0).unwrap();

        let err = set_power_limit(&mut device, 50).unwrap_err();

        assert!(matches!(
            err,
            AppError::Domain(DomainError::InvalidPowerLimit { value: 50, .. })
        ));
        assert_eq!(mock::call_count("nvmlDeviceSetPowerManagementLimit"), 0);
    }
}
