//! Fan command implementation
//!
//! Handles fan status, manual speed and return to automatic control.

use crate::cli::args::{FanArgs, FanCommands, OutputFormat};
use crate::cli::output::{print_output, FanInfo, FanStatus, Message};
use crate::commands::{optional, report, select_devices};
use crate::domain::FanSpeed;
use crate::error::{DomainError, Result};
use crate::nvml::{Device, Nvml};

/// Execute fan commands
pub fn run_fan(
    nvml: &Nvml,
    args: &FanArgs,
    format: OutputFormat,
    gpu_index: Option<u32>,
) -> Result<()> {
    match args.command.as_ref().unwrap_or(&FanCommands::Status) {
        FanCommands::Status => {
            for device in select_devices(nvml, gpu_index)? {
                print_output(&report(&device, fan_status(&device)?)?, format)?;
            }
        }
        FanCommands::Speed { speed, fan } => {
            let speed = FanSpeed::new(*speed)?;
            for mut device in select_devices(nvml, gpu_index)? {
                for message in set_fan_speed(&mut device, speed, *fan)? {
                    print_output(&message, format)?;
                }
            }
        }
        FanCommands::Auto { fan } => {
            for mut device in select_devices(nvml, gpu_index)? {
                for message in restore_auto(&mut device, *fan)? {
                    print_output(&message, format)?;
                }
            }
        }
    }

    Ok(())
}

/// Speed and policy of every fan on one device.
pub fn fan_status(device: &Device<'_>) -> Result<FanStatus> {
    let count = optional(device.num_fans())?.unwrap_or(0);

    let mut fans = Vec::with_capacity(count as usize);
    for index in 0..count {
        fans.push(FanInfo {
            index,
            speed: optional(device.fan_speed(index))?,
            policy: optional(device.fan_control_policy(index))?.map(|p| p.to_string()),
        });
    }

    Ok(FanStatus {
        fans,
        speed_range: optional(device.min_max_fan_speed())?.map(|r| r.to_string()),
    })
}

fn target_fans(device: &Device<'_>, fan: Option<u32>) -> Result<Vec<u32>> {
    let count = device.num_fans()?;
    match fan {
        Some(index) if index >= count => Err(DomainError::InvalidValue(format!(
            "fan {} out of range ({} fans)",
            index, count
        ))
        .into()),
        Some(index) => Ok(vec![index]),
        None => Ok((0..count).collect()),
    }
}

/// Put fans under manual control at `speed`.
pub fn set_fan_speed(
    device: &mut Device<'_>,
    speed: FanSpeed,
    fan: Option<u32>,
) -> Result<Vec<Message>> {
    let fans = target_fans(device, fan)?;
    if let Some(range) = optional(device.min_max_fan_speed())? {
        range.check(speed)?;
    }

    let gpu = device.index()?;
    let mut messages = Vec::with_capacity(fans.len());
    for index in fans {
        device.set_fan_speed(index, speed)?;
        messages.push(Message::ok(format!(
            "GPU {}: fan {} set to {}",
            gpu, index, speed
        )));
    }

    Ok(messages)
}

/// Hand fans back to the driver's curve.
pub fn restore_auto(device: &mut Device<'_>, fan: Option<u32>) -> Result<Vec<Message>> {
    let fans = target_fans(device, fan)?;

    let gpu = device.index()?;
    let mut messages = Vec::with_capacity(fans.len());
    for index in fans {
        device.set_default_fan_speed(index)?;
        messages.push(Message::ok(format!(
            "GPU {}: fan {} returned to automatic control",
            gpu, index
        )));
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::mock::{self, MockGpu};

    #[test]
    fn test_fan_status_lists_every_fan() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let status = fan_status(&device).unwrap();

        assert_eq!(status.fans.len(), 2);
        assert_eq!(status.fans[1].speed, Some(30));
        assert_eq!(status.fans[1].policy.as_deref(), Some("auto"));
        assert_eq!(status.speed_range.as_deref(), Some("30-100%"));
    }

    #[test]
    fn test_fanless_board() {
        let lib = mock::install(vec![MockGpu::new("GPU A").without_fans()]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        assert!(fan_status(&device).unwrap().fans.is_empty());
    }

    #[test]
    fn test_manual_then_auto() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let mut device = nvml.device_by_index(0).unwrap();

        let messages = set_fan_speed(&mut device, FanSpeed::new(70).unwrap(), Some(1)).unwrap();
        assert_eq!(messages.len(), 1);
        mock::with_state(|s| {
            assert_eq!(s.gpus[0].fans[0].speed, 30);
            assert_eq!(s.gpus[0].fans[1].speed, 70);
            assert_eq!(s.gpus[0].fans[1].policy, 1);
        });

        restore_auto(&mut device, None).unwrap();
        assert_eq!(mock::with_state(|s| s.gpus[0].fans[1].policy), 0);
    }

    #[test]
    fn test_speed_below_device_minimum() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let mut device = nvml.device_by_index(0).unwrap();

        let err = set_fan_speed(&mut device, FanSpeed::new(10).unwrap(), None).unwrap_err();

        assert!(matches!(err, AppError::Domain(DomainError::InvalidValue(_))));
        assert_eq!(mock::call_count("nvmlDeviceSetFanSpeed_v2"), 0);
    }

    #[test]
    fn test_unknown_fan_index() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let mut device = nvml.device_by_index(0).unwrap();

        assert!(restore_auto(&mut device, Some(5)).is_err());
    }
}
