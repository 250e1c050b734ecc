//! Clock command implementation

use crate::cli::args::{ClockArgs, ClockCommands, OutputFormat};
use crate::cli::output::{print_output, ClockStatus, Message};
use crate::commands::{optional, report, select_devices};
use crate::error::{DomainError, Result};
use crate::nvml::{Device, Nvml};
use crate::schema::ClockType;

/// Execute clock commands
pub fn run_clocks(
    nvml: &Nvml,
    args: &ClockArgs,
    format: OutputFormat,
    gpu_index: Option<u32>,
) -> Result<()> {
    let command = args.command.as_ref().unwrap_or(&ClockCommands::Status);

    for mut device in select_devices(nvml, gpu_index)? {
        match command {
            ClockCommands::Status => {
                print_output(&report(&device, clock_status(&device)?)?, format)?;
            }
            ClockCommands::LockGpu { min, max } => {
                let message = lock_clocks(&mut device, ClockType::Graphics, *min, *max)?;
                print_output(&message, format)?;
            }
            ClockCommands::LockMemory { min, max } => {
                let message = lock_clocks(&mut device, ClockType::Memory, *min, *max)?;
                print_output(&message, format)?;
            }
            ClockCommands::Reset => {
                print_output(&reset_clocks(&mut device)?, format)?;
            }
        }
    }

    Ok(())
}

/// Current and maximum clocks plus active throttle reasons.
pub fn clock_status(device: &Device<'_>) -> Result<ClockStatus> {
    let throttle = optional(device.current_throttle_reasons())?;

    Ok(ClockStatus {
        graphics_mhz: optional(device.clock_info(ClockType::Graphics))?,
        sm_mhz: optional(device.clock_info(ClockType::Sm))?,
        memory_mhz: optional(device.clock_info(ClockType::Memory))?,
        video_mhz: optional(device.clock_info(ClockType::Video))?,
        max_graphics_mhz: optional(device.max_clock_info(ClockType::Graphics))?,
        max_memory_mhz: optional(device.max_clock_info(ClockType::Memory))?,
        throttle_reasons: throttle.map(|t| t.names()).unwrap_or_default(),
    })
}

/// Lock the graphics or memory clock to `min..=max` MHz.
pub fn lock_clocks(device: &mut Device<'_>, clock: ClockType, min: u32, max: u32) -> Result<Message> {
    if min > max {
        return Err(DomainError::InvalidClockRange { min, max }.into());
    }

    match clock {
        ClockType::Memory => device.set_memory_locked_clocks(min, max)?,
        _ => device.set_gpu_locked_clocks(min, max)?,
    }

    Ok(Message::ok(format!(
        "GPU {}: {} clock locked to {}-{} MHz",
        device.index()?,
        clock,
        min,
        max
    )))
}

/// Remove both clock locks.
pub fn reset_clocks(device: &mut Device<'_>) -> Result<Message> {
    device.reset_gpu_locked_clocks()?;
    device.reset_memory_locked_clocks()?;

    Ok(Message::ok(format!("GPU {}: clock locks removed", device.index()?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::mock::{self, MockGpu};

    #[test]
    fn test_clock_status() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        mock::with_state(|s| s.gpus[0].throttle_reasons = 0x4);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let status = clock_status(&device).unwrap();

        assert_eq!(status.graphics_mhz, Some(1395));
        assert_eq!(status.memory_mhz, Some(9751));
        assert_eq!(status.max_graphics_mhz, Some(2100));
        assert_eq!(status.video_mhz, None);
        assert_eq!(status.throttle_reasons, vec!["SW_POWER_CAP"]);
    }

    #[test]
    fn test_lock_and_reset() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let mut device = nvml.device_by_index(0).unwrap();

        lock_clocks(&mut device, ClockType::Graphics, 1200, 1800).unwrap();
        lock_clocks(&mut device, ClockType::Memory, 5000, 9000).unwrap();
        mock::with_state(|s| {
            assert_eq!(s.gpus[0].locked_gpu_clocks, Some((1200, 1800)));
            assert_eq!(s.gpus[0].locked_memory_clocks, Some((5000, 9000)));
        });

        reset_clocks(&mut device).unwrap();
        mock::with_state(|s| {
            assert_eq!(s.gpus[0].locked_gpu_clocks, None);
            assert_eq!(s.gpus[0].locked_memory_clocks, None);
        });
    }

    #[test]
    fn test_inverted_range_rejected() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let mut device = nvml.device_by_index(0).unwrap();

        let err = lock_clocks(&mut device, ClockType::Graphics, 1800, 1200).unwrap_err();

        assert!(matches!(
            err,
            AppError::Domain(DomainError::InvalidClockRange { min: 1800, max: 1200 })
        ));
        assert_eq!(mock::call_count("nvmlDeviceSetGpuLockedClocks"), 0);
    }
}
