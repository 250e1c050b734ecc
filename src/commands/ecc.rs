//! ECC command implementation
//!
//! Mode changes only take effect after the next reboot, so status shows the
//! pending mode next to the current one.

use crate::cli::args::{EccArgs, EccCommands, OutputFormat};
use crate::cli::output::{print_output, EccStatus, Message, ModeStatus};
use crate::commands::{optional, report, select_devices};
use crate::error::Result;
use crate::nvml::{Device, Nvml};
use crate::schema::{EccCounterType, EnableState};

/// Execute ECC commands
pub fn run_ecc(
    nvml: &Nvml,
    args: &EccArgs,
    format: OutputFormat,
    gpu_index: Option<u32>,
) -> Result<()> {
    for mut device in select_devices(nvml, gpu_index)? {
        match &args.command {
            None | Some(EccCommands::Status) => {
                print_output(&report(&device, ecc_status(&device)?)?, format)?;
            }
            Some(EccCommands::Clear { counter }) => {
                let message = clear_counters(&mut device, EccCounterType::from(*counter))?;
                print_output(&message, format)?;
            }
            Some(EccCommands::Set { state }) => {
                let message = set_ecc(&mut device, EnableState::from(*state))?;
                print_output(&message, format)?;
            }
        }
    }

    Ok(())
}

/// ECC mode and error totals. Counters are skipped while ECC is off.
pub fn ecc_status(device: &Device<'_>) -> Result<EccStatus> {
    let mode = device.ecc_mode()?;
    let (volatile, aggregate) = if mode.current.is_enabled() {
        (
            optional(device.ecc_totals(EccCounterType::Volatile))?,
            optional(device.ecc_totals(EccCounterType::Aggregate))?,
        )
    } else {
        (None, None)
    };

    Ok(EccStatus {
        mode: ModeStatus {
            setting: "ECC",
            value: mode.current.to_string(),
            pending: Some(mode.pending.to_string()),
        },
        volatile,
        aggregate,
    })
}

pub fn clear_counters(device: &mut Device<'_>, counter: EccCounterType) -> Result<Message> {
    device.clear_ecc_error_counts(counter)?;

    Ok(Message::ok(format!(
        "GPU {}: {} ECC counters cleared",
        device.index()?,
        counter
    )))
}

pub fn set_ecc(device: &mut Device<'_>, state: EnableState) -> Result<Message> {
    device.set_ecc_mode(state)?;

    Ok(Message::ok(format!(
        "GPU {}: ECC will be {} after reboot",
        device.index()?,
        state
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MockGpu};

    #[test]
    fn test_ecc_disabled_skips_counters() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let status = ecc_status(&device).unwrap();

        assert_eq!(status.mode.value, "disabled");
        assert!(status.volatile.is_none());
        assert_eq!(mock::call_count("nvmlDeviceGetTotalEccErrors"), 0);
    }

    #[test]
    fn test_ecc_counters_and_clear() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        mock::with_state(|s| {
            s.gpus[0].ecc_mode = (1, 1);
            s.gpus[0].ecc_corrected = 12;
            s.gpus[0].ecc_uncorrected = 1;
        });
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let mut device = nvml.device_by_index(0).unwrap();

        let status = ecc_status(&device).unwrap();
        let volatile = status.volatile.unwrap();
        assert_eq!(volatile.corrected, 12);
        assert!(volatile.has_uncorrected());

        clear_counters(&mut device, EccCounterType::Volatile).unwrap();
        let status = ecc_status(&device).unwrap();
        assert_eq!(status.volatile.unwrap().corrected, 0);
    }

    #[test]
    fn test_set_ecc_is_pending() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let mut device = nvml.device_by_index(0).unwrap();

        set_ecc(&mut device, EnableState::Enabled).unwrap();

        let status = ecc_status(&device).unwrap();
        assert_eq!(status.mode.value, "disabled");
        assert_eq!(status.mode.pending.as_deref(), Some("enabled"));
    }
}
