//! Persistence mode command implementation

use crate::cli::args::{OutputFormat, PersistenceArgs, PersistenceCommands};
use crate::cli::output::{print_output, Message, ModeStatus};
use crate::commands::{report, select_devices};
use crate::error::Result;
use crate::nvml::{Device, Nvml};
use crate::schema::EnableState;

/// Execute persistence mode commands
pub fn run_persistence(
    nvml: &Nvml,
    args: &PersistenceArgs,
    format: OutputFormat,
    gpu_index: Option<u32>,
) -> Result<()> {
    for mut device in select_devices(nvml, gpu_index)? {
        match &args.command {
            None | Some(PersistenceCommands::Get) => {
                print_output(&report(&device, persistence_status(&device)?)?, format)?;
            }
            Some(PersistenceCommands::Set { state }) => {
                let message = set_persistence(&mut device, EnableState::from(*state))?;
                print_output(&message, format)?;
            }
        }
    }

    Ok(())
}

pub fn persistence_status(device: &Device<'_>) -> Result<ModeStatus> {
    Ok(ModeStatus {
        setting: "Persistence Mode",
        value: device.persistence_mode()?.to_string(),
        pending: None,
    })
}

pub fn set_persistence(device: &mut Device<'_>, state: EnableState) -> Result<Message> {
    device.set_persistence_mode(state)?;

    Ok(Message::ok(format!(
        "GPU {}: persistence mode {}",
        device.index()?,
        state
    )))
}
