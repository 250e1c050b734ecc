//! Info command implementation
//!
//! Displays detailed GPU information. Section flags narrow the output; with
//! none given every section is shown.

use crate::cli::args::{InfoArgs, OutputFormat};
use crate::cli::output::{print_output, GpuDetails, MemoryStatus, PciStatus, ThermalStatus};
use crate::commands::clocks::clock_status;
use crate::commands::fan::fan_status;
use crate::commands::list::describe;
use crate::commands::power::power_status;
use crate::commands::{optional, report, select_devices};
use crate::error::Result;
use crate::nvml::{Device, Nvml};
use crate::schema::{TemperatureSensor, TemperatureThreshold};

const MIB: f64 = 1024.0 * 1024.0;

/// Execute the info command
pub fn run_info(
    nvml: &Nvml,
    args: &InfoArgs,
    format: OutputFormat,
    gpu_index: Option<u32>,
) -> Result<()> {
    for device in select_devices(nvml, gpu_index)? {
        print_output(&report(&device, gpu_details(&device, args)?)?, format)?;
    }
    Ok(())
}

/// Gather the requested sections for one device.
pub fn gpu_details(device: &Device<'_>, args: &InfoArgs) -> Result<GpuDetails> {
    let all = args.shows_all();
    let info = describe(device)?;

    Ok(GpuDetails {
        uuid: info.uuid,
        brand: info.brand.map(|b| b.to_string()),
        architecture: info.architecture.map(|a| a.to_string()),
        serial: info.serial,
        vbios_version: info.vbios_version,
        compute_capability: optional(device.cuda_compute_capability())?.map(|c| c.to_string()),
        memory: section(all || args.memory, || memory_status(device))?,
        power: section(all || args.power, || power_status(device))?,
        thermal: section(all || args.thermal, || thermal_status(device))?,
        clocks: section(all || args.clocks, || clock_status(device))?,
        fans: section(all || args.fans, || fan_status(device))?,
        pci: section(all || args.pci, || pci_status(device))?,
    })
}

fn section<T>(wanted: bool, read: impl FnOnce() -> Result<T>) -> Result<Option<T>> {
    if wanted {
        read().map(Some)
    } else {
        Ok(None)
    }
}

pub fn memory_status(device: &Device<'_>) -> Result<MemoryStatus> {
    let memory = device.memory_info()?;
    let bar1 = optional(device.bar1_memory_info())?;

    Ok(MemoryStatus {
        total_mib: memory.total_mib(),
        used_mib: memory.used_mib(),
        usage_percent: memory.usage_percent(),
        bar1_total_mib: bar1.map(|b| b.total as f64 / MIB),
        bar1_used_mib: bar1.map(|b| b.used as f64 / MIB),
        bus_width_bits: optional(device.memory_bus_width())?,
    })
}

pub fn thermal_status(device: &Device<'_>) -> Result<ThermalStatus> {
    Ok(ThermalStatus {
        temperature: optional(device.temperature(TemperatureSensor::Gpu))?,
        slowdown_threshold: optional(device.temperature_threshold(TemperatureThreshold::Slowdown))?,
        shutdown_threshold: optional(device.temperature_threshold(TemperatureThreshold::Shutdown))?,
        gpu_max_threshold: optional(device.temperature_threshold(TemperatureThreshold::GpuMax))?,
    })
}

pub fn pci_status(device: &Device<'_>) -> Result<PciStatus> {
    let pci = device.pci_info()?;

    Ok(PciStatus {
        bus_id: pci.bus_id.clone(),
        device_id: format!("{:04x}:{:04x}", pci.vendor_id(), pci.device_id()),
        link_generation: optional(device.curr_pcie_link_generation())?,
        link_width: optional(device.curr_pcie_link_width())?,
        max_link_generation: optional(device.max_pcie_link_generation())?,
        max_link_width: optional(device.max_pcie_link_width())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Cli, Commands};
    use crate::mock::{self, MockGpu};
    use clap::Parser;

    fn info_args(argv: &[&str]) -> InfoArgs {
        let mut full = vec!["nvbind", "info"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Info(args) => args,
            _ => panic!("Expected Info command"),
        }
    }

    #[test]
    fn test_all_sections() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let details = gpu_details(&device, &info_args(&[])).unwrap();

        assert_eq!(details.architecture.as_deref(), Some("Ampere"));
        assert_eq!(details.compute_capability.as_deref(), Some("8.6"));
        let memory = details.memory.unwrap();
        assert_eq!(memory.total_mib, 24576.0);
        assert_eq!(memory.used_mib, 2048.0);
        assert_eq!(details.thermal.unwrap().gpu_max_threshold, None);
        assert_eq!(details.pci.unwrap().link_width, Some(16));
        assert!(details.fans.is_some());
    }

    #[test]
    fn test_single_section() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let details = gpu_details(&device, &info_args(&["--thermal"])).unwrap();

        assert_eq!(details.thermal.unwrap().temperature, Some(45));
        assert!(details.memory.is_none());
        assert!(details.power.is_none());
        assert_eq!(mock::call_count("nvmlDeviceGetMemoryInfo"), 0);
    }

    #[test]
    fn test_pci_ids() {
        let lib = mock::install(vec![MockGpu::new("GPU A").with_pci_bus_id("00000000:41:00.0")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let pci = pci_status(&device).unwrap();

        assert_eq!(pci.bus_id, "00000000:41:00.0");
        assert!(pci.device_id.starts_with("10de:"));
    }
}
