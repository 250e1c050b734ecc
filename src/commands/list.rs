//! List command implementation
//!
//! Lists all detected NVIDIA GPUs.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, GpuList, GpuListEntry};
use crate::commands::optional;
use crate::domain::GpuInfo;
use crate::error::Result;
use crate::nvml::{Device, Nvml};

/// Execute the list command
pub fn run_list(nvml: &Nvml, format: OutputFormat) -> Result<()> {
    let gpu_list = collect_list(nvml)?;
    print_output(&gpu_list, format)?;
    Ok(())
}

/// Identity of every GPU plus the driver version.
pub fn collect_list(nvml: &Nvml) -> Result<GpuList> {
    let driver_version = nvml.driver_version()?;
    let devices = nvml.devices()?;

    let mut gpus = Vec::with_capacity(devices.len());
    for device in &devices {
        gpus.push(GpuListEntry::from(&describe(device)?));
    }

    Ok(GpuList {
        gpus,
        driver_version,
    })
}

/// Collect the identity fields of one device.
///
/// Only index, name and UUID are required. The rest are left empty when the
/// board does not report them.
pub fn describe(device: &Device<'_>) -> Result<GpuInfo> {
    let mut info = GpuInfo::new(device.index()?, device.name()?, device.uuid()?);

    if let Some(pci) = optional(device.pci_info())? {
        info = info.with_pci_bus_id(pci.bus_id);
    }
    if let Some(vbios) = optional(device.vbios_version())? {
        info = info.with_vbios_version(vbios);
    }
    if let Some(serial) = optional(device.serial())? {
        info = info.with_serial(serial);
    }
    if let Some(brand) = optional(device.brand())? {
        info = info.with_brand(brand);
    }
    if let Some(architecture) = optional(device.architecture())? {
        info = info.with_architecture(architecture);
    }
    if let Some(fans) = optional(device.num_fans())? {
        info = info.with_fan_count(fans);
    }

    Ok(info)
}
