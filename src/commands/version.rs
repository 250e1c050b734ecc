//! Version command implementation

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, VersionInfo};
use crate::commands::optional;
use crate::error::Result;
use crate::nvml::Nvml;

/// Execute the version command
pub fn run_version(nvml: &Nvml, format: OutputFormat) -> Result<()> {
    print_output(&collect_versions(nvml)?, format)?;
    Ok(())
}

pub fn collect_versions(nvml: &Nvml) -> Result<VersionInfo> {
    Ok(VersionInfo {
        driver_version: nvml.driver_version()?,
        nvml_version: nvml.nvml_version()?,
        cuda_driver_version: optional(nvml.cuda_driver_version())?.map(|v| v.to_string()),
        library: nvml.library().origin().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MockGpu};

    #[test]
    fn test_versions() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();

        let info = collect_versions(&nvml).unwrap();

        assert_eq!(info.driver_version, "550.54.15");
        assert_eq!(info.nvml_version, "12.550.54.15");
        assert_eq!(info.cuda_driver_version.as_deref(), Some("12.4"));
        assert_eq!(info.library, "mock");
    }
}
