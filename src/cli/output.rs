//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::domain::{EccTotals, GpuInfo, GpuProcess, ProcessList};
use serde::Serialize;
use std::fmt::Display;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

fn or_na<T: Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "N/A".to_string(),
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| format!("  {}\n", l))
        .collect::<String>()
}

/// One section of output for one GPU
#[derive(Debug, Clone, Serialize)]
pub struct GpuReport<T> {
    pub gpu_index: u32,
    pub gpu_name: String,
    #[serde(flatten)]
    pub report: T,
}

impl<T: TableDisplay> TableDisplay for GpuReport<T> {
    fn to_table(&self) -> String {
        format!(
            "[{}] {}\n{}",
            self.gpu_index,
            self.gpu_name,
            indent(&self.report.to_table())
        )
    }

    fn to_compact(&self) -> String {
        format!("GPU {}: {}", self.gpu_index, self.report.to_compact())
    }
}

/// GPU list entry for display
#[derive(Debug, Clone, Serialize)]
pub struct GpuListEntry {
    pub index: u32,
    pub name: String,
    pub uuid: String,
    pub pci_bus_id: Option<String>,
    pub fans: u32,
}

impl From<&GpuInfo> for GpuListEntry {
    fn from(info: &GpuInfo) -> Self {
        Self {
            index: info.index,
            name: info.name.clone(),
            uuid: info.uuid.clone(),
            pci_bus_id: info.pci_bus_id.clone(),
            fans: info.fan_count,
        }
    }
}

impl TableDisplay for GpuListEntry {
    fn to_table(&self) -> String {
        format!(
            "[{}] {} (Bus: {}, Fans: {}, UUID: {})",
            self.index,
            self.name,
            or_na(&self.pci_bus_id),
            self.fans,
            self.uuid
        )
    }

    fn to_compact(&self) -> String {
        format!("{}:{}", self.index, self.name)
    }
}

/// GPU list for display
#[derive(Debug, Clone, Serialize)]
pub struct GpuList {
    pub gpus: Vec<GpuListEntry>,
    pub driver_version: String,
}

impl TableDisplay for GpuList {
    fn to_table(&self) -> String {
        let mut output = format!("Driver Version: {}\n", self.driver_version);
        output.push_str(&format!("GPUs Found: {}\n\n", self.gpus.len()));

        for gpu in &self.gpus {
            output.push_str(&gpu.to_table());
            output.push('\n');
        }

        output
    }

    fn to_compact(&self) -> String {
        self.gpus
            .iter()
            .map(|g| g.to_compact())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Versions of the installed stack
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub driver_version: String,
    pub nvml_version: String,
    pub cuda_driver_version: Option<String>,
    pub library: String,
}

impl TableDisplay for VersionInfo {
    fn to_table(&self) -> String {
        format!(
            "Driver Version: {}\nNVML Version: {}\nCUDA Version: {}\nLibrary: {}",
            self.driver_version,
            self.nvml_version,
            or_na(&self.cuda_driver_version),
            self.library
        )
    }

    fn to_compact(&self) -> String {
        format!(
            "driver {} nvml {} cuda {}",
            self.driver_version,
            self.nvml_version,
            or_na(&self.cuda_driver_version)
        )
    }
}

/// Memory section
#[derive(Debug, Clone, Serialize)]
pub struct MemoryStatus {
    pub total_mib: f64,
    pub used_mib: f64,
    pub usage_percent: f64,
    pub bar1_total_mib: Option<f64>,
    pub bar1_used_mib: Option<f64>,
    pub bus_width_bits: Option<u32>,
}

impl TableDisplay for MemoryStatus {
    fn to_table(&self) -> String {
        let mut output = format!(
            "Memory: {:.0} / {:.0} MiB ({:.1}%)\n",
            self.used_mib, self.total_mib, self.usage_percent
        );
        if let (Some(used), Some(total)) = (self.bar1_used_mib, self.bar1_total_mib) {
            output.push_str(&format!("BAR1: {:.0} / {:.0} MiB\n", used, total));
        }
        if let Some(width) = self.bus_width_bits {
            output.push_str(&format!("Bus Width: {} bits\n", width));
        }
        output
    }
}

/// Power section
#[derive(Debug, Clone, Serialize)]
pub struct PowerStatus {
    pub usage_watts: Option<u32>,
    pub limit_watts: Option<u32>,
    pub enforced_limit_watts: Option<u32>,
    pub default_limit_watts: Option<u32>,
    pub min_limit_watts: Option<u32>,
    pub max_limit_watts: Option<u32>,
    pub performance_state: Option<String>,
}

impl TableDisplay for PowerStatus {
    fn to_table(&self) -> String {
        let mut output = format!(
            "Current Usage: {}W\nPower Limit: {}W (enforced {}W)\n",
            or_na(&self.usage_watts),
            or_na(&self.limit_watts),
            or_na(&self.enforced_limit_watts)
        );
        if let (Some(min), Some(max)) = (self.min_limit_watts, self.max_limit_watts) {
            output.push_str(&format!("Range: {}W - {}W\n", min, max));
        }
        output.push_str(&format!("Default: {}W\n", or_na(&self.default_limit_watts)));
        if let Some(pstate) = &self.performance_state {
            output.push_str(&format!("Performance State: {}\n", pstate));
        }
        output
    }
}

/// Thermal section
#[derive(Debug, Clone, Serialize)]
pub struct ThermalStatus {
    pub temperature: Option<u32>,
    pub slowdown_threshold: Option<u32>,
    pub shutdown_threshold: Option<u32>,
    pub gpu_max_threshold: Option<u32>,
}

impl TableDisplay for ThermalStatus {
    fn to_table(&self) -> String {
        let mut output = format!("Temperature: {}°C\n", or_na(&self.temperature));

        if let Some(t) = self.slowdown_threshold {
            output.push_str(&format!("Slowdown Threshold: {}°C\n", t));
        }
        if let Some(t) = self.shutdown_threshold {
            output.push_str(&format!("Shutdown Threshold: {}°C\n", t));
        }
        if let Some(t) = self.gpu_max_threshold {
            output.push_str(&format!("Max Operating: {}°C\n", t));
        }

        output
    }
}

/// Clock section
#[derive(Debug, Clone, Serialize)]
pub struct ClockStatus {
    pub graphics_mhz: Option<u32>,
    pub sm_mhz: Option<u32>,
    pub memory_mhz: Option<u32>,
    pub video_mhz: Option<u32>,
    pub max_graphics_mhz: Option<u32>,
    pub max_memory_mhz: Option<u32>,
    pub throttle_reasons: Vec<&'static str>,
}

impl TableDisplay for ClockStatus {
    fn to_table(&self) -> String {
        let mut output = format!(
            "Graphics: {} MHz (max {})\nSM: {} MHz\nMemory: {} MHz (max {})\nVideo: {} MHz\n",
            or_na(&self.graphics_mhz),
            or_na(&self.max_graphics_mhz),
            or_na(&self.sm_mhz),
            or_na(&self.memory_mhz),
            or_na(&self.max_memory_mhz),
            or_na(&self.video_mhz)
        );
        if self.throttle_reasons.is_empty() {
            output.push_str("Throttling: none\n");
        } else {
            output.push_str(&format!("Throttling: {}\n", self.throttle_reasons.join(", ")));
        }
        output
    }
}

/// Fan section
#[derive(Debug, Clone, Serialize)]
pub struct FanStatus {
    pub fans: Vec<FanInfo>,
    pub speed_range: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FanInfo {
    pub index: u32,
    pub speed: Option<u32>,
    pub policy: Option<String>,
}

impl TableDisplay for FanStatus {
    fn to_table(&self) -> String {
        if self.fans.is_empty() {
            return "No controllable fans\n".to_string();
        }

        let mut output = String::new();
        for fan in &self.fans {
            output.push_str(&format!(
                "Fan {}: {}% ({})\n",
                fan.index,
                or_na(&fan.speed),
                or_na(&fan.policy)
            ));
        }
        if let Some(range) = &self.speed_range {
            output.push_str(&format!("Range: {}\n", range));
        }

        output
    }
}

/// PCI section
#[derive(Debug, Clone, Serialize)]
pub struct PciStatus {
    pub bus_id: String,
    pub device_id: String,
    pub link_generation: Option<u32>,
    pub link_width: Option<u32>,
    pub max_link_generation: Option<u32>,
    pub max_link_width: Option<u32>,
}

impl TableDisplay for PciStatus {
    fn to_table(&self) -> String {
        format!(
            "Bus: {} (device {})\nPCIe Link: Gen{} x{} (Max: Gen{} x{})\n",
            self.bus_id,
            self.device_id,
            or_na(&self.link_generation),
            or_na(&self.link_width),
            or_na(&self.max_link_generation),
            or_na(&self.max_link_width)
        )
    }
}

/// Everything `info` shows for one GPU
#[derive(Debug, Clone, Serialize)]
pub struct GpuDetails {
    pub uuid: String,
    pub brand: Option<String>,
    pub architecture: Option<String>,
    pub serial: Option<String>,
    pub vbios_version: Option<String>,
    pub compute_capability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thermal: Option<ThermalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clocks: Option<ClockStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fans: Option<FanStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pci: Option<PciStatus>,
}

impl TableDisplay for GpuDetails {
    fn to_table(&self) -> String {
        let mut output = format!("UUID: {}\n", self.uuid);
        output.push_str(&format!(
            "Brand: {}  Architecture: {}  Compute Capability: {}\n",
            or_na(&self.brand),
            or_na(&self.architecture),
            or_na(&self.compute_capability)
        ));
        output.push_str(&format!(
            "Serial: {}  VBIOS: {}\n",
            or_na(&self.serial),
            or_na(&self.vbios_version)
        ));

        let sections: [(&str, Option<String>); 6] = [
            ("Memory", self.memory.as_ref().map(|s| s.to_table())),
            ("Power", self.power.as_ref().map(|s| s.to_table())),
            ("Thermal", self.thermal.as_ref().map(|s| s.to_table())),
            ("Clocks", self.clocks.as_ref().map(|s| s.to_table())),
            ("Fans", self.fans.as_ref().map(|s| s.to_table())),
            ("PCI", self.pci.as_ref().map(|s| s.to_table())),
        ];
        for (title, body) in sections {
            if let Some(body) = body {
                output.push_str(&format!("\n{}:\n{}", title, indent(&body)));
            }
        }

        output
    }
}

/// Process list output
#[derive(Debug, Clone, Serialize)]
pub struct ProcessListOutput {
    pub process_count: usize,
    pub total_memory_mib: f64,
    pub processes: Vec<ProcessEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    pub memory_mib: Option<f64>,
    pub process_type: String,
}

impl From<&GpuProcess> for ProcessEntry {
    fn from(process: &GpuProcess) -> Self {
        Self {
            pid: process.pid,
            name: process.display_name(),
            memory_mib: process.memory_mib(),
            process_type: process.process_type.to_string(),
        }
    }
}

impl From<&ProcessList> for ProcessListOutput {
    fn from(list: &ProcessList) -> Self {
        Self {
            process_count: list.count(),
            total_memory_mib: list.total_used_memory() as f64 / 1024.0 / 1024.0,
            processes: list.processes.iter().map(ProcessEntry::from).collect(),
        }
    }
}

impl TableDisplay for ProcessListOutput {
    fn to_table(&self) -> String {
        let mut output = format!(
            "Processes: {} (Total Memory: {:.1} MiB)\n\n",
            self.process_count, self.total_memory_mib
        );

        if self.processes.is_empty() {
            output.push_str("No processes running on GPU\n");
            return output;
        }

        // Table header
        output.push_str("PID      Memory       Type              Name\n");
        output.push_str("────────────────────────────────────────────────────────────\n");

        // Table rows
        for process in &self.processes {
            let memory = match process.memory_mib {
                Some(mib) => format!("{:.1} MiB", mib),
                None => "N/A".to_string(),
            };
            output.push_str(&format!(
                "{:<8} {:<12} {:<17} {}\n",
                process.pid, memory, process.process_type, process.name
            ));
        }

        output
    }

    fn to_compact(&self) -> String {
        if self.processes.is_empty() {
            "No processes".to_string()
        } else {
            format!(
                "{} processes, {:.1} MiB total",
                self.process_count, self.total_memory_mib
            )
        }
    }
}

/// A single mode value
#[derive(Debug, Clone, Serialize)]
pub struct ModeStatus {
    pub setting: &'static str,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<String>,
}

impl TableDisplay for ModeStatus {
    fn to_table(&self) -> String {
        match &self.pending {
            Some(pending) if *pending != self.value => {
                format!("{}: {} (pending: {})", self.setting, self.value, pending)
            }
            _ => format!("{}: {}", self.setting, self.value),
        }
    }
}

/// ECC section
#[derive(Debug, Clone, Serialize)]
pub struct EccStatus {
    pub mode: ModeStatus,
    pub volatile: Option<EccTotals>,
    pub aggregate: Option<EccTotals>,
}

impl TableDisplay for EccStatus {
    fn to_table(&self) -> String {
        let mut output = format!("{}\n", self.mode.to_table());

        for (label, totals) in [
            ("Current Boot", &self.volatile),
            ("Lifetime", &self.aggregate),
        ] {
            if let Some(t) = totals {
                output.push_str(&format!(
                    "{}: {} corrected, {} uncorrected\n",
                    label, t.corrected, t.uncorrected
                ));
            }
        }

        output
    }
}

/// Video encoder/decoder activity
#[derive(Debug, Clone, Serialize)]
pub struct VideoStatus {
    pub encoder_utilization: Option<u32>,
    pub decoder_utilization: Option<u32>,
    pub encoder_sessions: Option<u32>,
    pub encoder_average_fps: Option<u32>,
    pub fbc_sessions: Option<u32>,
}

impl TableDisplay for VideoStatus {
    fn to_table(&self) -> String {
        format!(
            "Encoder Utilization: {}%\nDecoder Utilization: {}%\nEncoder Sessions: {} ({} fps avg)\nFrame Capture Sessions: {}\n",
            or_na(&self.encoder_utilization),
            or_na(&self.decoder_utilization),
            or_na(&self.encoder_sessions),
            or_na(&self.encoder_average_fps),
            or_na(&self.fbc_sessions)
        )
    }
}

/// Simple message output
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

impl Message {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }
}

impl TableDisplay for Message {
    fn to_table(&self) -> String {
        if self.success {
            format!("✓ {}", self.message)
        } else {
            format!("✗ {}", self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_list_entry_table() {
        let entry = GpuListEntry {
            index: 0,
            name: "Test GPU".to_string(),
            uuid: "GPU-123".to_string(),
            pci_bus_id: None,
            fans: 2,
        };

        let output = entry.to_table();
        assert!(output.contains("Test GPU"));
        assert!(output.contains("GPU-123"));
        assert!(output.contains("Bus: N/A"));
    }

    #[test]
    fn test_gpu_report_indents_section() {
        let report = GpuReport {
            gpu_index: 1,
            gpu_name: "GPU".to_string(),
            report: ModeStatus {
                setting: "Compute Mode",
                value: "default".to_string(),
                pending: None,
            },
        };

        assert_eq!(report.to_table(), "[1] GPU\n  Compute Mode: default\n");
        assert_eq!(report.to_compact(), "GPU 1: Compute Mode: default");
    }

    #[test]
    fn test_gpu_report_json_is_flat() {
        let report = GpuReport {
            gpu_index: 0,
            gpu_name: "GPU".to_string(),
            report: ThermalStatus {
                temperature: Some(45),
                slowdown_threshold: None,
                shutdown_threshold: None,
                gpu_max_threshold: None,
            },
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["gpu_index"], 0);
        assert_eq!(json["temperature"], 45);
        assert!(json["slowdown_threshold"].is_null());
    }

    #[test]
    fn test_pending_mode_shown() {
        let mode = ModeStatus {
            setting: "ECC",
            value: "disabled".to_string(),
            pending: Some("enabled".to_string()),
        };
        assert_eq!(mode.to_table(), "ECC: disabled (pending: enabled)");
    }

    #[test]
    fn test_message_display() {
        assert!(Message::ok("Operation completed").to_table().starts_with('✓'));
    }
}
