//! GPU process records
//!
//! [`ProcessInfo`] is one entry of a running-process list as NVML reports it.
//! [`ProcessList`] merges the compute and graphics lists of a device.

use crate::schema::buffers::{VALUE_NOT_AVAILABLE_U32, VALUE_NOT_AVAILABLE_U64};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One process with a context on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    /// Bytes of device memory in use. `None` when the driver can't tell,
    /// e.g. on Windows under WDDM.
    pub used_gpu_memory: Option<u64>,
    /// MIG GPU instance, when MIG is enabled
    pub gpu_instance_id: Option<u32>,
    /// MIG compute instance, when MIG is enabled
    pub compute_instance_id: Option<u32>,
}

impl ProcessInfo {
    /// Build from raw native fields, mapping the "not available" sentinels.
    pub fn from_raw(
        pid: u32,
        used_gpu_memory: u64,
        gpu_instance_id: u32,
        compute_instance_id: u32,
    ) -> Self {
        Self {
            pid,
            used_gpu_memory: (used_gpu_memory != VALUE_NOT_AVAILABLE_U64).then_some(used_gpu_memory),
            gpu_instance_id: (gpu_instance_id != VALUE_NOT_AVAILABLE_U32).then_some(gpu_instance_id),
            compute_instance_id: (compute_instance_id != VALUE_NOT_AVAILABLE_U32)
                .then_some(compute_instance_id),
        }
    }
}

/// Which list(s) a process appeared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProcessType {
    Graphics,
    Compute,
    GraphicsCompute,
}

impl ProcessType {
    pub fn is_graphics(&self) -> bool {
        matches!(self, Self::Graphics | Self::GraphicsCompute)
    }

    pub fn is_compute(&self) -> bool {
        matches!(self, Self::Compute | Self::GraphicsCompute)
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graphics => write!(f, "Graphics"),
            Self::Compute => write!(f, "Compute"),
            Self::GraphicsCompute => write!(f, "Graphics+Compute"),
        }
    }
}

/// A process on the device, with its name once resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GpuProcess {
    pub pid: u32,
    pub name: Option<String>,
    pub used_memory: Option<u64>,
    pub process_type: ProcessType,
}

impl GpuProcess {
    pub fn memory_mib(&self) -> Option<f64> {
        self.used_memory.map(|bytes| bytes as f64 / 1024.0 / 1024.0)
    }

    /// Name, or "pid N" when the name could not be resolved
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("pid {}", self.pid))
    }
}

/// Compute and graphics processes of one device, merged by pid
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessList {
    pub processes: Vec<GpuProcess>,
}

impl ProcessList {
    /// Merge the two native lists. A pid present in both becomes
    /// [`ProcessType::GraphicsCompute`]; the larger memory figure is kept.
    pub fn merge(compute: &[ProcessInfo], graphics: &[ProcessInfo]) -> Self {
        let mut by_pid: BTreeMap<u32, GpuProcess> = BTreeMap::new();

        for (infos, kind) in [(compute, ProcessType::Compute), (graphics, ProcessType::Graphics)] {
            for info in infos {
                by_pid
                    .entry(info.pid)
                    .and_modify(|existing| {
                        if existing.process_type != kind {
                            existing.process_type = ProcessType::GraphicsCompute;
                        }
                        existing.used_memory = existing.used_memory.max(info.used_gpu_memory);
                    })
                    .or_insert(GpuProcess {
                        pid: info.pid,
                        name: None,
                        used_memory: info.used_gpu_memory,
                        process_type: kind,
                    });
            }
        }

        Self {
            processes: by_pid.into_values().collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.processes.len()
    }

    /// Total known memory in bytes. Processes without a figure count as 0.
    pub fn total_used_memory(&self) -> u64 {
        self.processes.iter().filter_map(|p| p.used_memory).sum()
    }

    /// Sort by memory usage, largest first
    pub fn sort_by_memory(&mut self) {
        self.processes.sort_by(|a, b| b.used_memory.cmp(&a.used_memory));
    }

    pub fn sort_by_pid(&mut self) {
        self.processes.sort_by_key(|p| p.pid);
    }

    pub fn retain_type(&mut self, keep: impl Fn(ProcessType) -> bool) {
        self.processes.retain(|p| keep(p.process_type));
    }
}
