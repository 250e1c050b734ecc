//! Processes command implementation
//!
//! Lists processes using each GPU, merging the compute and graphics lists.

use crate::cli::args::{OutputFormat, ProcessArgs, ProcessKindArg};
use crate::cli::output::{print_output, ProcessListOutput};
use crate::commands::{report, select_devices};
use crate::domain::ProcessList;
use crate::error::Result;
use crate::nvml::{Device, Nvml};

/// Execute the processes command
pub fn run_processes(
    nvml: &Nvml,
    args: &ProcessArgs,
    format: OutputFormat,
    gpu_index: Option<u32>,
) -> Result<()> {
    for device in select_devices(nvml, gpu_index)? {
        let list = process_list(nvml, &device, args)?;
        print_output(&report(&device, ProcessListOutput::from(&list))?, format)?;
    }
    Ok(())
}

/// Read, name, sort and truncate the processes of one device.
pub fn process_list(nvml: &Nvml, device: &Device<'_>, args: &ProcessArgs) -> Result<ProcessList> {
    let compute = match args.kind {
        ProcessKindArg::Compute | ProcessKindArg::All => device.running_compute_processes()?,
        ProcessKindArg::Graphics => Vec::new(),
    };
    let graphics = match args.kind {
        ProcessKindArg::Graphics | ProcessKindArg::All => device.running_graphics_processes()?,
        ProcessKindArg::Compute => Vec::new(),
    };

    let mut list = ProcessList::merge(&compute, &graphics);

    // A process can exit between the list call and the name lookup.
    for process in &mut list.processes {
        match nvml.process_name(process.pid) {
            Ok(name) => process.name = Some(name),
            Err(err) => log::debug!("no name for pid {}: {}", process.pid, err),
        }
    }

    if args.sort_pid {
        list.sort_by_pid();
    } else {
        list.sort_by_memory();
    }
    if let Some(top) = args.top {
        list.processes.truncate(top);
    }

    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProcessType;
    use crate::mock::{self, MockGpu};

    const MIB: u64 = 1024 * 1024;

    fn args(kind: ProcessKindArg) -> ProcessArgs {
        ProcessArgs {
            kind,
            sort_pid: false,
            top: None,
        }
    }

    #[test]
    fn test_empty_list() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let list = process_list(&nvml, &device, &args(ProcessKindArg::All)).unwrap();

        assert_eq!(list.count(), 0);
        assert_eq!(
            mock::list_capacities("nvmlDeviceGetComputeRunningProcesses_v3"),
            vec![0]
        );
    }

    #[test]
    fn test_merged_named_and_sorted() {
        let lib = mock::install(vec![MockGpu::new("GPU A")
            .with_compute_process(100, 512 * MIB)
            .with_compute_process(200, 2048 * MIB)
            .with_graphics_process(100, 256 * MIB)]);
        mock::with_state(|s| {
            s.process_names.insert(200, "python3".to_string());
        });
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let list = process_list(&nvml, &device, &args(ProcessKindArg::All)).unwrap();

        assert_eq!(list.count(), 2);
        assert_eq!(list.processes[0].pid, 200);
        assert_eq!(list.processes[0].name.as_deref(), Some("python3"));
        assert_eq!(list.processes[1].process_type, ProcessType::GraphicsCompute);
        assert_eq!(list.processes[1].display_name(), "pid 100");
    }

    #[test]
    fn test_compute_only_skips_graphics_list() {
        let lib = mock::install(vec![MockGpu::new("GPU A")
            .with_compute_process(100, MIB)
            .with_graphics_process(300, MIB)]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let list = process_list(&nvml, &device, &args(ProcessKindArg::Compute)).unwrap();

        assert_eq!(list.count(), 1);
        assert_eq!(mock::call_count("nvmlDeviceGetGraphicsRunningProcesses_v3"), 0);
    }

    #[test]
    fn test_top_by_pid() {
        let lib = mock::install(vec![MockGpu::new("GPU A")
            .with_compute_process(30, MIB)
            .with_compute_process(10, 4 * MIB)
            .with_compute_process(20, 2 * MIB)]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let args = ProcessArgs {
            kind: ProcessKindArg::All,
            sort_pid: true,
            top: Some(2),
        };
        let list = process_list(&nvml, &device, &args).unwrap();

        let pids: Vec<u32> = list.processes.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![10, 20]);
    }
}
