//! End-to-end checks against the installed NVML library.
//!
//! Run with `cargo test -- --ignored` on a machine with an NVIDIA driver.

use nvbind::schema::{ComputeMode, InitFlags, TemperatureSensor};
use nvbind::{InitMode, Nvml};

#[test]
#[ignore = "Requires NVIDIA driver"]
fn test_init_count_shutdown() {
    // Hosts without a GPU report zero devices.
    let nvml = Nvml::init_with_flags(InitFlags::NO_GPUS).unwrap();
    nvml.device_count().unwrap();
    nvml.shutdown().unwrap();
}

#[test]
#[ignore = "Requires NVIDIA GPU"]
fn test_first_device_identity() {
    let nvml = Nvml::init().unwrap();
    {
        let device = nvml.device_by_index(0).unwrap();
        let name = device.name().unwrap();
        let uuid = device.uuid().unwrap();
        let temperature = device.temperature(TemperatureSensor::Gpu).unwrap();

        assert!(!name.is_empty() && !name.contains('\0'));
        assert!(uuid.starts_with("GPU-"));
        assert!(temperature > 0 && temperature < 150);
    }
    nvml.shutdown().unwrap();
}

#[test]
#[ignore = "Requires NVIDIA GPU"]
fn test_compute_processes_have_pids() {
    let nvml = Nvml::init().unwrap();
    {
        let device = nvml.device_by_index(0).unwrap();
        for process in device.running_compute_processes().unwrap() {
            assert!(process.pid > 0);
        }
    }
    nvml.shutdown().unwrap();
}

#[test]
#[ignore = "Requires NVIDIA GPU"]
fn test_ranges_are_ordered() {
    let nvml = Nvml::init().unwrap();
    {
        let device = nvml.device_by_index(0).unwrap();
        if let Ok(power) = device.power_management_limit_constraints() {
            assert!(power.min <= power.max);
        }
        if let Ok(fans) = device.min_max_fan_speed() {
            assert!(fans.min <= fans.max);
        }
        let cuda = nvml.cuda_driver_version().unwrap();
        assert_eq!(cuda.major(), cuda.raw() / 1000);
    }
    nvml.shutdown().unwrap();
}

#[test]
#[ignore = "Requires NVIDIA GPU"]
fn test_reinit_on_same_library() {
    let nvml = Nvml::init().unwrap();
    let lib = nvml.library();
    let first = nvml.device_by_index(0).unwrap().uuid().unwrap();
    nvml.shutdown().unwrap();

    let nvml = Nvml::init_from(lib, InitMode::Legacy).unwrap();
    assert_eq!(nvml.device_by_index_legacy(0).unwrap().uuid().unwrap(), first);
    nvml.shutdown().unwrap();
}

#[test]
#[ignore = "Requires NVIDIA GPU and root"]
fn test_compute_mode_round_trip() {
    let nvml = Nvml::init().unwrap();
    {
        let mut device = nvml.device_by_index(0).unwrap();
        let original = device.compute_mode().unwrap();

        device.set_compute_mode(ComputeMode::Prohibited).unwrap();
        let changed = device.compute_mode();

        // Put the device back before checking anything.
        device.set_compute_mode(original).unwrap();
        assert_eq!(device.compute_mode().unwrap(), original);
        assert_eq!(changed.unwrap(), ComputeMode::Prohibited);
    }
    nvml.shutdown().unwrap();
}
