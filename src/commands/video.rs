//! Video command implementation

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, VideoStatus};
use crate::commands::{optional, report, select_devices};
use crate::error::Result;
use crate::nvml::{Device, Nvml};

/// Execute the video command
pub fn run_video(nvml: &Nvml, format: OutputFormat, gpu_index: Option<u32>) -> Result<()> {
    for device in select_devices(nvml, gpu_index)? {
        print_output(&report(&device, video_status(&device)?)?, format)?;
    }
    Ok(())
}

/// Encoder and decoder load plus session counts.
pub fn video_status(device: &Device<'_>) -> Result<VideoStatus> {
    let encoder = optional(device.encoder_stats())?;

    Ok(VideoStatus {
        encoder_utilization: optional(device.encoder_utilization())?.map(|u| u.utilization),
        decoder_utilization: optional(device.decoder_utilization())?.map(|u| u.utilization),
        encoder_sessions: encoder.map(|e| e.session_count),
        encoder_average_fps: encoder.map(|e| e.average_fps),
        fbc_sessions: optional(device.fbc_stats())?.map(|f| f.sessions_count),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::NativeLibrary;
    use crate::mock::{self, MockGpu};
    use std::sync::Arc;

    #[test]
    fn test_video_status_counts_sessions() {
        let gpu = MockGpu::new("GPU A")
            .with_encoder_session(100, 0, 60, 900)
            .with_encoder_session(200, 1, 30, 1500)
            .with_fbc_session(300, 4, 60, 100);
        let lib = mock::install(vec![gpu]);
        mock::with_state(|s| {
            s.gpus[0].encoder_utilization = 25;
            s.gpus[0].decoder_utilization = 5;
        });
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let status = video_status(&device).unwrap();

        assert_eq!(status.encoder_utilization, Some(25));
        assert_eq!(status.decoder_utilization, Some(5));
        assert_eq!(status.encoder_sessions, Some(2));
        assert_eq!(status.encoder_average_fps, Some(45));
        assert_eq!(status.fbc_sessions, Some(1));
    }

    #[test]
    fn test_video_status_idle() {
        let lib = mock::install(vec![MockGpu::new("GPU A")]);
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let status = video_status(&device).unwrap();

        assert_eq!(status.encoder_sessions, Some(0));
        assert_eq!(status.encoder_average_fps, Some(0));
        assert_eq!(status.fbc_sessions, Some(0));
    }

    #[test]
    fn test_video_status_with_missing_entry_points() {
        let mut symbols = mock::symbols();
        symbols.nvmlDeviceGetEncoderStats = None;
        symbols.nvmlDeviceGetFBCStats = None;
        mock::install(vec![MockGpu::new("GPU A")]);
        let lib = Arc::new(NativeLibrary::from_symbols(symbols, "mock"));
        let nvml = Nvml::init_from(lib, Default::default()).unwrap();
        let device = nvml.device_by_index(0).unwrap();

        let status = video_status(&device).unwrap();

        assert_eq!(status.encoder_utilization, Some(0));
        assert_eq!(status.encoder_sessions, None);
        assert_eq!(status.encoder_average_fps, None);
        assert_eq!(status.fbc_sessions, None);
    }
}
