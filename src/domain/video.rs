//! Encoder and frame-buffer-capture session records

use crate::schema::{EncoderType, FbcSessionType};
use serde::Serialize;

/// Aggregate encoder statistics, from one native call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncoderStats {
    pub session_count: u32,
    pub average_fps: u32,
    /// Microseconds
    pub average_latency: u32,
}

/// One active encoder session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncoderSession {
    pub session_id: u32,
    pub pid: u32,
    pub vgpu_instance: u32,
    pub codec: EncoderType,
    pub h_resolution: u32,
    pub v_resolution: u32,
    pub average_fps: u32,
    pub average_latency: u32,
}

/// Aggregate frame buffer capture statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FbcStats {
    pub sessions_count: u32,
    pub average_fps: u32,
    pub average_latency: u32,
}

/// One active frame buffer capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FbcSession {
    pub session_id: u32,
    pub pid: u32,
    pub vgpu_instance: u32,
    pub display_ordinal: u32,
    pub session_type: FbcSessionType,
    pub session_flags: u32,
    pub h_max_resolution: u32,
    pub v_max_resolution: u32,
    pub h_resolution: u32,
    pub v_resolution: u32,
    pub average_fps: u32,
    pub average_latency: u32,
}

impl FbcSession {
    /// `NVML_NVFBC_SESSION_FLAG_DIFFMAP_ENABLED`
    pub const FLAG_DIFFMAP_ENABLED: u32 = 0x1;
    /// `NVML_NVFBC_SESSION_FLAG_CLASSIFICATIONMAP_ENABLED`
    pub const FLAG_CLASSIFICATIONMAP_ENABLED: u32 = 0x2;
    /// `NVML_NVFBC_SESSION_FLAG_CAPTURE_WITH_WAIT_NO_WAIT`
    pub const FLAG_CAPTURE_WITH_WAIT_NO_WAIT: u32 = 0x4;

    pub fn diffmap_enabled(&self) -> bool {
        self.session_flags & Self::FLAG_DIFFMAP_ENABLED != 0
    }
}
