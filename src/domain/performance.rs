//! Utilization, clock and mode records

use crate::schema::EnableState;
use serde::Serialize;
use std::fmt;

/// GPU and memory-controller utilization over the last sample period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Utilization {
    /// Percent of time a kernel was executing
    pub gpu: u32,
    /// Percent of time device memory was read or written
    pub memory: u32,
}

impl fmt::Display for Utilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPU: {}%, Memory: {}%", self.gpu, self.memory)
    }
}

/// Encoder or decoder utilization together with the window it covers
///
/// The two values come from a single native call; a utilization figure is
/// meaningless without its sampling period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoUtilization {
    /// Utilization percentage (0-100)
    pub utilization: u32,
    /// Sampling period in microseconds
    pub sampling_period_us: u32,
}

impl VideoUtilization {
    pub fn sampling_period_ms(&self) -> f64 {
        self.sampling_period_us as f64 / 1000.0
    }
}

impl fmt::Display for VideoUtilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% (over {:.0} ms)",
            self.utilization,
            self.sampling_period_ms()
        )
    }
}

/// Allowed range for a VF clock offset, in MHz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockOffsetRange {
    pub min: i32,
    pub max: i32,
}

impl ClockOffsetRange {
    pub fn contains(&self, offset: i32) -> bool {
        (self.min..=self.max).contains(&offset)
    }
}

/// A mode that can be changed now but only takes effect after a reboot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingState<T> {
    pub current: T,
    pub pending: T,
}

impl<T: PartialEq> PendingState<T> {
    /// True when a change is waiting for the next reboot or reset.
    pub fn is_change_pending(&self) -> bool {
        self.current != self.pending
    }
}

/// Auto-boost state and its default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutoBoostState {
    pub enabled: EnableState,
    pub default_enabled: EnableState,
}

/// One faulting clock domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockMonitorFault {
    pub clock_domain: u32,
    pub fault_mask: u32,
}

/// Clock monitor state (`nvmlClkMonStatus_t`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockMonitorStatus {
    /// Native flag: non-zero means a fault was detected somewhere
    pub global_fault: bool,
    pub faults: Vec<ClockMonitorFault>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_utilization_display() {
        let util = VideoUtilization {
            utilization: 42,
            sampling_period_us: 167_000,
        };
        assert_eq!(util.to_string(), "42% (over 167 ms)");
    }

    #[test]
    fn test_offset_range_contains() {
        let range = ClockOffsetRange { min: -200, max: 1000 };
        assert!(range.contains(0));
        assert!(range.contains(-200));
        assert!(range.contains(1000));
        assert!(!range.contains(1001));
    }

    #[test]
    fn test_pending_state() {
        let state = PendingState {
            current: EnableState::Disabled,
            pending: EnableState::Enabled,
        };
        assert!(state.is_change_pending());
        let settled = PendingState {
            current: EnableState::Enabled,
            pending: EnableState::Enabled,
        };
        assert!(!settled.is_change_pending());
    }
}
