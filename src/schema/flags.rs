//! Native bit sets

use bitflags::bitflags;
use serde::{Serialize, Serializer};

bitflags! {
    /// Flags accepted by `nvmlInitWithFlags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InitFlags: u32 {
        /// Don't fail initialization when no GPUs are present.
        const NO_GPUS   = 1;
        /// Don't attach to GPUs during initialization.
        const NO_ATTACH = 2;
    }
}

bitflags! {
    /// Reasons the GPU is running below its application clocks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ThrottleReasons: u64 {
        const GPU_IDLE                    = 0x0000_0001;
        const APPLICATIONS_CLOCKS_SETTING = 0x0000_0002;
        const SW_POWER_CAP                = 0x0000_0004;
        const HW_SLOWDOWN                 = 0x0000_0008;
        const SYNC_BOOST                  = 0x0000_0010;
        const SW_THERMAL_SLOWDOWN         = 0x0000_0020;
        const HW_THERMAL_SLOWDOWN         = 0x0000_0040;
        const HW_POWER_BRAKE_SLOWDOWN     = 0x0000_0080;
        const DISPLAY_CLOCK_SETTING       = 0x0000_0100;

        // Bits from newer drivers stay set instead of being masked off.
        const _ = !0;
    }
}

bitflags! {
    /// Event classes a device can report.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventTypes: u64 {
        const SINGLE_BIT_ECC_ERROR = 0x0001;
        const DOUBLE_BIT_ECC_ERROR = 0x0002;
        const PSTATE               = 0x0004;
        const XID_CRITICAL_ERROR   = 0x0008;
        const CLOCK                = 0x0010;
        const POWER_SOURCE_CHANGE  = 0x0080;
        const MIG_CONFIG_CHANGE    = 0x0100;

        const _ = !0;
    }
}

impl ThrottleReasons {
    /// Names of the set flags, for display.
    pub fn names(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Serialize for ThrottleReasons {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

impl Serialize for EventTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter_names().map(|(name, _)| name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_flags_values() {
        assert_eq!(InitFlags::NO_GPUS.bits(), 1);
        assert_eq!(InitFlags::NO_ATTACH.bits(), 2);
        assert_eq!((InitFlags::NO_GPUS | InitFlags::NO_ATTACH).bits(), 3);
    }

    #[test]
    fn test_throttle_reasons_keep_unnamed_bits() {
        let reasons = ThrottleReasons::from_bits_retain(0x8000_0004);
        assert!(reasons.contains(ThrottleReasons::SW_POWER_CAP));
        assert_eq!(reasons.bits(), 0x8000_0004);
        assert_eq!(reasons.names(), vec!["SW_POWER_CAP"]);
    }
}
