//! Fan-related domain types

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fan speed percentage (0-100)
///
/// Validated on construction to ensure the value is within valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FanSpeed(u32);

impl FanSpeed {
    /// Maximum valid fan speed
    pub const MAX: u32 = 100;

    /// Create a new FanSpeed with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidFanSpeed` if value > 100
    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value > Self::MAX {
            return Err(DomainError::InvalidFanSpeed(value));
        }
        Ok(Self(value))
    }

    /// Get the speed as a percentage value (0-100)
    #[inline]
    pub const fn as_percentage(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u32> for FanSpeed {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FanSpeed> for u32 {
    fn from(speed: FanSpeed) -> Self {
        speed.0
    }
}

/// Minimum and maximum settable fan speed, from one native call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FanSpeedRange {
    pub min: u32,
    pub max: u32,
}

impl FanSpeedRange {
    /// Check a requested speed against the device's range
    pub fn check(&self, speed: FanSpeed) -> Result<FanSpeed, DomainError> {
        let pct = speed.as_percentage();
        if pct < self.min || pct > self.max {
            return Err(DomainError::InvalidValue(format!(
                "fan speed {}% outside device range {}-{}%",
                pct, self.min, self.max
            )));
        }
        Ok(speed)
    }
}

impl fmt::Display for FanSpeedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}%", self.min, self.max)
    }
}
