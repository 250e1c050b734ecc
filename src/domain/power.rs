//! Power domain types
//!
//! NVML reports power in milliwatts; [`PowerLimit`] keeps that unit and
//! displays watts.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Power value in milliwatts (stored internally) but displayed as watts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PowerLimit(u32);

impl PowerLimit {
    /// Create a new power limit from watts
    pub const fn from_watts(watts: u32) -> Self {
        Self(watts * 1000)
    }

    /// Create a new power limit from milliwatts
    pub const fn from_milliwatts(mw: u32) -> Self {
        Self(mw)
    }

    /// Get the power limit in watts
    #[inline]
    pub const fn as_watts(&self) -> u32 {
        self.0 / 1000
    }

    /// Get the power limit in milliwatts
    #[inline]
    pub const fn as_milliwatts(&self) -> u32 {
        self.0
    }

    /// Validate this power limit against constraints
    pub fn validate(&self, constraints: &PowerLimitConstraints) -> Result<(), DomainError> {
        if !constraints.contains(self) {
            return Err(DomainError::InvalidPowerLimit {
                value: self.as_watts(),
                min: constraints.min.as_watts(),
                max: constraints.max.as_watts(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for PowerLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}W", self.as_watts())
    }
}

/// Minimum and maximum settable power limit, from one native call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerLimitConstraints {
    pub min: PowerLimit,
    pub max: PowerLimit,
}

impl PowerLimitConstraints {
    pub fn new(min: PowerLimit, max: PowerLimit) -> Self {
        Self { min, max }
    }

    /// Check if a power limit is within constraints
    pub fn contains(&self, limit: &PowerLimit) -> bool {
        limit.0 >= self.min.0 && limit.0 <= self.max.0
    }
}

impl fmt::Display for PowerLimitConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}
