//! Memory records
//!
//! Framebuffer and BAR1 usage and ECC error counters.

use serde::Serialize;
use std::fmt;

const MIB: f64 = 1024.0 * 1024.0;

/// Framebuffer memory usage in bytes (`nvmlMemory_t`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub free: u64,
    pub used: u64,
}

impl MemoryInfo {
    /// Used memory as a percentage of total
    pub fn usage_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.used as f64 / self.total as f64 * 100.0
    }

    pub fn total_mib(&self) -> f64 {
        self.total as f64 / MIB
    }

    pub fn used_mib(&self) -> f64 {
        self.used as f64 / MIB
    }
}

impl fmt::Display for MemoryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0} / {:.0} MiB ({:.1}%)",
            self.used_mib(),
            self.total_mib(),
            self.usage_percent()
        )
    }
}

/// BAR1 aperture usage in bytes (`nvmlBAR1Memory_t`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bar1Memory {
    pub total: u64,
    pub free: u64,
    pub used: u64,
}

/// Per-location ECC error counts (`nvmlEccErrorCounts_t`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EccErrorCounts {
    pub l1_cache: u64,
    pub l2_cache: u64,
    pub device_memory: u64,
    pub register_file: u64,
}

impl EccErrorCounts {
    pub fn total(&self) -> u64 {
        self.l1_cache + self.l2_cache + self.device_memory + self.register_file
    }
}

/// Corrected and uncorrected totals for one counter type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EccTotals {
    pub corrected: u64,
    pub uncorrected: u64,
}

impl EccTotals {
    /// Uncorrected errors point at failing memory.
    pub fn has_uncorrected(&self) -> bool {
        self.uncorrected > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_usage_percent() {
        let mem = MemoryInfo {
            total: 8 * 1024 * 1024 * 1024,
            free: 6 * 1024 * 1024 * 1024,
            used: 2 * 1024 * 1024 * 1024,
        };
        assert!((mem.usage_percent() - 25.0).abs() < 0.01);
        assert!((mem.total_mib() - 8192.0).abs() < 0.01);
        assert_eq!(mem.to_string(), "2048 / 8192 MiB (25.0%)");
    }

    #[test]
    fn test_memory_usage_zero_total() {
        let mem = MemoryInfo {
            total: 0,
            free: 0,
            used: 0,
        };
        assert_eq!(mem.usage_percent(), 0.0);
    }

    #[test]
    fn test_ecc_counts_total() {
        let counts = EccErrorCounts {
            l1_cache: 1,
            l2_cache: 2,
            device_memory: 3,
            register_file: 4,
        };
        assert_eq!(counts.total(), 10);
    }

    #[test]
    fn test_ecc_totals() {
        assert!(!EccTotals::default().has_uncorrected());
        let totals = EccTotals {
            corrected: 12,
            uncorrected: 1,
        };
        assert!(totals.has_uncorrected());
    }
}
