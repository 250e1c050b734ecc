//! Unified error types for nvbind
//!
//! [`NvmlError`] is the binding's error model: every non-success native status
//! maps to exactly one variant, and [`NvmlError::status`] gives the original
//! code back. The remaining enums cover configuration, value validation and
//! the CLI.

use crate::schema::status;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from NVML operations
    #[error("NVML error: {0}")]
    Nvml(#[from] NvmlError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from domain type validation
    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    /// No GPUs detected in the system
    #[error("No NVIDIA GPUs detected")]
    NoGpusFound,

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the NVML binding
///
/// The first block mirrors the native status table one to one. The second
/// block is raised by the binding itself while loading the library or
/// marshaling values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NvmlError {
    #[error("NVML was not initialized")]
    Uninitialized,

    #[error("a supplied argument is invalid")]
    InvalidArg,

    #[error("the requested operation is not available on this device")]
    NotSupported,

    #[error("the current user does not have permission for this operation")]
    NoPermission,

    #[error("NVML was already initialized")]
    AlreadyInitialized,

    #[error("a query to find an object was unsuccessful")]
    NotFound,

    #[error("an input argument is not large enough")]
    InsufficientSize,

    #[error("a device's external power cables are not properly attached")]
    InsufficientPower,

    #[error("the NVIDIA driver is not loaded")]
    DriverNotLoaded,

    #[error("the operation timed out")]
    Timeout,

    #[error("the NVIDIA kernel detected an interrupt issue with a GPU")]
    IrqIssue,

    #[error("NVML shared library could not be found or loaded")]
    LibraryNotFound,

    #[error("a function is not implemented in the loaded NVML library")]
    FunctionNotFound,

    #[error("the infoROM is corrupted")]
    CorruptedInforom,

    #[error("the GPU has fallen off the bus or has otherwise become inaccessible")]
    GpuLost,

    #[error("the GPU requires a reset before it can be used again")]
    ResetRequired,

    #[error("the GPU control device has been blocked by the operating system")]
    OperatingSystem,

    #[error("the RM detected a driver/library version mismatch")]
    LibRmVersionMismatch,

    #[error("the operation cannot be performed because the GPU is in use")]
    InUse,

    #[error("insufficient memory")]
    Memory,

    #[error("no data")]
    NoData,

    #[error("the requested vGPU operation is not available because ECC is enabled")]
    VgpuEccNotSupported,

    #[error("ran out of critical resources other than memory")]
    InsufficientResources,

    #[error("the requested frequency is not supported")]
    FreqNotSupported,

    #[error("the provided argument version is invalid")]
    ArgumentVersionMismatch,

    #[error("the requested functionality has been deprecated")]
    Deprecated,

    #[error("the system is not ready for the request")]
    NotReady,

    #[error("no GPUs were found")]
    GpuNotFound,

    #[error("resource not in correct state to perform requested operation")]
    InvalidState,

    #[error("an internal driver error occurred")]
    Unknown,

    /// A status the binding has no name for. The code is kept as returned.
    #[error("unrecognized NVML status code {0}")]
    Vendor(u32),

    /// The native library image could not be loaded from any candidate path
    #[error("failed to load NVML library ({tried}): {reason}")]
    LibraryLoad { tried: String, reason: String },

    /// The loaded library does not export the requested entry point
    #[error("symbol {0} is not exported by the loaded NVML library")]
    SymbolNotFound(&'static str),

    /// A list shrank or grew between the count call and the fetch call
    #[error("list length changed between calls (expected {expected}, got {actual})")]
    InconsistentCount { expected: u32, actual: u32 },

    /// A fixed-size text buffer came back without a terminator
    #[error("text buffer of {capacity} bytes returned without a terminator")]
    Unterminated { capacity: usize },

    /// A caller-supplied string cannot be passed to C
    #[error("argument contains an interior NUL byte at position {0}")]
    InteriorNul(usize),
}

impl NvmlError {
    /// Map a native status to an error. Returns `None` for success.
    pub fn from_status(code: u32) -> Option<Self> {
        let err = match code {
            status::SUCCESS => return None,
            status::UNINITIALIZED => Self::Uninitialized,
            status::INVALID_ARGUMENT => Self::InvalidArg,
            status::NOT_SUPPORTED => Self::NotSupported,
            status::NO_PERMISSION => Self::NoPermission,
            status::ALREADY_INITIALIZED => Self::AlreadyInitialized,
            status::NOT_FOUND => Self::NotFound,
            status::INSUFFICIENT_SIZE => Self::InsufficientSize,
            status::INSUFFICIENT_POWER => Self::InsufficientPower,
            status::DRIVER_NOT_LOADED => Self::DriverNotLoaded,
            status::TIMEOUT => Self::Timeout,
            status::IRQ_ISSUE => Self::IrqIssue,
            status::LIBRARY_NOT_FOUND => Self::LibraryNotFound,
            status::FUNCTION_NOT_FOUND => Self::FunctionNotFound,
            status::CORRUPTED_INFOROM => Self::CorruptedInforom,
            status::GPU_IS_LOST => Self::GpuLost,
            status::RESET_REQUIRED => Self::ResetRequired,
            status::OPERATING_SYSTEM => Self::OperatingSystem,
            status::LIB_RM_VERSION_MISMATCH => Self::LibRmVersionMismatch,
            status::IN_USE => Self::InUse,
            status::MEMORY => Self::Memory,
            status::NO_DATA => Self::NoData,
            status::VGPU_ECC_NOT_SUPPORTED => Self::VgpuEccNotSupported,
            status::INSUFFICIENT_RESOURCES => Self::InsufficientResources,
            status::FREQ_NOT_SUPPORTED => Self::FreqNotSupported,
            status::ARGUMENT_VERSION_MISMATCH => Self::ArgumentVersionMismatch,
            status::DEPRECATED => Self::Deprecated,
            status::NOT_READY => Self::NotReady,
            status::GPU_NOT_FOUND => Self::GpuNotFound,
            status::INVALID_STATE => Self::InvalidState,
            status::UNKNOWN => Self::Unknown,
            other => Self::Vendor(other),
        };
        Some(err)
    }

    /// The native status this error was created from, if any.
    pub fn status(&self) -> Option<u32> {
        let code = match self {
            Self::Uninitialized => status::UNINITIALIZED,
            Self::InvalidArg => status::INVALID_ARGUMENT,
            Self::NotSupported => status::NOT_SUPPORTED,
            Self::NoPermission => status::NO_PERMISSION,
            Self::AlreadyInitialized => status::ALREADY_INITIALIZED,
            Self::NotFound => status::NOT_FOUND,
            Self::InsufficientSize => status::INSUFFICIENT_SIZE,
            Self::InsufficientPower => status::INSUFFICIENT_POWER,
            Self::DriverNotLoaded => status::DRIVER_NOT_LOADED,
            Self::Timeout => status::TIMEOUT,
            Self::IrqIssue => status::IRQ_ISSUE,
            Self::LibraryNotFound => status::LIBRARY_NOT_FOUND,
            Self::FunctionNotFound => status::FUNCTION_NOT_FOUND,
            Self::CorruptedInforom => status::CORRUPTED_INFOROM,
            Self::GpuLost => status::GPU_IS_LOST,
            Self::ResetRequired => status::RESET_REQUIRED,
            Self::OperatingSystem => status::OPERATING_SYSTEM,
            Self::LibRmVersionMismatch => status::LIB_RM_VERSION_MISMATCH,
            Self::InUse => status::IN_USE,
            Self::Memory => status::MEMORY,
            Self::NoData => status::NO_DATA,
            Self::VgpuEccNotSupported => status::VGPU_ECC_NOT_SUPPORTED,
            Self::InsufficientResources => status::INSUFFICIENT_RESOURCES,
            Self::FreqNotSupported => status::FREQ_NOT_SUPPORTED,
            Self::ArgumentVersionMismatch => status::ARGUMENT_VERSION_MISMATCH,
            Self::Deprecated => status::DEPRECATED,
            Self::NotReady => status::NOT_READY,
            Self::GpuNotFound => status::GPU_NOT_FOUND,
            Self::InvalidState => status::INVALID_STATE,
            Self::Unknown => status::UNKNOWN,
            Self::Vendor(code) => *code,
            Self::LibraryLoad { .. }
            | Self::SymbolNotFound(_)
            | Self::InconsistentCount { .. }
            | Self::Unterminated { .. }
            | Self::InteriorNul(_) => return None,
        };
        Some(code)
    }

    /// True for errors that mean "this device or driver can't do that".
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::NotSupported | Self::FunctionNotFound | Self::SymbolNotFound(_)
        )
    }
}

/// Errors from domain type validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid fan speed value (must be 0-100)
    #[error("Invalid fan speed: {0}% (must be 0-100)")]
    InvalidFanSpeed(u32),

    /// Invalid power limit value
    #[error("Invalid power limit: {value}W (valid range: {min}-{max}W)")]
    InvalidPowerLimit { value: u32, min: u32, max: u32 },

    /// Locked clock range with min above max
    #[error("Invalid clock range: {min}-{max} MHz")]
    InvalidClockRange { min: u32, max: u32 },

    /// Invalid value provided
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_is_not_an_error() {
        assert_eq!(NvmlError::from_status(status::SUCCESS), None);
    }

    #[test]
    fn test_every_named_status_round_trips() {
        for code in (1..=29).chain(std::iter::once(999)) {
            let err = NvmlError::from_status(code).unwrap();
            assert!(!matches!(err, NvmlError::Vendor(_)), "code {code}");
            assert_eq!(err.status(), Some(code));
        }
    }

    #[test]
    fn test_unrecognized_status_is_preserved() {
        let err = NvmlError::from_status(4242).unwrap();
        assert_eq!(err, NvmlError::Vendor(4242));
        assert_eq!(err.status(), Some(4242));
    }

    #[test]
    fn test_binding_errors_have_no_status() {
        assert_eq!(NvmlError::SymbolNotFound("nvmlInit_v2").status(), None);
        let err = NvmlError::InconsistentCount {
            expected: 3,
            actual: 4,
        };
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("expected 3"));
    }

    #[test]
    fn test_distinct_statuses_give_distinct_errors() {
        assert_eq!(NvmlError::from_status(3), Some(NvmlError::NotSupported));
        assert_eq!(NvmlError::from_status(4), Some(NvmlError::NoPermission));
        assert_eq!(NvmlError::from_status(15), Some(NvmlError::GpuLost));
    }

    #[test]
    fn test_domain_error_display() {
        let err = DomainError::InvalidFanSpeed(150);
        assert_eq!(err.to_string(), "Invalid fan speed: 150% (must be 0-100)");
    }

    #[test]
    fn test_power_limit_error_display() {
        let err = DomainError::InvalidPowerLimit {
            value: 500,
            min: 100,
            max: 400,
        };
        assert!(err.to_string().contains("500W"));
        assert!(err.to_string().contains("100-400W"));
    }

    #[test]
    fn test_error_conversion() {
        let app_err: AppError = NvmlError::NoPermission.into();
        assert!(matches!(app_err, AppError::Nvml(NvmlError::NoPermission)));
    }
}
