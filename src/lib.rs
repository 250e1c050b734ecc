//! nvbind - typed bindings over NVIDIA's NVML
//!
//! The crate has two layers. [`ffi`] loads the NVML image and exposes every
//! entry point with its native signature, including the legacy revisions.
//! [`nvml`] is the safe facade on top: explicit sessions, device handles
//! that cannot outlive them, and status codes turned into typed errors.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Owned records returned by the facade
//! - [`error`]: Error types
//! - [`ffi`]: Library loading and the native entry point table
//! - [`nvml`]: Safe facade
//! - [`schema`]: Native constants, enumerations and bit sets

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod ffi;
pub mod nvml;
pub mod schema;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, NvmlError, Result};
pub use nvml::{Device, InitMode, Nvml};
