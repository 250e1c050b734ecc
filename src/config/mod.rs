//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::error::ConfigError;
use crate::nvml::InitMode;
use crate::schema::InitFlags;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Where to load NVML from
    pub library: LibraryConfig,
    /// How to start the session
    pub session: SessionConfig,
}

/// General configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
}

/// Library location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Explicit path to the NVML image. Platform defaults are searched when unset.
    pub path: Option<PathBuf>,
}

/// Which initializer to call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitKind {
    Legacy,
    #[default]
    Standard,
    Flags,
}

/// Session configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub init: InitKind,
    /// `NVML_INIT_FLAG_NO_GPUS`, only with `init = "flags"`
    pub no_gpus: bool,
    /// `NVML_INIT_FLAG_NO_ATTACH`, only with `init = "flags"`
    pub no_attach: bool,
}

impl SessionConfig {
    /// Resolve to the facade's init mode.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` when flags are set without
    /// `init = "flags"`, since they would be silently ignored.
    pub fn init_mode(&self) -> Result<InitMode, ConfigError> {
        let mut flags = InitFlags::empty();
        flags.set(InitFlags::NO_GPUS, self.no_gpus);
        flags.set(InitFlags::NO_ATTACH, self.no_attach);

        match self.init {
            InitKind::Flags => Ok(InitMode::WithFlags(flags)),
            _ if !flags.is_empty() => Err(ConfigError::InvalidValue {
                key: "session.init".to_string(),
                message: "no_gpus/no_attach require init = \"flags\"".to_string(),
            }),
            InitKind::Legacy => Ok(InitMode::Legacy),
            InitKind::Standard => Ok(InitMode::Standard),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.general.verbose);
        assert!(config.library.path.is_none());
        assert_eq!(config.session.init_mode().unwrap(), InitMode::Standard);
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [general]
            verbose = true

            [library]
            path = "/opt/nvidia/libnvidia-ml.so.1"

            [session]
            init = "flags"
            no_attach = true
            "#,
        )
        .unwrap();

        assert!(config.general.verbose);
        assert_eq!(
            config.library.path,
            Some(PathBuf::from("/opt/nvidia/libnvidia-ml.so.1"))
        );
        assert_eq!(
            config.session.init_mode().unwrap(),
            InitMode::WithFlags(InitFlags::NO_ATTACH)
        );
    }

    #[test]
    fn test_flags_without_flags_init_rejected() {
        let session = SessionConfig {
            init: InitKind::Legacy,
            no_gpus: true,
            no_attach: false,
        };
        assert!(matches!(
            session.init_mode(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unknown_init_kind_rejected() {
        let result: Result<Config, _> = toml::from_str("[session]\ninit = \"eager\"\n");
        assert!(result.is_err());
    }
}
