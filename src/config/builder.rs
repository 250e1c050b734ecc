//! Configuration builder
//!
//! Merges configuration from files, environment and CLI arguments. Later
//! sources win.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;

use std::path::PathBuf;

/// Environment variable overriding the library path
pub const LIBRARY_ENV: &str = "NVBIND_LIBRARY";

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from an explicit file, or the default locations
    /// when `path` is `None`.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default()?,
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Apply `NVBIND_LIBRARY` if set
    pub fn with_env(self) -> Self {
        let path = std::env::var_os(LIBRARY_ENV).map(PathBuf::from);
        self.with_library_path(path)
    }

    /// Override with CLI verbose flag
    pub fn with_verbose(mut self, verbose: Option<bool>) -> Self {
        if let Some(v) = verbose {
            self.config.general.verbose = v;
        }
        self
    }

    /// Override with CLI library path
    pub fn with_library_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(p) = path {
            self.config.library.path = Some(p);
        }
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InitKind;
    use std::io::Write;

    #[test]
    fn test_builder_defaults() {
        let config = ConfigBuilder::new().build();
        assert!(!config.general.verbose);
        assert!(config.library.path.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConfigBuilder::new()
            .with_verbose(Some(true))
            .with_library_path(Some(PathBuf::from("/tmp/libnvidia-ml.so.1")))
            .build();

        assert!(config.general.verbose);
        assert_eq!(
            config.library.path,
            Some(PathBuf::from("/tmp/libnvidia-ml.so.1"))
        );
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[library]\npath = \"/from/file.so\"\n\n[session]\ninit = \"legacy\""
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = ConfigBuilder::new()
            .with_file(Some(&path))
            .unwrap()
            .with_library_path(Some(PathBuf::from("/from/cli.so")))
            .build();

        assert_eq!(config.library.path, Some(PathBuf::from("/from/cli.so")));
        assert_eq!(config.session.init, InitKind::Legacy);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = ConfigBuilder::new().with_file(Some("/nonexistent/nvbind.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
