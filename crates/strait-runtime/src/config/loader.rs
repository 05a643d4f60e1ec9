//! Configuration loader using figment.
//!
//! Configuration is layered, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. A configuration file (`strait.toml` / `config.toml`, searched in the
//!    current directory and the user config directory, or set explicitly)
//! 3. Environment variables (`STRAIT_*`, with `__` as section separator)
//!
//! # Environment Variable Mapping
//!
//! - `STRAIT_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `STRAIT_CONTEXT__NAME=background` → `context.name = "background"`
//!
//! The `toml-config` feature enables TOML configuration files; without it,
//! only defaults and environment variables are consulted.

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(feature = "toml-config")]
use figment::providers::{Format, Toml};
use figment::providers::{Env, Serialized};
use tracing::{debug, info, warn};

use super::schema::StraitConfig;
use crate::error::{ConfigError, ConfigResult};

/// Base names a configuration file search looks for.
#[cfg(feature = "toml-config")]
const BASE_NAMES: &[&str] = &["strait.toml", "config.toml"];

/// Configuration loader with figment-based multi-source support.
///
/// # Example
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .file("strait.toml")
///     .load()?;
/// ```
pub struct ConfigLoader {
    /// Base figment instance for programmatic overrides.
    figment: Figment,
    /// Search paths for configuration files.
    search_paths: Vec<PathBuf>,
    /// Whether to load environment variables.
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: StraitConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads, validates, and returns the configuration.
    pub fn load(self) -> ConfigResult<StraitConfig> {
        let figment = self.build_figment()?;

        let config: StraitConfig = figment
            .extract()
            .map_err(|e| ConfigError::ParseError(format!("failed to extract configuration: {e}")))?;
        super::validation::validate(&config)?;

        debug!(
            context = config.context.name.as_deref().unwrap_or(&config.context.label),
            logging_level = %config.logging.level,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(StraitConfig::default()));

        // Merge the user's pre-configured overrides.
        let user_figment = std::mem::take(&mut self.figment);
        figment = figment.merge(user_figment);

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            info!(path = %path.display(), "loading configuration file");
            figment = Self::merge_config_file(figment, path)?;
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            figment = figment.merge(
                Env::prefixed("STRAIT_")
                    .split("__")
                    .map(|key| key.as_str().replace("__", ".").into()),
            );
        }

        Ok(figment)
    }

    /// Merges a single config file into the figment.
    ///
    /// Only extensions enabled via feature flags are accepted.
    #[cfg_attr(not(feature = "toml-config"), allow(unused_variables))]
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            _ => Err(ConfigError::ParseError(format!(
                "unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    /// Resolves the effective list of search paths.
    #[cfg(feature = "toml-config")]
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("strait"));
        }
        paths
    }

    /// Searches for and loads the first configuration file found.
    #[cfg_attr(not(feature = "toml-config"), allow(unused_mut))]
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        #[cfg(feature = "toml-config")]
        for search_path in self.resolve_search_paths() {
            for base_name in BASE_NAMES {
                let path = search_path.join(base_name);
                if path.exists() {
                    info!(path = %path.display(), "loading configuration file");
                    return figment.merge(Toml::file(path));
                }
            }
        }
        warn!("no configuration file found, using defaults");
        figment
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ContextConfig, LogLevel};

    #[test]
    fn test_default_config() {
        let config = ConfigLoader::new().without_env().load().unwrap();

        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.context.name, None);
        assert_eq!(config.context.label, "page");
    }

    #[test]
    fn test_programmatic_overrides_beat_defaults() {
        let config = ConfigLoader::new()
            .without_env()
            .merge(StraitConfig {
                context: ContextConfig {
                    name: Some("background".to_owned()),
                    ..ContextConfig::default()
                },
                ..StraitConfig::default()
            })
            .load()
            .unwrap();

        assert_eq!(config.context.name.as_deref(), Some("background"));
    }

    #[test]
    fn test_env_variables_override_defaults() {
        // SAFETY: this test is single-threaded and cleans up immediately.
        unsafe {
            std::env::set_var("STRAIT_LOGGING__LEVEL", "debug");
        }
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        unsafe {
            std::env::remove_var("STRAIT_LOGGING__LEVEL");
        }
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = ConfigLoader::new()
            .file("/nonexistent/strait.toml")
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
