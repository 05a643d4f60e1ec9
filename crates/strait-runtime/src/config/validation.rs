//! Configuration validation.

use super::schema::{LogOutput, StraitConfig};
use crate::error::{ConfigError, ConfigResult};

/// Checks a loaded configuration for values that parse but cannot work.
pub fn validate(config: &StraitConfig) -> ConfigResult<()> {
    if let Some(name) = &config.context.name {
        if name.is_empty() {
            return Err(ConfigError::Invalid(
                "context.name must not be empty when set".to_owned(),
            ));
        }
    }
    if config.context.label.is_empty() {
        return Err(ConfigError::Invalid(
            "context.label must not be empty".to_owned(),
        ));
    }
    if config.logging.output == LogOutput::File && config.logging.file_path.is_none() {
        return Err(ConfigError::Invalid(
            "logging.output = \"file\" requires logging.file_path".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ContextConfig, LoggingConfig};

    #[test]
    fn test_default_config_is_valid() {
        validate(&StraitConfig::default()).unwrap();
    }

    #[test]
    fn test_empty_context_name_is_invalid() {
        let config = StraitConfig {
            context: ContextConfig {
                name: Some(String::new()),
                ..ContextConfig::default()
            },
            ..StraitConfig::default()
        };
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Invalid(_)
        ));
    }

    #[test]
    fn test_file_output_requires_a_path() {
        let config = StraitConfig {
            logging: LoggingConfig {
                output: LogOutput::File,
                ..LoggingConfig::default()
            },
            ..StraitConfig::default()
        };
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Invalid(_)
        ));
    }
}
