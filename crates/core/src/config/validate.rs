use super::{types::Config, ConfigError};

/// Longest accepted sweeper interval (one year).
pub const MAX_SWEEP_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Validate configuration
/// Currently validates:
/// - Space path is not empty
/// - Sweeper interval is between 1 second and one year
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.space.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "space.path cannot be empty".to_string(),
        ));
    }

    if config.sweeper.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "sweeper.interval_secs cannot be 0".to_string(),
        ));
    }

    if config.sweeper.interval_secs > MAX_SWEEP_INTERVAL_SECS {
        return Err(ConfigError::ValidationError(format!(
            "sweeper.interval_secs cannot exceed {}",
            MAX_SWEEP_INTERVAL_SECS
        )));
    }

    Ok(())
}
