use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Matching weights are within [0, 1]
/// - Retry policy allows at least one attempt
/// - Fan-out timeout is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&config.matching.semantic_weight) {
        return Err(ConfigError::ValidationError(format!(
            "matching.semantic_weight must be in [0, 1], got {}",
            config.matching.semantic_weight
        )));
    }

    if !(0.0..=1.0).contains(&config.matching.semantic_confidence_min) {
        return Err(ConfigError::ValidationError(format!(
            "matching.semantic_confidence_min must be in [0, 1], got {}",
            config.matching.semantic_confidence_min
        )));
    }

    if config.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "retry.max_attempts must be at least 1".to_string(),
        ));
    }

    if config.search.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "search.timeout_ms cannot be 0".to_string(),
        ));
    }

    Ok(())
}
