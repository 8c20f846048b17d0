use tokio::sync::Semaphore;

use super::{types::Config, ConfigError};

/// Upper bound for `fetcher.deadline_ms` and `fetcher.settle_window_ms` (one day).
const MAX_TIMING_MS: u64 = 24 * 60 * 60 * 1000;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Admission capacity, fetch deadline and batch size are non-zero
/// - Admission capacity fits a semaphore, fetch timings are at most a day
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.admission.max_concurrent_batches == 0 {
        return Err(ConfigError::ValidationError(
            "admission.max_concurrent_batches must be at least 1".to_string(),
        ));
    }

    if config.admission.max_concurrent_batches > Semaphore::MAX_PERMITS {
        return Err(ConfigError::ValidationError(format!(
            "admission.max_concurrent_batches cannot exceed {}",
            Semaphore::MAX_PERMITS
        )));
    }

    if config.fetcher.deadline_ms == 0 {
        return Err(ConfigError::ValidationError(
            "fetcher.deadline_ms cannot be 0".to_string(),
        ));
    }

    if config.fetcher.deadline_ms > MAX_TIMING_MS {
        return Err(ConfigError::ValidationError(format!(
            "fetcher.deadline_ms cannot exceed {}",
            MAX_TIMING_MS
        )));
    }

    if config.fetcher.settle_window_ms > MAX_TIMING_MS {
        return Err(ConfigError::ValidationError(format!(
            "fetcher.settle_window_ms cannot exceed {}",
            MAX_TIMING_MS
        )));
    }

    if config.batch.max_urls == 0 {
        return Err(ConfigError::ValidationError(
            "batch.max_urls must be at least 1".to_string(),
        ));
    }

    Ok(())
}
