//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

/// Largest supported grid side; keeps fingerprints at a few hundred words.
const MAX_GRID_SIZE: u32 = 64;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.dedup.similarity_threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ValidationError(
                "dedup.similarity_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.dedup.output_subdir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "dedup.output_subdir must not be empty".into(),
            ));
        }
        if self.fingerprint.grid_size < 2 || self.fingerprint.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "fingerprint.grid_size must be between 2 and {MAX_GRID_SIZE}"
            )));
        }
        if self.fingerprint.filter_type().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "fingerprint.filter '{}' is not one of nearest, triangle, catmullrom, gaussian, lanczos3",
                self.fingerprint.filter
            )));
        }
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must list at least one extension".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.capture.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "capture.timeout_ms must be > 0".into(),
            ));
        }
        if self.capture.window_size.contains(&0) {
            return Err(ConfigError::ValidationError(
                "capture.window_size must be non-zero".into(),
            ));
        }
        if self.capture.element_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "capture.element_timeout_ms must be > 0".into(),
            ));
        }
        if self.logging.format != "pretty" && self.logging.format != "json" {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_parallel_workers() {
        let mut config = Config::default();
        config.processing.parallel_workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("parallel_workers"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let mut config = Config::default();
        config.dedup.similarity_threshold = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("similarity_threshold"));

        config.dedup.similarity_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_threshold_bounds() {
        let mut config = Config::default();
        config.dedup.similarity_threshold = 0.0;
        assert!(config.validate().is_ok());
        config.dedup.similarity_threshold = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_grid_size() {
        let mut config = Config::default();
        config.fingerprint.grid_size = 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("grid_size"));

        config.fingerprint.grid_size = 65;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_filter() {
        let mut config = Config::default();
        config.fingerprint.filter = "box".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fingerprint.filter"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.decode_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("decode_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_empty_window() {
        let mut config = Config::default();
        config.capture.window_size = [1280, 0];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("window_size"));
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
