//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::sources::{CAPTION_PROVIDERS, LABEL_PROVIDERS};

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.enabled.is_empty() {
            return Err(ConfigError::ValidationError(
                "sources.enabled must list at least one label provider".into(),
            ));
        }
        if let Some(unknown) = self
            .sources
            .enabled
            .iter()
            .find(|name| !LABEL_PROVIDERS.contains(&name.as_str()))
        {
            return Err(ConfigError::ValidationError(format!(
                "sources.enabled: unknown label provider '{unknown}'"
            )));
        }
        if !CAPTION_PROVIDERS.contains(&self.sources.caption.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "sources.caption: unknown caption provider '{}'",
                self.sources.caption
            )));
        }
        if !(0.0..=1.0).contains(&self.sources.google.min_score) {
            return Err(ConfigError::ValidationError(
                "sources.google.min_score must be between 0.0 and 1.0".into(),
            ));
        }
        if self.sources.rekognition.max_labels <= 0 {
            return Err(ConfigError::ValidationError(
                "sources.rekognition.max_labels must be > 0".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.sources.rekognition.min_confidence) {
            return Err(ConfigError::ValidationError(
                "sources.rekognition.min_confidence must be between 0 and 100".into(),
            ));
        }
        if self.expansion.seed_limit == 0 {
            return Err(ConfigError::ValidationError(
                "expansion.seed_limit must be > 0".into(),
            ));
        }
        if self.expansion.related_per_tag == 0 {
            return Err(ConfigError::ValidationError(
                "expansion.related_per_tag must be > 0".into(),
            ));
        }
        if self.scoring.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "scoring.top_k must be > 0".into(),
            ));
        }
        if self.limits.fetch_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.fetch_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.source_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.source_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.expansion_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.expansion_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_image_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_size_mb must be > 0".into(),
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
    fn test_validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.sources.enabled.push("clarifai".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("clarifai"));
    }

    #[test]
    fn test_validate_rekognition_ranges() {
        let mut config = Config::default();
        config.sources.rekognition.min_confidence = 150.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_confidence"));

        let mut config = Config::default();
        config.sources.rekognition.max_labels = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_labels"));
    }

    #[test]
    fn test_validate_rejects_empty_sources() {
        let mut config = Config::default();
        config.sources.enabled.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sources.enabled"));
    }

    #[test]
    fn test_validate_rejects_unknown_caption_provider() {
        let mut config = Config::default();
        config.sources.caption = "google".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sources.caption"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.source_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("source_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_invalid_min_score() {
        let mut config = Config::default();
        config.sources.google.min_score = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_score"));

        config.sources.google.min_score = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_seed_limit() {
        let mut config = Config::default();
        config.expansion.seed_limit = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("seed_limit"));
    }
}
