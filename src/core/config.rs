use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::locale::Locale;

pub const DEFAULT_TEXT_SIMILARITY_THRESHOLD: f64 = 0.85;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Text similarity threshold must be between 0 and 1, got {value}")]
    InvalidThreshold { value: f64 },

    #[error("Unsupported locale: {locale}")]
    UnsupportedLocale { locale: String },
}

/// Engine configuration. Read-only once the service is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupConfig {
    /// Similarity at or above which a candidate is a probable duplicate.
    pub text_similarity_threshold: f64,
    pub locale: Locale,
    pub enable_debug_logs: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            text_similarity_threshold: DEFAULT_TEXT_SIMILARITY_THRESHOLD,
            locale: Locale::default(),
            enable_debug_logs: false,
        }
    }
}

/// Partial configuration, as found in a config file or on the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupConfigOverrides {
    #[serde(default)]
    pub text_similarity_threshold: Option<f64>,
    #[serde(default)]
    pub locale: Option<Locale>,
    #[serde(default)]
    pub enable_debug_logs: Option<bool>,
}

impl DedupConfigOverrides {
    /// Fields set in `other` take precedence over fields set in `self`.
    pub fn or(self, other: DedupConfigOverrides) -> Self {
        Self {
            text_similarity_threshold: other
                .text_similarity_threshold
                .or(self.text_similarity_threshold),
            locale: other.locale.or(self.locale),
            enable_debug_logs: other.enable_debug_logs.or(self.enable_debug_logs),
        }
    }
}

impl DedupConfig {
    /// Fill unset fields from the defaults.
    pub fn merged(overrides: DedupConfigOverrides) -> Self {
        let defaults = Self::default();
        Self {
            text_similarity_threshold: overrides
                .text_similarity_threshold
                .unwrap_or(defaults.text_similarity_threshold),
            locale: overrides.locale.unwrap_or(defaults.locale),
            enable_debug_logs: overrides
                .enable_debug_logs
                .unwrap_or(defaults.enable_debug_logs),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let value = self.text_similarity_threshold;
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidThreshold { value });
        }
        Ok(())
    }

    /// `<config dir>/docdedup/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docdedup").join("config.json"))
    }

    pub fn read_overrides(path: &Path) -> Result<DedupConfigOverrides, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::merged(Self::read_overrides(path)?);
        config.validate()?;
        Ok(config)
    }

    /// Overrides from `path` if given, else from the default config file if
    /// it exists, else none.
    pub fn find_overrides(path: Option<&Path>) -> Result<DedupConfigOverrides, ConfigError> {
        if let Some(path) = path {
            return Self::read_overrides(path);
        }

        match Self::default_path() {
            Some(default_path) if default_path.is_file() => Self::read_overrides(&default_path),
            _ => Ok(DedupConfigOverrides::default()),
        }
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Self::merged(Self::find_overrides(path)?);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = DedupConfig::default();
        assert_eq!(config.text_similarity_threshold, 0.85);
        assert_eq!(config.locale, Locale::Fr);
        assert!(!config.enable_debug_logs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merged_falls_back_field_by_field() {
        let config = DedupConfig::merged(DedupConfigOverrides {
            locale: Some(Locale::En),
            ..Default::default()
        });
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.text_similarity_threshold, 0.85);
        assert!(!config.enable_debug_logs);
    }

    #[test]
    fn test_overrides_precedence() {
        let file = DedupConfigOverrides {
            text_similarity_threshold: Some(0.9),
            locale: Some(Locale::En),
            enable_debug_logs: None,
        };
        let cli = DedupConfigOverrides {
            text_similarity_threshold: Some(0.7),
            ..Default::default()
        };
        let merged = file.or(cli);
        assert_eq!(merged.text_similarity_threshold, Some(0.7));
        assert_eq!(merged.locale, Some(Locale::En));
        assert_eq!(merged.enable_debug_logs, None);
    }

    #[test]
    fn test_invalid_threshold() {
        for value in [-0.1, 1.5, f64::NAN] {
            let config = DedupConfig {
                text_similarity_threshold: value,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidThreshold { .. })
            ));
        }
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{ "textSimilarityThreshold": 0.9, "locale": "en" }"#).unwrap();

        let config = DedupConfig::load(&path).unwrap();
        assert_eq!(config.text_similarity_threshold, 0.9);
        assert_eq!(config.locale, Locale::En);
        assert!(!config.enable_debug_logs);
    }

    #[test]
    fn test_load_rejects_bad_files() {
        let temp_dir = TempDir::new().unwrap();

        let missing = temp_dir.path().join("missing.json");
        assert!(matches!(
            DedupConfig::load(&missing),
            Err(ConfigError::Io { .. })
        ));

        let malformed = temp_dir.path().join("malformed.json");
        fs::write(&malformed, "{ not json").unwrap();
        assert!(matches!(
            DedupConfig::load(&malformed),
            Err(ConfigError::Parse { .. })
        ));

        let unknown_locale = temp_dir.path().join("locale.json");
        fs::write(&unknown_locale, r#"{ "locale": "de" }"#).unwrap();
        assert!(matches!(
            DedupConfig::load(&unknown_locale),
            Err(ConfigError::Parse { .. })
        ));

        let out_of_range = temp_dir.path().join("threshold.json");
        fs::write(&out_of_range, r#"{ "textSimilarityThreshold": 2.0 }"#).unwrap();
        assert!(matches!(
            DedupConfig::load(&out_of_range),
            Err(ConfigError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn test_load_or_default_with_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{ "enableDebugLogs": true }"#).unwrap();

        let config = DedupConfig::load_or_default(Some(&path)).unwrap();
        assert!(config.enable_debug_logs);
    }
}
