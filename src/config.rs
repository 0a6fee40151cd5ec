//! Engine configuration.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields a working configuration.
//!
//! ```yaml
//! target_locale: ar-SA
//! geometry:
//!   background_ratio: 0.4
//!   picture_policy: position_only
//! retry:
//!   attempts: 3
//!   timeout_ms: 60000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Yaml(String),

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// How a background-sized picture is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PictureBackgroundPolicy {
    /// Mirror the position only, never flip the bitmap
    #[default]
    PositionOnly,
    /// Flip the bitmap horizontally as well
    Flip,
}

/// Fonts added to runs after translated text is injected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackFonts {
    /// Complex-script typeface (`a:cs`)
    pub complex_script: String,
    /// Latin typeface (`a:latin`), only added when a run has neither font
    pub latin: String,
    pub pitch_family: String,
    pub charset: String,
}

impl Default for FallbackFonts {
    fn default() -> Self {
        Self {
            complex_script: "Simplified Arabic".to_string(),
            latin: "Arial".to_string(),
            pitch_family: "34".to_string(),
            charset: "-78".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Shapes wider than this fraction of their frame count as background
    pub background_ratio: f64,
    /// Toggle `flipH` on connectors so that lines keep their endpoints
    pub flip_connectors: bool,
    /// Negate shape rotation
    pub mirror_rotation: bool,
    /// Also flip directional presets (arrows, chevrons) that are not background
    pub flip_directional_foreground: bool,
    pub picture_policy: PictureBackgroundPolicy,
    /// Mirror slide layouts, masters and the presentation default text style
    pub include_masters: bool,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            background_ratio: 0.4,
            flip_connectors: true,
            mirror_rotation: true,
            flip_directional_foreground: false,
            picture_policy: PictureBackgroundPolicy::default(),
            include_masters: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleConfig {
    /// A shape is a heading when its largest run exceeds the slide median by this factor
    pub heading_ratio: f64,
    /// Non-placeholder text boxes at most this fraction of the slide width...
    pub annotation_width: f64,
    /// ...and this fraction of its height are annotations
    pub annotation_height: f64,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            heading_ratio: 1.2,
            annotation_width: 0.3,
            annotation_height: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: u32,
    /// First backoff delay, doubled after each failed attempt
    pub backoff_ms: u64,
    /// Per-attempt timeout
    pub timeout_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_ms: 500,
            timeout_ms: 60_000,
        }
    }
}

impl RetryConfig {
    #[inline]
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Options for the transformation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Language tag written into translated runs
    pub target_locale: String,
    pub fonts: FallbackFonts,
    pub geometry: GeometryConfig,
    pub roles: RoleConfig,
    pub retry: RetryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_locale: "ar-SA".to_string(),
            fonts: FallbackFonts::default(),
            geometry: GeometryConfig::default(),
            roles: RoleConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fraction = |field: &'static str, value: f64| {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("{} is not in (0, 1]", value),
                })
            }
        };
        fraction("geometry.background_ratio", self.geometry.background_ratio)?;
        fraction("roles.annotation_width", self.roles.annotation_width)?;
        fraction("roles.annotation_height", self.roles.annotation_height)?;
        if self.roles.heading_ratio < 1.0 {
            return Err(ConfigError::Invalid {
                field: "roles.heading_ratio",
                reason: format!("{} is below 1", self.roles.heading_ratio),
            });
        }
        if self.retry.attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "retry.attempts",
                reason: "at least one attempt is required".to_string(),
            });
        }
        if self.target_locale.is_empty() {
            return Err(ConfigError::Invalid {
                field: "target_locale",
                reason: "empty language tag".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(EngineConfig::from_yaml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let yaml = "target_locale: he-IL\ngeometry:\n  picture_policy: flip\n  background_ratio: 0.5\nretry:\n  attempts: 5\n";
        let config = EngineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.target_locale, "he-IL");
        assert_eq!(config.geometry.picture_policy, PictureBackgroundPolicy::Flip);
        assert_eq!(config.geometry.background_ratio, 0.5);
        assert!(config.geometry.flip_connectors);
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.backoff(), Duration::from_millis(500));
        assert_eq!(config.fonts.complex_script, "Simplified Arabic");
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let err = EngineConfig::from_yaml_str("geometry:\n  background_ratio: 1.5\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "geometry.background_ratio",
                ..
            }
        ));
        assert!(EngineConfig::from_yaml_str("retry:\n  attempts: 0\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mirrordeck.yaml");
        std::fs::write(&path, "roles:\n  heading_ratio: 1.5\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.roles.heading_ratio, 1.5);

        let missing = EngineConfig::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
