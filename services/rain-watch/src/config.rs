//! Service configuration.
//!
//! Loaded from a YAML file (config/rain-watch.yaml by default). Every field
//! has a default, so a partial file or no file at all yields a working setup
//! for the CHMI composite.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use radar_common::time::validate_granularity;
use radar_common::{RadarError, RasterBounds};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub bounds: RasterBounds,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub artifacts: ArtifactConfig,
    #[serde(default)]
    pub points: PointsConfig,
}

/// Where radar images come from.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// URL with a `{timestamp}` placeholder, e.g. `...z_max3d.{timestamp}.0.png`
    #[serde(default = "default_url_template")]
    pub url_template: String,
    /// Whole-request timeout for one image download
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_url_template() -> String {
    "https://www.chmi.cz/files/portal/docs/meteo/rad/inca-cz/data/czrad-z_max3d/pacz2gmaps3.z_max3d.{timestamp}.0.png".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Refresh timing.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between refresh ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Width of a time bucket in minutes; must divide 60
    #[serde(default = "default_bucket_minutes")]
    pub bucket_minutes: u32,
}

fn default_interval_secs() -> u64 {
    60
}

fn default_bucket_minutes() -> u32 {
    10
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            bucket_minutes: default_bucket_minutes(),
        }
    }
}

/// Artifact retention.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "default_retention_minutes")]
    pub minutes: u64,
}

fn default_retention_minutes() -> u64 {
    60
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            minutes: default_retention_minutes(),
        }
    }
}

/// Where annotated images are written.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    #[serde(default = "default_artifact_dir")]
    pub dir: PathBuf,
    /// File name prefix; only files carrying it are ever swept
    #[serde(default = "default_artifact_prefix")]
    pub prefix: String,
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("data/artifacts")
}

fn default_artifact_prefix() -> String {
    "radar_points_".to_string()
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: default_artifact_dir(),
            prefix: default_artifact_prefix(),
        }
    }
}

/// The watched point list.
#[derive(Debug, Clone, Deserialize)]
pub struct PointsConfig {
    #[serde(default = "default_points_path")]
    pub path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_points_path() -> PathBuf {
    PathBuf::from("config/points.csv")
}

fn default_delimiter() -> char {
    ';'
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            path: default_points_path(),
            delimiter: default_delimiter(),
        }
    }
}

impl ServiceConfig {
    /// Load and validate a configuration file.
    ///
    /// A missing file is not an error: defaults are used and a warning is logged.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: ServiceConfig = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            debug!(path = %path.display(), "Loaded service config");
            config
        } else {
            warn!(path = %path.display(), "Config file not found, using defaults");
            ServiceConfig::default()
        };

        config.validate()?;

        info!(
            interval_secs = config.schedule.interval_secs,
            bucket_minutes = config.schedule.bucket_minutes,
            retention_minutes = config.retention.minutes,
            artifacts = %config.artifacts.dir.display(),
            "Configuration ready"
        );
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), RadarError> {
        self.bounds.validate()?;
        validate_granularity(self.schedule.bucket_minutes)?;

        if self.schedule.interval_secs == 0 {
            return Err(RadarError::Config("schedule.interval_secs must be > 0".into()));
        }
        if self.retention.minutes == 0 {
            return Err(RadarError::Config("retention.minutes must be > 0".into()));
        }
        if self.source.timeout_secs == 0 {
            return Err(RadarError::Config("source.timeout_secs must be > 0".into()));
        }
        if !self.source.url_template.contains("{timestamp}") {
            return Err(RadarError::Config(format!(
                "source.url_template has no {{timestamp}} placeholder: {}",
                self.source.url_template
            )));
        }
        if !self.points.delimiter.is_ascii() {
            return Err(RadarError::Config(format!(
                "points.delimiter must be a single ASCII character, got '{}'",
                self.points.delimiter
            )));
        }
        if self.artifacts.prefix.is_empty() {
            return Err(RadarError::Config("artifacts.prefix must not be empty".into()));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.schedule.interval_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention.minutes * 60)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServiceConfig::default();
        config.validate().unwrap();
        assert_eq!(config.bounds, RasterBounds::CZECHIA);
        assert_eq!(config.interval(), Duration::from_secs(60));
        assert_eq!(config.retention(), Duration::from_secs(3600));
        assert_eq!(config.schedule.bucket_minutes, 10);
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
source:
  url_template: "http://localhost:9000/radar.{timestamp}.png"
bounds:
  west: 10.0
  north: 55.0
  east: 25.0
  south: 45.0
schedule:
  bucket_minutes: 5
artifacts:
  dir: /var/lib/rain-watch
"#;

        let config: ServiceConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.source.timeout_secs, 30);
        assert_eq!(config.bounds.east, 25.0);
        assert_eq!(config.schedule.bucket_minutes, 5);
        assert_eq!(config.schedule.interval_secs, 60);
        assert_eq!(config.artifacts.dir, PathBuf::from("/var/lib/rain-watch"));
        assert_eq!(config.artifacts.prefix, "radar_points_");
        assert_eq!(config.points.delimiter, ';');
    }

    #[test]
    fn test_partial_bounds_keep_default_edges() {
        let yaml = "bounds:\n  west: 11.0\n";

        let config: ServiceConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.bounds.west, 11.0);
        assert_eq!(config.bounds.north, RasterBounds::CZECHIA.north);
        assert_eq!(config.bounds.east, RasterBounds::CZECHIA.east);
        assert_eq!(config.bounds.south, RasterBounds::CZECHIA.south);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = ServiceConfig::default();
        config.schedule.bucket_minutes = 7;
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.source.url_template = "http://example.com/latest.png".into();
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.bounds = RasterBounds::new(20.0, 52.0, 11.0, 48.0);
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.retention.minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServiceConfig::load(Path::new("/nonexistent/rain-watch.yaml")).unwrap();
        assert_eq!(config.artifacts.prefix, "radar_points_");
    }
}
