//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// External tool locations.
    pub tools: ToolPaths,

    /// Default compile parameters.
    pub compile: CompileDefaults,

    /// Path of the append-only subprocess invocation log.
    pub invocation_log: PathBuf,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Locations of the external media tools.
///
/// Bare names are resolved through `PATH` at spawn time; absolute paths
/// are used as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolPaths {
    /// Transcoding tool (segment conversion and concatenation).
    pub ffmpeg: PathBuf,

    /// Metadata probing tool (video duration lookup).
    pub ffprobe: PathBuf,
}

/// Default compile parameters, used when the caller does not override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileDefaults {
    /// Output resolution as `WIDTHxHEIGHT`.
    pub resolution: String,

    /// Output frame rate.
    pub frame_rate: String,

    /// Display duration for newly added still images, in seconds.
    pub image_duration_secs: f64,

    /// Wall-clock timeout for each subprocess invocation, in seconds.
    pub subprocess_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "slidereel=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tools: ToolPaths::default(),
            compile: CompileDefaults::default(),
            invocation_log: default_invocation_log(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl Default for CompileDefaults {
    fn default() -> Self {
        Self {
            resolution: "1280x720".to_string(),
            frame_rate: "30".to_string(),
            image_duration_secs: 2.0,
            subprocess_timeout_secs: 120,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("slidereel").join("config.json")
}

/// Default invocation-log location.
fn default_invocation_log() -> PathBuf {
    let base = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("state")
        });
    base.join("slidereel").join("ffmpeg_log.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.tools.ffmpeg, PathBuf::from("ffmpeg"));
        assert_eq!(config.compile.resolution, "1280x720");
        assert_eq!(config.compile.subprocess_timeout_secs, 120);
        assert!((config.compile.image_duration_secs - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = AppConfig::default();
        config.tools.ffmpeg = PathBuf::from("/opt/ffmpeg/bin/ffmpeg");
        config.compile.frame_rate = "25".to_string();

        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.tools.ffmpeg, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(parsed.compile.frame_rate, "25");
    }
}
