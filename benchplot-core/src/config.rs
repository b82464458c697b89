// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict validation.
//!
//! Every field has a default, so an empty document (or no file at all) yields
//! the stock setup: `/dev/ttyUSB0` at 115200 baud, a 10 s start window and a
//! 60 s capture cap.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Raw serial settings as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawSerialConfig {
    #[serde(default = "default_port")]
    port: String,
    #[serde(default = "default_baud_rate")]
    baud_rate: u32,
    #[serde(default = "default_read_timeout_ms")]
    read_timeout_ms: u64,
}

fn default_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_read_timeout_ms() -> u64 {
    100
}

impl Default for RawSerialConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

/// Raw capture window settings.
#[derive(Debug, Deserialize)]
struct RawCaptureConfig {
    #[serde(default = "default_start_timeout_secs")]
    start_timeout_secs: u64,
    #[serde(default = "default_capture_timeout_secs")]
    capture_timeout_secs: u64,
    #[serde(default = "default_start_marker")]
    start_marker: String,
    #[serde(default = "default_end_marker")]
    end_marker: String,
}

fn default_start_timeout_secs() -> u64 {
    10
}

fn default_capture_timeout_secs() -> u64 {
    60
}

fn default_start_marker() -> String {
    "RUNNING COMPLETE BENCHMARK SUITE".to_string()
}

fn default_end_marker() -> String {
    "ALL BENCHMARKS COMPLETED".to_string()
}

impl Default for RawCaptureConfig {
    fn default() -> Self {
        Self {
            start_timeout_secs: default_start_timeout_secs(),
            capture_timeout_secs: default_capture_timeout_secs(),
            start_marker: default_start_marker(),
            end_marker: default_end_marker(),
        }
    }
}

/// Raw chart/output settings.
#[derive(Debug, Deserialize)]
struct RawOutputConfig {
    #[serde(default = "default_output_dir")]
    dir: String,
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
    #[serde(default = "default_true")]
    show: bool,
    #[serde(default = "default_true")]
    json_report: bool,
}

fn default_output_dir() -> String {
    ".".to_string()
}

// 12 x 8 inches at 300 DPI
fn default_width() -> u32 {
    3600
}

fn default_height() -> u32 {
    2400
}

fn default_true() -> bool {
    true
}

impl Default for RawOutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            width: default_width(),
            height: default_height(),
            show: default_true(),
            json_report: default_true(),
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    serial: RawSerialConfig,
    #[serde(default)]
    capture: RawCaptureConfig,
    #[serde(default)]
    output: RawOutputConfig,
}

/// Validated serial channel settings.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    /// Per-read timeout of the channel itself.
    pub read_timeout: Duration,
}

/// Validated capture window settings.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub start_timeout: Duration,
    /// Measured from the beginning of the start phase.
    pub capture_timeout: Duration,
    pub start_marker: String,
    pub end_marker: String,
}

/// Validated chart/output settings.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub show: bool,
    pub json_report: bool,
}

/// Complete validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    pub capture: CaptureConfig,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig {
                port: default_port(),
                baud_rate: default_baud_rate(),
                read_timeout: Duration::from_millis(default_read_timeout_ms()),
            },
            capture: CaptureConfig {
                start_timeout: Duration::from_secs(default_start_timeout_secs()),
                capture_timeout: Duration::from_secs(default_capture_timeout_secs()),
                start_marker: default_start_marker(),
                end_marker: default_end_marker(),
            },
            output: OutputConfig {
                dir: PathBuf::from(default_output_dir()),
                width: default_width(),
                height: default_height(),
                show: default_true(),
                json_report: default_true(),
            },
        }
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> Result<Config, ConfigError> {
        // serde_yaml rejects an empty document; treat it as "all defaults".
        if content.trim().is_empty() {
            return Self::validate(RawConfig::default());
        }

        let raw: RawConfig = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            message: format!("YAML parse error: {}", e),
        })?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Config, ConfigError> {
        let serial = Self::validate_serial(raw.serial)?;
        let capture = Self::validate_capture(raw.capture)?;
        let output = Self::validate_output(raw.output)?;

        if serial.read_timeout >= capture.capture_timeout {
            return Err(ConfigError::InvalidFieldValue {
                field: "serial.read_timeout_ms",
                value: serial.read_timeout.as_millis().to_string(),
                reason: "Read timeout must be shorter than the capture timeout".to_string(),
            });
        }

        Ok(Config {
            serial,
            capture,
            output,
        })
    }

    fn validate_serial(raw: RawSerialConfig) -> Result<SerialConfig, ConfigError> {
        if raw.port.trim().is_empty() {
            return Err(ConfigError::InvalidFieldValue {
                field: "serial.port",
                value: raw.port,
                reason: "Port cannot be empty".to_string(),
            });
        }

        if raw.baud_rate == 0 {
            return Err(ConfigError::InvalidFieldValue {
                field: "serial.baud_rate",
                value: raw.baud_rate.to_string(),
                reason: "Baud rate must be non-zero".to_string(),
            });
        }

        if raw.read_timeout_ms == 0 {
            return Err(ConfigError::InvalidFieldValue {
                field: "serial.read_timeout_ms",
                value: raw.read_timeout_ms.to_string(),
                reason: "Read timeout must be non-zero".to_string(),
            });
        }

        Ok(SerialConfig {
            port: raw.port,
            baud_rate: raw.baud_rate,
            read_timeout: Duration::from_millis(raw.read_timeout_ms),
        })
    }

    fn validate_capture(raw: RawCaptureConfig) -> Result<CaptureConfig, ConfigError> {
        if raw.start_timeout_secs == 0 {
            return Err(ConfigError::InvalidFieldValue {
                field: "capture.start_timeout_secs",
                value: raw.start_timeout_secs.to_string(),
                reason: "Start timeout must be non-zero".to_string(),
            });
        }

        if raw.capture_timeout_secs == 0 {
            return Err(ConfigError::InvalidFieldValue {
                field: "capture.capture_timeout_secs",
                value: raw.capture_timeout_secs.to_string(),
                reason: "Capture timeout must be non-zero".to_string(),
            });
        }

        if raw.start_timeout_secs >= raw.capture_timeout_secs {
            return Err(ConfigError::InvalidFieldValue {
                field: "capture.start_timeout_secs",
                value: raw.start_timeout_secs.to_string(),
                reason: "Start timeout must be shorter than the capture timeout".to_string(),
            });
        }

        for (field, marker) in [
            ("capture.start_marker", &raw.start_marker),
            ("capture.end_marker", &raw.end_marker),
        ] {
            if marker.trim().is_empty() {
                return Err(ConfigError::InvalidFieldValue {
                    field,
                    value: marker.clone(),
                    reason: "Marker cannot be empty".to_string(),
                });
            }
        }

        Ok(CaptureConfig {
            start_timeout: Duration::from_secs(raw.start_timeout_secs),
            capture_timeout: Duration::from_secs(raw.capture_timeout_secs),
            start_marker: raw.start_marker,
            end_marker: raw.end_marker,
        })
    }

    fn validate_output(raw: RawOutputConfig) -> Result<OutputConfig, ConfigError> {
        for (field, value) in [("output.width", raw.width), ("output.height", raw.height)] {
            if value == 0 {
                return Err(ConfigError::InvalidFieldValue {
                    field,
                    value: value.to_string(),
                    reason: "Chart dimensions must be non-zero".to_string(),
                });
            }
        }

        Ok(OutputConfig {
            dir: PathBuf::from(raw.dir),
            width: raw.width,
            height: raw.height,
            show: raw.show,
            json_report: raw.json_report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.capture.start_timeout, Duration::from_secs(10));
        assert_eq!(config.capture.capture_timeout, Duration::from_secs(60));
        assert_eq!(config.capture.start_marker, "RUNNING COMPLETE BENCHMARK SUITE");
        assert_eq!(config.capture.end_marker, "ALL BENCHMARKS COMPLETED");
        assert_eq!((config.output.width, config.output.height), (3600, 2400));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ConfigLoader::load_string("").unwrap();
        assert_eq!(config.serial.baud_rate, 115_200);
    }

    #[test]
    fn test_partial_config() {
        let yaml = r#"
serial:
  port: /dev/ttyACM0
  baud_rate: 921600
output:
  show: false
"#;
        let config = ConfigLoader::load_string(yaml).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyACM0");
        assert_eq!(config.serial.baud_rate, 921_600);
        assert_eq!(config.serial.read_timeout, Duration::from_millis(100));
        assert!(!config.output.show);
        assert!(config.output.json_report);
    }

    #[test]
    fn test_zero_baud_rate_rejected() {
        let yaml = "serial:\n  baud_rate: 0\n";
        let result = ConfigLoader::load_string(yaml);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidFieldValue {
                field: "serial.baud_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_capture_timeout_rejected() {
        let yaml = "capture:\n  capture_timeout_secs: 0\n";
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_start_timeout_must_be_shorter_than_capture() {
        for yaml in [
            "capture:\n  start_timeout_secs: 120\n  capture_timeout_secs: 60\n",
            "capture:\n  start_timeout_secs: 60\n  capture_timeout_secs: 60\n",
        ] {
            let result = ConfigLoader::load_string(yaml);
            assert!(matches!(
                result,
                Err(ConfigError::InvalidFieldValue {
                    field: "capture.start_timeout_secs",
                    ..
                })
            ));
        }

        let yaml = "capture:\n  start_timeout_secs: 5\n  capture_timeout_secs: 6\n";
        assert!(ConfigLoader::load_string(yaml).is_ok());
    }

    #[test]
    fn test_read_timeout_must_be_shorter_than_capture() {
        let yaml = "serial:\n  read_timeout_ms: 5000\ncapture:\n  start_timeout_secs: 2\n  capture_timeout_secs: 5\n";
        let result = ConfigLoader::load_string(yaml);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidFieldValue {
                field: "serial.read_timeout_ms",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_marker_rejected() {
        let yaml = "capture:\n  end_marker: \"  \"\n";
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_malformed_yaml() {
        let result = ConfigLoader::load_string("serial: [unclosed");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::load_file("/nonexistent/benchplot.yaml");
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }
}
