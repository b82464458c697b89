// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Error types for benchplot.
//!
//! Every failure is an explicit enum variant. Capture-side errors are never
//! fatal to a run: the caller falls back to example data. Configuration
//! errors fail fast.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the library.
#[derive(Debug, Error)]
pub enum BenchplotError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // =========================================================================
    // Capture Errors - Reported, Then Fallback to Example Data
    // =========================================================================
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    // =========================================================================
    // Output Errors
    // =========================================================================
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parse error: {message}")]
    Parse { message: String },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Serial channel failures.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to open serial port {port} at {baud_rate} baud: {source}")]
    Connection {
        port: String,
        baud_rate: u32,
        #[source]
        source: serialport::Error,
    },

    #[error("Failed to open replay file {path}: {source}")]
    ReplayOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Read from {channel} failed: {source}")]
    Read {
        channel: String,
        #[source]
        source: std::io::Error,
    },
}

/// A single line could not be turned into a record.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Field '{field}' value '{digits}' does not fit in 64 bits")]
    NumberOverflow { field: &'static str, digits: String },
}

/// Record construction rejected the measured values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Benchmark name cannot be empty")]
    EmptyName,

    #[error("Elapsed time for '{name}' must be greater than zero")]
    ZeroElapsed { name: String },
}

/// Chart rendering failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Nothing to render: the result set is empty")]
    NoRecords,

    #[error("Drawing failed: {message}")]
    Drawing { message: String },
}

/// JSON report persistence failures.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No reports found in {dir}")]
    NoReports { dir: PathBuf },
}

/// Result type alias using BenchplotError.
pub type BenchplotResult<T> = Result<T, BenchplotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidFieldValue {
            field: "baud_rate",
            value: "0".to_string(),
            reason: "Baud rate must be non-zero".to_string(),
        };
        assert!(err.to_string().contains("baud_rate"));
        assert!(err.to_string().contains("non-zero"));
    }

    #[test]
    fn test_error_chain() {
        let record_err = ConfigError::Parse {
            message: "bad yaml".to_string(),
        };
        let err: BenchplotError = record_err.into();
        assert!(matches!(err, BenchplotError::Config(_)));
    }

    #[test]
    fn test_record_error_names_benchmark() {
        let err = RecordError::ZeroElapsed {
            name: "Empty Loop".to_string(),
        };
        assert!(err.to_string().contains("Empty Loop"));
    }
}
