// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! JSON reports of charted result sets.
//!
//! A report is written next to its chart with the same file stem, so a chart
//! can be regenerated later without the device.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::capture::Termination;
use crate::error::ReportError;
use crate::record::{DataOrigin, DeviceInfo, ResultSet};

/// A charted run, as persisted to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureReport {
    /// Tool identifier
    pub tool: String,
    /// Tool version
    pub version: String,
    /// When the report was produced
    pub timestamp: DateTime<Local>,
    /// Whether the records are live or the example set
    pub source: DataOrigin,
    /// Channel the records were read from (serial port or replay file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baud_rate: Option<u32>,
    /// How the capture ended; absent for re-rendered reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination: Option<Termination>,
    #[serde(default, skip_serializing_if = "DeviceInfo::is_empty")]
    pub device: DeviceInfo,
    pub records: ResultSet,
}

impl CaptureReport {
    pub fn new(records: ResultSet, source: DataOrigin) -> Self {
        Self {
            tool: "benchplot".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Local::now(),
            source,
            channel: None,
            baud_rate: None,
            termination: None,
            device: DeviceInfo::default(),
            records,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>, baud_rate: Option<u32>) -> Self {
        self.channel = Some(channel.into());
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_capture(mut self, termination: Termination, device: DeviceInfo) -> Self {
        self.termination = Some(termination);
        self.device = device;
        self
    }
}

/// JSON reporter for captured runs.
pub struct JsonReporter {
    /// Output directory for reports
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a reporter writing into `output_dir`, creating it if needed.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReportError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Save a report as `<stem>.json` and return its path.
    pub fn save(&self, report: &CaptureReport, stem: &str) -> Result<PathBuf, ReportError> {
        let filepath = self.output_dir.join(format!("{}.json", stem));

        let file = File::create(&filepath)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        Ok(filepath)
    }

    /// List the benchmark reports in the output directory, oldest first.
    pub fn list_reports(&self) -> Result<Vec<PathBuf>, ReportError> {
        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.output_dir)? {
            let path = entry?.path();
            let is_report = path.extension().map(|e| e == "json").unwrap_or(false)
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("benchmark_results_"))
                    .unwrap_or(false);
            if is_report {
                reports.push(path);
            }
        }
        reports.sort();
        Ok(reports)
    }

    /// The most recent report in the output directory.
    pub fn latest(&self) -> Result<PathBuf, ReportError> {
        self.list_reports()?
            .pop()
            .ok_or_else(|| ReportError::NoReports {
                dir: self.output_dir.clone(),
            })
    }

    /// Load a report from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<CaptureReport, ReportError> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }
}
