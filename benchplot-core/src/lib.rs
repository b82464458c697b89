// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! benchplot core library
//!
//! Captures benchmark results printed by an embedded device over a serial
//! line, extracts them into records, and charts them.
//!
//! # Flow
//!
//! - **Capture**: [`LineCollector`] reads a [`LineSource`] between the start
//!   and completion markers, feeding each line to [`extract_record`]
//! - **Fallback**: an empty capture is replaced by [`ResultSet::example`]
//! - **Output**: [`publish`] renders the four-panel PNG and writes the JSON
//!   report next to it

pub mod capture;
pub mod chart;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod record;
pub mod reporter;

// Re-export commonly used types
pub use capture::{CaptureSummary, LineCollector, LineSource, ReplaySource, SerialSource, Termination};
pub use chart::ChartRenderer;
pub use config::{CaptureConfig, Config, ConfigLoader, OutputConfig, SerialConfig};
pub use error::{BenchplotError, BenchplotResult, CaptureError, ConfigError, RenderError, ReportError};
pub use extract::extract_record;
pub use output::{publish, Published};
pub use record::{BenchmarkRecord, DataOrigin, DeviceInfo, ResultSet};
pub use reporter::{CaptureReport, JsonReporter};
