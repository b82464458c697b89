// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Writing a charted run to disk: the PNG and, optionally, its JSON report.

use std::path::PathBuf;

use chrono::Local;

use crate::chart::{output_stem, ChartRenderer};
use crate::config::OutputConfig;
use crate::error::BenchplotResult;
use crate::reporter::{CaptureReport, JsonReporter};

/// Files produced by [`publish`].
#[derive(Debug, Clone)]
pub struct Published {
    pub chart: PathBuf,
    pub report: Option<PathBuf>,
}

/// Render `report.records` and save the report alongside the chart.
pub fn publish(report: &CaptureReport, config: &OutputConfig) -> BenchplotResult<Published> {
    let stem = output_stem(&Local::now());

    let chart = ChartRenderer::from_config(config).render_into(&report.records, &config.dir, &stem)?;
    tracing::info!(path = %chart.display(), "Chart saved");

    let report_path = if config.json_report {
        let path = JsonReporter::new(&config.dir)?.save(report, &stem)?;
        tracing::info!(path = %path.display(), "Report saved");
        Some(path)
    } else {
        None
    };

    Ok(Published {
        chart,
        report: report_path,
    })
}
