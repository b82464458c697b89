// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `benchplot plot` - Re-render a saved report.

use std::path::PathBuf;

use benchplot_core::chart;
use benchplot_core::{publish, Config, JsonReporter};

pub fn execute(mut config: Config, report: Option<PathBuf>, no_show: bool) -> anyhow::Result<()> {
    let path = match report {
        Some(path) => path,
        None => JsonReporter::new(&config.output.dir)?.latest()?,
    };

    tracing::info!(path = %path.display(), "Loading report");
    let report = JsonReporter::load(&path)?;

    println!(
        "Report from {} ({} records, {} data)",
        report.timestamp.format("%Y-%m-%d %H:%M:%S"),
        report.records.len(),
        report.source
    );
    super::print_summary(&report.records);

    // The report already exists; only the chart is regenerated.
    config.output.json_report = false;
    let published = publish(&report, &config.output)?;
    println!("Chart saved to: {}", published.chart.display());

    if config.output.show && !no_show {
        chart::show(&published.chart);
    }

    Ok(())
}
