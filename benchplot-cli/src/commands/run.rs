// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `benchplot run` - Capture from the device, then render.

use benchplot_core::chart;
use benchplot_core::{
    publish, CaptureReport, CaptureSummary, Config, DataOrigin, LineCollector, ReplaySource,
    ResultSet, SerialSource,
};

use crate::RunArgs;

pub fn execute(mut config: Config, args: RunArgs) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.serial.port = port;
    }
    if let Some(baud) = args.baud {
        anyhow::ensure!(baud > 0, "Baud rate must be non-zero");
        config.serial.baud_rate = baud;
    }
    if args.no_show {
        config.output.show = false;
    }
    if args.no_json {
        config.output.json_report = false;
    }

    println!("benchplot - device benchmark capture");
    println!("====================================");

    let collector = LineCollector::new(config.capture.clone());

    let (channel, baud_rate, summary) = match &args.replay {
        Some(path) => {
            let summary = match ReplaySource::open(path) {
                Ok(source) => Some(collector.collect(source)),
                Err(e) => {
                    tracing::error!(error = %e, "Could not open replay log");
                    None
                }
            };
            (path.display().to_string(), None, summary)
        }
        None => {
            let summary = match SerialSource::open(&config.serial) {
                Ok(source) => Some(collector.collect(source)),
                Err(e) => {
                    tracing::error!(error = %e, "Could not connect to device");
                    None
                }
            };
            (
                config.serial.port.clone(),
                Some(config.serial.baud_rate),
                summary,
            )
        }
    };

    let (captured, capture_details) = match summary {
        Some(CaptureSummary {
            records,
            device,
            termination,
            ..
        }) => (records, Some((termination, device))),
        None => (ResultSet::new(), None),
    };

    let (records, origin) = captured.or_example();
    if origin == DataOrigin::Example {
        tracing::warn!("No live data captured, charting example data");
    }

    let mut report = CaptureReport::new(records, origin).with_channel(channel, baud_rate);
    if let Some((termination, device)) = capture_details {
        report = report.with_capture(termination, device);
    }

    super::print_summary(&report.records);

    let published = publish(&report, &config.output)?;
    println!("Chart saved to: {}", published.chart.display());
    if let Some(path) = &published.report {
        println!("Report saved to: {}", path.display());
    }

    if config.output.show {
        chart::show(&published.chart);
    }

    Ok(())
}
