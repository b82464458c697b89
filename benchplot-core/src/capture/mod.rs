// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Line collection from a device.
//!
//! A capture runs in two phases over a single owned [`LineSource`]:
//!
//! 1. wait for the start marker, at most `start_timeout` (and never past the
//!    capture deadline). If it never shows up the capture still continues.
//! 2. feed every non-empty line to the extractor until the end marker
//!    arrives or `capture_timeout` (measured from the start of phase 1)
//!    expires.
//!
//! The source is consumed and dropped before [`LineCollector::collect`]
//! returns, whatever the outcome.

mod serial;
mod source;

pub use serial::SerialSource;
pub use source::{LineAssembler, LineSource, ReadOutcome, ReplaySource};

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::CaptureConfig;
use crate::extract::{extract_device_field, extract_record};
use crate::record::{DeviceInfo, ResultSet};

/// Why a capture stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The end marker was seen.
    Completed,
    /// The capture deadline expired first.
    TimedOut,
    /// The channel ran out of data.
    StreamClosed,
    /// The channel failed mid-capture.
    ReadFailed,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Completed => write!(f, "completed"),
            Termination::TimedOut => write!(f, "timed_out"),
            Termination::StreamClosed => write!(f, "stream_closed"),
            Termination::ReadFailed => write!(f, "read_failed"),
        }
    }
}

/// Everything a capture produced.
#[derive(Debug, Clone)]
pub struct CaptureSummary {
    pub records: ResultSet,
    pub device: DeviceInfo,
    pub start_marker_seen: bool,
    pub termination: Termination,
    /// Non-empty lines read across both phases.
    pub lines_read: u64,
}

/// Drives a capture over one line source.
pub struct LineCollector {
    config: CaptureConfig,
}

impl LineCollector {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    /// Run both phases and return the accumulated results.
    pub fn collect<S: LineSource>(&self, mut source: S) -> CaptureSummary {
        let channel = source.describe();
        let started = Instant::now();
        let capture_deadline = started + self.config.capture_timeout;
        let start_deadline = (started + self.config.start_timeout).min(capture_deadline);

        let mut summary = CaptureSummary {
            records: ResultSet::new(),
            device: DeviceInfo::default(),
            start_marker_seen: false,
            termination: Termination::TimedOut,
            lines_read: 0,
        };

        tracing::info!(channel = %channel, marker = %self.config.start_marker, "Waiting for benchmark start");

        let early_exit = self.wait_for_start(&mut source, start_deadline, &mut summary);

        summary.termination = match early_exit {
            Some(termination) => termination,
            None => self.collect_records(&mut source, capture_deadline, &mut summary),
        };

        drop(source);

        tracing::info!(
            channel = %channel,
            termination = %summary.termination,
            records = summary.records.len(),
            lines = summary.lines_read,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Capture finished"
        );

        summary
    }

    /// Phase 1. Returns a termination only if the channel itself ended.
    fn wait_for_start<S: LineSource>(
        &self,
        source: &mut S,
        deadline: Instant,
        summary: &mut CaptureSummary,
    ) -> Option<Termination> {
        while Instant::now() < deadline {
            match source.read_line() {
                Ok(ReadOutcome::Line(line)) if !line.is_empty() => {
                    echo(&line);
                    summary.lines_read += 1;

                    if line.contains(&self.config.start_marker) {
                        summary.start_marker_seen = true;
                        tracing::info!("Benchmark started, collecting data");
                        return None;
                    }

                    extract_device_field(&line, &mut summary.device);
                }
                Ok(ReadOutcome::Line(_)) | Ok(ReadOutcome::Idle) => {}
                Ok(ReadOutcome::Closed) => return Some(Termination::StreamClosed),
                Err(e) => {
                    tracing::error!(error = %e, "Read failed while waiting for start");
                    return Some(Termination::ReadFailed);
                }
            }
        }

        tracing::warn!(
            timeout_secs = self.config.start_timeout.as_secs_f64(),
            "Start marker not seen, collecting anyway"
        );
        None
    }

    /// Phase 2.
    fn collect_records<S: LineSource>(
        &self,
        source: &mut S,
        deadline: Instant,
        summary: &mut CaptureSummary,
    ) -> Termination {
        loop {
            match source.read_line() {
                Ok(ReadOutcome::Line(line)) if !line.is_empty() => {
                    echo(&line);
                    summary.lines_read += 1;
                    self.process_line(&line, summary);

                    if line.contains(&self.config.end_marker) {
                        tracing::info!("All benchmarks completed");
                        return Termination::Completed;
                    }
                }
                Ok(ReadOutcome::Line(_)) | Ok(ReadOutcome::Idle) => {}
                Ok(ReadOutcome::Closed) => {
                    tracing::warn!("Channel closed before the end marker");
                    return Termination::StreamClosed;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Read failed, keeping records collected so far");
                    return Termination::ReadFailed;
                }
            }

            if Instant::now() >= deadline {
                tracing::warn!(
                    timeout_secs = self.config.capture_timeout.as_secs_f64(),
                    "Capture timed out"
                );
                return Termination::TimedOut;
            }
        }
    }

    fn process_line(&self, line: &str, summary: &mut CaptureSummary) {
        if extract_device_field(line, &mut summary.device) {
            return;
        }

        match extract_record(line) {
            Ok(Some(record)) => {
                tracing::info!(
                    name = %record.name(),
                    elapsed_us = record.elapsed_us(),
                    iterations = record.iterations(),
                    "Collected"
                );
                summary.records.push(record);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, line = %line, "Skipping unparseable line"),
        }
    }
}

fn echo(line: &str) {
    tracing::info!(target: "device", "{}", line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Scripted source: plays its lines, then stays idle forever.
    struct Scripted {
        lines: VecDeque<ReadOutcome>,
        idle_delay: Duration,
    }

    impl Scripted {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines
                    .iter()
                    .map(|l| ReadOutcome::Line(l.to_string()))
                    .collect(),
                idle_delay: Duration::from_millis(5),
            }
        }
    }

    impl LineSource for Scripted {
        fn read_line(&mut self) -> Result<ReadOutcome, crate::error::CaptureError> {
            match self.lines.pop_front() {
                Some(outcome) => Ok(outcome),
                None => {
                    std::thread::sleep(self.idle_delay);
                    Ok(ReadOutcome::Idle)
                }
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn quick_config() -> CaptureConfig {
        CaptureConfig {
            start_timeout: Duration::from_millis(50),
            capture_timeout: Duration::from_millis(200),
            start_marker: "RUNNING COMPLETE BENCHMARK SUITE".to_string(),
            end_marker: "ALL BENCHMARKS COMPLETED".to_string(),
        }
    }

    #[test]
    fn test_full_session() {
        let source = Scripted::new(&[
            "boot noise",
            "CPU_Frequency: 160 MHz",
            " RUNNING COMPLETE BENCHMARK SUITE...",
            "Empty Loop: Iterations: 1000000, Total Time: 12345 µs",
            "",
            "Arithmetic: Iterations: 100000, Total Time: 15678 µs",
            " ALL BENCHMARKS COMPLETED!",
            "Function Call: Iterations: 1, Total Time: 1 µs",
        ]);

        let summary = LineCollector::new(quick_config()).collect(source);

        assert_eq!(summary.termination, Termination::Completed);
        assert!(summary.start_marker_seen);
        assert_eq!(summary.records.names(), vec!["Empty Loop", "Arithmetic"]);
        assert_eq!(summary.device.get("CPU_Frequency"), Some("160 MHz"));
        assert_eq!(summary.lines_read, 6);
    }

    #[test]
    fn test_lines_before_start_are_not_extracted() {
        let source = Scripted::new(&[
            "Warmup: Iterations: 10, Total Time: 5 µs",
            "RUNNING COMPLETE BENCHMARK SUITE",
            "ALL BENCHMARKS COMPLETED",
        ]);

        let summary = LineCollector::new(quick_config()).collect(source);
        assert!(summary.records.is_empty());
        assert_eq!(summary.termination, Termination::Completed);
    }

    #[test]
    fn test_missing_start_marker_still_collects() {
        let mut config = quick_config();
        config.start_timeout = Duration::from_millis(10);

        // Data only arrives after the start window has elapsed.
        let source = DelayedStart {
            inner: Scripted::new(&[]),
            after: Duration::from_millis(30),
            opened: Instant::now(),
            queued: Scripted::new(&[
                "Memory Access: Iterations: 100000, Total Time: 23456 µs",
                "ALL BENCHMARKS COMPLETED",
            ]),
        };

        let summary = LineCollector::new(config).collect(source);
        assert!(!summary.start_marker_seen);
        assert_eq!(summary.termination, Termination::Completed);
        assert_eq!(summary.records.names(), vec!["Memory Access"]);
    }

    struct DelayedStart {
        inner: Scripted,
        after: Duration,
        opened: Instant,
        queued: Scripted,
    }

    impl LineSource for DelayedStart {
        fn read_line(&mut self) -> Result<ReadOutcome, crate::error::CaptureError> {
            if self.opened.elapsed() < self.after {
                self.inner.read_line()
            } else {
                self.queued.read_line()
            }
        }

        fn describe(&self) -> String {
            "delayed".to_string()
        }
    }

    #[test]
    fn test_silent_device_times_out() {
        let started = Instant::now();
        let summary = LineCollector::new(quick_config()).collect(Scripted::new(&[]));

        assert_eq!(summary.termination, Termination::TimedOut);
        assert!(summary.records.is_empty());
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_start_window_is_bounded_by_capture_timeout() {
        let config = CaptureConfig {
            start_timeout: Duration::from_millis(600),
            capture_timeout: Duration::from_millis(100),
            ..quick_config()
        };

        let started = Instant::now();
        let summary = LineCollector::new(config).collect(Scripted::new(&[]));

        assert_eq!(summary.termination, Termination::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[test]
    fn test_closed_stream_keeps_records() {
        let data = "RUNNING COMPLETE BENCHMARK SUITE\nArithmetic: Iterations: 100000, Total Time: 15678 \u{b5}s\n";
        let source = ReplaySource::new(std::io::Cursor::new(data.as_bytes().to_vec()), "memory");

        let summary = LineCollector::new(quick_config()).collect(source);
        assert_eq!(summary.termination, Termination::StreamClosed);
        assert_eq!(summary.records.len(), 1);
    }

    #[test]
    fn test_unparseable_line_does_not_abort() {
        let source = Scripted::new(&[
            "RUNNING COMPLETE BENCHMARK SUITE",
            "Broken: Iterations: 1, Total Time: 99999999999999999999999 µs",
            "Floating Point: Iterations: 100000, Total Time: 34567 µs",
            "ALL BENCHMARKS COMPLETED",
        ]);

        let summary = LineCollector::new(quick_config()).collect(source);
        assert_eq!(summary.records.names(), vec!["Floating Point"]);
    }

    #[test]
    fn test_read_failure_ends_capture() {
        struct Failing;
        impl LineSource for Failing {
            fn read_line(&mut self) -> Result<ReadOutcome, crate::error::CaptureError> {
                Err(crate::error::CaptureError::Read {
                    channel: "failing".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged"),
                })
            }
            fn describe(&self) -> String {
                "failing".to_string()
            }
        }

        let summary = LineCollector::new(quick_config()).collect(Failing);
        assert_eq!(summary.termination, Termination::ReadFailed);
    }
}
