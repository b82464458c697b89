// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Line extraction: turns one line of device output into at most one record.
//!
//! Two data-line shapes are recognized:
//!
//! - labeled: `Empty Loop: Iterations: 1000000, Total Time: 12345 µs`
//! - CSV dump: `4012345,empty_loop,1000000,12345,0.012,81004`
//!
//! A labeled line is matched by a single expression covering name,
//! iterations and total time. The name is everything before the first `:`;
//! iterations default to 0 when absent; a missing or zero total time means
//! the line is not a measurement.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{ExtractError, RecordError};
use crate::record::{BenchmarkRecord, DeviceInfo};

static LABELED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<name>[^:]*):(?:.*?Iterations:\s*(?P<iterations>\d+))?.*?Total Time:\s*(?P<elapsed>\d+)\s*µs",
    )
    .expect("labeled line pattern is valid")
});

static CSV_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+,(?P<name>[^,]+),(?P<iterations>\d+),(?P<elapsed>\d+),")
        .expect("csv line pattern is valid")
});

static DEVICE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<key>Chip_Revision|CPU_Frequency|ESP_IDF_Version|Compile_Time):\s*(?P<value>.+)$")
        .expect("device field pattern is valid")
});

/// Attempt to extract a record from one line.
///
/// `Ok(None)` means the line is not a measurement, or it is one that the
/// acceptance rules reject (empty name, zero elapsed time). `Err` means the
/// line looked like a measurement but its numbers could not be read.
pub fn extract_record(line: &str) -> Result<Option<BenchmarkRecord>, ExtractError> {
    let line = line.trim();

    let caps = match LABELED_LINE
        .captures(line)
        .or_else(|| CSV_LINE.captures(line))
    {
        Some(caps) => caps,
        None => return Ok(None),
    };

    let iterations = parse_field(&caps, "iterations")?.unwrap_or(0);
    let elapsed_us = parse_field(&caps, "elapsed")?.unwrap_or(0);
    let name = caps.name("name").map_or("", |m| m.as_str());

    match BenchmarkRecord::new(name, iterations, elapsed_us) {
        Ok(record) => Ok(Some(record)),
        Err(RecordError::EmptyName) => {
            tracing::debug!(line = %line, "Ignoring measurement without a name");
            Ok(None)
        }
        Err(RecordError::ZeroElapsed { name }) => {
            tracing::debug!(name = %name, "Ignoring measurement with zero elapsed time");
            Ok(None)
        }
    }
}

/// Record a firmware header field (`CPU_Frequency: 160 MHz`) if the line is one.
///
/// Returns whether the line was consumed.
pub fn extract_device_field(line: &str, device: &mut DeviceInfo) -> bool {
    match DEVICE_FIELD.captures(line.trim()) {
        Some(caps) => {
            device.insert(&caps["key"], caps["value"].trim());
            true
        }
        None => false,
    }
}

fn parse_field(caps: &Captures<'_>, field: &'static str) -> Result<Option<u64>, ExtractError> {
    caps.name(field)
        .map(|m| {
            m.as_str()
                .parse::<u64>()
                .map_err(|_| ExtractError::NumberOverflow {
                    field,
                    digits: m.as_str().to_string(),
                })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_line() {
        let record = extract_record("Empty Loop: Iterations: 1000000, Total Time: 12345 µs")
            .unwrap()
            .unwrap();
        assert_eq!(record.name(), "Empty Loop");
        assert_eq!(record.iterations(), 1_000_000);
        assert_eq!(record.elapsed_us(), 12_345);
    }

    #[test]
    fn test_surrounding_text_is_ignored() {
        let line = "  Memory Access : run 3, Iterations:100000 | Total Time:  23456µs (avg 0.234 µs/op)\r";
        let record = extract_record(line).unwrap().unwrap();
        assert_eq!(record.name(), "Memory Access");
        assert_eq!(record.iterations(), 100_000);
        assert_eq!(record.elapsed_us(), 23_456);
    }

    #[test]
    fn test_missing_iterations_defaults_to_zero() {
        let record = extract_record("Light Sleep: Total Time: 500123 µs")
            .unwrap()
            .unwrap();
        assert_eq!(record.iterations(), 0);
        assert_eq!(record.throughput(), 0.0);
    }

    #[test]
    fn test_iterations_after_total_time_are_ignored() {
        // Only `name: ... Iterations: N ... Total Time: T µs` carries a count.
        let record = extract_record("Empty Loop: Total Time: 100 µs, Iterations: 5")
            .unwrap()
            .unwrap();
        assert_eq!(record.name(), "Empty Loop");
        assert_eq!(record.elapsed_us(), 100);
        assert_eq!(record.iterations(), 0);
    }

    #[test]
    fn test_zero_elapsed_not_accepted() {
        let line = "Empty Loop: Iterations: 1000000, Total Time: 0 µs";
        assert!(extract_record(line).unwrap().is_none());
    }

    #[test]
    fn test_empty_name_not_accepted() {
        let line = ": Iterations: 1000, Total Time: 100 µs";
        assert!(extract_record(line).unwrap().is_none());
    }

    #[test]
    fn test_other_units_not_matched() {
        assert!(extract_record("Gesamtzeit: 12345 us").unwrap().is_none());
        assert!(extract_record("Empty Loop: Total Time: 12 ms").unwrap().is_none());
    }

    #[test]
    fn test_markers_and_noise() {
        for line in [
            "",
            " RUNNING COMPLETE BENCHMARK SUITE...",
            " ALL BENCHMARKS COMPLETED!",
            "CPU_Frequency: 160 MHz",
            "timestamp,test_name,iterations,total_time_us,time_per_op_us,ops_per_second",
        ] {
            assert!(extract_record(line).unwrap().is_none(), "{line:?}");
        }
    }

    #[test]
    fn test_overflowing_digits_are_an_error() {
        let line = "Empty Loop: Iterations: 1, Total Time: 99999999999999999999999 µs";
        let err = extract_record(line).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::NumberOverflow {
                field: "elapsed",
                ..
            }
        ));
    }

    #[test]
    fn test_csv_line() {
        let record = extract_record("4012345,empty_loop,1000000,12345,0.012,81004455")
            .unwrap()
            .unwrap();
        assert_eq!(record.name(), "empty_loop");
        assert_eq!(record.iterations(), 1_000_000);
        assert_eq!(record.elapsed_us(), 12_345);
    }

    #[test]
    fn test_csv_line_with_zero_time_rejected() {
        assert!(extract_record("4012345,light_sleep,1,0,0.000,0")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_device_fields() {
        let mut device = DeviceInfo::default();
        assert!(extract_device_field("CPU_Frequency: 160 MHz", &mut device));
        assert!(extract_device_field("Chip_Revision: v0.1", &mut device));
        assert!(!extract_device_field("Summe: 4950", &mut device));
        assert_eq!(device.get("CPU_Frequency"), Some("160 MHz"));
        assert_eq!(device.get("Chip_Revision"), Some("v0.1"));
    }
}
