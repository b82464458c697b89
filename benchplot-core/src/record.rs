// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark records and the ordered result set handed from capture to render.
//!
//! Records validate their invariants at construction time: a record always
//! has a non-empty name and a non-zero elapsed time, so throughput is always
//! well defined.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// One parsed measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct BenchmarkRecord {
    name: String,
    elapsed_us: u64,
    iterations: u64,
    throughput_ops_per_sec: f64,
}

impl BenchmarkRecord {
    /// Create a record, deriving throughput from iterations and elapsed time.
    pub fn new(
        name: impl Into<String>,
        iterations: u64,
        elapsed_us: u64,
    ) -> Result<Self, RecordError> {
        let name = name.into().trim().to_string();

        if name.is_empty() {
            return Err(RecordError::EmptyName);
        }

        if elapsed_us == 0 {
            return Err(RecordError::ZeroElapsed { name });
        }

        let throughput_ops_per_sec = iterations as f64 * MICROS_PER_SECOND / elapsed_us as f64;

        Ok(Self {
            name,
            elapsed_us,
            iterations,
            throughput_ops_per_sec,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_us as f64 / 1_000.0
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Iterations per second.
    pub fn throughput(&self) -> f64 {
        self.throughput_ops_per_sec
    }
}

/// Serialized form; throughput is re-derived on load.
#[derive(Deserialize)]
struct RawRecord {
    name: String,
    elapsed_us: u64,
    iterations: u64,
}

impl TryFrom<RawRecord> for BenchmarkRecord {
    type Error = RecordError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.iterations, raw.elapsed_us)
    }
}

/// Where the charted records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    /// Parsed from device output.
    Live,
    /// The built-in example set, used when nothing was captured.
    Example,
}

impl std::fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataOrigin::Live => write!(f, "live"),
            DataOrigin::Example => write!(f, "example"),
        }
    }
}

/// Ordered sequence of records in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<BenchmarkRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed data set charted when a capture produced nothing.
    pub fn example() -> Self {
        const EXAMPLE: [(&str, u64, u64); 5] = [
            ("Empty Loop", 1_000_000, 15_234),
            ("Function Call", 100_000, 8_921),
            ("Arithmetic", 100_000, 15_678),
            ("Memory Access", 100_000, 23_456),
            ("Floating Point", 100_000, 34_567),
        ];

        EXAMPLE
            .iter()
            .filter_map(|&(name, iterations, elapsed_us)| {
                BenchmarkRecord::new(name, iterations, elapsed_us).ok()
            })
            .collect()
    }

    /// Captured records when there are any, the example set otherwise.
    pub fn or_example(self) -> (Self, DataOrigin) {
        if self.is_empty() {
            (Self::example(), DataOrigin::Example)
        } else {
            (self, DataOrigin::Live)
        }
    }

    pub fn push(&mut self, record: BenchmarkRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BenchmarkRecord> {
        self.records.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(BenchmarkRecord::name).collect()
    }

    pub fn elapsed_ms(&self) -> Vec<f64> {
        self.records.iter().map(BenchmarkRecord::elapsed_ms).collect()
    }

    pub fn throughputs(&self) -> Vec<f64> {
        self.records.iter().map(BenchmarkRecord::throughput).collect()
    }

    /// Share of total elapsed time per record, in percent.
    pub fn time_shares(&self) -> Vec<f64> {
        let total: f64 = self.records.iter().map(BenchmarkRecord::elapsed_ms).sum();
        if total <= 0.0 {
            return vec![0.0; self.records.len()];
        }
        self.records
            .iter()
            .map(|r| r.elapsed_ms() * 100.0 / total)
            .collect()
    }

    /// `max(throughput) / throughput` per record; 0 where throughput is 0.
    ///
    /// This is the "normalized relative performance" series of the chart:
    /// the fastest record scores 1.0 and slower records score higher, so it
    /// reads as how many times slower than the fastest each benchmark is.
    pub fn slowdown_factors(&self) -> Vec<f64> {
        let max = self
            .records
            .iter()
            .map(BenchmarkRecord::throughput)
            .fold(0.0_f64, f64::max);

        self.records
            .iter()
            .map(|r| {
                if r.throughput() > 0.0 {
                    max / r.throughput()
                } else {
                    0.0
                }
            })
            .collect()
    }
}

impl FromIterator<BenchmarkRecord> for ResultSet {
    fn from_iter<I: IntoIterator<Item = BenchmarkRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ResultSet {
    type Item = BenchmarkRecord;
    type IntoIter = std::vec::IntoIter<BenchmarkRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a BenchmarkRecord;
    type IntoIter = std::slice::Iter<'a, BenchmarkRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Header fields the firmware prints before a run (`Chip_Revision: v0.1`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceInfo(BTreeMap<String, String>);

impl DeviceInfo {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
