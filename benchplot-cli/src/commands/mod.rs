// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

pub mod plot;
pub mod run;
pub mod validate;

use std::path::Path;

use benchplot_core::{Config, ConfigError, ConfigLoader, ResultSet};

const DEFAULT_CONFIG_FILE: &str = "benchplot.yaml";

/// Explicit path must exist; otherwise use `./benchplot.yaml` if present,
/// else built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => ConfigLoader::load_file(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            tracing::debug!(file = DEFAULT_CONFIG_FILE, "Using configuration file");
            ConfigLoader::load_file(DEFAULT_CONFIG_FILE)
        }
        None => Ok(Config::default()),
    }
}

pub fn print_summary(records: &ResultSet) {
    println!();
    println!(
        "{:<24} {:>12} {:>12} {:>16}",
        "Benchmark", "Iterations", "Time (ms)", "Ops/second"
    );
    println!("{}", "-".repeat(67));
    for record in records {
        println!(
            "{:<24} {:>12} {:>12.1} {:>16.0}",
            record.name(),
            record.iterations(),
            record.elapsed_ms(),
            record.throughput()
        );
    }
    println!();
}
