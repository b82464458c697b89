// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! benchplot CLI
//!
//! Captures benchmark output from a device on a serial port and charts it.
//! Run without arguments to capture from the default port and render.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

/// benchplot - Chart benchmark results reported by an embedded device
#[derive(Parser)]
#[command(name = "benchplot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to ./benchplot.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for charts and reports
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture from the device and render (the default)
    Run(RunArgs),

    /// Re-render a saved JSON report
    Plot {
        /// Report to render (latest in the output directory if omitted)
        report: Option<PathBuf>,

        /// Do not open the chart after writing it
        #[arg(long)]
        no_show: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: PathBuf,
    },
}

#[derive(Args, Default)]
pub struct RunArgs {
    /// Serial port of the device
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Parse a saved session log instead of reading the serial port
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Do not open the chart after writing it
    #[arg(long)]
    pub no_show: bool,

    /// Do not write the JSON report
    #[arg(long)]
    pub no_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let command = cli.command.unwrap_or(Commands::Run(RunArgs::default()));

    // Validation reports on its own file, independent of the active config.
    if let Commands::Validate { file } = &command {
        return commands::validate::execute(file);
    }

    let mut config = commands::load_config(cli.config.as_deref())?;
    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }

    // Dispatch to command handlers
    match command {
        Commands::Run(args) => commands::run::execute(config, args),
        Commands::Plot { report, no_show } => commands::plot::execute(config, report, no_show),
        Commands::Validate { .. } => Ok(()),
    }
}
