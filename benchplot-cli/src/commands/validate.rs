// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `benchplot validate` - Validate configuration file.

use std::path::Path;

use benchplot_core::ConfigLoader;

pub fn execute(file: &Path) -> anyhow::Result<()> {
    tracing::info!(file = %file.display(), "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Serial:");
            println!("  Port:            {}", config.serial.port);
            println!("  Baud Rate:       {}", config.serial.baud_rate);
            println!(
                "  Read Timeout:    {}ms",
                config.serial.read_timeout.as_millis()
            );
            println!();
            println!("Capture:");
            println!(
                "  Start Timeout:   {}s",
                config.capture.start_timeout.as_secs()
            );
            println!(
                "  Capture Timeout: {}s",
                config.capture.capture_timeout.as_secs()
            );
            println!("  Start Marker:    {}", config.capture.start_marker);
            println!("  End Marker:      {}", config.capture.end_marker);
            println!();
            println!("Output:");
            println!("  Directory:       {}", config.output.dir.display());
            println!(
                "  Chart Size:      {}x{} px",
                config.output.width, config.output.height
            );
            println!("  Show Chart:      {}", config.output.show);
            println!("  JSON Report:     {}", config.output.json_report);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
