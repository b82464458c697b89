// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Serial port line source.

use std::io::{ErrorKind, Read};

use serialport::SerialPort;

use super::source::{LineAssembler, LineSource, ReadOutcome};
use crate::config::SerialConfig;
use crate::error::CaptureError;

const READ_CHUNK: usize = 256;

/// A device serial port opened for reading.
///
/// The port is closed when this value is dropped.
pub struct SerialSource {
    port: Box<dyn SerialPort>,
    name: String,
    assembler: LineAssembler,
}

impl SerialSource {
    /// Open the configured port. Each read blocks for at most
    /// `config.read_timeout`.
    pub fn open(config: &SerialConfig) -> Result<Self, CaptureError> {
        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(config.read_timeout)
            .open()
            .map_err(|source| CaptureError::Connection {
                port: config.port.clone(),
                baud_rate: config.baud_rate,
                source,
            })?;

        tracing::info!(
            port = %config.port,
            baud_rate = config.baud_rate,
            "Connected to device"
        );

        Ok(Self {
            port,
            name: config.port.clone(),
            assembler: LineAssembler::new(),
        })
    }
}

impl LineSource for SerialSource {
    fn read_line(&mut self) -> Result<ReadOutcome, CaptureError> {
        if let Some(line) = self.assembler.next_line() {
            return Ok(ReadOutcome::Line(line));
        }

        let mut chunk = [0u8; READ_CHUNK];
        match self.port.read(&mut chunk) {
            Ok(n) => self.assembler.extend(&chunk[..n]),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {}
            Err(source) => {
                return Err(CaptureError::Read {
                    channel: self.name.clone(),
                    source,
                })
            }
        }

        Ok(match self.assembler.next_line() {
            Some(line) => ReadOutcome::Line(line),
            None => ReadOutcome::Idle,
        })
    }

    fn describe(&self) -> String {
        format!("serial:{}", self.name)
    }
}

impl Drop for SerialSource {
    fn drop(&mut self) {
        tracing::debug!(port = %self.name, "Closing serial port");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_missing_port_is_a_connection_error() {
        let config = SerialConfig {
            port: "/dev/benchplot-no-such-port".to_string(),
            baud_rate: 115_200,
            read_timeout: Duration::from_millis(100),
        };

        match SerialSource::open(&config) {
            Err(CaptureError::Connection { port, baud_rate, .. }) => {
                assert_eq!(port, "/dev/benchplot-no-such-port");
                assert_eq!(baud_rate, 115_200);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opened a port that does not exist"),
        }
    }
}
