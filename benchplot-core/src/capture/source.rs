// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Line sources: the byte channels the collector reads from.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::error::CaptureError;

/// Result of one bounded read attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete line, decoded and trimmed. May be empty.
    Line(String),
    /// No complete line arrived within the channel's read timeout.
    Idle,
    /// The channel has no more data and never will.
    Closed,
}

/// A newline-delimited text channel.
///
/// `read_line` must return within the channel's own read timeout so callers
/// can check their deadlines between calls.
pub trait LineSource {
    fn read_line(&mut self) -> Result<ReadOutcome, CaptureError>;

    /// Short human-readable channel name for logs.
    fn describe(&self) -> String;
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn read_line(&mut self) -> Result<ReadOutcome, CaptureError> {
        (**self).read_line()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Reassembles lines from arbitrarily chunked reads.
///
/// Bytes of an unfinished line stay buffered across reads. Invalid UTF-8 is
/// replaced, never rejected.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Pop the next complete line, if one is buffered.
    pub fn next_line(&mut self) -> Option<String> {
        let newline = self.pending.iter().position(|&b| b == b'\n')?;
        let raw: Vec<u8> = self.pending.drain(..=newline).collect();
        Some(decode(&raw))
    }

    /// Pop whatever is left, used once the channel reports end of stream.
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.pending);
        Some(decode(&raw))
    }
}

fn decode(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim().to_string()
}

const READ_CHUNK: usize = 1024;

/// Replays a captured session log as if it were arriving from the device.
pub struct ReplaySource<R> {
    reader: R,
    assembler: LineAssembler,
    name: String,
    exhausted: bool,
}

impl ReplaySource<File> {
    /// Open a saved log file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CaptureError::ReplayOpen {
            path: PathBuf::from(path),
            source,
        })?;
        Ok(Self::new(file, path.display().to_string()))
    }
}

impl<R: Read> ReplaySource<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            assembler: LineAssembler::new(),
            name: name.into(),
            exhausted: false,
        }
    }
}

impl<R: Read> LineSource for ReplaySource<R> {
    fn read_line(&mut self) -> Result<ReadOutcome, CaptureError> {
        loop {
            if let Some(line) = self.assembler.next_line() {
                return Ok(ReadOutcome::Line(line));
            }

            if self.exhausted {
                return Ok(match self.assembler.flush() {
                    Some(line) => ReadOutcome::Line(line),
                    None => ReadOutcome::Closed,
                });
            }

            let mut chunk = [0u8; READ_CHUNK];
            match self.reader.read(&mut chunk) {
                Ok(0) => self.exhausted = true,
                Ok(n) => self.assembler.extend(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(CaptureError::Read {
                        channel: self.name.clone(),
                        source,
                    })
                }
            }
        }
    }

    fn describe(&self) -> String {
        format!("replay:{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_assembler_keeps_partial_line() {
        let mut assembler = LineAssembler::new();
        assembler.extend(b"Empty Lo");
        assert_eq!(assembler.next_line(), None);
        assembler.extend(b"op: Total Time: 5 \xC2\xB5s\r\nnext");
        assert_eq!(
            assembler.next_line().as_deref(),
            Some("Empty Loop: Total Time: 5 µs")
        );
        assert_eq!(assembler.next_line(), None);
        assert_eq!(assembler.flush().as_deref(), Some("next"));
        assert_eq!(assembler.flush(), None);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut assembler = LineAssembler::new();
        assembler.extend(b"bad \xFF\xFE bytes\n");
        let line = assembler.next_line().unwrap();
        assert!(line.starts_with("bad "));
        assert!(line.ends_with(" bytes"));
        assert!(line.contains('\u{FFFD}'));
    }

    #[test]
    fn test_replay_yields_lines_then_closes() {
        let data = Cursor::new(b"first\n\nsecond\nthird".to_vec());
        let mut source = ReplaySource::new(data, "memory");

        assert_eq!(source.read_line().unwrap(), ReadOutcome::Line("first".into()));
        assert_eq!(source.read_line().unwrap(), ReadOutcome::Line(String::new()));
        assert_eq!(source.read_line().unwrap(), ReadOutcome::Line("second".into()));
        assert_eq!(source.read_line().unwrap(), ReadOutcome::Line("third".into()));
        assert_eq!(source.read_line().unwrap(), ReadOutcome::Closed);
        assert_eq!(source.read_line().unwrap(), ReadOutcome::Closed);
    }

    #[test]
    fn test_replay_missing_file() {
        let result = ReplaySource::open("/nonexistent/session.log");
        assert!(matches!(result, Err(CaptureError::ReplayOpen { .. })));
    }
}
