//! Text line edge source.
//!
//! Reads frames as lines of `0`/`1` characters, one card per line, from any
//! buffered async reader. Used to replay captured traffic and to drive the
//! controller from a terminal without reader hardware.
//!
//! ```text
//! # 26-bit, facility 7, card 4660
//! 0 00000111 0001001000110100 0
//! ```
//!
//! Whitespace and `_` are ignored, `#` starts a comment. Each line's edges
//! are delivered back to back; the source then waits `line_gap` before the
//! next line so that frame capture sees the burst close.
//!
//! A line holding any other character is skipped whole and logged; reading
//! continues with the next line.

use crate::{HardwareError, Result, traits::EdgeSource, types::DeviceInfo};
use goldilock_core::EdgeKind;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{trace, warn};

/// Edge source fed by lines of bit characters.
pub struct LineEdgeSource {
    reader: Box<dyn AsyncBufRead + Send + Sync + Unpin>,
    name: String,
    line_gap: Duration,
    pending: VecDeque<EdgeKind>,
    line_number: usize,
    skipped_lines: usize,
    gap_due: bool,
}

impl LineEdgeSource {
    /// Read lines from `reader`.
    pub fn new(
        reader: impl AsyncBufRead + Send + Sync + Unpin + 'static,
        line_gap: Duration,
    ) -> Self {
        Self {
            reader: Box::new(reader),
            name: "Line reader".to_string(),
            line_gap,
            pending: VecDeque::new(),
            line_number: 0,
            skipped_lines: 0,
            gap_due: false,
        }
    }

    /// Read lines from standard input.
    pub fn stdin(line_gap: Duration) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), line_gap).with_name("stdin")
    }

    /// Set the device name reported by [`get_info`](EdgeSource::get_info).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Lines skipped because they held something other than bits.
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Edges of one line, or the first character that is not a bit.
    fn parse_line(line_number: usize, line: &str) -> Result<Vec<EdgeKind>> {
        let content = line.split('#').next().unwrap_or_default();
        let mut edges = Vec::with_capacity(content.len());

        for (position, c) in content.chars().enumerate() {
            if c.is_whitespace() || c == '_' {
                continue;
            }
            let edge = EdgeKind::from_char(c).ok_or_else(|| {
                HardwareError::invalid_data(format!(
                    "line {line_number}: unexpected '{c}' at column {}",
                    position + 1
                ))
            })?;
            edges.push(edge);
        }
        Ok(edges)
    }
}

impl fmt::Debug for LineEdgeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineEdgeSource")
            .field("name", &self.name)
            .field("line_gap", &self.line_gap)
            .field("pending", &self.pending.len())
            .field("line_number", &self.line_number)
            .field("skipped_lines", &self.skipped_lines)
            .finish_non_exhaustive()
    }
}

impl EdgeSource for LineEdgeSource {
    async fn next_edge(&mut self) -> Result<Option<EdgeKind>> {
        loop {
            if let Some(edge) = self.pending.pop_front() {
                return Ok(Some(edge));
            }

            if self.gap_due {
                tokio::time::sleep(self.line_gap).await;
                self.gap_due = false;
            }

            let mut line = String::new();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            match Self::parse_line(self.line_number, &line) {
                Ok(edges) if !edges.is_empty() => {
                    trace!(line = self.line_number, bits = edges.len(), "Frame line read");
                    self.pending.extend(edges);
                    self.gap_due = true;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(device = %self.name, error = %e, "Skipping malformed line");
                    self.skipped_lines += 1;
                }
            }
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Line edge source"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drain(source: &mut LineEdgeSource) -> Result<Vec<EdgeKind>> {
        let mut edges = Vec::new();
        while let Some(edge) = source.next_edge().await? {
            edges.push(edge);
        }
        Ok(edges)
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_bits_ignoring_separators_and_comments() {
        let input: &'static [u8] = b"# header\n1 0_1 # trailing\n\n01\n";
        let mut source = LineEdgeSource::new(input, Duration::from_millis(100));

        let edges = drain(&mut source).await.unwrap();

        use EdgeKind::{One, Zero};
        assert_eq!(edges, vec![One, Zero, One, Zero, One]);
        assert_eq!(source.line_number(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_between_frame_lines() {
        let input: &'static [u8] = b"11\n00\n";
        let mut source = LineEdgeSource::new(input, Duration::from_millis(100));
        let start = tokio::time::Instant::now();

        source.next_edge().await.unwrap();
        source.next_edge().await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(100));

        source.next_edge().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn test_parse_line_reports_position() {
        let err = LineEdgeSource::parse_line(3, "10x1\n").unwrap_err();
        assert!(matches!(err, HardwareError::InvalidData { .. }));
        assert_eq!(err.to_string(), "Invalid data: line 3: unexpected 'x' at column 3");
    }

    #[tokio::test]
    async fn test_malformed_line_is_skipped_whole() {
        let input: &'static [u8] = b"10x1\n011\n";
        let mut source = LineEdgeSource::new(input, Duration::ZERO);

        let edges = drain(&mut source).await.unwrap();

        use EdgeKind::{One, Zero};
        assert_eq!(edges, vec![Zero, One, One]);
        assert_eq!(source.skipped_lines(), 1);
        assert_eq!(source.line_number(), 2);
    }

    #[tokio::test]
    async fn test_empty_input_ends_immediately() {
        let input: &'static [u8] = b"";
        let mut source = LineEdgeSource::new(input, Duration::ZERO);
        assert_eq!(source.next_edge().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_info() {
        let input: &'static [u8] = b"";
        let source = LineEdgeSource::new(input, Duration::ZERO).with_name("replay");
        let info = source.get_info().await.unwrap();
        assert_eq!(info.name, "replay");
    }
}
