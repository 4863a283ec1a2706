// eigenvec.rs
//
// Streaming reader for PLINK `.eigenvec` output: records of
// `population individual PC1 .. PCk`, separated by arbitrary whitespace.

use crate::error::{MalformedReason, ParseError};
use log::{debug, trace};
use std::collections::VecDeque;
use std::io::BufRead;

/// One individual's row from the eigenvec file.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub population: String,
    pub individual: String,
    pub components: Vec<f64>,
}

/// Produces [`Record`]s from whitespace-delimited eigenvec text.
///
/// Each record is exactly `2 + num_pcs` tokens and may wrap across lines.
/// The iterator is fused: after the first error it only yields `None`.
pub struct EigenvecReader<R> {
    reader: R,
    num_pcs: usize,
    pending: VecDeque<String>,
    line: Vec<u8>,
    records_read: usize,
    skip_header: bool,
    exhausted: bool,
    failed: bool,
}

impl<R: BufRead> EigenvecReader<R> {
    pub fn new(reader: R, num_pcs: usize) -> Self {
        Self {
            reader,
            num_pcs,
            pending: VecDeque::new(),
            line: Vec::new(),
            records_read: 0,
            skip_header: false,
            exhausted: false,
            failed: false,
        }
    }

    /// Discards the first physical line, e.g. PLINK 2's `#FID IID PC1 ...` header.
    pub fn skip_header_line(mut self) -> Self {
        self.skip_header = true;
        self
    }

    /// Number of complete records yielded so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    fn tokens_per_record(&self) -> usize {
        2 + self.num_pcs
    }

    /// Reads lines until at least `wanted` tokens are buffered or input ends.
    /// A line that is not UTF-8 is reported against the record its first token would start.
    fn fill(&mut self, wanted: usize) -> Result<(), ParseError> {
        while self.pending.len() < wanted && !self.exhausted {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                self.exhausted = true;
                break;
            }
            if self.skip_header {
                self.skip_header = false;
                debug!(
                    "Skipping eigenvec header line: {}",
                    String::from_utf8_lossy(&self.line).trim_end()
                );
                continue;
            }
            let text = std::str::from_utf8(&self.line).map_err(|_| {
                ParseError::MalformedRecord {
                    record: self.records_read + self.pending.len() / wanted.max(1),
                    reason: MalformedReason::InvalidUtf8,
                }
            })?;
            self.pending.extend(text.split_whitespace().map(str::to_owned));
        }
        Ok(())
    }

    fn read_record(&mut self) -> Result<Option<Record>, ParseError> {
        let wanted = self.tokens_per_record();
        self.fill(wanted)?;

        if self.pending.is_empty() {
            debug!("Eigenvec input exhausted after {} records.", self.records_read);
            return Ok(None);
        }
        if self.pending.len() < wanted {
            return Err(ParseError::MalformedRecord {
                record: self.records_read,
                reason: MalformedReason::Truncated {
                    expected: wanted,
                    found: self.pending.len(),
                },
            });
        }

        let mut tokens = self.pending.drain(..wanted);
        let (population, individual) = match (tokens.next(), tokens.next()) {
            (Some(p), Some(i)) => (p, i),
            // drain(..wanted) always yields `wanted >= 2` tokens
            _ => unreachable!("record drained fewer than two tokens"),
        };

        let mut components = Vec::with_capacity(self.num_pcs);
        for (idx, token) in tokens.enumerate() {
            match token.parse::<f64>() {
                Ok(value) if value.is_finite() => components.push(value),
                _ => {
                    return Err(ParseError::MalformedRecord {
                        record: self.records_read,
                        reason: MalformedReason::InvalidComponent {
                            pc: idx + 1,
                            token,
                        },
                    });
                }
            }
        }

        trace!("Parsed record {}: {} {}", self.records_read, population, individual);
        self.records_read += 1;
        Ok(Some(Record {
            population,
            individual,
            components,
        }))
    }
}

impl<R: BufRead> Iterator for EigenvecReader<R> {
    type Item = Result<Record, ParseError>;

    fn next(&mut self) -> Option<Result<Record, ParseError>> {
        if self.failed {
            return None;
        }
        match self.read_record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for EigenvecReader<R> {}
