// error.rs

use crate::emitter::RunState;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a record could not be turned into a [`crate::eigenvec::Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum MalformedReason {
    /// Input ended part-way through a record.
    Truncated { expected: usize, found: usize },
    /// A principal-component token was not a finite decimal number.
    InvalidComponent { pc: usize, token: String },
    /// The line holding the record is not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { expected, found } => write!(
                f,
                "input ended after {} of {} expected tokens",
                found, expected
            ),
            Self::InvalidComponent { pc, token } => {
                write!(f, "PC{} value '{}' is not a finite number", pc, token)
            }
            Self::InvalidUtf8 => f.write_str("line is not valid UTF-8"),
        }
    }
}

/// Errors produced while reading an eigenvec stream.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Record index is 0-based.
    #[error("Malformed record {record}: {reason}")]
    MalformedRecord { record: usize, reason: MalformedReason },

    #[error("I/O error while reading eigenvec input: {0}")]
    Io(#[from] std::io::Error),
}

/// The two tables a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTable {
    Coordinates,
    Aesthetics,
}

impl fmt::Display for OutputTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Coordinates => "coordinates",
            Self::Aesthetics => "aesthetics",
        })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Number of principal components must be at least 1, got {0}.")]
    NoComponents(usize),
}

/// Any failure that aborts a run. Bytes already written to a sink stay there
/// but must not be treated as valid output.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Writing the {table} table failed: {source}")]
    Write {
        table: OutputTable,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to open {}: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// An emitter step was called out of order or after the run ended.
    #[error("Run cannot move from {from:?} to {to:?}")]
    InvalidState { from: RunState, to: RunState },
}

impl PipelineError {
    pub(crate) fn write(table: OutputTable) -> impl FnOnce(csv::Error) -> Self {
        move |source| Self::Write { table, source }
    }

    pub(crate) fn write_io(table: OutputTable) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Self::Write {
            table,
            source: source.into(),
        }
    }

    /// 0-based index of the offending record, for parse failures.
    pub fn malformed_record(&self) -> Option<usize> {
        match self {
            Self::Parse(ParseError::MalformedRecord { record, .. }) => Some(*record),
            _ => None,
        }
    }
}
