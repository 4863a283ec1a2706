//! Turns PLINK `--pca` eigenvector output into two CSV tables for plotting:
//! per-individual coordinates and per-population aesthetics (color, symbol).

pub mod config;
pub mod eigenvec;
pub mod emitter;
pub mod error;
pub mod format;
pub mod palette;

pub use config::RunConfig;
pub use eigenvec::{EigenvecReader, Record};
pub use emitter::{run, run_files, Emitter, RunState, RunSummary};
pub use error::{ConfigError, MalformedReason, OutputTable, ParseError, PipelineError};
pub use palette::{Color, PopulationEntry, PopulationPalette, SymbolColumn};
