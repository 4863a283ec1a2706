// emitter.rs
//
// Drives the eigenvec reader, writes the coordinates table row by row and
// feeds each population through the palette, then flushes the aesthetics table.

use crate::config::RunConfig;
use crate::eigenvec::EigenvecReader;
use crate::error::{OutputTable, PipelineError};
use crate::format::{format_general, COORDINATE_PRECISION};
use crate::palette::{PopulationPalette, SymbolColumn};
use indicatif::ProgressBar;
use log::{debug, info, warn};
use rand::Rng;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Lifecycle of one run. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    HeaderWritten,
    ReadingRecords,
    Finalizing,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub populations: usize,
}

/// CSV writer shared by both output tables: `\n` line endings, quoting only when needed.
pub(crate) fn csv_writer<W: Write>(sink: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(sink)
}

pub fn coordinates_header(num_pcs: usize) -> Vec<String> {
    let mut header = Vec::with_capacity(2 + num_pcs);
    header.push("Population".to_string());
    header.push("Individual".to_string());
    header.extend((1..=num_pcs).map(|i| format!("PC{}", i)));
    header
}

pub struct Emitter<G> {
    num_pcs: usize,
    skip_header: bool,
    palette: PopulationPalette<G>,
    state: RunState,
    records: usize,
    progress: ProgressBar,
}

impl<G: Rng> Emitter<G> {
    pub fn new(num_pcs: usize, rng: G) -> Self {
        Self {
            num_pcs,
            skip_header: false,
            palette: PopulationPalette::new(rng),
            state: RunState::Init,
            records: 0,
            progress: ProgressBar::hidden(),
        }
    }

    /// Ticks `progress` once per transcribed record.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn skip_header_line(mut self, skip: bool) -> Self {
        self.skip_header = skip;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn palette(&self) -> &PopulationPalette<G> {
        &self.palette
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Rejects a step unless the run is in `expected`; the current state is kept.
    fn require(&self, expected: RunState, next: RunState) -> Result<(), PipelineError> {
        if self.state != expected {
            return Err(PipelineError::InvalidState {
                from: self.state,
                to: next,
            });
        }
        Ok(())
    }

    fn guard<T>(&mut self, result: Result<T, PipelineError>) -> Result<T, PipelineError> {
        if result.is_err() {
            self.transition(RunState::Failed);
            self.progress.abandon();
        }
        result
    }

    /// Writes the coordinates table from `input` and collects populations.
    /// On error nothing further is written to `coords`. Only valid from `Init`.
    pub fn transcribe<R: BufRead, W: Write>(
        &mut self,
        input: R,
        coords: W,
    ) -> Result<(), PipelineError> {
        self.require(RunState::Init, RunState::HeaderWritten)?;
        let result = self.transcribe_inner(input, coords);
        self.guard(result)
    }

    fn transcribe_inner<R: BufRead, W: Write>(
        &mut self,
        input: R,
        coords: W,
    ) -> Result<(), PipelineError> {
        let table = OutputTable::Coordinates;
        let mut writer = csv_writer(coords);
        writer
            .write_record(coordinates_header(self.num_pcs))
            .map_err(PipelineError::write(table))?;
        self.transition(RunState::HeaderWritten);

        let mut reader = EigenvecReader::new(input, self.num_pcs);
        if self.skip_header {
            reader = reader.skip_header_line();
        }
        self.transition(RunState::ReadingRecords);

        let mut row: Vec<String> = Vec::with_capacity(2 + self.num_pcs);
        for record in reader {
            let record = record?;
            row.clear();
            row.push(record.population);
            row.push(record.individual);
            row.extend(
                record
                    .components
                    .iter()
                    .map(|&v| format_general(v, COORDINATE_PRECISION)),
            );
            writer
                .write_record(&row)
                .map_err(PipelineError::write(table))?;
            self.palette.ensure(&row[0]);
            self.records += 1;
            self.progress.inc(1);
        }

        writer.flush().map_err(PipelineError::write_io(table))?;
        info!(
            "Transcribed {} records covering {} populations.",
            self.records,
            self.palette.len()
        );
        Ok(())
    }

    /// Writes the aesthetics table in first-seen order and ends the run.
    /// Only valid after a successful `transcribe`.
    pub fn finish<W: Write>(
        &mut self,
        aesthetics: W,
        symbols: SymbolColumn,
    ) -> Result<RunSummary, PipelineError> {
        self.require(RunState::ReadingRecords, RunState::Finalizing)?;
        self.transition(RunState::Finalizing);
        let result = self.palette.write_table(aesthetics, symbols);
        self.guard(result)?;
        self.transition(RunState::Done);
        self.progress.finish_and_clear();
        Ok(RunSummary {
            records: self.records,
            populations: self.palette.len(),
        })
    }
}

/// Runs the whole pipeline over caller-supplied streams.
pub fn run<R, C, A, G>(
    input: R,
    coords: C,
    aesthetics: A,
    num_pcs: usize,
    rng: G,
) -> Result<RunSummary, PipelineError>
where
    R: BufRead,
    C: Write,
    A: Write,
    G: Rng,
{
    let mut emitter = Emitter::new(num_pcs, rng);
    emitter.transcribe(input, coords)?;
    emitter.finish(aesthetics, SymbolColumn::Index)
}

fn create_output_file(path: &Path) -> Result<BufWriter<File>, PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| PipelineError::Open {
                path: parent.to_path_buf(),
                source,
            })?;
            info!("Created output directory: {}", parent.display());
        }
    }
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| PipelineError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// File-based run. The aesthetics file is only created once the coordinates
/// table has been written completely.
pub fn run_files(
    config: &RunConfig,
    progress: ProgressBar,
) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    let start = Instant::now();

    info!("Reading eigenvectors from {}", config.eigenvec_path.display());
    let input = File::open(&config.eigenvec_path)
        .map(BufReader::new)
        .map_err(|source| PipelineError::Open {
            path: config.eigenvec_path.clone(),
            source,
        })?;

    let mut emitter = Emitter::new(config.num_pcs, config.color_rng())
        .skip_header_line(config.skip_header)
        .with_progress(progress);

    info!("Writing coordinates to {}", config.coords_path.display());
    let coords = create_output_file(&config.coords_path)?;
    if let Err(e) = emitter.transcribe(input, coords) {
        warn!(
            "{} is incomplete and must be discarded.",
            config.coords_path.display()
        );
        return Err(e);
    }

    if emitter.palette().is_empty() {
        warn!(
            "No records found in {}; aesthetics table will be empty.",
            config.eigenvec_path.display()
        );
    }

    info!("Writing aesthetics to {}", config.aesthetics_path.display());
    let aesthetics = create_output_file(&config.aesthetics_path)?;
    let summary = emitter.finish(aesthetics, config.symbols)?;

    info!(
        "Wrote {} coordinate rows and {} population rows in {:.2?}.",
        summary.records,
        summary.populations,
        start.elapsed()
    );
    Ok(summary)
}
