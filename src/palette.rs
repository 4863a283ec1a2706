// palette.rs
//
// Population -> (color, plotting symbol) allocation in first-seen order.

use crate::error::{OutputTable, PipelineError};
use log::debug;
use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// R `pch` codes cycled through by arrival order.
pub const SYMBOL_CODES: [u8; 24] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 21, 22, 23, 24, 25, 15, 17, 18, 19,
];

pub const NUM_SYMBOLS: usize = SYMBOL_CODES.len();

pub const AESTHETICS_HEADER: [&str; 3] = ["Population", "colorNr", "symbolNr"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub fn random<G: Rng + ?Sized>(rng: &mut G) -> Self {
        Self {
            red: rng.random(),
            green: rng.random(),
            blue: rng.random(),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a #RRGGBB color", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| ParseColorError(s.to_string()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Self {
            red: channel(0)?,
            green: channel(2)?,
            blue: channel(4)?,
        })
    }
}

/// One row of the aesthetics table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationEntry {
    pub population: String,
    pub color: Color,
    /// Position in [`SYMBOL_CODES`], `0..24`.
    pub symbol_index: usize,
}

impl PopulationEntry {
    pub fn symbol_code(&self) -> u8 {
        SYMBOL_CODES[self.symbol_index % NUM_SYMBOLS]
    }
}

/// What the `symbolNr` column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolColumn {
    /// Arrival order modulo 24.
    #[default]
    Index,
    /// The plotting code at that index in [`SYMBOL_CODES`].
    Code,
}

/// Insertion-ordered table of populations, each given a random color and a
/// symbol cycling by first appearance.
pub struct PopulationPalette<G> {
    rng: G,
    entries: Vec<PopulationEntry>,
    index: HashMap<String, usize>,
}

impl<G: Rng> PopulationPalette<G> {
    pub fn new(rng: G) -> Self {
        Self {
            rng,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the entry for `population`, allocating one on first sight.
    /// Repeat calls never touch the RNG or change the stored entry.
    pub fn ensure(&mut self, population: &str) -> &PopulationEntry {
        let slot = match self.index.get(population).copied() {
            Some(slot) => slot,
            None => {
                let slot = self.entries.len();
                let entry = PopulationEntry {
                    population: population.to_string(),
                    color: Color::random(&mut self.rng),
                    symbol_index: slot % NUM_SYMBOLS,
                };
                debug!(
                    "New population #{} '{}': color {}, symbol {}",
                    slot, entry.population, entry.color, entry.symbol_index
                );
                self.index.insert(entry.population.clone(), slot);
                self.entries.push(entry);
                slot
            }
        };
        &self.entries[slot]
    }
}

impl<G> PopulationPalette<G> {
    pub fn get(&self, population: &str) -> Option<&PopulationEntry> {
        self.index.get(population).map(|&slot| &self.entries[slot])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in allocation order.
    pub fn entries(&self) -> impl Iterator<Item = &PopulationEntry> {
        self.entries.iter()
    }

    /// Writes `Population,colorNr,symbolNr` followed by one row per entry.
    pub fn write_table<W: Write>(
        &self,
        sink: W,
        symbols: SymbolColumn,
    ) -> Result<(), PipelineError> {
        let table = OutputTable::Aesthetics;
        let mut writer = crate::emitter::csv_writer(sink);
        writer
            .write_record(AESTHETICS_HEADER)
            .map_err(PipelineError::write(table))?;
        for entry in &self.entries {
            let symbol = match symbols {
                SymbolColumn::Index => entry.symbol_index.to_string(),
                SymbolColumn::Code => entry.symbol_code().to_string(),
            };
            let color = entry.color.to_string();
            writer
                .write_record([entry.population.as_str(), color.as_str(), symbol.as_str()])
                .map_err(PipelineError::write(table))?;
        }
        writer.flush().map_err(PipelineError::write_io(table))?;
        debug!("Wrote {} aesthetics rows.", self.entries.len());
        Ok(())
    }
}
