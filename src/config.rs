// config.rs

use crate::error::ConfigError;
use crate::palette::SymbolColumn;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

pub const DEFAULT_EIGENVEC_FILE: &str = "plink.eigenvec";
pub const DEFAULT_COORDS_FILE: &str = "PCA_Data.csv";
pub const DEFAULT_AESTHETICS_FILE: &str = "PCA_Aesthetics.csv";

/// Everything a file-based run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub eigenvec_path: PathBuf,
    pub coords_path: PathBuf,
    pub aesthetics_path: PathBuf,
    pub num_pcs: usize,
    /// Colors are drawn from OS entropy when unset.
    pub seed: Option<u64>,
    pub symbols: SymbolColumn,
    pub skip_header: bool,
}

impl RunConfig {
    pub fn new(num_pcs: usize) -> Self {
        Self {
            eigenvec_path: PathBuf::from(DEFAULT_EIGENVEC_FILE),
            coords_path: PathBuf::from(DEFAULT_COORDS_FILE),
            aesthetics_path: PathBuf::from(DEFAULT_AESTHETICS_FILE),
            num_pcs,
            seed: None,
            symbols: SymbolColumn::Index,
            skip_header: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_pcs == 0 {
            return Err(ConfigError::NoComponents(self.num_pcs));
        }
        Ok(())
    }

    pub fn color_rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => {
                info!("Seeding color generator with {}.", seed);
                ChaCha8Rng::seed_from_u64(seed)
            }
            None => ChaCha8Rng::from_os_rng(),
        }
    }
}
