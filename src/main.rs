// main.rs

// --- External Crate Imports ---
use anyhow::{Context, Error, Result};
use clap::Parser;
use eigenvec_aesthetics::{run_files, SymbolColumn};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::time::{Duration, Instant};

// --- Main Function ---
fn main() -> Result<(), Error> {
    let total_time_start = Instant::now();
    let cli_args = cli::CliArgs::parse();

    // Initialize logger
    let log_level = cli_args
        .log_level
        .parse::<log::LevelFilter>()
        .unwrap_or_else(|_| {
            eprintln!(
                "Warning: Invalid log level '{}' provided. Defaulting to Info.",
                cli_args.log_level
            );
            log::LevelFilter::Info
        });
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_micros()
        .init();

    info!("Starting eigenvec_aesthetics with args: {:?}", cli_args);

    let config = cli_args.to_run_config();

    let pb_style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {pos} records ({per_sec})")
        .context("Failed to create progress spinner style")?;
    let progress = ProgressBar::new_spinner().with_style(pb_style);
    progress.enable_steady_tick(Duration::from_millis(120));

    let summary = run_files(&config, progress).with_context(|| {
        format!(
            "Failed to build {} and {} from {}",
            config.coords_path.display(),
            config.aesthetics_path.display(),
            config.eigenvec_path.display()
        )
    })?;

    info!(
        "{} and {} generated successfully ({} individuals, {} populations) in {:.2?}.",
        config.coords_path.display(),
        config.aesthetics_path.display(),
        summary.records,
        summary.populations,
        total_time_start.elapsed()
    );
    Ok(())
}

// --- Module Implementations ---

mod cli {
    use super::SymbolColumn;
    use clap::Parser; // For the derive macro to find Parser
    use eigenvec_aesthetics::config::{
        RunConfig, DEFAULT_AESTHETICS_FILE, DEFAULT_COORDS_FILE, DEFAULT_EIGENVEC_FILE,
    };
    use std::path::PathBuf;

    #[derive(Parser, Debug)]
    #[command(author, version, about = "PLINK eigenvec to PCA plotting tables.", long_about = None, propagate_version = true)]
    pub(crate) struct CliArgs {
        #[arg(short = 'i', long = "eigenvec", default_value = DEFAULT_EIGENVEC_FILE)]
        pub(crate) eigenvec: PathBuf,

        #[arg(short = 'k', long, required = true, value_parser = clap::value_parser!(u32).range(1..))]
        pub(crate) components: u32,

        #[arg(long = "coords-out", default_value = DEFAULT_COORDS_FILE)]
        pub(crate) coords_out: PathBuf,

        #[arg(long = "aesthetics-out", default_value = DEFAULT_AESTHETICS_FILE)]
        pub(crate) aesthetics_out: PathBuf,

        #[arg(long)]
        pub(crate) seed: Option<u64>,

        /// Write the plotting symbol code instead of its 0-23 index.
        #[arg(long)]
        pub(crate) symbol_codes: bool,

        /// Discard the first input line (PLINK 2 `#FID IID ...` header).
        #[arg(long)]
        pub(crate) skip_header: bool,

        #[arg(long, default_value = "Info")]
        pub(crate) log_level: String,
    }

    impl CliArgs {
        pub(crate) fn to_run_config(&self) -> RunConfig {
            let mut config = RunConfig::new(self.components as usize);
            config.eigenvec_path = self.eigenvec.clone();
            config.coords_path = self.coords_out.clone();
            config.aesthetics_path = self.aesthetics_out.clone();
            config.seed = self.seed;
            config.symbols = if self.symbol_codes {
                SymbolColumn::Code
            } else {
                SymbolColumn::Index
            };
            config.skip_header = self.skip_header;
            config
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_cli_defaults() {
            let args = CliArgs::try_parse_from(["eigenvec_aesthetics", "-k", "10"]).unwrap();
            let config = args.to_run_config();
            assert_eq!(config.num_pcs, 10);
            assert_eq!(config.eigenvec_path, PathBuf::from("plink.eigenvec"));
            assert_eq!(config.symbols, SymbolColumn::Index);
            assert!(!config.skip_header);
            assert_eq!(config.seed, None);
        }

        #[test]
        fn test_cli_overrides() {
            let args = CliArgs::try_parse_from([
                "eigenvec_aesthetics",
                "-k",
                "4",
                "-i",
                "run/plink2.eigenvec",
                "--coords-out",
                "out/coords.csv",
                "--seed",
                "7",
                "--symbol-codes",
                "--skip-header",
            ])
            .unwrap();
            let config = args.to_run_config();
            assert_eq!(config.eigenvec_path, PathBuf::from("run/plink2.eigenvec"));
            assert_eq!(config.coords_path, PathBuf::from("out/coords.csv"));
            assert_eq!(config.seed, Some(7));
            assert_eq!(config.symbols, SymbolColumn::Code);
            assert!(config.skip_header);
        }

        #[test]
        fn test_cli_requires_positive_components() {
            assert!(CliArgs::try_parse_from(["eigenvec_aesthetics"]).is_err());
            assert!(CliArgs::try_parse_from(["eigenvec_aesthetics", "-k", "0"]).is_err());
        }
    }
}
