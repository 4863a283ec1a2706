use eigenvec_aesthetics::{run_files, Color, PipelineError, RunConfig, SymbolColumn};
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

fn config_in(dir: &Path, eigenvec: &str, num_pcs: usize) -> RunConfig {
    let input = dir.join("plink.eigenvec");
    fs::write(&input, eigenvec).unwrap();
    let mut config = RunConfig::new(num_pcs);
    config.eigenvec_path = input;
    config.coords_path = dir.join("PCA_Data.csv");
    config.aesthetics_path = dir.join("PCA_Aesthetics.csv");
    config.seed = Some(42);
    config
}

fn plink_fixture(populations: usize, per_population: usize) -> String {
    let mut text = String::new();
    for ind in 0..per_population {
        for pop in 0..populations {
            text.push_str(&format!(
                "POP{} POP{}_{} {:.6} {:.6} {:.6}\n",
                pop,
                pop,
                ind,
                pop as f64 * 0.01 - 0.1,
                ind as f64 * 0.002,
                0.0001 * (pop * ind) as f64
            ));
        }
    }
    text
}

#[test]
fn writes_both_tables() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), &plink_fixture(30, 3), 3);

    let summary = run_files(&config, ProgressBar::hidden()).unwrap();
    assert_eq!(summary.records, 90);
    assert_eq!(summary.populations, 30);

    let coords = fs::read_to_string(&config.coords_path).unwrap();
    let lines: Vec<&str> = coords.lines().collect();
    assert_eq!(lines[0], "Population,Individual,PC1,PC2,PC3");
    assert_eq!(lines.len(), 91);
    assert_eq!(lines[1], "POP0,POP0_0,-0.1,0,0");

    let aesthetics = fs::read_to_string(&config.aesthetics_path).unwrap();
    let rows: Vec<Vec<&str>> = aesthetics
        .lines()
        .skip(1)
        .map(|l| l.split(',').collect())
        .collect();
    assert_eq!(rows.len(), 30);
    let names: HashSet<&str> = rows.iter().map(|r| r[0]).collect();
    assert_eq!(names.len(), 30, "populations must be unique");
    for (k, row) in rows.iter().enumerate() {
        assert_eq!(row[0], format!("POP{}", k));
        assert!(row[1].parse::<Color>().is_ok());
        assert_eq!(row[2], (k % 24).to_string());
    }
}

#[test]
fn same_seed_reproduces_aesthetics() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), &plink_fixture(5, 2), 3);
    run_files(&config, ProgressBar::hidden()).unwrap();
    let first = fs::read_to_string(&config.aesthetics_path).unwrap();
    run_files(&config, ProgressBar::hidden()).unwrap();
    let second = fs::read_to_string(&config.aesthetics_path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn symbol_codes_and_plink2_header() {
    let dir = tempfile::tempdir().unwrap();
    let input = format!("#FID\tIID\tPC1\tPC2\tPC3\n{}", plink_fixture(17, 1));
    let mut config = config_in(dir.path(), &input, 3);
    config.skip_header = true;
    config.symbols = SymbolColumn::Code;

    run_files(&config, ProgressBar::hidden()).unwrap();
    let aesthetics = fs::read_to_string(&config.aesthetics_path).unwrap();
    let last = aesthetics.lines().last().unwrap();
    assert!(last.starts_with("POP16,"));
    assert!(last.ends_with(",22"), "{}", last);
}

#[test]
fn parse_failure_leaves_no_aesthetics_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = "A a1 0.1 0.2\nB b1 0.3\n";
    let config = config_in(dir.path(), input, 2);

    let err = run_files(&config, ProgressBar::hidden()).unwrap_err();
    assert_eq!(err.malformed_record(), Some(1));
    assert!(err.to_string().contains("record 1"));
    assert!(!config.aesthetics_path.exists());

    let coords = fs::read_to_string(&config.coords_path).unwrap();
    assert_eq!(coords, "Population,Individual,PC1,PC2\nA,a1,0.1,0.2\n");
}

#[test]
fn missing_input_is_reported_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = RunConfig::new(2);
    config.eigenvec_path = dir.path().join("absent.eigenvec");
    config.coords_path = dir.path().join("out").join("PCA_Data.csv");

    match run_files(&config, ProgressBar::hidden()) {
        Err(PipelineError::Open { path, .. }) => assert_eq!(path, config.eigenvec_path),
        other => panic!("expected open failure, got {:?}", other),
    }
    assert!(!config.coords_path.exists());
}

#[test]
fn output_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path(), "A a 1\n", 1);
    config.coords_path = dir.path().join("nested").join("PCA_Data.csv");
    config.aesthetics_path = dir.path().join("nested").join("PCA_Aesthetics.csv");
    run_files(&config, ProgressBar::hidden()).unwrap();
    assert!(config.coords_path.exists());
    assert!(config.aesthetics_path.exists());
}

#[test]
fn zero_components_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "A a\n", 0);
    assert!(matches!(
        run_files(&config, ProgressBar::hidden()),
        Err(PipelineError::Config(_))
    ));
}
