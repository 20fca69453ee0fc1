//! One-shot SMILES cleanup pipeline: parse, standardize, deduplicate, and
//! optionally filter by token count before writing a training set.

use std::{
    collections::HashSet,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::PathBuf,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use thiserror::Error;

use crate::{rdkit::Preprocessor, tokenizer::SmilesTokenizer};

pub mod rdkit;
pub mod tokenizer;

/// Shortest token sequence kept by the pretraining-set filter, inclusive.
pub const MIN_TOKENS: usize = 34;
/// Longest token sequence kept by the pretraining-set filter, inclusive.
pub const MAX_TOKENS: usize = 128;

/// How often the length-filter stage reports progress.
const REPORT_EVERY: usize = 25_000;

#[derive(Debug, Error)]
pub enum Error {
    #[error("input file {} does not exist", .0.display())]
    MissingInput(PathBuf),
    #[error("output file {} already exists", .0.display())]
    OutputExists(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("rdkit call failed: {0}")]
    Rdkit(#[from] pyo3::PyErr),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Apply the [`MIN_TOKENS`]..=[`MAX_TOKENS`] token-count window after
    /// deduplication. Off when preparing fine-tuning sets.
    pub length_filter: bool,
    /// Suppress progress output.
    pub quiet: bool,
}

/// Per-stage counts reported at the end of a run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Counts {
    /// lines read from the input file
    pub read: usize,
    /// lines rdkit parsed and standardized
    pub standardized: usize,
    /// distinct canonical SMILES after deduplication
    pub unique: usize,
    /// strings the tokenizer rejected
    pub skipped: usize,
    /// strings that tokenized to an empty sequence
    pub timed_out: usize,
    /// lines written to the output file
    pub written: usize,
}

/// Run the whole pipeline: load, standardize, deduplicate, filter, write.
///
/// Both file preconditions are checked before any chemistry work so a bad
/// invocation aborts without touching the filesystem.
pub fn run(config: &Config) -> Result<Counts, Error> {
    if !config.input.exists() {
        return Err(Error::MissingInput(config.input.clone()));
    }
    if config.output.exists() {
        return Err(Error::OutputExists(config.output.clone()));
    }

    rdkit::disable_rdkit_logs()?;
    let pp = Preprocessor::new()?;
    let mut counts = Counts::default();

    let reader = BufReader::new(File::open(&config.input)?);
    let smiles = reader
        .lines()
        .map(|l| l.map(|l| l.trim_end().to_owned()))
        .collect::<Result<Vec<_>, _>>()?;
    counts.read = smiles.len();
    if !config.quiet {
        println!("read {} lines from {}", counts.read, config.input.display());
    }

    let bar = progress_bar(smiles.len() as u64, config.quiet);
    let mut standardized = Vec::with_capacity(smiles.len());
    for smi in &smiles {
        if let Some(smi) = pp.process(smi) {
            standardized.push(smi);
        }
        bar.inc(1);
    }
    bar.finish_and_clear();
    counts.standardized = standardized.len();

    // set semantics, iteration order unspecified
    let unique: Vec<String> = standardized
        .into_iter()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    counts.unique = unique.len();
    if !config.quiet {
        println!("{} unique SMILES after standardization", counts.unique);
    }

    let kept = if config.length_filter {
        filter_by_length(unique, &mut counts, config.quiet)
    } else {
        unique
    };
    counts.written = kept.len();

    // create_new re-enforces the output precondition at open time
    let mut out = BufWriter::new(File::create_new(&config.output)?);
    for smi in &kept {
        writeln!(out, "{smi}")?;
    }
    out.flush()?;
    if !config.quiet {
        println!(
            "wrote {} SMILES to {}",
            counts.written,
            config.output.display()
        );
    }

    Ok(counts)
}

/// Keep strings whose token count falls in [`MIN_TOKENS`]..=[`MAX_TOKENS`].
/// Tokenizer rejections and empty tokenizations are counted and dropped,
/// valid strings outside the window are dropped silently.
fn filter_by_length(smiles: Vec<String>, counts: &mut Counts, quiet: bool) -> Vec<String> {
    let st = SmilesTokenizer::new();
    let total = smiles.len();
    let mut kept = Vec::new();
    for (done, smi) in smiles.into_iter().enumerate() {
        match st.tokenize(&smi) {
            Err(_) => counts.skipped += 1,
            Ok(tokens) if tokens.is_empty() => counts.timed_out += 1,
            Ok(tokens) if (MIN_TOKENS..=MAX_TOKENS).contains(&tokens.len()) => {
                kept.push(smi)
            }
            Ok(_) => {}
        }
        if (done + 1) % REPORT_EVERY == 0 && !quiet {
            println!(
                "{} of {} checked, {} skipped, {} timed out",
                done + 1,
                total,
                counts.skipped,
                counts.timed_out
            );
        }
    }
    kept
}

fn progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len}")
            .expect("invalid template"),
    );
    bar
}

#[cfg(test)]
mod tests {
    use std::fs::{self, read_to_string};

    use tempfile::tempdir;

    use super::*;

    // every line gets its own terminator, so a trailing "" element really
    // produces an empty line in the file
    fn write_input(dir: &std::path::Path, lines: &[&str]) -> PathBuf {
        let path = dir.join("input.smi");
        let content: String = lines.iter().map(|l| format!("{l}\n")).collect();
        fs::write(&path, content).unwrap();
        path
    }

    fn cfg(input: PathBuf, output: PathBuf) -> Config {
        Config {
            input,
            output,
            length_filter: false,
            quiet: true,
        }
    }

    #[test]
    fn dedups_and_drops_invalid_lines() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), &["CCO", "CCO", "not-a-molecule", ""]);
        let output = dir.path().join("out.smi");
        let counts = run(&cfg(input, output.clone())).unwrap();
        assert_eq!(counts.read, 4);
        assert_eq!(counts.standardized, 2);
        assert_eq!(counts.unique, 1);
        assert_eq!(counts.written, 1);
        assert_eq!(read_to_string(&output).unwrap(), "CCO\n");
    }

    #[test]
    fn length_filter_keeps_only_the_token_window() {
        let dir = tempdir().unwrap();
        // 40 tokens, inside the window; CCO is far below it
        let chain = "C".repeat(40);
        let input = write_input(dir.path(), &["CCO", &chain]);
        let output = dir.path().join("out.smi");
        let mut config = cfg(input, output.clone());
        config.length_filter = true;
        let counts = run(&config).unwrap();
        assert_eq!(counts.unique, 2);
        assert_eq!(counts.skipped, 0);
        assert_eq!(counts.timed_out, 0);
        assert_eq!(counts.written, 1);
        assert_eq!(read_to_string(&output).unwrap(), format!("{chain}\n"));
    }

    #[test]
    fn without_the_filter_output_equals_the_deduplicated_set() {
        let dir = tempdir().unwrap();
        let chain = "C".repeat(40);
        let input = write_input(dir.path(), &["CCO", &chain, "OCC"]);
        let output = dir.path().join("out.smi");
        let counts = run(&cfg(input, output.clone())).unwrap();
        assert_eq!(counts.unique, 2);
        assert_eq!(counts.written, 2);
        let got: HashSet<String> = read_to_string(&output)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect();
        assert_eq!(got, HashSet::from(["CCO".to_owned(), chain]));
    }

    #[test]
    fn length_filter_counts_rejects_and_empty_tokenizations() {
        let chain = "C".repeat(40);
        let mut counts = Counts::default();
        let kept = filter_by_length(
            vec![
                chain.clone(),
                "CxC".to_owned(),
                String::new(),
                "CCO".to_owned(),
            ],
            &mut counts,
            true,
        );
        assert_eq!(kept, [chain]);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.timed_out, 1);
    }

    #[test]
    fn existing_output_is_fatal_and_untouched() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), &["CCO"]);
        let output = dir.path().join("out.smi");
        run(&cfg(input.clone(), output.clone())).unwrap();
        let first = read_to_string(&output).unwrap();
        let err = run(&cfg(input, output.clone())).unwrap_err();
        assert!(matches!(err, Error::OutputExists(_)));
        assert_eq!(read_to_string(&output).unwrap(), first);
    }

    #[test]
    fn missing_input_is_fatal_and_writes_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.smi");
        let err = run(&cfg(dir.path().join("nope.smi"), output.clone())).unwrap_err();
        assert!(matches!(err, Error::MissingInput(_)));
        assert!(!output.exists());
    }
}
