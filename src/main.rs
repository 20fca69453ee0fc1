use std::{
    error::Error,
    fs::File,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use desalt::{Config, Counts};

/// Clean up a raw SMILES list: drop unparseable lines, strip salts and
/// stereochemistry, neutralize charges, canonicalize, and deduplicate.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// File with one raw SMILES per line. Must exist.
    input: PathBuf,

    /// File to write the cleaned SMILES to. Must not already exist.
    output: PathBuf,

    /// Prepare a fine-tuning set: keep every deduplicated SMILES instead
    /// of applying the 34-128 token window used for pretraining sets
    #[arg(short, long)]
    finetune: bool,

    /// Write a JSON summary of the per-stage counts to FILE
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config {
        input: cli.input,
        output: cli.output,
        length_filter: !cli.finetune,
        quiet: cli.quiet,
    };
    let counts = match desalt::run(&config) {
        Ok(counts) => counts,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = &cli.report {
        if let Err(e) = write_report(path, &counts) {
            eprintln!("error: failed to write report: {e}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn write_report(path: &Path, counts: &Counts) -> Result<(), Box<dyn Error>> {
    serde_json::to_writer_pretty(File::create(path)?, counts)?;
    Ok(())
}
