//! apdiff - Compare two content streams for operational equivalence
//!
//! A command line tool that tokenizes two raw content-stream files and
//! reports whether they describe the same drawing program under a
//! numeric tolerance for real-valued operands.
//!
//! Exit codes: 0 the streams match, 1 they diverge, 2 a stream could not
//! be read or tokenized.

use apdiff_core::batch::{PairOutcome, compare_pair};
use apdiff_core::compare::{CompareOptions, DEFAULT_TOLERANCE};
use apdiff_core::error::Result;
use clap::{ArgAction, Parser};
use memmap2::Mmap;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Compare a regenerated appearance content stream against the reference
/// stream produced by an authoring tool.
#[derive(Parser, Debug)]
#[command(name = "apdiff")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the reference content stream
    reference: PathBuf,

    /// Path to the candidate (regenerated) content stream
    candidate: PathBuf,

    /// Numeric tolerance for real-valued operands (strict upper bound)
    #[arg(short = 't', long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Require value equality for name, string and composite operands
    /// instead of kind equality only
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Emit a JSON report instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Suppress output; the exit code carries the result
    #[arg(short = 'q', long, action = ArgAction::SetTrue)]
    quiet: bool,
}

/// Machine-readable report for --json.
#[derive(Serialize)]
struct JsonReport {
    result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<&'static str>,
}

impl JsonReport {
    fn from_outcome(outcome: &PairOutcome) -> Self {
        match outcome {
            PairOutcome::Pass => Self {
                result: "pass",
                index: None,
                kind: None,
                detail: None,
                stream: None,
            },
            PairOutcome::Diverged(mismatch) => Self {
                result: "diverged",
                index: Some(mismatch.index),
                kind: Some(mismatch.kind.as_str()),
                detail: Some(mismatch.detail.clone()),
                stream: None,
            },
            PairOutcome::Unparseable { role, error } => Self {
                result: "unparseable",
                index: None,
                kind: None,
                detail: Some(error.to_string()),
                stream: Some(role.as_str()),
            },
        }
    }
}

fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)?;
    Ok(unsafe { Mmap::map(&file) }?)
}

fn run(args: &Args) -> Result<PairOutcome> {
    let reference = map_file(&args.reference)?;
    let candidate = map_file(&args.candidate)?;

    let options = CompareOptions::new()
        .with_tolerance(args.tolerance)
        .with_strict_operand_equality(args.strict);

    Ok(compare_pair(&reference, &candidate, &options))
}

fn main() {
    let args = Args::parse();

    let outcome = match run(&args) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("apdiff: {e}");
            std::process::exit(2);
        }
    };

    if !args.quiet {
        if args.json {
            let report = JsonReport::from_outcome(&outcome);
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("apdiff: {e}");
                    std::process::exit(2);
                }
            }
        } else {
            println!("{outcome}");
        }
    }

    let code = match outcome {
        PairOutcome::Pass => 0,
        PairOutcome::Diverged(_) => 1,
        PairOutcome::Unparseable { .. } => 2,
    };
    std::process::exit(code);
}
