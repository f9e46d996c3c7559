//! dumpstream - Dump the token sequence of a content stream
//!
//! A command line tool that tokenizes a raw content-stream file and
//! prints each top-level token with the byte offset it started at, in
//! source order, either as text or as a JSON array.

use apdiff_core::error::Result;
use apdiff_core::lexer::tokenize;
use apdiff_core::token::{CompositeKind, PrecisionHint, Token, TokenSequence};
use clap::{ArgAction, Parser};
use memmap2::Mmap;
use serde_json::{Value, json};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Dump the token sequence of a raw content-stream file.
#[derive(Parser, Debug)]
#[command(name = "dumpstream")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the content-stream file
    file: PathBuf,

    /// Emit a JSON array instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

/// Render one token as a JSON value; composites nest.
fn token_json(token: &Token) -> Value {
    match token {
        Token::Operator(name) => json!({ "operator": name }),
        Token::Numeric { value, precision } => json!({
            "numeric": value,
            "precision": match precision {
                PrecisionHint::Single => "single",
                PrecisionHint::Double => "double",
            },
        }),
        Token::Name(value) => json!({ "name": value }),
        Token::StringLiteral(bytes) => json!({
            "string": String::from_utf8_lossy(bytes),
        }),
        Token::CompositeOperand { kind, elements } => {
            let elements: Vec<Value> = elements.iter().map(token_json).collect();
            match kind {
                CompositeKind::Array => json!({ "array": elements }),
                CompositeKind::Dictionary => json!({ "dictionary": elements }),
            }
        }
    }
}

fn dump_json<W: Write>(out: &mut W, sequence: &TokenSequence) -> Result<()> {
    let entries: Vec<Value> = sequence
        .iter()
        .enumerate()
        .map(|(i, token)| {
            let mut entry = token_json(token);
            if let (Some(offset), Some(object)) = (sequence.offset(i), entry.as_object_mut()) {
                object.insert("offset".to_string(), json!(offset));
            }
            entry
        })
        .collect();
    let rendered = serde_json::to_string_pretty(&entries)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(out, "{rendered}")?;
    Ok(())
}

fn dump_text<W: Write>(out: &mut W, sequence: &TokenSequence) -> Result<()> {
    for (i, token) in sequence.iter().enumerate() {
        let offset = sequence.offset(i).unwrap_or(0);
        writeln!(out, "{offset:>8}  {:<10}  {token}", token.kind_name())?;
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let file = File::open(&args.file)?;
    let mmap = unsafe { Mmap::map(&file) }?;
    let sequence = tokenize(&mmap)?;

    let mut out = BufWriter::new(io::stdout());
    if args.json {
        dump_json(&mut out, &sequence)?;
    } else {
        dump_text(&mut out, &sequence)?;
    }
    out.flush()?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("dumpstream: {e}");
        std::process::exit(1);
    }
}
