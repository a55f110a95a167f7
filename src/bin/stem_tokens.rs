// src/bin/stem_tokens.rs
//
// Show how filenames are split into tokens and classified, without touching
// any spreadsheet.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use stemsheet::enrich::{keywords, FilenameTokens};
use tracing::debug;

#[derive(Parser)]
#[command(name = "stem-tokens")]
#[command(about = "Inspect filename tokens and instrumentation classification")]
struct Args {
    /// Filenames to inspect
    #[arg(required = true)]
    filenames: Vec<String>,

    /// Emit JSON lines instead of a table
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Inspection<'a> {
    filename: &'a str,
    #[serde(flatten)]
    tokens: FilenameTokens,
    vocal: bool,
    instrumentation: Option<&'static str>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("stem_tokens={},stemsheet={}", log_level, log_level))
        .with_writer(std::io::stderr)
        .init();

    let rows: Vec<Inspection> = args
        .filenames
        .iter()
        .map(|filename| {
            let tokens = FilenameTokens::parse(filename);
            debug!(filename = %filename, ?tokens, "parsed");
            Inspection {
                filename,
                vocal: tokens.is_vocal(),
                instrumentation: keywords::classify(&tokens.stem_suffix_formatted),
                tokens,
            }
        })
        .collect();

    if args.json {
        for row in &rows {
            let line = serde_json::to_string(row)
                .with_context(|| format!("serializing tokens of '{}'", row.filename))?;
            println!("{}", line);
        }
        return Ok(());
    }

    println!(
        "{: <40} {: <8} {: <25} {: <25} {: <6} {}",
        "Filename", "Track", "Title", "Stem", "Vocal", "Instrumentation"
    );
    println!("{:-<120}", "");
    for row in &rows {
        println!(
            "{: <40} {: <8} {: <25} {: <25} {: <6} {}",
            row.filename,
            row.tokens.track_number,
            row.tokens.main_title.as_deref().unwrap_or("-"),
            row.tokens.stem_suffix_formatted,
            if row.vocal { "yes" } else { "no" },
            row.instrumentation.unwrap_or("-"),
        );
    }
    Ok(())
}
