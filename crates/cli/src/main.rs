//! Device log indexer CLI
//!
//! Runs the device log view over report documents and writes the emitted
//! `(key, value)` pairs to stdout as JSON lines.
//!
//! ## Usage
//!
//! ```text
//! devicelog-index index reports.ndjson --dimension tag_username
//! devicelog-index entries report.json
//! cat report.json | devicelog-index index
//! devicelog-index dimensions
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use devicelog_indexer::{IndexStats, IndexerConfig, InputDocument, KeyDimension, LogEntryIndexer};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

mod input;

#[derive(Parser, Debug)]
#[command(name = "devicelog-index", version, about = "Device log view indexer")]
struct Cli {
    /// Indexer config file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write one `{"key", "value"}` line per emission
    Index {
        /// Document files; reads stdin when omitted
        files: Vec<PathBuf>,

        /// Only emit these dimensions (repeatable)
        #[arg(long = "dimension", value_name = "NAME")]
        dimensions: Vec<KeyDimension>,

        /// Fail on documents that cannot be decoded
        #[arg(long)]
        strict: bool,
    },
    /// Write enriched log entries without key fan-out
    Entries {
        files: Vec<PathBuf>,

        #[arg(long)]
        strict: bool,
    },
    /// List key dimension names
    Dimensions,
}

fn main() -> Result<()> {
    // stdout carries data; logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let indexer = LogEntryIndexer::new(config);
    log::debug!("Indexer config: {:?}", indexer.config());

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Command::Index {
            files,
            dimensions,
            strict,
        } => {
            let mut total = IndexStats::new();
            for_each_document(&files, strict, |doc| {
                let mut emissions = indexer.index(doc);
                for emission in emissions.by_ref() {
                    let wanted = dimensions.is_empty()
                        || emission
                            .key
                            .dimension()
                            .is_some_and(|dimension| dimensions.contains(&dimension));
                    if !wanted {
                        continue;
                    }
                    serde_json::to_writer(&mut out, &emission)?;
                    out.write_all(b"\n")?;
                }
                total.merge(&emissions.stats());
                Ok(())
            })?;
            log::info!("Indexed {total}");
        }
        Command::Entries { files, strict } => {
            let mut count = 0usize;
            for_each_document(&files, strict, |doc| {
                for entry in indexer.enriched_entries(doc) {
                    serde_json::to_writer(&mut out, &entry)?;
                    out.write_all(b"\n")?;
                    count += 1;
                }
                Ok(())
            })?;
            log::info!("Wrote {count} entries");
        }
        Command::Dimensions => {
            for dimension in KeyDimension::ALL {
                writeln!(out, "{dimension}")?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<IndexerConfig> {
    match path {
        Some(path) => IndexerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(IndexerConfig::default()),
    }
}

/// Decode every document from `files` and hand it to `handle`.
///
/// Undecodable documents are logged and skipped, or abort the run in strict
/// mode.
fn for_each_document(
    files: &[PathBuf],
    strict: bool,
    mut handle: impl FnMut(&InputDocument) -> Result<()>,
) -> Result<()> {
    let mut failures = 0usize;
    for source in input::read_sources(files)? {
        for (position, decoded) in input::decode_documents(&source.text).into_iter().enumerate() {
            match decoded {
                Ok(doc) => handle(&doc)?,
                Err(err) if strict => {
                    bail!("{}: document {}: {err}", source.name, position + 1);
                }
                Err(err) => {
                    log::warn!("{}: skipping document {}: {err}", source.name, position + 1);
                    failures += 1;
                }
            }
        }
    }
    if failures > 0 {
        log::warn!("Skipped {failures} undecodable documents");
    }
    Ok(())
}
