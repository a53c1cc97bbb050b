// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Prints crash record files, or batch bodies captured on the collector side, as JSON.

use anyhow::Context;
use clap::Parser;
use libdd_crashlog::codec::Batch;
use libdd_crashlog::shared::constants::{RECORD_FILE_EXTENSION, RECORD_FILE_PREFIX};
use libdd_crashlog::CrashRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crashlog-dump")]
#[command(about = "Decode crash record files or batch bodies to JSON")]
struct Args {
    /// Treat the inputs as batch bodies instead of single record files
    #[arg(long)]
    batch: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Files to decode. A directory stands for the record files it contains.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    let args = Args::parse();
    let mut failures = 0;
    for path in expand(&args.paths)? {
        match dump(&path, args.batch, args.pretty) {
            Ok(()) => debug!("decoded {}", path.display()),
            Err(e) => {
                warn!("{}: {e:#}", path.display());
                failures += 1;
            }
        }
    }
    anyhow::ensure!(failures == 0, "{failures} inputs could not be decoded");
    Ok(())
}

fn expand(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = vec![];
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found = vec![];
        for entry in fs::read_dir(path).with_context(|| format!("listing {}", path.display()))? {
            let entry_path = entry?.path();
            if is_record_file(&entry_path) {
                found.push(entry_path);
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn is_record_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(RECORD_FILE_PREFIX))
        && path
            .extension()
            .is_some_and(|ext| ext == RECORD_FILE_EXTENSION)
}

fn dump(path: &Path, batch: bool, pretty: bool) -> anyhow::Result<()> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let decoded = if batch {
        serde_json::to_value(Batch::from_bytes(&bytes)?)?
    } else {
        serde_json::to_value(CrashRecord::from_bytes(&bytes)?)?
    };
    let output = serde_json::json!({
        "file": path.display().to_string(),
        "content": decoded,
    });
    if pretty {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{output}");
    }
    Ok(())
}
