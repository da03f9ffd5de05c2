//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of DJ.
//! The DJ project belongs to the Dunimd project team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! The `dj` command line: applies a DJ script to every entry of an
//! input dictionary.
//!
//! The script comes from `-o <file>`, from the positional arguments, or
//! from both (the ad-hoc operations are appended to the file). The
//! dictionary comes from `-d <file>`, else from standard input.

use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use dj::eval::DjCEvaluator;
use dj::export::DjCOutputHub;
use dj::ingest::DjCDictionaryReader;
use dj::log::{DjCLogConfig, DjCLogger};
use dj::operations::DjCOperationRegistry;
use dj::script::{DjFParseScript, DjFResolveScript};
use dj::{DjError, Result};

/// Transforms, filters and generates dictionary entries.
#[derive(Parser, Debug)]
#[command(name = "dj", version, about, long_about = None)]
struct DjCCli {
    /// A .dj file with the operations applied to the dictionary entries.
    #[arg(short = 'o', long = "operations")]
    operations: Option<String>,

    /// The input dictionary (standard input if not specified).
    #[arg(short = 'd', long = "dictionary")]
    dictionary: Option<String>,

    /// Deduplicate all emissions globally (requires enough memory).
    #[arg(short = 'u', long = "unique")]
    unique: bool,

    /// Print configuration and initialization diagnostics.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Print a timing summary when the run completes.
    #[arg(short = 't', long = "timing")]
    timing: bool,

    /// Report every processed entry.
    #[arg(long)]
    progress: bool,

    /// Report throughput periodically.
    #[arg(long)]
    pace: bool,

    /// Trace every operation application (very verbose).
    #[arg(long)]
    trace: bool,

    /// Number of evaluation workers; entry output order is not
    /// preserved with more than one.
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Ad-hoc operations, appended to the operations file.
    #[arg(value_name = "OPS")]
    adhoc: Vec<String>,
}

fn run(cli: &DjCCli) -> Result<()> {
    let mut source = String::new();
    if let Some(path) = &cli.operations {
        source = fs::read_to_string(path).map_err(|err| DjError::io_path(path, err))?;
    }
    if !cli.adhoc.is_empty() {
        source.push('\n');
        source.push_str(&cli.adhoc.join(" "));
    }
    if source.trim().is_empty() {
        return Err(DjError::resolve(
            "no operations given; use -o or pass them as arguments",
        ));
    }

    let registry = DjCOperationRegistry::DjFWithDefaults();
    let script = DjFParseScript(&source, &registry)?;
    if cli.verbose {
        log::debug!("parsed script:\n{}", script.DjFToJson()?);
    }

    let program = DjFResolveScript(&script, &registry)?;
    let outputs = Arc::new(DjCOutputHub::DjFNew(cli.unique));
    let evaluator = DjCEvaluator::DjFNew(program, outputs)?;

    let reader = match &cli.dictionary {
        Some(path) => DjCDictionaryReader::DjFFromPath(path)?,
        None => DjCDictionaryReader::DjFFromStdin(),
    };

    let stats = evaluator.DjFRunParallel(reader, cli.workers.max(1))?;

    if cli.timing {
        let written = evaluator.outputs().DjFStats();
        let elapsed = stats.elapsed_seconds();
        let rate = if elapsed > 0.0 {
            stats.entries_read as f64 / elapsed
        } else {
            0.0
        };
        eprintln!(
            "[timing] {} entries ({} ignored) in {:.3}s ({:.0} entries/s), {} lines written ({} deduplicated)",
            stats.entries_read,
            stats.entries_ignored,
            elapsed,
            rate,
            written.lines_written,
            written.lines_deduplicated,
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = DjCCli::parse();
    DjCLogger::DjFInit(DjCLogConfig {
        verbose: cli.verbose,
        trace_ops: cli.trace,
        progress: cli.progress,
        pace: cli.pace,
    });

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
