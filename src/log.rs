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

//! Diagnostic reporting for the interpreter. All channels write to stderr;
//! stdout is reserved for `report` and `result` emissions.
//!
//! Three channels exist besides the plain leveled log: the per-entry
//! progress channel (`--progress`), the throughput pace channel (`--pace`)
//! and the operation trace channel (`--trace`), which shows every
//! operation application together with its input and outcome.

use std::io::Write;
use std::sync::OnceLock;

use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};

/// Number of processed entries between two pace reports.
const PACE_WINDOW: u64 = 10_000;

#[derive(Clone, Copy, Debug, Default)]
pub struct DjCLogConfig {
    /// Emit `[debug]` diagnostics (`-v`).
    pub verbose: bool,
    /// Emit a `[trace]` line per operation application (`--trace`).
    pub trace_ops: bool,
    /// Emit a `[progress]` line per input entry (`--progress`).
    pub progress: bool,
    /// Emit periodic throughput reports (`--pace`).
    pub pace: bool,
}

static CONFIG: OnceLock<DjCLogConfig> = OnceLock::new();
static LOGGER: DjCLogger = DjCLogger;

/// Stderr logger backing the `log` facade. The first `DjFInit` wins;
/// later calls are ignored, which keeps test runs safe.
#[derive(Debug, Default)]
pub struct DjCLogger;

impl DjCLogger {
    #[allow(non_snake_case)]
    pub fn DjFInit(config: DjCLogConfig) {
        let first = CONFIG.set(config).is_ok();
        if first {
            let level = if config.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            };
            let _ = log::set_logger(&LOGGER).map(|_| log::set_max_level(level));
        }
    }

    fn config() -> DjCLogConfig {
        CONFIG.get().copied().unwrap_or_default()
    }

    #[allow(non_snake_case)]
    pub fn DjFTraceEnabled() -> bool {
        Self::config().trace_ops
    }

    /// One `[trace]` line per operation application.
    #[allow(non_snake_case)]
    pub fn DjFTraceOp(op: &str, input: &[String], outcome: &str) {
        if Self::config().trace_ops {
            eprintln!("[trace] {} ( [{}] ) => {}", op, input.join(", "), outcome);
        }
    }

    /// One `[progress]` line per input entry.
    #[allow(non_snake_case)]
    pub fn DjFProgress(no: u64, entry: &str, ignored: bool) {
        if Self::config().progress {
            if ignored {
                eprintln!("[progress] ignoring   #{}: {}", no, entry);
            } else {
                eprintln!("[progress] processing #{}: {}", no, entry);
            }
        }
    }

    /// Throughput report, emitted every [`PACE_WINDOW`] entries.
    #[allow(non_snake_case)]
    pub fn DjFPace(processed: u64, started: DateTime<Local>) {
        if !Self::config().pace || processed == 0 || processed % PACE_WINDOW != 0 {
            return;
        }
        let elapsed = Local::now().signed_duration_since(started);
        let secs = elapsed.num_milliseconds() as f64 / 1000.0;
        if secs > 0.0 {
            eprintln!(
                "[pace] {} entries in {:.1}s ({:.0} entries/s)",
                processed,
                secs,
                processed as f64 / secs
            );
        }
    }
}

impl log::Log for DjCLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug | Level::Trace => "debug",
        };
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "[{}] {}", tag, record.args());
    }

    fn flush(&self) {}
}
