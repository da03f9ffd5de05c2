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

//! The output hub.
//!
//! All emissions (`report`, `result` to stdout; `write` to files) pass
//! through one shared hub. File handles are opened in append mode on
//! first use and kept for the lifetime of the run; `create` directives
//! truncate their files before processing starts. Each entry's buffered
//! emissions are flushed in one call while holding the hub's locks,
//! which keeps per-entry output contiguous even with parallel workers.
//!
//! With global deduplication enabled (`-u`), a line that has been
//! emitted before - to any target - is silently dropped.

use std::collections::{HashMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::Mutex;

use crate::errors::{DjError, Result};
use crate::runtime::DjCEmitTarget;

/// Counters over everything the hub has written.
#[derive(Clone, Copy, Debug, Default)]
pub struct DjCWriteStats {
    pub lines_written: u64,
    pub lines_deduplicated: u64,
}

#[derive(Debug)]
enum DjCStdoutSink {
    Console,
    /// Test harness mode: stdout lines are collected instead of printed.
    Captured(Vec<String>),
}

/// Shared emission hub for one interpreter run.
#[derive(Debug)]
pub struct DjCOutputHub {
    unique: bool,
    stdout: Mutex<DjCStdoutSink>,
    files: Mutex<HashMap<String, BufWriter<File>>>,
    seen: Mutex<HashSet<String>>,
    stats: Mutex<DjCWriteStats>,
}

impl Default for DjCOutputHub {
    fn default() -> Self {
        Self::DjFNew(false)
    }
}

impl DjCOutputHub {
    #[allow(non_snake_case)]
    pub fn DjFNew(unique: bool) -> Self {
        DjCOutputHub {
            unique,
            stdout: Mutex::new(DjCStdoutSink::Console),
            files: Mutex::new(HashMap::new()),
            seen: Mutex::new(HashSet::new()),
            stats: Mutex::new(DjCWriteStats::default()),
        }
    }

    /// A hub that collects stdout lines instead of printing them; used
    /// by the test suite to observe `report`/`result` output.
    #[allow(non_snake_case)]
    pub fn DjFNewCaptured(unique: bool) -> Self {
        let hub = Self::DjFNew(unique);
        *hub.stdout.lock().expect("stdout lock") = DjCStdoutSink::Captured(Vec::new());
        hub
    }

    /// Returns and clears the captured stdout lines.
    #[allow(non_snake_case)]
    pub fn DjFCapturedStdout(&self) -> Vec<String> {
        let mut sink = self.stdout.lock().expect("stdout lock");
        match &mut *sink {
            DjCStdoutSink::Console => Vec::new(),
            DjCStdoutSink::Captured(lines) => std::mem::take(lines),
        }
    }

    /// Truncates the file at path; the `create` directive. Idempotent
    /// within one run.
    #[allow(non_snake_case)]
    pub fn DjFCreate(&self, path: &str) -> Result<()> {
        let file = File::create(path).map_err(|err| DjError::io_path(path, err))?;
        let mut files = self.files.lock().expect("files lock");
        files.insert(path.to_string(), BufWriter::new(file));
        Ok(())
    }

    fn open_file<'f>(
        files: &'f mut HashMap<String, BufWriter<File>>,
        path: &str,
    ) -> Result<&'f mut BufWriter<File>> {
        if !files.contains_key(path) {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| DjError::io_path(path, err))?;
            files.insert(path.to_string(), BufWriter::new(file));
        }
        Ok(files.get_mut(path).expect("file handle just inserted"))
    }

    /// Writes one entry's buffered emissions. The whole batch is written
    /// while holding the relevant locks so that lines of different
    /// entries never interleave.
    #[allow(non_snake_case)]
    pub fn DjFFlush(&self, emissions: Vec<(DjCEmitTarget, String)>) -> Result<()> {
        let mut written = 0u64;
        let mut deduplicated = 0u64;
        let mut stdout = self.stdout.lock().expect("stdout lock");
        let mut files = self.files.lock().expect("files lock");
        let mut seen = self.seen.lock().expect("seen lock");

        for (target, line) in emissions {
            if self.unique {
                if !seen.insert(line.clone()) {
                    deduplicated += 1;
                    continue;
                }
            }
            match target {
                DjCEmitTarget::Stdout => match &mut *stdout {
                    DjCStdoutSink::Console => println!("{}", line),
                    DjCStdoutSink::Captured(lines) => lines.push(line),
                },
                DjCEmitTarget::File(path) => {
                    let handle = Self::open_file(&mut files, &path)?;
                    writeln!(handle, "{}", line).map_err(|err| DjError::io_path(&path, err))?;
                }
            }
            written += 1;
        }

        let mut stats = self.stats.lock().expect("stats lock");
        stats.lines_written += written;
        stats.lines_deduplicated += deduplicated;
        Ok(())
    }

    #[allow(non_snake_case)]
    pub fn DjFStats(&self) -> DjCWriteStats {
        *self.stats.lock().expect("stats lock")
    }

    /// Flushes and releases every open file handle; called on all exit
    /// paths at interpreter shutdown.
    #[allow(non_snake_case)]
    pub fn DjFClose(&self) -> Result<()> {
        let mut files = self.files.lock().expect("files lock");
        for (path, handle) in files.iter_mut() {
            handle
                .flush()
                .map_err(|err| DjError::io_path(path, err))?;
        }
        files.clear();
        Ok(())
    }
}

impl Drop for DjCOutputHub {
    fn drop(&mut self) {
        let _ = self.DjFClose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_drops_repeated_lines_across_targets() {
        let hub = DjCOutputHub::DjFNewCaptured(true);
        hub.DjFFlush(vec![
            (DjCEmitTarget::Stdout, "a".to_string()),
            (DjCEmitTarget::Stdout, "a".to_string()),
            (DjCEmitTarget::Stdout, "b".to_string()),
        ])
        .unwrap();
        assert_eq!(hub.DjFCapturedStdout(), ["a", "b"]);
        let stats = hub.DjFStats();
        assert_eq!(stats.lines_written, 2);
        assert_eq!(stats.lines_deduplicated, 1);
    }
}
