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

//! The evaluator drives input entries through a resolved program.
//!
//! Per entry the state machine is: read, check against the ignore set,
//! reset the per-entry state, run every body chain in textual order,
//! flush the entry's buffered emissions, continue with the next entry.
//! An entry whose chains all end in N/A or drained ilists simply
//! produces no output; that is normal termination, not an error.
//!
//! Entries are independent, so they may also be evaluated by a pool of
//! workers sharing the reader. Ordering between entries is then not
//! guaranteed, but the per-entry emission buffer keeps each entry's
//! output contiguous.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};

use crate::errors::{DjError, Result};
use crate::export::DjCOutputHub;
use crate::ingest::DjCDictionaryReader;
use crate::log::DjCLogger;
use crate::runtime::DjCRuntime;
use crate::script::resolver::DjCProgram;

/// Counters of one evaluator run.
#[derive(Clone, Copy, Debug)]
pub struct DjCRunStats {
    pub entries_read: u64,
    pub entries_ignored: u64,
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
}

impl DjCRunStats {
    pub fn elapsed_seconds(&self) -> f64 {
        self.finished
            .signed_duration_since(self.started)
            .num_milliseconds() as f64
            / 1000.0
    }
}

/// Executes a resolved program over a dictionary.
pub struct DjCEvaluator {
    program: Arc<DjCProgram>,
    outputs: Arc<DjCOutputHub>,
}

impl DjCEvaluator {
    /// Builds an evaluator and truncates the `create` targets.
    #[allow(non_snake_case)]
    pub fn DjFNew(program: DjCProgram, outputs: Arc<DjCOutputHub>) -> Result<Self> {
        for path in &program.creates {
            outputs.DjFCreate(path)?;
        }
        Ok(DjCEvaluator {
            program: Arc::new(program),
            outputs,
        })
    }

    pub fn outputs(&self) -> &Arc<DjCOutputHub> {
        &self.outputs
    }

    /// Sequential evaluation; output order matches input order.
    #[allow(non_snake_case)]
    pub fn DjFRun(&self, reader: &mut DjCDictionaryReader) -> Result<DjCRunStats> {
        let started = Local::now();
        let mut rt = DjCRuntime::DjFNew(self.program.env.clone(), self.outputs.clone());
        let mut read = 0u64;
        let mut ignored = 0u64;
        while let Some((no, entry)) = reader.next_entry()? {
            read += 1;
            if !self.process_entry(&mut rt, no, &entry)? {
                ignored += 1;
            }
            DjCLogger::DjFPace(read, started);
        }
        self.outputs.DjFClose()?;
        Ok(DjCRunStats {
            entries_read: read,
            entries_ignored: ignored,
            started,
            finished: Local::now(),
        })
    }

    /// Parallel evaluation: `workers` threads share the reader. Entry
    /// ordering is not preserved; per-entry output stays contiguous.
    #[allow(non_snake_case)]
    pub fn DjFRunParallel(
        &self,
        reader: DjCDictionaryReader,
        workers: usize,
    ) -> Result<DjCRunStats> {
        if workers <= 1 {
            let mut reader = reader;
            return self.DjFRun(&mut reader);
        }
        let started = Local::now();
        let shared = Mutex::new(reader);
        let read = std::sync::atomic::AtomicU64::new(0);
        let ignored = std::sync::atomic::AtomicU64::new(0);

        std::thread::scope(|scope| -> Result<()> {
            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                let shared = &shared;
                let read = &read;
                let ignored = &ignored;
                handles.push(scope.spawn(move || -> Result<()> {
                    let mut rt =
                        DjCRuntime::DjFNew(self.program.env.clone(), self.outputs.clone());
                    loop {
                        let next = {
                            let mut reader = shared
                                .lock()
                                .map_err(|_| DjError::internal("input reader mutex poisoned"))?;
                            reader.next_entry()?
                        };
                        let (no, entry) = match next {
                            None => return Ok(()),
                            Some(pair) => pair,
                        };
                        read.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                        if !self.process_entry(&mut rt, no, &entry)? {
                            ignored.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                        }
                    }
                }));
            }
            for handle in handles {
                handle
                    .join()
                    .map_err(|_| DjError::internal("evaluation worker panicked"))??;
            }
            Ok(())
        })?;

        self.outputs.DjFClose()?;
        Ok(DjCRunStats {
            entries_read: read.into_inner(),
            entries_ignored: ignored.into_inner(),
            started,
            finished: Local::now(),
        })
    }

    /// Evaluates one entry; returns false when the ignore set dropped
    /// it before any chain ran.
    fn process_entry(&self, rt: &mut DjCRuntime, no: u64, entry: &str) -> Result<bool> {
        if rt.is_ignored(entry) {
            DjCLogger::DjFProgress(no, entry, true);
            return Ok(false);
        }
        DjCLogger::DjFProgress(no, entry, false);
        rt.DjFNextEntry();
        for chain in &self.program.body {
            chain.run(vec![entry.to_string()], rt)?;
        }
        rt.DjFFlushEntry()?;
        Ok(true)
    }
}
