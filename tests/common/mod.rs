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

#![allow(non_snake_case)]
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dj::eval::DjCEvaluator;
use dj::export::DjCOutputHub;
use dj::ingest::DjCDictionaryReader;
use dj::operations::DjCOperationRegistry;
use dj::script::{DjFParseScript, DjFResolveScript};
use dj::Result;

/// Runs a script over the given input lines and returns the lines the
/// script emitted to standard output.
pub fn DjFTRunScript(script: &str, input: &str) -> Result<Vec<String>> {
    DjFTRunScriptWith(script, input, false, &DjCOperationRegistry::DjFWithDefaults())
}

/// Like [`DjFTRunScript`] with global emission deduplication enabled.
pub fn DjFTRunScriptUnique(script: &str, input: &str) -> Result<Vec<String>> {
    DjFTRunScriptWith(script, input, true, &DjCOperationRegistry::DjFWithDefaults())
}

/// Full-control harness: parses, resolves and evaluates a script with
/// the given registry, capturing standard output.
pub fn DjFTRunScriptWith(
    script: &str,
    input: &str,
    unique: bool,
    registry: &DjCOperationRegistry,
) -> Result<Vec<String>> {
    let parsed = DjFParseScript(script, registry)?;
    let program = DjFResolveScript(&parsed, registry)?;
    let outputs = Arc::new(DjCOutputHub::DjFNewCaptured(unique));
    let evaluator = DjCEvaluator::DjFNew(program, outputs)?;
    let mut reader = DjCDictionaryReader::DjFFromText(input);
    evaluator.DjFRun(&mut reader)?;
    Ok(evaluator.outputs().DjFCapturedStdout())
}

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A unique scratch file path for tests that need the filesystem.
pub fn DjFTScratchPath(tag: &str) -> PathBuf {
    let unique = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "dj-test-{}-{}-{}",
        std::process::id(),
        unique,
        tag
    ))
}

/// Writes a scratch file and returns its path as a script-embeddable
/// string.
pub fn DjFTWriteScratch(tag: &str, content: &str) -> String {
    let path = DjFTScratchPath(tag);
    std::fs::write(&path, content).expect("scratch file written");
    path.to_string_lossy().into_owned()
}
