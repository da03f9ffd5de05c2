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

mod common;

use std::sync::Arc;

use common::DjFTWriteScratch;
use dj::eval::DjCEvaluator;
use dj::export::DjCOutputHub;
use dj::ingest::DjCDictionaryReader;
use dj::operations::DjCOperationRegistry;
use dj::script::{DjFParseScript, DjFResolveScript};

fn evaluator(script: &str, unique: bool) -> DjCEvaluator {
    let registry = DjCOperationRegistry::DjFWithDefaults();
    let parsed = DjFParseScript(script, &registry).expect("script parses");
    let program = DjFResolveScript(&parsed, &registry).expect("script resolves");
    let outputs = Arc::new(DjCOutputHub::DjFNewCaptured(unique));
    DjCEvaluator::DjFNew(program, outputs).expect("evaluator builds")
}

#[test]
fn DjFTRunCountsReadAndIgnoredEntries() {
    let ignore = DjFTWriteScratch("pipeline-ignore.txt", "skipme\n");
    let script = format!("ignore \"{}\"\nlower report", ignore);
    let evaluator = evaluator(&script, false);
    let mut reader = DjCDictionaryReader::DjFFromText("AB\nskipme\nCD\n\nEF");
    let stats = evaluator.DjFRun(&mut reader).unwrap();
    assert_eq!(stats.entries_read, 4);
    assert_eq!(stats.entries_ignored, 1);
    assert_eq!(
        evaluator.outputs().DjFCapturedStdout(),
        ["ab", "cd", "ef"]
    );
}

#[test]
fn DjFTParallelRunEmitsTheSameLines() {
    let input: String = (0..200).map(|i| format!("word{} x{}\n", i, i)).collect();

    let sequential = evaluator("+split \" \" report", false);
    let mut reader = DjCDictionaryReader::DjFFromText(&input);
    sequential.DjFRun(&mut reader).unwrap();
    let mut expected = sequential.outputs().DjFCapturedStdout();
    expected.sort();

    let parallel = evaluator("+split \" \" report", false);
    let reader = DjCDictionaryReader::DjFFromText(&input);
    let stats = parallel.DjFRunParallel(reader, 4).unwrap();
    assert_eq!(stats.entries_read, 200);
    let mut lines = parallel.outputs().DjFCapturedStdout();
    lines.sort();

    assert_eq!(lines, expected);
}

#[test]
fn DjFTParallelEntriesStayContiguous() {
    // each entry emits its two variants back to back; with buffered
    // per-entry flushing no other entry's lines may interleave
    let input: String = (0..100).map(|i| format!("e{} f{}\n", i, i)).collect();
    let parallel = evaluator("split \" \" report", false);
    let reader = DjCDictionaryReader::DjFFromText(&input);
    parallel.DjFRunParallel(reader, 4).unwrap();
    let lines = parallel.outputs().DjFCapturedStdout();
    assert_eq!(lines.len(), 200);
    for pair in lines.chunks(2) {
        let id_a = pair[0].trim_start_matches(|c: char| c.is_alphabetic());
        let id_b = pair[1].trim_start_matches(|c: char| c.is_alphabetic());
        assert_eq!(id_a, id_b, "interleaved pair: {:?}", pair);
    }
}

#[test]
fn DjFTWriteStatsCountEmittedLines() {
    let evaluator = evaluator("+lower report", true);
    let mut reader = DjCDictionaryReader::DjFFromText("Abc\nabc");
    evaluator.DjFRun(&mut reader).unwrap();
    let stats = evaluator.outputs().DjFStats();
    assert_eq!(stats.lines_written, 2);
    assert_eq!(stats.lines_deduplicated, 1);
}
