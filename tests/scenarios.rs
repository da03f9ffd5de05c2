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

//! End-to-end runs of complete scripts over literal inputs.

#![allow(non_snake_case)]

mod common;

use common::{DjFTRunScript, DjFTRunScriptUnique, DjFTScratchPath, DjFTWriteScratch};

#[test]
fn DjFTSplitReportsEachSegment() {
    let out = DjFTRunScript("split \" \" report", "A Test").unwrap();
    assert_eq!(out, ["A", "Test"]);
}

#[test]
fn DjFTRemoveWsDropsEntriesItCannotChange() {
    let out = DjFTRunScript("remove_ws report", "abc\na b c").unwrap();
    assert_eq!(out, ["abc"]);
}

#[test]
fn DjFTModifierChainExpandsVariants() {
    let out = DjFTRunScript(
        "+split \" \" +remove_ws *map \" \" \"-_\" +lower report",
        "Audi RS",
    )
    .unwrap();
    assert_eq!(
        out,
        [
            "Audi-RS", "audi-rs", "Audi_RS", "audi_rs", "AudiRS", "audirs", "Audi", "audi", "RS",
            "rs",
        ]
    );
}

#[test]
fn DjFTClassifyTagsResults() {
    let script = "find_all \"^[0-9]+$\" classify \"number, \" result";
    assert_eq!(DjFTRunScript(script, "2024").unwrap(), ["number, 2024"]);
    assert!(DjFTRunScript(script, "abc").unwrap().is_empty());
}

#[test]
fn DjFTClassificationAccumulatesAcrossTheChain() {
    let script = "get_no classify \"number, \" min length 4 classify \"long, \" result";
    assert_eq!(
        DjFTRunScript(script, "x2024y").unwrap(),
        ["number, long, 2024"]
    );
    // the second tag is never added when the filter rejects
    assert!(DjFTRunScript(script, "x20y").unwrap().is_empty());
}

#[test]
fn DjFTNamedListRoundTrip() {
    let script = "list L\n{ find_all \"[A-Z][a-z]+\" }> L\nuse L prepend \"$\" report";
    let out = DjFTRunScript(script, "AudiRSModel").unwrap();
    assert_eq!(out, ["$Audi", "$Model"]);
}

#[test]
fn DjFTRestartDeduplicatesOnce() {
    let out = DjFTRunScript("restart 1 ( min length 8 , deduplicate ) report", "aaabbbccc")
        .unwrap();
    assert_eq!(out, ["abc"]);
}

#[test]
fn DjFTEmptyInputProducesNothing() {
    assert!(DjFTRunScript("lower report", "").unwrap().is_empty());
}

#[test]
fn DjFTIgnoredEntriesNeverReachAChain() {
    let ignore = DjFTWriteScratch("ignore.txt", "secret\n");
    let script = format!("ignore \"{}\"\n_ report", ignore);
    let out = DjFTRunScript(&script, "secret\nother").unwrap();
    assert_eq!(out, ["other"]);
}

#[test]
fn DjFTIgnoredDerivedEntriesAreDropped() {
    let ignore = DjFTWriteScratch("ignore-derived.txt", "ab\n");
    let script = format!("ignore \"{}\"\nsplit \" \" report", ignore);
    let out = DjFTRunScript(&script, "ab cd").unwrap();
    assert_eq!(out, ["cd"]);
}

#[test]
fn DjFTUniqueDeduplicatesEmissionsGlobally() {
    let out = DjFTRunScriptUnique("+lower report", "Abc\nabc").unwrap();
    assert_eq!(out, ["Abc", "abc"]);
}

#[test]
fn DjFTWriteAppendsAndCreateTruncates() {
    let target = DjFTScratchPath("out.txt");
    std::fs::write(&target, "stale\n").unwrap();
    let script = format!(
        "create \"{path}\"\nlower write \"{path}\"",
        path = target.to_string_lossy()
    );
    DjFTRunScript(&script, "AB\nCD").unwrap();
    let written = std::fs::read_to_string(&target).unwrap();
    assert_eq!(written, "ab\ncd\n");
    std::fs::remove_file(&target).ok();
}

#[test]
fn DjFTReportIsPassThrough() {
    // both the intermediate and the final stage emit
    let out = DjFTRunScript("report remove_ws capitalize report", "TestTest\nDies ist ein Test")
        .unwrap();
    assert_eq!(
        out,
        ["TestTest", "Dies ist ein Test", "Diesisteintest"]
    );
}
