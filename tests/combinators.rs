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

use common::DjFTRunScript;

#[test]
fn DjFTOrIsFirstMatch() {
    let script = "or(min length 5, get_no) report";
    // the first operand passes and short-circuits
    assert_eq!(DjFTRunScript(script, "abcdef").unwrap(), ["abcdef"]);
    // the first operand rejects; the second supplies its own result
    assert_eq!(DjFTRunScript(script, "ab12").unwrap(), ["12"]);
    // no operand applies
    assert!(DjFTRunScript(script, "ab").unwrap().is_empty());
}

#[test]
fn DjFTIListIfAnyQuantifiesOverElements() {
    let script = "split \" \" ilist_if_any(get_no) report";
    // one element contains digits: the whole ilist passes unchanged
    assert_eq!(DjFTRunScript(script, "ab 12").unwrap(), ["ab", "12"]);
    // no element contains digits
    assert!(DjFTRunScript(script, "ab cd").unwrap().is_empty());
}

#[test]
fn DjFTIListIfAllQuantifiesOverElements() {
    let script = "split \" \" ilist_if_all(get_no) report";
    assert_eq!(DjFTRunScript(script, "12 34").unwrap(), ["12", "34"]);
    assert!(DjFTRunScript(script, "12 ab").unwrap().is_empty());
}

#[test]
fn DjFTSentinelsReinterpretNA() {
    // with N/A = True, elements where the chain does not apply count
    // as satisfied
    let script = "split \" \" ilist_if_all(N/A = True, [] = False, get_no) report";
    assert_eq!(DjFTRunScript(script, "ab cd").unwrap(), ["ab", "cd"]);

    let script = "split \" \" ilist_if_any(N/A = True, [] = False, get_no) report";
    assert_eq!(DjFTRunScript(script, "ab cd").unwrap(), ["ab", "cd"]);
}

#[test]
fn DjFTIListForeachSplicesChains() {
    let spliced = DjFTRunScript("split \" \" ilist_foreach( *lower ) report", "AB cd").unwrap();
    let inline = DjFTRunScript("split \" \" *lower report", "AB cd").unwrap();
    assert_eq!(spliced, ["ab", "cd"]);
    assert_eq!(spliced, inline);
}

#[test]
fn DjFTIListRatioPassesDenominatorResult() {
    let script = "ilist_ratio joined < 1 (get_no, _) report";
    // 3 digit characters against 6 total: ratio 0.5 passes
    assert_eq!(DjFTRunScript(script, "abc123").unwrap(), ["abc123"]);
    // all digits: ratio 1.0 is not < 1
    assert!(DjFTRunScript(script, "123").unwrap().is_empty());
    // no digits at all: the numerator chain is N/A, a test failure
    assert!(DjFTRunScript(script, "abc").unwrap().is_empty());
}

#[test]
fn DjFTRestartReentersUpToBound() {
    // each body run cuts one character; two re-entries are allowed
    let out = DjFTRunScript("restart 2 ( min length 2 , cut r 1 1 ) report", "abcde").unwrap();
    assert_eq!(out, ["ab"]);
}

#[test]
fn DjFTRestartStopsWhenTheGateRejects() {
    let out = DjFTRunScript("restart 5 ( min length 8 , deduplicate ) report", "aaabbbccc").unwrap();
    assert_eq!(out, ["abc"]);
}

#[test]
fn DjFTRestartPassesThroughWhenGateNeverOpens() {
    let out = DjFTRunScript("restart 1 ( min length 8 , deduplicate ) report", "aabb").unwrap();
    assert_eq!(out, ["aabb"]);
}

#[test]
fn DjFTCollectSinkStopsTheFlow() {
    let script = "list L\n{ get_no }> L report";
    // the produced ilist went into L; nothing reaches the report
    assert!(DjFTRunScript(script, "a1b2").unwrap().is_empty());
}

#[test]
fn DjFTTeeSinkStoresAndForwards() {
    let script = "list L\n{ get_no }/> L report";
    assert_eq!(DjFTRunScript(script, "a1b2").unwrap(), ["1", "2"]);
}

#[test]
fn DjFTCollectOriginalsStoresTheInputEntry() {
    let script = "list L\n{ remove_ws }[]> L\nuse L report";
    // remove_ws applied, so the original entry lands in L
    assert_eq!(DjFTRunScript(script, "a b").unwrap(), ["a b"]);
    // remove_ws did not apply: L stays unchanged, nothing to report
    assert!(DjFTRunScript(script, "ab").unwrap().is_empty());
}

#[test]
fn DjFTUseConcatenatesListsInOrder() {
    let script = "list A\nlist B\n\
                  { get_no }> A\n\
                  { find_all \"[a-z]+\" }> B\n\
                  use B A report";
    assert_eq!(DjFTRunScript(script, "ab12cd").unwrap(), ["ab", "cd", "12"]);
}

#[test]
fn DjFTSetListsCollapseOnInsert() {
    let list_script = "list L\n{ +split \" \" }> L\nuse L report";
    let set_script = "set S\n{ +split \" \" }> S\nuse S report";
    assert_eq!(
        DjFTRunScript(list_script, "a a").unwrap(),
        ["a a", "a", "a"]
    );
    assert_eq!(DjFTRunScript(set_script, "a a").unwrap(), ["a a", "a"]);
}

#[test]
fn DjFTNamedListsResetBetweenEntries() {
    let script = "set S\n{ get_no }> S\nuse S ilist_concat \"-\" report";
    // the second entry sees an S holding only its own digits; a single
    // element is N/A for ilist_concat, so only the first entry emits
    let out = DjFTRunScript(script, "a1b2\nc3").unwrap();
    assert_eq!(out, ["1-2"]);
}

#[test]
fn DjFTSinklessBlocksGroupAChain() {
    let out = DjFTRunScript("{ split \" \" min length 3 } report", "ab cde").unwrap();
    assert_eq!(out, ["cde"]);
}

#[test]
fn DjFTMacroExpansionIsConfluent() {
    let via_macro = DjFTRunScript("def M *split \" \" min length 2\ndo M report", "ab c de")
        .unwrap();
    let inline = DjFTRunScript("*split \" \" min length 2 report", "ab c de").unwrap();
    assert_eq!(via_macro, inline);
    assert_eq!(via_macro, ["ab", "de"]);
}

#[test]
fn DjFTModifiedMacroAppliesElementWise() {
    // '+do M' keeps the original entries alongside the macro's output
    let out = DjFTRunScript("def M split \"-\"\nsplit \" \" +do M report", "a-b c").unwrap();
    assert_eq!(out, ["a-b", "a", "b", "c"]);
}
