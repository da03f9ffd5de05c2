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

//! Operation semantics and the modifier laws, exercised through
//! complete scripts.

#![allow(non_snake_case)]

mod common;

use common::{DjFTRunScript, DjFTWriteScratch};

#[test]
fn DjFTKeepAlwaysPreservesTheOriginal() {
    assert_eq!(
        DjFTRunScript("+split \" \" report", "a b").unwrap(),
        ["a b", "a", "b"]
    );
    // the original also survives when the operation does not apply
    assert_eq!(DjFTRunScript("+split \" \" report", "ab").unwrap(), ["ab"]);
}

#[test]
fn DjFTKeepOnNotApplicableReplacesOnApply() {
    assert_eq!(
        DjFTRunScript("*split \" \" report", "a b").unwrap(),
        ["a", "b"]
    );
    assert_eq!(DjFTRunScript("*split \" \" report", "ab").unwrap(), ["ab"]);
}

#[test]
fn DjFTNegateInvertsAFilter() {
    let script = "!min length 3 report";
    assert_eq!(DjFTRunScript(script, "ab").unwrap(), ["ab"]);
    assert!(DjFTRunScript(script, "abc").unwrap().is_empty());
}

#[test]
fn DjFTKeepOnRejectPassesRejectedEntriesThrough() {
    let script = "~is_pattern report";
    // the filter rejects, the entry passes through regardless
    assert_eq!(DjFTRunScript(script, "abcdef").unwrap(), ["abcdef"]);
    // the filter accepts, its result flows
    assert_eq!(DjFTRunScript(script, "ababab").unwrap(), ["ababab"]);
}

#[test]
fn DjFTLowerIsIdempotent() {
    // the second lower has nothing left to do; with '*' the value
    // survives unchanged
    let once = DjFTRunScript("*lower report", "ABC").unwrap();
    let twice = DjFTRunScript("*lower *lower report", "ABC").unwrap();
    assert_eq!(once, ["abc"]);
    assert_eq!(once, twice);
}

#[test]
fn DjFTRemoveIsIdempotent() {
    let once = DjFTRunScript("*remove \"-\" report", "a-b-c").unwrap();
    let twice = DjFTRunScript("*remove \"-\" *remove \"-\" report", "a-b-c").unwrap();
    assert_eq!(once, ["abc"]);
    assert_eq!(once, twice);
}

#[test]
fn DjFTReverseTwiceIsIdentity() {
    let out = DjFTRunScript("*reverse *reverse report", "abcd").unwrap();
    assert_eq!(out, ["abcd"]);
}

#[test]
fn DjFTKeepAlwaysThenUniqueContainsPlainResult() {
    let plain = DjFTRunScript("split \" \" ilist_unique report", "a b a").unwrap();
    let kept = DjFTRunScript("+split \" \" ilist_unique report", "a b a").unwrap();
    for entry in &plain {
        assert!(kept.contains(entry), "missing {}", entry);
    }
}

#[test]
fn DjFTCaseOperations() {
    assert_eq!(
        DjFTRunScript("title report", "this is a test").unwrap(),
        ["This Is A Test"]
    );
    assert_eq!(DjFTRunScript("capitalize report", "tEST").unwrap(), ["Test"]);
    assert_eq!(DjFTRunScript("swapcase report", "aBc").unwrap(), ["AbC"]);
    assert_eq!(DjFTRunScript("upper 0 report", "abc").unwrap(), ["Abc"]);
}

#[test]
fn DjFTRotateAndMultiply() {
    assert_eq!(DjFTRunScript("rotate 1 report", "abc").unwrap(), ["bca"]);
    assert_eq!(
        DjFTRunScript("multiply 2 report", "Test").unwrap(),
        ["TestTest"]
    );
}

#[test]
fn DjFTStripFamily() {
    assert_eq!(DjFTRunScript("strip_ws report", " ab ").unwrap(), ["ab"]);
    assert_eq!(DjFTRunScript("strip_no report", "12ab34").unwrap(), ["ab"]);
    assert_eq!(DjFTRunScript("strip_sc report", "--ab!!").unwrap(), ["ab"]);
    assert_eq!(
        DjFTRunScript("strip_no_and_sc report", "12-ab-34").unwrap(),
        ["ab"]
    );
    assert_eq!(DjFTRunScript("fold_ws report", "a \t b").unwrap(), ["a b"]);
}

#[test]
fn DjFTSegmentsAndCut() {
    assert_eq!(
        DjFTRunScript("segments 3 3 report", "abcd").unwrap(),
        ["abc", "bcd"]
    );
    assert_eq!(
        DjFTRunScript("cut l 1 2 report", "abcd").unwrap(),
        ["bcd", "cd"]
    );
}

#[test]
fn DjFTPosMapSubstitutesEveryPosition() {
    let out = DjFTRunScript("pos_map \"x\" report", "ab").unwrap();
    assert_eq!(out, ["xb", "ax"]);
}

#[test]
fn DjFTReplaceAppliesATableFromDisk() {
    let table = DjFTWriteScratch("replace.txt", "# dash to two spaces\n- \\s\\s\n");
    let script = format!("replace \"{}\" report", table);
    // '-' is replaced by two spaces
    assert_eq!(DjFTRunScript(&script, "a-b").unwrap(), ["a  b"]);
}

#[test]
fn DjFTMultiReplaceAppliesUpToTwoReplacements() {
    let table = DjFTWriteScratch("multi.txt", "xx 1\nxx 2\ny 5\n");
    let script = format!("multi_replace \"{}\" report", table);
    let out = DjFTRunScript(&script, "xxay").unwrap();
    for expected in ["1ay", "2ay", "xxa5", "1a5", "2a5"] {
        assert!(out.contains(&expected.to_string()), "missing {}", expected);
    }
}

#[test]
fn DjFTDehexAndGetters() {
    assert_eq!(
        DjFTRunScript("dehex report", "$HEX[74657374]").unwrap(),
        ["test"]
    );
    assert_eq!(
        DjFTRunScript("get_no report", "ab12cd3").unwrap(),
        ["12", "3"]
    );
    assert_eq!(
        DjFTRunScript("get_sc report", "ab!?cd##").unwrap(),
        ["!", "##"]
    );
}

#[test]
fn DjFTFindAllJoinFusesCaptureGroups() {
    let out = DjFTRunScript(
        "find_all join \"([0-9]+)-([0-9]+)\" report",
        "10-20 and 30-40",
    )
    .unwrap();
    assert_eq!(out, ["10203040"]);
}

#[test]
fn DjFTMapNotMatchesTheComplement() {
    let out = DjFTRunScript("map not \"ab\" \"x\" report", "acb").unwrap();
    assert_eq!(out, ["axb"]);
}

#[test]
fn DjFTIListSelectLongestKeepsMaximalEntries() {
    let out = DjFTRunScript("+segments 2 3 ilist_unique ilist_select_longest report", "abc")
        .unwrap();
    assert_eq!(out, ["abc"]);
}

#[test]
fn DjFTEmptyResultsTerminateTheChainSilently() {
    // removing every character yields an empty ilist, not an error
    assert!(DjFTRunScript("remove \"a\" report", "aaa").unwrap().is_empty());
}
