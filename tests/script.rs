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

use common::{DjFTRunScript, DjFTRunScriptWith, DjFTWriteScratch};
use dj::entry::DjOutcome;
use dj::errors::DjError;
use dj::operation::{DjCOperation, DjCOperationKind};
use dj::operations::{DjCArgCursor, DjCArgSpec, DjCOperationRegistry};
use dj::runtime::{DjCEnvironment, DjCRuntime};
use dj::script::ast::{DjCDirective, DjCOpNode};
use dj::script::DjFParseScript;

#[test]
fn DjFTParseErrorCarriesPosition() {
    let registry = DjCOperationRegistry::DjFWithDefaults();
    let err = DjFParseScript("lower\n  min length &", &registry).unwrap_err();
    match err {
        DjError::Parse { line, column, expected } => {
            assert_eq!(line, 2);
            assert!(column > 0);
            assert!(expected.contains("token"), "unexpected: {}", expected);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn DjFTUnknownOperationIsAParseError() {
    let registry = DjCOperationRegistry::DjFWithDefaults();
    let err = DjFParseScript("frobnicate report", &registry).unwrap_err();
    match err {
        DjError::Parse { expected, .. } => {
            assert!(expected.contains("known operation"), "unexpected: {}", expected)
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn DjFTContinuationsAndCommentsAreTransparent() {
    let out = DjFTRunScript("# heading comment\nlower \\\n report # trailing\n", "ABC").unwrap();
    assert_eq!(out, ["abc"]);
}

#[test]
fn DjFTHeaderDirectivesParse() {
    let registry = DjCOperationRegistry::DjFWithDefaults();
    let script = DjFParseScript(
        "list L\nset S\nconfig is_walk MIN_WALK_LENGTH 4\ndef M lower upper\nlower report",
        &registry,
    )
    .unwrap();
    assert_eq!(script.header.len(), 4);
    assert!(matches!(&script.header[0], DjCDirective::List(name) if name == "L"));
    assert!(matches!(&script.header[1], DjCDirective::Set(name) if name == "S"));
    assert!(matches!(
        &script.header[2],
        DjCDirective::Config { op, param, .. } if op == "is_walk" && param == "MIN_WALK_LENGTH"
    ));
    assert!(matches!(&script.header[3], DjCDirective::Def { name, body }
        if name == "M" && body.ops.len() == 2));
    assert_eq!(script.body.len(), 1);
}

#[test]
fn DjFTSentinelClausesParse() {
    let registry = DjCOperationRegistry::DjFWithDefaults();
    let script = DjFParseScript(
        "ilist_if_any(N/A = True, [] = False, get_no) report",
        &registry,
    )
    .unwrap();
    match &script.body[0].ops[0].node {
        DjCOpNode::IListIfAny {
            na_is_true,
            empty_is_true,
            ..
        } => {
            assert!(*na_is_true);
            assert!(!*empty_is_true);
        }
        other => panic!("unexpected node: {other:?}"),
    }
}

#[test]
fn DjFTCyclicMacrosAreRejected() {
    let err = DjFTRunScript("def A do B\ndef B do A\ndo A report", "x").unwrap_err();
    match err {
        DjError::Resolve { message } => assert!(message.contains("cyclic"), "{}", message),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn DjFTUndefinedMacroIsRejected() {
    let err = DjFTRunScript("do NOWHERE report", "x").unwrap_err();
    assert!(matches!(err, DjError::Resolve { .. }));
}

#[test]
fn DjFTUndeclaredNamedListsAreRejected() {
    let err = DjFTRunScript("use L report", "x").unwrap_err();
    match err {
        DjError::Resolve { message } => assert!(message.contains("not declared"), "{}", message),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = DjFTRunScript("{ lower }> L", "x").unwrap_err();
    assert!(matches!(err, DjError::Resolve { .. }));
}

#[test]
fn DjFTMisplacedUseIsRejected() {
    let err = DjFTRunScript("list L\nlower use L report", "x").unwrap_err();
    match err {
        DjError::Resolve { message } => {
            assert!(message.contains("first operation"), "{}", message)
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn DjFTModifierLegalityIsChecked() {
    // '!' needs a filter
    let err = DjFTRunScript("!lower report", "x").unwrap_err();
    assert!(matches!(err, DjError::Resolve { .. }));

    // '+' needs a transformer or extractor
    let err = DjFTRunScript("+min length 3 report", "x").unwrap_err();
    assert!(matches!(err, DjError::Resolve { .. }));

    // '~' needs a filter or a filter-like combinator
    let err = DjFTRunScript("~split \" \" report", "x").unwrap_err();
    assert!(matches!(err, DjError::Resolve { .. }));
}

#[test]
fn DjFTUnknownConfigPairsAreFatal() {
    let err = DjFTRunScript("config lower NO_SUCH_PARAM 3\nlower report", "x").unwrap_err();
    assert!(matches!(err, DjError::Config { .. }));

    let err = DjFTRunScript("config nonexistent K 3\nlower report", "x").unwrap_err();
    assert!(matches!(err, DjError::Config { .. }));
}

#[test]
fn DjFTRestartGateMustBeAFilter() {
    let err = DjFTRunScript("restart 1 ( lower , deduplicate ) report", "x").unwrap_err();
    match err {
        DjError::Resolve { message } => assert!(message.contains("filter"), "{}", message),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn DjFTExternalLeavesNeedAnImplementation() {
    let err = DjFTRunScript("related 0.5 report", "x").unwrap_err();
    match err {
        DjError::Resolve { message } => assert!(message.contains("external"), "{}", message),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[derive(Debug)]
struct DjCTRelated;

impl DjCOperation for DjCTRelated {
    fn name(&self) -> String {
        "related".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Extractor
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> dj::Result<DjOutcome> {
        Ok(DjOutcome::one(format!("{}ness", entry)))
    }
}

fn DjCTRelatedFactory(
    args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> dj::Result<Box<dyn DjCOperation>> {
    let _relatedness = args.next_float()?;
    Ok(Box::new(DjCTRelated))
}

#[test]
fn DjFTExternalLeavesArePluggable() {
    let mut registry = DjCOperationRegistry::DjFWithDefaults();
    registry.DjFRegister(
        "related",
        &[DjCArgSpec::Float],
        &["K", "KEEP_ALL_RELATEDNESS"],
        DjCTRelatedFactory,
    );
    let out = DjFTRunScriptWith("related 0.5 report", "kind", false, &registry).unwrap();
    assert_eq!(out, ["kindness"]);
}

#[test]
fn DjFTGlobalListsLoadWithAndWithoutFilter() {
    let glist = DjFTWriteScratch("glist.txt", "alpha\nbeta\n12\n");
    let script = format!(
        "global_set WORDS \"{}\" ( min letter 1 )\nglist_in WORDS report",
        glist
    );
    let out = DjFTRunScript(&script, "alpha\n12\ngamma").unwrap();
    // "12" was dropped by the loading chain, "gamma" is not a member
    assert_eq!(out, ["alpha"]);
}

#[test]
fn DjFTGlobalListDropCutsEndings() {
    let glist = DjFTWriteScratch("endings.txt", "123\nman\n");
    let script = format!("global_list ENDINGS \"{}\"\nglist_drop ENDINGS report", glist);
    let out = DjFTRunScript(&script, "superman\nnobody").unwrap();
    assert_eq!(out, ["super"]);
}
