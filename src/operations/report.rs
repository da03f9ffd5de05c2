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

//! Reporter operations: pass-through operations with emission side
//! effects. Emissions are buffered in the runtime and flushed
//! line-atomically once the entry completes.

use crate::entry::DjOutcome;
use crate::errors::Result;
use crate::operation::{DjCBoxedOperation, DjCOperation, DjCOperationKind};
use crate::operations::DjCArgCursor;
use crate::runtime::{DjCEmitTarget, DjCEnvironment, DjCRuntime};
use crate::script::lexer::DjFEscape;

/// `_`: does nothing, forwards the ilist.
#[derive(Debug)]
struct _Nop;

impl DjCOperation for _Nop {
    fn name(&self) -> String {
        "_".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Reporter
    }

    fn apply_ilist(&self, entries: &[String], _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        Ok(DjOutcome::Entries(entries.to_vec()))
    }
}

/// Writes the current ilist to standard output, one entry per line.
///
/// A report often ends a chain, but intermediate reports are legal and
/// useful: `report remove_ws capitalize report` first prints every
/// entry, then prints the capitalized variants of those entries that
/// contained whitespace.
#[derive(Debug)]
struct _Report;

impl DjCOperation for _Report {
    fn name(&self) -> String {
        "report".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Reporter
    }

    fn apply_ilist(&self, entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        for entry in entries {
            rt.emit(DjCEmitTarget::Stdout, entry.clone());
        }
        Ok(DjOutcome::Entries(entries.to_vec()))
    }
}

/// Appends the current ilist to a file. Multiple `write` operations may
/// target the same file within one script.
#[derive(Debug)]
struct _Write {
    path: String,
}

impl DjCOperation for _Write {
    fn name(&self) -> String {
        format!("write \"{}\"", DjFEscape(&self.path))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Reporter
    }

    fn apply_ilist(&self, entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        for entry in entries {
            rt.emit(DjCEmitTarget::File(self.path.clone()), entry.clone());
        }
        Ok(DjOutcome::Entries(entries.to_vec()))
    }
}

/// Adds a tag to the entry's classification; tags accumulate across the
/// chain and are emitted by `result`.
#[derive(Debug)]
struct _Classify {
    tag: String,
}

impl DjCOperation for _Classify {
    fn name(&self) -> String {
        format!("classify \"{}\"", DjFEscape(&self.tag))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Reporter
    }

    fn apply_ilist(&self, entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        rt.classification.push_str(&self.tag);
        Ok(DjOutcome::Entries(entries.to_vec()))
    }
}

/// Emits every entry prefixed with the accumulated classification tags.
#[derive(Debug)]
struct _Result;

impl DjCOperation for _Result {
    fn name(&self) -> String {
        "result".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Reporter
    }

    fn apply_ilist(&self, entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        for entry in entries {
            let line = format!("{}{}", rt.classification, entry);
            rt.emit(DjCEmitTarget::Stdout, line);
        }
        Ok(DjOutcome::Entries(entries.to_vec()))
    }
}

#[allow(non_snake_case)]
pub fn DjFNopFactory(_args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_Nop))
}

#[allow(non_snake_case)]
pub fn DjFReportFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_Report))
}

#[allow(non_snake_case)]
pub fn DjFWriteFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let path = args.next_str()?;
    Ok(Box::new(_Write { path }))
}

#[allow(non_snake_case)]
pub fn DjFClassifyFactory(
    args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let tag = args.next_str()?;
    Ok(Box::new(_Classify { tag }))
}

#[allow(non_snake_case)]
pub fn DjFResultFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_Result))
}
