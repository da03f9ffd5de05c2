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

//! The operation contract and the chain driver.
//!
//! Every operation is classified once into one of four kinds and obeys a
//! per-kind return contract:
//!
//! - **Transformer**: N/A iff the output would equal the input verbatim;
//!   empty iff the output would be the empty string.
//! - **Extractor**: the matches as an ilist; N/A iff no match applies.
//! - **Filter**: the unmodified input entry on pass, N/A on reject.
//! - **Meta**: composes sub-chains and folds their ilists per its own
//!   contract. Reporters are pass-through operations with side effects.
//!
//! Operations that reason entry by entry implement [`DjCOperation::apply`]
//! and inherit the default [`DjCOperation::apply_ilist`], which applies
//! them to every element of the incoming ilist, concatenates the results
//! in order, drops empty strings and ignored entries at production time,
//! and yields N/A iff every element yielded N/A. Operations that reason
//! about the intermediate list as a whole override `apply_ilist`.

use std::fmt;

use crate::entry::{DjEntryList, DjOutcome};
use crate::errors::{DjError, Result};
use crate::log::DjCLogger;
use crate::runtime::DjCRuntime;

/// Classification of an operation, fixed at construction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DjCOperationKind {
    Transformer,
    Extractor,
    Filter,
    Meta,
    /// Pass-through operations with emission side effects (`report`,
    /// `write`, `classify`, `result`, `_`).
    Reporter,
}

/// Contract every DJ operation must fulfill.
pub trait DjCOperation: fmt::Debug + Send + Sync {
    /// The operation rendered the way it is written in a script,
    /// including its arguments.
    fn name(&self) -> String;

    /// The operation's kind.
    fn kind(&self) -> DjCOperationKind;

    /// Applies the operation to one entry. Per-entry operations
    /// implement this; ilist-level operations leave it unimplemented
    /// and override [`DjCOperation::apply_ilist`] instead.
    fn apply(&self, _entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        Err(DjError::internal(format!(
            "operation '{}' does not process single entries",
            self.name()
        )))
    }

    /// Applies the operation to the current intermediate list.
    fn apply_ilist(&self, entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut all_not_applicable = true;
        let mut produced = DjEntryList::new();
        for entry in entries {
            match self.apply(entry, rt)? {
                DjOutcome::NotApplicable => {}
                DjOutcome::Entries(list) => {
                    all_not_applicable = false;
                    for derived in list {
                        if derived.is_empty() {
                            continue;
                        }
                        if rt.is_ignored(&derived) {
                            if DjCLogger::DjFTraceEnabled() {
                                DjCLogger::DjFTraceOp(
                                    &self.name(),
                                    std::slice::from_ref(entry),
                                    &format!("ignored derived entry: {}", derived),
                                );
                            }
                            continue;
                        }
                        produced.push(derived);
                    }
                }
            }
        }
        if all_not_applicable {
            Ok(DjOutcome::NotApplicable)
        } else {
            Ok(DjOutcome::Entries(produced))
        }
    }
}

pub type DjCBoxedOperation = Box<dyn DjCOperation>;

/// Executes an operation while normalizing errors to carry its name.
#[allow(non_snake_case)]
pub fn DjFExecuteOperation(
    operation: &dyn DjCOperation,
    entries: &[String],
    rt: &mut DjCRuntime,
) -> Result<DjOutcome> {
    operation
        .apply_ilist(entries, rt)
        .map_err(|err| match err {
            wrapped @ DjError::Operation { .. } => wrapped,
            other => DjError::operation(operation.name(), other.to_string()),
        })
}

/// An ordered chain of operations; the executable form of one script
/// statement or combinator operand.
#[derive(Debug)]
pub struct DjCChain {
    ops: Vec<DjCBoxedOperation>,
}

impl DjCChain {
    pub fn new(ops: Vec<DjCBoxedOperation>) -> Self {
        DjCChain { ops }
    }

    pub fn ops(&self) -> &[DjCBoxedOperation] {
        &self.ops
    }

    /// True iff every operation of the chain is a filter; such a chain
    /// never modifies entries and may gate a `restart`.
    pub fn is_filter(&self) -> bool {
        self.ops
            .iter()
            .all(|op| op.kind() == DjCOperationKind::Filter)
    }

    /// True iff every operation is a transformer or an extractor, which
    /// is what the `+` and `*` modifiers require of a wrapped chain.
    pub fn is_transformer_or_extractor(&self) -> bool {
        self.ops.iter().all(|op| {
            matches!(
                op.kind(),
                DjCOperationKind::Transformer | DjCOperationKind::Extractor
            )
        })
    }

    /// Aggregate kind of the chain: the common kind of all operations,
    /// or Meta for mixed chains.
    pub fn aggregate_kind(&self) -> DjCOperationKind {
        let mut kinds = self.ops.iter().map(|op| op.kind());
        match kinds.next() {
            None => DjCOperationKind::Meta,
            Some(first) => {
                if kinds.all(|k| k == first) {
                    first
                } else {
                    DjCOperationKind::Meta
                }
            }
        }
    }

    pub fn render(&self) -> String {
        self.ops
            .iter()
            .map(|op| op.name())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Drives an ilist through the chain, implementing the two-level
    /// pipeline semantics: each operation is applied to every element of
    /// the current ilist; the chain stops early once the ilist drains or
    /// an operation yields N/A for all elements.
    pub fn run(&self, entries: DjEntryList, rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut current = entries;
        for op in &self.ops {
            if current.is_empty() {
                return Ok(DjOutcome::Entries(current));
            }
            let outcome = DjFExecuteOperation(op.as_ref(), &current, rt)?;
            if DjCLogger::DjFTraceEnabled() {
                DjCLogger::DjFTraceOp(&op.name(), &current, &outcome.render());
            }
            match outcome {
                DjOutcome::NotApplicable => return Ok(DjOutcome::NotApplicable),
                DjOutcome::Entries(next) => current = next,
            }
        }
        Ok(DjOutcome::Entries(current))
    }
}
