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

//! The operation registry.
//!
//! Every leaf operation is registered under its script name with an
//! argument signature (which directs the parser), the configuration
//! parameters it understands (which validates `config` directives) and
//! a factory that builds the operation instance from parsed arguments
//! and the environment.
//!
//! Linguistic leaf operations (`related`, `is_regular_word`,
//! `is_popular_word`, `mangle_dates`, `correct_spelling`, `deleetify`)
//! are external collaborators: their names and signatures are
//! pre-registered so scripts mentioning them parse, but using one
//! without registering an implementation is a resolve error. Plug an
//! implementation in with [`DjCOperationRegistry::DjFRegister`].

pub mod extract;
pub mod filter;
pub mod ilist;
pub mod meta;
pub mod report;
pub mod transform;

use std::collections::HashMap;

use crate::errors::{DjError, Result};
use crate::operation::DjCBoxedOperation;
use crate::runtime::DjCEnvironment;
use crate::script::ast::DjCArg;

/// One element of a leaf operation's argument signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DjCArgSpec {
    Str,
    OptStr,
    Int,
    OptInt,
    Float,
    Word,
    /// A specific word that may be present, e.g. `each` or `join`.
    OptWord(&'static str),
    /// An uppercase list identifier.
    Name,
    /// An optional `<` marking a strict comparison.
    OptLess,
}

/// Cursor over the parsed arguments of one leaf operation. The parser
/// guarantees the token shapes; factories consume the cursor in
/// signature order and validate the values.
pub struct DjCArgCursor<'a> {
    args: &'a [DjCArg],
    pos: usize,
}

impl<'a> DjCArgCursor<'a> {
    pub fn new(args: &'a [DjCArg]) -> Self {
        DjCArgCursor { args, pos: 0 }
    }

    fn next(&mut self) -> Option<&'a DjCArg> {
        let arg = self.args.get(self.pos)?;
        self.pos += 1;
        Some(arg)
    }

    fn peek(&self) -> Option<&'a DjCArg> {
        self.args.get(self.pos)
    }

    pub fn next_str(&mut self) -> Result<String> {
        match self.next() {
            Some(DjCArg::Str(s)) => Ok(s.clone()),
            other => Err(DjError::internal(format!(
                "expected a string argument, found {:?}",
                other
            ))),
        }
    }

    pub fn next_int(&mut self) -> Result<i64> {
        match self.next() {
            Some(DjCArg::Int(v)) => Ok(*v),
            other => Err(DjError::internal(format!(
                "expected an integer argument, found {:?}",
                other
            ))),
        }
    }

    pub fn next_float(&mut self) -> Result<f64> {
        match self.next() {
            Some(DjCArg::Float(v)) => Ok(*v),
            Some(DjCArg::Int(v)) => Ok(*v as f64),
            other => Err(DjError::internal(format!(
                "expected a numeric argument, found {:?}",
                other
            ))),
        }
    }

    pub fn next_word(&mut self) -> Result<String> {
        match self.next() {
            Some(DjCArg::Word(w)) => Ok(w.clone()),
            other => Err(DjError::internal(format!(
                "expected a word argument, found {:?}",
                other
            ))),
        }
    }

    pub fn next_name(&mut self) -> Result<String> {
        match self.next() {
            Some(DjCArg::Name(n)) => Ok(n.clone()),
            other => Err(DjError::internal(format!(
                "expected a list name argument, found {:?}",
                other
            ))),
        }
    }

    pub fn take_word(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(DjCArg::Word(w)) if w == word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn take_less(&mut self) -> bool {
        if matches!(self.peek(), Some(DjCArg::Less)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn opt_str(&mut self) -> Option<String> {
        if let Some(DjCArg::Str(s)) = self.peek() {
            self.pos += 1;
            Some(s.clone())
        } else {
            None
        }
    }

    pub fn opt_int(&mut self) -> Option<i64> {
        if let Some(DjCArg::Int(v)) = self.peek() {
            self.pos += 1;
            Some(*v)
        } else {
            None
        }
    }
}

/// Factory building one operation instance from parsed arguments and
/// the resolved environment.
pub type DjCOperationFactory =
    fn(&mut DjCArgCursor, &DjCEnvironment) -> Result<DjCBoxedOperation>;

struct DjCOperationEntry {
    signature: &'static [DjCArgSpec],
    params: &'static [&'static str],
    factory: Option<DjCOperationFactory>,
}

/// Name-keyed registry of leaf operations.
pub struct DjCOperationRegistry {
    entries: HashMap<String, DjCOperationEntry>,
}

impl Default for DjCOperationRegistry {
    fn default() -> Self {
        Self::DjFWithDefaults()
    }
}

impl DjCOperationRegistry {
    /// Creates an empty registry.
    #[allow(non_snake_case)]
    pub fn DjFNew() -> Self {
        DjCOperationRegistry {
            entries: HashMap::new(),
        }
    }

    /// Creates a registry pre-loaded with the bundled DJ operations and
    /// the external leaf stubs.
    #[allow(non_snake_case)]
    pub fn DjFWithDefaults() -> Self {
        let mut registry = Self::DjFNew();
        registry.register_defaults();
        registry
    }

    /// Registers (or replaces) an operation.
    #[allow(non_snake_case)]
    pub fn DjFRegister(
        &mut self,
        name: impl Into<String>,
        signature: &'static [DjCArgSpec],
        params: &'static [&'static str],
        factory: DjCOperationFactory,
    ) {
        self.entries.insert(
            name.into(),
            DjCOperationEntry {
                signature,
                params,
                factory: Some(factory),
            },
        );
    }

    /// Registers an external leaf: the name and signature parse, but
    /// building the operation fails until an implementation is
    /// registered over the stub.
    #[allow(non_snake_case)]
    pub fn DjFRegisterExternal(
        &mut self,
        name: impl Into<String>,
        signature: &'static [DjCArgSpec],
        params: &'static [&'static str],
    ) {
        self.entries.insert(
            name.into(),
            DjCOperationEntry {
                signature,
                params,
                factory: None,
            },
        );
    }

    pub fn signature(&self, name: &str) -> Option<&'static [DjCArgSpec]> {
        self.entries.get(name).map(|entry| entry.signature)
    }

    pub fn supports_param(&self, name: &str, param: &str) -> bool {
        self.entries
            .get(name)
            .map(|entry| entry.params.contains(&param))
            .unwrap_or(false)
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Builds an operation instance.
    pub fn build(
        &self,
        name: &str,
        args: &[DjCArg],
        env: &DjCEnvironment,
    ) -> Result<DjCBoxedOperation> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| DjError::resolve(format!("unknown operation '{}'", name)))?;
        let factory = entry.factory.ok_or_else(|| {
            DjError::resolve(format!(
                "operation '{}' is an external leaf without a registered implementation",
                name
            ))
        })?;
        let mut cursor = DjCArgCursor::new(args);
        factory(&mut cursor, env)
    }

    fn register_defaults(&mut self) {
        use DjCArgSpec::*;

        // transformers
        self.DjFRegister("lower", &[OptInt], &[], transform::DjFLowerFactory);
        self.DjFRegister("upper", &[OptInt], &[], transform::DjFUpperFactory);
        self.DjFRegister("title", &[], &[], transform::DjFTitleFactory);
        self.DjFRegister("capitalize", &[], &[], transform::DjFCapitalizeFactory);
        self.DjFRegister("swapcase", &[], &[], transform::DjFSwapCaseFactory);
        self.DjFRegister("reverse", &[], &[], transform::DjFReverseFactory);
        self.DjFRegister("rotate", &[Int], &[], transform::DjFRotateFactory);
        self.DjFRegister("multiply", &[Int], &[], transform::DjFMultiplyFactory);
        self.DjFRegister("fold_ws", &[], &[], transform::DjFFoldWSFactory);
        self.DjFRegister("strip_ws", &[], &[], transform::DjFStripWSFactory);
        self.DjFRegister("strip", &[Str], &[], transform::DjFStripFactory);
        self.DjFRegister("remove", &[Str], &[], transform::DjFRemoveFactory);
        self.DjFRegister("remove_ws", &[], &[], transform::DjFRemoveWSFactory);
        self.DjFRegister("remove_no", &[], &[], transform::DjFRemoveNOFactory);
        self.DjFRegister(
            "remove_sc",
            &[],
            &["NON_SPECIAL_CHARACTERS_REGEXP"],
            transform::DjFRemoveSCFactory,
        );
        self.DjFRegister("strip_no", &[], &[], transform::DjFStripNOFactory);
        self.DjFRegister("strip_sc", &[], &[], transform::DjFStripSCFactory);
        self.DjFRegister(
            "strip_no_and_sc",
            &[],
            &["STRIP_CHARS"],
            transform::DjFStripNOAndSCFactory,
        );
        self.DjFRegister(
            "map",
            &[OptWord("not"), Str, Str],
            &[],
            transform::DjFMapFactory,
        );
        self.DjFRegister("pos_map", &[Str], &[], transform::DjFPosMapFactory);
        self.DjFRegister(
            "append",
            &[OptWord("each"), Str],
            &[],
            transform::DjFAppendFactory,
        );
        self.DjFRegister(
            "prepend",
            &[OptWord("each"), Str],
            &[],
            transform::DjFPrependFactory,
        );
        self.DjFRegister("split", &[Str], &[], transform::DjFSplitFactory);
        self.DjFRegister("sub_split", &[Str], &[], transform::DjFSubSplitFactory);
        self.DjFRegister("number", &[Str], &[], transform::DjFNumberFactory);
        self.DjFRegister("replace", &[Str], &[], transform::DjFReplaceFactory);
        self.DjFRegister(
            "multi_replace",
            &[Str],
            &["APPLY_UP_TO_N_REPLACEMENTS"],
            transform::DjFMultiReplaceFactory,
        );
        self.DjFRegister(
            "discard_endings",
            &[Str],
            &[],
            transform::DjFDiscardEndingsFactory,
        );
        self.DjFRegister("deduplicate", &[], &[], transform::DjFDeduplicateFactory);
        self.DjFRegister(
            "glist_drop",
            &[Name],
            &["MIN_LENGTH"],
            transform::DjFGListDropFactory,
        );

        // extractors
        self.DjFRegister(
            "find_all",
            &[OptWord("join"), Str],
            &[],
            extract::DjFFindAllFactory,
        );
        self.DjFRegister("get_no", &[], &[], extract::DjFGetNOFactory);
        self.DjFRegister(
            "get_sc",
            &[],
            &["SPECIAL_CHARACTERS_REGEXP"],
            extract::DjFGetSCFactory,
        );
        self.DjFRegister("cut", &[Word, Int, Int], &[], extract::DjFCutFactory);
        self.DjFRegister("segments", &[Int, Int], &[], extract::DjFSegmentsFactory);
        self.DjFRegister("omit", &[Int], &[], extract::DjFOmitFactory);
        self.DjFRegister(
            "deduplicate_reversed",
            &[],
            &[],
            extract::DjFDeduplicateReversedFactory,
        );
        self.DjFRegister("detriplicate", &[], &[], extract::DjFDetriplicateFactory);
        self.DjFRegister("dehex", &[], &[], extract::DjFDeHexFactory);

        // filters
        self.DjFRegister("min", &[Word, Int], &[], filter::DjFMinFactory);
        self.DjFRegister("max", &[Word, Int], &[], filter::DjFMaxFactory);
        self.DjFRegister("has", &[Word, Int], &[], filter::DjFHasFactory);
        self.DjFRegister("is_sc", &[], &["SPECIAL_CHARS"], filter::DjFIsSCFactory);
        self.DjFRegister("is_pattern", &[], &[], filter::DjFIsPatternFactory);
        self.DjFRegister(
            "is_walk",
            &[Str],
            &["MIN_WALK_LENGTH", "MIN_SUB_WALK_LENGTH"],
            filter::DjFIsWalkFactory,
        );
        self.DjFRegister(
            "is_part_of",
            &[Str],
            &["ENTRY_MIN_LENGTH"],
            filter::DjFIsPartOfFactory,
        );
        self.DjFRegister("sieve", &[Str], &[], filter::DjFSieveFactory);
        self.DjFRegister("glist_in", &[Name], &[], filter::DjFGListInFactory);

        // ilist-level operations
        self.DjFRegister("ilist_unique", &[], &[], ilist::DjFIListUniqueFactory);
        self.DjFRegister("ilist_concat", &[OptStr], &[], ilist::DjFIListConcatFactory);
        self.DjFRegister(
            "ilist_select_longest",
            &[],
            &[],
            ilist::DjFIListSelectLongestFactory,
        );
        self.DjFRegister(
            "ilist_max",
            &[Word, OptLess, Int],
            &[],
            ilist::DjFIListMaxFactory,
        );

        // reporters
        self.DjFRegister("_", &[], &[], report::DjFNopFactory);
        self.DjFRegister("report", &[], &[], report::DjFReportFactory);
        self.DjFRegister("write", &[Str], &[], report::DjFWriteFactory);
        self.DjFRegister("classify", &[Str], &[], report::DjFClassifyFactory);
        self.DjFRegister("result", &[], &[], report::DjFResultFactory);

        // external linguistic leaves (interface only)
        self.DjFRegisterExternal("related", &[Float], &["K", "KEEP_ALL_RELATEDNESS"]);
        self.DjFRegisterExternal("is_regular_word", &[], &["DICTIONARIES"]);
        self.DjFRegisterExternal("is_popular_word", &[], &[]);
        self.DjFRegisterExternal("mangle_dates", &[], &[]);
        self.DjFRegisterExternal("correct_spelling", &[], &[]);
        self.DjFRegisterExternal("deleetify", &[], &[]);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use crate::export::DjCOutputHub;
    use crate::runtime::{DjCEnvironment, DjCRuntime};

    /// A throwaway runtime over an empty environment with captured
    /// stdout, shared by the operation unit tests.
    pub fn runtime() -> DjCRuntime {
        DjCRuntime::DjFNew(
            Arc::new(DjCEnvironment::default()),
            Arc::new(DjCOutputHub::DjFNewCaptured(false)),
        )
    }
}
