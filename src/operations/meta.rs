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

//! Meta operations: modifier wrappers, combinators over sub-chains,
//! blocks with sinks and `use`. These are instantiated by the resolver,
//! not through the operation registry, because their operands are
//! chains rather than literals.

use crate::entry::{DjEntryList, DjOutcome};
use crate::errors::Result;
use crate::operation::{DjCBoxedOperation, DjCChain, DjCOperation, DjCOperationKind};
use crate::runtime::DjCRuntime;
use crate::script::ast::{DjCModifier, DjCSink};

/// Wraps one operation and reshapes its output per the modifier laws.
/// Applied to an ilist, the modifier processes the elements one after
/// another and unions the per-element results in first-seen order.
#[derive(Debug)]
pub struct DjCModifierOp {
    modifier: DjCModifier,
    inner: DjCBoxedOperation,
}

impl DjCModifierOp {
    #[allow(non_snake_case)]
    pub fn DjFNew(modifier: DjCModifier, inner: DjCBoxedOperation) -> Self {
        DjCModifierOp { modifier, inner }
    }

    pub fn inner(&self) -> &dyn DjCOperation {
        self.inner.as_ref()
    }
}

impl DjCOperation for DjCModifierOp {
    fn name(&self) -> String {
        format!("{}{}", self.modifier.symbol(), self.inner.name())
    }

    fn kind(&self) -> DjCOperationKind {
        match self.modifier {
            DjCModifier::Negate => DjCOperationKind::Filter,
            _ => self.inner.kind(),
        }
    }

    fn apply_ilist(&self, entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut out = DjEntryList::new();
        let mut all_not_applicable = true;
        for entry in entries {
            let result = self
                .inner
                .apply_ilist(std::slice::from_ref(entry), rt)?;
            match self.modifier {
                DjCModifier::KeepAlways => {
                    all_not_applicable = false;
                    match result {
                        DjOutcome::NotApplicable => out.push(entry.clone()),
                        DjOutcome::Entries(list) => {
                            if !list.contains(entry) {
                                out.push(entry.clone());
                            }
                            out.extend(list);
                        }
                    }
                }
                DjCModifier::KeepOnNotApplicable => {
                    all_not_applicable = false;
                    match result {
                        DjOutcome::NotApplicable => out.push(entry.clone()),
                        DjOutcome::Entries(list) => out.extend(list),
                    }
                }
                DjCModifier::KeepOnReject => {
                    all_not_applicable = false;
                    match result {
                        DjOutcome::NotApplicable => out.push(entry.clone()),
                        DjOutcome::Entries(list) if list.is_empty() => out.push(entry.clone()),
                        DjOutcome::Entries(list) => out.extend(list),
                    }
                }
                DjCModifier::Negate => match result {
                    DjOutcome::NotApplicable => {
                        all_not_applicable = false;
                        out.push(entry.clone());
                    }
                    DjOutcome::Entries(_) => {}
                },
            }
        }
        if all_not_applicable {
            Ok(DjOutcome::NotApplicable)
        } else {
            Ok(DjOutcome::Entries(out))
        }
    }
}

/// A chain wrapped as a single operation; the executable form of a
/// modified macro invocation and of sinkless grouping blocks.
#[derive(Debug)]
pub struct DjCSubChain {
    chain: DjCChain,
    label: Option<String>,
}

impl DjCSubChain {
    #[allow(non_snake_case)]
    pub fn DjFNew(chain: DjCChain, label: Option<String>) -> Self {
        DjCSubChain { chain, label }
    }
}

impl DjCOperation for DjCSubChain {
    fn name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{{ {} }}", self.chain.render()),
        }
    }

    fn kind(&self) -> DjCOperationKind {
        self.chain.aggregate_kind()
    }

    fn apply_ilist(&self, entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        self.chain.run(entries.to_vec(), rt)
    }
}

/// `or(chain, ...)`: evaluated per entry; the first operand chain that
/// yields a non-N/A, non-empty ilist supplies the result. First-match,
/// not union.
#[derive(Debug)]
pub struct DjCOr {
    operands: Vec<DjCChain>,
}

impl DjCOr {
    #[allow(non_snake_case)]
    pub fn DjFNew(operands: Vec<DjCChain>) -> Self {
        DjCOr { operands }
    }
}

impl DjCOperation for DjCOr {
    fn name(&self) -> String {
        let operands: Vec<String> = self.operands.iter().map(|c| c.render()).collect();
        format!("or({})", operands.join(", "))
    }

    fn kind(&self) -> DjCOperationKind {
        if self.operands.iter().all(|c| c.is_filter()) {
            DjCOperationKind::Filter
        } else {
            DjCOperationKind::Meta
        }
    }

    fn apply(&self, entry: &str, rt: &mut DjCRuntime) -> Result<DjOutcome> {
        for operand in &self.operands {
            let result = operand.run(vec![entry.to_string()], rt)?;
            if result.passed() {
                return Ok(result);
            }
        }
        Ok(DjOutcome::NotApplicable)
    }
}

fn element_truth(result: &DjOutcome, na_is_true: bool, empty_is_true: bool) -> bool {
    match result {
        DjOutcome::NotApplicable => na_is_true,
        DjOutcome::Entries(list) if list.is_empty() => empty_is_true,
        DjOutcome::Entries(_) => true,
    }
}

/// `ilist_if_all(chain)`: passes the incoming ilist unchanged iff the
/// chain yields a satisfied result for every element. The sentinel
/// clauses `N/A = ...` and `[] = ...` declare whether an N/A or empty
/// per-element result counts as satisfied; both default to false.
#[derive(Debug)]
pub struct DjCIListIfAll {
    na_is_true: bool,
    empty_is_true: bool,
    chain: DjCChain,
}

impl DjCIListIfAll {
    #[allow(non_snake_case)]
    pub fn DjFNew(na_is_true: bool, empty_is_true: bool, chain: DjCChain) -> Self {
        DjCIListIfAll {
            na_is_true,
            empty_is_true,
            chain,
        }
    }
}

impl DjCOperation for DjCIListIfAll {
    fn name(&self) -> String {
        let mut config = String::new();
        if self.na_is_true || self.empty_is_true {
            config = format!("N/A={}, []={}, ", self.na_is_true, self.empty_is_true);
        }
        format!("ilist_if_all({}{})", config, self.chain.render())
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply_ilist(&self, entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        for entry in entries {
            let result = self.chain.run(vec![entry.clone()], rt)?;
            if !element_truth(&result, self.na_is_true, self.empty_is_true) {
                return Ok(DjOutcome::NotApplicable);
            }
        }
        Ok(DjOutcome::Entries(entries.to_vec()))
    }
}

/// `ilist_if_any(chain)`: the existential counterpart of
/// [`DjCIListIfAll`].
#[derive(Debug)]
pub struct DjCIListIfAny {
    na_is_true: bool,
    empty_is_true: bool,
    chain: DjCChain,
}

impl DjCIListIfAny {
    #[allow(non_snake_case)]
    pub fn DjFNew(na_is_true: bool, empty_is_true: bool, chain: DjCChain) -> Self {
        DjCIListIfAny {
            na_is_true,
            empty_is_true,
            chain,
        }
    }
}

impl DjCOperation for DjCIListIfAny {
    fn name(&self) -> String {
        let mut config = String::new();
        if self.na_is_true || self.empty_is_true {
            config = format!("N/A={}, []={}, ", self.na_is_true, self.empty_is_true);
        }
        format!("ilist_if_any({}{})", config, self.chain.render())
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply_ilist(&self, entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        for entry in entries {
            let result = self.chain.run(vec![entry.clone()], rt)?;
            if element_truth(&result, self.na_is_true, self.empty_is_true) {
                return Ok(DjOutcome::Entries(entries.to_vec()));
            }
        }
        Ok(DjOutcome::NotApplicable)
    }
}

/// `ilist_foreach(chain)`: runs the chain on each element of the
/// current ilist in turn and concatenates the results; equivalent to
/// splicing the chain inline, used to make scope explicit inside
/// combinators.
#[derive(Debug)]
pub struct DjCIListForeach {
    chain: DjCChain,
}

impl DjCIListForeach {
    #[allow(non_snake_case)]
    pub fn DjFNew(chain: DjCChain) -> Self {
        DjCIListForeach { chain }
    }
}

impl DjCOperation for DjCIListForeach {
    fn name(&self) -> String {
        format!("ilist_foreach({})", self.chain.render())
    }

    fn kind(&self) -> DjCOperationKind {
        self.chain.aggregate_kind()
    }

    fn apply_ilist(&self, entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut all_not_applicable = true;
        let mut out = DjEntryList::new();
        for entry in entries {
            match self.chain.run(vec![entry.clone()], rt)? {
                DjOutcome::NotApplicable => {}
                DjOutcome::Entries(list) => {
                    all_not_applicable = false;
                    out.extend(list);
                }
            }
        }
        if all_not_applicable {
            Ok(DjOutcome::NotApplicable)
        } else {
            Ok(DjOutcome::Entries(out))
        }
    }
}

/// `ilist_ratio [joined] < r (A, B)`: runs both chains on the incoming
/// ilist and passes B's result iff `measure(A) / measure(B) < r`, where
/// the measure is the element count, or the joined length with
/// `joined`. N/A from either chain and a zero denominator are test
/// failures.
#[derive(Debug)]
pub struct DjCIListRatio {
    joined: bool,
    limit: f64,
    numerator: DjCChain,
    denominator: DjCChain,
}

impl DjCIListRatio {
    #[allow(non_snake_case)]
    pub fn DjFNew(joined: bool, limit: f64, numerator: DjCChain, denominator: DjCChain) -> Self {
        DjCIListRatio {
            joined,
            limit,
            numerator,
            denominator,
        }
    }

    fn measure(&self, entries: &[String]) -> usize {
        if self.joined {
            entries.iter().map(|e| e.chars().count()).sum()
        } else {
            entries.len()
        }
    }
}

impl DjCOperation for DjCIListRatio {
    fn name(&self) -> String {
        format!(
            "ilist_ratio{} < {} ({}, {})",
            if self.joined { " joined" } else { "" },
            self.limit,
            self.numerator.render(),
            self.denominator.render()
        )
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Meta
    }

    fn apply_ilist(&self, entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let numerator = match self.numerator.run(entries.to_vec(), rt)? {
            DjOutcome::NotApplicable => return Ok(DjOutcome::NotApplicable),
            DjOutcome::Entries(list) => list,
        };
        let denominator = match self.denominator.run(entries.to_vec(), rt)? {
            DjOutcome::NotApplicable => return Ok(DjOutcome::NotApplicable),
            DjOutcome::Entries(list) => list,
        };
        let denominator_measure = self.measure(&denominator);
        if denominator_measure == 0 {
            return Ok(DjOutcome::NotApplicable);
        }
        let ratio = self.measure(&numerator) as f64 / denominator_measure as f64;
        if ratio < self.limit {
            Ok(DjOutcome::Entries(denominator))
        } else {
            Ok(DjOutcome::NotApplicable)
        }
    }
}

/// `restart N (filter, body)`: while the filter passes the current
/// ilist and the re-entry bound is not exhausted, the body runs with
/// its own previous output as input. The filter also gates the first
/// body run; if it rejects the initial entry the entry passes through
/// unchanged. N bounds the number of re-entries, so the body runs at
/// most N+1 times. Termination within the bound is the script author's
/// responsibility.
#[derive(Debug)]
pub struct DjCRestart {
    bound: u32,
    filter: DjCChain,
    body: DjCChain,
}

impl DjCRestart {
    #[allow(non_snake_case)]
    pub fn DjFNew(bound: u32, filter: DjCChain, body: DjCChain) -> Self {
        DjCRestart {
            bound,
            filter,
            body,
        }
    }
}

impl DjCOperation for DjCRestart {
    fn name(&self) -> String {
        format!(
            "restart {} ({}, {})",
            self.bound,
            self.filter.render(),
            self.body.render()
        )
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Meta
    }

    fn apply(&self, entry: &str, rt: &mut DjCRuntime) -> Result<DjOutcome> {
        rt.restart_enter();
        let result = self.run_bounded(entry, rt);
        rt.restart_exit();
        result
    }
}

impl DjCRestart {
    fn run_bounded(&self, entry: &str, rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut current = vec![entry.to_string()];
        let mut runs = 0u32;
        loop {
            if !self.filter.run(current.clone(), rt)?.passed() {
                break;
            }
            if runs > self.bound {
                break;
            }
            match self.body.run(current.clone(), rt)? {
                DjOutcome::NotApplicable => {
                    if runs == 0 {
                        return Ok(DjOutcome::NotApplicable);
                    }
                    break;
                }
                DjOutcome::Entries(next) => {
                    runs += 1;
                    current = next;
                    if current.is_empty() {
                        break;
                    }
                }
            }
        }
        Ok(DjOutcome::Entries(current))
    }
}

/// A block with a sink: evaluates its inner chain per element and
/// emits into a named list instead of (or in addition to) feeding the
/// next operation.
#[derive(Debug)]
pub struct DjCBlock {
    chain: DjCChain,
    sink: DjCSink,
    target: String,
}

impl DjCBlock {
    #[allow(non_snake_case)]
    pub fn DjFNew(chain: DjCChain, sink: DjCSink, target: String) -> Self {
        DjCBlock {
            chain,
            sink,
            target,
        }
    }
}

impl DjCOperation for DjCBlock {
    fn name(&self) -> String {
        format!(
            "{{ {} }}{} {}",
            self.chain.render(),
            self.sink.symbol(),
            self.target
        )
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Meta
    }

    fn apply_ilist(&self, entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut downstream = DjEntryList::new();
        let mut all_not_applicable = true;
        for entry in entries {
            let produced = match self.chain.run(vec![entry.clone()], rt)? {
                DjOutcome::NotApplicable => continue,
                DjOutcome::Entries(list) => {
                    all_not_applicable = false;
                    list
                }
            };
            match self.sink {
                DjCSink::Collect => {
                    rt.list_extend(&self.target, produced)?;
                }
                DjCSink::CollectOriginals => {
                    if !produced.is_empty() {
                        rt.list_extend(&self.target, [entry.clone()])?;
                    }
                }
                DjCSink::Tee => {
                    rt.list_extend(&self.target, produced.iter().cloned())?;
                    downstream.extend(produced);
                }
                DjCSink::TeeOriginals => {
                    if !produced.is_empty() {
                        rt.list_extend(&self.target, [entry.clone()])?;
                    }
                    downstream.extend(produced);
                }
            }
        }
        match self.sink {
            // the produced ilist went into the named list; nothing
            // continues downstream
            DjCSink::Collect | DjCSink::CollectOriginals => Ok(DjOutcome::empty()),
            DjCSink::Tee | DjCSink::TeeOriginals => {
                if all_not_applicable {
                    Ok(DjOutcome::NotApplicable)
                } else {
                    Ok(DjOutcome::Entries(downstream))
                }
            }
        }
    }
}

/// `use L1 L2 ...`: replaces the current ilist with the concatenated
/// contents of the referenced named lists, in the order written. Must
/// be the first operation of its chain.
#[derive(Debug)]
pub struct DjCUseLists {
    lists: Vec<String>,
}

impl DjCUseLists {
    #[allow(non_snake_case)]
    pub fn DjFNew(lists: Vec<String>) -> Self {
        DjCUseLists { lists }
    }
}

impl DjCOperation for DjCUseLists {
    fn name(&self) -> String {
        format!("use {}", self.lists.join(" "))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Meta
    }

    fn apply_ilist(&self, _entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut out = DjEntryList::new();
        for list in &self.lists {
            out.extend(rt.list_entries(list)?.iter().cloned());
        }
        Ok(DjOutcome::Entries(out))
    }
}
