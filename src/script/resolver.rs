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

//! The semantic resolver: turns a parsed script into an executable
//! program.
//!
//! The header is processed first and in order: ignore files are loaded,
//! named lists declared, `config` directives validated against the
//! registry and bound, global lists loaded (running their optional
//! loading chain per line), macros collected. The body chains are then
//! built bottom-up through the operation registry. Macro invocations
//! expand eagerly - an unmodified `do M` splices M's operations inline,
//! a modified one wraps them as a single sub-chain - and recursion is
//! rejected with a visited stack.
//!
//! Validation performed here, all fatal: unknown operations, undeclared
//! named lists, unknown `(operation, parameter)` config pairs, illegal
//! modifiers for an operation's kind, misplaced `use`, non-filter
//! `restart` gates, cyclic or undefined macros. A body chain that can
//! never emit anything only warns.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{DjError, Result};
use crate::export::DjCOutputHub;
use crate::ingest::DjFReadLines;
use crate::operation::{DjCBoxedOperation, DjCChain, DjCOperationKind};
use crate::operations::meta::{
    DjCBlock, DjCIListForeach, DjCIListIfAll, DjCIListIfAny, DjCIListRatio, DjCModifierOp, DjCOr,
    DjCRestart, DjCSubChain, DjCUseLists,
};
use crate::operations::DjCOperationRegistry;
use crate::runtime::{DjCEnvironment, DjCNamedListKind, DjCRuntime};
use crate::script::ast::{
    DjCChainAst, DjCDirective, DjCModifier, DjCOpAst, DjCOpNode, DjCScript,
};

/// An executable DJ program: the immutable environment, the body
/// chains in textual order, and the files to truncate at startup.
#[derive(Debug)]
pub struct DjCProgram {
    pub env: Arc<DjCEnvironment>,
    pub body: Vec<DjCChain>,
    pub creates: Vec<String>,
}

/// Resolves a parsed script against the given registry.
#[allow(non_snake_case)]
pub fn DjFResolveScript(
    script: &DjCScript,
    registry: &DjCOperationRegistry,
) -> Result<DjCProgram> {
    let mut env = DjCEnvironment::default();
    let mut macros: HashMap<String, DjCChainAst> = HashMap::new();
    let mut creates = Vec::new();

    for directive in &script.header {
        match directive {
            DjCDirective::Ignore(file) => {
                let entries = DjFReadLines(file)?;
                log::debug!("ignoring \"{}\" (#{})", file, entries.len());
                env.ignored.extend(entries);
            }
            DjCDirective::Create(file) => {
                creates.push(file.clone());
            }
            DjCDirective::List(name) | DjCDirective::Set(name) => {
                let kind = if matches!(directive, DjCDirective::List(_)) {
                    DjCNamedListKind::List
                } else {
                    DjCNamedListKind::Set
                };
                if env.list_kinds.insert(name.clone(), kind).is_some() {
                    return Err(DjError::resolve(format!(
                        "the named list {} is declared twice",
                        name
                    )));
                }
            }
            DjCDirective::Config { op, param, value } => {
                if !registry.has_operation(op) {
                    return Err(DjError::config(format!(
                        "config {} {}: unknown operation",
                        op, param
                    )));
                }
                if !registry.supports_param(op, param) {
                    return Err(DjError::config(format!(
                        "config {} {}: unknown parameter",
                        op, param
                    )));
                }
                log::debug!("config {} {} = {}", op, param, value.render());
                env.config.insert(op, param, value.clone());
            }
            DjCDirective::GlobalList { name, file, ops }
            | DjCDirective::GlobalSet { name, file, ops } => {
                if env.globals.contains_key(name) {
                    return Err(DjError::resolve(format!(
                        "the global list {} is declared twice",
                        name
                    )));
                }
                let loaded = load_global(file, ops.as_ref(), &env, &macros, registry)?;
                let deduplicate = matches!(directive, DjCDirective::GlobalSet { .. });
                let entries = if deduplicate {
                    let mut seen = std::collections::HashSet::new();
                    loaded.into_iter().filter(|e| seen.insert(e.clone())).collect()
                } else {
                    loaded
                };
                log::debug!("loaded global list {} (#{})", name, entries.len());
                env.globals.insert(name.clone(), entries);
            }
            DjCDirective::Def { name, body } => {
                if macros.contains_key(name) {
                    return Err(DjError::resolve(format!(
                        "the macro {} is defined twice",
                        name
                    )));
                }
                macros.insert(name.clone(), body.clone());
            }
        }
    }

    let builder = DjCChainBuilder {
        registry,
        env: &env,
        macros: &macros,
    };
    let mut body = Vec::new();
    for chain_ast in &script.body {
        check_use_placement(chain_ast, true, &macros, &mut Vec::new())?;
        let chain = builder.build_chain(chain_ast)?;
        if !chain_emits(chain_ast, &macros) {
            log::warn!("the chain '{}' never emits anything", chain.render());
        }
        body.push(chain);
    }

    Ok(DjCProgram {
        env: Arc::new(env),
        body,
        creates,
    })
}

/// Loads one global list file, running the optional loading chain on
/// every line. A line whose chain yields N/A or nothing is dropped.
fn load_global(
    file: &str,
    ops: Option<&DjCChainAst>,
    env: &DjCEnvironment,
    macros: &HashMap<String, DjCChainAst>,
    registry: &DjCOperationRegistry,
) -> Result<Vec<String>> {
    let lines = DjFReadLines(file)?;
    let chain = match ops {
        None => return Ok(lines),
        Some(ast) => {
            let builder = DjCChainBuilder {
                registry,
                env,
                macros,
            };
            check_use_placement(ast, false, macros, &mut Vec::new())?;
            builder.build_chain(ast)?
        }
    };

    // Loading chains run against a throwaway runtime; they see the
    // environment resolved so far.
    let mut rt = DjCRuntime::DjFNew(
        Arc::new(env.clone()),
        Arc::new(DjCOutputHub::DjFNewCaptured(false)),
    );
    let mut loaded = Vec::new();
    for line in lines {
        match chain.run(vec![line], &mut rt)? {
            crate::entry::DjOutcome::NotApplicable => {}
            crate::entry::DjOutcome::Entries(list) => loaded.extend(list),
        }
    }
    Ok(loaded)
}

/// `use` may only open a top-level chain (or the body of a macro that
/// itself opens a top-level chain).
fn check_use_placement(
    chain: &DjCChainAst,
    allow_leading_use: bool,
    macros: &HashMap<String, DjCChainAst>,
    stack: &mut Vec<String>,
) -> Result<()> {
    for (i, op) in chain.ops.iter().enumerate() {
        let leading = allow_leading_use && i == 0;
        match &op.node {
            DjCOpNode::Use { lists } => {
                if !leading {
                    return Err(DjError::resolve(format!(
                        "use {}: a list use has to be the first operation of a top-level chain",
                        lists.join(" ")
                    )));
                }
            }
            DjCOpNode::MacroCall { name } => {
                if stack.contains(name) {
                    return Err(DjError::resolve(format!("the macro {} is cyclic", name)));
                }
                if let Some(body) = macros.get(name) {
                    stack.push(name.clone());
                    check_use_placement(body, leading && op.modifier.is_none(), macros, stack)?;
                    stack.pop();
                }
            }
            DjCOpNode::Block { chain, .. } => {
                check_use_placement(chain, false, macros, stack)?;
            }
            DjCOpNode::Or { operands } => {
                for operand in operands {
                    check_use_placement(operand, false, macros, stack)?;
                }
            }
            DjCOpNode::IListIfAll { chain, .. }
            | DjCOpNode::IListIfAny { chain, .. }
            | DjCOpNode::IListForeach { chain } => {
                check_use_placement(chain, false, macros, stack)?;
            }
            DjCOpNode::IListRatio {
                numerator,
                denominator,
                ..
            } => {
                check_use_placement(numerator, false, macros, stack)?;
                check_use_placement(denominator, false, macros, stack)?;
            }
            DjCOpNode::Restart { filter, body, .. } => {
                check_use_placement(filter, false, macros, stack)?;
                check_use_placement(body, false, macros, stack)?;
            }
            DjCOpNode::Leaf { .. } => {}
        }
    }
    Ok(())
}

/// True iff the chain can reach an emitting operation (`report`,
/// `write`, `result`) or a block sink.
fn chain_emits(chain: &DjCChainAst, macros: &HashMap<String, DjCChainAst>) -> bool {
    chain.ops.iter().any(|op| match &op.node {
        DjCOpNode::Leaf { name, .. } => matches!(name.as_str(), "report" | "write" | "result"),
        DjCOpNode::Use { .. } => false,
        DjCOpNode::Block { chain, sink } => sink.is_some() || chain_emits(chain, macros),
        DjCOpNode::MacroCall { name } => macros
            .get(name)
            .map(|body| chain_emits(body, macros))
            .unwrap_or(false),
        DjCOpNode::Or { operands } => operands.iter().any(|c| chain_emits(c, macros)),
        DjCOpNode::IListIfAll { chain, .. }
        | DjCOpNode::IListIfAny { chain, .. }
        | DjCOpNode::IListForeach { chain } => chain_emits(chain, macros),
        DjCOpNode::IListRatio {
            numerator,
            denominator,
            ..
        } => chain_emits(numerator, macros) || chain_emits(denominator, macros),
        DjCOpNode::Restart { filter, body, .. } => {
            chain_emits(filter, macros) || chain_emits(body, macros)
        }
    })
}

struct DjCChainBuilder<'r> {
    registry: &'r DjCOperationRegistry,
    env: &'r DjCEnvironment,
    macros: &'r HashMap<String, DjCChainAst>,
}

impl<'r> DjCChainBuilder<'r> {
    fn build_chain(&self, ast: &DjCChainAst) -> Result<DjCChain> {
        let mut stack = Vec::new();
        let ops = self.build_ops(ast, &mut stack)?;
        Ok(DjCChain::new(ops))
    }

    fn build_ops(
        &self,
        ast: &DjCChainAst,
        macro_stack: &mut Vec<String>,
    ) -> Result<Vec<DjCBoxedOperation>> {
        let mut ops = Vec::new();
        for op_ast in &ast.ops {
            self.build_op(op_ast, macro_stack, &mut ops)?;
        }
        Ok(ops)
    }

    fn build_op(
        &self,
        op_ast: &DjCOpAst,
        macro_stack: &mut Vec<String>,
        out: &mut Vec<DjCBoxedOperation>,
    ) -> Result<()> {
        // An unmodified macro invocation splices the macro body inline;
        // everything else builds exactly one operation.
        if let DjCOpNode::MacroCall { name } = &op_ast.node {
            let body = self.macro_body(name, macro_stack)?;
            if op_ast.modifier.is_none() {
                macro_stack.push(name.clone());
                let expanded = self.build_ops(&body, macro_stack)?;
                macro_stack.pop();
                out.extend(expanded);
                return Ok(());
            }
            macro_stack.push(name.clone());
            let chain = DjCChain::new(self.build_ops(&body, macro_stack)?);
            macro_stack.pop();
            let op: DjCBoxedOperation =
                Box::new(DjCSubChain::DjFNew(chain, Some(format!("do {}", name))));
            out.push(self.apply_modifier(op_ast.modifier, op)?);
            return Ok(());
        }

        let op = self.build_plain(&op_ast.node, macro_stack)?;
        out.push(self.apply_modifier(op_ast.modifier, op)?);
        Ok(())
    }

    fn macro_body(&self, name: &str, macro_stack: &[String]) -> Result<DjCChainAst> {
        if macro_stack.iter().any(|m| m == name) {
            return Err(DjError::resolve(format!("the macro {} is cyclic", name)));
        }
        self.macros
            .get(name)
            .cloned()
            .ok_or_else(|| DjError::resolve(format!("unknown macro {}", name)))
    }

    fn build_plain(
        &self,
        node: &DjCOpNode,
        macro_stack: &mut Vec<String>,
    ) -> Result<DjCBoxedOperation> {
        match node {
            DjCOpNode::Leaf { name, args } => self.registry.build(name, args, self.env),
            DjCOpNode::Use { lists } => {
                for list in lists {
                    if !self.env.list_kinds.contains_key(list) {
                        return Err(DjError::resolve(format!(
                            "use {}: the named list {} is not declared",
                            lists.join(" "),
                            list
                        )));
                    }
                }
                Ok(Box::new(DjCUseLists::DjFNew(lists.clone())))
            }
            DjCOpNode::Block { chain, sink } => {
                let inner = DjCChain::new(self.build_ops(chain, macro_stack)?);
                match sink {
                    None => Ok(Box::new(DjCSubChain::DjFNew(inner, None))),
                    Some((kind, target)) => {
                        if !self.env.list_kinds.contains_key(target) {
                            return Err(DjError::resolve(format!(
                                "block sink {} {}: the named list {} is not declared",
                                kind.symbol(),
                                target,
                                target
                            )));
                        }
                        Ok(Box::new(DjCBlock::DjFNew(inner, *kind, target.clone())))
                    }
                }
            }
            DjCOpNode::Or { operands } => {
                let mut chains = Vec::with_capacity(operands.len());
                for operand in operands {
                    chains.push(DjCChain::new(self.build_ops(operand, macro_stack)?));
                }
                Ok(Box::new(DjCOr::DjFNew(chains)))
            }
            DjCOpNode::IListIfAll {
                na_is_true,
                empty_is_true,
                chain,
            } => {
                let chain = DjCChain::new(self.build_ops(chain, macro_stack)?);
                Ok(Box::new(DjCIListIfAll::DjFNew(
                    *na_is_true,
                    *empty_is_true,
                    chain,
                )))
            }
            DjCOpNode::IListIfAny {
                na_is_true,
                empty_is_true,
                chain,
            } => {
                let chain = DjCChain::new(self.build_ops(chain, macro_stack)?);
                Ok(Box::new(DjCIListIfAny::DjFNew(
                    *na_is_true,
                    *empty_is_true,
                    chain,
                )))
            }
            DjCOpNode::IListForeach { chain } => {
                let chain = DjCChain::new(self.build_ops(chain, macro_stack)?);
                Ok(Box::new(DjCIListForeach::DjFNew(chain)))
            }
            DjCOpNode::IListRatio {
                joined,
                limit,
                numerator,
                denominator,
            } => {
                let numerator = DjCChain::new(self.build_ops(numerator, macro_stack)?);
                let denominator = DjCChain::new(self.build_ops(denominator, macro_stack)?);
                Ok(Box::new(DjCIListRatio::DjFNew(
                    *joined,
                    *limit,
                    numerator,
                    denominator,
                )))
            }
            DjCOpNode::Restart {
                bound,
                filter,
                body,
            } => {
                let filter = DjCChain::new(self.build_ops(filter, macro_stack)?);
                if !filter.is_filter() {
                    return Err(DjError::resolve(format!(
                        "restart: the gate '{}' is not a pure filter chain",
                        filter.render()
                    )));
                }
                let body = DjCChain::new(self.build_ops(body, macro_stack)?);
                Ok(Box::new(DjCRestart::DjFNew(*bound, filter, body)))
            }
            DjCOpNode::MacroCall { .. } => {
                Err(DjError::internal("macro calls are expanded in build_op"))
            }
        }
    }

    fn apply_modifier(
        &self,
        modifier: Option<DjCModifier>,
        op: DjCBoxedOperation,
    ) -> Result<DjCBoxedOperation> {
        let modifier = match modifier {
            None => return Ok(op),
            Some(modifier) => modifier,
        };
        match modifier {
            DjCModifier::Negate | DjCModifier::KeepOnReject => {
                if op.kind() != DjCOperationKind::Filter {
                    return Err(DjError::resolve(format!(
                        "the modifier '{}' requires a filter, but {} is none",
                        modifier.symbol(),
                        op.name()
                    )));
                }
            }
            DjCModifier::KeepAlways | DjCModifier::KeepOnNotApplicable => {
                if !matches!(
                    op.kind(),
                    DjCOperationKind::Transformer | DjCOperationKind::Extractor
                ) {
                    return Err(DjError::resolve(format!(
                        "the modifier '{}' requires a transformer or extractor, but {} is none",
                        modifier.symbol(),
                        op.name()
                    )));
                }
            }
        }
        Ok(Box::new(DjCModifierOp::DjFNew(modifier, op)))
    }
}
