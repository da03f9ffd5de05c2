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

//! # Script AST
//!
//! The in-memory representation of a parsed DJ script. A script is a
//! header of directives followed by a body of operation chains. Chains
//! are ordered sequences of operations; an operation is a leaf, a block
//! with an optional sink, a combinator with chain operands, a macro
//! invocation or a `use` of named lists. Every operation may carry one
//! modifier prefix.
//!
//! The AST is purely syntactic: names are unresolved, macros unexpanded
//! and no validation beyond the grammar has happened. The resolver turns
//! it into an executable program. All nodes serialize to JSON so that
//! verbose runs can dump the parsed script for inspection.

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// One literal argument of a leaf operation or `config` directive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DjCArg {
    /// Double-quoted, unescaped string literal.
    Str(String),
    /// Bare integer.
    Int(i64),
    /// Bare float.
    Float(f64),
    /// `True` / `False`.
    Bool(bool),
    /// A lowercase bare word such as `length`, `join` or `each`.
    Word(String),
    /// An uppercase identifier referencing a named or global list.
    Name(String),
    /// The `<` marker used by strict comparisons.
    Less,
    /// Bracketed list of string literals, e.g. `[ "en", "de" ]`.
    List(Vec<String>),
}

impl DjCArg {
    pub fn render(&self) -> String {
        match self {
            DjCArg::Str(s) => format!("\"{}\"", crate::script::lexer::DjFEscape(s)),
            DjCArg::Int(v) => v.to_string(),
            DjCArg::Float(v) => v.to_string(),
            DjCArg::Bool(v) => if *v { "True" } else { "False" }.to_string(),
            DjCArg::Word(w) => w.clone(),
            DjCArg::Name(n) => n.clone(),
            DjCArg::Less => "<".to_string(),
            DjCArg::List(items) => {
                let quoted: Vec<String> = items.iter().map(|i| format!("\"{}\"", i)).collect();
                format!("[ {} ]", quoted.join(", "))
            }
        }
    }
}

/// Modifier prefixes reshaping the output of a single operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DjCModifier {
    /// `+` - the original entry is preserved alongside the result.
    KeepAlways,
    /// `*` - the original entry survives only if the operation did not apply.
    KeepOnNotApplicable,
    /// `!` - logical negation of a filter.
    Negate,
    /// `~` - pass-through on N/A or empty.
    KeepOnReject,
}

impl DjCModifier {
    pub fn symbol(&self) -> char {
        match self {
            DjCModifier::KeepAlways => '+',
            DjCModifier::KeepOnNotApplicable => '*',
            DjCModifier::Negate => '!',
            DjCModifier::KeepOnReject => '~',
        }
    }
}

/// Block sinks directing results into a named list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DjCSink {
    /// `> L` - append the produced ilist to L; nothing flows downstream.
    Collect,
    /// `[]> L` - append the original input entry when the inner chain
    /// produced at least one entry; nothing flows downstream.
    CollectOriginals,
    /// `/> L` - append the produced ilist to L and pass it downstream.
    Tee,
    /// `/[]> L` - append the original input entry when the inner chain
    /// survived and pass the produced ilist downstream.
    TeeOriginals,
}

impl DjCSink {
    pub fn symbol(&self) -> &'static str {
        match self {
            DjCSink::Collect => ">",
            DjCSink::CollectOriginals => "[]>",
            DjCSink::Tee => "/>",
            DjCSink::TeeOriginals => "/[]>",
        }
    }
}

/// One operation with its optional modifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DjCOpAst {
    pub modifier: Option<DjCModifier>,
    pub node: DjCOpNode,
}

/// The operation variants of the grammar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DjCOpNode {
    /// A leaf operation with literal arguments.
    Leaf { name: String, args: Vec<DjCArg> },
    /// `use L1 L2 ...` - replaces the current ilist with list contents.
    Use { lists: Vec<String> },
    /// `{ chain }sink NAME` or a plain grouping block without sink.
    Block {
        chain: DjCChainAst,
        sink: Option<(DjCSink, String)>,
    },
    /// `do NAME`.
    MacroCall { name: String },
    /// `or(chain, chain, ...)` - first-match.
    Or { operands: Vec<DjCChainAst> },
    /// `ilist_if_all( [N/A = b, [] = b,] chain )`.
    IListIfAll {
        na_is_true: bool,
        empty_is_true: bool,
        chain: DjCChainAst,
    },
    /// `ilist_if_any( [N/A = b, [] = b,] chain )`.
    IListIfAny {
        na_is_true: bool,
        empty_is_true: bool,
        chain: DjCChainAst,
    },
    /// `ilist_foreach( chain )`.
    IListForeach { chain: DjCChainAst },
    /// `ilist_ratio joined? < r ( chainA, chainB )`.
    IListRatio {
        joined: bool,
        limit: f64,
        numerator: DjCChainAst,
        denominator: DjCChainAst,
    },
    /// `restart N? ( filter, body )`.
    Restart {
        bound: u32,
        filter: DjCChainAst,
        body: DjCChainAst,
    },
}

/// An ordered chain of operations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DjCChainAst {
    pub ops: Vec<DjCOpAst>,
}

/// Header directives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DjCDirective {
    /// `ignore "file"` - entries listed in the file never enter a chain.
    Ignore(String),
    /// `create "file"` - truncate the file at script start.
    Create(String),
    /// `list NAME` - per-entry list, duplicates retained.
    List(String),
    /// `set NAME` - per-entry set, duplicates collapsed on insert.
    Set(String),
    /// `global_list NAME "file" ( ops )?`.
    GlobalList {
        name: String,
        file: String,
        ops: Option<DjCChainAst>,
    },
    /// `global_set NAME "file" ( ops )?`.
    GlobalSet {
        name: String,
        file: String,
        ops: Option<DjCChainAst>,
    },
    /// `config op param literal`.
    Config {
        op: String,
        param: String,
        value: DjCArg,
    },
    /// `def NAME ops`.
    Def { name: String, body: DjCChainAst },
}

/// A complete parsed script.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DjCScript {
    pub header: Vec<DjCDirective>,
    pub body: Vec<DjCChainAst>,
}

impl DjCScript {
    /// Serializes the script to a pretty-printed JSON string, used by
    /// verbose runs to dump the parsed AST.
    #[allow(non_snake_case)]
    pub fn DjFToJson(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
