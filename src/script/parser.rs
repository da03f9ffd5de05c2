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

//! Recursive-descent parser for DJ scripts.
//!
//! The parser is arity-directed: leaf operations are parsed against the
//! argument signatures published by the operation registry, which is what
//! lets `min length 3 report` unambiguously end the `min` arguments before
//! `report`. Combinators, blocks, `use` and `do` are grammar built-ins.
//!
//! Every violation produces a [`DjError::Parse`] carrying the line and
//! column of the offending token and a description of what was expected.

use crate::errors::{DjError, Result};
use crate::operations::{DjCArgSpec, DjCOperationRegistry};
use crate::script::ast::{
    DjCArg, DjCChainAst, DjCDirective, DjCModifier, DjCOpAst, DjCOpNode, DjCScript,
};
use crate::script::lexer::{DjCToken, DjCTokenKind, DjFTokenize};

const DIRECTIVE_WORDS: [&str; 8] = [
    "ignore",
    "create",
    "list",
    "set",
    "global_list",
    "global_set",
    "config",
    "def",
];

/// Parses a complete script source against the given registry.
#[allow(non_snake_case)]
pub fn DjFParseScript(source: &str, registry: &DjCOperationRegistry) -> Result<DjCScript> {
    let tokens = DjFTokenize(source)?;
    let mut parser = DjCParser {
        tokens,
        pos: 0,
        registry,
    };
    parser.parse_script()
}

struct DjCParser<'r> {
    tokens: Vec<DjCToken>,
    pos: usize,
    registry: &'r DjCOperationRegistry,
}

impl<'r> DjCParser<'r> {
    fn peek(&self) -> &DjCToken {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> DjCToken {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error_here(&self, expected: impl Into<String>) -> DjError {
        let token = self.peek();
        DjError::parse(
            token.line,
            token.column,
            format!("{} (found {})", expected.into(), token.describe()),
        )
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        match &self.peek().kind {
            DjCTokenKind::Word(w) if w == word => {
                self.bump();
                Ok(())
            }
            _ => Err(self.error_here(format!("'{}'", word))),
        }
    }

    fn expect_name(&mut self, what: &str) -> Result<String> {
        match &self.peek().kind {
            DjCTokenKind::Name(n) => {
                let n = n.clone();
                self.bump();
                Ok(n)
            }
            _ => Err(self.error_here(what)),
        }
    }

    fn expect_str(&mut self, what: &str) -> Result<String> {
        match &self.peek().kind {
            DjCTokenKind::Str(s) => {
                let s = s.clone();
                self.bump();
                Ok(s)
            }
            _ => Err(self.error_here(what)),
        }
    }

    fn expect_int(&mut self, what: &str) -> Result<i64> {
        match &self.peek().kind {
            DjCTokenKind::Int(v) => {
                let v = *v;
                self.bump();
                Ok(v)
            }
            _ => Err(self.error_here(what)),
        }
    }

    fn expect_kind(&mut self, kind: DjCTokenKind, what: &str) -> Result<()> {
        if self.peek().kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(self.error_here(what))
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek().kind, DjCTokenKind::Newline) {
            self.bump();
        }
    }

    fn at_chain_end(&self) -> bool {
        matches!(
            self.peek().kind,
            DjCTokenKind::Newline
                | DjCTokenKind::Eof
                | DjCTokenKind::Comma
                | DjCTokenKind::RParen
                | DjCTokenKind::RBrace(_)
        )
    }

    fn parse_script(&mut self) -> Result<DjCScript> {
        let mut header = Vec::new();
        loop {
            self.skip_newlines();
            match &self.peek().kind {
                DjCTokenKind::Word(w) if DIRECTIVE_WORDS.contains(&w.as_str()) => {
                    header.push(self.parse_directive()?);
                }
                _ => break,
            }
        }

        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            if matches!(self.peek().kind, DjCTokenKind::Eof) {
                break;
            }
            body.push(self.parse_chain()?);
        }

        Ok(DjCScript { header, body })
    }

    fn parse_directive(&mut self) -> Result<DjCDirective> {
        let word = match &self.peek().kind {
            DjCTokenKind::Word(w) => w.clone(),
            _ => return Err(self.error_here("a directive")),
        };
        self.bump();
        match word.as_str() {
            "ignore" => Ok(DjCDirective::Ignore(self.expect_str("a quoted file name")?)),
            "create" => Ok(DjCDirective::Create(self.expect_str("a quoted file name")?)),
            "list" => Ok(DjCDirective::List(self.expect_name("a list name")?)),
            "set" => Ok(DjCDirective::Set(self.expect_name("a set name")?)),
            "global_list" | "global_set" => {
                let name = self.expect_name("a global list name")?;
                let file = self.expect_str("a quoted file name")?;
                let ops = if matches!(self.peek().kind, DjCTokenKind::LParen) {
                    self.bump();
                    let chain = self.parse_chain()?;
                    self.expect_kind(DjCTokenKind::RParen, "')'")?;
                    Some(chain)
                } else {
                    None
                };
                if word == "global_list" {
                    Ok(DjCDirective::GlobalList { name, file, ops })
                } else {
                    Ok(DjCDirective::GlobalSet { name, file, ops })
                }
            }
            "config" => {
                let op = match &self.peek().kind {
                    DjCTokenKind::Word(w) => {
                        let w = w.clone();
                        self.bump();
                        w
                    }
                    _ => return Err(self.error_here("an operation name")),
                };
                let param = match &self.peek().kind {
                    DjCTokenKind::Name(n) => {
                        let n = n.clone();
                        self.bump();
                        n
                    }
                    DjCTokenKind::Word(w) => {
                        let w = w.clone();
                        self.bump();
                        w
                    }
                    _ => return Err(self.error_here("a parameter name")),
                };
                let value = self.parse_config_value()?;
                Ok(DjCDirective::Config { op, param, value })
            }
            "def" => {
                let name = self.expect_name("a macro name")?;
                let body = self.parse_chain()?;
                Ok(DjCDirective::Def { name, body })
            }
            _ => Err(self.error_here("a directive")),
        }
    }

    fn parse_config_value(&mut self) -> Result<DjCArg> {
        match self.peek().kind.clone() {
            DjCTokenKind::Str(s) => {
                self.bump();
                Ok(DjCArg::Str(s))
            }
            DjCTokenKind::Int(v) => {
                self.bump();
                Ok(DjCArg::Int(v))
            }
            DjCTokenKind::Float(v) => {
                self.bump();
                Ok(DjCArg::Float(v))
            }
            DjCTokenKind::Bool(v) => {
                self.bump();
                Ok(DjCArg::Bool(v))
            }
            DjCTokenKind::LBracket => {
                self.bump();
                let mut items = Vec::new();
                loop {
                    match self.peek().kind.clone() {
                        DjCTokenKind::Str(s) => {
                            self.bump();
                            items.push(s);
                        }
                        DjCTokenKind::RBracket => {
                            self.bump();
                            break;
                        }
                        _ => return Err(self.error_here("a string literal or ']'")),
                    }
                    match self.peek().kind {
                        DjCTokenKind::Comma => {
                            self.bump();
                        }
                        DjCTokenKind::RBracket => {
                            self.bump();
                            break;
                        }
                        _ => return Err(self.error_here("',' or ']'")),
                    }
                }
                Ok(DjCArg::List(items))
            }
            _ => Err(self.error_here("a literal value")),
        }
    }

    fn parse_chain(&mut self) -> Result<DjCChainAst> {
        let mut ops = Vec::new();
        loop {
            if self.at_chain_end() {
                break;
            }
            ops.push(self.parse_operation()?);
        }
        if ops.is_empty() {
            return Err(self.error_here("an operation"));
        }
        Ok(DjCChainAst { ops })
    }

    fn parse_operation(&mut self) -> Result<DjCOpAst> {
        let modifier = match self.peek().kind {
            DjCTokenKind::Modifier(c) => {
                self.bump();
                Some(match c {
                    '+' => DjCModifier::KeepAlways,
                    '*' => DjCModifier::KeepOnNotApplicable,
                    '!' => DjCModifier::Negate,
                    _ => DjCModifier::KeepOnReject,
                })
            }
            _ => None,
        };

        let node = match self.peek().kind.clone() {
            DjCTokenKind::LBrace => self.parse_block()?,
            DjCTokenKind::Word(word) => match word.as_str() {
                "use" => {
                    self.bump();
                    let mut lists = vec![self.expect_name("a named list")?];
                    while let DjCTokenKind::Name(_) = self.peek().kind {
                        lists.push(self.expect_name("a named list")?);
                    }
                    DjCOpNode::Use { lists }
                }
                "do" => {
                    self.bump();
                    let name = self.expect_name("a macro name")?;
                    DjCOpNode::MacroCall { name }
                }
                "or" => {
                    self.bump();
                    self.expect_kind(DjCTokenKind::LParen, "'('")?;
                    let mut operands = vec![self.parse_chain()?];
                    while matches!(self.peek().kind, DjCTokenKind::Comma) {
                        self.bump();
                        operands.push(self.parse_chain()?);
                    }
                    self.expect_kind(DjCTokenKind::RParen, "')'")?;
                    if operands.len() < 2 {
                        return Err(self.error_here("at least two operand chains for 'or'"));
                    }
                    DjCOpNode::Or { operands }
                }
                "ilist_if_all" | "ilist_if_any" => {
                    self.bump();
                    self.expect_kind(DjCTokenKind::LParen, "'('")?;
                    let (na_is_true, empty_is_true) = self.parse_sentinels()?;
                    let chain = self.parse_chain()?;
                    self.expect_kind(DjCTokenKind::RParen, "')'")?;
                    if word == "ilist_if_all" {
                        DjCOpNode::IListIfAll {
                            na_is_true,
                            empty_is_true,
                            chain,
                        }
                    } else {
                        DjCOpNode::IListIfAny {
                            na_is_true,
                            empty_is_true,
                            chain,
                        }
                    }
                }
                "ilist_foreach" => {
                    self.bump();
                    self.expect_kind(DjCTokenKind::LParen, "'('")?;
                    let chain = self.parse_chain()?;
                    self.expect_kind(DjCTokenKind::RParen, "')'")?;
                    DjCOpNode::IListForeach { chain }
                }
                "ilist_ratio" => {
                    self.bump();
                    let joined = if matches!(&self.peek().kind, DjCTokenKind::Word(w) if w == "joined")
                    {
                        self.bump();
                        true
                    } else {
                        false
                    };
                    self.expect_kind(DjCTokenKind::Less, "'<'")?;
                    let limit = match self.peek().kind.clone() {
                        DjCTokenKind::Float(v) => {
                            self.bump();
                            v
                        }
                        DjCTokenKind::Int(v) => {
                            self.bump();
                            v as f64
                        }
                        _ => return Err(self.error_here("a ratio limit")),
                    };
                    self.expect_kind(DjCTokenKind::LParen, "'('")?;
                    let numerator = self.parse_chain()?;
                    self.expect_kind(DjCTokenKind::Comma, "','")?;
                    let denominator = self.parse_chain()?;
                    self.expect_kind(DjCTokenKind::RParen, "')'")?;
                    DjCOpNode::IListRatio {
                        joined,
                        limit,
                        numerator,
                        denominator,
                    }
                }
                "restart" => {
                    self.bump();
                    let bound = match self.peek().kind {
                        DjCTokenKind::Int(v) => {
                            self.bump();
                            v.max(0) as u32
                        }
                        _ => 1,
                    };
                    self.expect_kind(DjCTokenKind::LParen, "'('")?;
                    let filter = self.parse_chain()?;
                    self.expect_kind(DjCTokenKind::Comma, "','")?;
                    let body = self.parse_chain()?;
                    self.expect_kind(DjCTokenKind::RParen, "')'")?;
                    DjCOpNode::Restart {
                        bound,
                        filter,
                        body,
                    }
                }
                _ => self.parse_leaf(&word)?,
            },
            _ => return Err(self.error_here("an operation")),
        };

        Ok(DjCOpAst { modifier, node })
    }

    fn parse_block(&mut self) -> Result<DjCOpNode> {
        self.expect_kind(DjCTokenKind::LBrace, "'{'")?;
        let chain = self.parse_chain()?;
        let sink = match self.peek().kind.clone() {
            DjCTokenKind::RBrace(sink) => {
                self.bump();
                sink
            }
            _ => return Err(self.error_here("'}' closing the block")),
        };
        let sink = match sink {
            Some(kind) => {
                let target = self.expect_name("a named list as sink target")?;
                Some((kind, target))
            }
            None => None,
        };
        Ok(DjCOpNode::Block { chain, sink })
    }

    fn parse_sentinels(&mut self) -> Result<(bool, bool)> {
        if !matches!(self.peek().kind, DjCTokenKind::NaMark) {
            return Ok((false, false));
        }
        self.bump();
        self.expect_kind(DjCTokenKind::Eq, "'='")?;
        let na_is_true = match self.peek().kind {
            DjCTokenKind::Bool(v) => {
                self.bump();
                v
            }
            _ => return Err(self.error_here("'True' or 'False'")),
        };
        self.expect_kind(DjCTokenKind::Comma, "','")?;
        self.expect_kind(DjCTokenKind::LBracket, "'[]'")?;
        self.expect_kind(DjCTokenKind::RBracket, "'[]'")?;
        self.expect_kind(DjCTokenKind::Eq, "'='")?;
        let empty_is_true = match self.peek().kind {
            DjCTokenKind::Bool(v) => {
                self.bump();
                v
            }
            _ => return Err(self.error_here("'True' or 'False'")),
        };
        self.expect_kind(DjCTokenKind::Comma, "','")?;
        Ok((na_is_true, empty_is_true))
    }

    fn parse_leaf(&mut self, word: &str) -> Result<DjCOpNode> {
        let signature = match self.registry.signature(word) {
            Some(signature) => signature,
            None => return Err(self.error_here("a known operation")),
        };
        self.bump();

        let mut args = Vec::new();
        for spec in signature {
            match spec {
                DjCArgSpec::Str => args.push(DjCArg::Str(self.expect_str("a string argument")?)),
                DjCArgSpec::OptStr => {
                    if let DjCTokenKind::Str(s) = self.peek().kind.clone() {
                        self.bump();
                        args.push(DjCArg::Str(s));
                    }
                }
                DjCArgSpec::Int => {
                    args.push(DjCArg::Int(self.expect_int("an integer argument")?))
                }
                DjCArgSpec::OptInt => {
                    if let DjCTokenKind::Int(v) = self.peek().kind {
                        self.bump();
                        args.push(DjCArg::Int(v));
                    }
                }
                DjCArgSpec::Float => match self.peek().kind.clone() {
                    DjCTokenKind::Float(v) => {
                        self.bump();
                        args.push(DjCArg::Float(v));
                    }
                    DjCTokenKind::Int(v) => {
                        self.bump();
                        args.push(DjCArg::Float(v as f64));
                    }
                    _ => return Err(self.error_here("a numeric argument")),
                },
                DjCArgSpec::Word => match self.peek().kind.clone() {
                    DjCTokenKind::Word(w) => {
                        self.bump();
                        args.push(DjCArg::Word(w));
                    }
                    _ => return Err(self.error_here("a word argument")),
                },
                DjCArgSpec::OptWord(expected) => {
                    if matches!(&self.peek().kind, DjCTokenKind::Word(w) if w == expected) {
                        self.bump();
                        args.push(DjCArg::Word(expected.to_string()));
                    }
                }
                DjCArgSpec::Name => {
                    args.push(DjCArg::Name(self.expect_name("a list name argument")?))
                }
                DjCArgSpec::OptLess => {
                    if matches!(self.peek().kind, DjCTokenKind::Less) {
                        self.bump();
                        args.push(DjCArg::Less);
                    }
                }
            }
        }

        Ok(DjCOpNode::Leaf {
            name: word.to_string(),
            args,
        })
    }
}
