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

//! Tokenizer for DJ scripts.
//!
//! The script language is line-oriented: one directive or chain per line.
//! A trailing `\` on a non-comment line splices the next line; `#` starts
//! a comment running to end of line. Inside parentheses, braces and
//! brackets newlines are insignificant, which lets combinator operands
//! and blocks span lines without explicit continuations.
//!
//! Quoted strings support the escapes `\\`, `\n`, `\t`, `\r` and `\"`.

use crate::errors::{DjError, Result};

/// Token kinds of the script grammar.
#[derive(Clone, Debug, PartialEq)]
pub enum DjCTokenKind {
    /// Lowercase operation word: `[a-z_]+`.
    Word(String),
    /// Uppercase identifier of a named list or macro: `[A-Z_][A-Z0-9_]*`.
    Name(String),
    /// Unescaped string literal.
    Str(String),
    Int(i64),
    Float(f64),
    /// `True` / `False`.
    Bool(bool),
    /// The `N/A` sentinel of quantifier clauses.
    NaMark,
    /// Modifier prefix: one of `+ * ! ~`.
    Modifier(char),
    LBrace,
    /// `}` optionally fused with a sink arrow (`}>`, `}[]>`, `}/>`, `}/[]>`).
    RBrace(Option<crate::script::ast::DjCSink>),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Less,
    Eq,
    /// Statement separator (suppressed inside any bracketing).
    Newline,
    Eof,
}

#[derive(Clone, Debug)]
pub struct DjCToken {
    pub kind: DjCTokenKind,
    pub line: usize,
    pub column: usize,
}

impl DjCToken {
    pub fn describe(&self) -> String {
        match &self.kind {
            DjCTokenKind::Word(w) => format!("'{}'", w),
            DjCTokenKind::Name(n) => format!("'{}'", n),
            DjCTokenKind::Str(_) => "string literal".to_string(),
            DjCTokenKind::Int(v) => format!("integer {}", v),
            DjCTokenKind::Float(v) => format!("float {}", v),
            DjCTokenKind::Bool(v) => format!("{}", v),
            DjCTokenKind::NaMark => "'N/A'".to_string(),
            DjCTokenKind::Modifier(c) => format!("modifier '{}'", c),
            DjCTokenKind::LBrace => "'{'".to_string(),
            DjCTokenKind::RBrace(None) => "'}'".to_string(),
            DjCTokenKind::RBrace(Some(sink)) => format!("'}}{}'", sink.symbol()),
            DjCTokenKind::LParen => "'('".to_string(),
            DjCTokenKind::RParen => "')'".to_string(),
            DjCTokenKind::LBracket => "'['".to_string(),
            DjCTokenKind::RBracket => "']'".to_string(),
            DjCTokenKind::Comma => "','".to_string(),
            DjCTokenKind::Less => "'<'".to_string(),
            DjCTokenKind::Eq => "'='".to_string(),
            DjCTokenKind::Newline => "end of line".to_string(),
            DjCTokenKind::Eof => "end of script".to_string(),
        }
    }
}

/// Applies the script escape rules to a raw string body.
#[allow(non_snake_case)]
pub fn DjFUnescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Inverse of [`DjFUnescape`], used when rendering operations.
#[allow(non_snake_case)]
pub fn DjFEscape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
        .replace('\r', "\\r")
        .replace('"', "\\\"")
}

struct DjCLexerState {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    depth: usize,
    tokens: Vec<DjCToken>,
}

impl DjCLexerState {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: DjCTokenKind, line: usize, column: usize) {
        self.tokens.push(DjCToken { kind, line, column });
    }

    fn error(&self, expected: &str) -> DjError {
        DjError::parse(self.line, self.column, expected.to_string())
    }
}

/// Tokenizes a complete script source.
#[allow(non_snake_case)]
pub fn DjFTokenize(source: &str) -> Result<Vec<DjCToken>> {
    let mut lx = DjCLexerState {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
        depth: 0,
        tokens: Vec::new(),
    };

    while let Some(c) = lx.peek() {
        let (line, column) = (lx.line, lx.column);
        match c {
            ' ' | '\t' | '\r' => {
                lx.bump();
            }
            '\n' => {
                lx.bump();
                if lx.depth == 0 {
                    lx.push(DjCTokenKind::Newline, line, column);
                }
            }
            '#' => {
                while let Some(c) = lx.peek() {
                    if c == '\n' {
                        break;
                    }
                    lx.bump();
                }
            }
            '\\' => {
                // Line continuation: the backslash must be the last
                // meaningful character before the newline.
                lx.bump();
                while matches!(lx.peek(), Some(' ') | Some('\t') | Some('\r')) {
                    lx.bump();
                }
                match lx.peek() {
                    Some('\n') => {
                        lx.bump();
                    }
                    _ => return Err(lx.error("newline after line continuation '\\'")),
                }
            }
            '"' => {
                lx.bump();
                let mut raw = String::new();
                loop {
                    match lx.peek() {
                        None | Some('\n') => return Err(lx.error("closing '\"'")),
                        Some('\\') => {
                            raw.push(lx.bump().unwrap());
                            if let Some(esc) = lx.bump() {
                                raw.push(esc);
                            }
                        }
                        Some('"') => {
                            lx.bump();
                            break;
                        }
                        Some(_) => raw.push(lx.bump().unwrap()),
                    }
                }
                lx.push(DjCTokenKind::Str(DjFUnescape(&raw)), line, column);
            }
            '0'..='9' => {
                let mut text = String::new();
                while matches!(lx.peek(), Some('0'..='9')) {
                    text.push(lx.bump().unwrap());
                }
                let is_float =
                    lx.peek() == Some('.') && matches!(lx.peek_at(1), Some('0'..='9'));
                if is_float {
                    text.push(lx.bump().unwrap());
                    while matches!(lx.peek(), Some('0'..='9')) {
                        text.push(lx.bump().unwrap());
                    }
                    let value: f64 = text
                        .parse()
                        .map_err(|_| lx.error("a float literal"))?;
                    lx.push(DjCTokenKind::Float(value), line, column);
                } else {
                    let value: i64 = text
                        .parse()
                        .map_err(|_| lx.error("an integer literal"))?;
                    lx.push(DjCTokenKind::Int(value), line, column);
                }
            }
            'a'..='z' | '_' => {
                let mut word = String::new();
                while matches!(lx.peek(), Some('a'..='z') | Some('_')) {
                    word.push(lx.bump().unwrap());
                }
                lx.push(DjCTokenKind::Word(word), line, column);
            }
            'A'..='Z' => {
                // "N/A" sentinel, "True"/"False" booleans, else an
                // uppercase list/macro identifier.
                if c == 'N' && lx.peek_at(1) == Some('/') && lx.peek_at(2) == Some('A') {
                    lx.bump();
                    lx.bump();
                    lx.bump();
                    lx.push(DjCTokenKind::NaMark, line, column);
                    continue;
                }
                if lexes_keyword(&lx, "True") {
                    for _ in 0.."True".len() {
                        lx.bump();
                    }
                    lx.push(DjCTokenKind::Bool(true), line, column);
                    continue;
                }
                if lexes_keyword(&lx, "False") {
                    for _ in 0.."False".len() {
                        lx.bump();
                    }
                    lx.push(DjCTokenKind::Bool(false), line, column);
                    continue;
                }
                let mut name = String::new();
                while matches!(lx.peek(), Some('A'..='Z') | Some('0'..='9') | Some('_')) {
                    name.push(lx.bump().unwrap());
                }
                lx.push(DjCTokenKind::Name(name), line, column);
            }
            '+' | '*' | '!' | '~' => {
                lx.bump();
                lx.push(DjCTokenKind::Modifier(c), line, column);
            }
            '{' => {
                lx.bump();
                lx.depth += 1;
                lx.push(DjCTokenKind::LBrace, line, column);
            }
            '}' => {
                lx.bump();
                lx.depth = lx.depth.saturating_sub(1);
                let sink = lex_sink(&mut lx);
                lx.push(DjCTokenKind::RBrace(sink), line, column);
            }
            '(' => {
                lx.bump();
                lx.depth += 1;
                lx.push(DjCTokenKind::LParen, line, column);
            }
            ')' => {
                lx.bump();
                lx.depth = lx.depth.saturating_sub(1);
                lx.push(DjCTokenKind::RParen, line, column);
            }
            '[' => {
                lx.bump();
                lx.depth += 1;
                lx.push(DjCTokenKind::LBracket, line, column);
            }
            ']' => {
                lx.bump();
                lx.depth = lx.depth.saturating_sub(1);
                lx.push(DjCTokenKind::RBracket, line, column);
            }
            ',' => {
                lx.bump();
                lx.push(DjCTokenKind::Comma, line, column);
            }
            '<' => {
                lx.bump();
                lx.push(DjCTokenKind::Less, line, column);
            }
            '=' => {
                lx.bump();
                lx.push(DjCTokenKind::Eq, line, column);
            }
            other => {
                return Err(DjError::parse(
                    line,
                    column,
                    format!("a token (found '{}')", other),
                ));
            }
        }
    }

    let (line, column) = (lx.line, lx.column);
    lx.push(DjCTokenKind::Newline, line, column);
    lx.push(DjCTokenKind::Eof, line, column);
    Ok(lx.tokens)
}

fn lexes_keyword(lx: &DjCLexerState, keyword: &str) -> bool {
    for (i, k) in keyword.chars().enumerate() {
        if lx.peek_at(i) != Some(k) {
            return false;
        }
    }
    // The keyword must not be a prefix of a longer identifier.
    !matches!(
        lx.peek_at(keyword.len()),
        Some('a'..='z') | Some('A'..='Z') | Some('0'..='9') | Some('_')
    )
}

fn lex_sink(lx: &mut DjCLexerState) -> Option<crate::script::ast::DjCSink> {
    use crate::script::ast::DjCSink;
    match lx.peek() {
        Some('>') => {
            lx.bump();
            Some(DjCSink::Collect)
        }
        Some('[') if lx.peek_at(1) == Some(']') && lx.peek_at(2) == Some('>') => {
            lx.bump();
            lx.bump();
            lx.bump();
            Some(DjCSink::CollectOriginals)
        }
        Some('/') if lx.peek_at(1) == Some('>') => {
            lx.bump();
            lx.bump();
            Some(DjCSink::Tee)
        }
        Some('/')
            if lx.peek_at(1) == Some('[')
                && lx.peek_at(2) == Some(']')
                && lx.peek_at(3) == Some('>') =>
        {
            lx.bump();
            lx.bump();
            lx.bump();
            lx.bump();
            Some(DjCSink::TeeOriginals)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<DjCTokenKind> {
        DjFTokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn words_names_and_literals() {
        let k = kinds("min length 3 use L \"a b\" 0.5");
        assert_eq!(
            k[..7],
            [
                DjCTokenKind::Word("min".into()),
                DjCTokenKind::Word("length".into()),
                DjCTokenKind::Int(3),
                DjCTokenKind::Word("use".into()),
                DjCTokenKind::Name("L".into()),
                DjCTokenKind::Str("a b".into()),
                DjCTokenKind::Float(0.5),
            ]
        );
    }

    #[test]
    fn continuation_splices_lines() {
        let k = kinds("lower \\\nreport");
        assert_eq!(
            k[..2],
            [
                DjCTokenKind::Word("lower".into()),
                DjCTokenKind::Word("report".into()),
            ]
        );
    }

    #[test]
    fn comments_are_dropped() {
        let k = kinds("lower # the rest is ignored\nreport");
        assert!(k.contains(&DjCTokenKind::Word("report".into())));
        assert!(!k.iter().any(|t| matches!(t, DjCTokenKind::Word(w) if w == "the")));
    }

    #[test]
    fn sinks_fuse_with_closing_brace() {
        use crate::script::ast::DjCSink;
        let k = kinds("{ lower }[]> L");
        assert!(k.contains(&DjCTokenKind::RBrace(Some(DjCSink::CollectOriginals))));
        let k = kinds("{ lower }/[]> L");
        assert!(k.contains(&DjCTokenKind::RBrace(Some(DjCSink::TeeOriginals))));
    }

    #[test]
    fn string_escapes() {
        let k = kinds(r#""a\tb\"c""#);
        assert_eq!(k[0], DjCTokenKind::Str("a\tb\"c".into()));
    }

    #[test]
    fn na_sentinel_and_bools() {
        let k = kinds("ilist_if_any(N/A = True, [] = False, lower)");
        assert!(k.contains(&DjCTokenKind::NaMark));
        assert!(k.contains(&DjCTokenKind::Bool(true)));
        assert!(k.contains(&DjCTokenKind::Bool(false)));
    }

    #[test]
    fn newlines_inside_parens_are_insignificant() {
        let k = kinds("or(lower,\nupper)");
        assert!(!k[..k.len() - 2].contains(&DjCTokenKind::Newline));
    }
}
