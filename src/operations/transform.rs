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

//! Transformer operations.
//!
//! Transformers derive zero to many new entries from one entry and never
//! return the entry itself: N/A means the output would equal the input
//! verbatim, the empty ilist means the output would be the empty string.

use std::collections::HashSet;

use crate::entry::DjOutcome;
use crate::errors::{DjError, Result};
use crate::ingest::DjFReadLines;
use crate::operation::{DjCBoxedOperation, DjCOperation, DjCOperationKind};
use crate::operations::DjCArgCursor;
use crate::runtime::{DjCEnvironment, DjCRuntime};
use crate::script::lexer::DjFEscape;

/// Leading and trailing characters removed by `strip_no_and_sc` unless
/// reconfigured.
const DEFAULT_STRIP_CHARS: &str =
    "0123456789<>«»“”()[]{}|‘’,;.:_#'+*~@€²³`´^°!\"§$£¥¢%&/=?µ\\- ¡¿•";

fn changed(entry: &str, new_entry: String) -> DjOutcome {
    if new_entry == entry {
        DjOutcome::NotApplicable
    } else {
        DjOutcome::Entries(vec![new_entry])
    }
}

#[derive(Debug)]
struct _Lower {
    pos: Option<usize>,
}

impl DjCOperation for _Lower {
    fn name(&self) -> String {
        match self.pos {
            Some(pos) => format!("lower {}", pos),
            None => "lower".to_string(),
        }
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry = match self.pos {
            None => entry.to_lowercase(),
            Some(pos) => recase_at(entry, pos, false),
        };
        Ok(changed(entry, new_entry))
    }
}

#[derive(Debug)]
struct _Upper {
    pos: Option<usize>,
}

impl DjCOperation for _Upper {
    fn name(&self) -> String {
        match self.pos {
            Some(pos) => format!("upper {}", pos),
            None => "upper".to_string(),
        }
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry = match self.pos {
            None => entry.to_uppercase(),
            Some(pos) => recase_at(entry, pos, true),
        };
        Ok(changed(entry, new_entry))
    }
}

/// Recases the character at a single position; entries shorter than the
/// position stay untouched.
fn recase_at(entry: &str, pos: usize, upper: bool) -> String {
    entry
        .chars()
        .enumerate()
        .flat_map(|(i, c)| {
            let recased: Vec<char> = if i == pos {
                if upper {
                    c.to_uppercase().collect()
                } else {
                    c.to_lowercase().collect()
                }
            } else {
                vec![c]
            };
            recased
        })
        .collect()
}

/// `title` converts an entry to title case: every letter that follows a
/// non-letter is upper-cased, every other letter lower-cased.
#[derive(Debug)]
struct _Title;

impl DjCOperation for _Title {
    fn name(&self) -> String {
        "title".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut new_entry = String::with_capacity(entry.len());
        let mut prev_alpha = false;
        for c in entry.chars() {
            if c.is_alphabetic() {
                if prev_alpha {
                    new_entry.extend(c.to_lowercase());
                } else {
                    new_entry.extend(c.to_uppercase());
                }
                prev_alpha = true;
            } else {
                new_entry.push(c);
                prev_alpha = false;
            }
        }
        Ok(changed(entry, new_entry))
    }
}

#[derive(Debug)]
struct _Capitalize;

impl DjCOperation for _Capitalize {
    fn name(&self) -> String {
        "capitalize".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut chars = entry.chars();
        let new_entry = match chars.next() {
            None => String::new(),
            Some(first) => {
                let mut s: String = first.to_uppercase().collect();
                s.extend(chars.flat_map(|c| c.to_lowercase()));
                s
            }
        };
        Ok(changed(entry, new_entry))
    }
}

#[derive(Debug)]
struct _SwapCase;

impl DjCOperation for _SwapCase {
    fn name(&self) -> String {
        "swapcase".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry: String = entry
            .chars()
            .flat_map(|c| {
                if c.is_uppercase() {
                    c.to_lowercase().collect::<Vec<_>>()
                } else if c.is_lowercase() {
                    c.to_uppercase().collect::<Vec<_>>()
                } else {
                    vec![c]
                }
            })
            .collect();
        Ok(changed(entry, new_entry))
    }
}

#[derive(Debug)]
struct _Reverse;

impl DjCOperation for _Reverse {
    fn name(&self) -> String {
        "reverse".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry: String = entry.chars().rev().collect();
        Ok(changed(entry, new_entry))
    }
}

/// `rotate N` rotates the entry N characters to the left.
#[derive(Debug)]
struct _Rotate {
    by: usize,
}

impl DjCOperation for _Rotate {
    fn name(&self) -> String {
        format!("rotate {}", self.by)
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let chars: Vec<char> = entry.chars().collect();
        if self.by >= chars.len() {
            return Ok(DjOutcome::NotApplicable);
        }
        let mut new_entry = String::with_capacity(entry.len());
        new_entry.extend(&chars[self.by..]);
        new_entry.extend(&chars[..self.by]);
        Ok(changed(entry, new_entry))
    }
}

#[derive(Debug)]
struct _Multiply {
    factor: usize,
}

impl DjCOperation for _Multiply {
    fn name(&self) -> String {
        format!("multiply {}", self.factor)
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        Ok(DjOutcome::one(entry.repeat(self.factor)))
    }
}

/// Folds runs of whitespace (spaces and tabs) into one space.
#[derive(Debug)]
struct _FoldWS;

impl DjCOperation for _FoldWS {
    fn name(&self) -> String {
        "fold_ws".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut new_entry = String::with_capacity(entry.len());
        let mut in_ws = false;
        for c in entry.chars() {
            if c == ' ' || c == '\t' {
                if !in_ws {
                    new_entry.push(' ');
                }
                in_ws = true;
            } else {
                new_entry.push(c);
                in_ws = false;
            }
        }
        Ok(changed(entry, new_entry))
    }
}

#[derive(Debug)]
struct _StripWS;

impl DjCOperation for _StripWS {
    fn name(&self) -> String {
        "strip_ws".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        Ok(changed(entry, entry.trim().to_string()))
    }
}

#[derive(Debug)]
struct _Strip {
    chars: String,
    set: HashSet<char>,
}

impl DjCOperation for _Strip {
    fn name(&self) -> String {
        format!("strip \"{}\"", DjFEscape(&self.chars))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry = entry.trim_matches(|c| self.set.contains(&c)).to_string();
        Ok(changed(entry, new_entry))
    }
}

#[derive(Debug)]
struct _Remove {
    chars: String,
    set: HashSet<char>,
}

impl DjCOperation for _Remove {
    fn name(&self) -> String {
        format!("remove \"{}\"", DjFEscape(&self.chars))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry: String = entry.chars().filter(|c| !self.set.contains(c)).collect();
        Ok(changed(entry, new_entry))
    }
}

#[derive(Debug)]
struct _RemoveWS;

impl DjCOperation for _RemoveWS {
    fn name(&self) -> String {
        "remove_ws".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry: String = entry.chars().filter(|c| !c.is_whitespace()).collect();
        Ok(changed(entry, new_entry))
    }
}

#[derive(Debug)]
struct _RemoveNO;

impl DjCOperation for _RemoveNO {
    fn name(&self) -> String {
        "remove_no".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry: String = entry.chars().filter(|c| !c.is_ascii_digit()).collect();
        Ok(changed(entry, new_entry))
    }
}

/// Removes all special characters. Whitespace does not count as special;
/// fold or strip it separately. The character class is configurable via
/// `config remove_sc NON_SPECIAL_CHARACTERS_REGEXP`.
#[derive(Debug)]
struct _RemoveSC {
    keep: regex::Regex,
}

impl _RemoveSC {
    const DEFAULT_REGEXP: &'static str = r#"[^<>|,;.:_#'’+*~@€²³`´^°!"§$%&/()\[\]{}\\\-]+"#;
}

impl DjCOperation for _RemoveSC {
    fn name(&self) -> String {
        "remove_sc".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry: String = self
            .keep
            .find_iter(entry)
            .map(|m| m.as_str())
            .collect();
        Ok(changed(entry, new_entry))
    }
}

#[derive(Debug)]
struct _StripNO;

impl DjCOperation for _StripNO {
    fn name(&self) -> String {
        "strip_no".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry = entry.trim_matches(|c: char| c.is_ascii_digit()).to_string();
        Ok(changed(entry, new_entry))
    }
}

#[derive(Debug)]
struct _StripSC;

impl DjCOperation for _StripSC {
    fn name(&self) -> String {
        "strip_sc".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry = entry
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_string();
        Ok(changed(entry, new_entry))
    }
}

#[derive(Debug)]
struct _StripNOAndSC {
    chars: HashSet<char>,
}

impl DjCOperation for _StripNOAndSC {
    fn name(&self) -> String {
        "strip_no_and_sc".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry = entry
            .trim_matches(|c| self.chars.contains(&c))
            .to_string();
        Ok(changed(entry, new_entry))
    }
}

/// Maps each matched character to every character of the target set,
/// producing the full combinatorial expansion.
///
/// `map "ab" "xy"` turns `12ab` into `12xx`, `12xy`, `12yx` and `12yy`.
/// With `not`, characters *outside* the source set are matched instead.
#[derive(Debug)]
struct _Map {
    map_not: bool,
    source_raw: String,
    source: HashSet<char>,
    target_raw: String,
}

impl DjCOperation for _Map {
    fn name(&self) -> String {
        let not = if self.map_not { " not" } else { "" };
        format!(
            "map{} \"{}\" \"{}\"",
            not,
            DjFEscape(&self.source_raw),
            DjFEscape(&self.target_raw)
        )
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut hit = false;
        let mut variants = vec![String::new()];
        for c in entry.chars() {
            let in_source = self.source.contains(&c);
            if in_source != self.map_not {
                hit = true;
                let mut expanded = Vec::with_capacity(variants.len() * self.target_raw.len());
                for t in self.target_raw.chars() {
                    for variant in &variants {
                        let mut v = variant.clone();
                        v.push(t);
                        expanded.push(v);
                    }
                }
                variants = expanded;
            } else {
                for variant in &mut variants {
                    variant.push(c);
                }
            }
        }
        if hit {
            Ok(DjOutcome::Entries(variants))
        } else {
            Ok(DjOutcome::NotApplicable)
        }
    }
}

/// Replaces the character at every position by every character of the
/// given set, one position at a time.
#[derive(Debug)]
struct _PosMap {
    target_raw: String,
    targets: Vec<char>,
}

impl DjCOperation for _PosMap {
    fn name(&self) -> String {
        format!("pos_map \"{}\"", DjFEscape(&self.target_raw))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let chars: Vec<char> = entry.chars().collect();
        let mut variants = Vec::with_capacity(chars.len() * self.targets.len());
        for i in 0..chars.len() {
            for t in &self.targets {
                let mut v = String::with_capacity(entry.len());
                v.extend(&chars[..i]);
                v.push(*t);
                v.extend(&chars[i + 1..]);
                variants.push(v);
            }
        }
        Ok(DjOutcome::Entries(variants))
    }
}

/// Appends a string to an entry, or - with `each` - behind every
/// character, which is how Hashcat append rules are generated.
#[derive(Debug)]
struct _Append {
    each: bool,
    s: String,
}

impl DjCOperation for _Append {
    fn name(&self) -> String {
        let each = if self.each { " each" } else { "" };
        format!("append{} \"{}\"", each, DjFEscape(&self.s))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry = if self.each {
            let mut v = String::new();
            for c in entry.chars() {
                v.push(c);
                v.push_str(&self.s);
            }
            v
        } else {
            format!("{}{}", entry, self.s)
        };
        Ok(DjOutcome::Entries(vec![new_entry]))
    }
}

/// Prepends a string to an entry, or - with `each` - before every
/// character (`prepend each "$"` of `pass` is `$p$a$s$s`).
#[derive(Debug)]
struct _Prepend {
    each: bool,
    s: String,
}

impl DjCOperation for _Prepend {
    fn name(&self) -> String {
        let each = if self.each { " each" } else { "" };
        format!("prepend{} \"{}\"", each, DjFEscape(&self.s))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let new_entry = if self.each {
            let mut v = String::new();
            for c in entry.chars() {
                v.push_str(&self.s);
                v.push(c);
            }
            v
        } else {
            format!("{}{}", self.s, entry)
        };
        Ok(DjOutcome::Entries(vec![new_entry]))
    }
}

/// Splits an entry at every occurrence of the separator. N/A when the
/// separator does not occur; empty segments are discarded.
#[derive(Debug)]
struct _Split {
    separator: String,
}

impl DjCOperation for _Split {
    fn name(&self) -> String {
        format!("split \"{}\"", DjFEscape(&self.separator))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let segments: Vec<&str> = entry.split(&self.separator).collect();
        if segments.len() == 1 {
            return Ok(DjOutcome::NotApplicable);
        }
        Ok(DjOutcome::Entries(
            segments
                .into_iter()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect(),
        ))
    }
}

/// Splits an entry and produces every ordered combination of the
/// segments, concatenated. `sub_split "-"` of `abc-def-ghi` yields the
/// three segments plus `abcdef`, `abcghi`, `defghi`.
#[derive(Debug)]
struct _SubSplit {
    separator: String,
}

impl _SubSplit {
    fn collect(current: String, remaining: &[String], take: usize, out: &mut Vec<String>) {
        if take == 0 {
            out.push(current);
            return;
        }
        if remaining.is_empty() || take > remaining.len() {
            return;
        }
        let mut with = current.clone();
        with.push_str(&remaining[0]);
        Self::collect(with, &remaining[1..], take - 1, out);
        Self::collect(current, &remaining[1..], take, out);
    }
}

impl DjCOperation for _SubSplit {
    fn name(&self) -> String {
        format!("sub_split \"{}\"", DjFEscape(&self.separator))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let raw: Vec<&str> = entry.split(&self.separator).collect();
        if raw.len() == 1 {
            return Ok(DjOutcome::NotApplicable);
        }
        let segments: Vec<String> = raw
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        if segments.is_empty() {
            // the entry consisted of separators only
            return Ok(DjOutcome::empty());
        }
        let mut out = Vec::new();
        for take in 1..segments.len() {
            Self::collect(String::new(), &segments, take, &mut out);
        }
        out.extend(segments);
        Ok(DjOutcome::Entries(out))
    }
}

/// Replaces every matched character by the count of matched characters
/// seen so far: `number "aeiou"` turns `Bullen jagen` into `B1ll2n j3g4n`.
#[derive(Debug)]
struct _Number {
    chars_raw: String,
    chars: HashSet<char>,
}

impl DjCOperation for _Number {
    fn name(&self) -> String {
        format!("number \"{}\"", DjFEscape(&self.chars_raw))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut count = 0usize;
        let mut new_entry = String::with_capacity(entry.len());
        for c in entry.chars() {
            if self.chars.contains(&c) {
                count += 1;
                new_entry.push_str(&count.to_string());
            } else {
                new_entry.push(c);
            }
        }
        if count == 0 {
            Ok(DjOutcome::NotApplicable)
        } else {
            Ok(DjOutcome::Entries(vec![new_entry]))
        }
    }
}

/// Unescapes one token of a replacement table: `\s` encodes a space,
/// `\#` a hash and `\\` a backslash.
fn unescape_table_token(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('#') => out.push('#'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn read_replacement_pairs(op: &str, file: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for line in DjFReadLines(file)? {
        let trimmed = line.trim();
        if trimmed.starts_with('#') || trimmed.is_empty() {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let (key, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(k), Some(v), None) => (k, v),
            _ => {
                return Err(DjError::resolve(format!(
                    "{} \"{}\": invalid table entry: {}",
                    op, file, trimmed
                )))
            }
        };
        let key = unescape_table_token(key);
        let value = unescape_table_token(value);
        if key == value {
            return Err(DjError::resolve(format!(
                "{} \"{}\": key equals value: {}",
                op, file, trimmed
            )));
        }
        pairs.push((key, value));
    }
    Ok(pairs)
}

/// Applies a two-column replacement table loaded from a file; every
/// occurrence of a key is replaced by its value, in table order.
#[derive(Debug)]
struct _Replace {
    file: String,
    table: Vec<(String, String)>,
}

impl DjCOperation for _Replace {
    fn name(&self) -> String {
        format!("replace \"{}\"", DjFEscape(&self.file))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut new_entry = entry.to_string();
        for (key, value) in &self.table {
            new_entry = new_entry.replace(key.as_str(), value);
        }
        Ok(changed(entry, new_entry))
    }
}

/// Applies up to N replacements from a one-to-many replacement table,
/// producing every combination. The budget defaults to 2 and is
/// configurable via `config multi_replace APPLY_UP_TO_N_REPLACEMENTS`.
#[derive(Debug)]
struct _MultiReplace {
    file: String,
    table: Vec<(String, String)>,
    budget: usize,
}

impl DjCOperation for _MultiReplace {
    fn name(&self) -> String {
        format!("multi_replace \"{}\"", DjFEscape(&self.file))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut all = Vec::new();
        let mut by_rounds: Vec<Vec<String>> = vec![Vec::new(); self.budget + 1];
        for (key, value) in &self.table {
            for round in (1..self.budget).rev() {
                let candidates = by_rounds[round].clone();
                for candidate in candidates {
                    let replaced = candidate.replace(key.as_str(), value);
                    if replaced != candidate {
                        all.push(replaced.clone());
                        by_rounds[round + 1].push(replaced);
                    }
                }
            }
            let replaced = entry.replace(key.as_str(), value);
            if replaced != entry {
                all.push(replaced.clone());
                by_rounds[1].push(replaced);
            }
        }
        if all.is_empty() {
            Ok(DjOutcome::NotApplicable)
        } else {
            Ok(DjOutcome::Entries(all))
        }
    }
}

/// Recursively discards the trailing whitespace-separated term while it
/// appears in the endings file. At least one term always survives.
#[derive(Debug)]
struct _DiscardEndings {
    file: String,
    endings: HashSet<String>,
}

impl DjCOperation for _DiscardEndings {
    fn name(&self) -> String {
        format!("discard_endings \"{}\"", DjFEscape(&self.file))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let terms: Vec<&str> = entry.split_whitespace().collect();
        let mut keep = terms.len();
        while keep > 1 && self.endings.contains(terms[keep - 1]) {
            keep -= 1;
        }
        if keep == terms.len() {
            Ok(DjOutcome::NotApplicable)
        } else {
            Ok(DjOutcome::Entries(vec![terms[..keep].join(" ")]))
        }
    }
}

/// Collapses runs of identical adjacent characters: `aaabbbccc` becomes
/// `abc`. N/A when the entry contains no run.
#[derive(Debug)]
struct _Deduplicate;

impl DjCOperation for _Deduplicate {
    fn name(&self) -> String {
        "deduplicate".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut new_entry = String::with_capacity(entry.len());
        let mut last: Option<char> = None;
        for c in entry.chars() {
            if last != Some(c) {
                new_entry.push(c);
            }
            last = Some(c);
        }
        Ok(changed(entry, new_entry))
    }
}

/// Discards an entry's ending when it matches an entry of the given
/// global list; every matching suffix yields one variant. The remaining
/// prefix must keep a configurable minimum length.
#[derive(Debug)]
struct _GListDrop {
    list: String,
    entries: HashSet<String>,
    min_length: usize,
}

impl DjCOperation for _GListDrop {
    fn name(&self) -> String {
        format!("glist_drop {}", self.list)
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let chars: Vec<char> = entry.chars().collect();
        let mut variants = Vec::new();
        for split in (self.min_length..chars.len()).rev() {
            let suffix: String = chars[split..].iter().collect();
            if self.entries.contains(&suffix) {
                variants.push(chars[..split].iter().collect());
            }
        }
        if variants.is_empty() {
            Ok(DjOutcome::NotApplicable)
        } else {
            Ok(DjOutcome::Entries(variants))
        }
    }
}

#[allow(non_snake_case)]
pub fn DjFLowerFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let pos = args.opt_int().map(|v| v as usize);
    Ok(Box::new(_Lower { pos }))
}

#[allow(non_snake_case)]
pub fn DjFUpperFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let pos = args.opt_int().map(|v| v as usize);
    Ok(Box::new(_Upper { pos }))
}

#[allow(non_snake_case)]
pub fn DjFTitleFactory(_args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_Title))
}

#[allow(non_snake_case)]
pub fn DjFCapitalizeFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_Capitalize))
}

#[allow(non_snake_case)]
pub fn DjFSwapCaseFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_SwapCase))
}

#[allow(non_snake_case)]
pub fn DjFReverseFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_Reverse))
}

#[allow(non_snake_case)]
pub fn DjFRotateFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let by = args.next_int()?;
    if by < 1 {
        return Err(DjError::resolve("rotate: the distance has to be >= 1"));
    }
    Ok(Box::new(_Rotate { by: by as usize }))
}

#[allow(non_snake_case)]
pub fn DjFMultiplyFactory(
    args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let factor = args.next_int()?;
    if factor <= 1 {
        return Err(DjError::resolve(
            "multiply: the multiplication factor has to be > 1",
        ));
    }
    Ok(Box::new(_Multiply {
        factor: factor as usize,
    }))
}

#[allow(non_snake_case)]
pub fn DjFFoldWSFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_FoldWS))
}

#[allow(non_snake_case)]
pub fn DjFStripWSFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_StripWS))
}

fn char_set(op: &str, chars: &str) -> Result<HashSet<char>> {
    if chars.is_empty() {
        return Err(DjError::resolve(format!("{}: no characters given", op)));
    }
    let set: HashSet<char> = chars.chars().collect();
    if set.len() != chars.chars().count() {
        return Err(DjError::resolve(format!(
            "{}: the character set contains duplicates",
            op
        )));
    }
    Ok(set)
}

#[allow(non_snake_case)]
pub fn DjFStripFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let chars = args.next_str()?;
    let set = char_set("strip", &chars)?;
    Ok(Box::new(_Strip { chars, set }))
}

#[allow(non_snake_case)]
pub fn DjFRemoveFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let chars = args.next_str()?;
    let set = char_set("remove", &chars)?;
    Ok(Box::new(_Remove { chars, set }))
}

#[allow(non_snake_case)]
pub fn DjFRemoveWSFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_RemoveWS))
}

#[allow(non_snake_case)]
pub fn DjFRemoveNOFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_RemoveNO))
}

#[allow(non_snake_case)]
pub fn DjFRemoveSCFactory(
    _args: &mut DjCArgCursor,
    env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let pattern = env
        .config
        .str_value("remove_sc", "NON_SPECIAL_CHARACTERS_REGEXP")?
        .unwrap_or(_RemoveSC::DEFAULT_REGEXP);
    let keep = regex::Regex::new(pattern)
        .map_err(|err| DjError::resolve(format!("remove_sc: invalid regex: {}", err)))?;
    Ok(Box::new(_RemoveSC { keep }))
}

#[allow(non_snake_case)]
pub fn DjFStripNOFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_StripNO))
}

#[allow(non_snake_case)]
pub fn DjFStripSCFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_StripSC))
}

#[allow(non_snake_case)]
pub fn DjFStripNOAndSCFactory(
    _args: &mut DjCArgCursor,
    env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let chars = env
        .config
        .str_value("strip_no_and_sc", "STRIP_CHARS")?
        .unwrap_or(DEFAULT_STRIP_CHARS);
    Ok(Box::new(_StripNOAndSC {
        chars: chars.chars().collect(),
    }))
}

#[allow(non_snake_case)]
pub fn DjFMapFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let map_not = args.take_word("not");
    let source_raw = args.next_str()?;
    let target_raw = args.next_str()?;
    let source = char_set("map", &source_raw)?;
    if target_raw.is_empty() {
        return Err(DjError::resolve("map: no target characters given"));
    }
    let target: HashSet<char> = target_raw.chars().collect();
    if !source.is_disjoint(&target) {
        return Err(DjError::resolve(
            "map: source and target characters overlap in an identity mapping",
        ));
    }
    Ok(Box::new(_Map {
        map_not,
        source_raw,
        source,
        target_raw,
    }))
}

#[allow(non_snake_case)]
pub fn DjFPosMapFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let target_raw = args.next_str()?;
    if target_raw.is_empty() {
        return Err(DjError::resolve("pos_map: no target characters given"));
    }
    let mut seen = HashSet::new();
    let targets: Vec<char> = target_raw.chars().filter(|c| seen.insert(*c)).collect();
    Ok(Box::new(_PosMap {
        target_raw,
        targets,
    }))
}

#[allow(non_snake_case)]
pub fn DjFAppendFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let each = args.take_word("each");
    let s = args.next_str()?;
    if s.is_empty() {
        return Err(DjError::resolve("append: useless append of nothing"));
    }
    Ok(Box::new(_Append { each, s }))
}

#[allow(non_snake_case)]
pub fn DjFPrependFactory(
    args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let each = args.take_word("each");
    let s = args.next_str()?;
    if s.is_empty() {
        return Err(DjError::resolve("prepend: useless prepend of nothing"));
    }
    Ok(Box::new(_Prepend { each, s }))
}

#[allow(non_snake_case)]
pub fn DjFSplitFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let separator = args.next_str()?;
    if separator.is_empty() {
        return Err(DjError::resolve("split: missing split character"));
    }
    Ok(Box::new(_Split { separator }))
}

#[allow(non_snake_case)]
pub fn DjFSubSplitFactory(
    args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let separator = args.next_str()?;
    if separator.is_empty() {
        return Err(DjError::resolve("sub_split: missing split character"));
    }
    Ok(Box::new(_SubSplit { separator }))
}

#[allow(non_snake_case)]
pub fn DjFNumberFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let chars_raw = args.next_str()?;
    let chars = char_set("number", &chars_raw)?;
    Ok(Box::new(_Number { chars_raw, chars }))
}

#[allow(non_snake_case)]
pub fn DjFReplaceFactory(
    args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let file = args.next_str()?;
    let pairs = read_replacement_pairs("replace", &file)?;
    let mut table: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    let mut keys = HashSet::new();
    for (key, value) in pairs {
        if !keys.insert(key.clone()) {
            return Err(DjError::resolve(format!(
                "replace \"{}\": the key {} is already used",
                file, key
            )));
        }
        if keys.contains(&value) {
            return Err(DjError::resolve(format!(
                "replace \"{}\": the value {} is also used as a key",
                file, value
            )));
        }
        table.push((key, value));
    }
    Ok(Box::new(_Replace { file, table }))
}

#[allow(non_snake_case)]
pub fn DjFMultiReplaceFactory(
    args: &mut DjCArgCursor,
    env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let file = args.next_str()?;
    let table = read_replacement_pairs("multi_replace", &file)?;
    let budget = env
        .config
        .int_value("multi_replace", "APPLY_UP_TO_N_REPLACEMENTS")?
        .unwrap_or(2);
    if budget < 1 {
        return Err(DjError::config(
            "multi_replace APPLY_UP_TO_N_REPLACEMENTS has to be >= 1",
        ));
    }
    Ok(Box::new(_MultiReplace {
        file,
        table,
        budget: budget as usize,
    }))
}

#[allow(non_snake_case)]
pub fn DjFDiscardEndingsFactory(
    args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let file = args.next_str()?;
    let endings: HashSet<String> = DjFReadLines(&file)?.into_iter().collect();
    Ok(Box::new(_DiscardEndings { file, endings }))
}

#[allow(non_snake_case)]
pub fn DjFDeduplicateFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_Deduplicate))
}

#[allow(non_snake_case)]
pub fn DjFGListDropFactory(
    args: &mut DjCArgCursor,
    env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let list = args.next_name()?;
    let entries: HashSet<String> = match env.global(&list) {
        Some(entries) => entries.iter().cloned().collect(),
        None => {
            return Err(DjError::resolve(format!(
                "glist_drop: global list {} does not exist",
                list
            )))
        }
    };
    let min_length = env.config.int_value("glist_drop", "MIN_LENGTH")?.unwrap_or(4);
    Ok(Box::new(_GListDrop {
        list,
        entries,
        min_length: min_length.max(0) as usize,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::tests::runtime;

    #[test]
    fn lower_applies_only_on_change() {
        let op = _Lower { pos: None };
        let mut rt = runtime();
        assert_eq!(op.apply("AbC", &mut rt).unwrap(), DjOutcome::one("abc"));
        assert_eq!(op.apply("abc", &mut rt).unwrap(), DjOutcome::NotApplicable);
    }

    #[test]
    fn lower_positional() {
        let op = _Lower { pos: Some(1) };
        let mut rt = runtime();
        assert_eq!(op.apply("ABC", &mut rt).unwrap(), DjOutcome::one("AbC"));
    }

    #[test]
    fn map_expands_combinatorially() {
        let op = _Map {
            map_not: false,
            source_raw: " ".to_string(),
            source: [' '].into_iter().collect(),
            target_raw: "-_".to_string(),
        };
        let mut rt = runtime();
        assert_eq!(
            op.apply("Audi RS", &mut rt).unwrap(),
            DjOutcome::Entries(vec!["Audi-RS".to_string(), "Audi_RS".to_string()])
        );
        assert_eq!(op.apply("AudiRS", &mut rt).unwrap(), DjOutcome::NotApplicable);
    }

    #[test]
    fn split_drops_empty_segments() {
        let op = _Split {
            separator: " ".to_string(),
        };
        let mut rt = runtime();
        assert_eq!(
            op.apply("a  b", &mut rt).unwrap(),
            DjOutcome::Entries(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(op.apply("ab", &mut rt).unwrap(), DjOutcome::NotApplicable);
        assert_eq!(op.apply(" ", &mut rt).unwrap(), DjOutcome::empty());
    }

    #[test]
    fn remove_ws_is_a_real_removal() {
        let op = _RemoveWS;
        let mut rt = runtime();
        assert_eq!(op.apply("a b c", &mut rt).unwrap(), DjOutcome::one("abc"));
        assert_eq!(op.apply(" abc", &mut rt).unwrap(), DjOutcome::one("abc"));
        assert_eq!(op.apply("abc", &mut rt).unwrap(), DjOutcome::NotApplicable);
        assert_eq!(op.apply("  ", &mut rt).unwrap(), DjOutcome::empty());
    }

    #[test]
    fn deduplicate_collapses_runs_and_is_idempotent() {
        let op = _Deduplicate;
        let mut rt = runtime();
        assert_eq!(
            op.apply("aaabbbccc", &mut rt).unwrap(),
            DjOutcome::one("abc")
        );
        assert_eq!(op.apply("abc", &mut rt).unwrap(), DjOutcome::NotApplicable);
    }

    #[test]
    fn sub_split_produces_ordered_combinations() {
        let op = _SubSplit {
            separator: "-".to_string(),
        };
        let mut rt = runtime();
        let out = op.apply("abc-def-ghi", &mut rt).unwrap();
        let list = out.into_entries().unwrap();
        for expected in ["abc", "def", "ghi", "abcdef", "abcghi", "defghi"] {
            assert!(list.contains(&expected.to_string()), "missing {}", expected);
        }
    }

    #[test]
    fn prepend_each_interleaves() {
        let op = _Prepend {
            each: true,
            s: "$".to_string(),
        };
        let mut rt = runtime();
        assert_eq!(op.apply("ab", &mut rt).unwrap(), DjOutcome::one("$a$b"));
    }

    #[test]
    fn number_counts_matches() {
        let op = _Number {
            chars_raw: "aeiou".to_string(),
            chars: "aeiou".chars().collect(),
        };
        let mut rt = runtime();
        assert_eq!(
            op.apply("Bullen jagen", &mut rt).unwrap(),
            DjOutcome::one("B1ll2n j3g4n")
        );
    }

    #[test]
    fn discard_endings_keeps_at_least_one_term() {
        let op = _DiscardEndings {
            file: "endings.txt".to_string(),
            endings: ["ist".to_string(), "ein".to_string()].into_iter().collect(),
        };
        let mut rt = runtime();
        assert_eq!(
            op.apply("Michael ist ein", &mut rt).unwrap(),
            DjOutcome::one("Michael")
        );
        assert_eq!(
            op.apply("ist ein", &mut rt).unwrap(),
            DjOutcome::one("ist")
        );
    }
}
