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

//! Extractor operations.
//!
//! Extractors pull parts out of an entry and return the matches as an
//! ilist; N/A means no match structure applied. Unlike transformers an
//! extractor may legitimately "extract" the whole entry, e.g. `get_no`
//! applied to an entry that consists of digits only.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::entry::DjOutcome;
use crate::errors::{DjError, Result};
use crate::operation::{DjCBoxedOperation, DjCOperation, DjCOperationKind};
use crate::operations::DjCArgCursor;
use crate::runtime::{DjCEnvironment, DjCRuntime};
use crate::script::lexer::DjFEscape;

static NUMBERS: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]+").expect("static regex"));
static HEX_TERM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$HEX\[([a-fA-F0-9]+)\]").expect("static regex"));

/// Runs a regex against the entry and extracts every match. Without
/// capture groups the full matches are returned; with groups, each
/// group's text is returned, or - with `join` - all group texts fused
/// into a single entry.
#[derive(Debug)]
struct _FindAll {
    join: bool,
    pattern: String,
    matcher: Regex,
}

impl DjCOperation for _FindAll {
    fn name(&self) -> String {
        let join = if self.join { " join" } else { "" };
        format!("find_all{} \"{}\"", join, DjFEscape(&self.pattern))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Extractor
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        if self.matcher.captures_len() == 1 {
            let matches: Vec<String> = self
                .matcher
                .find_iter(entry)
                .map(|m| m.as_str().to_string())
                .collect();
            if matches.is_empty() {
                return Ok(DjOutcome::NotApplicable);
            }
            return Ok(DjOutcome::Entries(matches));
        }

        let mut groups = Vec::new();
        for captures in self.matcher.captures_iter(entry) {
            for group in captures.iter().skip(1).flatten() {
                groups.push(group.as_str().to_string());
            }
        }
        if groups.is_empty() {
            Ok(DjOutcome::NotApplicable)
        } else if self.join {
            Ok(DjOutcome::one(groups.concat()))
        } else {
            Ok(DjOutcome::Entries(groups))
        }
    }
}

/// Extracts all digit sequences.
#[derive(Debug)]
struct _GetNO;

impl DjCOperation for _GetNO {
    fn name(&self) -> String {
        "get_no".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Extractor
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let matches: Vec<String> = NUMBERS
            .find_iter(entry)
            .map(|m| m.as_str().to_string())
            .collect();
        if matches.is_empty() {
            Ok(DjOutcome::NotApplicable)
        } else {
            Ok(DjOutcome::Entries(matches))
        }
    }
}

/// Extracts the special character sequences. The character class is
/// configurable via `config get_sc SPECIAL_CHARACTERS_REGEXP`.
#[derive(Debug)]
struct _GetSC {
    matcher: Regex,
}

impl _GetSC {
    const DEFAULT_REGEXP: &'static str =
        r#"[<>|,;.:_#+*~@€²³^°!"§$%&/()\[\]{}´`'\\\-]+"#;
}

impl DjCOperation for _GetSC {
    fn name(&self) -> String {
        "get_sc".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Extractor
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let matches: Vec<String> = self
            .matcher
            .find_iter(entry)
            .map(|m| m.as_str().to_string())
            .collect();
        if matches.is_empty() {
            Ok(DjOutcome::NotApplicable)
        } else {
            Ok(DjOutcome::Entries(matches))
        }
    }
}

/// Cuts between min and max characters off the left or right end,
/// producing one variant per cut width.
#[derive(Debug)]
struct _Cut {
    left: bool,
    min: usize,
    max: usize,
}

impl DjCOperation for _Cut {
    fn name(&self) -> String {
        format!(
            "cut {} {} {}",
            if self.left { "l" } else { "r" },
            self.min,
            self.max
        )
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Extractor
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let chars: Vec<char> = entry.chars().collect();
        if chars.len() < self.min {
            return Ok(DjOutcome::NotApplicable);
        }
        let mut variants = Vec::new();
        for width in self.min..=self.max.min(chars.len()) {
            let variant: String = if self.left {
                chars[width..].iter().collect()
            } else {
                chars[..chars.len() - width].iter().collect()
            };
            variants.push(variant);
        }
        Ok(DjOutcome::Entries(variants))
    }
}

/// Extracts every segment whose length lies within the given bounds,
/// longest segments first.
#[derive(Debug)]
struct _Segments {
    min: usize,
    max: usize,
}

impl DjCOperation for _Segments {
    fn name(&self) -> String {
        format!("segments {} {}", self.min, self.max)
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Extractor
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let chars: Vec<char> = entry.chars().collect();
        if chars.len() < self.min {
            return Ok(DjOutcome::NotApplicable);
        }
        let mut segments = Vec::new();
        for length in (self.min..=self.max).rev() {
            if length > chars.len() {
                continue;
            }
            for start in 0..=chars.len() - length {
                segments.push(chars[start..start + length].iter().collect());
            }
        }
        Ok(DjOutcome::Entries(segments))
    }
}

/// Removes the character at the given position.
#[derive(Debug)]
struct _Omit {
    pos: usize,
}

impl DjCOperation for _Omit {
    fn name(&self) -> String {
        format!("omit {}", self.pos)
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Extractor
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let chars: Vec<char> = entry.chars().collect();
        if self.pos >= chars.len() {
            return Ok(DjOutcome::NotApplicable);
        }
        let mut new_entry = String::with_capacity(entry.len());
        new_entry.extend(&chars[..self.pos]);
        new_entry.extend(&chars[self.pos + 1..]);
        Ok(DjOutcome::Entries(vec![new_entry]))
    }
}

/// Extracts the first half of an entry whose second half mirrors it,
/// e.g. `testtset` yields `test`. Odd lengths allow a pivot character.
#[derive(Debug)]
struct _DeduplicateReversed;

impl DjCOperation for _DeduplicateReversed {
    fn name(&self) -> String {
        "deduplicate_reversed".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Extractor
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let chars: Vec<char> = entry.chars().collect();
        let length = chars.len();
        let half = length / 2;
        if length % 2 == 1 && length < 3 {
            return Ok(DjOutcome::NotApplicable);
        }
        let first: Vec<char> = chars[..half].to_vec();
        let second: Vec<char> = chars[length - half..].iter().rev().copied().collect();
        if first == second {
            Ok(DjOutcome::one(first.into_iter().collect::<String>()))
        } else {
            Ok(DjOutcome::NotApplicable)
        }
    }
}

/// Extracts the repeated third of entries like `TestTestTest`. Lengths
/// of the form `3n + 2` allow two pivot characters between the thirds.
#[derive(Debug)]
struct _Detriplicate;

impl DjCOperation for _Detriplicate {
    fn name(&self) -> String {
        "detriplicate".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Extractor
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let chars: Vec<char> = entry.chars().collect();
        let length = chars.len();
        let third = length / 3;
        if third == 0 {
            return Ok(DjOutcome::NotApplicable);
        }
        let (first, second, last) = if length % 3 == 0 {
            (
                &chars[..third],
                &chars[third..2 * third],
                &chars[length - third..],
            )
        } else if length >= 8 && (length - 2) % 3 == 0 {
            (
                &chars[..third],
                &chars[third + 1..2 * third + 1],
                &chars[length - third..],
            )
        } else {
            return Ok(DjOutcome::NotApplicable);
        };
        if first == second && second == last {
            Ok(DjOutcome::one(first.iter().collect::<String>()))
        } else {
            Ok(DjOutcome::NotApplicable)
        }
    }
}

/// Decodes Hashcat's `$HEX[...]` notation.
#[derive(Debug)]
struct _DeHex;

impl DjCOperation for _DeHex {
    fn name(&self) -> String {
        "dehex".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Extractor
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let captures = match HEX_TERM.captures(entry) {
            Some(captures) => captures,
            None => return Ok(DjOutcome::NotApplicable),
        };
        let hex = &captures[1];
        if hex.len() % 2 != 0 {
            return Ok(DjOutcome::NotApplicable);
        }
        let mut bytes = Vec::with_capacity(hex.len() / 2);
        for pair in hex.as_bytes().chunks(2) {
            match (
                (pair[0] as char).to_digit(16),
                (pair[1] as char).to_digit(16),
            ) {
                (Some(high), Some(low)) => bytes.push((high * 16 + low) as u8),
                _ => return Ok(DjOutcome::NotApplicable),
            }
        }
        match String::from_utf8(bytes) {
            Ok(decoded) => Ok(DjOutcome::one(decoded)),
            Err(_) => Ok(DjOutcome::NotApplicable),
        }
    }
}

#[allow(non_snake_case)]
pub fn DjFFindAllFactory(
    args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let join = args.take_word("join");
    let pattern = args.next_str()?;
    let matcher = Regex::new(&pattern)
        .map_err(|err| DjError::resolve(format!("find_all: invalid regex: {}", err)))?;
    Ok(Box::new(_FindAll {
        join,
        pattern,
        matcher,
    }))
}

#[allow(non_snake_case)]
pub fn DjFGetNOFactory(_args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_GetNO))
}

#[allow(non_snake_case)]
pub fn DjFGetSCFactory(_args: &mut DjCArgCursor, env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let pattern = env
        .config
        .str_value("get_sc", "SPECIAL_CHARACTERS_REGEXP")?
        .unwrap_or(_GetSC::DEFAULT_REGEXP);
    let matcher = Regex::new(pattern)
        .map_err(|err| DjError::resolve(format!("get_sc: invalid regex: {}", err)))?;
    Ok(Box::new(_GetSC { matcher }))
}

#[allow(non_snake_case)]
pub fn DjFCutFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let side = args.next_word()?;
    let left = match side.as_str() {
        "l" => true,
        "r" => false,
        other => {
            return Err(DjError::resolve(format!(
                "cut: the side has to be 'l' or 'r' (found '{}')",
                other
            )))
        }
    };
    let min = args.next_int()?;
    let max = args.next_int()?;
    if min < 0 {
        return Err(DjError::resolve("cut: min has to be >= 0"));
    }
    if max < min {
        return Err(DjError::resolve("cut: max has to be >= min"));
    }
    Ok(Box::new(_Cut {
        left,
        min: min as usize,
        max: max as usize,
    }))
}

#[allow(non_snake_case)]
pub fn DjFSegmentsFactory(
    args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let min = args.next_int()?;
    let max = args.next_int()?;
    if min < 1 {
        return Err(DjError::resolve("segments: the minimum length has to be >= 1"));
    }
    if max < min {
        return Err(DjError::resolve(
            "segments: the maximum length has to be >= the minimum length",
        ));
    }
    Ok(Box::new(_Segments {
        min: min as usize,
        max: max as usize,
    }))
}

#[allow(non_snake_case)]
pub fn DjFOmitFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let pos = args.next_int()?;
    if pos < 0 {
        return Err(DjError::resolve("omit: the position has to be >= 0"));
    }
    Ok(Box::new(_Omit { pos: pos as usize }))
}

#[allow(non_snake_case)]
pub fn DjFDeduplicateReversedFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_DeduplicateReversed))
}

#[allow(non_snake_case)]
pub fn DjFDetriplicateFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_Detriplicate))
}

#[allow(non_snake_case)]
pub fn DjFDeHexFactory(_args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_DeHex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::tests::runtime;

    #[test]
    fn find_all_returns_matches_or_na() {
        let op = _FindAll {
            join: false,
            pattern: "[A-Z][a-z]+".to_string(),
            matcher: Regex::new("[A-Z][a-z]+").unwrap(),
        };
        let mut rt = runtime();
        assert_eq!(
            op.apply("AudiModel", &mut rt).unwrap(),
            DjOutcome::Entries(vec!["Audi".to_string(), "Model".to_string()])
        );
        assert_eq!(op.apply("12", &mut rt).unwrap(), DjOutcome::NotApplicable);
    }

    #[test]
    fn get_no_extracts_digit_runs() {
        let op = _GetNO;
        let mut rt = runtime();
        assert_eq!(
            op.apply("ab12cd345", &mut rt).unwrap(),
            DjOutcome::Entries(vec!["12".to_string(), "345".to_string()])
        );
        assert_eq!(
            op.apply("2024", &mut rt).unwrap(),
            DjOutcome::Entries(vec!["2024".to_string()])
        );
    }

    #[test]
    fn cut_produces_one_variant_per_width() {
        let op = _Cut {
            left: false,
            min: 1,
            max: 2,
        };
        let mut rt = runtime();
        assert_eq!(
            op.apply("abcd", &mut rt).unwrap(),
            DjOutcome::Entries(vec!["abc".to_string(), "ab".to_string()])
        );
    }

    #[test]
    fn deduplicate_reversed_handles_pivot() {
        let op = _DeduplicateReversed;
        let mut rt = runtime();
        assert_eq!(op.apply("testtset", &mut rt).unwrap(), DjOutcome::one("test"));
        assert_eq!(op.apply("1234-4321", &mut rt).unwrap(), DjOutcome::one("1234"));
        assert_eq!(op.apply("testabcd", &mut rt).unwrap(), DjOutcome::NotApplicable);
    }

    #[test]
    fn detriplicate_extracts_the_fragment() {
        let op = _Detriplicate;
        let mut rt = runtime();
        assert_eq!(
            op.apply("TestTestTest", &mut rt).unwrap(),
            DjOutcome::one("Test")
        );
        assert_eq!(op.apply("TestTest", &mut rt).unwrap(), DjOutcome::NotApplicable);
    }

    #[test]
    fn dehex_decodes_hashcat_notation() {
        let op = _DeHex;
        let mut rt = runtime();
        assert_eq!(
            op.apply("$HEX[61626f]", &mut rt).unwrap(),
            DjOutcome::one("abo")
        );
        assert_eq!(op.apply("abc", &mut rt).unwrap(), DjOutcome::NotApplicable);
    }

    #[test]
    fn segments_orders_longest_first() {
        let op = _Segments { min: 2, max: 3 };
        let mut rt = runtime();
        assert_eq!(
            op.apply("abcd", &mut rt).unwrap(),
            DjOutcome::Entries(vec![
                "abc".to_string(),
                "bcd".to_string(),
                "ab".to_string(),
                "bc".to_string(),
                "cd".to_string(),
            ])
        );
    }
}
