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

//! Filter operations.
//!
//! A filter passes the unmodified entry or rejects it with N/A; it never
//! returns a modified value. The `min`/`max`/`has` family counts
//! characters of a selectable class; the `is_*` family identifies
//! structural shapes such as repeated patterns and keyboard walks.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::entry::DjOutcome;
use crate::errors::{DjError, Result};
use crate::ingest::DjFReadLines;
use crate::operation::{DjCBoxedOperation, DjCOperation, DjCOperationKind};
use crate::operations::DjCArgCursor;
use crate::runtime::{DjCEnvironment, DjCRuntime};
use crate::script::lexer::DjFEscape;

fn accept(entry: &str, pass: bool) -> DjOutcome {
    if pass {
        DjOutcome::one(entry)
    } else {
        DjOutcome::NotApplicable
    }
}

/// Character classes countable by `min`, `max` and `has`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DjCCharClass {
    Length,
    Lower,
    Upper,
    Numeric,
    Letter,
    Symbol,
    NonLetter,
    Unique,
}

impl DjCCharClass {
    fn parse(op: &str, word: &str) -> Result<Self> {
        match word {
            "length" => Ok(DjCCharClass::Length),
            "lower" => Ok(DjCCharClass::Lower),
            "upper" => Ok(DjCCharClass::Upper),
            "numeric" => Ok(DjCCharClass::Numeric),
            "letter" => Ok(DjCCharClass::Letter),
            "symbol" => Ok(DjCCharClass::Symbol),
            "non_letter" => Ok(DjCCharClass::NonLetter),
            "unique" => Ok(DjCCharClass::Unique),
            other => Err(DjError::resolve(format!(
                "{}: unsupported character class '{}' (length, lower, upper, \
                 numeric, letter, symbol, non_letter, unique)",
                op, other
            ))),
        }
    }

    fn matches(&self, c: char) -> bool {
        match self {
            DjCCharClass::Length | DjCCharClass::Unique => true,
            DjCCharClass::Lower => c.is_lowercase(),
            DjCCharClass::Upper => c.is_uppercase(),
            DjCCharClass::Numeric => c.is_numeric(),
            DjCCharClass::Letter => c.is_alphabetic(),
            DjCCharClass::Symbol => !c.is_alphanumeric(),
            DjCCharClass::NonLetter => !c.is_alphabetic(),
        }
    }

    /// Counts the class members of the entry, stopping early once the
    /// count exceeds `limit`.
    fn count(&self, entry: &str, limit: usize) -> usize {
        match self {
            DjCCharClass::Length => entry.chars().count().min(limit + 1),
            DjCCharClass::Unique => {
                let mut seen = HashSet::new();
                let mut count = 0;
                for c in entry.chars() {
                    if seen.insert(c) {
                        count += 1;
                        if count > limit {
                            break;
                        }
                    }
                }
                count
            }
            _ => {
                let mut count = 0;
                for c in entry.chars() {
                    if self.matches(c) {
                        count += 1;
                        if count > limit {
                            break;
                        }
                    }
                }
                count
            }
        }
    }
}

/// `min <class> N`: accepts entries with at least N characters of the
/// class.
#[derive(Debug)]
struct _Min {
    class_word: String,
    class: DjCCharClass,
    count: usize,
}

impl DjCOperation for _Min {
    fn name(&self) -> String {
        format!("min {} {}", self.class_word, self.count)
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let pass = self.class.count(entry, self.count) >= self.count;
        Ok(accept(entry, pass))
    }
}

/// `max <class> N`: accepts entries with at most N characters of the
/// class.
#[derive(Debug)]
struct _Max {
    class_word: String,
    class: DjCCharClass,
    count: usize,
}

impl DjCOperation for _Max {
    fn name(&self) -> String {
        format!("max {} {}", self.class_word, self.count)
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let pass = self.class.count(entry, self.count) <= self.count;
        Ok(accept(entry, pass))
    }
}

/// `has <class> N`: accepts entries with exactly N characters of the
/// class; shorthand for `min <class> N max <class> N`.
#[derive(Debug)]
struct _Has {
    class_word: String,
    class: DjCCharClass,
    count: usize,
}

impl DjCOperation for _Has {
    fn name(&self) -> String {
        format!("has {} {}", self.class_word, self.count)
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let pass = self.class.count(entry, self.count) == self.count;
        Ok(accept(entry, pass))
    }
}

/// Accepts entries consisting solely of special characters. The set is
/// configurable via `config is_sc SPECIAL_CHARS`.
#[derive(Debug)]
struct _IsSC {
    chars: HashSet<char>,
}

impl _IsSC {
    const DEFAULT_CHARS: &'static str = "^<>|,;.:_#'+*~@€²³`´^°!\"§$%&/()[]{}\\-";
}

impl DjCOperation for _IsSC {
    fn name(&self) -> String {
        "is_sc".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let pass = entry.chars().all(|c| self.chars.contains(&c));
        Ok(accept(entry, pass))
    }
}

/// Identifies entries that repeat a period of one, two or three
/// characters, e.g. `aaaaa` or `qpqpqp`.
#[derive(Debug)]
struct _IsPattern;

impl DjCOperation for _IsPattern {
    fn name(&self) -> String {
        "is_pattern".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let chars: Vec<char> = entry.chars().collect();
        let length = chars.len();
        if length < 2 {
            return Ok(DjOutcome::NotApplicable);
        }

        if chars.iter().all(|c| *c == chars[0]) {
            return Ok(DjOutcome::one(entry));
        }
        if chars[0] == chars[1] || length == 2 {
            return Ok(DjOutcome::NotApplicable);
        }
        if length % 2 == 0 && repeats(&chars, 2) {
            return Ok(DjOutcome::one(entry));
        }
        if length < 6 || length % 3 != 0 {
            return Ok(DjOutcome::NotApplicable);
        }
        let distinct = chars[2] != chars[0] || chars[2] != chars[1] || chars[1] != chars[0];
        if distinct && repeats(&chars, 3) {
            Ok(DjOutcome::one(entry))
        } else {
            Ok(DjOutcome::NotApplicable)
        }
    }
}

fn repeats(chars: &[char], period: usize) -> bool {
    chars.iter().enumerate().all(|(i, c)| *c == chars[i % period])
}

type DjCAdjacency = HashMap<char, &'static [char]>;

/// One keyboard: its directional adjacency maps.
struct DjCKeyboard {
    directions: Vec<DjCAdjacency>,
}

fn adjacency(pairs: &[(char, &'static [char])]) -> DjCAdjacency {
    pairs.iter().copied().collect()
}

static KEYBOARDS: Lazy<HashMap<&'static str, DjCKeyboard>> = Lazy::new(|| {
    let mut keyboards = HashMap::new();
    keyboards.insert(
        "KEYBOARD_EN",
        DjCKeyboard {
            directions: vec![
                adjacency(&[
                    ('`', &['1']),
                    ('1', &['`', '2']),
                    ('2', &['1', '3']),
                    ('3', &['2', '4']),
                    ('4', &['3', '5']),
                    ('5', &['4', '6']),
                    ('6', &['5', '7']),
                    ('7', &['6', '8']),
                    ('8', &['7', '9']),
                    ('9', &['8', '0']),
                    ('0', &['9', '-']),
                    ('-', &['0', '=']),
                    ('=', &['-']),
                    ('q', &['w']),
                    ('w', &['q', 'e']),
                    ('e', &['w', 'r']),
                    ('r', &['e', 't']),
                    ('t', &['r', 'y']),
                    ('y', &['t', 'u']),
                    ('u', &['y', 'i']),
                    ('i', &['u', 'o']),
                    ('o', &['i', 'p']),
                    ('p', &['o', '[']),
                    ('[', &['p', ']']),
                    (']', &['[']),
                    ('a', &['s']),
                    ('s', &['a', 'd']),
                    ('d', &['s', 'f']),
                    ('f', &['d', 'g']),
                    ('g', &['f', 'h']),
                    ('h', &['g', 'j']),
                    ('j', &['h', 'k']),
                    ('k', &['j', 'l']),
                    ('l', &['k', ';']),
                    (';', &['l', '\'']),
                    ('\'', &[';']),
                    ('z', &['x']),
                    ('x', &['z', 'c']),
                    ('c', &['x', 'v']),
                    ('v', &['c', 'b']),
                    ('b', &['v', 'n']),
                    ('n', &['b', 'm']),
                    ('m', &['n', ',']),
                    (',', &['m', '.']),
                    ('.', &[',', '/']),
                    ('/', &['.']),
                ]),
                adjacency(&[
                    ('`', &[]),
                    ('1', &['q']),
                    ('2', &['q', 'w']),
                    ('3', &['w', 'e']),
                    ('4', &['e', 'r']),
                    ('5', &['r', 't']),
                    ('6', &['t', 'y']),
                    ('7', &['y', 'u']),
                    ('8', &['u', 'i']),
                    ('9', &['i', 'o']),
                    ('0', &['o', 'p']),
                    ('-', &['p', '[']),
                    ('=', &['[', ']']),
                    ('q', &['1', '2', 'a']),
                    ('w', &['2', '3', 'a', 's']),
                    ('e', &['3', '4', 's', 'd']),
                    ('r', &['4', '5', 'd', 'f']),
                    ('t', &['5', '6', 'f', 'g']),
                    ('y', &['6', '7', 'g', 'h']),
                    ('u', &['7', '8', 'h', 'j']),
                    ('i', &['8', '9', 'j', 'k']),
                    ('o', &['9', '0', 'k', 'l']),
                    ('p', &['0', '-', 'l', ';']),
                    ('[', &['-', '=', ';', '\'']),
                    (']', &['=', '\'']),
                    ('a', &['q', 'w', 'z']),
                    ('s', &['w', 'e', 'z', 'x']),
                    ('d', &['e', 'r', 'x', 'c']),
                    ('f', &['r', 't', 'c', 'v']),
                    ('g', &['t', 'y', 'v', 'b']),
                    ('h', &['y', 'u', 'b', 'n']),
                    ('j', &['u', 'i', 'n', 'm']),
                    ('k', &['i', 'o', 'm', ',']),
                    ('l', &['o', 'p', ',', '.']),
                    (';', &['p', '[', '.', '/']),
                    ('\'', &['[', ']', '/']),
                    ('z', &['a', 's']),
                    ('x', &['s', 'd']),
                    ('c', &['d', 'f']),
                    ('v', &['f', 'g']),
                    ('b', &['g', 'h']),
                    ('n', &['h', 'j']),
                    ('m', &['j', 'k']),
                    (',', &['k', 'l']),
                    ('.', &['l', ';']),
                    ('/', &[';', '\'']),
                ]),
            ],
        },
    );
    keyboards.insert(
        "KEYBOARD_DE",
        DjCKeyboard {
            directions: vec![
                adjacency(&[
                    ('^', &['1']),
                    ('1', &['^', '2']),
                    ('2', &['1', '3']),
                    ('3', &['2', '4']),
                    ('4', &['3', '5']),
                    ('5', &['4', '6']),
                    ('6', &['5', '7']),
                    ('7', &['6', '8']),
                    ('8', &['7', '9']),
                    ('9', &['8', '0']),
                    ('0', &['9', 'ß']),
                    ('ß', &['0', '´']),
                    ('´', &['ß']),
                    ('q', &['w']),
                    ('w', &['q', 'e']),
                    ('e', &['w', 'r']),
                    ('r', &['e', 't']),
                    ('t', &['r', 'z']),
                    ('z', &['t', 'u']),
                    ('u', &['z', 'i']),
                    ('i', &['u', 'o']),
                    ('o', &['i', 'p']),
                    ('p', &['o', 'ü']),
                    ('ü', &['p', '+']),
                    ('+', &['ü']),
                    ('a', &['s']),
                    ('s', &['a', 'd']),
                    ('d', &['s', 'f']),
                    ('f', &['d', 'g']),
                    ('g', &['f', 'h']),
                    ('h', &['g', 'j']),
                    ('j', &['h', 'k']),
                    ('k', &['j', 'l']),
                    ('l', &['k', 'ö']),
                    ('ö', &['l', 'ä']),
                    ('ä', &['ö', '#']),
                    ('#', &['ä']),
                    ('<', &['y']),
                    ('y', &['<', 'x']),
                    ('x', &['y', 'c']),
                    ('c', &['x', 'v']),
                    ('v', &['c', 'b']),
                    ('b', &['v', 'n']),
                    ('n', &['b', 'm']),
                    ('m', &['n', ',']),
                    (',', &['m', '.']),
                    ('.', &[',', '-']),
                    ('-', &['.']),
                ]),
                adjacency(&[
                    ('^', &[]),
                    ('1', &['q']),
                    ('2', &['q', 'w']),
                    ('3', &['w', 'e']),
                    ('4', &['e', 'r']),
                    ('5', &['r', 't']),
                    ('6', &['t', 'z']),
                    ('7', &['z', 'u']),
                    ('8', &['u', 'i']),
                    ('9', &['i', 'o']),
                    ('0', &['o', 'p']),
                    ('ß', &['p', 'ü']),
                    ('´', &['ü', '+']),
                    ('q', &['1', '2', 'a']),
                    ('w', &['2', '3', 'a', 's']),
                    ('e', &['3', '4', 's', 'd']),
                    ('r', &['4', '5', 'd', 'f']),
                    ('t', &['5', '6', 'f', 'g']),
                    ('z', &['6', '7', 'g', 'h']),
                    ('u', &['7', '8', 'h', 'j']),
                    ('i', &['8', '9', 'j', 'k']),
                    ('o', &['9', '0', 'k', 'l']),
                    ('p', &['0', 'ß', 'l', 'ö']),
                    ('ü', &['ß', '´', 'ö', 'ä']),
                    ('+', &['´', 'ä', '#']),
                    ('a', &['q', 'w', 'y']),
                    ('s', &['w', 'e', 'y', 'x']),
                    ('d', &['e', 'r', 'x', 'c']),
                    ('f', &['r', 't', 'c', 'v']),
                    ('g', &['t', 'z', 'v', 'b']),
                    ('h', &['z', 'u', 'b', 'n']),
                    ('j', &['u', 'i', 'n', 'm']),
                    ('k', &['i', 'o', 'm', ',']),
                    ('l', &['o', 'p', ',', '.']),
                    ('ö', &['p', 'ü', '.', '-']),
                    ('ä', &['ü', '+', '-']),
                    ('#', &['+']),
                    ('<', &['a']),
                    ('y', &['a', 's']),
                    ('x', &['s', 'd']),
                    ('c', &['d', 'f']),
                    ('v', &['f', 'g']),
                    ('b', &['g', 'h']),
                    ('n', &['h', 'j']),
                    ('m', &['j', 'k']),
                    (',', &['k', 'l']),
                    ('.', &['l', 'ö']),
                    ('-', &['ö', 'ä']),
                ]),
            ],
        },
    );
    keyboards.insert(
        "PIN_PAD",
        DjCKeyboard {
            directions: vec![adjacency(&[
                ('1', &['2', '4', '5']),
                ('2', &['1', '3', '4', '5', '6']),
                ('3', &['2', '5', '6']),
                ('4', &['1', '2', '5', '8', '7']),
                ('5', &['1', '2', '3', '4', '6', '7', '8', '9']),
                ('6', &['2', '3', '5', '8', '9']),
                ('7', &['4', '5', '8', '0']),
                ('8', &['4', '5', '6', '7', '9', '0']),
                ('9', &['5', '6', '8', '0']),
                ('0', &['7', '8', '9']),
            ])],
        },
    );
    keyboards
});

/// Identifies keyboard and pin-pad walks such as `qwerasdf`. Every sub
/// walk must reach a configurable minimum length.
#[derive(Debug)]
struct _IsWalk {
    keyboard: String,
    min_walk: usize,
    min_sub_walk: usize,
}

impl DjCOperation for _IsWalk {
    fn name(&self) -> String {
        format!("is_walk \"{}\"", self.keyboard)
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let keyboard = &KEYBOARDS[self.keyboard.as_str()];
        let chars: Vec<char> = entry.chars().collect();
        if chars.len() < self.min_walk {
            return Ok(DjOutcome::NotApplicable);
        }

        let mut last = chars[0];
        let mut run_length = 1usize;
        for (i, c) in chars.iter().enumerate().skip(1) {
            run_length += 1;
            let mut adjacent = false;
            for direction in &keyboard.directions {
                match direction.get(&last) {
                    // a character outside the keyboard definition
                    None => return Ok(DjOutcome::NotApplicable),
                    Some(neighbors) => {
                        if neighbors.contains(c) {
                            adjacent = true;
                            break;
                        }
                    }
                }
            }
            if !adjacent {
                if i + 1 != chars.len() && run_length <= self.min_sub_walk {
                    return Ok(DjOutcome::NotApplicable);
                }
                run_length = 1;
            }
            last = *c;
        }

        if run_length != chars.len() && run_length < self.min_sub_walk {
            Ok(DjOutcome::NotApplicable)
        } else {
            Ok(DjOutcome::one(entry))
        }
    }
}

/// Accepts entries that occur inside the given sequence, e.g. `cde`
/// inside the alphabet. Entries below a configurable minimum length are
/// rejected outright.
#[derive(Debug)]
struct _IsPartOf {
    sequence: String,
    min_length: usize,
}

impl DjCOperation for _IsPartOf {
    fn name(&self) -> String {
        format!("is_part_of \"{}\"", DjFEscape(&self.sequence))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let pass = entry.chars().count() >= self.min_length && self.sequence.contains(entry);
        Ok(accept(entry, pass))
    }
}

/// Accepts entries whose characters all occur in the sieve file.
#[derive(Debug)]
struct _Sieve {
    file: String,
    chars: HashSet<char>,
}

impl DjCOperation for _Sieve {
    fn name(&self) -> String {
        format!("sieve \"{}\"", DjFEscape(&self.file))
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let pass = entry.chars().all(|c| self.chars.contains(&c));
        Ok(accept(entry, pass))
    }
}

/// Accepts entries that are members of the given global list.
#[derive(Debug)]
struct _GListIn {
    list: String,
    entries: HashSet<String>,
}

impl DjCOperation for _GListIn {
    fn name(&self) -> String {
        format!("glist_in {}", self.list)
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply(&self, entry: &str, _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        Ok(accept(entry, self.entries.contains(entry)))
    }
}

fn class_filter(
    op: &'static str,
    args: &mut DjCArgCursor,
    allow_unique: bool,
    min_count: i64,
) -> Result<(String, DjCCharClass, usize)> {
    let class_word = args.next_word()?;
    let class = DjCCharClass::parse(op, &class_word)?;
    if class == DjCCharClass::Unique && !allow_unique {
        return Err(DjError::resolve(format!(
            "{}: the character class 'unique' is not supported",
            op
        )));
    }
    let count = args.next_int()?;
    if count < min_count {
        return Err(DjError::resolve(format!(
            "{} {} {}: the count has to be >= {}",
            op, class_word, count, min_count
        )));
    }
    Ok((class_word, class, count as usize))
}

#[allow(non_snake_case)]
pub fn DjFMinFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let (class_word, class, count) = class_filter("min", args, true, 1)?;
    Ok(Box::new(_Min {
        class_word,
        class,
        count,
    }))
}

#[allow(non_snake_case)]
pub fn DjFMaxFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let (class_word, class, count) = class_filter("max", args, false, 0)?;
    Ok(Box::new(_Max {
        class_word,
        class,
        count,
    }))
}

#[allow(non_snake_case)]
pub fn DjFHasFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let (class_word, class, count) = class_filter("has", args, true, 0)?;
    Ok(Box::new(_Has {
        class_word,
        class,
        count,
    }))
}

#[allow(non_snake_case)]
pub fn DjFIsSCFactory(_args: &mut DjCArgCursor, env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let chars = env
        .config
        .str_value("is_sc", "SPECIAL_CHARS")?
        .unwrap_or(_IsSC::DEFAULT_CHARS);
    Ok(Box::new(_IsSC {
        chars: chars.chars().collect(),
    }))
}

#[allow(non_snake_case)]
pub fn DjFIsPatternFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_IsPattern))
}

#[allow(non_snake_case)]
pub fn DjFIsWalkFactory(args: &mut DjCArgCursor, env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let keyboard = args.next_str()?;
    if !KEYBOARDS.contains_key(keyboard.as_str()) {
        let mut known: Vec<&str> = KEYBOARDS.keys().copied().collect();
        known.sort_unstable();
        return Err(DjError::resolve(format!(
            "is_walk: unknown keyboard \"{}\" ({})",
            keyboard,
            known.join(", ")
        )));
    }
    let min_walk = env.config.int_value("is_walk", "MIN_WALK_LENGTH")?.unwrap_or(3);
    let min_sub_walk = env
        .config
        .int_value("is_walk", "MIN_SUB_WALK_LENGTH")?
        .unwrap_or(3);
    Ok(Box::new(_IsWalk {
        keyboard,
        min_walk: min_walk.max(1) as usize,
        min_sub_walk: min_sub_walk.max(1) as usize,
    }))
}

#[allow(non_snake_case)]
pub fn DjFIsPartOfFactory(
    args: &mut DjCArgCursor,
    env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let sequence = args.next_str()?;
    let min_length = env
        .config
        .int_value("is_part_of", "ENTRY_MIN_LENGTH")?
        .unwrap_or(4);
    if sequence.chars().count() < 2 {
        return Err(DjError::resolve(
            "is_part_of: a sequence has to have at least two characters",
        ));
    }
    if sequence.chars().count() < min_length.max(0) as usize {
        return Err(DjError::resolve(
            "is_part_of: the sequence is shorter than ENTRY_MIN_LENGTH",
        ));
    }
    Ok(Box::new(_IsPartOf {
        sequence,
        min_length: min_length.max(0) as usize,
    }))
}

#[allow(non_snake_case)]
pub fn DjFSieveFactory(args: &mut DjCArgCursor, _env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let file = args.next_str()?;
    let mut chars = HashSet::new();
    for line in DjFReadLines(&file)? {
        chars.extend(line.chars());
    }
    Ok(Box::new(_Sieve { file, chars }))
}

#[allow(non_snake_case)]
pub fn DjFGListInFactory(args: &mut DjCArgCursor, env: &DjCEnvironment) -> Result<DjCBoxedOperation> {
    let list = args.next_name()?;
    let entries: HashSet<String> = match env.global(&list) {
        Some(entries) => entries.iter().cloned().collect(),
        None => {
            return Err(DjError::resolve(format!(
                "glist_in: global list {} does not exist",
                list
            )))
        }
    };
    Ok(Box::new(_GListIn { list, entries }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::tests::runtime;

    #[test]
    fn min_length_filters() {
        let op = _Min {
            class_word: "length".to_string(),
            class: DjCCharClass::Length,
            count: 3,
        };
        let mut rt = runtime();
        assert_eq!(op.apply("abc", &mut rt).unwrap(), DjOutcome::one("abc"));
        assert_eq!(op.apply("ab", &mut rt).unwrap(), DjOutcome::NotApplicable);
    }

    #[test]
    fn has_unique_counts_distinct_characters() {
        let op = _Has {
            class_word: "unique".to_string(),
            class: DjCCharClass::Unique,
            count: 2,
        };
        let mut rt = runtime();
        assert_eq!(op.apply("abab", &mut rt).unwrap(), DjOutcome::one("abab"));
        assert_eq!(op.apply("abc", &mut rt).unwrap(), DjOutcome::NotApplicable);
    }

    #[test]
    fn is_pattern_identifies_periods() {
        let op = _IsPattern;
        let mut rt = runtime();
        assert_eq!(op.apply("aaaaa", &mut rt).unwrap(), DjOutcome::one("aaaaa"));
        assert_eq!(op.apply("qpqpqp", &mut rt).unwrap(), DjOutcome::one("qpqpqp"));
        assert_eq!(op.apply("abcabc", &mut rt).unwrap(), DjOutcome::one("abcabc"));
        assert_eq!(op.apply("abcdef", &mut rt).unwrap(), DjOutcome::NotApplicable);
        assert_eq!(op.apply("a", &mut rt).unwrap(), DjOutcome::NotApplicable);
    }

    #[test]
    fn is_walk_detects_pin_pad_walks() {
        let op = _IsWalk {
            keyboard: "PIN_PAD".to_string(),
            min_walk: 3,
            min_sub_walk: 3,
        };
        let mut rt = runtime();
        assert_eq!(op.apply("1235", &mut rt).unwrap(), DjOutcome::one("1235"));
        assert_eq!(op.apply("1290", &mut rt).unwrap(), DjOutcome::NotApplicable);
        assert_eq!(op.apply("12a", &mut rt).unwrap(), DjOutcome::NotApplicable);
    }

    #[test]
    fn is_walk_accepts_stacked_sub_walks() {
        let op = _IsWalk {
            keyboard: "KEYBOARD_EN".to_string(),
            min_walk: 3,
            min_sub_walk: 3,
        };
        let mut rt = runtime();
        assert_eq!(
            op.apply("qwerasdf", &mut rt).unwrap(),
            DjOutcome::one("qwerasdf")
        );
        assert_eq!(op.apply("qwel", &mut rt).unwrap(), DjOutcome::NotApplicable);
    }

    #[test]
    fn is_part_of_respects_min_length() {
        let op = _IsPartOf {
            sequence: "abcdefghijklmnopqrstuvwxyz".to_string(),
            min_length: 4,
        };
        let mut rt = runtime();
        assert_eq!(op.apply("cdef", &mut rt).unwrap(), DjOutcome::one("cdef"));
        assert_eq!(op.apply("cde", &mut rt).unwrap(), DjOutcome::NotApplicable);
        assert_eq!(op.apply("acef", &mut rt).unwrap(), DjOutcome::NotApplicable);
    }
}
