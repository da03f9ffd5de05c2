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

//! Operations reasoning about the intermediate list as a whole rather
//! than entry by entry.

use std::collections::HashSet;

use crate::entry::DjOutcome;
use crate::errors::Result;
use crate::operation::{DjCBoxedOperation, DjCOperation, DjCOperationKind};
use crate::operations::DjCArgCursor;
use crate::runtime::{DjCEnvironment, DjCRuntime};
use crate::script::lexer::DjFEscape;

/// Removes duplicates from the ilist, keeping the first occurrence.
#[derive(Debug)]
struct _IListUnique;

impl DjCOperation for _IListUnique {
    fn name(&self) -> String {
        "ilist_unique".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply_ilist(&self, entries: &[String], _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = entries
            .iter()
            .filter(|e| seen.insert(e.as_str()))
            .cloned()
            .collect();
        Ok(DjOutcome::Entries(unique))
    }
}

/// Reduces the ilist to a single entry by joining with the separator.
/// N/A when the ilist holds just one entry; an empty ilist stays empty
/// rather than becoming a single empty string.
#[derive(Debug)]
struct _IListConcat {
    separator: String,
}

impl DjCOperation for _IListConcat {
    fn name(&self) -> String {
        if self.separator.is_empty() {
            "ilist_concat".to_string()
        } else {
            format!("ilist_concat \"{}\"", DjFEscape(&self.separator))
        }
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Transformer
    }

    fn apply_ilist(&self, entries: &[String], rt: &mut DjCRuntime) -> Result<DjOutcome> {
        if entries.is_empty() {
            return Ok(DjOutcome::empty());
        }
        if entries.len() == 1 {
            return Ok(DjOutcome::NotApplicable);
        }
        let joined = entries.join(&self.separator);
        if rt.is_ignored(&joined) {
            return Ok(DjOutcome::empty());
        }
        Ok(DjOutcome::one(joined))
    }
}

/// Keeps the entries that are not contained in any other entry of the
/// ilist; order is maintained.
#[derive(Debug)]
struct _IListSelectLongest;

impl DjCOperation for _IListSelectLongest {
    fn name(&self) -> String {
        "ilist_select_longest".to_string()
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply_ilist(&self, entries: &[String], _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let mut longest: Vec<String> = Vec::new();
        for entry in entries {
            if longest.iter().any(|kept| kept.contains(entry.as_str())) {
                continue;
            }
            match longest.iter().position(|kept| entry.contains(kept.as_str())) {
                Some(pos) => {
                    longest.remove(pos);
                    longest.push(entry.clone());
                }
                None => longest.push(entry.clone()),
            }
        }
        Ok(DjOutcome::Entries(longest))
    }
}

/// `ilist_max count N` passes the ilist iff it holds at most N entries;
/// `ilist_max length N` compares the joined length instead. With `<`
/// the comparison is strict. On failure the result is N/A.
#[derive(Debug)]
struct _IListMax {
    measure_word: String,
    joined_length: bool,
    strict: bool,
    limit: usize,
}

impl DjCOperation for _IListMax {
    fn name(&self) -> String {
        format!(
            "ilist_max {} {}{}",
            self.measure_word,
            if self.strict { "< " } else { "" },
            self.limit
        )
    }

    fn kind(&self) -> DjCOperationKind {
        DjCOperationKind::Filter
    }

    fn apply_ilist(&self, entries: &[String], _rt: &mut DjCRuntime) -> Result<DjOutcome> {
        let measure = if self.joined_length {
            entries.iter().map(|e| e.chars().count()).sum()
        } else {
            entries.len()
        };
        let pass = if self.strict {
            measure < self.limit
        } else {
            measure <= self.limit
        };
        if pass {
            Ok(DjOutcome::Entries(entries.to_vec()))
        } else {
            Ok(DjOutcome::NotApplicable)
        }
    }
}

#[allow(non_snake_case)]
pub fn DjFIListUniqueFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_IListUnique))
}

#[allow(non_snake_case)]
pub fn DjFIListConcatFactory(
    args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let separator = args.opt_str().unwrap_or_default();
    Ok(Box::new(_IListConcat { separator }))
}

#[allow(non_snake_case)]
pub fn DjFIListSelectLongestFactory(
    _args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    Ok(Box::new(_IListSelectLongest))
}

#[allow(non_snake_case)]
pub fn DjFIListMaxFactory(
    args: &mut DjCArgCursor,
    _env: &DjCEnvironment,
) -> Result<DjCBoxedOperation> {
    let measure_word = args.next_word()?;
    let joined_length = match measure_word.as_str() {
        "count" => false,
        "length" => true,
        other => {
            return Err(crate::errors::DjError::resolve(format!(
                "ilist_max: unsupported measure '{}' (count, length)",
                other
            )))
        }
    };
    let strict = args.take_less();
    let limit = args.next_int()?;
    if limit < 0 {
        return Err(crate::errors::DjError::resolve(
            "ilist_max: the limit has to be >= 0",
        ));
    }
    Ok(Box::new(_IListMax {
        measure_word,
        joined_length,
        strict,
        limit: limit as usize,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::tests::runtime;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unique_preserves_first_occurrence_and_is_idempotent() {
        let op = _IListUnique;
        let mut rt = runtime();
        let once = op
            .apply_ilist(&list(&["b", "a", "b", "c", "a"]), &mut rt)
            .unwrap();
        assert_eq!(once, DjOutcome::Entries(list(&["b", "a", "c"])));
        let twice = op
            .apply_ilist(once.entries().unwrap(), &mut rt)
            .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn concat_needs_at_least_two_entries() {
        let op = _IListConcat {
            separator: "-".to_string(),
        };
        let mut rt = runtime();
        assert_eq!(
            op.apply_ilist(&list(&["a", "b"]), &mut rt).unwrap(),
            DjOutcome::one("a-b")
        );
        assert_eq!(
            op.apply_ilist(&list(&["a"]), &mut rt).unwrap(),
            DjOutcome::NotApplicable
        );
        assert_eq!(op.apply_ilist(&[], &mut rt).unwrap(), DjOutcome::empty());
    }

    #[test]
    fn select_longest_drops_contained_entries() {
        let op = _IListSelectLongest;
        let mut rt = runtime();
        assert_eq!(
            op.apply_ilist(&list(&["aud", "audi", "rs"]), &mut rt).unwrap(),
            DjOutcome::Entries(list(&["audi", "rs"]))
        );
    }

    #[test]
    fn ilist_max_measures_count_and_length() {
        let mut rt = runtime();
        let by_count = _IListMax {
            measure_word: "count".to_string(),
            joined_length: false,
            strict: false,
            limit: 2,
        };
        assert!(by_count.apply_ilist(&list(&["a", "b"]), &mut rt).unwrap().passed());
        assert_eq!(
            by_count.apply_ilist(&list(&["a", "b", "c"]), &mut rt).unwrap(),
            DjOutcome::NotApplicable
        );

        let by_length = _IListMax {
            measure_word: "length".to_string(),
            joined_length: true,
            strict: true,
            limit: 4,
        };
        assert!(by_length.apply_ilist(&list(&["ab", "c"]), &mut rt).unwrap().passed());
        assert_eq!(
            by_length.apply_ilist(&list(&["ab", "cd"]), &mut rt).unwrap(),
            DjOutcome::NotApplicable
        );
    }
}
