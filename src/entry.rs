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

//! # Entry Module
//!
//! This module provides the core data shapes flowing through DJ pipelines.
//! An *entry* is one Unicode string read from the input dictionary. Every
//! operation consumes one entry (or one intermediate list of entries) and
//! produces a [`DjOutcome`]: either the distinguished N/A value, meaning
//! the operation did not apply, or an intermediate list ("ilist") of zero
//! to many derived entries.
//!
//! N/A and the empty ilist are semantically distinct and both observable:
//! a transformer that removes special characters from an entry consisting
//! only of special characters yields the empty ilist, while the same
//! transformer applied to an entry without special characters yields N/A.
//! Combinators and modifiers distinguish the two explicitly.

use serde::{Deserialize, Serialize};

/// An intermediate list of entries produced by one operation.
pub type DjEntryList = Vec<String>;

/// Result of applying one operation to one entry or one ilist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DjOutcome {
    /// The operation did not apply to its input.
    NotApplicable,
    /// The operation applied and produced these entries (possibly none).
    Entries(DjEntryList),
}

impl DjOutcome {
    /// An applied outcome with no produced entries.
    pub fn empty() -> Self {
        DjOutcome::Entries(Vec::new())
    }

    /// An applied outcome carrying exactly one entry.
    pub fn one(entry: impl Into<String>) -> Self {
        DjOutcome::Entries(vec![entry.into()])
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, DjOutcome::NotApplicable)
    }

    /// True iff the outcome is an applied, non-empty ilist. This is the
    /// truth value combinators such as `or` and `ilist_if_any` test.
    pub fn passed(&self) -> bool {
        match self {
            DjOutcome::NotApplicable => false,
            DjOutcome::Entries(list) => !list.is_empty(),
        }
    }

    pub fn entries(&self) -> Option<&DjEntryList> {
        match self {
            DjOutcome::NotApplicable => None,
            DjOutcome::Entries(list) => Some(list),
        }
    }

    pub fn into_entries(self) -> Option<DjEntryList> {
        match self {
            DjOutcome::NotApplicable => None,
            DjOutcome::Entries(list) => Some(list),
        }
    }

    /// Renders the outcome for trace output.
    pub fn render(&self) -> String {
        match self {
            DjOutcome::NotApplicable => "N/A".to_string(),
            DjOutcome::Entries(list) => format!("[{}]", list.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_truth_values() {
        assert!(!DjOutcome::NotApplicable.passed());
        assert!(!DjOutcome::empty().passed());
        assert!(DjOutcome::one("a").passed());
    }

    #[test]
    fn empty_and_na_are_distinct() {
        assert_ne!(DjOutcome::empty(), DjOutcome::NotApplicable);
    }
}
