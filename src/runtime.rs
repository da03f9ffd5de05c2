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

//! Runtime state of an interpreter run.
//!
//! [`DjCEnvironment`] holds everything that is read-only once the
//! resolver finishes: the ignore set, the configuration table, loaded
//! global lists and the declared kinds of per-entry named lists. It is
//! shared between workers through an `Arc`.
//!
//! [`DjCRuntime`] holds the state local to the evaluation of one input
//! entry: the per-entry named lists, the accumulated classification tag,
//! the restart nesting depth and the buffered emissions of the entry.
//! Buffering emissions per entry is what keeps an entry's output
//! contiguous when entries are evaluated in parallel.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::errors::{DjError, Result};
use crate::export::DjCOutputHub;
use crate::script::ast::DjCArg;

/// Declared flavour of a per-entry named list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DjCNamedListKind {
    /// Ordered, duplicates retained.
    List,
    /// Insertion-ordered, duplicates collapsed on insert.
    Set,
}

/// A per-entry named container populated via block sinks.
#[derive(Clone, Debug)]
pub struct DjCNamedList {
    kind: DjCNamedListKind,
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl DjCNamedList {
    pub fn new(kind: DjCNamedListKind) -> Self {
        DjCNamedList {
            kind,
            entries: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn kind(&self) -> DjCNamedListKind {
        self.kind
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = String>) {
        for item in items {
            match self.kind {
                DjCNamedListKind::List => self.entries.push(item),
                DjCNamedListKind::Set => {
                    if self.seen.insert(item.clone()) {
                        self.entries.push(item);
                    }
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen.clear();
    }
}

/// Typed configuration table mapping `(operation, parameter)` to the
/// literal bound by a `config` directive.
#[derive(Clone, Debug, Default)]
pub struct DjCConfigTable {
    values: HashMap<(String, String), DjCArg>,
}

impl DjCConfigTable {
    pub fn insert(&mut self, op: &str, param: &str, value: DjCArg) {
        self.values
            .insert((op.to_string(), param.to_string()), value);
    }

    pub fn get(&self, op: &str, param: &str) -> Option<&DjCArg> {
        self.values.get(&(op.to_string(), param.to_string()))
    }

    pub fn str_value(&self, op: &str, param: &str) -> Result<Option<&str>> {
        match self.get(op, param) {
            None => Ok(None),
            Some(DjCArg::Str(s)) => Ok(Some(s)),
            Some(other) => Err(DjError::config(format!(
                "config {} {} must be a string (found {})",
                op,
                param,
                other.render()
            ))),
        }
    }

    pub fn int_value(&self, op: &str, param: &str) -> Result<Option<i64>> {
        match self.get(op, param) {
            None => Ok(None),
            Some(DjCArg::Int(v)) => Ok(Some(*v)),
            Some(other) => Err(DjError::config(format!(
                "config {} {} must be an integer (found {})",
                op,
                param,
                other.render()
            ))),
        }
    }

    pub fn float_value(&self, op: &str, param: &str) -> Result<Option<f64>> {
        match self.get(op, param) {
            None => Ok(None),
            Some(DjCArg::Float(v)) => Ok(Some(*v)),
            Some(DjCArg::Int(v)) => Ok(Some(*v as f64)),
            Some(other) => Err(DjError::config(format!(
                "config {} {} must be a number (found {})",
                op,
                param,
                other.render()
            ))),
        }
    }

    pub fn list_value(&self, op: &str, param: &str) -> Result<Option<&[String]>> {
        match self.get(op, param) {
            None => Ok(None),
            Some(DjCArg::List(items)) => Ok(Some(items)),
            Some(other) => Err(DjError::config(format!(
                "config {} {} must be a string list (found {})",
                op,
                param,
                other.render()
            ))),
        }
    }
}

/// Immutable interpreter environment, fixed after the resolver pass.
#[derive(Clone, Debug, Default)]
pub struct DjCEnvironment {
    /// Union of the contents of all `ignore` files.
    pub ignored: HashSet<String>,
    /// Bound `config` directives.
    pub config: DjCConfigTable,
    /// Global lists and sets, loaded at startup.
    pub globals: HashMap<String, Vec<String>>,
    /// Declared per-entry named lists and their kinds.
    pub list_kinds: HashMap<String, DjCNamedListKind>,
}

impl DjCEnvironment {
    pub fn global(&self, name: &str) -> Option<&[String]> {
        self.globals.get(name).map(|v| v.as_slice())
    }
}

/// Where one emitted line is headed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DjCEmitTarget {
    Stdout,
    File(String),
}

/// Mutable state scoped to the evaluation of one input entry.
#[derive(Debug)]
pub struct DjCRuntime {
    env: Arc<DjCEnvironment>,
    outputs: Arc<DjCOutputHub>,
    lists: HashMap<String, DjCNamedList>,
    /// Classification tags accumulated by `classify`, consumed by `result`.
    pub classification: String,
    restart_depth: usize,
    emissions: Vec<(DjCEmitTarget, String)>,
}

impl DjCRuntime {
    #[allow(non_snake_case)]
    pub fn DjFNew(env: Arc<DjCEnvironment>, outputs: Arc<DjCOutputHub>) -> Self {
        let lists = env
            .list_kinds
            .iter()
            .map(|(name, kind)| (name.clone(), DjCNamedList::new(*kind)))
            .collect();
        DjCRuntime {
            env,
            outputs,
            lists,
            classification: String::new(),
            restart_depth: 0,
            emissions: Vec::new(),
        }
    }

    pub fn env(&self) -> &DjCEnvironment {
        &self.env
    }

    /// Resets all per-entry state; called before each input entry.
    #[allow(non_snake_case)]
    pub fn DjFNextEntry(&mut self) {
        for list in self.lists.values_mut() {
            list.clear();
        }
        self.classification.clear();
        self.restart_depth = 0;
        self.emissions.clear();
    }

    pub fn is_ignored(&self, entry: &str) -> bool {
        self.env.ignored.contains(entry)
    }

    /// Appends entries to a named list; the list must have been declared.
    pub fn list_extend(
        &mut self,
        name: &str,
        items: impl IntoIterator<Item = String>,
    ) -> Result<()> {
        match self.lists.get_mut(name) {
            Some(list) => {
                list.extend(items);
                Ok(())
            }
            None => Err(DjError::internal(format!(
                "named list {} was not declared",
                name
            ))),
        }
    }

    pub fn list_entries(&self, name: &str) -> Result<&[String]> {
        match self.lists.get(name) {
            Some(list) => Ok(list.entries()),
            None => Err(DjError::internal(format!(
                "named list {} was not declared",
                name
            ))),
        }
    }

    /// Current nesting depth of `restart` combinators, for tracing.
    pub fn restart_enter(&mut self) -> usize {
        self.restart_depth += 1;
        self.restart_depth
    }

    pub fn restart_exit(&mut self) {
        self.restart_depth = self.restart_depth.saturating_sub(1);
    }

    /// Buffers one line for emission at the end of the entry.
    pub fn emit(&mut self, target: DjCEmitTarget, line: String) {
        self.emissions.push((target, line));
    }

    /// Flushes the entry's buffered emissions line-atomically.
    #[allow(non_snake_case)]
    pub fn DjFFlushEntry(&mut self) -> Result<()> {
        if self.emissions.is_empty() {
            return Ok(());
        }
        let emissions = std::mem::take(&mut self.emissions);
        self.outputs.DjFFlush(emissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_lists_collapse_duplicates() {
        let mut list = DjCNamedList::new(DjCNamedListKind::Set);
        list.extend(["a".to_string(), "b".to_string(), "a".to_string()]);
        assert_eq!(list.entries(), ["a", "b"]);

        let mut list = DjCNamedList::new(DjCNamedListKind::List);
        list.extend(["a".to_string(), "a".to_string()]);
        assert_eq!(list.entries(), ["a", "a"]);
    }

    #[test]
    fn next_entry_clears_per_entry_state() {
        let mut env = DjCEnvironment::default();
        env.list_kinds
            .insert("L".to_string(), DjCNamedListKind::List);
        let mut rt = DjCRuntime::DjFNew(Arc::new(env), Arc::new(DjCOutputHub::default()));
        rt.list_extend("L", ["x".to_string()]).unwrap();
        rt.classification.push_str("tag, ");
        rt.DjFNextEntry();
        assert!(rt.list_entries("L").unwrap().is_empty());
        assert!(rt.classification.is_empty());
    }
}
