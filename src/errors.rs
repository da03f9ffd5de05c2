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

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout DJ.
pub type Result<T> = std::result::Result<T, DjError>;

/// Canonical error enumeration for DJ.
///
/// Everything except per-entry "did not apply" results is an error and
/// terminates the interpreter. An operation returning N/A or an empty
/// intermediate list is normal control flow and never surfaces here.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum DjError {
    /// Script text violates the grammar.
    #[error("parse error at {line}:{column}: expected {expected}")]
    Parse {
        line: usize,
        column: usize,
        expected: String,
    },

    /// Semantic errors found while resolving the AST: undeclared named
    /// lists, unknown or cyclic macros, illegal modifiers, bad operands.
    #[error("resolve error: {message}")]
    Resolve { message: String },

    /// An unknown `(operation, parameter)` pair in a `config` directive.
    #[error("config error: {message}")]
    Config { message: String },

    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Any failure raised by an operation while processing an entry.
    #[error("operation '{operation}' failed: {message}")]
    Operation { operation: String, message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for DjError {
    fn from(err: io::Error) -> Self {
        DjError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DjError {
    fn from(err: serde_json::Error) -> Self {
        DjError::Serde(err.to_string())
    }
}

impl DjError {
    /// Helper to construct parse errors.
    pub fn parse(line: usize, column: usize, expected: impl Into<String>) -> Self {
        DjError::Parse {
            line,
            column,
            expected: expected.into(),
        }
    }

    /// Helper to construct resolver errors.
    pub fn resolve<T: Into<String>>(message: T) -> Self {
        DjError::Resolve {
            message: message.into(),
        }
    }

    /// Helper to construct config errors.
    pub fn config<T: Into<String>>(message: T) -> Self {
        DjError::Config {
            message: message.into(),
        }
    }

    /// Helper to construct operation errors.
    pub fn operation(name: impl Into<String>, message: impl Into<String>) -> Self {
        DjError::Operation {
            operation: name.into(),
            message: message.into(),
        }
    }

    /// Helper to construct io errors with path context.
    pub fn io_path(path: impl AsRef<str>, err: impl std::fmt::Display) -> Self {
        DjError::Io(format!("{}: {}", path.as_ref(), err))
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        DjError::Internal(message.into())
    }

    /// Process exit code associated with this error kind.
    ///
    /// Parse errors and resolver errors carry distinct codes so that
    /// scripted callers can tell them apart from plain IO failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            DjError::Parse { .. } => 2,
            DjError::Resolve { .. } | DjError::Config { .. } => 3,
            _ => 1,
        }
    }
}
