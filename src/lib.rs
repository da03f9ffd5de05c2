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

#![allow(non_snake_case)]

pub mod errors;
pub mod entry;
pub mod log;
pub mod script;
pub mod operation;
pub mod operations;
pub mod runtime;
pub mod export;
pub mod ingest;
pub mod eval;

pub use entry::{DjEntryList, DjOutcome};
pub use errors::{DjError, Result};
pub use eval::{DjCEvaluator, DjCRunStats};
pub use export::{DjCOutputHub, DjCWriteStats};
pub use ingest::DjCDictionaryReader;
pub use operation::{DjCChain, DjCOperation, DjCOperationKind};
pub use operations::{DjCArgCursor, DjCArgSpec, DjCOperationRegistry};
pub use runtime::{DjCEnvironment, DjCNamedListKind, DjCRuntime};
pub use script::{DjCProgram, DjCScript, DjFParseScript, DjFResolveScript};
