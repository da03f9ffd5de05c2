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

//! The script front-end: lexer, parser, AST and resolver.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod resolver;

pub use ast::{DjCArg, DjCChainAst, DjCDirective, DjCModifier, DjCOpAst, DjCOpNode, DjCScript, DjCSink};
pub use parser::DjFParseScript;
pub use resolver::{DjCProgram, DjFResolveScript};
