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

//! Streaming input for the interpreter.
//!
//! Dictionaries are UTF-8 text, one entry per line. The reader strips
//! the trailing newline (LF or CRLF), skips blank lines and never
//! materializes more than one line at a time, so multi-gigabyte inputs
//! stream through in constant memory.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{DjError, Result};

/// Streaming reader over dictionary entries.
pub struct DjCDictionaryReader {
    inner: Box<dyn BufRead + Send>,
    line_no: u64,
}

impl DjCDictionaryReader {
    #[allow(non_snake_case)]
    pub fn DjFFromPath(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|err| DjError::io_path(path.to_string_lossy(), err))?;
        Ok(DjCDictionaryReader {
            inner: Box::new(BufReader::new(file)),
            line_no: 0,
        })
    }

    #[allow(non_snake_case)]
    pub fn DjFFromStdin() -> Self {
        DjCDictionaryReader {
            inner: Box::new(BufReader::new(std::io::stdin())),
            line_no: 0,
        }
    }

    /// A reader over in-memory text; used by the test suite.
    #[allow(non_snake_case)]
    pub fn DjFFromText(text: &str) -> Self {
        DjCDictionaryReader {
            inner: Box::new(std::io::Cursor::new(text.to_string())),
            line_no: 0,
        }
    }

    /// Returns the next non-blank entry together with its line number,
    /// or `None` at end of input.
    pub fn next_entry(&mut self) -> Result<Option<(u64, String)>> {
        loop {
            let mut line = String::new();
            let read = self.inner.read_line(&mut line)?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            if !line.is_empty() {
                return Ok(Some((self.line_no, line)));
            }
        }
    }
}

/// Reads an auxiliary file (ignore lists, sieves, replacement tables,
/// global lists) into its non-blank lines, with trailing newlines
/// stripped. Leading whitespace is preserved so that entries with
/// significant spaces survive.
#[allow(non_snake_case)]
pub fn DjFReadLines(path: &str) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|err| DjError::io_path(path, err))?;
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        let mut line = line.map_err(|err| DjError::io_path(path, err))?;
        while line.ends_with('\r') {
            line.pop();
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_skipped_and_numbers_kept() {
        let mut reader = DjCDictionaryReader::DjFFromText("a\n\nb\r\n");
        assert_eq!(reader.next_entry().unwrap(), Some((1, "a".to_string())));
        assert_eq!(reader.next_entry().unwrap(), Some((3, "b".to_string())));
        assert_eq!(reader.next_entry().unwrap(), None);
    }
}
