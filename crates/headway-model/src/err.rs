// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::{fmt::Display, io, path::PathBuf};

/// Failure while reading an input or log file.
///
/// Missing and malformed inputs are kept apart because the process maps
/// them to distinct exit codes: a missing file means the data directory
/// was not set up, a malformed file means it was set up incorrectly.
#[derive(Debug)]
pub enum InputError {
    /// The file could not be opened at all.
    Missing { path: PathBuf, source: io::Error },
    /// The file opened but a row did not parse.
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl InputError {
    pub fn missing(path: impl Into<PathBuf>, source: io::Error) -> Self {
        InputError::Missing {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        InputError::Malformed {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Returns the path of the offending file.
    pub fn path(&self) -> &PathBuf {
        match self {
            InputError::Missing { path, .. } => path,
            InputError::Malformed { path, .. } => path,
        }
    }
}

impl Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::Missing { path, source } => {
                write!(f, "failed to open {}: {}", path.display(), source)
            }
            InputError::Malformed { path, line, reason } => {
                write!(f, "{}:{}: {}", path.display(), line, reason)
            }
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::Missing { source, .. } => Some(source),
            InputError::Malformed { .. } => None,
        }
    }
}
