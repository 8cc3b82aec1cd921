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

//! Persistence for the search: the solution memo, the TS/SA memory
//! snapshot, and the per-iteration event trace.
//!
//! The memo and the memory snapshot rewrite their files through a
//! sibling temporary and a rename, so a crash mid-write never leaves a
//! torn state file behind; the event traces are plain append-only.

mod event;
mod memory;
mod solution;

pub use event::{EventLog, IterationEvent, IterationOutcome};
pub use memory::SearchMemory;
pub use solution::{Feasibility, SolutionLog, SolutionRecord};

use std::{fs, io, path::Path};

/// Writes `contents` to `path` atomically: a sibling file is written
/// first and renamed over the target on success.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let mut sibling = path.as_os_str().to_owned();
    sibling.push(".tmp");
    let sibling = Path::new(&sibling);
    fs::write(sibling, contents)?;
    fs::rename(sibling, path)
}
