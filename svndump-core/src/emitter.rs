//! Fast-export emitter (component D, spec.md §6): writes blob and commit
//! records in `git fast-import` stream syntax.

use crate::tree::FileChange;
use std::io::{self, Read, Write};

/// Allocates monotonically increasing blob marks and writes blob/commit
/// records to `W`.
pub struct Emitter<W: Write> {
    out: W,
    next_mark: u32,
    ref_name: String,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W, ref_name: impl Into<String>) -> Self {
        Self {
            out,
            next_mark: 0,
            ref_name: ref_name.into(),
        }
    }

    /// Allocate the next blob mark. Marks start at 1; 0 is reserved to mean
    /// "no new content" (spec.md §3).
    pub fn next_blob_mark(&mut self) -> u32 {
        self.next_mark += 1;
        self.next_mark
    }

    /// Restart mark allocation from 0, for a translator-level `reset`.
    pub fn reset(&mut self) {
        self.next_mark = 0;
    }

    /// Recover the underlying writer, e.g. to inspect buffered output in
    /// tests.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write one blob record, streaming exactly `length` bytes from `input`
    /// straight through to the output — the dump's text body is never
    /// buffered whole in memory.
    pub fn blob(&mut self, mark: u32, length: u64, input: &mut impl Read) -> io::Result<()> {
        writeln!(self.out, "blob")?;
        writeln!(self.out, "mark :{mark}")?;
        writeln!(self.out, "data {length}")?;
        let copied = io::copy(&mut input.take(length), &mut self.out)?;
        if copied != length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {length} bytes of blob content, got {copied}"),
            ));
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Write one commit record for `rev`, with one `M`/`D` line per change.
    #[allow(clippy::too_many_arguments)]
    pub fn commit(
        &mut self,
        rev: u32,
        author: &str,
        log: &[u8],
        uuid: &str,
        url: &str,
        timestamp: i64,
        changes: &[FileChange],
    ) -> io::Result<()> {
        writeln!(self.out, "commit refs/heads/{}", self.ref_name)?;
        if !uuid.is_empty() || !url.is_empty() {
            writeln!(self.out, "# svn {url}@{rev} {uuid}")?;
        }
        let ident = if author.is_empty() { "unknown" } else { author };
        writeln!(self.out, "author {ident} <{ident}@{uuid}> {timestamp} +0000")?;
        writeln!(self.out, "committer {ident} <{ident}@{uuid}> {timestamp} +0000")?;
        writeln!(self.out, "data {}", log.len())?;
        self.out.write_all(log)?;
        if log.last() != Some(&b'\n') {
            writeln!(self.out)?;
        }
        for change in changes {
            match change {
                FileChange::Modify { path, mode, mark } => {
                    writeln!(self.out, "M {} :{} {}", mode.git_mode(), mark, path)?;
                }
                FileChange::Delete { path } => {
                    writeln!(self.out, "D {path}")?;
                }
            }
        }
        writeln!(self.out)?;
        Ok(())
    }
}
