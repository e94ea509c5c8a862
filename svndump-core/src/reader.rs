//! Bounded-memory line-buffered input primitive (component A, spec.md §6).
//!
//! Wraps any [`Read`] in a [`BufReader`] and exposes the primitives the core
//! consumes: `read_line`, `read_binary`, `read_char`, `skip_bytes`,
//! `ferror`. Rust's RAII replaces the source's explicit `init`/`deinit`
//! pair: construction is `LineReader::new`, teardown is `Drop`.

use std::io::{self, BufRead, BufReader, Read};

/// A line-oriented reader with bounded-memory primitives for the dump
/// parser's header/body mix.
pub struct LineReader<R: Read> {
    inner: BufReader<R>,
    scratch: Vec<u8>,
    line_no: u64,
    bytes_read: u64,
    error: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::with_capacity(64 * 1024, inner),
            scratch: Vec::new(),
            line_no: 0,
            bytes_read: 0,
            error: false,
        }
    }

    /// Read one line, with the trailing `\n` stripped. `None` at EOF.
    ///
    /// The returned slice borrows an internal scratch buffer that is
    /// overwritten by the next call — callers that need to retain the
    /// value must copy it first.
    pub fn read_line(&mut self) -> io::Result<Option<&[u8]>> {
        self.scratch.clear();
        let n = self.inner.read_until(b'\n', &mut self.scratch).map_err(|e| {
            self.error = true;
            e
        })?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        self.bytes_read += n as u64;
        if self.scratch.last() == Some(&b'\n') {
            self.scratch.pop();
        }
        Ok(Some(&self.scratch))
    }

    /// Read exactly `buf.len()` bytes, or fail with an I/O error on a short
    /// read.
    pub fn read_binary(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf).map_err(|e| {
            self.error = true;
            e
        })?;
        self.bytes_read += buf.len() as u64;
        Ok(())
    }

    /// Read a single byte. `None` at EOF.
    pub fn read_char(&mut self) -> io::Result<Option<u8>> {
        let mut b = [0u8; 1];
        let n = self.inner.read(&mut b).map_err(|e| {
            self.error = true;
            e
        })?;
        if n == 0 {
            return Ok(None);
        }
        self.bytes_read += 1;
        Ok(Some(b[0]))
    }

    /// Discard up to `n` bytes, returning how many were actually skipped
    /// (fewer than `n` only at EOF).
    pub fn skip_bytes(&mut self, n: u64) -> io::Result<u64> {
        let mut remaining = n;
        let mut buf = [0u8; 8192];
        while remaining > 0 {
            let chunk = remaining.min(buf.len() as u64) as usize;
            let got = self.inner.read(&mut buf[..chunk]).map_err(|e| {
                self.error = true;
                e
            })?;
            if got == 0 {
                break;
            }
            remaining -= got as u64;
            self.bytes_read += got as u64;
        }
        Ok(n - remaining)
    }

    /// Whether an I/O error has occurred on this reader.
    pub fn ferror(&self) -> bool {
        self.error
    }

    /// The 1-based number of the last line returned by `read_line`, for
    /// diagnostics.
    pub fn line_no(&self) -> u64 {
        self.line_no
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: Read> Read for LineReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.bytes_read += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lines_without_trailing_newline() {
        let mut r = LineReader::new(&b"hello\nworld\n"[..]);
        assert_eq!(r.read_line().unwrap(), Some(&b"hello"[..]));
        assert_eq!(r.read_line().unwrap(), Some(&b"world"[..]));
        assert_eq!(r.read_line().unwrap(), None);
    }

    #[test]
    fn reads_final_line_without_trailing_newline() {
        let mut r = LineReader::new(&b"no newline"[..]);
        assert_eq!(r.read_line().unwrap(), Some(&b"no newline"[..]));
        assert_eq!(r.read_line().unwrap(), None);
    }

    #[test]
    fn read_binary_reads_exact_bytes() {
        let mut r = LineReader::new(&b"abcdef"[..]);
        let mut buf = [0u8; 3];
        r.read_binary(&mut buf).unwrap();
        assert_eq!(&buf, b"abc");
        r.read_binary(&mut buf).unwrap();
        assert_eq!(&buf, b"def");
    }

    #[test]
    fn read_binary_short_read_is_an_error() {
        let mut r = LineReader::new(&b"ab"[..]);
        let mut buf = [0u8; 3];
        assert!(r.read_binary(&mut buf).is_err());
        assert!(r.ferror());
    }

    #[test]
    fn skip_bytes_stops_at_eof() {
        let mut r = LineReader::new(&b"abcdef"[..]);
        assert_eq!(r.skip_bytes(4).unwrap(), 4);
        assert_eq!(r.skip_bytes(10).unwrap(), 2);
    }

    #[test]
    fn read_char_walks_one_byte_at_a_time() {
        let mut r = LineReader::new(&b"ab"[..]);
        assert_eq!(r.read_char().unwrap(), Some(b'a'));
        assert_eq!(r.read_char().unwrap(), Some(b'b'));
        assert_eq!(r.read_char().unwrap(), None);
    }
}
