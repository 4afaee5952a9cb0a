//! Newline-delimited framing for the stdio transport.
//!
//! Bytes are gathered for a whole line before decoding, so a multi-byte
//! character split across two reads of the underlying buffer is intact.
//! Lines that are too long or not UTF-8 are reported as frames of their
//! own and the reader stays usable for the next line.

use std::io::{self, BufRead, Read};

/// One unit read from the client.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    /// A complete line, without its terminator.
    Line(String),
    /// The line was not valid UTF-8.
    Malformed(String),
    /// The line exceeded the limit and was skipped.
    Oversize { limit: usize },
    Eof,
}

/// Reads [`Frame`]s from a buffered byte stream.
pub struct LineReader<R> {
    inner: R,
    limit: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    /// `limit` is the largest accepted line, terminator excluded.
    pub const fn new(inner: R, limit: usize) -> Self {
        Self {
            inner,
            limit,
            buf: Vec::new(),
        }
    }

    /// Read the next frame.
    ///
    /// # Errors
    ///
    /// Only I/O failures of the underlying reader are errors.
    pub fn next_frame(&mut self) -> io::Result<Frame> {
        self.buf.clear();
        let cap = u64::try_from(self.limit).unwrap_or(u64::MAX).saturating_add(1);
        let read = (&mut self.inner).take(cap).read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(Frame::Eof);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        } else if self.buf.len() > self.limit {
            self.inner.skip_until(b'\n')?;
            return Ok(Frame::Oversize { limit: self.limit });
        }
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }

        match std::str::from_utf8(&self.buf) {
            Ok(line) => Ok(Frame::Line(line.to_owned())),
            Err(e) => Ok(Frame::Malformed(e.to_string())),
        }
    }
}
