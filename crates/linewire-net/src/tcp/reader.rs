//! Newline-delimited text decoding.

use std::io::{self, BufRead};

/// Splits a byte stream into text lines.
///
/// Lines end at `\n`; a `\r` right before it is stripped as well. Bytes that
/// are not valid UTF-8 are replaced with U+FFFD rather than failing the read.
/// A final line without terminator is returned once the stream ends cleanly.
/// Line length is not capped: a peer that never sends `\n` grows the buffer
/// until it does or the stream ends.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    /// Wrap a buffered reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
        }
    }

    /// Read the next line.
    ///
    /// Returns `Ok(None)` at end of stream. An I/O error discards any bytes
    /// already read for the current line.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        if self.inner.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    fn collect(input: &[u8]) -> Vec<String> {
        let mut reader = LineReader::new(Cursor::new(input.to_vec()));
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_splits_on_newline() {
        assert_eq!(collect(b"hello\nworld\n"), vec!["hello", "world"]);
    }

    #[test]
    fn test_empty_lines_are_kept() {
        assert_eq!(collect(b"\n\nx\n"), vec!["", "", "x"]);
    }

    #[test]
    fn test_crlf_is_stripped() {
        assert_eq!(collect(b"one\r\ntwo\r\n"), vec!["one", "two"]);
        // A lone carriage return inside a line is content
        assert_eq!(collect(b"a\rb\n"), vec!["a\rb"]);
    }

    #[test]
    fn test_trailing_partial_line_delivered_once() {
        assert_eq!(collect(b"done\npartial"), vec!["done", "partial"]);
    }

    #[test]
    fn test_empty_stream() {
        assert!(collect(b"").is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        assert_eq!(collect(b"caf\xc3\xa9\nbad\xff\n"), vec!["café", "bad\u{FFFD}"]);
    }

    #[test]
    fn test_long_line_is_not_truncated() {
        let mut input = vec![b'x'; 1 << 20];
        input.push(b'\n');
        let lines = collect(&input);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 1 << 20);
    }

    /// Yields its data in fixed-size chunks, then fails.
    struct FailingReader {
        data: Vec<u8>,
        pos: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pos >= self.data.len() {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            let n = buf.len().min(3).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_error_after_lines() {
        let inner = FailingReader {
            data: b"first\nsecond\npart".to_vec(),
            pos: 0,
        };
        let mut reader = LineReader::new(BufReader::new(inner));

        assert_eq!(reader.next_line().unwrap().as_deref(), Some("first"));
        assert_eq!(reader.next_line().unwrap().as_deref(), Some("second"));
        let err = reader.next_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }
}
