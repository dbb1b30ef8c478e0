//! DXF ASCII tag reader

use crate::error::{DxfError, Result};
use crate::types::{DxfVersion, GroupValue, ValueKind};
use encoding_rs::Encoding;
use std::io::BufRead;

/// Line-oriented reader over a DXF text stream.
///
/// Group-code lines and value lines alternate. The reader never buffers more
/// than the line it is handing out; the declared version is carried along as
/// context for the codec.
pub struct TagReader<R: BufRead> {
    reader: R,
    line_number: usize,
    last_code: i32,
    version: DxfVersion,
    /// Non-UTF8 fallback encoding. `None` means Latin-1 (byte-to-char).
    encoding: Option<&'static Encoding>,
    buffer: Vec<u8>,
}

impl<R: BufRead> TagReader<R> {
    /// Create a reader positioned at line 0 with an unknown version.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            last_code: 0,
            version: DxfVersion::Unknown,
            encoding: None,
            buffer: Vec::new(),
        }
    }

    /// Set the version used for slot gating.
    pub fn with_version(mut self, version: DxfVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the code page used for non-UTF8 lines.
    pub fn with_encoding(mut self, encoding: Option<&'static Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Start counting lines at `offset` (for streams cut out of a larger file).
    pub fn with_line_offset(mut self, offset: usize) -> Self {
        self.line_number = offset;
        self
    }

    pub fn version(&self) -> DxfVersion {
        self.version
    }

    pub fn set_version(&mut self, version: DxfVersion) {
        self.version = version;
    }

    pub fn encoding(&self) -> Option<&'static Encoding> {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: Option<&'static Encoding>) {
        self.encoding = encoding;
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// The code read by the last [`next_group_code`](Self::next_group_code).
    pub fn last_code(&self) -> i32 {
        self.last_code
    }

    /// Read one line without its terminator. `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        self.buffer.clear();
        if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
        }
        if self.buffer.last() == Some(&b'\r') {
            self.buffer.pop();
        }

        let line = match std::str::from_utf8(&self.buffer) {
            Ok(s) => s.to_string(),
            Err(_) => match self.encoding {
                Some(enc) => enc.decode(&self.buffer).0.into_owned(),
                // Latin-1 maps bytes 0-255 straight to code points
                None => self.buffer.iter().map(|&b| b as char).collect(),
            },
        };
        Ok(Some(line))
    }

    /// Read and parse the next group-code line.
    pub fn next_group_code(&mut self) -> Result<i32> {
        let line = self.read_line()?.ok_or(DxfError::EndOfStream {
            line: self.line_number,
        })?;
        let code = line
            .trim()
            .parse::<i32>()
            .map_err(|_| DxfError::InvalidGroupCode {
                line: self.line_number,
                text: line.clone(),
            })?;
        self.last_code = code;
        Ok(code)
    }

    /// Read the value line following the last group code as text.
    pub fn read_raw(&mut self) -> Result<String> {
        self.read_line()?.ok_or(DxfError::UnexpectedEof {
            line: self.line_number,
            code: self.last_code,
        })
    }

    /// Read the value line and coerce it to `kind`.
    ///
    /// A value that does not coerce still consumes its line, so the stream
    /// stays aligned on the next group code.
    pub fn read_value(&mut self, kind: ValueKind) -> Result<GroupValue> {
        let text = self.read_raw()?;
        GroupValue::parse(kind, &text).ok_or_else(|| DxfError::MalformedValue {
            line: self.line_number,
            code: self.last_code,
            kind,
            text,
        })
    }

    /// Consume a value line without interpreting it.
    pub fn skip_value(&mut self) -> Result<()> {
        self.read_raw().map(|_| ())
    }

    /// Whether `code` ends the current entity.
    pub fn is_sentinel(&self, code: i32) -> bool {
        code == 0
    }

    /// Read a whole code/value pair. `None` on a clean end of input.
    pub fn read_pair(&mut self) -> Result<Option<(i32, String)>> {
        match self.next_group_code() {
            Ok(code) => Ok(Some((code, self.read_raw()?))),
            Err(DxfError::EndOfStream { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: &str) -> TagReader<Cursor<&[u8]>> {
        TagReader::new(Cursor::new(data.as_bytes()))
    }

    #[test]
    fn test_read_padded_code_and_value() {
        let mut r = reader("  8\nMyLayer\n 70\n  42\n");
        assert_eq!(r.next_group_code().unwrap(), 8);
        assert_eq!(r.read_value(ValueKind::Str).unwrap(), GroupValue::from("MyLayer"));
        assert_eq!(r.next_group_code().unwrap(), 70);
        assert_eq!(r.read_value(ValueKind::Integer).unwrap(), GroupValue::Integer(42));
        assert_eq!(r.line_number(), 4);
        assert!(matches!(r.next_group_code(), Err(DxfError::EndOfStream { line: 4 })));
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut r = reader("  0\r\nSECTION\r\n");
        assert_eq!(r.read_pair().unwrap(), Some((0, "SECTION".to_string())));
        assert_eq!(r.read_pair().unwrap(), None);
    }

    #[test]
    fn test_malformed_value_keeps_alignment() {
        let mut r = reader(" 40\nabc\n  8\n0\n");
        assert_eq!(r.next_group_code().unwrap(), 40);
        let err = r.read_value(ValueKind::Real).unwrap_err();
        assert!(matches!(err, DxfError::MalformedValue { line: 2, code: 40, .. }));
        assert_eq!(r.next_group_code().unwrap(), 8);
    }

    #[test]
    fn test_invalid_group_code_is_fatal() {
        let mut r = reader("abc\nvalue\n");
        let err = r.next_group_code().unwrap_err();
        assert!(matches!(err, DxfError::InvalidGroupCode { line: 1, .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_eof_between_code_and_value() {
        let mut r = reader("  8\n");
        r.next_group_code().unwrap();
        assert!(matches!(
            r.skip_value(),
            Err(DxfError::UnexpectedEof { code: 8, .. })
        ));
    }

    #[test]
    fn test_non_utf8_falls_back_to_latin1_or_code_page() {
        let bytes: &[u8] = b"  1\ncaf\xe9\n  1\n\xc0\xc1\n";
        let mut r = TagReader::new(Cursor::new(bytes));
        r.next_group_code().unwrap();
        assert_eq!(r.read_raw().unwrap(), "caf\u{e9}");

        r.set_encoding(Some(encoding_rs::WINDOWS_1251));
        r.next_group_code().unwrap();
        assert_eq!(r.read_raw().unwrap(), "\u{410}\u{411}");
    }

    #[test]
    fn test_sentinel() {
        let r = reader("");
        assert!(r.is_sentinel(0));
        assert!(!r.is_sentinel(100));
    }
}
