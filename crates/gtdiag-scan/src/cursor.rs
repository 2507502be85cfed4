use std::io::{self, BufRead};

/// Forward-only line reader over any `BufRead`.
///
/// Lines are split on `\n` with no length limit. Invalid UTF-8 is replaced
/// with U+FFFD instead of failing the read, and trailing whitespace
/// (including `\r`) is trimmed.
pub struct LineCursor<R> {
    reader: R,
    buf: Vec<u8>,
    offset: u64,
}

impl<R: BufRead> LineCursor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(512),
            offset: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }
        self.offset += n as u64;
        let decoded = String::from_utf8_lossy(&self.buf);
        Ok(Some(decoded.trim_end().to_string()))
    }
}

impl<R: BufRead> Iterator for LineCursor<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn splits_and_trims() {
        let data = b"first\r\nsecond  \n\nlast-no-newline";
        let lines: Vec<String> = LineCursor::new(Cursor::new(&data[..]))
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines, vec!["first", "second", "", "last-no-newline"]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let data = b"ok \xff\xfe bytes\nnext\n";
        let mut cur = LineCursor::new(Cursor::new(&data[..]));
        let first = cur.next_line().unwrap().unwrap();
        assert!(first.starts_with("ok "));
        assert!(first.contains('\u{FFFD}'));
        assert!(first.ends_with(" bytes"));
        assert_eq!(cur.next_line().unwrap().unwrap(), "next");
        assert!(cur.next_line().unwrap().is_none());
    }

    #[test]
    fn offset_tracks_consumed_bytes() {
        let data = b"abc\ndefg\n";
        let mut cur = LineCursor::new(Cursor::new(&data[..]));
        cur.next_line().unwrap();
        assert_eq!(cur.offset(), 4);
        cur.next_line().unwrap();
        assert_eq!(cur.offset(), 9);
    }

    #[test]
    fn very_long_line_is_kept_whole() {
        let long = "x".repeat(1 << 20);
        let data = format!("{long}\nshort\n");
        let mut cur = LineCursor::new(Cursor::new(data.into_bytes()));
        assert_eq!(cur.next_line().unwrap().unwrap().len(), 1 << 20);
        assert_eq!(cur.next_line().unwrap().unwrap(), "short");
    }
}
