//! Byte offset to line mapping.

use serde::{Deserialize, Serialize};

/// Zero-based line and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// Start offsets of every line in a text. `\n`, `\r\n` and a lone `\r` each
/// end a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    i += 2;
                    line_starts.push(i);
                }
                b'\r' | b'\n' => {
                    i += 1;
                    line_starts.push(i);
                }
                _ => i += 1,
            }
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line containing `offset`; offsets past the end map to the last line.
    pub fn line(&self, offset: usize) -> u32 {
        let offset = offset.min(self.len);
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        line as u32
    }

    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = self.line(offset);
        Position {
            line,
            column: (offset - self.line_starts[line as usize]) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_line() {
        let index = LineIndex::new("abc");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line(0), 0);
        assert_eq!(index.line(3), 0);
    }

    #[test]
    fn test_line_endings() {
        // lines: "a", "b", "c", "d"
        let index = LineIndex::new("a\nb\r\nc\rd");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line(0), 0);
        assert_eq!(index.line(1), 0);
        assert_eq!(index.line(2), 1);
        assert_eq!(index.line(4), 1);
        assert_eq!(index.line(5), 2);
        assert_eq!(index.line(7), 3);
    }

    #[test]
    fn test_trailing_newline_starts_empty_line() {
        let index = LineIndex::new("a\n");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line(2), 1);
    }

    #[test]
    fn test_offset_past_end() {
        let index = LineIndex::new("a\nb");
        assert_eq!(index.line(100), 1);
        assert_eq!(index.position(100), Position { line: 1, column: 1 });
    }

    #[test]
    fn test_position() {
        let index = LineIndex::new("<div>\n  <span>");
        assert_eq!(index.position(0), Position { line: 0, column: 0 });
        assert_eq!(index.position(9), Position { line: 1, column: 3 });
    }
}
