//! Rune cursor over the source text.
//!
//! The scanner tracks a `[start, end)` span and an accumulation buffer that
//! token text is built from. The buffer exists because escape sequences
//! rewrite characters while a literal is being consumed: `advance` copies
//! source runes into it, `replace` substitutes a decoded rune instead.

/// Half-open `[lo, hi)` range of rune offsets into the source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub lo: usize,
    pub hi: usize,
}

pub struct Scanner {
    text: Vec<char>,
    start: usize,
    end: usize,
    buf: String,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            start: 0,
            end: 0,
            buf: String::new(),
        }
    }

    pub fn is_eof(&self) -> bool {
        self.text.len() <= self.end
    }

    /// Rune at the cursor, or `None` at end of input.
    pub fn current(&self) -> Option<char> {
        self.text.get(self.end).copied()
    }

    /// The next `n` runes as text, without consuming. Returns an empty
    /// string when fewer than `n` runes remain.
    pub fn peek(&self, n: usize) -> String {
        if self.text.len() < self.end + n {
            return String::new();
        }
        self.text[self.end..self.end + n].iter().collect()
    }

    /// Consume `n` runes, appending them to the accumulation buffer.
    /// Out-of-bound advances are no-ops.
    pub fn advance(&mut self, n: usize) {
        if self.text.len() < self.end + n {
            return;
        }
        self.buf.extend(&self.text[self.end..self.end + n]);
        self.end += n;
    }

    /// Consume `n` runes without accumulating them.
    pub fn skip(&mut self, n: usize) {
        if self.text.len() < self.end + n {
            return;
        }
        self.end += n;
    }

    /// Append `r` to the buffer and skip one source rune. Used while
    /// decoding escape sequences.
    pub fn replace(&mut self, r: char) {
        self.buf.push(r);
        self.skip(1);
    }

    /// Return the accumulated text and the consumed span, then reset both.
    pub fn flush(&mut self) -> (String, Span) {
        let text = std::mem::take(&mut self.buf);
        let span = Span {
            lo: self.start,
            hi: self.end,
        };
        self.start = self.end;
        (text, span)
    }
}
