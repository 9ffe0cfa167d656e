use core::iter::Peekable;

/// Single forward cursor over the input with one character of lookahead.
#[derive(Debug)]
pub(crate) struct Cursor<I: Iterator<Item = char>> {
    chars: Peekable<I>,
    line: usize,
    column: usize,
}

impl<I: Iterator<Item = char>> Cursor<I> {
    pub(crate) fn new(chars: I) -> Self {
        Self {
            chars: chars.peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Looks at the next character without consuming it.
    pub(crate) fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Consumes `expected` if it is the next character.
    pub(crate) fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while let Some(' ' | '\r' | '\n' | '\t' | '\u{c}') = self.peek() {
            self.bump();
        }
    }

    pub(crate) fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    /// Drains up to `len` unread characters and returns them without
    /// whitespace.
    pub(crate) fn vicinity(&mut self, len: usize) -> String {
        self.chars
            .by_ref()
            .take(len)
            .filter(|c| !c.is_whitespace())
            .collect()
    }
}
