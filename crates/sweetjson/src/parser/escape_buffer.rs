//! Decoding of four-digit `\uXXXX` escapes.
//!
//! The digits name a single code point which is appended as-is; surrogate
//! pairs are not combined. A lone surrogate has no `char` representation, so
//! it decodes to U+FFFD.

#[derive(Debug, Default)]
/// Accumulates up to four hexadecimal digits and decodes them into a `char`.
pub(crate) struct UnicodeEscapeBuffer {
    code: u32,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one character of the escape.
    ///
    /// - `Ok(None)` while fewer than four digits have been seen.
    /// - `Ok(Some(ch))` on the fourth digit; the buffer resets.
    /// - `Err(c)` when `c` is not an ASCII hex digit.
    pub fn feed(&mut self, c: char) -> Result<Option<char>, char> {
        let digit = c.to_digit(16).ok_or(c)?;
        self.code = (self.code << 4) | digit;
        self.len += 1;

        if self.len < 4 {
            return Ok(None);
        }

        let decoded = char::from_u32(self.code).unwrap_or(char::REPLACEMENT_CHARACTER);
        *self = Self::default();
        Ok(Some(decoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(digits: &str) -> Result<Option<char>, char> {
        let mut buffer = UnicodeEscapeBuffer::new();
        let mut last = Ok(None);
        for c in digits.chars() {
            last = buffer.feed(c);
            if last.is_err() {
                break;
            }
        }
        last
    }

    #[test]
    fn decodes_basic_multilingual_plane() {
        assert_eq!(decode("0041"), Ok(Some('A')));
        assert_eq!(decode("00e9"), Ok(Some('é')));
        assert_eq!(decode("20AC"), Ok(Some('€')));
    }

    #[test]
    fn partial_escape_needs_more() {
        assert_eq!(decode("00"), Ok(None));
    }

    #[test]
    fn rejects_non_hex_digit() {
        assert_eq!(decode("00g1"), Err('g'));
    }

    #[test]
    fn lone_surrogate_becomes_replacement_character() {
        assert_eq!(decode("D83D"), Ok(Some(char::REPLACEMENT_CHARACTER)));
    }

    #[test]
    fn resets_after_each_escape() {
        let mut buffer = UnicodeEscapeBuffer::new();
        for c in "0041".chars() {
            let _ = buffer.feed(c);
        }
        let mut last = Ok(None);
        for c in "0042".chars() {
            last = buffer.feed(c);
        }
        assert_eq!(last, Ok(Some('B')));
    }
}
