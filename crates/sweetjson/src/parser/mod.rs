//! Recursive-descent JSON parser.
//!
//! The parser walks the input once with a single character of lookahead.
//! Each object and array is consumed by its own small state machine
//! (`ObjectState`, `ArrayState`), and scalars are read by dedicated
//! scanners. A depth counter moves the parser through its lifecycle
//! (`Uninitiated → Initiated → Terminated`): once the root container closes,
//! nothing but whitespace may follow.
//!
//! The grammar is strict. Only an object or an array may be the root,
//! trailing commas are rejected and object keys may not be empty. On failure
//! the next few unread characters are captured into the error as a
//! debugging aid; there is no recovery.
//!
//! # Examples
//!
//! ```rust
//! use sweetjson::{Value, parse};
//!
//! let value = parse(r#"{"key": [null, true, 2.5]}"#).unwrap();
//! assert_eq!(value.get("key").unwrap().as_array().unwrap()[2], Value::Number(2.5));
//! assert!(parse("[1, 2,]").is_err());
//! ```

mod cursor;
mod escape_buffer;


use std::io::Read;

use bstr::ByteSlice;

use cursor::Cursor;
use escape_buffer::UnicodeEscapeBuffer;

use crate::{
    error::{ErrorSource, ParseError, SyntaxError, Vicinity},
    options::ParserOptions,
    value::{Array, Map, Value, ValueKind, is_numeric},
};

/// Parses a JSON document held in memory.
///
/// # Errors
///
/// Returns a [`ParseError`] when `text` is not a single JSON object or array.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    Parser::default().parse_str(text)
}

/// Parses a JSON document from raw bytes. Invalid UTF-8 sequences are
/// replaced with U+FFFD.
///
/// # Errors
///
/// Returns a [`ParseError`] when `bytes` is not a single JSON object or array.
pub fn parse_slice(bytes: &[u8]) -> Result<Value, ParseError> {
    Parser::default().parse_slice(bytes)
}

/// Reads `reader` to the end and parses the result.
///
/// # Errors
///
/// Returns a [`ParseError`] when reading fails or the content is not a
/// single JSON object or array.
pub fn parse_reader<R: Read>(reader: R) -> Result<Value, ParseError> {
    Parser::default().parse_reader(reader)
}

/// A configured JSON parser.
///
/// A `Parser` holds only options; every call owns its own cursor and depth
/// counter, so one instance may be shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// # Errors
    ///
    /// See [`parse`].
    pub fn parse_str(&self, text: &str) -> Result<Value, ParseError> {
        self.run(text.chars())
    }

    /// # Errors
    ///
    /// See [`parse_slice`].
    pub fn parse_slice(&self, bytes: &[u8]) -> Result<Value, ParseError> {
        self.run(bytes.chars())
    }

    /// # Errors
    ///
    /// See [`parse_reader`].
    pub fn parse_reader<R: Read>(&self, mut reader: R) -> Result<Value, ParseError> {
        let mut bytes = Vec::new();
        if let Err(err) = reader.read_to_end(&mut bytes) {
            log::debug!("failed to read JSON input: {err}");
            return Err(ParseError::new(ErrorSource::Read(err.to_string()), 1, 1));
        }
        self.parse_slice(&bytes)
    }

    fn run<I: Iterator<Item = char>>(&self, chars: I) -> Result<Value, ParseError> {
        let mut run = ParseRun::new(chars, self.options);
        run.parse_document().map_err(|mut err| {
            err.vicinity = Vicinity(run.cursor.vicinity(self.options.context_len));
            log::debug!("{err}");
            err
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitiated,
    Initiated,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayState {
    Begin,
    SeenOpen,
    SeenElement,
    SeenComma,
    SeenClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectState {
    Begin,
    SeenOpen,
    SeenKey,
    SeenColon,
    SeenValue,
    SeenComma,
    SeenClose,
}

/// State owned by a single parse call.
struct ParseRun<I: Iterator<Item = char>> {
    cursor: Cursor<I>,
    depth: usize,
    lifecycle: Lifecycle,
    options: ParserOptions,
}

impl<I: Iterator<Item = char>> ParseRun<I> {
    fn new(chars: I, options: ParserOptions) -> Self {
        Self {
            cursor: Cursor::new(chars),
            depth: 0,
            lifecycle: Lifecycle::Uninitiated,
            options,
        }
    }

    fn error(&self, err: SyntaxError) -> ParseError {
        let (line, column) = self.cursor.position();
        ParseError::new(err, line, column)
    }

    /// Error for the character under the cursor, which did not match
    /// `expected`.
    fn unexpected(&mut self, expected: &'static str) -> ParseError {
        match self.cursor.peek() {
            Some(found) => self.error(SyntaxError::UnexpectedCharacter { found, expected }),
            None => self.error(SyntaxError::UnexpectedEndOfInput),
        }
    }

    fn read(&mut self) -> Result<char, ParseError> {
        self.cursor
            .bump()
            .ok_or_else(|| self.error(SyntaxError::UnexpectedEndOfInput))
    }

    fn read_chars(&mut self, len: usize) -> Result<String, ParseError> {
        (0..len).map(|_| self.read()).collect()
    }

    fn expect(&mut self, c: char, expected: &'static str) -> Result<(), ParseError> {
        if self.cursor.eat(c) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn next_kind(&mut self) -> ValueKind {
        self.cursor.peek().map_or(ValueKind::Unknown, ValueKind::of_start)
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.lifecycle = Lifecycle::Initiated;
        self.depth += 1;
        match self.options.max_depth {
            Some(max) if self.depth > max => Err(self.error(SyntaxError::DepthLimitExceeded(max))),
            _ => Ok(()),
        }
    }

    fn leave(&mut self) {
        debug_assert!(self.depth > 0, "left a container that was never entered");
        self.depth -= 1;
        if self.depth == 0 {
            self.lifecycle = Lifecycle::Terminated;
        }
    }

    fn parse_document(&mut self) -> Result<Value, ParseError> {
        self.cursor.skip_whitespace();
        let root = match self.cursor.peek() {
            None => return Err(self.error(SyntaxError::UnexpectedEndOfInput)),
            Some('{') => self.parse_object()?,
            Some('[') => self.parse_array()?,
            Some(c) => return Err(self.error(SyntaxError::RootNotCompound(c))),
        };
        debug_assert_eq!(self.lifecycle, Lifecycle::Terminated);

        // Remaining characters must be whitespace.
        self.cursor.skip_whitespace();
        if self.cursor.peek().is_none() {
            return Ok(root);
        }
        match self.next_kind() {
            ValueKind::Unknown => Err(self.error(SyntaxError::TrailingData)),
            _ => Err(self.error(SyntaxError::MultipleRoots)),
        }
    }

    fn parse_value(&mut self, kind: ValueKind) -> Result<Value, ParseError> {
        match kind {
            ValueKind::String => self.parse_string().map(Value::String),
            ValueKind::Number => self.parse_number(),
            ValueKind::Bool => self.parse_boolean(),
            ValueKind::Null => self.parse_null(),
            ValueKind::Array => self.parse_array(),
            ValueKind::Object => self.parse_object(),
            ValueKind::Unknown => Err(self.unexpected("a value")),
        }
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.expect('"', "'\"'")?;
        let mut out = String::new();
        loop {
            match self.read()? {
                '"' => return Ok(out),
                '\\' => out.push(self.parse_escape()?),
                c => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, ParseError> {
        let c = match self.read()? {
            '\\' => '\\',
            '"' => '"',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                let mut escape = UnicodeEscapeBuffer::new();
                loop {
                    let digit = self.read()?;
                    match escape.feed(digit) {
                        Ok(Some(decoded)) => break decoded,
                        Ok(None) => {}
                        Err(bad) => return Err(self.error(SyntaxError::InvalidUnicodeEscape(bad))),
                    }
                }
            }
            other => return Err(self.error(SyntaxError::InvalidEscape(other))),
        };
        Ok(c)
    }

    /// Consumes the longest run of number characters. Malformed runs such as
    /// `-`, `0e` or `1-2` are rejected when converting; anything that stops
    /// the run is left to the enclosing container.
    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let mut literal = String::new();
        while let Some(c) = self.cursor.peek().filter(|c| is_numeric(*c)) {
            literal.push(c);
            self.cursor.bump();
        }
        match literal.parse::<f64>() {
            Ok(n) => Ok(Value::Number(n)),
            Err(_) => Err(self.error(SyntaxError::InvalidNumber(literal))),
        }
    }

    fn parse_boolean(&mut self) -> Result<Value, ParseError> {
        let mut literal = self.read_chars(4)?;
        if literal == "true" {
            return Ok(Value::Boolean(true));
        }
        literal.push(self.read()?);
        if literal == "false" {
            return Ok(Value::Boolean(false));
        }
        Err(self.error(SyntaxError::InvalidLiteral {
            literal,
            expected: "boolean",
        }))
    }

    fn parse_null(&mut self) -> Result<Value, ParseError> {
        let literal = self.read_chars(4)?;
        if literal == "null" {
            return Ok(Value::Null);
        }
        Err(self.error(SyntaxError::InvalidLiteral {
            literal,
            expected: "null",
        }))
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        self.enter()?;
        let mut state = ArrayState::Begin;
        let mut items = Array::new();

        loop {
            self.cursor.skip_whitespace();
            state = match state {
                ArrayState::Begin => {
                    self.expect('[', "'['")?;
                    ArrayState::SeenOpen
                }
                ArrayState::SeenOpen => {
                    if self.cursor.eat(']') {
                        ArrayState::SeenClose
                    } else {
                        let kind = self.next_kind();
                        items.push(self.parse_value(kind)?);
                        ArrayState::SeenElement
                    }
                }
                ArrayState::SeenElement => match self.cursor.peek() {
                    Some(']') => {
                        self.cursor.bump();
                        ArrayState::SeenClose
                    }
                    Some(',') => {
                        self.cursor.bump();
                        ArrayState::SeenComma
                    }
                    _ => return Err(self.unexpected("',' or ']'")),
                },
                ArrayState::SeenComma => {
                    if self.next_kind() == ValueKind::Unknown {
                        return Err(self.unexpected("a value"));
                    }
                    // Same state as right after the opening bracket.
                    ArrayState::SeenOpen
                }
                ArrayState::SeenClose => {
                    self.leave();
                    return Ok(Value::Array(items));
                }
            };
        }
    }

    fn parse_object(&mut self) -> Result<Value, ParseError> {
        self.enter()?;
        let mut state = ObjectState::Begin;
        let mut map = Map::new();
        let mut key = String::new();

        loop {
            self.cursor.skip_whitespace();
            state = match state {
                ObjectState::Begin => {
                    self.expect('{', "'{'")?;
                    ObjectState::SeenOpen
                }
                ObjectState::SeenOpen => match self.cursor.peek() {
                    Some('}') => {
                        self.cursor.bump();
                        ObjectState::SeenClose
                    }
                    Some('"') => {
                        key = self.parse_string()?;
                        if key.is_empty() {
                            return Err(self.error(SyntaxError::EmptyKey));
                        }
                        ObjectState::SeenKey
                    }
                    _ => return Err(self.unexpected("'\"' or '}'")),
                },
                ObjectState::SeenKey => {
                    self.expect(':', "':'")?;
                    ObjectState::SeenColon
                }
                ObjectState::SeenColon => {
                    let kind = self.next_kind();
                    let value = self.parse_value(kind)?;
                    map.insert(core::mem::take(&mut key), value);
                    ObjectState::SeenValue
                }
                ObjectState::SeenValue => match self.cursor.peek() {
                    Some('}') => {
                        self.cursor.bump();
                        ObjectState::SeenClose
                    }
                    Some(',') => {
                        self.cursor.bump();
                        ObjectState::SeenComma
                    }
                    _ => return Err(self.unexpected("',' or '}'")),
                },
                ObjectState::SeenComma => {
                    if self.next_kind() == ValueKind::Unknown {
                        return Err(self.unexpected("a value"));
                    }
                    ObjectState::SeenOpen
                }
                ObjectState::SeenClose => {
                    self.leave();
                    return Ok(Value::Object(map));
                }
            };
        }
    }
}
