/// Configuration options for the JSON parser.
///
/// # Examples
///
/// ```rust
/// use sweetjson::{Parser, ParserOptions};
///
/// let parser = Parser::new(ParserOptions {
///     max_depth: Some(64),
///     ..Default::default()
/// });
/// assert!(parser.parse_str("[[[]]]").is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum nesting depth of objects and arrays.
    ///
    /// Parsing recurses once per nested container, so untrusted input should
    /// set a limit to keep the call stack bounded. The root container counts
    /// as depth 1.
    ///
    /// # Default
    ///
    /// `None` (unlimited)
    pub max_depth: Option<usize>,

    /// How many unread characters to capture into a [`ParseError`] when
    /// parsing fails. Whitespace is removed from the capture afterwards.
    ///
    /// # Default
    ///
    /// `20`
    ///
    /// [`ParseError`]: crate::ParseError
    pub context_len: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            context_len: 20,
        }
    }
}
