use core::fmt;

use thiserror::Error;

use crate::value::ValueKind;

/// A failure to turn input text into a [`Value`](crate::Value) tree.
///
/// The position points at the character the parser was looking at when it
/// gave up. The vicinity holds up to the next few unread characters (with
/// whitespace removed) and exists purely as a debugging aid.
#[derive(Error, Debug, PartialEq)]
#[error("{source} at {line}:{column}{vicinity}")]
pub struct ParseError {
    pub(crate) source: ErrorSource,
    /// 1-based line of the failure.
    pub line: usize,
    /// 1-based column of the failure.
    pub column: usize,
    pub(crate) vicinity: Vicinity,
}

impl ParseError {
    pub(crate) fn new(source: impl Into<ErrorSource>, line: usize, column: usize) -> Self {
        Self {
            source: source.into(),
            line,
            column,
            vicinity: Vicinity::default(),
        }
    }

    /// The syntax error behind this failure, if it was not a read failure.
    #[must_use]
    pub fn syntax_error(&self) -> Option<&SyntaxError> {
        match &self.source {
            ErrorSource::Syntax(err) => Some(err),
            ErrorSource::Read(_) => None,
        }
    }

    /// The unread characters captured when the parser failed.
    #[must_use]
    pub fn vicinity(&self) -> &str {
        &self.vicinity.0
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ErrorSource {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("read error: {0}")]
    Read(String),
}

/// Diagnostic context appended to a [`ParseError`] message.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Vicinity(pub(crate) String);

impl fmt::Display for Vicinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, "; failed before reaching here: `{}`", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("expected {expected}, found '{found}'")]
    UnexpectedCharacter { found: char, expected: &'static str },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("invalid number literal `{0}`")]
    InvalidNumber(String),
    #[error("invalid literal `{literal}` for {expected}")]
    InvalidLiteral {
        literal: String,
        expected: &'static str,
    },
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    #[error("invalid unicode escape sequence at character: '{0}'")]
    InvalidUnicodeEscape(char),
    #[error("empty key not allowed")]
    EmptyKey,
    #[error("root value must be an object or an array, found '{0}'")]
    RootNotCompound(char),
    #[error("multiple top-level values")]
    MultipleRoots,
    #[error("unexpected data after the root value")]
    TrailingData,
    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),
}

/// A failure to construct a typed value from a [`Value`](crate::Value) tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("cannot construct a default instance of `{ty}`: no record metadata")]
    NotConstructible { ty: String },
    #[error("cannot bind {found} to `{ty}`: expected {expected}")]
    UnexpectedKind {
        ty: String,
        expected: ValueKind,
        found: ValueKind,
    },
    #[error("cannot bind a compound {found} value to primitive `{ty}`")]
    CompoundToPrimitive { ty: String, found: ValueKind },
    #[error("bound value is not a `{expected}`")]
    TypeMismatch { expected: &'static str },
    #[error("too few/many type arguments for `{ty}` (expected: {expected}, supplied: {supplied})")]
    TypeArgumentCount {
        ty: String,
        expected: usize,
        supplied: usize,
    },
    #[error("type parameter `{parameter}` of `{owner}` has no argument")]
    UnresolvedTypeParameter { owner: String, parameter: String },
    #[error("field `{field}` of `{owner}` nests a generic argument, which is not supported")]
    NestedGenericArgument { owner: String, field: String },
    #[error("{0:#06x} is not a valid char")]
    InvalidChar(u32),
    #[error("{0}")]
    Custom(String),
}

impl BindError {
    /// Creates an error carrying a free-form message, for use by custom
    /// binders.
    pub fn custom(message: impl fmt::Display) -> Self {
        Self::Custom(message.to_string())
    }
}
