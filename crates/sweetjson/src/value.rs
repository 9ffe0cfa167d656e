//! JSON value types.
//!
//! This module defines the [`Value`] enum produced by the parser and consumed
//! by the binders, along with [`ValueKind`], the tag used to classify values
//! (and, while parsing, the character that starts one).
use alloc::collections::BTreeMap;
use core::fmt;

use crate::{
    bind::{BindContext, Bindable, Registry, TypeDescriptor, TypeHandle},
    error::BindError,
};

pub type Map = BTreeMap<String, Value>;
pub type Array = Vec<Value>;

/// A parsed JSON value.
///
/// A value's variant is fixed once constructed; containers own their
/// children and the caller owns the root.
///
/// # Examples
///
/// ```
/// use sweetjson::{Value, ValueKind};
///
/// let v = sweetjson::parse(r#"{"key": [1, true]}"#).unwrap();
/// assert_eq!(v.kind(), ValueKind::Object);
/// assert_eq!(v.get("key").and_then(Value::as_array).map(Vec::len), Some(2));
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Array),
    Object(Map),
}

/// The tag of a [`Value`].
///
/// `Unknown` is only produced while parsing, when classifying a character
/// that cannot start any value. It never describes a value in a finished
/// tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Number,
    Bool,
    Null,
    Object,
    Array,
    Unknown,
}

impl ValueKind {
    /// Classifies the character that would start a value.
    #[must_use]
    pub fn of_start(c: char) -> Self {
        match c {
            '{' => Self::Object,
            '[' => Self::Array,
            '"' => Self::String,
            't' | 'f' => Self::Bool,
            'n' => Self::Null,
            c if is_numeric(c) => Self::Number,
            _ => Self::Unknown,
        }
    }

    /// `true` for the kinds with no children.
    #[must_use]
    pub fn is_primitive(self) -> bool {
        !matches!(self, Self::Object | Self::Array | Self::Unknown)
    }
}

/// Characters the number scanner consumes.
pub(crate) fn is_numeric(c: char) -> bool {
    matches!(c, '+' | '-' | '0'..='9' | '.' | 'e' | 'E')
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "boolean",
            Self::Null => "null",
            Self::Object => "object",
            Self::Array => "array",
            Self::Unknown => "unknown",
        })
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Object(v)
    }
}

impl Value {
    /// Returns the tag of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Boolean(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Array(_) => ValueKind::Array,
            Self::Object(_) => ValueKind::Object,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Boolean(..))
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(..))
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(..))
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(..))
    }

    /// Returns `true` for strings, numbers, booleans and null.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.kind().is_primitive()
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Narrows a number to `i8`, wrapping through `i32` after truncating
    /// toward zero. This is the cast the binder applies to `i8` targets.
    #[must_use]
    pub fn as_i8(&self) -> Option<i8> {
        self.as_f64().map(narrow::to_i8)
    }

    #[must_use]
    pub fn as_i16(&self) -> Option<i16> {
        self.as_f64().map(narrow::to_i16)
    }

    /// Truncates a number toward zero, saturating at the bounds of `i32`.
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        self.as_f64().map(narrow::to_i32)
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(narrow::to_i64)
    }

    /// Truncates a number toward zero, saturating at `0` and `u64::MAX`.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_f64().map(narrow::to_u64)
    }

    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(narrow::to_f32)
    }

    /// Reads a number as a UTF-16 code unit. Returns `None` for
    /// non-numbers and for surrogate code units.
    #[must_use]
    pub fn as_char(&self) -> Option<char> {
        self.as_f64().and_then(|n| narrow::to_char(n).ok())
    }

    /// Looks up `key` when this value is an object.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Binds this value to `T` with an empty [`BindContext`].
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] when the tree does not fit the shape of `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sweetjson::Registry;
    ///
    /// let value = sweetjson::parse("[1, 2, null, 4]").unwrap();
    /// let numbers: Box<[i32]> = value.bind(&Registry::new()).unwrap();
    /// assert_eq!(&*numbers, &[1, 2, 4]);
    /// ```
    pub fn bind<T: Bindable>(&self, registry: &Registry) -> Result<T, BindError> {
        self.bind_with(registry, &mut BindContext::new())
    }

    /// Binds this value to `T`, threading `context` through every nested
    /// binder.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] when the tree does not fit the shape of `T`.
    pub fn bind_with<T: Bindable>(
        &self,
        registry: &Registry,
        context: &mut BindContext,
    ) -> Result<T, BindError> {
        let descriptor = TypeDescriptor::new(T::type_handle());
        T::from_bound(registry.bind(self, &descriptor, context)?)
    }

    /// Binds this value to a generic record `T`, supplying its type
    /// arguments in declaration order.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] when the argument count does not match the
    /// record's declared parameters, or when the tree does not fit.
    pub fn bind_generic<T: Bindable>(
        &self,
        registry: &Registry,
        type_arguments: &[TypeHandle],
    ) -> Result<T, BindError> {
        let descriptor = TypeDescriptor::describe(T::type_handle(), type_arguments.to_vec())?;
        T::from_bound(registry.bind(self, &descriptor, &mut BindContext::new())?)
    }
}

/// Numeric narrowing shared by the [`Value`] accessors and the primitive
/// binder. Signed widths below 32 bits and `char` wrap through `i32`;
/// every other integer width truncates toward zero and saturates.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) mod narrow {
    pub(crate) fn to_i8(n: f64) -> i8 {
        n as i32 as i8
    }

    pub(crate) fn to_i16(n: f64) -> i16 {
        n as i32 as i16
    }

    pub(crate) fn to_i32(n: f64) -> i32 {
        n as i32
    }

    pub(crate) fn to_i64(n: f64) -> i64 {
        n as i64
    }

    pub(crate) fn to_u8(n: f64) -> u8 {
        n as u8
    }

    pub(crate) fn to_u16(n: f64) -> u16 {
        n as u16
    }

    pub(crate) fn to_u32(n: f64) -> u32 {
        n as u32
    }

    pub(crate) fn to_u64(n: f64) -> u64 {
        n as u64
    }

    pub(crate) fn to_f32(n: f64) -> f32 {
        n as f32
    }

    /// Returns the rejected code unit on surrogates.
    pub(crate) fn to_char(n: f64) -> Result<char, u32> {
        let unit = u32::from(n as i32 as u16);
        char::from_u32(unit).ok_or(unit)
    }
}
