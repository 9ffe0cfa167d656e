//! Type handles and descriptors.
//!
//! A [`TypeHandle`] names a bind target: a primitive, an array of some
//! component, a record with field metadata, or an opaque named base that
//! only a custom binder knows how to build. A [`TypeDescriptor`] pairs a
//! handle with the type arguments supplied for it and, for generic records,
//! the parameter-name → argument mapping used to resolve field types.
//!
//! Descriptors compare and hash by their canonical (lowercased) base name
//! only. `List<i8>` and `List<String>` are the same registry key, so a
//! custom binder registered for one also serves the other; binders that care
//! about the arguments must read them from the descriptor they are handed.
use alloc::sync::Arc;
use core::{
    fmt,
    hash::{Hash, Hasher},
};
use std::collections::HashMap;

use super::{
    Bindable, Bound,
    record::{FieldSlot, FieldTable, Fields, Record},
};
use crate::{
    error::BindError,
    value::{ValueKind, narrow},
};

/// Array variants of each type parameter that get a synthetic mapping
/// (`T[]`, `T[][]`, `T[][][]`).
const ARRAY_PARAMETER_DIMENSIONS: usize = 3;

/// Scalar targets handled by the built-in primitive binder.
///
/// Numbers are coerced by the width named here, never by the target's type
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Bool,
    I8,
    I16,
    Char,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl Primitive {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::Char => "char",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// The value kind this primitive is bound from.
    #[must_use]
    pub fn source_kind(self) -> ValueKind {
        match self {
            Self::String => ValueKind::String,
            Self::Bool => ValueKind::Bool,
            _ => ValueKind::Number,
        }
    }

    /// Converts a parsed number to this width with cast semantics. Integers
    /// truncate toward zero. Signed widths narrower than 32 bits and `Char`
    /// wrap after a cast through `i32`, while unsigned widths saturate at
    /// `0` and their maximum. `F32` narrows and `F64` is kept as is.
    pub(crate) fn coerce(self, n: f64) -> Result<Bound, BindError> {
        Ok(match self {
            Self::I8 => Box::new(narrow::to_i8(n)),
            Self::I16 => Box::new(narrow::to_i16(n)),
            Self::Char => Box::new(narrow::to_char(n).map_err(BindError::InvalidChar)?),
            Self::I32 => Box::new(narrow::to_i32(n)),
            Self::I64 => Box::new(narrow::to_i64(n)),
            Self::U8 => Box::new(narrow::to_u8(n)),
            Self::U16 => Box::new(narrow::to_u16(n)),
            Self::U32 => Box::new(narrow::to_u32(n)),
            Self::U64 => Box::new(narrow::to_u64(n)),
            Self::F32 => Box::new(narrow::to_f32(n)),
            Self::F64 => Box::new(n),
            Self::String | Self::Bool => {
                return Err(BindError::UnexpectedKind {
                    ty: self.name().to_owned(),
                    expected: self.source_kind(),
                    found: ValueKind::Number,
                });
            }
        })
    }
}

/// Static metadata of a [`Record`] type with its generics erased.
pub struct RecordType {
    name: &'static str,
    type_parameters: &'static [&'static str],
    instantiate: fn() -> Bound,
    fields: fn() -> FieldTable,
}

impl RecordType {
    fn of<T: Record>() -> Self {
        fn instantiate<T: Record>() -> Bound {
            Box::new(T::default())
        }

        fn field_table<T: Record>() -> FieldTable {
            let mut fields = Fields::<T>::new();
            T::fields(&mut fields);
            fields.into_table()
        }

        Self {
            name: T::NAME,
            type_parameters: T::TYPE_PARAMETERS,
            instantiate: instantiate::<T>,
            fields: field_table::<T>,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn type_parameters(&self) -> &'static [&'static str] {
        self.type_parameters
    }

    /// Builds a default instance of the record.
    #[must_use]
    pub fn instantiate(&self) -> Bound {
        (self.instantiate)()
    }

    /// Collects the record's bindable fields, keyed by name.
    #[must_use]
    pub fn fields(&self) -> FieldTable {
        (self.fields)()
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("type_parameters", &self.type_parameters)
            .finish_non_exhaustive()
    }
}

/// Identifies a bind target.
#[derive(Debug, Clone)]
pub enum TypeHandle {
    Primitive(Primitive),
    Array(Arc<TypeHandle>),
    Record(Arc<RecordType>),
    /// A named base with no record metadata, such as a generic container
    /// built by a custom binder. The object binder cannot construct it.
    Opaque(Arc<str>),
}

impl TypeHandle {
    #[must_use]
    pub fn of<T: Bindable>() -> Self {
        T::type_handle()
    }

    #[must_use]
    pub fn record<T: Record>() -> Self {
        Self::Record(Arc::new(RecordType::of::<T>()))
    }

    #[must_use]
    pub fn opaque(name: &str) -> Self {
        Self::Opaque(Arc::from(name))
    }

    /// The handle of an array whose components are `self`.
    #[must_use]
    pub fn array_of(self) -> Self {
        Self::Array(Arc::new(self))
    }

    /// Display name; arrays append `[]` to their component's name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Primitive(p) => p.name().to_owned(),
            Self::Array(component) => format!("{}[]", component.name()),
            Self::Record(record) => record.name().to_owned(),
            Self::Opaque(name) => name.to_string(),
        }
    }

    #[must_use]
    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            Self::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    #[must_use]
    pub fn component(&self) -> Option<&TypeHandle> {
        match self {
            Self::Array(component) => Some(component),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Declared type parameter names; empty unless this is a generic record.
    #[must_use]
    pub fn type_parameters(&self) -> &'static [&'static str] {
        match self {
            Self::Record(record) => record.type_parameters(),
            _ => &[],
        }
    }
}

/// The declared (nominal) type of a record field.
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// A fixed type such as `i32` or another record.
    Concrete(TypeHandle),
    /// One of the owner's type parameters, possibly as an array: `T`, `T[]`,
    /// `T[][]` or `T[][][]`.
    Parameter(String),
    /// A generic base applied to arguments, such as `List<T>`. Arguments may
    /// be concrete or parameters but not generic themselves.
    Generic(TypeHandle, Vec<TypeRef>),
}

impl TypeRef {
    #[must_use]
    pub fn of<T: Bindable>() -> Self {
        Self::Concrete(T::type_handle())
    }

    #[must_use]
    pub fn param(name: &str) -> Self {
        Self::Parameter(name.to_owned())
    }

    /// `param_array("T", 2)` is the parameter form `T[][]`.
    #[must_use]
    pub fn param_array(name: &str, dimensions: usize) -> Self {
        Self::Parameter(format!("{name}{}", "[]".repeat(dimensions)))
    }

    #[must_use]
    pub fn generic(base: TypeHandle, arguments: impl IntoIterator<Item = TypeRef>) -> Self {
        Self::Generic(base, arguments.into_iter().collect())
    }
}

/// A resolved description of a bind target.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    id: String,
    handle: TypeHandle,
    type_arguments: Vec<TypeHandle>,
    parameters: HashMap<String, TypeHandle>,
}

impl TypeDescriptor {
    /// Describes `handle` with no type arguments.
    #[must_use]
    pub fn new(handle: TypeHandle) -> Self {
        Self {
            id: handle.name().to_lowercase(),
            handle,
            type_arguments: Vec::new(),
            parameters: HashMap::new(),
        }
    }

    #[must_use]
    pub fn of<T: Bindable>() -> Self {
        Self::new(T::type_handle())
    }

    /// Describes `handle` applied to `type_arguments`.
    ///
    /// When the handle declares type parameters and arguments are supplied,
    /// each parameter maps to its argument, and `T[]`, `T[][]` and `T[][][]`
    /// map to the matching array types.
    ///
    /// # Errors
    ///
    /// [`BindError::TypeArgumentCount`] when arguments are supplied for a
    /// generic record but their number differs from its parameter list.
    pub fn describe(handle: TypeHandle, type_arguments: Vec<TypeHandle>) -> Result<Self, BindError> {
        let declared = handle.type_parameters();
        let mut parameters = HashMap::new();

        if !declared.is_empty() && !type_arguments.is_empty() {
            if declared.len() != type_arguments.len() {
                return Err(BindError::TypeArgumentCount {
                    ty: handle.name(),
                    expected: declared.len(),
                    supplied: type_arguments.len(),
                });
            }

            for (name, argument) in declared.iter().zip(&type_arguments) {
                let mut key = (*name).to_owned();
                let mut ty = argument.clone();
                parameters.insert(key.clone(), ty.clone());
                for _ in 0..ARRAY_PARAMETER_DIMENSIONS {
                    key.push_str("[]");
                    ty = ty.array_of();
                    parameters.insert(key.clone(), ty.clone());
                }
            }
        }

        Ok(Self {
            id: handle.name().to_lowercase(),
            handle,
            type_arguments,
            parameters,
        })
    }

    /// Canonical name used for equality and hashing.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn handle(&self) -> &TypeHandle {
        &self.handle
    }

    #[must_use]
    pub fn type_arguments(&self) -> &[TypeHandle] {
        &self.type_arguments
    }

    #[must_use]
    pub fn type_argument(&self, index: usize) -> Option<&TypeHandle> {
        self.type_arguments.get(index)
    }

    /// The argument bound to a declared parameter name (`T`, `T[]`, ...).
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&TypeHandle> {
        self.parameters.get(name)
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self.handle, TypeHandle::Primitive(_))
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.handle, TypeHandle::Array(_))
    }

    /// Resolves the descriptor of `field`, a field of the type `self`
    /// describes, substituting this descriptor's type arguments for declared
    /// parameters.
    ///
    /// # Errors
    ///
    /// - [`BindError::UnresolvedTypeParameter`] when the field names a
    ///   parameter with no supplied argument.
    /// - [`BindError::NestedGenericArgument`] when a generic field's argument
    ///   is itself generic (`List<List<T>>`).
    pub fn field_descriptor(&self, field: &FieldSlot) -> Result<TypeDescriptor, BindError> {
        match field.ty() {
            TypeRef::Concrete(handle) => Ok(Self::new(handle.clone())),
            TypeRef::Parameter(name) => self.substitute(name).map(Self::new),
            TypeRef::Generic(base, arguments) => {
                let arguments = arguments
                    .iter()
                    .map(|argument| match argument {
                        TypeRef::Concrete(handle) => Ok(handle.clone()),
                        TypeRef::Parameter(name) => self.substitute(name),
                        TypeRef::Generic(..) => Err(BindError::NestedGenericArgument {
                            owner: self.handle.name(),
                            field: field.name().to_owned(),
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::describe(base.clone(), arguments)
            }
        }
    }

    fn substitute(&self, parameter: &str) -> Result<TypeHandle, BindError> {
        self.parameters
            .get(parameter)
            .cloned()
            .ok_or_else(|| BindError::UnresolvedTypeParameter {
                owner: self.handle.name(),
                parameter: parameter.to_owned(),
            })
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
