//! Binding of [`Value`] trees onto typed targets.
//!
//! Binding is a recursive dispatch: the [`Registry`] picks a [`Binder`] for
//! the target's [`TypeDescriptor`], and that binder resolves binders for the
//! target's fields or elements in turn. Intermediate results travel as
//! [`Bound`] boxes and are turned back into concrete types by
//! [`Bindable::from_bound`] at field setters and at the root.
//!
//! Binding is lenient where parsing is strict: object keys with no matching
//! field are ignored, fields with no matching key keep their default, and a
//! `null` never overwrites a default.

mod array;
mod context;
mod descriptor;
mod object;
mod primitive;
mod record;
mod registry;

use core::any::{Any, type_name};

pub use array::ArrayBinder;
pub use context::BindContext;
pub use descriptor::{Primitive, RecordType, TypeDescriptor, TypeHandle, TypeRef};
pub use object::ObjectBinder;
pub use primitive::PrimitiveBinder;
pub use record::{FieldSlot, FieldTable, Fields, Record};
pub use registry::{Registry, ResolvedBinder};

use crate::{error::BindError, value::Value};

/// A value produced by a [`Binder`] with its concrete type erased.
///
/// The built-in binders produce the primitive itself for scalars, `()` for
/// `null`, a `Box<[Bound]>` for arrays and the record type for objects.
pub type Bound = Box<dyn Any>;

/// A strategy that constructs a value from a [`Value`] node.
///
/// Custom binders are installed with [`Registry::register`]. Any closure with
/// the `construct` signature is a binder.
///
/// # Examples
///
/// ```
/// use sweetjson::{BindContext, BindError, Bound, Registry, TypeDescriptor, TypeHandle, Value};
///
/// let registry = Registry::new();
/// registry.register(
///     TypeDescriptor::new(TypeHandle::opaque("Upper")),
///     |value: &Value, _: &TypeDescriptor, _: &Registry, _: &mut BindContext| -> Result<Bound, BindError> {
///         let text = value.as_str().ok_or_else(|| BindError::custom("expected a string"))?;
///         Ok(Box::new(text.to_uppercase()))
///     },
/// );
/// ```
pub trait Binder: Send + Sync {
    /// Builds a value of the type `descriptor` describes from `value`.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] when `value` does not fit the target.
    fn construct(
        &self,
        value: &Value,
        descriptor: &TypeDescriptor,
        registry: &Registry,
        context: &mut BindContext,
    ) -> Result<Bound, BindError>;
}

impl<F> Binder for F
where
    F: Fn(&Value, &TypeDescriptor, &Registry, &mut BindContext) -> Result<Bound, BindError> + Send + Sync,
{
    fn construct(
        &self,
        value: &Value,
        descriptor: &TypeDescriptor,
        registry: &Registry,
        context: &mut BindContext,
    ) -> Result<Bound, BindError> {
        self(value, descriptor, registry, context)
    }
}

/// A Rust type that can be the target of a bind.
pub trait Bindable: Sized + 'static {
    /// The handle the registry dispatches on.
    fn type_handle() -> TypeHandle;

    /// Recovers `Self` from what a binder produced.
    ///
    /// # Errors
    ///
    /// [`BindError::TypeMismatch`] when `bound` holds another type.
    fn from_bound(bound: Bound) -> Result<Self, BindError> {
        downcast(bound)
    }
}

/// Unboxes `bound` as a `T`.
///
/// # Errors
///
/// [`BindError::TypeMismatch`] when `bound` holds another type.
pub fn downcast<T: 'static>(bound: Bound) -> Result<T, BindError> {
    bound
        .downcast::<T>()
        .map(|b| *b)
        .map_err(|_| BindError::TypeMismatch {
            expected: type_name::<T>(),
        })
}

macro_rules! primitive_bindable {
    ($($ty:ty => $primitive:ident),* $(,)?) => {
        $(
            impl Bindable for $ty {
                fn type_handle() -> TypeHandle {
                    TypeHandle::Primitive(Primitive::$primitive)
                }
            }
        )*
    };
}

primitive_bindable! {
    String => String,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    char => Char,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

/// Elements of an array produced by a binder, as `Box<[Bound]>` (the array
/// binder) or `Vec<Bound>`.
fn elements(bound: Bound) -> Result<Vec<Bound>, BindError> {
    let bound = match bound.downcast::<Box<[Bound]>>() {
        Ok(items) => return Ok((*items).into_vec()),
        Err(bound) => bound,
    };
    bound
        .downcast::<Vec<Bound>>()
        .map(|items| *items)
        .map_err(|_| BindError::TypeMismatch { expected: "array" })
}

impl<T: Bindable> Bindable for Vec<T> {
    fn type_handle() -> TypeHandle {
        T::type_handle().array_of()
    }

    fn from_bound(bound: Bound) -> Result<Self, BindError> {
        elements(bound)?.into_iter().map(T::from_bound).collect()
    }
}

impl<T: Bindable> Bindable for Box<[T]> {
    fn type_handle() -> TypeHandle {
        T::type_handle().array_of()
    }

    fn from_bound(bound: Bound) -> Result<Self, BindError> {
        elements(bound)?.into_iter().map(T::from_bound).collect()
    }
}

/// `null` binds to `None`; anything else binds as `T`.
impl<T: Bindable> Bindable for Option<T> {
    fn type_handle() -> TypeHandle {
        T::type_handle()
    }

    fn from_bound(bound: Bound) -> Result<Self, BindError> {
        if bound.is::<()>() {
            return Ok(None);
        }
        T::from_bound(bound).map(Some)
    }
}
