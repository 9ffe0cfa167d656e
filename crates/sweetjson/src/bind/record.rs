use core::{
    any::{Any, type_name},
    fmt,
    marker::PhantomData,
};
use std::collections::HashMap;

use super::{Bindable, Bound, descriptor::TypeRef};
use crate::error::BindError;

/// A struct the object binder can build field by field.
///
/// The object binder starts from `Self::default()` and assigns only the
/// fields listed in [`Record::fields`]; anything not listed is never touched
/// by binding.
///
/// # Examples
///
/// ```
/// use sweetjson::{Bindable, Fields, Record, Registry, TypeHandle, TypeRef};
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Record for Point {
///     const NAME: &'static str = "Point";
///
///     fn fields(fields: &mut Fields<Self>) {
///         fields
///             .field("x", TypeRef::of::<i32>(), |p: &mut Point, v: i32| p.x = v)
///             .field("y", TypeRef::of::<i32>(), |p: &mut Point, v: i32| p.y = v);
///     }
/// }
///
/// impl Bindable for Point {
///     fn type_handle() -> TypeHandle {
///         TypeHandle::record::<Self>()
///     }
/// }
///
/// let value = sweetjson::parse(r#"{"x": 1, "y": 2}"#).unwrap();
/// let point: Point = value.bind(&Registry::new()).unwrap();
/// assert_eq!((point.x, point.y), (1, 2));
/// ```
pub trait Record: Default + 'static {
    /// Base type name. Compared case-insensitively when resolving binders.
    const NAME: &'static str;

    /// Declared type parameter names, in order, for generic records.
    const TYPE_PARAMETERS: &'static [&'static str] = &[];

    /// Lists the bindable fields.
    fn fields(fields: &mut Fields<Self>);
}

type Setter = Box<dyn Fn(&mut dyn Any, Bound) -> Result<(), BindError>>;

/// Collects the field list of a record `T`.
pub struct Fields<T> {
    slots: Vec<FieldSlot>,
    owner: PhantomData<fn(&mut T)>,
}

impl<T: 'static> Fields<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            owner: PhantomData,
        }
    }

    /// Declares a field named `name` with nominal type `ty`. `set` stores the
    /// bound value into the instance.
    pub fn field<F, S>(&mut self, name: &'static str, ty: TypeRef, set: S) -> &mut Self
    where
        F: Bindable,
        S: Fn(&mut T, F) + 'static,
    {
        let setter: Setter = Box::new(move |owner: &mut dyn Any, bound: Bound| {
            let owner = owner
                .downcast_mut::<T>()
                .ok_or(BindError::TypeMismatch {
                    expected: type_name::<T>(),
                })?;
            set(owner, F::from_bound(bound)?);
            Ok(())
        });
        self.slots.push(FieldSlot { name, ty, setter });
        self
    }

    pub(crate) fn into_table(self) -> FieldTable {
        FieldTable {
            slots: self.slots.into_iter().map(|slot| (slot.name, slot)).collect(),
        }
    }
}

/// A declared field: its name, nominal type and setter.
pub struct FieldSlot {
    name: &'static str,
    ty: TypeRef,
    setter: Setter,
}

impl FieldSlot {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Stores `bound` into `owner`.
    ///
    /// # Errors
    ///
    /// [`BindError::TypeMismatch`] when `owner` is not the record this field
    /// belongs to or `bound` does not hold the field's type.
    pub fn assign(&self, owner: &mut dyn Any, bound: Bound) -> Result<(), BindError> {
        (self.setter)(owner, bound)
    }
}

impl fmt::Debug for FieldSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSlot")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

/// The fields of a record keyed by exact, case-sensitive name.
#[derive(Debug)]
pub struct FieldTable {
    slots: HashMap<&'static str, FieldSlot>,
}

impl FieldTable {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldSlot> {
        self.slots.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
