use alloc::sync::Arc;
use core::fmt;
use std::collections::HashMap;

use parking_lot::RwLock;

use super::{ArrayBinder, BindContext, Binder, Bound, ObjectBinder, PrimitiveBinder, TypeDescriptor};
use crate::{error::BindError, value::Value};

/// Maps type descriptors to binders.
///
/// Custom registrations take priority. A descriptor without one falls back to
/// the built-in binder for its shape: primitive, then array, then object.
/// The registry may be shared between threads: registration and resolution
/// both take `&self`.
#[derive(Default)]
pub struct Registry {
    custom: RwLock<HashMap<TypeDescriptor, Arc<dyn Binder>>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `binder` for `descriptor`, replacing any earlier registration
    /// for the same canonical name.
    pub fn register(&self, descriptor: TypeDescriptor, binder: impl Binder + 'static) {
        log::debug!("registering custom binder for `{}`", descriptor.id());
        let previous = self.custom.write().insert(descriptor, Arc::new(binder));
        if previous.is_some() {
            log::debug!("replaced an earlier custom binder");
        }
    }

    /// Removes the custom binder for `descriptor`. Returns whether one was
    /// installed.
    pub fn unregister(&self, descriptor: &TypeDescriptor) -> bool {
        self.custom.write().remove(descriptor).is_some()
    }

    #[must_use]
    pub fn is_registered(&self, descriptor: &TypeDescriptor) -> bool {
        self.custom.read().contains_key(descriptor)
    }

    /// Picks the binder for `descriptor`.
    #[must_use]
    pub fn resolve(&self, descriptor: &TypeDescriptor) -> ResolvedBinder {
        let custom = self.custom.read().get(descriptor).cloned();

        let resolved = match custom {
            Some(binder) => ResolvedBinder::Custom(binder),
            None if descriptor.is_primitive() => ResolvedBinder::Primitive,
            None if descriptor.is_array() => ResolvedBinder::Array,
            None => ResolvedBinder::Object,
        };
        log::trace!("resolved `{}` to {resolved:?}", descriptor.id());
        resolved
    }

    /// Resolves a binder for `descriptor` and runs it on `value`.
    ///
    /// # Errors
    ///
    /// Whatever the resolved binder reports.
    pub fn bind(
        &self,
        value: &Value,
        descriptor: &TypeDescriptor,
        context: &mut BindContext,
    ) -> Result<Bound, BindError> {
        self.resolve(descriptor).construct(value, descriptor, self, context)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let custom = self.custom.read();
        f.debug_struct("Registry")
            .field("custom", &custom.keys().map(TypeDescriptor::id).collect::<Vec<_>>())
            .finish()
    }
}

/// The outcome of [`Registry::resolve`].
#[derive(Clone)]
pub enum ResolvedBinder {
    Custom(Arc<dyn Binder>),
    Primitive,
    Array,
    Object,
}

impl Binder for ResolvedBinder {
    fn construct(
        &self,
        value: &Value,
        descriptor: &TypeDescriptor,
        registry: &Registry,
        context: &mut BindContext,
    ) -> Result<Bound, BindError> {
        match self {
            Self::Custom(binder) => binder.construct(value, descriptor, registry, context),
            Self::Primitive => PrimitiveBinder.construct(value, descriptor, registry, context),
            Self::Array => ArrayBinder.construct(value, descriptor, registry, context),
            Self::Object => ObjectBinder.construct(value, descriptor, registry, context),
        }
    }
}

impl fmt::Debug for ResolvedBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Custom(_) => "Custom",
            Self::Primitive => "Primitive",
            Self::Array => "Array",
            Self::Object => "Object",
        })
    }
}
