use super::{BindContext, Binder, Bound, Registry, TypeDescriptor};
use crate::{
    error::BindError,
    value::{Value, ValueKind},
};

/// Built-in binder for array targets.
///
/// Produces a `Box<[Bound]>` holding one bound element per non-null source
/// element, in source order. `null` elements are dropped rather than
/// padded, so `[1, null, 2]` yields two elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayBinder;

impl Binder for ArrayBinder {
    fn construct(
        &self,
        value: &Value,
        descriptor: &TypeDescriptor,
        registry: &Registry,
        context: &mut BindContext,
    ) -> Result<Bound, BindError> {
        let Some(component) = descriptor.handle().component() else {
            return Err(BindError::custom(format_args!(
                "`{}` is not an array type",
                descriptor.handle().name()
            )));
        };
        let Value::Array(items) = value else {
            return Err(BindError::UnexpectedKind {
                ty: descriptor.handle().name(),
                expected: ValueKind::Array,
                found: value.kind(),
            });
        };

        let component = TypeDescriptor::new(component.clone());
        let binder = registry.resolve(&component);
        let present = items.iter().filter(|item| !item.is_null());

        let mut model = Vec::with_capacity(present.clone().count());
        for item in present {
            model.push(binder.construct(item, &component, registry, context)?);
        }
        Ok(Box::new(model.into_boxed_slice()))
    }
}
