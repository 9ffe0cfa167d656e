use super::{BindContext, Binder, Bound, Registry, TypeDescriptor};
use crate::{
    error::BindError,
    value::{Value, ValueKind},
};

/// Built-in binder for record targets.
///
/// Starts from the record's default instance and, for every source key with
/// a same-named field, binds the sub-value through the registry and assigns
/// it. Unknown keys are skipped, and a `null` leaves the field's default in
/// place.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectBinder;

impl Binder for ObjectBinder {
    fn construct(
        &self,
        value: &Value,
        descriptor: &TypeDescriptor,
        registry: &Registry,
        context: &mut BindContext,
    ) -> Result<Bound, BindError> {
        let Some(record) = descriptor.handle().as_record() else {
            return Err(BindError::NotConstructible {
                ty: descriptor.handle().name(),
            });
        };
        let Value::Object(map) = value else {
            return Err(BindError::UnexpectedKind {
                ty: record.name().to_owned(),
                expected: ValueKind::Object,
                found: value.kind(),
            });
        };

        let mut model = record.instantiate();
        let fields = record.fields();

        for (key, sub_value) in map {
            let Some(field) = fields.get(key) else {
                log::trace!("skipping unknown key `{key}` for `{}`", record.name());
                continue;
            };
            if sub_value.is_null() {
                log::trace!("keeping default of `{}.{key}` over null", record.name());
                continue;
            }

            let field_type = descriptor.field_descriptor(field)?;
            let binder = registry.resolve(&field_type);
            let bound = binder.construct(sub_value, &field_type, registry, context)?;
            field.assign(model.as_mut(), bound)?;
        }

        Ok(model)
    }
}
