use super::{BindContext, Binder, Bound, Registry, TypeDescriptor};
use crate::{error::BindError, value::Value};

/// Built-in binder for strings, booleans and the fixed-width numbers.
///
/// `null` binds to `()`. Numbers are cast to the width of the target
/// [`Primitive`](super::Primitive).
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveBinder;

impl Binder for PrimitiveBinder {
    fn construct(
        &self,
        value: &Value,
        descriptor: &TypeDescriptor,
        _registry: &Registry,
        _context: &mut BindContext,
    ) -> Result<Bound, BindError> {
        let Some(primitive) = descriptor.handle().primitive() else {
            return Err(BindError::custom(format_args!(
                "`{}` is not a primitive type",
                descriptor.handle().name()
            )));
        };

        match value {
            Value::Object(_) | Value::Array(_) => Err(BindError::CompoundToPrimitive {
                ty: primitive.name().to_owned(),
                found: value.kind(),
            }),
            Value::Null => Ok(Box::new(())),
            Value::String(s) if primitive.source_kind() == value.kind() => Ok(Box::new(s.clone())),
            Value::Boolean(b) if primitive.source_kind() == value.kind() => Ok(Box::new(*b)),
            Value::Number(n) if primitive.source_kind() == value.kind() => primitive.coerce(*n),
            _ => Err(BindError::UnexpectedKind {
                ty: primitive.name().to_owned(),
                expected: primitive.source_kind(),
                found: value.kind(),
            }),
        }
    }
}
