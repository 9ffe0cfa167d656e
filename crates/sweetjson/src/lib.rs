//! A strict JSON parser and a registry-driven binder from JSON trees onto
//! Rust types.
//!
//! [`parse`] turns a document whose root is an object or an array into a
//! [`Value`] tree, failing with a positioned [`ParseError`] on any syntax
//! problem. [`Value::bind`] then walks the tree and builds a typed value,
//! dispatching every node to a [`Binder`] picked by the [`Registry`]:
//! a custom binder registered for the target type, or one of the built-in
//! primitive, array and object binders.
//!
//! ```
//! use sweetjson::{Bindable, Fields, Record, Registry, TypeHandle, TypeRef};
//!
//! #[derive(Default)]
//! struct Order {
//!     id: i64,
//!     items: Vec<String>,
//! }
//!
//! impl Record for Order {
//!     const NAME: &'static str = "Order";
//!
//!     fn fields(fields: &mut Fields<Self>) {
//!         fields
//!             .field("id", TypeRef::of::<i64>(), |o: &mut Order, v: i64| o.id = v)
//!             .field("items", TypeRef::of::<Vec<String>>(), |o: &mut Order, v: Vec<String>| o.items = v);
//!     }
//! }
//!
//! impl Bindable for Order {
//!     fn type_handle() -> TypeHandle {
//!         TypeHandle::record::<Self>()
//!     }
//! }
//!
//! let value = sweetjson::parse(r#"{"id": 7, "items": ["tea", null, "jam"], "note": "ignored"}"#).unwrap();
//! let order: Order = value.bind(&Registry::new()).unwrap();
//! assert_eq!(order.id, 7);
//! assert_eq!(order.items, ["tea", "jam"]);
//! ```

#![allow(missing_docs)]
extern crate alloc;

mod bind;
mod error;
mod options;
mod parser;
mod value;


pub use bind::{
    ArrayBinder, BindContext, Bindable, Binder, Bound, FieldSlot, FieldTable, Fields, ObjectBinder, Primitive,
    PrimitiveBinder, Record, RecordType, Registry, ResolvedBinder, TypeDescriptor, TypeHandle, TypeRef, downcast,
};
pub use error::{BindError, ParseError, SyntaxError};
pub use options::ParserOptions;
pub use parser::{Parser, parse, parse_reader, parse_slice};
pub use value::{Array, Map, Value, ValueKind};
