//! Schema graph and dynamic value types for the `thriftrun` Thrift runtime.
//!
//! The [`Schema`] is built once from parsed IDL (see the `thriftrun-idl`
//! crate) and thereafter read-only; protocols and processors consult it on
//! every message. [`Value`] / [`StructValue`] are the wire-independent
//! intermediate representation all codecs produce and consume.

mod binding;
mod limits;
mod schema;
mod value;

pub use binding::{BindingError, RecordBinding};
pub use limits::Limits;
pub use schema::{
    ConstDef, EnumDef, FieldDef, MethodDef, Module, Requiredness, Schema, ServiceDef, StructDef,
    StructKind, TypeRef, TypedefDef, format_schema,
};
pub use value::{StructValue, Value};
