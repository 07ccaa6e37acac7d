//! Immutable schema graph built from parsed IDL.

mod format;
mod types;

pub use format::format_schema;
pub use types::{
    ConstDef, EnumDef, FieldDef, MethodDef, Module, Requiredness, Schema, ServiceDef, StructDef,
    StructKind, TypeRef, TypedefDef,
};
