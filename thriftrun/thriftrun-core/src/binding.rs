//! Host adapter seam between dynamic values and statically-typed records.

use std::sync::Arc;

use crate::{schema::StructDef, value::StructValue};

/// Error produced by a [`RecordBinding`] projection.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct BindingError(pub String);

impl From<String> for BindingError {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for BindingError {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Maps one struct type onto a host record representation.
///
/// The protocol layer interacts only with [`StructValue`] plus the
/// [`StructDef`]; hosts that want typed accessors implement this trait and
/// convert at the edge.
pub trait RecordBinding {
    type Record;

    /// The struct type this binding covers.
    fn struct_def(&self) -> &Arc<StructDef>;

    fn to_value(&self, record: &Self::Record) -> StructValue;

    fn from_value(&self, value: StructValue) -> Result<Self::Record, BindingError>;
}
