//! Error taxonomy for schema building.
//!
//! Lex, parse, and resolve failures are all schema-build failures: they
//! surface to the loader caller and never arise at request time.

pub use crate::{lex::LexError, parser::ParseError};

/// A single semantic failure found while resolving parsed IDL.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error("include cycle: {}", chain.join(" -> "))]
    IncludeCycle { chain: Vec<String> },

    #[error("include \"{path}\" not found (included from {from})")]
    IncludeNotFound { path: String, from: String },

    #[error("duplicate definition of '{name}'")]
    DuplicateName { name: String },

    #[error("unknown type '{name}' referenced from {context}")]
    UnknownType { name: String, context: String },

    #[error("typedef cycle through '{name}'")]
    TypedefCycle { name: String },

    #[error("duplicate field id {id} in {strukt}")]
    DuplicateFieldId { strukt: String, id: i16 },

    #[error("illegal field id {id} in {strukt}: ids must be positive")]
    IllegalFieldId { strukt: String, id: i64 },

    #[error("union field {strukt}.{field} cannot be required")]
    UnionRequiredField { strukt: String, field: String },

    #[error("duplicate value {value} in enum {enum_name}")]
    DuplicateEnumValue { enum_name: String, value: i32 },

    #[error("enum {enum_name} member {member} value {value} does not fit in i32")]
    EnumValueRange {
        enum_name: String,
        member: String,
        value: i64,
    },

    #[error("in {context}: expected a {expected} value, found {found}")]
    ConstTypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    #[error("unknown constant or enum member '{name}' referenced from {context}")]
    UnknownValue { name: String, context: String },

    #[error("field {strukt}.{field} declared throws a non-exception type")]
    ThrowsNotException { strukt: String, field: String },

    #[error("unknown parent service '{parent}' extended by {name}")]
    UnknownParentService { name: String, parent: String },

    #[error("service inheritance cycle through '{name}'")]
    ServiceCycle { name: String },

    #[error("oneway method {name} must return void and declare no exceptions")]
    OnewayNotVoid { name: String },
}

/// All resolve failures found before analysis had to stop.
#[derive(Debug, Clone)]
pub struct ResolveErrors(pub Vec<ResolveError>);

impl std::error::Error for ResolveErrors {}

impl std::fmt::Display for ResolveErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "resolve failed"),
            [only] => write!(f, "{only}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more)", rest.len()),
        }
    }
}

impl From<ResolveError> for ResolveErrors {
    fn from(value: ResolveError) -> Self {
        Self(vec![value])
    }
}

/// Umbrella error returned by the loader.
#[derive(Debug, thiserror::Error)]
pub enum IdlError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{file}: {source}")]
    Lex {
        file: String,
        #[source]
        source: LexError,
    },

    #[error("{file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveErrors),
}

impl IdlError {
    /// The individual resolve failures, when this is a resolve error.
    pub fn resolve_errors(&self) -> &[ResolveError] {
        match self {
            IdlError::Resolve(errors) => &errors.0,
            _ => &[],
        }
    }
}
