//! Thrift IDL frontend for `thriftrun`: `.thrift` text → [`Schema`].
//!
//! # Pipeline
//!
//! ```text
//! .thrift source tree
//!   └─ lex::tokenize        – text → positioned token stream
//!       └─ parser::parse_document – tokens → ast::Document
//!           └─ Loader       – include resolution, cycle detection
//!               └─ resolver – name/const resolution → Schema
//! ```
//!
//! The schema a load produces is closed: every type reference resolves
//! inside the loaded module set, so downstream codecs never see a dangling
//! name.

pub mod ast;
mod error;
mod lex;
mod loader;
mod parser;
mod resolver;

use std::path::Path;

pub use error::{IdlError, LexError, ParseError, ResolveError, ResolveErrors};
pub use lex::{SpannedToken, Token, tokenize};
pub use loader::Loader;
pub use parser::parse_document;
use thriftrun_core::Schema;

/// Load a schema from a root `.thrift` file with default options.
pub fn load(path: impl AsRef<Path>) -> Result<Schema, IdlError> {
    Loader::new().load(path)
}

/// Load a schema from in-memory IDL text with default options.
pub fn load_str(name: &str, text: &str) -> Result<Schema, IdlError> {
    Loader::new().load_str(name, text)
}
