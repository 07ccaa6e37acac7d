//! Syntactic tree produced by the parser and consumed by the resolver.
//!
//! Types here mirror the IDL source faithfully: names are unresolved,
//! field ids may be absent, and constant values are uninterpreted literals.

/// A parsed `.thrift` source file.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub headers: Vec<Header>,
    pub definitions: Vec<Definition>,
}

impl Document {
    /// Include paths in declaration order.
    pub fn includes(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().filter_map(|h| match h {
            Header::Include { path } => Some(path.as_str()),
            _ => None,
        })
    }
}

/// A file header: `include`, `cpp_include`, or `namespace`.
#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    Include { path: String },
    /// Parsed and discarded downstream.
    CppInclude { path: String },
    Namespace { scope: String, name: String },
}

/// A top-level definition.
#[derive(Debug, Clone)]
pub enum Definition {
    Typedef(TypedefAst),
    Const(ConstDeclAst),
    Enum(EnumAst),
    Struct(StructAst),
    Service(ServiceAst),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Typedef(d) => &d.name,
            Definition::Const(d) => &d.name,
            Definition::Enum(d) => &d.name,
            Definition::Struct(d) => &d.name,
            Definition::Service(d) => &d.name,
        }
    }
}

/// An unresolved type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAst {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    List(Box<TypeAst>),
    Set(Box<TypeAst>),
    Map(Box<TypeAst>, Box<TypeAst>),
    /// Possibly qualified name (`Person` or `shared.Person`).
    Named(String),
}

/// An uninterpreted constant expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstAst {
    Int(i64),
    Double(f64),
    Str(String),
    /// Enum member or constant reference, possibly qualified.
    Ident(String),
    List(Vec<ConstAst>),
    Map(Vec<(ConstAst, ConstAst)>),
}

#[derive(Debug, Clone)]
pub struct TypedefAst {
    pub name: String,
    pub target: TypeAst,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct ConstDeclAst {
    pub name: String,
    pub ty: TypeAst,
    pub value: ConstAst,
    pub line: u32,
}

/// Requiredness keyword as written; `None` when neither appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirednessAst {
    Required,
    Optional,
}

#[derive(Debug, Clone)]
pub struct FieldAst {
    /// Explicit field id; the resolver auto-assigns when absent.
    pub id: Option<i64>,
    pub requiredness: Option<RequirednessAst>,
    pub ty: TypeAst,
    pub name: String,
    pub default: Option<ConstAst>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct EnumAst {
    pub name: String,
    /// Values already auto-assigned (max-prior+1, starting at 0).
    pub members: Vec<(String, i64)>,
    pub line: u32,
}

/// Which struct-like keyword introduced the definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKindAst {
    Struct,
    Union,
    Exception,
}

#[derive(Debug, Clone)]
pub struct StructAst {
    pub name: String,
    pub kind: StructKindAst,
    pub fields: Vec<FieldAst>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct MethodAst {
    pub name: String,
    pub oneway: bool,
    /// `None` for `void`.
    pub returns: Option<TypeAst>,
    pub args: Vec<FieldAst>,
    pub throws: Vec<FieldAst>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct ServiceAst {
    pub name: String,
    pub extends: Option<String>,
    pub methods: Vec<MethodAst>,
    pub line: u32,
}
