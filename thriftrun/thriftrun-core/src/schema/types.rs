use std::{collections::HashMap, path::PathBuf, sync::Arc};

use crate::value::Value;

/// Reference to a concrete or named type.
///
/// Named variants (`Enum` / `Struct` / `Typedef`) hold the fully-qualified
/// name (`module.Name`) as a non-owning key into the [`Schema`] registries.
/// Cyclic struct definitions are representable because the reference never
/// owns the definition it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Double,
    /// UTF-8 text. Identical to `Binary` on the classic binary wire,
    /// distinct in JSON (base64) and for value typing.
    String,
    /// Opaque bytes.
    Binary,
    List(Box<TypeRef>),
    Set(Box<TypeRef>),
    Map {
        key: Box<TypeRef>,
        value: Box<TypeRef>,
    },
    /// Key into [`Schema::enums`].
    Enum(String),
    /// Key into [`Schema::structs`]; covers structs, unions, and exceptions.
    Struct(String),
    /// Key into [`Schema::typedefs`]. Transparent at wire level.
    Typedef(String),
}

impl TypeRef {
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeRef::Bool => "bool",
            TypeRef::I8 => "byte",
            TypeRef::I16 => "i16",
            TypeRef::I32 => "i32",
            TypeRef::I64 => "i64",
            TypeRef::Double => "double",
            TypeRef::String => "string",
            TypeRef::Binary => "binary",
            TypeRef::List(_) => "list",
            TypeRef::Set(_) => "set",
            TypeRef::Map { .. } => "map",
            TypeRef::Enum(_) => "enum",
            TypeRef::Struct(_) => "struct",
            TypeRef::Typedef(_) => "typedef",
        }
    }
}

/// Field requiredness as declared in the IDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Requiredness {
    /// Must be present on the wire in both directions.
    Required,
    /// May be absent; absent fields are not encoded.
    Optional,
    /// Neither keyword was written. Encoded when set, tolerated when absent.
    #[default]
    Default,
}

/// A single struct/union/exception field. The numeric id is the wire key.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub id: i16,
    pub name: String,
    pub requiredness: Requiredness,
    pub ty: TypeRef,
    pub default: Option<Value>,
}

/// Flavor of a [`StructDef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
    Struct,
    /// At most one field present at runtime; all fields effectively optional.
    Union,
    /// Surfaces as an error when returned from a service method.
    Exception,
}

/// A struct, union, or exception definition.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    /// Fully-qualified name, e.g. `addressbook.Person`.
    pub name: String,
    pub kind: StructKind,
    /// Declaration order.
    pub fields: Vec<FieldDef>,
}

impl StructDef {
    pub fn field_by_id(&self, id: i16) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Short name without the module qualifier.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// An enum definition with its ordered (symbol, value) pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub members: Vec<(String, i32)>,
}

impl EnumDef {
    pub fn value_of(&self, symbol: &str) -> Option<i32> {
        self.members
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, v)| *v)
    }

    pub fn name_of(&self, value: i32) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(s, _)| s.as_str())
    }

    /// Default symbol is the first declared member.
    pub fn default_member(&self) -> Option<(&str, i32)> {
        self.members.first().map(|(s, v)| (s.as_str(), *v))
    }
}

/// A typedef alias. Semantic checks see through it via [`Schema::true_type`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefDef {
    pub name: String,
    pub target: TypeRef,
}

/// A named constant with its evaluated value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDef {
    pub name: String,
    pub ty: TypeRef,
    pub value: Value,
}

/// A service method. `args` and `result` are synthesized structs: arguments
/// at their declared ids, the success value at id 0, and each declared
/// exception at its declared id inside `result`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    pub name: String,
    pub oneway: bool,
    /// `None` for `void`.
    pub returns: Option<TypeRef>,
    pub args: Arc<StructDef>,
    pub result: Arc<StructDef>,
}

impl MethodDef {
    /// Result fields other than the id-0 success slot are declared exceptions.
    pub fn throws(&self) -> impl Iterator<Item = &FieldDef> {
        self.result.fields.iter().filter(|f| f.id != 0)
    }
}

/// A service definition; single-inheritance via `extends`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDef {
    pub name: String,
    /// Fully-qualified parent service name.
    pub extends: Option<String>,
    pub methods: Vec<Arc<MethodDef>>,
}

impl ServiceDef {
    pub fn method(&self, name: &str) -> Option<&Arc<MethodDef>> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// One `.thrift` source file.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub name: String,
    pub path: Option<PathBuf>,
    /// Module names of direct includes.
    pub includes: Vec<String>,
    /// `namespace <scope> <name>` declarations; parsed and stored, no
    /// runtime effect.
    pub namespaces: Vec<(String, String)>,
}

/// The closed, immutable graph of all types and services.
///
/// Built once by the loader and freely shared ([`Arc`]) across workers;
/// registries are keyed by fully-qualified name.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub modules: Vec<Arc<Module>>,
    pub structs: HashMap<String, Arc<StructDef>>,
    pub enums: HashMap<String, Arc<EnumDef>>,
    pub typedefs: HashMap<String, Arc<TypedefDef>>,
    pub services: HashMap<String, Arc<ServiceDef>>,
    pub constants: HashMap<String, Arc<ConstDef>>,
}

impl Schema {
    pub fn struct_def(&self, name: &str) -> Option<&Arc<StructDef>> {
        self.structs.get(name)
    }

    pub fn enum_def(&self, name: &str) -> Option<&Arc<EnumDef>> {
        self.enums.get(name)
    }

    pub fn typedef(&self, name: &str) -> Option<&Arc<TypedefDef>> {
        self.typedefs.get(name)
    }

    pub fn service(&self, name: &str) -> Option<&Arc<ServiceDef>> {
        self.services.get(name)
    }

    pub fn constant(&self, name: &str) -> Option<&Arc<ConstDef>> {
        self.constants.get(name)
    }

    /// Follow typedef aliases until a non-typedef [`TypeRef`] is reached.
    ///
    /// Unresolvable or cyclic alias chains return the last reference seen;
    /// the resolver rejects both before a schema is ever constructed.
    pub fn true_type<'a>(&'a self, ty: &'a TypeRef) -> &'a TypeRef {
        let mut current = ty;
        let mut hops = 0usize;
        while let TypeRef::Typedef(name) = current {
            match self.typedefs.get(name) {
                Some(td) if hops < self.typedefs.len() => {
                    current = &td.target;
                    hops += 1;
                }
                _ => break,
            }
        }
        current
    }

    /// Look up a method on a service, walking the `extends` chain.
    pub fn resolve_method(
        &self,
        service: &ServiceDef,
        name: &str,
    ) -> Option<Arc<MethodDef>> {
        if let Some(m) = service.method(name) {
            return Some(Arc::clone(m));
        }
        let mut parent = service.extends.as_deref();
        while let Some(pname) = parent {
            let svc = self.services.get(pname)?;
            if let Some(m) = svc.method(name) {
                return Some(Arc::clone(m));
            }
            parent = svc.extends.as_deref();
        }
        None
    }

    /// All methods reachable on a service, parents first.
    pub fn all_methods(&self, service: &ServiceDef) -> Vec<Arc<MethodDef>> {
        let mut chain = vec![service];
        let mut parent = service.extends.as_deref();
        while let Some(pname) = parent {
            match self.services.get(pname) {
                Some(svc) => {
                    chain.push(svc.as_ref());
                    parent = svc.extends.as_deref();
                }
                None => break,
            }
        }
        chain
            .into_iter()
            .rev()
            .flat_map(|s| s.methods.iter().cloned())
            .collect()
    }
}
