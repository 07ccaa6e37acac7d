//! Semantic resolution: parsed documents → closed [`Schema`] graph.
//!
//! Resolution is two-pass so cyclic struct references work: pass 1 registers
//! every named definition as a (name, kind) stub; pass 2 fills bodies,
//! resolving each reference through the stub table. Named [`TypeRef`]s hold
//! qualified-name keys rather than owning pointers, so a struct whose field
//! type is the enclosing struct needs no special casing.
//!
//! Errors are accumulated where safe — one bad constant does not hide an
//! unrelated bad field id — and returned together as [`ResolveErrors`].

use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    sync::Arc,
};

use thriftrun_core::{
    ConstDef, EnumDef, FieldDef, MethodDef, Module, Requiredness, Schema, ServiceDef, StructDef,
    StructKind, TypeRef, TypedefDef, Value,
};

use crate::{
    ast::{
        ConstAst, Definition, Document, EnumAst, FieldAst, Header, MethodAst, RequirednessAst,
        ServiceAst, StructKindAst, TypeAst,
    },
    error::{ResolveError, ResolveErrors},
};

/// One parsed module plus the module names of its direct includes.
#[derive(Debug)]
pub(crate) struct ModuleSource {
    pub name: String,
    pub path: Option<PathBuf>,
    pub doc: Document,
    pub includes: Vec<String>,
}

/// What a qualified name refers to, from pass 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameKind {
    Enum,
    Struct,
    Typedef,
    Service,
    Const,
}

/// Resolve a closed set of parsed modules into a [`Schema`].
///
/// Returns the schema and any warnings (auto-assigned field ids).
pub(crate) fn resolve_modules(
    modules: &[ModuleSource],
    allow_legacy_negative_ids: bool,
) -> Result<(Schema, Vec<String>), ResolveErrors> {
    Resolver {
        legacy_ids: allow_legacy_negative_ids,
        errors: Vec::new(),
        warnings: Vec::new(),
        schema: Schema::default(),
        kinds: HashMap::new(),
        includes: HashMap::new(),
    }
    .run(modules)
}

struct Resolver {
    legacy_ids: bool,
    errors: Vec<ResolveError>,
    warnings: Vec<String>,
    schema: Schema,
    kinds: HashMap<String, NameKind>,
    /// module name → modules visible from it (itself plus direct includes).
    includes: HashMap<String, HashSet<String>>,
}

fn qualify(module: &str, name: &str) -> String {
    format!("{module}.{name}")
}

impl Resolver {
    fn run(mut self, modules: &[ModuleSource]) -> Result<(Schema, Vec<String>), ResolveErrors> {
        self.register_names(modules);

        for m in modules {
            self.resolve_enums(m);
        }
        for m in modules {
            self.resolve_typedefs(m);
        }
        self.check_typedef_cycles();
        for m in modules {
            self.resolve_struct_bodies(m);
        }
        for m in modules {
            self.resolve_constants(m);
        }
        for m in modules {
            self.resolve_struct_defaults(m);
        }
        for m in modules {
            self.resolve_services(m);
        }
        self.check_service_chains();

        for m in modules {
            let namespaces = m
                .doc
                .headers
                .iter()
                .filter_map(|h| match h {
                    Header::Namespace { scope, name } => Some((scope.clone(), name.clone())),
                    _ => None,
                })
                .collect();
            self.schema.modules.push(Arc::new(Module {
                name: m.name.clone(),
                path: m.path.clone(),
                includes: m.includes.clone(),
                namespaces,
            }));
        }

        if self.errors.is_empty() {
            Ok((self.schema, self.warnings))
        } else {
            Err(ResolveErrors(self.errors))
        }
    }

    // ── pass 1: name registration ────────────────────────────────────────

    fn register_names(&mut self, modules: &[ModuleSource]) {
        for m in modules {
            let mut visible: HashSet<String> = m.includes.iter().cloned().collect();
            visible.insert(m.name.clone());
            self.includes.insert(m.name.clone(), visible);

            for def in &m.doc.definitions {
                let kind = match def {
                    Definition::Enum(_) => NameKind::Enum,
                    Definition::Struct(_) => NameKind::Struct,
                    Definition::Typedef(_) => NameKind::Typedef,
                    Definition::Service(_) => NameKind::Service,
                    Definition::Const(_) => NameKind::Const,
                };
                let qualified = qualify(&m.name, def.name());
                if self.kinds.insert(qualified.clone(), kind).is_some() {
                    self.errors
                        .push(ResolveError::DuplicateName { name: qualified });
                }
            }
        }
    }

    fn module_visible(&self, from: &str, target: &str) -> bool {
        self.includes
            .get(from)
            .is_some_and(|visible| visible.contains(target))
    }

    // ── pass 2: bodies ───────────────────────────────────────────────────

    fn resolve_enums(&mut self, m: &ModuleSource) {
        for def in &m.doc.definitions {
            let Definition::Enum(e) = def else { continue };
            let qualified = qualify(&m.name, &e.name);
            if let Some(resolved) = self.build_enum(&qualified, e) {
                self.schema.enums.insert(qualified, Arc::new(resolved));
            }
        }
    }

    fn build_enum(&mut self, qualified: &str, e: &EnumAst) -> Option<EnumDef> {
        let mut members = Vec::with_capacity(e.members.len());
        let mut seen = HashSet::new();
        let mut ok = true;
        for (symbol, value) in &e.members {
            let Ok(value) = i32::try_from(*value) else {
                self.errors.push(ResolveError::EnumValueRange {
                    enum_name: qualified.to_string(),
                    member: symbol.clone(),
                    value: *value,
                });
                ok = false;
                continue;
            };
            if !seen.insert(value) {
                self.errors.push(ResolveError::DuplicateEnumValue {
                    enum_name: qualified.to_string(),
                    value,
                });
                ok = false;
                continue;
            }
            members.push((symbol.clone(), value));
        }
        ok.then(|| EnumDef {
            name: qualified.to_string(),
            members,
        })
    }

    fn resolve_typedefs(&mut self, m: &ModuleSource) {
        for def in &m.doc.definitions {
            let Definition::Typedef(td) = def else {
                continue;
            };
            let qualified = qualify(&m.name, &td.name);
            match self.resolve_type(&m.name, &td.target, &qualified) {
                Ok(target) => {
                    self.schema.typedefs.insert(
                        qualified.clone(),
                        Arc::new(TypedefDef {
                            name: qualified,
                            target,
                        }),
                    );
                }
                Err(e) => self.errors.push(e),
            }
        }
    }

    fn check_typedef_cycles(&mut self) {
        for (name, td) in &self.schema.typedefs {
            let mut seen = HashSet::from([name.as_str()]);
            let mut current = &td.target;
            while let TypeRef::Typedef(next) = current {
                if !seen.insert(next.as_str()) {
                    self.errors
                        .push(ResolveError::TypedefCycle { name: name.clone() });
                    break;
                }
                match self.schema.typedefs.get(next) {
                    Some(next_td) => current = &next_td.target,
                    None => break,
                }
            }
        }
    }

    fn resolve_struct_bodies(&mut self, m: &ModuleSource) {
        for def in &m.doc.definitions {
            let Definition::Struct(s) = def else { continue };
            let qualified = qualify(&m.name, &s.name);
            let kind = match s.kind {
                StructKindAst::Struct => StructKind::Struct,
                StructKindAst::Union => StructKind::Union,
                StructKindAst::Exception => StructKind::Exception,
            };
            let fields = self.build_fields(&m.name, &qualified, &s.fields, kind, false);
            self.schema.structs.insert(
                qualified.clone(),
                Arc::new(StructDef {
                    name: qualified,
                    kind,
                    fields,
                }),
            );
        }
    }

    /// Build field defs, validating ids and requiredness.
    ///
    /// `eval_defaults` is false for declared structs (their defaults are
    /// filled in a later pass, once constants exist) and true for method
    /// args, whose defaults may already reference anything.
    fn build_fields(
        &mut self,
        module: &str,
        owner: &str,
        fields: &[FieldAst],
        kind: StructKind,
        eval_defaults: bool,
    ) -> Vec<FieldDef> {
        let mut out: Vec<FieldDef> = Vec::with_capacity(fields.len());
        let mut used: HashSet<i16> = HashSet::new();
        let mut next_auto: i16 = -1;

        for f in fields {
            let id = match f.id {
                Some(raw) => {
                    let id = match i16::try_from(raw) {
                        Ok(id) => id,
                        Err(_) => {
                            self.errors.push(ResolveError::IllegalFieldId {
                                strukt: owner.to_string(),
                                id: raw,
                            });
                            continue;
                        }
                    };
                    if id <= 0 && !self.legacy_ids {
                        self.errors.push(ResolveError::IllegalFieldId {
                            strukt: owner.to_string(),
                            id: raw,
                        });
                        continue;
                    }
                    id
                }
                None => {
                    while used.contains(&next_auto) {
                        next_auto -= 1;
                    }
                    let id = next_auto;
                    self.warnings.push(format!(
                        "{owner}.{}: no explicit field id; assigned {id} (line {})",
                        f.name, f.line
                    ));
                    id
                }
            };
            if !used.insert(id) {
                self.errors.push(ResolveError::DuplicateFieldId {
                    strukt: owner.to_string(),
                    id,
                });
                continue;
            }

            let requiredness = match (kind, f.requiredness) {
                (StructKind::Union, Some(RequirednessAst::Required)) => {
                    self.errors.push(ResolveError::UnionRequiredField {
                        strukt: owner.to_string(),
                        field: f.name.clone(),
                    });
                    continue;
                }
                (StructKind::Union, _) => Requiredness::Optional,
                (_, Some(RequirednessAst::Required)) => Requiredness::Required,
                (_, Some(RequirednessAst::Optional)) => Requiredness::Optional,
                (_, None) => Requiredness::Default,
            };

            let context = format!("{owner}.{}", f.name);
            let ty = match self.resolve_type(module, &f.ty, &context) {
                Ok(ty) => ty,
                Err(e) => {
                    self.errors.push(e);
                    continue;
                }
            };

            let mut field = FieldDef {
                id,
                name: f.name.clone(),
                requiredness,
                ty,
                default: None,
            };
            if eval_defaults {
                self.fill_default(module, &mut field, f.default.as_ref(), &context);
            }
            out.push(field);
        }
        out
    }

    /// Evaluate a declared default, or materialize the implicit `0` default
    /// for optional enum fields whose enum declares a zero value.
    fn fill_default(
        &mut self,
        module: &str,
        field: &mut FieldDef,
        declared: Option<&ConstAst>,
        context: &str,
    ) {
        if let Some(ast) = declared {
            match self.eval_const(module, &field.ty.clone(), ast, context) {
                Ok(value) => field.default = Some(value),
                Err(e) => self.errors.push(e),
            }
            return;
        }
        if field.requiredness == Requiredness::Optional
            && let TypeRef::Enum(name) = self.schema.true_type(&field.ty)
            && let Some(def) = self.schema.enums.get(name)
            && def.name_of(0).is_some()
        {
            field.default = Some(Value::I32(0));
        }
    }

    fn resolve_struct_defaults(&mut self, m: &ModuleSource) {
        for def in &m.doc.definitions {
            let Definition::Struct(s) = def else { continue };
            let qualified = qualify(&m.name, &s.name);
            let Some(existing) = self.schema.structs.get(&qualified) else {
                continue;
            };

            let mut body = (**existing).clone();
            for field in &mut body.fields {
                let declared = s
                    .fields
                    .iter()
                    .find(|f| f.name == field.name)
                    .and_then(|f| f.default.as_ref());
                let context = format!("{qualified}.{}", field.name);
                self.fill_default(&m.name, field, declared, &context);
            }
            self.schema.structs.insert(qualified, Arc::new(body));
        }
    }

    fn resolve_constants(&mut self, m: &ModuleSource) {
        for def in &m.doc.definitions {
            let Definition::Const(c) = def else { continue };
            let qualified = qualify(&m.name, &c.name);
            let ty = match self.resolve_type(&m.name, &c.ty, &qualified) {
                Ok(ty) => ty,
                Err(e) => {
                    self.errors.push(e);
                    continue;
                }
            };
            match self.eval_const(&m.name, &ty, &c.value, &qualified) {
                Ok(value) => {
                    self.schema.constants.insert(
                        qualified.clone(),
                        Arc::new(ConstDef {
                            name: qualified,
                            ty,
                            value,
                        }),
                    );
                }
                Err(e) => self.errors.push(e),
            }
        }
    }

    fn resolve_services(&mut self, m: &ModuleSource) {
        for def in &m.doc.definitions {
            let Definition::Service(s) = def else { continue };
            let qualified = qualify(&m.name, &s.name);
            if let Some(resolved) = self.build_service(&m.name, &qualified, s) {
                self.schema.services.insert(qualified, Arc::new(resolved));
            }
        }
    }

    fn build_service(&mut self, module: &str, qualified: &str, s: &ServiceAst) -> Option<ServiceDef> {
        let extends = match &s.extends {
            Some(parent) => match self.resolve_service_name(module, parent) {
                Some(parent) => Some(parent),
                None => {
                    self.errors.push(ResolveError::UnknownParentService {
                        name: qualified.to_string(),
                        parent: parent.clone(),
                    });
                    return None;
                }
            },
            None => None,
        };

        let methods = s
            .methods
            .iter()
            .map(|method| Arc::new(self.build_method(module, qualified, method)))
            .collect();

        Some(ServiceDef {
            name: qualified.to_string(),
            extends,
            methods,
        })
    }

    fn build_method(&mut self, module: &str, service: &str, m: &MethodAst) -> MethodDef {
        let context = format!("{service}.{}", m.name);

        let returns = m.returns.as_ref().and_then(|ty| {
            match self.resolve_type(module, ty, &context) {
                Ok(ty) => Some(ty),
                Err(e) => {
                    self.errors.push(e);
                    None
                }
            }
        });

        let args_name = format!("{context}_args");
        let args = Arc::new(StructDef {
            name: args_name.clone(),
            kind: StructKind::Struct,
            fields: self.build_fields(module, &args_name, &m.args, StructKind::Struct, true),
        });

        let result_name = format!("{context}_result");
        let mut result_fields = Vec::new();
        if let Some(ty) = &returns {
            result_fields.push(FieldDef {
                id: 0,
                name: "success".to_string(),
                requiredness: Requiredness::Optional,
                ty: ty.clone(),
                default: None,
            });
        }
        let mut throws =
            self.build_fields(module, &result_name, &m.throws, StructKind::Struct, true);
        for field in &mut throws {
            field.requiredness = Requiredness::Optional;
            match self.schema.true_type(&field.ty) {
                TypeRef::Struct(name)
                    if self
                        .schema
                        .structs
                        .get(name)
                        .is_some_and(|d| d.kind == StructKind::Exception) => {}
                _ => self.errors.push(ResolveError::ThrowsNotException {
                    strukt: result_name.clone(),
                    field: field.name.clone(),
                }),
            }
        }
        result_fields.extend(throws);

        if m.oneway && (returns.is_some() || !m.throws.is_empty()) {
            self.errors.push(ResolveError::OnewayNotVoid {
                name: context.clone(),
            });
        }

        MethodDef {
            name: m.name.clone(),
            oneway: m.oneway,
            returns,
            args,
            result: Arc::new(StructDef {
                name: result_name,
                kind: StructKind::Struct,
                fields: result_fields,
            }),
        }
    }

    fn resolve_service_name(&self, module: &str, name: &str) -> Option<String> {
        let qualified = if name.contains('.') {
            let (prefix, _) = name.rsplit_once('.')?;
            if !self.module_visible(module, prefix) {
                return None;
            }
            name.to_string()
        } else {
            qualify(module, name)
        };
        (self.kinds.get(&qualified) == Some(&NameKind::Service)).then_some(qualified)
    }

    fn check_service_chains(&mut self) {
        for (name, svc) in &self.schema.services {
            let mut seen = HashSet::from([name.as_str()]);
            let mut parent = svc.extends.as_deref();
            while let Some(pname) = parent {
                if !seen.insert(pname) {
                    self.errors
                        .push(ResolveError::ServiceCycle { name: name.clone() });
                    break;
                }
                match self.schema.services.get(pname) {
                    Some(p) => parent = p.extends.as_deref(),
                    // Unknown parents were already reported while building.
                    None => break,
                }
            }
        }
    }

    // ── type references ──────────────────────────────────────────────────

    fn resolve_type(
        &self,
        module: &str,
        ty: &TypeAst,
        context: &str,
    ) -> Result<TypeRef, ResolveError> {
        Ok(match ty {
            TypeAst::Bool => TypeRef::Bool,
            TypeAst::I8 => TypeRef::I8,
            TypeAst::I16 => TypeRef::I16,
            TypeAst::I32 => TypeRef::I32,
            TypeAst::I64 => TypeRef::I64,
            TypeAst::Double => TypeRef::Double,
            TypeAst::String => TypeRef::String,
            TypeAst::Binary => TypeRef::Binary,
            TypeAst::List(elem) => {
                TypeRef::List(Box::new(self.resolve_type(module, elem, context)?))
            }
            TypeAst::Set(elem) => TypeRef::Set(Box::new(self.resolve_type(module, elem, context)?)),
            TypeAst::Map(key, value) => TypeRef::Map {
                key: Box::new(self.resolve_type(module, key, context)?),
                value: Box::new(self.resolve_type(module, value, context)?),
            },
            TypeAst::Named(name) => self.resolve_named(module, name, context)?,
        })
    }

    /// Resolve a possibly-qualified type name: local names first, then
    /// `includedModule.Name`.
    fn resolve_named(
        &self,
        module: &str,
        name: &str,
        context: &str,
    ) -> Result<TypeRef, ResolveError> {
        let unknown = || ResolveError::UnknownType {
            name: name.to_string(),
            context: context.to_string(),
        };

        let qualified = if let Some((prefix, _)) = name.rsplit_once('.') {
            if !self.module_visible(module, prefix) {
                return Err(unknown());
            }
            name.to_string()
        } else {
            qualify(module, name)
        };

        match self.kinds.get(&qualified) {
            Some(NameKind::Enum) => Ok(TypeRef::Enum(qualified)),
            Some(NameKind::Struct) => Ok(TypeRef::Struct(qualified)),
            Some(NameKind::Typedef) => Ok(TypeRef::Typedef(qualified)),
            _ => Err(unknown()),
        }
    }

    // ── constant evaluation ──────────────────────────────────────────────

    /// Evaluate a literal against a resolved type, seeing through typedefs.
    fn eval_const(
        &self,
        module: &str,
        ty: &TypeRef,
        ast: &ConstAst,
        context: &str,
    ) -> Result<Value, ResolveError> {
        let ty = self.schema.true_type(ty).clone();
        let mismatch = |found: &str| ResolveError::ConstTypeMismatch {
            context: context.to_string(),
            expected: ty.type_name().to_string(),
            found: found.to_string(),
        };

        match (&ty, ast) {
            (TypeRef::Bool, ConstAst::Int(v)) if *v == 0 || *v == 1 => Ok(Value::Bool(*v == 1)),
            (TypeRef::Bool, ConstAst::Ident(name)) if name == "true" || name == "false" => {
                Ok(Value::Bool(name == "true"))
            }
            (TypeRef::I8, ConstAst::Int(v)) => i8::try_from(*v)
                .map(Value::I8)
                .map_err(|_| mismatch("out-of-range integer")),
            (TypeRef::I16, ConstAst::Int(v)) => i16::try_from(*v)
                .map(Value::I16)
                .map_err(|_| mismatch("out-of-range integer")),
            (TypeRef::I32, ConstAst::Int(v)) => i32::try_from(*v)
                .map(Value::I32)
                .map_err(|_| mismatch("out-of-range integer")),
            (TypeRef::I64, ConstAst::Int(v)) => Ok(Value::I64(*v)),
            // Integer literals coerce to double.
            (TypeRef::Double, ConstAst::Int(v)) => Ok(Value::Double(*v as f64)),
            (TypeRef::Double, ConstAst::Double(v)) => Ok(Value::Double(*v)),
            (TypeRef::String, ConstAst::Str(s)) => Ok(Value::string(s)),
            (TypeRef::Binary, ConstAst::Str(s)) => Ok(Value::binary(s.as_bytes())),
            (TypeRef::Enum(enum_name), ConstAst::Int(v)) => {
                let value = i32::try_from(*v).map_err(|_| mismatch("out-of-range integer"))?;
                let def = self.schema.enums.get(enum_name).ok_or_else(|| mismatch("enum"))?;
                if def.name_of(value).is_none() {
                    return Err(mismatch("integer outside the enum"));
                }
                Ok(Value::I32(value))
            }
            (TypeRef::List(elem), ConstAst::List(items)) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| self.eval_const(module, elem, item, context))
                    .collect::<Result<_, _>>()?,
            )),
            (TypeRef::Set(elem), ConstAst::List(items)) => Ok(Value::Set(
                items
                    .iter()
                    .map(|item| self.eval_const(module, elem, item, context))
                    .collect::<Result<_, _>>()?,
            )),
            (TypeRef::Map { key, value }, ConstAst::Map(entries)) => Ok(Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| {
                        Ok((
                            self.eval_const(module, key, k, context)?,
                            self.eval_const(module, value, v, context)?,
                        ))
                    })
                    .collect::<Result<_, ResolveError>>()?,
            )),
            // Struct constants are written as maps keyed by field name.
            (TypeRef::Struct(name), ConstAst::Map(entries)) => {
                let def = self
                    .schema
                    .structs
                    .get(name)
                    .ok_or_else(|| mismatch("struct"))?;
                let mut out = thriftrun_core::StructValue::new(Arc::clone(def));
                for (k, v) in entries {
                    let ConstAst::Str(field_name) = k else {
                        return Err(mismatch("non-string struct field key"));
                    };
                    let field = def
                        .field_by_name(field_name)
                        .ok_or_else(|| mismatch(&format!("unknown field '{field_name}'")))?;
                    let value = self.eval_const(module, &field.ty, v, context)?;
                    out.set(field.id, value);
                }
                Ok(Value::Struct(out))
            }
            (_, ConstAst::Ident(name)) => {
                let (value, enum_source) = self.resolve_value_ref(module, name, context)?;
                if let TypeRef::Enum(expected) = &ty {
                    match enum_source {
                        Some(source) if &source == expected => return Ok(value),
                        Some(_) => return Err(mismatch("member of a different enum")),
                        // A constant reference: fall through to the shape check.
                        None => {}
                    }
                }
                if !self.value_matches(&ty, &value) {
                    return Err(mismatch("constant of a different type"));
                }
                Ok(value)
            }
            (_, found) => Err(mismatch(const_ast_kind(found))),
        }
    }

    /// Resolve `Name`, `Enum.MEMBER`, `module.name`, or `module.Enum.MEMBER`
    /// to a value. Returns the owning enum's qualified name for members.
    fn resolve_value_ref(
        &self,
        module: &str,
        name: &str,
        context: &str,
    ) -> Result<(Value, Option<String>), ResolveError> {
        let segments: Vec<&str> = name.split('.').collect();

        match segments.as_slice() {
            [plain] => {
                let qualified = qualify(module, plain);
                if let Some(c) = self.schema.constants.get(&qualified) {
                    return Ok((c.value.clone(), None));
                }
            }
            [first, second] => {
                // Local enum member.
                let enum_name = qualify(module, first);
                if let Some(def) = self.schema.enums.get(&enum_name)
                    && let Some(v) = def.value_of(second)
                {
                    return Ok((Value::I32(v), Some(enum_name)));
                }
                // Constant in an included module.
                if self.module_visible(module, first)
                    && let Some(c) = self.schema.constants.get(name)
                {
                    return Ok((c.value.clone(), None));
                }
            }
            [included, enum_name, member] => {
                if self.module_visible(module, included) {
                    let qualified = qualify(included, enum_name);
                    if let Some(def) = self.schema.enums.get(&qualified)
                        && let Some(v) = def.value_of(member)
                    {
                        return Ok((Value::I32(v), Some(qualified)));
                    }
                }
            }
            _ => {}
        }

        Err(ResolveError::UnknownValue {
            name: name.to_string(),
            context: context.to_string(),
        })
    }

    /// Shallow shape check used when a constant references another constant.
    fn value_matches(&self, ty: &TypeRef, value: &Value) -> bool {
        match (self.schema.true_type(ty), value) {
            (TypeRef::Bool, Value::Bool(_))
            | (TypeRef::I8, Value::I8(_))
            | (TypeRef::I16, Value::I16(_))
            | (TypeRef::I32 | TypeRef::Enum(_), Value::I32(_))
            | (TypeRef::I64, Value::I64(_))
            | (TypeRef::Double, Value::Double(_))
            | (TypeRef::String, Value::String(_))
            | (TypeRef::Binary, Value::Binary(_))
            | (TypeRef::List(_), Value::List(_))
            | (TypeRef::Set(_), Value::Set(_))
            | (TypeRef::Map { .. }, Value::Map(_)) => true,
            (TypeRef::Struct(name), Value::Struct(v)) => v.def().name == *name,
            _ => false,
        }
    }
}

fn const_ast_kind(ast: &ConstAst) -> &'static str {
    match ast {
        ConstAst::Int(_) => "integer",
        ConstAst::Double(_) => "double",
        ConstAst::Str(_) => "string",
        ConstAst::Ident(_) => "identifier",
        ConstAst::List(_) => "list",
        ConstAst::Map(_) => "map",
    }
}
