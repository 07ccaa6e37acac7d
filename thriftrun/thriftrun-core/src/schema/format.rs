use std::fmt::{Error, Write as _};

use super::{FieldDef, Requiredness, Schema, StructKind, TypeRef};

/// Render a schema in a readable style for diagnostics: one block per named
/// type and service, fields one per line in declaration order.
pub fn format_schema(schema: &Schema) -> Result<String, Error> {
    let mut out = String::new();

    let mut enum_names: Vec<_> = schema.enums.keys().collect();
    enum_names.sort();
    for name in enum_names {
        let def = &schema.enums[name];
        writeln!(out, "enum {name} {{")?;
        for (symbol, value) in &def.members {
            writeln!(out, "    {symbol} = {value}")?;
        }
        writeln!(out, "}}")?;
    }

    let mut struct_names: Vec<_> = schema.structs.keys().collect();
    struct_names.sort();
    for name in struct_names {
        let def = &schema.structs[name];
        let kw = match def.kind {
            StructKind::Struct => "struct",
            StructKind::Union => "union",
            StructKind::Exception => "exception",
        };
        writeln!(out, "{kw} {name} {{")?;
        for field in &def.fields {
            format_field(field, &mut out)?;
        }
        writeln!(out, "}}")?;
    }

    let mut service_names: Vec<_> = schema.services.keys().collect();
    service_names.sort();
    for name in service_names {
        let def = &schema.services[name];
        match &def.extends {
            Some(parent) => writeln!(out, "service {name} extends {parent} {{")?,
            None => writeln!(out, "service {name} {{")?,
        }
        for method in &def.methods {
            let ret = match &method.returns {
                Some(ty) => type_text(ty),
                None => "void".to_string(),
            };
            let args: Vec<String> = method
                .args
                .fields
                .iter()
                .map(|f| format!("{}: {} {}", f.id, type_text(&f.ty), f.name))
                .collect();
            let oneway = if method.oneway { "oneway " } else { "" };
            writeln!(
                out,
                "    {oneway}{ret} {}({})",
                method.name,
                args.join(", ")
            )?;
        }
        writeln!(out, "}}")?;
    }

    Ok(out)
}

fn format_field(field: &FieldDef, out: &mut String) -> Result<(), Error> {
    let req = match field.requiredness {
        Requiredness::Required => "required ",
        Requiredness::Optional => "optional ",
        Requiredness::Default => "",
    };
    write!(
        out,
        "    {}: {req}{} {}",
        field.id,
        type_text(&field.ty),
        field.name
    )?;
    if field.default.is_some() {
        write!(out, " = <default>")?;
    }
    writeln!(out)
}

fn type_text(ty: &TypeRef) -> String {
    match ty {
        TypeRef::List(elem) => format!("list<{}>", type_text(elem)),
        TypeRef::Set(elem) => format!("set<{}>", type_text(elem)),
        TypeRef::Map { key, value } => {
            format!("map<{}, {}>", type_text(key), type_text(value))
        }
        TypeRef::Enum(name) | TypeRef::Struct(name) | TypeRef::Typedef(name) => name.clone(),
        other => other.type_name().to_string(),
    }
}
