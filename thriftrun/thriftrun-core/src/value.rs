//! Dynamic values produced by decoding and consumed by encoding.

use std::{collections::BTreeMap, sync::Arc};

use crate::schema::{StructDef, StructKind};

/// Runtime value typed by a [`TypeRef`](crate::TypeRef).
/// All types are explicit; no lossy conversions.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    String(Arc<str>),
    Binary(Arc<[u8]>),
    List(Vec<Value>),
    /// Order-preserving; uniqueness is the writer's concern.
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Struct(StructValue),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    pub fn binary(b: impl AsRef<[u8]>) -> Self {
        Self::Binary(Arc::from(b.as_ref()))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Value::I8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Value::I16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_ref()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(v) => Some(v.as_ref()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) | Value::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_struct(self) -> Option<StructValue> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }
}

/// A dynamic record: a [`StructDef`] plus a field-id → [`Value`] map.
///
/// Unset optional fields are absent from the map. Instances are mutable
/// plain records owned by whoever constructed them; the shared `def` is the
/// only schema linkage the protocol layer needs.
#[derive(Debug, Clone)]
pub struct StructValue {
    def: Arc<StructDef>,
    fields: BTreeMap<i16, Value>,
}

impl StructValue {
    pub fn new(def: Arc<StructDef>) -> Self {
        Self {
            def,
            fields: BTreeMap::new(),
        }
    }

    pub fn def(&self) -> &Arc<StructDef> {
        &self.def
    }

    pub fn set(&mut self, id: i16, value: Value) {
        if self.def.kind == StructKind::Union {
            self.fields.clear();
        }
        self.fields.insert(id, value);
    }

    /// Set by field name; returns false when the def has no such field.
    pub fn set_by_name(&mut self, name: &str, value: Value) -> bool {
        match self.def.field_by_name(name) {
            Some(f) => {
                self.set(f.id, value);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: i16) -> Option<&Value> {
        self.fields.get(&id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.def.field_by_name(name).and_then(|f| self.get(f.id))
    }

    /// Present value, or a clone of the field's declared default.
    pub fn get_or_default(&self, id: i16) -> Option<Value> {
        if let Some(v) = self.fields.get(&id) {
            return Some(v.clone());
        }
        self.def.field_by_id(id)?.default.clone()
    }

    pub fn take(&mut self, id: i16) -> Option<Value> {
        self.fields.remove(&id)
    }

    pub fn clear(&mut self, id: i16) {
        self.fields.remove(&id);
    }

    pub fn is_set(&self, id: i16) -> bool {
        self.fields.contains_key(&id)
    }

    pub fn set_field_count(&self) -> usize {
        self.fields.len()
    }

    /// Set fields in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (i16, &Value)> {
        self.fields.iter().map(|(id, v)| (*id, v))
    }
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        self.def.name == other.def.name && self.fields == other.fields
    }
}
