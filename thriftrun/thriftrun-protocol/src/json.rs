//! The Thrift TJSON protocol.
//!
//! Messages are `[1, "name", type, seqid, payload]`; structs are
//! `{"<fid>": {"<tag>": value}}` with tags `tf/i8/i16/i32/i64/dbl/str/rec/
//! map/lst/set`; lists and sets are `["<etag>", size, elements…]`; maps are
//! `["<ktag>", "<vtag>", size, {key: value}]` with stringified keys. Binary
//! fields are base64 strings.
//!
//! The writer assembles a `serde_json` tree and serializes it to the
//! transport when the outermost message or struct closes. The reader pulls
//! exactly one JSON value off the transport per message, so several
//! messages can ride one connection without extra framing.

use std::collections::VecDeque;

use serde_json::{Map as JsonMap, Number, Value as Json};
use thriftrun_core::Limits;
use thriftrun_transport::Transport;

use crate::{MessageType, Protocol, ProtocolError, WireType};

fn tag_of(wire: WireType) -> &'static str {
    match wire {
        WireType::Bool => "tf",
        WireType::I8 => "i8",
        WireType::I16 => "i16",
        WireType::I32 => "i32",
        WireType::I64 => "i64",
        WireType::Double => "dbl",
        WireType::Binary => "str",
        WireType::Struct => "rec",
        WireType::Map => "map",
        WireType::Set => "set",
        WireType::List => "lst",
    }
}

fn wire_of_tag(tag: &str) -> Option<WireType> {
    Some(match tag {
        "tf" => WireType::Bool,
        "i8" => WireType::I8,
        "i16" => WireType::I16,
        "i32" => WireType::I32,
        "i64" => WireType::I64,
        "dbl" => WireType::Double,
        "str" => WireType::Binary,
        "rec" => WireType::Struct,
        "map" => WireType::Map,
        "set" => WireType::Set,
        "lst" => WireType::List,
        _ => return None,
    })
}

/// Write-side container under construction.
#[derive(Debug)]
enum WFrame {
    /// `[1, name, type, seqid]` so far; the payload struct lands at index 4.
    Message(Vec<Json>),
    Struct(JsonMap<String, Json>),
    Field {
        id: i16,
        tag: &'static str,
        value: Option<Json>,
    },
    /// `[etag, size]` so far; elements are appended.
    List(Vec<Json>),
    Map {
        header: Vec<Json>,
        entries: JsonMap<String, Json>,
        pending_key: Option<String>,
    },
}

/// Read-side value source.
#[derive(Debug)]
enum RFrame {
    /// Values consumed in order: message tail, field payloads, container
    /// elements, alternating map keys/values.
    Pending(VecDeque<Json>),
    Struct(VecDeque<(String, Json)>),
}

/// TJSON protocol over a transport.
#[derive(Debug)]
pub struct JsonProtocol<T> {
    trans: T,
    limits: Limits,
    wstack: Vec<WFrame>,
    rstack: Vec<RFrame>,
}

impl<T: Transport> JsonProtocol<T> {
    pub fn new(trans: T) -> Self {
        Self::with_limits(trans, Limits::default())
    }

    pub fn with_limits(trans: T, limits: Limits) -> Self {
        Self {
            trans,
            limits,
            wstack: Vec::new(),
            rstack: Vec::new(),
        }
    }

    pub fn into_inner(self) -> T {
        self.trans
    }

    // ── write plumbing ───────────────────────────────────────────────────

    fn emit(&mut self, value: &Json) -> Result<(), ProtocolError> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self.trans.write(&bytes)?)
    }

    /// Route a completed value into the innermost open container, or emit
    /// it when nothing is open.
    fn push_value(&mut self, value: Json) -> Result<(), ProtocolError> {
        match self.wstack.last_mut() {
            Some(WFrame::Field { value: slot, .. }) => {
                *slot = Some(value);
                Ok(())
            }
            Some(WFrame::List(items) | WFrame::Message(items)) => {
                items.push(value);
                Ok(())
            }
            Some(WFrame::Map {
                entries,
                pending_key,
                ..
            }) => {
                match pending_key.take() {
                    None => *pending_key = Some(map_key(&value)?),
                    Some(key) => {
                        entries.insert(key, value);
                    }
                }
                Ok(())
            }
            Some(WFrame::Struct(_)) => Err(ProtocolError::unexpected(
                "a field context",
                "a bare value inside a struct",
            )),
            None => self.emit(&value),
        }
    }

    // ── read plumbing ────────────────────────────────────────────────────

    /// Next value from the innermost source, or a fresh top-level value
    /// parsed off the transport.
    fn next_value(&mut self) -> Result<Json, ProtocolError> {
        match self.rstack.last_mut() {
            Some(RFrame::Pending(queue)) => queue.pop_front().ok_or(ProtocolError::Truncated),
            Some(RFrame::Struct(_)) => Err(ProtocolError::unexpected(
                "a field read",
                "a bare value inside a struct",
            )),
            None => self.parse_top_level(),
        }
    }

    fn parse_top_level(&mut self) -> Result<Json, ProtocolError> {
        let reader = TransportRead(&mut self.trans);
        let mut stream = serde_json::Deserializer::from_reader(reader).into_iter::<Json>();
        match stream.next() {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) if e.is_eof() => Err(ProtocolError::Truncated),
            Some(Err(e)) => Err(e.into()),
            None => Err(ProtocolError::Truncated),
        }
    }

    fn pop_pending(&mut self) -> Result<(), ProtocolError> {
        match self.rstack.pop() {
            Some(RFrame::Pending(_)) => Ok(()),
            _ => Err(ProtocolError::unexpected("an open value source", "none")),
        }
    }
}

fn map_key(value: &Json) -> Result<String, ProtocolError> {
    Ok(match value {
        Json::String(s) => s.clone(),
        Json::Number(n) => n.to_string(),
        other => serde_json::to_string(other)?,
    })
}

fn json_i64(value: &Json) -> Result<i64, ProtocolError> {
    match value {
        Json::Number(n) => n.as_i64().ok_or_else(|| {
            ProtocolError::unexpected("an integer", n.to_string())
        }),
        // Map keys arrive as strings.
        Json::String(s) => s
            .parse()
            .map_err(|_| ProtocolError::unexpected("an integer", format!("\"{s}\""))),
        other => Err(ProtocolError::unexpected("an integer", kind_of(other))),
    }
}

fn kind_of(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

impl<T: Transport> Protocol for JsonProtocol<T> {
    fn write_message_begin(
        &mut self,
        name: &str,
        message_type: MessageType,
        seqid: i32,
    ) -> Result<(), ProtocolError> {
        self.wstack.push(WFrame::Message(vec![
            Json::from(1),
            Json::from(name),
            Json::from(message_type.as_u8()),
            Json::from(seqid),
        ]));
        Ok(())
    }

    fn write_message_end(&mut self) -> Result<(), ProtocolError> {
        match self.wstack.pop() {
            Some(WFrame::Message(items)) => {
                let message = Json::Array(items);
                if self.wstack.is_empty() {
                    self.emit(&message)
                } else {
                    self.push_value(message)
                }
            }
            _ => Err(ProtocolError::unexpected("an open message", "none")),
        }
    }

    fn write_struct_begin(&mut self, _name: &str) -> Result<(), ProtocolError> {
        self.wstack.push(WFrame::Struct(JsonMap::new()));
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<(), ProtocolError> {
        match self.wstack.pop() {
            Some(WFrame::Struct(map)) => {
                let object = Json::Object(map);
                if self.wstack.is_empty() {
                    self.emit(&object)
                } else {
                    self.push_value(object)
                }
            }
            _ => Err(ProtocolError::unexpected("an open struct", "none")),
        }
    }

    fn write_field_begin(
        &mut self,
        _name: &str,
        wire_type: WireType,
        id: i16,
    ) -> Result<(), ProtocolError> {
        self.wstack.push(WFrame::Field {
            id,
            tag: tag_of(wire_type),
            value: None,
        });
        Ok(())
    }

    fn write_field_end(&mut self) -> Result<(), ProtocolError> {
        let (id, tag, value) = match self.wstack.pop() {
            Some(WFrame::Field { id, tag, value }) => (id, tag, value),
            _ => return Err(ProtocolError::unexpected("an open field", "none")),
        };
        let value = value.ok_or_else(|| ProtocolError::unexpected("a field value", "none"))?;
        let mut wrapped = JsonMap::new();
        wrapped.insert(tag.to_string(), value);
        match self.wstack.last_mut() {
            Some(WFrame::Struct(map)) => {
                map.insert(id.to_string(), Json::Object(wrapped));
                Ok(())
            }
            _ => Err(ProtocolError::unexpected("an enclosing struct", "none")),
        }
    }

    fn write_field_stop(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_map_begin(
        &mut self,
        key_type: WireType,
        value_type: WireType,
        size: usize,
    ) -> Result<(), ProtocolError> {
        self.wstack.push(WFrame::Map {
            header: vec![
                Json::from(tag_of(key_type)),
                Json::from(tag_of(value_type)),
                Json::from(size),
            ],
            entries: JsonMap::new(),
            pending_key: None,
        });
        Ok(())
    }

    fn write_map_end(&mut self) -> Result<(), ProtocolError> {
        match self.wstack.pop() {
            Some(WFrame::Map {
                mut header,
                entries,
                ..
            }) => {
                header.push(Json::Object(entries));
                self.push_value(Json::Array(header))
            }
            _ => Err(ProtocolError::unexpected("an open map", "none")),
        }
    }

    fn write_list_begin(&mut self, elem_type: WireType, size: usize) -> Result<(), ProtocolError> {
        self.wstack.push(WFrame::List(vec![
            Json::from(tag_of(elem_type)),
            Json::from(size),
        ]));
        Ok(())
    }

    fn write_list_end(&mut self) -> Result<(), ProtocolError> {
        match self.wstack.pop() {
            Some(WFrame::List(items)) => self.push_value(Json::Array(items)),
            _ => Err(ProtocolError::unexpected("an open list", "none")),
        }
    }

    fn write_set_begin(&mut self, elem_type: WireType, size: usize) -> Result<(), ProtocolError> {
        self.write_list_begin(elem_type, size)
    }

    fn write_set_end(&mut self) -> Result<(), ProtocolError> {
        self.write_list_end()
    }

    fn write_bool(&mut self, v: bool) -> Result<(), ProtocolError> {
        self.push_value(Json::from(v as i32))
    }

    fn write_i8(&mut self, v: i8) -> Result<(), ProtocolError> {
        self.push_value(Json::from(v))
    }

    fn write_i16(&mut self, v: i16) -> Result<(), ProtocolError> {
        self.push_value(Json::from(v))
    }

    fn write_i32(&mut self, v: i32) -> Result<(), ProtocolError> {
        self.push_value(Json::from(v))
    }

    fn write_i64(&mut self, v: i64) -> Result<(), ProtocolError> {
        self.push_value(Json::from(v))
    }

    fn write_double(&mut self, v: f64) -> Result<(), ProtocolError> {
        // JSON numbers cannot carry non-finite values; TJSON spells them out.
        let json = if v.is_nan() {
            Json::from("NaN")
        } else if v.is_infinite() {
            Json::from(if v > 0.0 { "Infinity" } else { "-Infinity" })
        } else {
            Number::from_f64(v).map(Json::Number).unwrap_or(Json::Null)
        };
        self.push_value(json)
    }

    fn write_string(&mut self, v: &str) -> Result<(), ProtocolError> {
        self.push_value(Json::from(v))
    }

    fn write_binary(&mut self, v: &[u8]) -> Result<(), ProtocolError> {
        self.push_value(Json::from(base64::encode(v)))
    }

    fn read_message_begin(&mut self) -> Result<(String, MessageType, i32), ProtocolError> {
        let value = self.next_value()?;
        let Json::Array(items) = value else {
            return Err(ProtocolError::unexpected("a message array", kind_of(&value)));
        };
        let mut items = VecDeque::from(items);

        let version = json_i64(&items.pop_front().ok_or(ProtocolError::Truncated)?)?;
        if version != 1 {
            return Err(ProtocolError::BadVersion);
        }
        let name = match items.pop_front() {
            Some(Json::String(s)) => s,
            other => {
                return Err(ProtocolError::unexpected(
                    "a message name",
                    other.as_ref().map_or("nothing", kind_of),
                ));
            }
        };
        let type_byte = json_i64(&items.pop_front().ok_or(ProtocolError::Truncated)?)? as u8;
        let message_type =
            MessageType::from_u8(type_byte).ok_or(ProtocolError::BadMessageType(type_byte))?;
        let seqid = json_i64(&items.pop_front().ok_or(ProtocolError::Truncated)?)? as i32;

        // Whatever follows the envelope (normally one payload struct) is
        // consumed by the reads between message begin and end.
        self.rstack.push(RFrame::Pending(items));
        Ok((name, message_type, seqid))
    }

    fn read_message_end(&mut self) -> Result<(), ProtocolError> {
        self.pop_pending()
    }

    fn read_struct_begin(&mut self) -> Result<(), ProtocolError> {
        let value = self.next_value()?;
        let Json::Object(map) = value else {
            return Err(ProtocolError::unexpected("a struct object", kind_of(&value)));
        };
        self.rstack
            .push(RFrame::Struct(map.into_iter().collect()));
        Ok(())
    }

    fn read_struct_end(&mut self) -> Result<(), ProtocolError> {
        match self.rstack.pop() {
            Some(RFrame::Struct(_)) => Ok(()),
            _ => Err(ProtocolError::unexpected("an open struct", "none")),
        }
    }

    fn read_field_begin(&mut self) -> Result<Option<(WireType, i16)>, ProtocolError> {
        let entry = match self.rstack.last_mut() {
            Some(RFrame::Struct(entries)) => entries.pop_front(),
            _ => return Err(ProtocolError::unexpected("an open struct", "none")),
        };
        let Some((fid, wrapped)) = entry else {
            return Ok(None);
        };

        let id: i16 = fid
            .parse()
            .map_err(|_| ProtocolError::unexpected("a numeric field id", format!("\"{fid}\"")))?;
        let Json::Object(obj) = wrapped else {
            return Err(ProtocolError::unexpected("a tagged field object", kind_of(&wrapped)));
        };
        let mut entries = obj.into_iter();
        let (tag, inner) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(ProtocolError::unexpected(
                    "exactly one type tag",
                    "a different shape",
                ));
            }
        };
        let wire = wire_of_tag(&tag)
            .ok_or_else(|| ProtocolError::unexpected("a type tag", format!("\"{tag}\"")))?;
        self.rstack.push(RFrame::Pending(VecDeque::from([inner])));
        Ok(Some((wire, id)))
    }

    fn read_field_end(&mut self) -> Result<(), ProtocolError> {
        self.pop_pending()
    }

    fn read_map_begin(&mut self) -> Result<(WireType, WireType, usize), ProtocolError> {
        let value = self.next_value()?;
        let Json::Array(items) = value else {
            return Err(ProtocolError::unexpected("a map array", kind_of(&value)));
        };
        let mut items = VecDeque::from(items);
        let key_tag = match items.pop_front() {
            Some(Json::String(s)) => s,
            _ => return Err(ProtocolError::unexpected("a key type tag", "a different shape")),
        };
        let value_tag = match items.pop_front() {
            Some(Json::String(s)) => s,
            _ => return Err(ProtocolError::unexpected("a value type tag", "a different shape")),
        };
        let size = json_i64(&items.pop_front().ok_or(ProtocolError::Truncated)?)?;
        if size < 0 || size as u64 > self.limits.container_length as u64 {
            return Err(ProtocolError::SizeLimit {
                size,
                limit: self.limits.container_length,
            });
        }

        let key_type = wire_of_tag(&key_tag)
            .ok_or_else(|| ProtocolError::unexpected("a type tag", format!("\"{key_tag}\"")))?;
        let value_type = wire_of_tag(&value_tag)
            .ok_or_else(|| ProtocolError::unexpected("a type tag", format!("\"{value_tag}\"")))?;

        let mut flattened = VecDeque::new();
        if size > 0 {
            match items.pop_front() {
                Some(Json::Object(entries)) => {
                    for (k, v) in entries {
                        flattened.push_back(Json::String(k));
                        flattened.push_back(v);
                    }
                }
                other => {
                    return Err(ProtocolError::unexpected(
                        "a map entries object",
                        other.as_ref().map_or("nothing", kind_of),
                    ));
                }
            }
        }
        self.rstack.push(RFrame::Pending(flattened));
        Ok((key_type, value_type, size as usize))
    }

    fn read_map_end(&mut self) -> Result<(), ProtocolError> {
        self.pop_pending()
    }

    fn read_list_begin(&mut self) -> Result<(WireType, usize), ProtocolError> {
        let value = self.next_value()?;
        let Json::Array(items) = value else {
            return Err(ProtocolError::unexpected("a list array", kind_of(&value)));
        };
        let mut items = VecDeque::from(items);
        let tag = match items.pop_front() {
            Some(Json::String(s)) => s,
            _ => return Err(ProtocolError::unexpected("an element type tag", "a different shape")),
        };
        let size = json_i64(&items.pop_front().ok_or(ProtocolError::Truncated)?)?;
        if size < 0 || size as u64 > self.limits.container_length as u64 {
            return Err(ProtocolError::SizeLimit {
                size,
                limit: self.limits.container_length,
            });
        }
        let elem_type = wire_of_tag(&tag)
            .ok_or_else(|| ProtocolError::unexpected("a type tag", format!("\"{tag}\"")))?;
        self.rstack.push(RFrame::Pending(items));
        Ok((elem_type, size as usize))
    }

    fn read_list_end(&mut self) -> Result<(), ProtocolError> {
        self.pop_pending()
    }

    fn read_set_begin(&mut self) -> Result<(WireType, usize), ProtocolError> {
        self.read_list_begin()
    }

    fn read_set_end(&mut self) -> Result<(), ProtocolError> {
        self.pop_pending()
    }

    fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        let value = self.next_value()?;
        match &value {
            Json::Bool(b) => Ok(*b),
            Json::Number(_) | Json::String(_) => Ok(json_i64(&value)? != 0),
            other => Err(ProtocolError::unexpected("a bool", kind_of(other))),
        }
    }

    fn read_i8(&mut self) -> Result<i8, ProtocolError> {
        let v = json_i64(&self.next_value()?)?;
        i8::try_from(v).map_err(|_| ProtocolError::unexpected("an i8", v.to_string()))
    }

    fn read_i16(&mut self) -> Result<i16, ProtocolError> {
        let v = json_i64(&self.next_value()?)?;
        i16::try_from(v).map_err(|_| ProtocolError::unexpected("an i16", v.to_string()))
    }

    fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        let v = json_i64(&self.next_value()?)?;
        i32::try_from(v).map_err(|_| ProtocolError::unexpected("an i32", v.to_string()))
    }

    fn read_i64(&mut self) -> Result<i64, ProtocolError> {
        json_i64(&self.next_value()?)
    }

    fn read_double(&mut self) -> Result<f64, ProtocolError> {
        let value = self.next_value()?;
        match &value {
            Json::Number(n) => n
                .as_f64()
                .ok_or_else(|| ProtocolError::unexpected("a double", n.to_string())),
            Json::String(s) => match s.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => other
                    .parse()
                    .map_err(|_| ProtocolError::unexpected("a double", format!("\"{other}\""))),
            },
            other => Err(ProtocolError::unexpected("a double", kind_of(other))),
        }
    }

    fn read_string(&mut self) -> Result<String, ProtocolError> {
        let value = self.next_value()?;
        match value {
            Json::String(s) => {
                if s.len() > self.limits.string_length {
                    return Err(ProtocolError::SizeLimit {
                        size: s.len() as i64,
                        limit: self.limits.string_length,
                    });
                }
                Ok(s)
            }
            // Map keys for numeric key types arrive as numbers elsewhere;
            // for string keys the raw text is already what we want.
            Json::Number(n) => Ok(n.to_string()),
            other => Err(ProtocolError::unexpected("a string", kind_of(&other))),
        }
    }

    fn read_binary(&mut self) -> Result<Vec<u8>, ProtocolError> {
        let s = self.read_string()?;
        // Unknown string-typed fields are skipped through this path, so a
        // non-base64 payload falls back to its raw bytes.
        Ok(base64::decode(&s).unwrap_or_else(|_| s.into_bytes()))
    }

    fn flush(&mut self) -> Result<(), ProtocolError> {
        Ok(self.trans.flush()?)
    }

    fn limits(&self) -> &Limits {
        &self.limits
    }
}

/// `io::Read` adapter over a [`Transport`] for streaming JSON parsing.
struct TransportRead<'a, T>(&'a mut T);

impl<T: Transport> std::io::Read for TransportRead<'_, T> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf).map_err(std::io::Error::other)
    }
}
