//! Wire-level constants shared by all protocols.

/// The 1-byte tag describing a value's shape on the wire.
///
/// Distinct from the logical [`TypeRef`](thriftrun_core::TypeRef): enums
/// travel as `I32`, strings and binaries share `Binary` on the classic
/// binary wire, and typedefs are invisible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Bool,
    I8,
    Double,
    I16,
    I32,
    I64,
    /// Strings and binaries: length-prefixed bytes.
    Binary,
    Struct,
    Map,
    Set,
    List,
}

impl WireType {
    pub fn as_u8(self) -> u8 {
        match self {
            WireType::Bool => 2,
            WireType::I8 => 3,
            WireType::Double => 4,
            WireType::I16 => 6,
            WireType::I32 => 8,
            WireType::I64 => 10,
            WireType::Binary => 11,
            WireType::Struct => 12,
            WireType::Map => 13,
            WireType::Set => 14,
            WireType::List => 15,
        }
    }

    pub fn from_u8(b: u8) -> Option<Self> {
        Some(match b {
            2 => WireType::Bool,
            3 => WireType::I8,
            4 => WireType::Double,
            6 => WireType::I16,
            8 => WireType::I32,
            10 => WireType::I64,
            11 => WireType::Binary,
            12 => WireType::Struct,
            13 => WireType::Map,
            14 => WireType::Set,
            15 => WireType::List,
            _ => return None,
        })
    }

    pub fn describe(self) -> &'static str {
        match self {
            WireType::Bool => "bool",
            WireType::I8 => "i8",
            WireType::Double => "double",
            WireType::I16 => "i16",
            WireType::I32 => "i32",
            WireType::I64 => "i64",
            WireType::Binary => "binary",
            WireType::Struct => "struct",
            WireType::Map => "map",
            WireType::Set => "set",
            WireType::List => "list",
        }
    }
}

/// RPC message envelope kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Call = 1,
    Reply = 2,
    Exception = 3,
    Oneway = 4,
}

impl MessageType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(b: u8) -> Option<Self> {
        Some(match b {
            1 => MessageType::Call,
            2 => MessageType::Reply,
            3 => MessageType::Exception,
            4 => MessageType::Oneway,
            _ => return None,
        })
    }
}
