//! Column values and conversion into destination member types.
//!
//! [`Value`] is the dynamic form of one extracted cell. Destination types
//! implement [`ColumnValue`] to be filled from a `Value`; the conversions are
//! deliberately lenient where drivers differ (integer widening, booleans stored
//! as 0/1, characters and uuids stored as strings) and strict everywhere else.

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::cursor::ColumnType;

/// One extracted cell of a result set.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Str(String),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Bool(bool),
    DateTime(NaiveDateTime),
    Char(char),
    Uuid(Uuid),
    Bytes(Vec<u8>),
    Chars(Vec<char>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type name for error messages and table output.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Str(_) => "str",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Decimal(_) => "decimal",
            Value::Bool(_) => "bool",
            Value::DateTime(_) => "datetime",
            Value::Char(_) => "char",
            Value::Uuid(_) => "uuid",
            Value::Bytes(_) => "bytes",
            Value::Chars(_) => "chars",
        }
    }

    /// Any integer variant, widened.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::I8(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::I64(v) => Some(v.into()),
            Value::U8(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::U64(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Any numeric variant as a double. Integers beyond 2^53 lose precision.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(v.into()),
            Value::F64(v) => Some(v),
            _ => self.as_i128().map(|v| v as f64),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Str(s) => f.write_str(s),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Char(v) => write!(f, "{v}"),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Bytes(v) => f.write_str(&hex::encode(v)),
            Value::Chars(v) => f.write_str(&v.iter().collect::<String>()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Str(s) => serializer.serialize_str(s),
            Value::I8(v) => serializer.serialize_i8(*v),
            Value::I16(v) => serializer.serialize_i16(*v),
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Char(v) => serializer.serialize_char(*v),
            // Everything else travels as its display string (bytes as hex)
            other => serializer.collect_str(other),
        }
    }
}

/// A value that did not fit the requested destination type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

impl Mismatch {
    fn new<T>(found: &Value) -> Self {
        Self {
            expected: std::any::type_name::<T>(),
            found: found.type_name(),
        }
    }
}

/// One component of an identity key.
///
/// Floats compare by bit pattern so keys stay `Eq + Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Null,
    Bool(bool),
    Int(i128),
    Float(u64),
    Char(char),
    Str(String),
    Uuid(Uuid),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
}

/// Composite identity key, one part per key member in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(pub Vec<KeyPart>);

/// A type that can be filled from a column [`Value`].
///
/// Null always converts to `Default::default()` (`None` for `Option<T>`).
pub trait ColumnValue: Default + Sized + 'static {
    /// Declared column type this member naturally reads from.
    fn column_type() -> ColumnType;

    fn from_value(value: Value) -> Result<Self, Mismatch>;

    /// Identity-key form of this value; `None` for types that cannot be keys.
    fn key_part(&self) -> Option<KeyPart>;
}

macro_rules! integer_column {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl ColumnValue for $ty {
            fn column_type() -> ColumnType {
                ColumnType::$variant
            }

            fn from_value(value: Value) -> Result<Self, Mismatch> {
                if value.is_null() {
                    return Ok(0);
                }
                value
                    .as_i128()
                    .and_then(|v| <$ty>::try_from(v).ok())
                    .ok_or_else(|| Mismatch::new::<$ty>(&value))
            }

            fn key_part(&self) -> Option<KeyPart> {
                Some(KeyPart::Int(i128::from(*self)))
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    )*};
}

integer_column! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}

impl ColumnValue for f64 {
    fn column_type() -> ColumnType {
        ColumnType::F64
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        if value.is_null() {
            return Ok(0.0);
        }
        value.as_f64().ok_or_else(|| Mismatch::new::<f64>(&value))
    }

    fn key_part(&self) -> Option<KeyPart> {
        Some(KeyPart::Float(self.to_bits()))
    }
}

impl ColumnValue for f32 {
    fn column_type() -> ColumnType {
        ColumnType::F32
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        if value.is_null() {
            return Ok(0.0);
        }
        value
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| Mismatch::new::<f32>(&value))
    }

    fn key_part(&self) -> Option<KeyPart> {
        Some(KeyPart::Float(f64::from(*self).to_bits()))
    }
}

impl ColumnValue for bool {
    fn column_type() -> ColumnType {
        ColumnType::Bool
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(b),
            ref other => match other.as_i128() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(Mismatch::new::<bool>(other)),
            },
        }
    }

    fn key_part(&self) -> Option<KeyPart> {
        Some(KeyPart::Bool(*self))
    }
}

impl ColumnValue for String {
    fn column_type() -> ColumnType {
        ColumnType::Str
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Str(s) => Ok(s),
            Value::Char(c) => Ok(c.to_string()),
            Value::Chars(chars) => Ok(chars.into_iter().collect()),
            other => Err(Mismatch::new::<String>(&other)),
        }
    }

    fn key_part(&self) -> Option<KeyPart> {
        Some(KeyPart::Str(self.clone()))
    }
}

impl ColumnValue for char {
    fn column_type() -> ColumnType {
        ColumnType::Char
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Null => Ok(char::default()),
            Value::Char(c) => Ok(c),
            Value::Str(ref s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(Mismatch::new::<char>(&value)),
                }
            }
            other => Err(Mismatch::new::<char>(&other)),
        }
    }

    fn key_part(&self) -> Option<KeyPart> {
        Some(KeyPart::Char(*self))
    }
}

impl ColumnValue for Uuid {
    fn column_type() -> ColumnType {
        ColumnType::Uuid
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Null => Ok(Uuid::nil()),
            Value::Uuid(u) => Ok(u),
            Value::Str(ref s) => Uuid::parse_str(s).map_err(|_| Mismatch::new::<Uuid>(&value)),
            other => Err(Mismatch::new::<Uuid>(&other)),
        }
    }

    fn key_part(&self) -> Option<KeyPart> {
        Some(KeyPart::Uuid(*self))
    }
}

impl ColumnValue for Decimal {
    fn column_type() -> ColumnType {
        ColumnType::Decimal
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Null => Ok(Decimal::ZERO),
            Value::Decimal(d) => Ok(d),
            ref other => other
                .as_i128()
                .and_then(|v| i64::try_from(v).ok())
                .map(Decimal::from)
                .ok_or_else(|| Mismatch::new::<Decimal>(other)),
        }
    }

    fn key_part(&self) -> Option<KeyPart> {
        None
    }
}

impl ColumnValue for NaiveDateTime {
    fn column_type() -> ColumnType {
        ColumnType::DateTime
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Null => Ok(NaiveDateTime::default()),
            Value::DateTime(dt) => Ok(dt),
            Value::Str(ref s) => s
                .parse::<NaiveDateTime>()
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                .map_err(|_| Mismatch::new::<NaiveDateTime>(&value)),
            other => Err(Mismatch::new::<NaiveDateTime>(&other)),
        }
    }

    fn key_part(&self) -> Option<KeyPart> {
        Some(KeyPart::DateTime(*self))
    }
}

impl ColumnValue for Vec<u8> {
    fn column_type() -> ColumnType {
        ColumnType::Bytes
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(Mismatch::new::<Vec<u8>>(&other)),
        }
    }

    fn key_part(&self) -> Option<KeyPart> {
        Some(KeyPart::Bytes(self.clone()))
    }
}

impl ColumnValue for Vec<char> {
    fn column_type() -> ColumnType {
        ColumnType::Chars
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Chars(chars) => Ok(chars),
            Value::Str(s) => Ok(s.chars().collect()),
            other => Err(Mismatch::new::<Vec<char>>(&other)),
        }
    }

    fn key_part(&self) -> Option<KeyPart> {
        None
    }
}

impl<T: ColumnValue> ColumnValue for Option<T> {
    fn column_type() -> ColumnType {
        T::column_type()
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value).map(Some)
    }

    fn key_part(&self) -> Option<KeyPart> {
        match self {
            Some(inner) => inner.key_part(),
            None => Some(KeyPart::Null),
        }
    }
}

/// The dynamic value itself: used for untyped scalar reads.
impl ColumnValue for Value {
    fn column_type() -> ColumnType {
        ColumnType::Other("value".to_string())
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        Ok(value)
    }

    fn key_part(&self) -> Option<KeyPart> {
        None
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<char>> for Value {
    fn from(v: Vec<char>) -> Self {
        Value::Chars(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
