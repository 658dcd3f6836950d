//! Forward-only cursor abstraction consumed by every materializer.
//!
//! The connection layer (drivers, pooling, transactions) lives outside this
//! crate. It hands the materializers something implementing [`Cursor`]: a
//! reader that can advance rows and result sets, describe columns, and read a
//! typed or null value at a column position.
//!
//! # Contract
//!
//! - Column names and declared types are only guaranteed after the first row
//!   has been reached with [`Cursor::advance`].
//! - The declared type of a column position is stable for the lifetime of a
//!   result set. Materializers rely on this to classify each column once.
//! - A cursor is owned exclusively by one materializer call at a time.

pub mod memory;

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use memory::{ColumnDef, MemoryCursor, ResultSet};

/// Errors reported by a cursor implementation.
#[derive(Error, Debug)]
pub enum CursorError {
    #[error("Column {index} out of range (result set has {count} columns)")]
    OutOfRange { index: usize, count: usize },

    #[error("No current row; advance the cursor first")]
    NoCurrentRow,

    #[error("Column {index} holds {found}, not {expected}")]
    TypeMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Column {index} is null")]
    NullValue { index: usize },

    #[error("Cursor is closed")]
    Closed,

    #[error("Failed to read stream at column {index}: {source}")]
    Io {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Driver error: {message}")]
    Driver { message: String },
}

/// Declared type of a result-set column.
///
/// Nullable columns share the entry of their base type: every extraction
/// checks [`Cursor::is_null`] first and yields `Value::Null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    Str,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    Bool,
    DateTime,
    Char,
    Uuid,
    Bytes,
    Chars,
    Stream,
    /// A driver-specific type the classification table does not know.
    Other(String),
}

impl ColumnType {
    /// Canonical lower-case name, as used in JSON result-set documents.
    pub fn name(&self) -> &str {
        match self {
            ColumnType::Str => "str",
            ColumnType::I8 => "i8",
            ColumnType::I16 => "i16",
            ColumnType::I32 => "i32",
            ColumnType::I64 => "i64",
            ColumnType::U8 => "u8",
            ColumnType::U16 => "u16",
            ColumnType::U32 => "u32",
            ColumnType::U64 => "u64",
            ColumnType::F32 => "f32",
            ColumnType::F64 => "f64",
            ColumnType::Decimal => "decimal",
            ColumnType::Bool => "bool",
            ColumnType::DateTime => "datetime",
            ColumnType::Char => "char",
            ColumnType::Uuid => "uuid",
            ColumnType::Bytes => "bytes",
            ColumnType::Chars => "chars",
            ColumnType::Stream => "stream",
            ColumnType::Other(name) => name,
        }
    }

    /// Whether members of this type may take part in an identity key.
    ///
    /// Keys are limited to primitives, strings, uuids, byte arrays and
    /// date/times so equality across joined rows stays cheap and well defined.
    pub fn is_key_compatible(&self) -> bool {
        !matches!(
            self,
            ColumnType::Decimal | ColumnType::Chars | ColumnType::Stream | ColumnType::Other(_)
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColumnType {
    type Err = std::convert::Infallible;

    /// Unknown names become [`ColumnType::Other`] rather than failing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let column_type = match s.to_ascii_lowercase().as_str() {
            "str" | "string" | "text" | "varchar" => ColumnType::Str,
            "i8" => ColumnType::I8,
            "i16" => ColumnType::I16,
            "i32" => ColumnType::I32,
            "i64" => ColumnType::I64,
            "u8" => ColumnType::U8,
            "u16" => ColumnType::U16,
            "u32" => ColumnType::U32,
            "u64" => ColumnType::U64,
            "f32" => ColumnType::F32,
            "f64" => ColumnType::F64,
            "decimal" => ColumnType::Decimal,
            "bool" | "boolean" => ColumnType::Bool,
            "datetime" | "timestamp" => ColumnType::DateTime,
            "char" => ColumnType::Char,
            "uuid" | "guid" => ColumnType::Uuid,
            "bytes" | "blob" => ColumnType::Bytes,
            "chars" => ColumnType::Chars,
            "stream" => ColumnType::Stream,
            _ => ColumnType::Other(s.to_string()),
        };
        Ok(column_type)
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(column_type) => column_type,
            Err(never) => match never {},
        }
    }
}

impl From<ColumnType> for String {
    fn from(column_type: ColumnType) -> Self {
        column_type.name().to_string()
    }
}

/// Description of one column of the current result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub ordinal: usize,
    pub name: String,
    pub column_type: ColumnType,
}

/// Forward-only, single-pass reader over one or more tabular result sets.
///
/// Implemented by the connection layer. Values are read from the current row;
/// getters fail with [`CursorError::NullValue`] on null columns, so callers
/// check [`Cursor::is_null`] first.
pub trait Cursor {
    /// Moves to the next row of the current result set.
    fn advance(&mut self) -> Result<bool, CursorError>;

    /// Moves to the next result set, positioned before its first row.
    fn next_result_set(&mut self) -> Result<bool, CursorError>;

    /// Number of columns in the current result set.
    fn column_count(&self) -> usize;

    fn column_name(&self, index: usize) -> Result<&str, CursorError>;

    fn column_type(&self, index: usize) -> Result<ColumnType, CursorError>;

    fn is_null(&self, index: usize) -> Result<bool, CursorError>;

    fn get_str(&self, index: usize) -> Result<String, CursorError>;
    fn get_i8(&self, index: usize) -> Result<i8, CursorError>;
    fn get_i16(&self, index: usize) -> Result<i16, CursorError>;
    fn get_i32(&self, index: usize) -> Result<i32, CursorError>;
    fn get_i64(&self, index: usize) -> Result<i64, CursorError>;
    fn get_u8(&self, index: usize) -> Result<u8, CursorError>;
    fn get_u16(&self, index: usize) -> Result<u16, CursorError>;
    fn get_u32(&self, index: usize) -> Result<u32, CursorError>;
    fn get_u64(&self, index: usize) -> Result<u64, CursorError>;
    fn get_f32(&self, index: usize) -> Result<f32, CursorError>;
    fn get_f64(&self, index: usize) -> Result<f64, CursorError>;
    fn get_decimal(&self, index: usize) -> Result<Decimal, CursorError>;
    fn get_bool(&self, index: usize) -> Result<bool, CursorError>;
    fn get_datetime(&self, index: usize) -> Result<NaiveDateTime, CursorError>;
    fn get_uuid(&self, index: usize) -> Result<Uuid, CursorError>;
    fn get_bytes(&self, index: usize) -> Result<Vec<u8>, CursorError>;

    /// Opens a binary stream over a column.
    ///
    /// The stream is only valid for the current row.
    fn get_stream(&self, index: usize) -> Result<Box<dyn Read + '_>, CursorError>;

    /// A closed cursor cannot be read; materializers refuse it up front.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Describes every column of the current result set.
///
/// Only meaningful once the cursor sits on a row.
pub fn read_columns(cursor: &dyn Cursor) -> Result<Vec<Column>, CursorError> {
    (0..cursor.column_count())
        .map(|ordinal| {
            Ok(Column {
                ordinal,
                name: cursor.column_name(ordinal)?.to_string(),
                column_type: cursor.column_type(ordinal)?,
            })
        })
        .collect()
}
