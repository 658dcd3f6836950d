//! In-memory cursor over owned result sets.
//!
//! Behaves like a strict driver: typed getters require the exact stored type
//! and refuse nulls. Result sets can be built in code or loaded from a JSON
//! document:
//!
//! ```json
//! {"result_sets": [{"columns": [{"name": "Id", "type": "i64"}], "rows": [[1], [2]]}]}
//! ```

use std::io::Read;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::{ColumnType, Cursor, CursorError};
use crate::value::Value;

/// Column definition of an in-memory result set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// One result set: column definitions plus rows of values.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    columns: Vec<ColumnDef>,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new<S: Into<String>>(columns: Vec<(S, ColumnType)>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, column_type)| ColumnDef {
                    name: name.into(),
                    column_type,
                })
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Missing trailing cells are read as null.
    pub fn with_row(mut self, row: Vec<Value>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}

#[derive(Deserialize)]
struct JsonDocument {
    result_sets: Vec<JsonResultSet>,
}

#[derive(Deserialize)]
struct JsonResultSet {
    columns: Vec<ColumnDef>,
    #[serde(default)]
    rows: Vec<Vec<serde_json::Value>>,
}

static NULL_CELL: Value = Value::Null;

/// Cursor over a list of [`ResultSet`]s, positioned before the first row of
/// the first set.
#[derive(Debug, Default)]
pub struct MemoryCursor {
    result_sets: Vec<ResultSet>,
    set_index: usize,
    row_index: Option<usize>,
    closed: bool,
}

impl MemoryCursor {
    pub fn new(result_sets: Vec<ResultSet>) -> Self {
        Self {
            result_sets,
            set_index: 0,
            row_index: None,
            closed: false,
        }
    }

    /// Loads result sets from a JSON document.
    ///
    /// Cells are converted according to their column's declared type; bytes
    /// and streams are hex strings, uuids, decimals and date/times are strings.
    pub fn from_json_str(json: &str) -> Result<Self, CursorError> {
        let document: JsonDocument = serde_json::from_str(json).map_err(|e| CursorError::Driver {
            message: format!("Invalid result set document: {}", e),
        })?;

        let result_sets = document
            .result_sets
            .into_iter()
            .map(|set| {
                let rows = set
                    .rows
                    .iter()
                    .map(|cells| {
                        cells
                            .iter()
                            .enumerate()
                            .map(|(index, cell)| {
                                let column_type = set
                                    .columns
                                    .get(index)
                                    .map(|c| &c.column_type)
                                    .ok_or(CursorError::OutOfRange {
                                        index,
                                        count: set.columns.len(),
                                    })?;
                                value_from_json(cell, column_type)
                            })
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok::<_, CursorError>(ResultSet {
                    columns: set.columns,
                    rows,
                })
            })
            .collect::<Result<Vec<_>, CursorError>>()?;

        Ok(Self::new(result_sets))
    }

    /// Closes the cursor; later reads fail and materializers refuse it.
    pub fn close(&mut self) {
        self.closed = true;
    }

    fn current_set(&self) -> Option<&ResultSet> {
        self.result_sets.get(self.set_index)
    }

    fn cell(&self, index: usize) -> Result<&Value, CursorError> {
        if self.closed {
            return Err(CursorError::Closed);
        }
        let set = self.current_set().ok_or(CursorError::NoCurrentRow)?;
        if index >= set.columns.len() {
            return Err(CursorError::OutOfRange {
                index,
                count: set.columns.len(),
            });
        }
        let row = self
            .row_index
            .and_then(|r| set.rows.get(r))
            .ok_or(CursorError::NoCurrentRow)?;
        Ok(row.get(index).unwrap_or(&NULL_CELL))
    }
}

/// Converts one JSON cell according to the declared column type.
fn value_from_json(cell: &serde_json::Value, column_type: &ColumnType) -> Result<Value, CursorError> {
    use serde_json::Value as Json;

    if cell.is_null() {
        return Ok(Value::Null);
    }

    let invalid = || CursorError::Driver {
        message: format!("Cannot read {} as {}", cell, column_type),
    };
    let int = || cell.as_i64().ok_or_else(invalid);
    let uint = || cell.as_u64().ok_or_else(invalid);
    let text = || cell.as_str().ok_or_else(invalid);

    let value = match column_type {
        ColumnType::Str => Value::Str(text()?.to_string()),
        ColumnType::I8 => Value::I8(i8::try_from(int()?).map_err(|_| invalid())?),
        ColumnType::I16 => Value::I16(i16::try_from(int()?).map_err(|_| invalid())?),
        ColumnType::I32 => Value::I32(i32::try_from(int()?).map_err(|_| invalid())?),
        ColumnType::I64 => Value::I64(int()?),
        ColumnType::U8 => Value::U8(u8::try_from(uint()?).map_err(|_| invalid())?),
        ColumnType::U16 => Value::U16(u16::try_from(uint()?).map_err(|_| invalid())?),
        ColumnType::U32 => Value::U32(u32::try_from(uint()?).map_err(|_| invalid())?),
        ColumnType::U64 => Value::U64(uint()?),
        ColumnType::F32 => Value::F32(cell.as_f64().ok_or_else(invalid)? as f32),
        ColumnType::F64 => Value::F64(cell.as_f64().ok_or_else(invalid)?),
        ColumnType::Decimal => match cell {
            Json::String(s) => Value::Decimal(s.parse::<Decimal>().map_err(|_| invalid())?),
            Json::Number(n) => Value::Decimal(n.to_string().parse::<Decimal>().map_err(|_| invalid())?),
            _ => return Err(invalid()),
        },
        ColumnType::Bool => Value::Bool(cell.as_bool().ok_or_else(invalid)?),
        ColumnType::DateTime => Value::DateTime(
            text()?
                .parse::<NaiveDateTime>()
                .map_err(|_| invalid())?,
        ),
        // Characters travel as strings; the char accessor is decoded from them
        ColumnType::Char | ColumnType::Chars => Value::Str(text()?.to_string()),
        ColumnType::Uuid => Value::Uuid(Uuid::parse_str(text()?).map_err(|_| invalid())?),
        ColumnType::Bytes | ColumnType::Stream => {
            Value::Bytes(hex::decode(text()?).map_err(|_| invalid())?)
        }
        ColumnType::Other(_) => match cell {
            Json::String(s) => Value::Str(s.clone()),
            other => Value::Str(other.to_string()),
        },
    };
    Ok(value)
}

macro_rules! strict_getter {
    ($($method:ident -> $ty:ty : $variant:ident),* $(,)?) => {$(
        fn $method(&self, index: usize) -> Result<$ty, CursorError> {
            match self.cell(index)? {
                Value::$variant(v) => Ok(v.clone()),
                Value::Null => Err(CursorError::NullValue { index }),
                other => Err(CursorError::TypeMismatch {
                    index,
                    expected: stringify!($ty),
                    found: other.type_name(),
                }),
            }
        }
    )*};
}

impl Cursor for MemoryCursor {
    fn advance(&mut self) -> Result<bool, CursorError> {
        if self.closed {
            return Err(CursorError::Closed);
        }
        let Some(set) = self.current_set() else {
            return Ok(false);
        };
        let next = self.row_index.map_or(0, |r| r + 1);
        if next < set.rows.len() {
            self.row_index = Some(next);
            Ok(true)
        } else {
            // Park after the last row so further advances stay false
            self.row_index = Some(set.rows.len());
            Ok(false)
        }
    }

    fn next_result_set(&mut self) -> Result<bool, CursorError> {
        if self.closed {
            return Err(CursorError::Closed);
        }
        if self.set_index + 1 < self.result_sets.len() {
            self.set_index += 1;
            self.row_index = None;
            Ok(true)
        } else {
            self.set_index = self.result_sets.len();
            Ok(false)
        }
    }

    fn column_count(&self) -> usize {
        self.current_set().map_or(0, |set| set.columns.len())
    }

    fn column_name(&self, index: usize) -> Result<&str, CursorError> {
        let set = self.current_set().ok_or(CursorError::NoCurrentRow)?;
        set.columns
            .get(index)
            .map(|c| c.name.as_str())
            .ok_or(CursorError::OutOfRange {
                index,
                count: set.columns.len(),
            })
    }

    fn column_type(&self, index: usize) -> Result<ColumnType, CursorError> {
        let set = self.current_set().ok_or(CursorError::NoCurrentRow)?;
        set.columns
            .get(index)
            .map(|c| c.column_type.clone())
            .ok_or(CursorError::OutOfRange {
                index,
                count: set.columns.len(),
            })
    }

    fn is_null(&self, index: usize) -> Result<bool, CursorError> {
        Ok(self.cell(index)?.is_null())
    }

    strict_getter! {
        get_str -> String: Str,
        get_i8 -> i8: I8,
        get_i16 -> i16: I16,
        get_i32 -> i32: I32,
        get_i64 -> i64: I64,
        get_u8 -> u8: U8,
        get_u16 -> u16: U16,
        get_u32 -> u32: U32,
        get_u64 -> u64: U64,
        get_f32 -> f32: F32,
        get_f64 -> f64: F64,
        get_decimal -> Decimal: Decimal,
        get_bool -> bool: Bool,
        get_datetime -> NaiveDateTime: DateTime,
        get_uuid -> Uuid: Uuid,
        get_bytes -> Vec<u8>: Bytes,
    }

    fn get_stream(&self, index: usize) -> Result<Box<dyn Read + '_>, CursorError> {
        match self.cell(index)? {
            Value::Bytes(bytes) => Ok(Box::new(bytes.as_slice())),
            Value::Null => Err(CursorError::NullValue { index }),
            other => Err(CursorError::TypeMismatch {
                index,
                expected: "stream",
                found: other.type_name(),
            }),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn two_sets() -> MemoryCursor {
        MemoryCursor::new(vec![
            ResultSet::new(vec![("Id", ColumnType::I32)])
                .with_row(vec![Value::I32(1)])
                .with_row(vec![Value::Null]),
            ResultSet::new(vec![("Name", ColumnType::Str)]).with_row(vec!["x".into()]),
        ])
    }

    #[rstest]
    fn test_advance_walks_rows_then_stops() {
        let mut cursor = two_sets();
        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.get_i32(0).unwrap(), 1);
        assert!(cursor.advance().unwrap());
        assert!(cursor.is_null(0).unwrap());
        assert!(!cursor.advance().unwrap());
        assert!(!cursor.advance().unwrap());
    }

    #[rstest]
    fn test_next_result_set_switches_columns() {
        let mut cursor = two_sets();
        assert!(cursor.next_result_set().unwrap());
        assert_eq!(cursor.column_name(0).unwrap(), "Name");
        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.get_str(0).unwrap(), "x");
        assert!(!cursor.next_result_set().unwrap());
        assert_eq!(cursor.column_count(), 0);
        assert!(!cursor.advance().unwrap());
    }

    #[rstest]
    fn test_strict_getters() {
        let mut cursor = two_sets();
        cursor.advance().unwrap();
        assert!(matches!(
            cursor.get_i64(0),
            Err(CursorError::TypeMismatch { expected: "i64", found: "i32", .. })
        ));
        cursor.advance().unwrap();
        assert!(matches!(cursor.get_i32(0), Err(CursorError::NullValue { index: 0 })));
        assert!(matches!(cursor.get_i32(3), Err(CursorError::OutOfRange { index: 3, count: 1 })));
    }

    #[rstest]
    fn test_read_before_advance_has_no_row() {
        let cursor = two_sets();
        assert!(matches!(cursor.get_i32(0), Err(CursorError::NoCurrentRow)));
    }

    #[rstest]
    fn test_closed_cursor_refuses_reads() {
        let mut cursor = two_sets();
        cursor.close();
        assert!(cursor.is_closed());
        assert!(matches!(cursor.advance(), Err(CursorError::Closed)));
    }

    #[rstest]
    fn test_stream_reads_bytes() {
        let mut cursor = MemoryCursor::new(vec![
            ResultSet::new(vec![("Blob", ColumnType::Stream)]).with_row(vec![Value::Bytes(vec![1, 2, 3])]),
        ]);
        cursor.advance().unwrap();
        let mut buffer = Vec::new();
        cursor.get_stream(0).unwrap().read_to_end(&mut buffer).unwrap();
        assert_eq!(buffer, vec![1, 2, 3]);
    }

    #[rstest]
    fn test_from_json_converts_cells_by_declared_type() {
        let json = r#"{
            "result_sets": [{
                "columns": [
                    {"name": "Id", "type": "u16"},
                    {"name": "Blob", "type": "bytes"},
                    {"name": "Uid", "type": "uuid"},
                    {"name": "At", "type": "datetime"},
                    {"name": "Price", "type": "decimal"},
                    {"name": "Shape", "type": "geometry"}
                ],
                "rows": [[7, "0aff", "00000000-0000-0000-0000-000000000001", "2024-01-02T03:04:05", "1.50", {"x": 1}]]
            }]
        }"#;
        let mut cursor = MemoryCursor::from_json_str(json).unwrap();
        cursor.advance().unwrap();

        assert_eq!(cursor.get_u16(0).unwrap(), 7);
        assert_eq!(cursor.get_bytes(1).unwrap(), vec![0x0a, 0xff]);
        assert_eq!(cursor.get_uuid(2).unwrap(), Uuid::from_u128(1));
        assert_eq!(cursor.get_datetime(3).unwrap().to_string(), "2024-01-02 03:04:05");
        assert_eq!(cursor.get_decimal(4).unwrap().to_string(), "1.50");
        assert_eq!(cursor.column_type(5).unwrap(), ColumnType::Other("geometry".into()));
        assert_eq!(cursor.get_str(5).unwrap(), r#"{"x":1}"#);
    }

    #[rstest]
    fn test_from_json_rejects_mismatched_cells() {
        let json = r#"{"result_sets": [{"columns": [{"name": "Id", "type": "i8"}], "rows": [[1000]]}]}"#;
        assert!(matches!(
            MemoryCursor::from_json_str(json),
            Err(CursorError::Driver { .. })
        ));
    }
}
