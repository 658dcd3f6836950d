//! Type classification table.
//!
//! Maps a column's declared type to the function that pulls its value out of
//! the cursor. Materializers classify each column once, on the first row, and
//! replay the chosen function by position for every later row.
//!
//! Unknown declared types classify to `None`: callers drop such columns from
//! their results instead of failing.

use std::io::Read;

use tracing::debug;

use crate::cursor::{read_columns, Column, ColumnType, Cursor, CursorError};
use crate::value::Value;

/// Reads one column of the current row. Null columns yield `Value::Null`.
pub type ExtractFn = fn(&dyn Cursor, usize) -> Result<Value, CursorError>;

macro_rules! extractor {
    ($getter:ident => $variant:ident) => {
        |cursor: &dyn Cursor, index: usize| -> Result<Value, CursorError> {
            if cursor.is_null(index)? {
                return Ok(Value::Null);
            }
            cursor.$getter(index).map(Value::$variant)
        }
    };
}

fn extract_char(cursor: &dyn Cursor, index: usize) -> Result<Value, CursorError> {
    if cursor.is_null(index)? {
        return Ok(Value::Null);
    }
    // No driver-neutral char accessor: decode a length-1 string
    let text = cursor.get_str(index)?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Char(c)),
        _ => Err(CursorError::TypeMismatch {
            index,
            expected: "char",
            found: "str",
        }),
    }
}

fn extract_chars(cursor: &dyn Cursor, index: usize) -> Result<Value, CursorError> {
    if cursor.is_null(index)? {
        return Ok(Value::Null);
    }
    Ok(Value::Chars(cursor.get_str(index)?.chars().collect()))
}

fn extract_stream(cursor: &dyn Cursor, index: usize) -> Result<Value, CursorError> {
    if cursor.is_null(index)? {
        return Ok(Value::Null);
    }
    // Copy eagerly: the stream is invalid once the cursor moves on
    let mut buffer = Vec::new();
    cursor
        .get_stream(index)?
        .read_to_end(&mut buffer)
        .map_err(|source| CursorError::Io { index, source })?;
    Ok(Value::Bytes(buffer))
}

/// Looks up the extraction function for a declared column type.
pub fn classify(column_type: &ColumnType) -> Option<ExtractFn> {
    let extract: ExtractFn = match column_type {
        ColumnType::Str => extractor!(get_str => Str),
        ColumnType::I8 => extractor!(get_i8 => I8),
        ColumnType::I16 => extractor!(get_i16 => I16),
        ColumnType::I32 => extractor!(get_i32 => I32),
        ColumnType::I64 => extractor!(get_i64 => I64),
        ColumnType::U8 => extractor!(get_u8 => U8),
        ColumnType::U16 => extractor!(get_u16 => U16),
        ColumnType::U32 => extractor!(get_u32 => U32),
        ColumnType::U64 => extractor!(get_u64 => U64),
        ColumnType::F32 => extractor!(get_f32 => F32),
        ColumnType::F64 => extractor!(get_f64 => F64),
        ColumnType::Decimal => extractor!(get_decimal => Decimal),
        ColumnType::Bool => extractor!(get_bool => Bool),
        ColumnType::DateTime => extractor!(get_datetime => DateTime),
        ColumnType::Uuid => extractor!(get_uuid => Uuid),
        ColumnType::Bytes => extractor!(get_bytes => Bytes),
        ColumnType::Char => extract_char,
        ColumnType::Chars => extract_chars,
        ColumnType::Stream => extract_stream,
        ColumnType::Other(_) => return None,
    };
    Some(extract)
}

/// A column of the current result set together with its extraction function.
#[derive(Debug, Clone)]
pub struct ClassifiedColumn {
    pub column: Column,
    pub extract: ExtractFn,
}

impl ClassifiedColumn {
    pub fn read(&self, cursor: &dyn Cursor) -> Result<Value, CursorError> {
        (self.extract)(cursor, self.column.ordinal)
    }
}

/// Classifies every column of the current result set, dropping the ones the
/// table does not recognize. Call once, after the first row is available.
pub fn classify_columns(cursor: &dyn Cursor) -> Result<Vec<ClassifiedColumn>, CursorError> {
    let columns = read_columns(cursor)?;
    let mut classified = Vec::with_capacity(columns.len());
    for column in columns {
        match classify(&column.column_type) {
            Some(extract) => classified.push(ClassifiedColumn { column, extract }),
            None => debug!(
                column = %column.name,
                ordinal = column.ordinal,
                declared_type = %column.column_type,
                "skipping column with unrecognized type"
            ),
        }
    }
    Ok(classified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{MemoryCursor, ResultSet};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    #[fixture]
    fn mixed_row() -> MemoryCursor {
        let mut cursor = MemoryCursor::new(vec![ResultSet::new(vec![
            ("Name", ColumnType::Str),
            ("Age", ColumnType::I16),
            ("Grade", ColumnType::Char),
            ("Blob", ColumnType::Stream),
            ("Shape", ColumnType::Other("geometry".into())),
            ("Missing", ColumnType::I64),
            ("Uid", ColumnType::Uuid),
        ])
        .with_row(vec![
            "ann".into(),
            Value::I16(41),
            "B".into(),
            Value::Bytes(vec![9, 8]),
            "POINT(0 0)".into(),
            Value::Null,
            Value::Uuid(Uuid::from_u128(5)),
        ])]);
        cursor.advance().unwrap();
        cursor
    }

    #[rstest]
    fn test_classify_known_types(mixed_row: MemoryCursor) {
        let extract = classify(&ColumnType::I16).unwrap();
        assert_eq!(extract(&mixed_row, 1).unwrap(), Value::I16(41));

        let extract = classify(&ColumnType::Uuid).unwrap();
        assert_eq!(extract(&mixed_row, 6).unwrap(), Value::Uuid(Uuid::from_u128(5)));
    }

    #[rstest]
    fn test_classify_unknown_type_is_none() {
        assert!(classify(&ColumnType::Other("geometry".into())).is_none());
    }

    #[rstest]
    fn test_null_column_extracts_null(mixed_row: MemoryCursor) {
        let extract = classify(&ColumnType::I64).unwrap();
        assert_eq!(extract(&mixed_row, 5).unwrap(), Value::Null);
    }

    #[rstest]
    fn test_char_decoded_from_string(mixed_row: MemoryCursor) {
        let extract = classify(&ColumnType::Char).unwrap();
        assert_eq!(extract(&mixed_row, 2).unwrap(), Value::Char('B'));
        // A multi-character string is not a char
        assert!(matches!(
            extract(&mixed_row, 0),
            Err(CursorError::TypeMismatch { expected: "char", .. })
        ));
    }

    #[rstest]
    fn test_stream_copied_into_buffer(mixed_row: MemoryCursor) {
        let extract = classify(&ColumnType::Stream).unwrap();
        assert_eq!(extract(&mixed_row, 3).unwrap(), Value::Bytes(vec![9, 8]));
    }

    #[rstest]
    fn test_classification_is_repeatable(mixed_row: MemoryCursor) {
        let first = classify(&ColumnType::Str).unwrap();
        let second = classify(&ColumnType::Str).unwrap();
        assert_eq!(first(&mixed_row, 0).unwrap(), second(&mixed_row, 0).unwrap());
    }

    #[rstest]
    fn test_classify_columns_drops_unknown(mixed_row: MemoryCursor) {
        let classified = classify_columns(&mixed_row).unwrap();
        let names: Vec<_> = classified.iter().map(|c| c.column.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Age", "Grade", "Blob", "Missing", "Uid"]);
        assert_eq!(classified[1].read(&mixed_row).unwrap(), Value::I16(41));
    }
}
