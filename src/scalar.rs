//! Scalar parsers: one value per row, read from column 0.
//!
//! Every [`ColumnValue`] type has a parser: primitives, `Option`s of them,
//! strings, byte and char arrays, and the dynamic [`Value`](crate::value::Value).
//! Other columns of the row are ignored. A null column yields the type's
//! default; only [`parse_one`]'s flag tells "no row" apart from "null row".

use std::marker::PhantomData;

use tracing::debug;

use crate::classify::{classify, ExtractFn};
use crate::cursor::{Cursor, CursorError};
use crate::error::MaterializeError;
use crate::value::{ColumnValue, Value};

/// Fallback for declared types the table does not know: read them as text.
fn read_as_string(cursor: &dyn Cursor, index: usize) -> Result<Value, CursorError> {
    if cursor.is_null(index)? {
        return Ok(Value::Null);
    }
    cursor.get_str(index).map(Value::Str)
}

/// Picks the extraction for column 0: its declared type first, then the
/// destination's natural type, then a plain string read.
fn resolve_extract<T: ColumnValue>(cursor: &dyn Cursor) -> Result<ExtractFn, MaterializeError> {
    let declared = cursor.column_type(0)?;
    Ok(classify(&declared)
        .or_else(|| classify(&T::column_type()))
        .unwrap_or(read_as_string))
}

fn read_scalar<T: ColumnValue>(cursor: &dyn Cursor, extract: ExtractFn) -> Result<T, MaterializeError> {
    let value = extract(cursor, 0)?;
    T::from_value(value).map_err(|mismatch| {
        let member = cursor.column_name(0).unwrap_or("column 0").to_string();
        MaterializeError::conversion(member, mismatch.expected, mismatch.found)
    })
}

/// Lazy, single-pass sequence over column 0 of each remaining row.
///
/// Advancing the iterator advances the cursor; once exhausted, a second
/// sequence over the same cursor is empty.
pub struct ScalarIter<'c, T> {
    cursor: &'c mut dyn Cursor,
    extract: Option<ExtractFn>,
    rows: usize,
    done: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ColumnValue> ScalarIter<'_, T> {
    fn finish(&mut self) {
        if !self.done {
            self.done = true;
            debug!(rows = self.rows, "scalar sequence exhausted");
        }
    }
}

impl<T: ColumnValue> Iterator for ScalarIter<'_, T> {
    type Item = Result<T, MaterializeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.advance() {
            Ok(true) => {}
            Ok(false) => {
                self.finish();
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        }
        if self.cursor.column_count() == 0 {
            self.finish();
            return None;
        }

        let extract = match self.extract {
            Some(extract) => extract,
            None => match resolve_extract::<T>(&*self.cursor) {
                Ok(extract) => *self.extract.insert(extract),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            },
        };
        self.rows += 1;
        Some(read_scalar(&*self.cursor, extract))
    }
}

/// Starts a lazy sequence of scalars. Fails immediately on a closed cursor.
pub fn parse_all<T: ColumnValue>(cursor: &mut dyn Cursor) -> Result<ScalarIter<'_, T>, MaterializeError> {
    if cursor.is_closed() {
        return Err(MaterializeError::CursorClosed);
    }
    Ok(ScalarIter {
        cursor,
        extract: None,
        rows: 0,
        done: false,
        _marker: PhantomData,
    })
}

/// Reads column 0 of the next row.
///
/// Returns `(false, T::default())` when there is no row.
pub fn parse_one<T: ColumnValue>(cursor: &mut dyn Cursor) -> Result<(bool, T), MaterializeError> {
    if cursor.is_closed() {
        return Err(MaterializeError::CursorClosed);
    }
    if !cursor.advance()? || cursor.column_count() == 0 {
        return Ok((false, T::default()));
    }
    let extract = resolve_extract::<T>(&*cursor)?;
    Ok((true, read_scalar(&*cursor, extract)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{ColumnType, MemoryCursor, ResultSet};
    use rstest::{fixture, rstest};

    #[fixture]
    fn ids() -> MemoryCursor {
        MemoryCursor::new(vec![
            ResultSet::new(vec![("Id", ColumnType::I32), ("Ignored", ColumnType::Str)])
                .with_row(vec![Value::I32(3), "x".into()])
                .with_row(vec![Value::Null, "y".into()])
                .with_row(vec![Value::I32(5), Value::Null]),
        ])
    }

    #[rstest]
    fn test_parse_all_reads_column_zero(mut ids: MemoryCursor) {
        let values: Vec<i64> = parse_all::<i64>(&mut ids)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(values, vec![3, 0, 5]);
    }

    #[rstest]
    fn test_parse_all_nullable(mut ids: MemoryCursor) {
        let values: Vec<Option<i32>> = parse_all(&mut ids).unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(values, vec![Some(3), None, Some(5)]);
    }

    #[rstest]
    fn test_parse_all_is_single_pass(mut ids: MemoryCursor) {
        let first: Vec<i32> = parse_all(&mut ids).unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(first.len(), 3);
        let second: Vec<i32> = parse_all(&mut ids).unwrap().collect::<Result<_, _>>().unwrap();
        assert!(second.is_empty());
    }

    #[rstest]
    fn test_parse_all_is_lazy(mut ids: MemoryCursor) {
        {
            let mut sequence = parse_all::<i32>(&mut ids).unwrap();
            assert_eq!(sequence.next().unwrap().unwrap(), 3);
        }
        // Only one row was consumed
        assert_eq!(parse_one::<i32>(&mut ids).unwrap(), (true, 0));
    }

    #[rstest]
    fn test_parse_one_distinguishes_no_row_from_null() {
        let mut null_row = MemoryCursor::new(vec![
            ResultSet::new(vec![("Id", ColumnType::I32)]).with_row(vec![Value::Null]),
        ]);
        assert_eq!(parse_one::<i32>(&mut null_row).unwrap(), (true, 0));
        assert_eq!(parse_one::<i32>(&mut null_row).unwrap(), (false, 0));
    }

    #[rstest]
    fn test_single_matches_first_of_all() {
        let build = || {
            MemoryCursor::new(vec![
                ResultSet::new(vec![("Name", ColumnType::Str)])
                    .with_row(vec!["a".into()])
                    .with_row(vec!["b".into()]),
            ])
        };
        let all: Vec<String> = parse_all(&mut build()).unwrap().collect::<Result<_, _>>().unwrap();
        let (found, single) = parse_one::<String>(&mut build()).unwrap();
        assert!(found);
        assert_eq!(single, all[0]);
    }

    #[rstest]
    fn test_closed_cursor_fails_fast(mut ids: MemoryCursor) {
        ids.close();
        assert!(matches!(parse_all::<i32>(&mut ids), Err(MaterializeError::CursorClosed)));
        assert!(matches!(parse_one::<i32>(&mut ids), Err(MaterializeError::CursorClosed)));
    }

    #[rstest]
    fn test_conversion_error_names_column() {
        let mut cursor = MemoryCursor::new(vec![
            ResultSet::new(vec![("Label", ColumnType::Str)]).with_row(vec!["abc".into()]),
        ]);
        let err = parse_one::<i32>(&mut cursor).unwrap_err();
        assert!(matches!(err, MaterializeError::Conversion { ref member, .. } if member == "Label"));
    }

    #[rstest]
    fn test_byte_and_char_arrays() {
        let mut cursor = MemoryCursor::new(vec![
            ResultSet::new(vec![("Blob", ColumnType::Bytes)]).with_row(vec![Value::Bytes(vec![1, 2])]),
            ResultSet::new(vec![("Text", ColumnType::Chars)]).with_row(vec!["hi".into()]),
        ]);
        assert_eq!(parse_one::<Vec<u8>>(&mut cursor).unwrap(), (true, vec![1, 2]));
        assert!(cursor.next_result_set().unwrap());
        assert_eq!(parse_one::<Vec<char>>(&mut cursor).unwrap(), (true, vec!['h', 'i']));
    }

    #[rstest]
    fn test_dynamic_value_from_unknown_type() {
        let mut cursor = MemoryCursor::new(vec![
            ResultSet::new(vec![("Shape", ColumnType::Other("geometry".into()))])
                .with_row(vec!["POINT(1 2)".into()]),
        ]);
        assert_eq!(
            parse_one::<Value>(&mut cursor).unwrap(),
            (true, Value::Str("POINT(1 2)".into()))
        );
    }

    #[rstest]
    fn test_empty_result() {
        let mut cursor = MemoryCursor::new(vec![ResultSet::new(vec![("Id", ColumnType::I32)])]);
        assert_eq!(parse_all::<i32>(&mut cursor).unwrap().count(), 0);
        assert_eq!(parse_one::<i32>(&mut MemoryCursor::default()).unwrap(), (false, 0));
    }
}
