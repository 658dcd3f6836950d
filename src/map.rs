//! Key/value materializer and the dynamic record mode built on it.
//!
//! Each row becomes an ordered `column name -> Value` map. Columns are
//! classified once, on the first row; later rows replay the kept positions
//! without looking at declared types again.

use std::ops::Index;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, trace};

use crate::classify::{classify_columns, ClassifiedColumn};
use crate::cursor::Cursor;
use crate::error::MaterializeError;
use crate::value::{ColumnValue, Value};

/// One materialized row, in column order.
pub type RowMap = IndexMap<String, Value>;

/// Kept columns of a result set, resolved on its first row.
#[derive(Debug, Clone)]
pub struct MapLayout {
    columns: Vec<ClassifiedColumn>,
}

impl MapLayout {
    /// Classifies the current result set. Unrecognized columns are dropped;
    /// two kept columns with the same name are an error.
    pub fn resolve(cursor: &dyn Cursor) -> Result<Self, MaterializeError> {
        let columns = classify_columns(cursor)?;
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.column.name == column.column.name) {
                return Err(MaterializeError::DuplicateColumn {
                    name: column.column.name.clone(),
                });
            }
        }
        debug!(
            kept = columns.len(),
            skipped = cursor.column_count() - columns.len(),
            "resolved map layout"
        );
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ClassifiedColumn] {
        &self.columns
    }

    /// Reads the current row through the cached extraction functions.
    pub fn read_row(&self, cursor: &dyn Cursor) -> Result<RowMap, MaterializeError> {
        let mut row = RowMap::with_capacity(self.columns.len());
        for column in &self.columns {
            row.insert(column.column.name.clone(), column.read(cursor)?);
        }
        Ok(row)
    }
}

/// Materializes every remaining row of the current result set.
pub fn parse_all(cursor: &mut dyn Cursor) -> Result<Vec<RowMap>, MaterializeError> {
    if cursor.is_closed() {
        return Err(MaterializeError::CursorClosed);
    }

    let mut rows = Vec::new();
    if !cursor.advance()? || cursor.column_count() == 0 {
        debug!("map materialization found no rows");
        return Ok(rows);
    }
    let layout = MapLayout::resolve(&*cursor)?;
    loop {
        rows.push(layout.read_row(&*cursor)?);
        trace!(row = rows.len(), "materialized map row");
        if !cursor.advance()? {
            break;
        }
    }
    debug!(rows = rows.len(), "map materialization finished");
    Ok(rows)
}

/// Materializes the next row only.
///
/// Returns `(false, empty map)` when there is no row.
pub fn parse_single(cursor: &mut dyn Cursor) -> Result<(bool, RowMap), MaterializeError> {
    if cursor.is_closed() {
        return Err(MaterializeError::CursorClosed);
    }
    if !cursor.advance()? || cursor.column_count() == 0 {
        return Ok((false, RowMap::new()));
    }
    let layout = MapLayout::resolve(&*cursor)?;
    Ok((true, layout.read_row(&*cursor)?))
}

/// A row whose shape is only known at run time.
///
/// Fields are looked up by column name; conversion to a concrete type is
/// done on access.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DynamicRecord {
    fields: RowMap,
}

impl DynamicRecord {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Reads a field as `T`. A missing field reads as null, so as `T::default()`.
    pub fn get_as<T: ColumnValue>(&self, name: &str) -> Result<T, MaterializeError> {
        let value = self.fields.get(name).cloned().unwrap_or_default();
        T::from_value(value).map_err(|m| MaterializeError::conversion(name, m.expected, m.found))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_map(self) -> RowMap {
        self.fields
    }
}

impl From<RowMap> for DynamicRecord {
    fn from(fields: RowMap) -> Self {
        Self { fields }
    }
}

impl Index<&str> for DynamicRecord {
    type Output = Value;

    /// Panics when the record has no such field; use [`DynamicRecord::get`]
    /// to probe.
    fn index(&self, name: &str) -> &Value {
        &self.fields[name]
    }
}

/// Dynamic record counterpart of [`parse_all`].
pub fn parse_all_dynamic(cursor: &mut dyn Cursor) -> Result<Vec<DynamicRecord>, MaterializeError> {
    Ok(parse_all(cursor)?.into_iter().map(DynamicRecord::from).collect())
}

/// Dynamic record counterpart of [`parse_single`].
pub fn parse_single_dynamic(cursor: &mut dyn Cursor) -> Result<(bool, DynamicRecord), MaterializeError> {
    let (found, row) = parse_single(cursor)?;
    Ok((found, DynamicRecord::from(row)))
}
