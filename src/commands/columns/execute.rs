use std::error::Error;

use serde::Serialize;

use super::ColumnsCmd;
use crate::classify::classify;
use crate::commands::Execute;
use crate::cursor::{read_columns, Cursor};

/// One column of the inspected result set
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub ordinal: usize,
    pub name: String,
    pub column_type: String,
    /// Whether materializers read this column; unrecognized ones are skipped
    pub recognized: bool,
}

/// Result of the columns command execution
#[derive(Debug, Default, Serialize)]
pub struct ColumnsResult {
    pub source: String,
    pub result_set: usize,
    pub total_columns: usize,
    pub columns: Vec<ColumnInfo>,
}

impl Execute for ColumnsCmd {
    type Output = ColumnsResult;

    fn execute(self, cursor: &mut dyn Cursor, limit: Option<usize>) -> Result<Self::Output, Box<dyn Error>> {
        let mut result = ColumnsResult {
            source: self.common.source(),
            result_set: self.common.result_set,
            ..Default::default()
        };

        // Column metadata is only guaranteed once a row is current
        if !cursor.advance()? {
            return Ok(result);
        }

        let columns = read_columns(&*cursor)?;
        result.total_columns = columns.len();
        result.columns = columns
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|column| ColumnInfo {
                recognized: classify(&column.column_type).is_some(),
                ordinal: column.ordinal,
                name: column.name,
                column_type: column.column_type.to_string(),
            })
            .collect();

        Ok(result)
    }
}
