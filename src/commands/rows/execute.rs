use std::error::Error;

use serde::Serialize;

use super::RowsCmd;
use crate::commands::Execute;
use crate::cursor::Cursor;
use crate::map::{self, DynamicRecord};

/// Result of the rows command execution
#[derive(Debug, Default, Serialize)]
pub struct RowsResult {
    pub source: String,
    pub result_set: usize,
    /// Rows materialized before the limit was applied
    pub total_rows: usize,
    /// Column names in result-set order; empty when there are no rows
    pub columns: Vec<String>,
    pub rows: Vec<DynamicRecord>,
}

impl Execute for RowsCmd {
    type Output = RowsResult;

    fn execute(self, cursor: &mut dyn Cursor, limit: Option<usize>) -> Result<Self::Output, Box<dyn Error>> {
        let mut rows = if self.single {
            match map::parse_single_dynamic(cursor)? {
                (true, record) => vec![record],
                (false, _) => Vec::new(),
            }
        } else {
            map::parse_all_dynamic(cursor)?
        };

        let total_rows = rows.len();
        if let Some(limit) = limit {
            rows.truncate(limit);
        }

        let columns = rows
            .first()
            .map(|row| row.field_names().map(str::to_string).collect())
            .unwrap_or_default();

        Ok(RowsResult {
            source: self.common.source(),
            result_set: self.common.result_set,
            total_rows,
            columns,
            rows,
        })
    }
}
