use std::error::Error;

use serde::Serialize;

use super::ScalarCmd;
use crate::commands::Execute;
use crate::cursor::Cursor;
use crate::scalar;
use crate::value::Value;

/// Result of the scalar command execution
#[derive(Debug, Default, Serialize)]
pub struct ScalarResult {
    pub source: String,
    pub result_set: usize,
    /// Name of the column the values were read from
    pub column: Option<String>,
    pub values: Vec<Value>,
}

impl Execute for ScalarCmd {
    type Output = ScalarResult;

    fn execute(self, cursor: &mut dyn Cursor, limit: Option<usize>) -> Result<Self::Output, Box<dyn Error>> {
        // The sequence is lazy: rows past the limit are never read
        let values = scalar::parse_all::<Value>(cursor)?
            .take(limit.unwrap_or(usize::MAX))
            .collect::<Result<Vec<_>, _>>()?;

        let column = if values.is_empty() {
            None
        } else {
            Some(cursor.column_name(0)?.to_string())
        };

        Ok(ScalarResult {
            source: self.common.source(),
            result_set: self.common.result_set,
            column,
            values,
        })
    }
}
