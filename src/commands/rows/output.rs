//! Output formatting for rows command results.

use super::execute::RowsResult;
use crate::output::{align_rows, Outputable};

impl Outputable for RowsResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Rows: {} (result set {})", self.source, self.result_set));
        lines.push(String::new());

        if self.rows.is_empty() {
            lines.push("No rows found.".to_string());
            return lines.join("\n");
        }

        let mut table = vec![self.columns.clone()];
        for row in &self.rows {
            table.push(
                self.columns
                    .iter()
                    .map(|name| row.get(name).map(ToString::to_string).unwrap_or_default())
                    .collect(),
            );
        }
        lines.extend(align_rows(&table));

        lines.push(String::new());
        if self.rows.len() < self.total_rows {
            lines.push(format!("({} of {} rows shown)", self.rows.len(), self.total_rows));
        } else {
            lines.push(format!("({} rows)", self.total_rows));
        }

        lines.join("\n")
    }
}
