//! Output formatting for columns command results.

use super::execute::ColumnsResult;
use crate::output::{align_rows, Outputable};

impl Outputable for ColumnsResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Columns: {} (result set {})", self.source, self.result_set));
        lines.push(String::new());

        if self.columns.is_empty() {
            lines.push("No columns found.".to_string());
            return lines.join("\n");
        }

        let mut rows = vec![vec![
            "#".to_string(),
            "Name".to_string(),
            "Type".to_string(),
            "Read".to_string(),
        ]];
        for column in &self.columns {
            rows.push(vec![
                column.ordinal.to_string(),
                column.name.clone(),
                column.column_type.clone(),
                if column.recognized { "yes" } else { "skipped" }.to_string(),
            ]);
        }
        lines.extend(align_rows(&rows));

        if self.columns.len() < self.total_columns {
            lines.push(String::new());
            lines.push(format!("({} of {} columns shown)", self.columns.len(), self.total_columns));
        }

        lines.join("\n")
    }
}
