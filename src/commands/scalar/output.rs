//! Output formatting for scalar command results.

use super::execute::ScalarResult;
use crate::output::Outputable;

impl Outputable for ScalarResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        match &self.column {
            Some(column) => lines.push(format!(
                "Values of {}: {} (result set {})",
                column, self.source, self.result_set
            )),
            None => lines.push(format!("Values: {} (result set {})", self.source, self.result_set)),
        }
        lines.push(String::new());

        if self.values.is_empty() {
            lines.push("No values found.".to_string());
            return lines.join("\n");
        }

        for value in &self.values {
            lines.push(format!("  {}", value));
        }

        lines.join("\n")
    }
}
