mod execute;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, CommonArgs, Execute};
use crate::output::{OutputFormat, Outputable};

/// Materialize the rows of a result set as column name to value records
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  rowmapper rows orders.json                 # Every row of the first result set
  rowmapper rows orders.json -r 1 -l 10      # First 10 rows of the second result set
  rowmapper rows orders.json --single        # Only the first row
  rowmapper rows orders.json -o json         # Rows as JSON objects
")]
pub struct RowsCmd {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Read only the first row
    #[arg(short, long, default_value_t = false)]
    pub single: bool,
}

impl CommandRunner for RowsCmd {
    fn run(self, format: OutputFormat, default_limit: Option<usize>) -> Result<String, Box<dyn Error>> {
        let mut cursor = self.common.open()?;
        let limit = self.common.effective_limit(default_limit);
        let result = self.execute(&mut cursor, limit)?;
        Ok(result.format(format))
    }
}
