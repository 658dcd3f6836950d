mod execute;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, CommonArgs, Execute};
use crate::output::{OutputFormat, Outputable};

/// List the columns of a result set with their declared types
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  rowmapper columns orders.json              # Columns of the first result set
  rowmapper columns orders.json -r 1         # Columns of the second result set
  rowmapper columns orders.json -o json      # Machine-readable listing
")]
pub struct ColumnsCmd {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommandRunner for ColumnsCmd {
    fn run(self, format: OutputFormat, default_limit: Option<usize>) -> Result<String, Box<dyn Error>> {
        let mut cursor = self.common.open()?;
        let limit = self.common.effective_limit(default_limit);
        let result = self.execute(&mut cursor, limit)?;
        Ok(result.format(format))
    }
}
