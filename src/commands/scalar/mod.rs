mod execute;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, CommonArgs, Execute};
use crate::output::{OutputFormat, Outputable};

/// Materialize the first column of each row as a single value
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  rowmapper scalar ids.json                  # First column of every row
  rowmapper scalar ids.json -l 1             # Only the first value
")]
pub struct ScalarCmd {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommandRunner for ScalarCmd {
    fn run(self, format: OutputFormat, default_limit: Option<usize>) -> Result<String, Box<dyn Error>> {
        let mut cursor = self.common.open()?;
        let limit = self.common.effective_limit(default_limit);
        let result = self.execute(&mut cursor, limit)?;
        Ok(result.format(format))
    }
}
