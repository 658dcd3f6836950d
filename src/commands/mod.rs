//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - `execute.rs` producing a serializable result from a cursor
//! - `output.rs` rendering that result as a table

mod columns;
mod rows;
mod scalar;

pub use columns::ColumnsCmd;
pub use rows::RowsCmd;
pub use scalar::ScalarCmd;

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use enum_dispatch::enum_dispatch;

use crate::cursor::{Cursor, MemoryCursor};
use crate::output::{OutputFormat, Outputable};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, cursor: &mut dyn Cursor, limit: Option<usize>) -> Result<Self::Output, Box<dyn Error>>;
}

/// Runs a parsed command and returns its formatted output.
#[enum_dispatch]
pub trait CommandRunner {
    /// `default_limit` comes from the config file and applies when the
    /// command line gives no `--limit`.
    fn run(self, format: OutputFormat, default_limit: Option<usize>) -> Result<String, Box<dyn Error>>;
}

#[enum_dispatch(CommandRunner)]
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the columns of a result set and whether each is recognized
    Columns(ColumnsCmd),

    /// Materialize rows as name to value maps
    Rows(RowsCmd),

    /// Materialize the first column of each row as a scalar
    Scalar(ScalarCmd),
}

/// Arguments shared by every command.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Result set document (JSON)
    pub file: PathBuf,

    /// Zero-based index of the result set to read
    #[arg(short, long, default_value_t = 0)]
    pub result_set: usize,

    /// Maximum number of entries to print (default: from config, else all)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,
}

impl CommonArgs {
    pub fn effective_limit(&self, default_limit: Option<usize>) -> Option<usize> {
        self.limit.map(|limit| limit as usize).or(default_limit)
    }

    /// Loads the document and positions the cursor on the requested result set.
    pub fn open(&self) -> Result<MemoryCursor, Box<dyn Error>> {
        let content = fs::read_to_string(&self.file)
            .map_err(|e| format!("Failed to read {}: {}", self.file.display(), e))?;
        let mut cursor = MemoryCursor::from_json_str(&content)?;

        for _ in 0..self.result_set {
            if !cursor.next_result_set()? {
                return Err(format!(
                    "{} has no result set {}",
                    self.file.display(),
                    self.result_set
                )
                .into());
            }
        }
        Ok(cursor)
    }

    /// File name used in result headers.
    pub fn source(&self) -> String {
        self.file.display().to_string()
    }
}
