//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;
use std::path::PathBuf;

use crate::commands::Command;
use crate::config::ConfigFile;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a configuration file (default: ./.rowmapper.json, then ~/.rowmapper.json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (default: from config, else table)
    #[arg(short = 'o', long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// The output format: command line first, then the config file.
    pub fn resolve_format(&self, config: &ConfigFile) -> OutputFormat {
        self.format.unwrap_or(config.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_format_flag_overrides_config() {
        let args = Args::try_parse_from(["rowmapper", "-o", "json", "columns", "rows.json"]).unwrap();
        let config = ConfigFile {
            format: OutputFormat::Toon,
            ..ConfigFile::default()
        };
        assert_eq!(args.resolve_format(&config), OutputFormat::Json);
    }

    #[rstest]
    fn test_format_falls_back_to_config() {
        let args = Args::try_parse_from(["rowmapper", "columns", "rows.json"]).unwrap();
        let config = ConfigFile {
            format: OutputFormat::Toon,
            ..ConfigFile::default()
        };
        assert_eq!(args.resolve_format(&config), OutputFormat::Toon);
    }

    #[rstest]
    fn test_global_options_after_subcommand() {
        let args = Args::try_parse_from([
            "rowmapper",
            "rows",
            "rows.json",
            "--config",
            "custom.json",
            "--format",
            "toon",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("custom.json")));
        assert_eq!(args.format, Some(OutputFormat::Toon));
    }

    #[rstest]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["rowmapper"]).is_err());
    }
}
