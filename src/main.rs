use clap::Parser;

use rowmapper::cli::Args;
use rowmapper::commands::CommandRunner;
use rowmapper::config::ConfigFile;
use rowmapper::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = ConfigFile::load(args.config.as_deref())?;
    logging::init_with_level(&config.log_level);

    let format = args.resolve_format(&config);
    let output = args.command.run(format, config.limit)?;
    println!("{}", output);
    Ok(())
}
