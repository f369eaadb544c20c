mod cli;

use clap::Parser;
use cli::{Cli, Commands, InspectArgs};

use armature::app::ApplicationBuilder;
use armature::config::Config;
use armature::{audit, observability};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(args) => inspect(args)?,
    }

    Ok(())
}

fn inspect(args: InspectArgs) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = match args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    observability::init_tracing(&config.logging.filter);

    let app = ApplicationBuilder::new().with_config(config).boot()?;
    let report = audit::inspect(&app)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
