mod cli;

use anyhow::{Result, anyhow};
use clap::Parser;
use cli::{Cli, Commands};
use duet_cli::config::{Config, tip_listing};
use duet_cli::console::{format_outcome, run_console};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let telemetry = match &cli.otlp_endpoint {
        Some(endpoint) => duet_telemetry::init_with_otlp("duet", endpoint),
        None => duet_telemetry::init_telemetry("duet"),
    };
    telemetry.map_err(|e| anyhow!("failed to initialize telemetry: {e}"))?;

    let result = run(cli.command).await;
    duet_telemetry::shutdown_telemetry();
    result
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Ask { query, max_turns, tips, offline, stream } => {
            let coordinator = Config::from_env(offline, tips, max_turns)?
                .with_stream(stream)
                .build_coordinator()?;
            let outcome = coordinator.run(query).await?;
            println!("{}", format_outcome(&outcome));
        }
        Commands::Console { max_turns, tips, offline, stream } => {
            let coordinator = Config::from_env(offline, tips, max_turns)?
                .with_stream(stream)
                .build_coordinator()?;
            run_console(&coordinator).await?;
        }
        Commands::Tips { query, tips } => {
            println!("{}", tip_listing(tips.as_deref(), query.as_deref())?);
        }
    }
    Ok(())
}
