//! Courier CLI - route tasks to capability providers from the command line.

use anyhow::Result;
use clap::Parser as _;
use tracing_subscriber::EnvFilter;

use courier_cli::cli::{Cli, Command};
use courier_cli::handlers;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let orchestrator = handlers::build_orchestrator(cli.config, cli.catalog)?;

    match cli.command {
        Command::Run {
            input,
            input_type,
            service,
            language,
        } => handlers::handle_run(&orchestrator, input, input_type, service, language).await?,
        Command::Batch { file } => handlers::handle_batch(&orchestrator, file).await?,
        Command::Services => handlers::handle_services(&orchestrator)?,
        Command::Check { service_id } => handlers::handle_check(&orchestrator, service_id).await?,
    }

    Ok(())
}
