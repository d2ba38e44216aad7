//! cq CLI — multi-metric static-quality analysis for Python source trees.

use clap::Parser;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let exit_code = match cli.command {
        Commands::Scan(args) => cli::scan_command(args).await?,
        Commands::PrintSchema => cli::print_schema_command()?,
        Commands::ExampleConfig => cli::example_config_command()?,
    };

    std::process::exit(exit_code);
}
