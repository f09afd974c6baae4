//! Chatdigest CLI - Summarise a chat group's recent history.

use chatdigest_cli::commands;
use chatdigest_cli::{Cli, Command, Config, Formatter};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so stdout carries only the result
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(cli: Cli) -> chatdigest_cli::Result<()> {
    let formatter = Formatter::new(!cli.no_color);
    let path = Config::resolve_path(cli.config.as_deref())?;

    match cli.command {
        Command::Init(args) => commands::execute_init(args, &path, &formatter),
        Command::Config => {
            let config = Config::load(cli.config.as_deref())?;
            commands::execute_show(&config, &path, &formatter)
        }
        Command::Analyze(args) => {
            let config = Config::load(cli.config.as_deref())?;
            commands::execute_analyze(args, &config, &formatter).await
        }
    }
}
