//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chatdigest - Summarise a chat group's recent history.
#[derive(Debug, Parser)]
#[command(name = "chatdigest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.chatdigest/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyse a group and print the result as JSON
    Analyze(AnalyzeArgs),

    /// Write a default configuration file
    Init(InitArgs),

    /// Print the effective configuration
    Config,
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Group to analyse
    #[arg(short, long)]
    pub group: String,

    /// Days of history (1-7); the configured default otherwise
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Write the JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Single-line JSON
    #[arg(long)]
    pub compact: bool,

    /// LLM API key, overriding the configuration file
    #[arg(long, env = "CHATDIGEST_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Arguments for the init command.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["chatdigest", "analyze", "--group", "123", "--days", "3"]);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.group, "123");
                assert_eq!(args.days, Some(3));
                assert!(!args.compact);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["chatdigest", "init", "--force", "--config", "/tmp/x.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.toml")));
        assert!(matches!(cli.command, Command::Init(InitArgs { force: true })));
    }

    #[test]
    fn test_group_is_required() {
        assert!(Cli::try_parse_from(["chatdigest", "analyze"]).is_err());
    }
}
