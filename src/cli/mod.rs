pub mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "trail-service")]
#[command(about = "Trail Service - REST API for hiking trails")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Port to listen on (overrides TRAIL_API_PORT / PORT)")]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Apply pending migrations before serving")]
        migrate: bool,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    tracing::info!("Starting Trail Service in {:?} mode", config.environment);

    match cli.command.unwrap_or(Commands::Serve { migrate: false }) {
        Commands::Serve { migrate } => commands::serve::handle(config, migrate).await,
        Commands::Migrate => commands::migrate::handle(config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["trail-service"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.port, None);
    }

    #[test]
    fn parses_subcommands_and_port() {
        let cli = Cli::try_parse_from(["trail-service", "serve", "--migrate", "--port", "9000"])
            .unwrap();
        assert_eq!(cli.command, Some(Commands::Serve { migrate: true }));
        assert_eq!(cli.port, Some(9000));

        let cli = Cli::try_parse_from(["trail-service", "migrate"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Migrate));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["trail-service", "fixture"]).is_err());
    }
}
