//! Command-line interface definition for fraudsight
//!
//! This module defines the CLI structure using clap's derive API. The only
//! mode of operation is serving the chat API, so the surface is flags-only.

use clap::Parser;

/// Fraudsight - conversational fraud-analytics assistant
///
/// Serves the chat endpoint that answers natural-language questions about
/// credit-card transaction records and fraud methodology documents.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "fraudsight")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the bind host from config
    #[arg(long)]
    pub host: Option<String>,

    /// Override the bind port from config
    #[arg(long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["fraudsight"]);
        assert!(cli.config.is_none());
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::parse_from([
            "fraudsight",
            "--config",
            "config/config.yaml",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
        ]);
        assert_eq!(cli.config.as_deref(), Some("config/config.yaml"));
        assert_eq!(cli.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(cli.port, Some(9000));
    }
}
