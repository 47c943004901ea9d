//! CLI module for DisposableCheck
//!
//! Provides subcommands:
//! - `serve`: HTTP API with the daily blocklist refresh
//! - `update-domains`: one-shot blocklist refresh

pub mod serve;
pub mod update_domains;

use clap::{Parser, Subcommand};

/// DisposableCheck - disposable email detection API
#[derive(Parser)]
#[command(name = "disposable-check")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Fetch every blocklist source and store the merged list
    UpdateDomains,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["disposable-check", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve));

        let cli = Cli::try_parse_from(["disposable-check", "update-domains"]).unwrap();
        assert!(matches!(cli.command, Command::UpdateDomains));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["disposable-check"]).is_err());
    }
}
