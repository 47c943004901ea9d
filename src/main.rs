use clap::Parser;
use disposable_check::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::UpdateDomains => cli::update_domains::run().await,
    }
}
