use clap::Parser;

use portfolio_replay_lib::commands::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    portfolio_replay_lib::init_tracing();
    let cli = Cli::parse();
    commands::execute(cli).await
}
