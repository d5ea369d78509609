use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use galley::app::AppContext;
use galley::cli::{commands, Cli, Commands};
use galley::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Build => commands::build_site(&ctx).await?,
        Commands::Post { id } => commands::show_post(&ctx, &id).await?,
        Commands::Feed => commands::rebuild_feed(&ctx).await?,
    }

    Ok(())
}
