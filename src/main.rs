mod commands;
mod context;
mod gateway;
mod policy;

use awaybot_channels::whatsapp::WhatsAppSession;
use awaybot_core::config::ConfigStore;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "awaybot",
    version,
    about = "Unattended WhatsApp auto-responder with owner chat commands"
)]
struct Cli {
    /// Path to the config file.
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Directory for WhatsApp session state.
    #[arg(short, long, default_value = ".")]
    data_dir: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("starting WhatsApp auto-reply bot");

    // A corrupt config file aborts here on purpose: silently replacing it
    // would throw away the owner's settings.
    let store = ConfigStore::load(&cli.config)?;

    let session = Arc::new(WhatsAppSession::new(&cli.data_dir));
    let gw = gateway::Gateway::new(session, context::BotContext::new(store));
    gw.run().await
}
