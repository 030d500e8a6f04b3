#![allow(clippy::result_large_err)]

use asset_ledger::{
    bot::{self, BotData},
    config,
    core::dictionary,
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();

    // 3. Load config.toml (defaults when absent)
    let app_config = config::catalog::load_default_config()
        .inspect_err(|e| error!("Failed to load config.toml: {}", e))?;

    // 4. Connect and create tables
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db).await?;
    info!("Database ready");

    // 5. Seed categories, contracts and dictionary items
    let seeded = dictionary::seed_catalog(&db, &app_config).await?;
    info!(
        "Catalogue seeded ({} categories, {} contracts, {} dictionary items new)",
        seeded.categories, seeded.contracts, seeded.dictionary_items
    );

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(db, app_config.ledger)).await
}
