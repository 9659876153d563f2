use dotenvy::dotenv;
use habit_buddy::{
    bot::{self, BotData},
    config::{database, settings},
    core::{
        delivery::{HttpMessageChannel, MessageChannel},
        dispatch,
    },
    errors::{Error, Result},
};
use std::{env, sync::Arc};
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

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load settings (missing config file means defaults)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Start the reminder dispatch job
    let messaging_token = env::var("MESSAGING_BOT_TOKEN")
        .inspect_err(|e| error!("MESSAGING_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;
    let channel: Arc<dyn MessageChannel> = Arc::new(HttpMessageChannel::new(
        settings.messaging.api_base_url.clone(),
        messaging_token,
        settings.dispatch.delivery_timeout(),
    )?);
    tokio::spawn(dispatch::run_dispatch_loop(
        db.clone(),
        channel,
        settings.dispatch.clone(),
    ));

    // 6. Run the bot
    // DISCORD_BOT_TOKEN is loaded here, directly before use, not stored in Settings
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(db)).await
}
