use crate::bot::Handler;
use crate::config::Config;
use anyhow::{Context as _, Result};
use serenity::prelude::*;

/// Initialize and start the Discord bot
pub async fn start_bot(config: Config) -> Result<()> {
    tracing::info!("[INIT] Starting buttonboard Discord bot");

    let token = config.discord_token.clone();
    let handler = Handler::new(config);

    // Message content is needed to read answers to "go to page" prompts.
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(token, intents)
        .event_handler(handler)
        .await
        .context("Error creating client")?;

    if let Err(why) = client.start().await {
        tracing::error!("[ERROR] Discord client error: {why:?}");
    }

    Ok(())
}
