use crate::bot::MemoBot;
use crate::error::MemoError;
use crate::session::ChatSession;
use crate::util::split_message;
use async_trait::async_trait;
use serenity::all::{
    ChannelId, Client, Context, EventHandler, GatewayIntents, Http, Message, Ready,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Discord's per-message character limit
const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Memo lists are scoped per Discord text channel
pub fn channel_key(channel_id: ChannelId) -> String {
    format!("discord:{}", channel_id)
}

struct DiscordSession {
    http: Arc<Http>,
    channel_id: ChannelId,
    channel_key: String,
    user_id: String,
}

#[async_trait]
impl ChatSession for DiscordSession {
    fn channel_key(&self) -> &str {
        &self.channel_key
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    async fn send(&self, text: &str) -> Result<(), String> {
        for chunk in split_message(text, DISCORD_MESSAGE_LIMIT) {
            self.channel_id
                .say(&self.http, &chunk)
                .await
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

/// Message text plus attachment URLs, so a memo can point at an uploaded
/// image. Discord CDN links expire, which is why list delivery tolerates
/// failed items.
fn message_text(msg: &Message) -> String {
    let mut text = msg.content.trim().to_string();
    for attachment in &msg.attachments {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&attachment.url);
    }
    text
}

struct MemoHandler {
    bot: Arc<MemoBot>,
    connected: Arc<AtomicBool>,
}

#[serenity::async_trait]
impl EventHandler for MemoHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore messages from bots (including ourselves)
        if msg.author.bot {
            return;
        }

        let text = message_text(&msg);
        if text.is_empty() {
            return;
        }

        let session = DiscordSession {
            http: ctx.http.clone(),
            channel_id: msg.channel_id,
            channel_key: channel_key(msg.channel_id),
            user_id: msg.author.id.to_string(),
        };

        match self.bot.handle_message(&session, &text).await {
            Ok(true) => log::debug!(
                "Discord: handled message from {} in {}",
                msg.author.name,
                session.channel_key
            ),
            Ok(false) => {}
            Err(e) => {
                log::error!("Discord: command failed in {}: {}", session.channel_key, e);
                report_error(&session, &e).await;
            }
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        log::info!("Discord: Bot connected as {}", ready.user.name);
        self.connected.store(true, Ordering::Relaxed);
    }
}

/// Tell the channel a command failed. Returns false if that reply could not
/// be delivered either.
async fn report_error(session: &dyn ChatSession, err: &MemoError) -> bool {
    let error_msg = format!("Sorry, I encountered an error: {}", err);
    match session.send(&error_msg).await {
        Ok(()) => true,
        Err(send_err) => {
            log::warn!(
                "Discord: could not report error to {}: {}",
                session.channel_key(),
                send_err
            );
            false
        }
    }
}

/// Run the Discord gateway listener until the client stops.
pub async fn start_discord_listener(
    bot_token: String,
    bot: Arc<MemoBot>,
    connected: Arc<AtomicBool>,
) -> Result<(), String> {
    log::info!("Starting Discord listener");

    // Message content is needed to read commands
    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let handler = MemoHandler {
        bot,
        connected: connected.clone(),
    };

    let mut client = Client::builder(&bot_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| format!("Failed to create Discord client: {}", e))?;

    let result = client.start().await;
    connected.store(false, Ordering::Relaxed);

    match result {
        Ok(()) => {
            log::info!("Discord listener stopped");
            Ok(())
        }
        Err(e) => {
            let error = format!("Discord client error: {}", e);
            log::error!("{}", error);
            Err(error)
        }
    }
}
