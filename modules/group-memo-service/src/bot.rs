//! Message entry point shared by every chat adapter.

use crate::commands::{self, Command};
use crate::config::Config;
use crate::confirmation::{ConfirmationGate, PendingPrompts, PromptKey};
use crate::db::Db;
use crate::error::Result;
use crate::lanes::ChannelLaneManager;
use crate::session::ChatSession;
use std::fmt;
use std::sync::Arc;

pub struct MemoBot {
    pub db: Arc<Db>,
    pub config: Arc<Config>,
    pub lanes: Arc<ChannelLaneManager>,
    pub prompts: PendingPrompts,
    pub gate: ConfirmationGate,
}

impl MemoBot {
    pub fn new(db: Arc<Db>, config: Arc<Config>) -> Self {
        let gate = ConfirmationGate::new(config.confirm_token.clone(), config.confirm_timeout);
        Self {
            db,
            config,
            lanes: ChannelLaneManager::new(),
            prompts: PendingPrompts::new(),
            gate,
        }
    }

    /// Handle one incoming chat message.
    ///
    /// A message from a conversation with a pending prompt answers that
    /// prompt, unless it is a new `clear`, which replaces the prompt.
    /// Otherwise it is parsed as a command. Returns false when the message
    /// was not meant for the bot.
    pub async fn handle_message(&self, session: &dyn ChatSession, text: &str) -> Result<bool> {
        let key = PromptKey::new(session.channel_key(), session.user_id());
        let parsed = commands::parse(text, &self.config.command_prefix);

        if !matches!(parsed, Some(Command::Clear)) && self.prompts.offer(&key, text) {
            log::debug!(
                "Memo bot: reply from {} in {} answered a pending prompt",
                key.user_id,
                key.channel_id
            );
            return Ok(true);
        }

        let Some(cmd) = parsed else {
            return Ok(false);
        };
        log::debug!("Memo bot: {:?} from {} in {}", cmd, key.user_id, key.channel_id);

        if let Some(reply) = commands::execute(cmd, self, session).await? {
            if let Err(e) = session.send(&reply).await {
                log::error!("Failed to send reply to {}: {}", key.channel_id, e);
            }
        }
        Ok(true)
    }

    /// Operation log: `info` in debug mode, `debug` otherwise.
    pub(crate) fn log_op(&self, args: fmt::Arguments<'_>) {
        if self.config.debug {
            log::info!("{}", args);
        } else {
            log::debug!("{}", args);
        }
    }
}
