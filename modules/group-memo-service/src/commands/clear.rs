//! Clear command - deletes every memo in the channel after confirmation

use crate::bot::MemoBot;
use crate::confirmation::{ConfirmationState, PromptKey};
use crate::error::Result;
use crate::session::ChatSession;

/// Execute the clear command
pub async fn execute(bot: &MemoBot, session: &dyn ChatSession) -> Result<Option<String>> {
    let channel = session.channel_key();
    let key = PromptKey::new(channel, session.user_id());

    let count = bot.db.count(channel)?;
    if bot.prompts.is_waiting(&key) {
        bot.log_op(format_args!(
            "[Clear] Replacing an earlier pending confirmation in channel {}",
            channel
        ));
    }

    let pending = bot.prompts.register(key);
    if let Err(e) = session.send(&bot.gate.clear_warning(count)).await {
        log::warn!("[Clear] Could not send confirmation prompt to {}: {}", channel, e);
        return Ok(None);
    }

    let state = bot.gate.resolve(pending).await;
    bot.log_op(format_args!(
        "[Clear] Confirmation for channel {} ended as {:?}",
        channel, state
    ));

    if state.permits_mutation() {
        let _lane = bot.lanes.acquire(channel).await;
        bot.log_op(format_args!("[Clear] Clearing all memos for channel: {}", channel));
        let removed = bot.db.clear(channel)?;
        return Ok(Some(format!(
            "This channel's memo list has been cleared ({} removed).",
            removed
        )));
    }

    if state == ConfirmationState::TimedOut {
        return Ok(Some(format!(
            "No confirmation received within {} seconds. Operation cancelled.",
            bot.gate.timeout.as_secs()
        )));
    }
    Ok(Some("Operation cancelled.".to_string()))
}
