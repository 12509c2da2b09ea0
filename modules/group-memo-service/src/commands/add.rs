//! Add command - appends a memo to the channel's list

use crate::bot::MemoBot;
use crate::error::Result;
use crate::session::ChatSession;

/// Execute the add command
pub async fn execute(bot: &MemoBot, session: &dyn ChatSession, content: &str) -> Result<Option<String>> {
    let channel = session.channel_key();
    let _lane = bot.lanes.acquire(channel).await;

    bot.log_op(format_args!(
        "[Add] Creating memo in channel {} with content: \"{}\"",
        channel, content
    ));
    let memo = bot.db.add(channel, content)?;
    log::debug!("[Add] Created memo {} in {}", memo.id, channel);

    super::acknowledge_update(bot, session, "Memo added!".to_string()).await
}
