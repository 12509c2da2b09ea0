//! List command - renders the channel's memos

use crate::bot::MemoBot;
use crate::config::SendMode;
use crate::error::Result;
use crate::render::{deliver_separately, render_merged};
use crate::session::ChatSession;

/// Execute the list command
pub async fn execute(bot: &MemoBot, session: &dyn ChatSession) -> Result<Option<String>> {
    let channel = session.channel_key();
    bot.log_op(format_args!("[View] Fetching memos for channel: {}", channel));

    let memos = bot.db.list(channel)?;
    let prefix = &bot.config.command_prefix;

    match bot.config.send_mode {
        SendMode::Merge => Ok(Some(render_merged(&memos, prefix))),
        SendMode::Separate => {
            let report = deliver_separately(session, &memos, prefix).await;
            log::debug!(
                "[View] Delivered {} memos separately to {}",
                report.delivered,
                channel
            );
            if report.substituted > 0 {
                log::warn!(
                    "[View] {} of {} memos in {} were replaced by placeholders",
                    report.substituted,
                    memos.len(),
                    channel
                );
            }
            Ok(None)
        }
    }
}
