//! Delete command - removes the memo at a position

use crate::bot::MemoBot;
use crate::error::Result;
use crate::session::ChatSession;

/// Execute the delete command
pub async fn execute(
    bot: &MemoBot,
    session: &dyn ChatSession,
    position: Option<i64>,
) -> Result<Option<String>> {
    let Some(position) = position else {
        return Ok(Some(format!(
            "Please provide the number of the memo to delete, e.g. `{} delete 2`.",
            bot.config.command_prefix
        )));
    };

    let channel = session.channel_key();
    let _lane = bot.lanes.acquire(channel).await;

    let memo = bot.db.remove_at(channel, position)?;
    bot.log_op(format_args!(
        "[Delete] Removed memo (ID: {}) at position {} from channel {}",
        memo.id, position, channel
    ));

    super::acknowledge_update(bot, session, format!("Memo #{} has been deleted.", position)).await
}
