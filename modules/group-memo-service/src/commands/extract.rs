//! Extract command - returns one memo's raw content for re-sending

use crate::bot::MemoBot;
use crate::error::Result;
use crate::session::ChatSession;

/// Execute the extract command
pub async fn execute(
    bot: &MemoBot,
    session: &dyn ChatSession,
    position: Option<i64>,
) -> Result<Option<String>> {
    let Some(position) = position else {
        return Ok(Some(format!(
            "Please provide the number of the memo to extract, e.g. `{} extract 1`.",
            bot.config.command_prefix
        )));
    };

    let channel = session.channel_key();
    bot.log_op(format_args!(
        "[Extract] Reading memo at position {} in channel {}",
        position, channel
    ));
    let content = bot.db.extract_at(channel, position)?;
    Ok(Some(content))
}
