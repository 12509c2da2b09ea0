//! Chat command handling for the memo list

mod add;
mod clear;
mod delete;
mod extract;
mod help;
mod list;

use crate::bot::MemoBot;
use crate::error::Result;
use crate::session::ChatSession;

/// Commands addressed to the bot with its prefix, e.g. `memo add buy milk`
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Show the list: `memo` or `memo list`
    List,
    /// Append a memo: `memo add <text>`
    Add(String),
    /// Delete by position: `memo delete <n>`
    Delete(Option<i64>),
    /// Raw content of one memo: `memo extract <n>`
    Extract(Option<i64>),
    /// Delete everything after confirmation: `memo clear`
    Clear,
    /// Show help: `memo help`
    Help,
}

/// Parse a command from text. Returns None when the text is not addressed
/// to the bot.
pub fn parse(text: &str, prefix: &str) -> Option<Command> {
    let (head, rest) = split_first_word(text.trim());
    if head.to_lowercase() != prefix {
        return None;
    }

    let (sub, args) = split_first_word(rest);
    let command = match sub.to_lowercase().as_str() {
        "" | "list" | "ls" | "show" => Command::List,
        "add" | "new" => Command::Add(args.to_string()),
        "delete" | "del" | "rm" | "remove" => Command::Delete(parse_position(args)),
        "extract" | "get" => Command::Extract(parse_position(args)),
        "clear" => Command::Clear,
        "help" | "?" => Command::Help,
        other => {
            log::debug!("Memo commands: unknown subcommand '{}', showing help", other);
            Command::Help
        }
    };
    Some(command)
}

fn split_first_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(i) => (&text[..i], text[i..].trim_start()),
        None => (text, ""),
    }
}

fn parse_position(args: &str) -> Option<i64> {
    args.split_whitespace().next()?.parse().ok()
}

/// Execute a command and return the final reply, if any.
///
/// Validation failures become replies; storage faults are returned as errors.
pub async fn execute(cmd: Command, bot: &MemoBot, session: &dyn ChatSession) -> Result<Option<String>> {
    let result = match cmd {
        Command::List => list::execute(bot, session).await,
        Command::Add(content) => add::execute(bot, session, &content).await,
        Command::Delete(position) => delete::execute(bot, session, position).await,
        Command::Extract(position) => extract::execute(bot, session, position).await,
        Command::Clear => clear::execute(bot, session).await,
        Command::Help => Ok(Some(help::execute(&bot.config.command_prefix))),
    };

    match result {
        Err(e) if e.is_validation() => {
            bot.log_op(format_args!(
                "[Validation] {} in channel {}",
                e,
                session.channel_key()
            ));
            Ok(Some(e.to_string()))
        }
        other => other,
    }
}

/// Acknowledge a mutation, then re-render the list when configured to.
async fn acknowledge_update(
    bot: &MemoBot,
    session: &dyn ChatSession,
    ack: String,
) -> Result<Option<String>> {
    if !bot.config.show_list_after_update {
        return Ok(Some(ack));
    }
    if let Err(e) = session.send(&ack).await {
        log::warn!("Failed to send acknowledgment to {}: {}", session.channel_key(), e);
    }
    list::execute(bot, session).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(parse("memo", "memo"), Some(Command::List));
        assert_eq!(parse("memo list", "memo"), Some(Command::List));
        assert_eq!(parse("  MEMO  ", "memo"), Some(Command::List));
    }

    #[test]
    fn test_parse_add_keeps_content() {
        assert_eq!(
            parse("memo add buy milk", "memo"),
            Some(Command::Add("buy milk".to_string()))
        );
        assert_eq!(
            parse("memo add   call  mom\nat 5pm", "memo"),
            Some(Command::Add("call  mom\nat 5pm".to_string()))
        );
        assert_eq!(parse("memo add", "memo"), Some(Command::Add(String::new())));
    }

    #[test]
    fn test_parse_delete() {
        assert_eq!(parse("memo delete 2", "memo"), Some(Command::Delete(Some(2))));
        assert_eq!(parse("memo del 0", "memo"), Some(Command::Delete(Some(0))));
        assert_eq!(parse("memo rm -3", "memo"), Some(Command::Delete(Some(-3))));
        assert_eq!(parse("memo delete", "memo"), Some(Command::Delete(None)));
        assert_eq!(parse("memo delete two", "memo"), Some(Command::Delete(None)));
    }

    #[test]
    fn test_parse_extract() {
        assert_eq!(parse("memo extract 1", "memo"), Some(Command::Extract(Some(1))));
        assert_eq!(parse("memo get", "memo"), Some(Command::Extract(None)));
    }

    #[test]
    fn test_parse_clear_and_help() {
        assert_eq!(parse("memo clear", "memo"), Some(Command::Clear));
        assert_eq!(parse("memo help", "memo"), Some(Command::Help));
        assert_eq!(parse("memo ?", "memo"), Some(Command::Help));
        assert_eq!(parse("memo frobnicate", "memo"), Some(Command::Help));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(parse("Memo ADD x", "memo"), Some(Command::Add("x".to_string())));
        assert_eq!(parse("MEMO Clear", "memo"), Some(Command::Clear));
    }

    #[test]
    fn test_not_addressed() {
        assert!(parse("hello there", "memo").is_none());
        assert!(parse("memos", "memo").is_none());
        assert!(parse("", "memo").is_none());
        assert!(parse("!memo add x", "memo").is_none());
        assert_eq!(parse("!memo add x", "!memo"), Some(Command::Add("x".to_string())));
    }
}
