//! Help command - shows available commands

/// Execute the help command
pub fn execute(prefix: &str) -> String {
    format!(
        "**Group Memo Commands**\n\n\
        - `{p}` - Show this channel's memos\n\
        - `{p} add <text>` - Add a memo\n\
        - `{p} delete <number>` - Delete the memo with that number\n\
        - `{p} extract <number>` - Send that memo's content on its own\n\
        - `{p} clear` - Delete all memos (asks for confirmation)\n\
        - `{p} help` - Show this help message\n\n\
        Numbers follow the order memos were added and shift when memos are deleted.",
        p = prefix
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_uses_prefix() {
        let help = execute("!memo");
        assert!(help.contains("`!memo add <text>`"));
        assert!(help.contains("`!memo clear`"));
    }
}
