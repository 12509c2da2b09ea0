use std::env;
use std::str::FromStr;
use std::time::Duration;
use strum::{Display, EnumString};

/// How a list is delivered to the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SendMode {
    /// One combined message
    Merge,
    /// One message per memo; a failed item is replaced by a placeholder
    Separate,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub send_mode: SendMode,
    pub show_list_after_update: bool,
    pub debug: bool,
    pub confirm_token: String,
    pub confirm_timeout: Duration,
    pub command_prefix: String,
    pub port: u16,
    pub db_path: String,
    pub discord_bot_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            send_mode: SendMode::Merge,
            show_list_after_update: true,
            debug: false,
            confirm_token: "confirm".to_string(),
            confirm_timeout: Duration::from_secs(30),
            command_prefix: "memo".to_string(),
            port: 9103,
            db_path: "./group_memo.db".to_string(),
            discord_bot_token: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Missing or unparsable values keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            send_mode: parsed("GROUP_MEMO_SEND_MODE")
                .and_then(|v| SendMode::from_str(&v).ok())
                .unwrap_or(defaults.send_mode),
            show_list_after_update: parsed("GROUP_MEMO_SHOW_LIST_AFTER_UPDATE")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.show_list_after_update),
            debug: parsed("GROUP_MEMO_DEBUG")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.debug),
            confirm_token: parsed("GROUP_MEMO_CONFIRM_TOKEN").unwrap_or(defaults.confirm_token),
            confirm_timeout: parsed("GROUP_MEMO_CONFIRM_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.confirm_timeout),
            command_prefix: parsed("GROUP_MEMO_COMMAND_PREFIX")
                .map(|v| v.to_lowercase())
                .unwrap_or(defaults.command_prefix),
            port: parsed("GROUP_MEMO_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            db_path: parsed("GROUP_MEMO_DB_PATH").unwrap_or(defaults.db_path),
            discord_bot_token: parsed("DISCORD_BOT_TOKEN"),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
