//! Confirmation flow for destructive commands
//!
//! A destructive command registers a pending prompt for the issuing user in
//! the issuing channel, sends its warning, then waits for that user's next
//! message. Only that conversation is suspended; every other message keeps
//! flowing through the normal command path.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;

/// States of a single confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationState {
    Idle,
    AwaitingConfirmation,
    Confirmed,
    Cancelled,
    TimedOut,
}

impl ConfirmationState {
    /// Idle -> AwaitingConfirmation
    pub fn begin(self) -> Self {
        match self {
            ConfirmationState::Idle => ConfirmationState::AwaitingConfirmation,
            other => other,
        }
    }

    /// AwaitingConfirmation -> Confirmed | Cancelled.
    /// The trimmed input must equal the token exactly (case-sensitive).
    pub fn on_input(self, input: &str, token: &str) -> Self {
        match self {
            ConfirmationState::AwaitingConfirmation if input.trim() == token => {
                ConfirmationState::Confirmed
            }
            ConfirmationState::AwaitingConfirmation => ConfirmationState::Cancelled,
            other => other,
        }
    }

    /// AwaitingConfirmation -> TimedOut
    pub fn on_timeout(self) -> Self {
        match self {
            ConfirmationState::AwaitingConfirmation => ConfirmationState::TimedOut,
            other => other,
        }
    }

    /// AwaitingConfirmation -> Cancelled, without input (superseded prompt)
    pub fn on_cancel(self) -> Self {
        match self {
            ConfirmationState::AwaitingConfirmation => ConfirmationState::Cancelled,
            other => other,
        }
    }

    /// Only a confirmed flow may touch the store.
    pub fn permits_mutation(&self) -> bool {
        matches!(self, ConfirmationState::Confirmed)
    }
}

/// The conversation a prompt belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PromptKey {
    pub channel_id: String,
    pub user_id: String,
}

impl PromptKey {
    pub fn new(channel_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Outcome of waiting on a prompt
#[derive(Debug, PartialEq, Eq)]
pub enum PromptReply {
    Input(String),
    TimedOut,
    /// A newer prompt for the same conversation replaced this one
    Superseded,
}

struct Waiter {
    ticket: u64,
    tx: oneshot::Sender<String>,
}

/// Registry of conversations currently suspended on a prompt.
/// At most one prompt per conversation; a newer one supersedes the older.
pub struct PendingPrompts {
    waiting: DashMap<PromptKey, Waiter>,
    next_ticket: AtomicU64,
}

impl PendingPrompts {
    pub fn new() -> Self {
        Self {
            waiting: DashMap::new(),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Start listening for the next message of a conversation. Register
    /// before sending the prompt text so a fast reply cannot slip past.
    pub fn register(&self, key: PromptKey) -> PendingReply<'_> {
        let (tx, rx) = oneshot::channel();
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        if self.waiting.insert(key.clone(), Waiter { ticket, tx }).is_some() {
            log::debug!(
                "Prompt for {} in {} superseded by a newer one",
                key.user_id,
                key.channel_id
            );
        }
        PendingReply {
            prompts: self,
            key,
            ticket,
            rx,
        }
    }

    /// Hand an incoming message to a waiting prompt. Returns true if the
    /// message was consumed and must not be treated as a command.
    pub fn offer(&self, key: &PromptKey, text: &str) -> bool {
        match self.waiting.remove(key) {
            Some((_, waiter)) => waiter.tx.send(text.to_string()).is_ok(),
            None => false,
        }
    }

    pub fn is_waiting(&self, key: &PromptKey) -> bool {
        self.waiting.contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        self.waiting.len()
    }

    fn release(&self, key: &PromptKey, ticket: u64) {
        self.waiting.remove_if(key, |_, w| w.ticket == ticket);
    }
}

impl Default for PendingPrompts {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered prompt. Dropping it withdraws the registration.
pub struct PendingReply<'a> {
    prompts: &'a PendingPrompts,
    key: PromptKey,
    ticket: u64,
    rx: oneshot::Receiver<String>,
}

impl PendingReply<'_> {
    /// Wait up to `timeout` for the reply. Resolves exactly once.
    pub async fn wait(mut self, timeout: Duration) -> PromptReply {
        let received = tokio::select! {
            reply = &mut self.rx => Some(reply),
            _ = tokio::time::sleep(timeout) => None,
        };

        match received {
            Some(Ok(text)) => PromptReply::Input(text),
            Some(Err(_)) => PromptReply::Superseded,
            None => {
                self.prompts.release(&self.key, self.ticket);
                // A reply that raced the timer is still honoured
                self.rx.close();
                match self.rx.try_recv() {
                    Ok(text) => PromptReply::Input(text),
                    Err(_) => PromptReply::TimedOut,
                }
            }
        }
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        self.prompts.release(&self.key, self.ticket);
    }
}

/// Token and timeout for confirming a destructive command
#[derive(Debug, Clone)]
pub struct ConfirmationGate {
    pub token: String,
    pub timeout: Duration,
}

impl ConfirmationGate {
    pub fn new(token: impl Into<String>, timeout: Duration) -> Self {
        Self {
            token: token.into(),
            timeout,
        }
    }

    /// Warning shown before clearing a channel's memos
    pub fn clear_warning(&self, memo_count: usize) -> String {
        format!(
            "⚠️ **Warning:** this will delete ALL {} memos in this channel and cannot be undone.\n\
            Reply `{}` within {} seconds to continue.",
            memo_count,
            self.token,
            self.timeout.as_secs()
        )
    }

    /// Drive the state machine from a registered prompt to a terminal state.
    pub async fn resolve(&self, pending: PendingReply<'_>) -> ConfirmationState {
        let state = ConfirmationState::Idle.begin();
        match pending.wait(self.timeout).await {
            PromptReply::Input(text) => state.on_input(&text, &self.token),
            PromptReply::TimedOut => state.on_timeout(),
            PromptReply::Superseded => state.on_cancel(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::sleep;

    fn key(user: &str) -> PromptKey {
        PromptKey::new("discord:1", user)
    }

    #[test]
    fn test_state_transitions() {
        let awaiting = ConfirmationState::Idle.begin();
        assert_eq!(awaiting, ConfirmationState::AwaitingConfirmation);

        assert_eq!(awaiting.on_input("  confirm \n", "confirm"), ConfirmationState::Confirmed);
        assert_eq!(awaiting.on_input("Confirm", "confirm"), ConfirmationState::Cancelled);
        assert_eq!(awaiting.on_input("", "confirm"), ConfirmationState::Cancelled);
        assert_eq!(awaiting.on_timeout(), ConfirmationState::TimedOut);
        assert_eq!(awaiting.on_cancel(), ConfirmationState::Cancelled);
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let confirmed = ConfirmationState::Confirmed;
        assert_eq!(confirmed.on_timeout(), ConfirmationState::Confirmed);
        assert_eq!(
            ConfirmationState::TimedOut.on_input("confirm", "confirm"),
            ConfirmationState::TimedOut
        );
        // Input without begin() is ignored
        assert_eq!(
            ConfirmationState::Idle.on_input("confirm", "confirm"),
            ConfirmationState::Idle
        );
    }

    #[test]
    fn test_only_confirmed_permits_mutation() {
        assert!(ConfirmationState::Confirmed.permits_mutation());
        assert!(!ConfirmationState::Cancelled.permits_mutation());
        assert!(!ConfirmationState::TimedOut.permits_mutation());
        assert!(!ConfirmationState::AwaitingConfirmation.permits_mutation());
    }

    #[test]
    fn test_unicode_token_exact_match() {
        let awaiting = ConfirmationState::Idle.begin();
        assert_eq!(awaiting.on_input("确认", "确认"), ConfirmationState::Confirmed);
        assert_eq!(awaiting.on_input("确认!", "确认"), ConfirmationState::Cancelled);
    }

    #[tokio::test]
    async fn test_offer_resolves_prompt() {
        let prompts = Arc::new(PendingPrompts::new());
        let gate = ConfirmationGate::new("confirm", Duration::from_secs(5));

        let pending = prompts.register(key("alice"));
        assert!(prompts.is_waiting(&key("alice")));

        let offer_prompts = prompts.clone();
        let offer = tokio::spawn(async move {
            sleep(Duration::from_millis(10)).await;
            offer_prompts.offer(&key("alice"), "confirm")
        });

        assert_eq!(gate.resolve(pending).await, ConfirmationState::Confirmed);
        assert!(offer.await.unwrap());
        assert!(!prompts.is_waiting(&key("alice")));
    }

    #[tokio::test]
    async fn test_timeout_fires_once_and_releases() {
        let prompts = PendingPrompts::new();
        let gate = ConfirmationGate::new("confirm", Duration::from_millis(30));

        let pending = prompts.register(key("alice"));
        assert_eq!(gate.resolve(pending).await, ConfirmationState::TimedOut);
        assert_eq!(prompts.pending_count(), 0);
        // A late reply is no longer consumed
        assert!(!prompts.offer(&key("alice"), "confirm"));
    }

    #[tokio::test]
    async fn test_other_user_does_not_resolve_prompt() {
        let prompts = PendingPrompts::new();
        let pending = prompts.register(key("alice"));

        assert!(!prompts.offer(&key("mallory"), "confirm"));
        assert!(!prompts.offer(&PromptKey::new("discord:2", "alice"), "confirm"));
        assert!(prompts.is_waiting(&key("alice")));

        assert_eq!(
            pending.wait(Duration::from_millis(20)).await,
            PromptReply::TimedOut
        );
    }

    #[tokio::test]
    async fn test_newer_prompt_supersedes_older() {
        let prompts = PendingPrompts::new();
        let gate = ConfirmationGate::new("confirm", Duration::from_secs(5));

        let first = prompts.register(key("alice"));
        let second = prompts.register(key("alice"));
        assert_eq!(prompts.pending_count(), 1);

        assert_eq!(gate.resolve(first).await, ConfirmationState::Cancelled);
        // Dropping the superseded reply must not withdraw the newer one
        assert!(prompts.is_waiting(&key("alice")));

        assert!(prompts.offer(&key("alice"), "confirm"));
        assert_eq!(gate.resolve(second).await, ConfirmationState::Confirmed);
    }

    #[tokio::test]
    async fn test_dropping_pending_reply_withdraws_it() {
        let prompts = PendingPrompts::new();
        let pending = prompts.register(key("alice"));
        drop(pending);
        assert!(!prompts.is_waiting(&key("alice")));
    }

    #[test]
    fn test_clear_warning_mentions_token_and_timeout() {
        let gate = ConfirmationGate::new("confirm", Duration::from_secs(30));
        let warning = gate.clear_warning(3);
        assert!(warning.contains("ALL 3 memos"));
        assert!(warning.contains("`confirm`"));
        assert!(warning.contains("30 seconds"));
        assert!(warning.contains("cannot be undone"));
    }
}
