//! The conversation a command was issued from.

use async_trait::async_trait;

/// Delivery seam between the command layer and a chat platform.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Platform-qualified channel identifier, e.g. `discord:1234`
    fn channel_key(&self) -> &str;

    fn user_id(&self) -> &str;

    /// Send one message to the channel. Failures are the platform's; callers
    /// decide whether they matter.
    async fn send(&self, text: &str) -> Result<(), String>;
}
