//! Rendering memo lists for chat.

use crate::session::ChatSession;
use group_memo_types::Memo;

const LIST_HEADER: &str = "--- Group Memos ---";

const NUMBER_EMOJIS: [&str; 10] = [
    "1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟",
];

/// Keycap emoji for the first ten positions, `N.` afterwards.
pub fn position_label(index: usize) -> String {
    match NUMBER_EMOJIS.get(index) {
        Some(emoji) => emoji.to_string(),
        None => format!("{}.", index + 1),
    }
}

pub fn empty_list_message(prefix: &str) -> String {
    format!(
        "This channel's memo list is empty. Use `{} add <text>` to record the first one!",
        prefix
    )
}

/// The whole list as a single message.
pub fn render_merged(memos: &[Memo], prefix: &str) -> String {
    if memos.is_empty() {
        return empty_list_message(prefix);
    }
    let lines: Vec<String> = memos
        .iter()
        .enumerate()
        .map(|(i, memo)| format!("{} {}", position_label(i), memo.content))
        .collect();
    format!("{}\n{}", LIST_HEADER, lines.join("\n"))
}

fn undeliverable_placeholder(index: usize) -> String {
    format!(
        "{} [this memo could not be delivered; its attachment may have expired]",
        position_label(index)
    )
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub substituted: usize,
}

/// Send the header and then each memo as its own message.
///
/// A memo that fails to send is replaced with a placeholder and delivery
/// moves on to the next one.
pub async fn deliver_separately(
    session: &dyn ChatSession,
    memos: &[Memo],
    prefix: &str,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    if memos.is_empty() {
        if let Err(e) = session.send(&empty_list_message(prefix)).await {
            log::warn!("[List] Failed to send empty-list message to {}: {}", session.channel_key(), e);
        }
        return report;
    }

    if let Err(e) = session.send(LIST_HEADER).await {
        log::warn!("[List] Failed to send list header to {}: {}", session.channel_key(), e);
    }

    for (i, memo) in memos.iter().enumerate() {
        let text = format!("{} {}", position_label(i), memo.content);
        match session.send(&text).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                log::warn!(
                    "[List] Memo {} (id {}) could not be sent to {}: {}",
                    i + 1,
                    memo.id,
                    session.channel_key(),
                    e
                );
                if let Err(e) = session.send(&undeliverable_placeholder(i)).await {
                    log::warn!("[List] Placeholder for memo {} also failed: {}", i + 1, e);
                }
                report.substituted += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::RecordingSession;

    fn memos(contents: &[&str]) -> Vec<Memo> {
        contents
            .iter()
            .enumerate()
            .map(|(i, c)| Memo {
                id: i as i64 + 1,
                content: c.to_string(),
                channel_id: "discord:1".to_string(),
                created_at: format!("2026-01-01T00:00:{:02}.000000Z", i),
            })
            .collect()
    }

    #[test]
    fn test_position_labels() {
        assert_eq!(position_label(0), "1️⃣");
        assert_eq!(position_label(9), "🔟");
        assert_eq!(position_label(10), "11.");
        assert_eq!(position_label(41), "42.");
    }

    #[test]
    fn test_render_merged() {
        let rendered = render_merged(&memos(&["buy milk", "call mom", "pay rent"]), "memo");
        assert_eq!(
            rendered,
            "--- Group Memos ---\n1️⃣ buy milk\n2️⃣ call mom\n3️⃣ pay rent"
        );
    }

    #[test]
    fn test_render_merged_past_ten() {
        let contents: Vec<String> = (1..=12).map(|i| format!("m{}", i)).collect();
        let refs: Vec<&str> = contents.iter().map(String::as_str).collect();
        let rendered = render_merged(&memos(&refs), "memo");
        assert!(rendered.contains("🔟 m10"));
        assert!(rendered.contains("\n11. m11"));
        assert!(rendered.ends_with("12. m12"));
    }

    #[test]
    fn test_render_merged_empty() {
        assert_eq!(render_merged(&[], "memo"), empty_list_message("memo"));
        assert!(empty_list_message("memo").contains("`memo add <text>`"));
    }

    #[tokio::test]
    async fn test_deliver_separately_sends_each_memo() {
        let session = RecordingSession::new("discord:1", "alice");
        let report = deliver_separately(&session, &memos(&["a", "b"]), "memo").await;
        assert_eq!(report, DeliveryReport { delivered: 2, substituted: 0 });
        assert_eq!(session.sent(), vec!["--- Group Memos ---", "1️⃣ a", "2️⃣ b"]);
    }

    #[tokio::test]
    async fn test_deliver_separately_substitutes_failed_item() {
        let session = RecordingSession::new("discord:1", "alice").failing_on("expired-image");
        let list = memos(&["first", "<expired-image>", "third"]);
        let report = deliver_separately(&session, &list, "memo").await;

        assert_eq!(report, DeliveryReport { delivered: 2, substituted: 1 });
        let sent = session.sent();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[1], "1️⃣ first");
        assert!(sent[2].starts_with("2️⃣ [this memo could not be delivered"));
        assert_eq!(sent[3], "3️⃣ third");
    }

    #[tokio::test]
    async fn test_deliver_separately_empty() {
        let session = RecordingSession::new("discord:1", "alice");
        let report = deliver_separately(&session, &[], "memo").await;
        assert_eq!(report, DeliveryReport::default());
        assert_eq!(session.sent(), vec![empty_list_message("memo")]);
    }
}
