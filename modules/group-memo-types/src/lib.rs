//! Shared types for the group memo service and its RPC clients.

use serde::{Deserialize, Serialize};

// =====================================================
// Domain Types
// =====================================================

/// A single memo in a channel's list.
///
/// Positions are never stored: a memo's 1-based position is its rank in the
/// channel's `(created_at, id)` ordering at the time of the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    pub id: i64,
    pub content: String,
    pub channel_id: String,
    pub created_at: String,
}

/// A memo together with its position in the current listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoView {
    pub position: usize,
    #[serde(flatten)]
    pub memo: Memo,
}

impl MemoView {
    /// Number a channel's ordered memos starting at 1.
    pub fn numbered(memos: Vec<Memo>) -> Vec<MemoView> {
        memos
            .into_iter()
            .enumerate()
            .map(|(i, memo)| MemoView {
                position: i + 1,
                memo,
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemoStats {
    pub total_memos: i64,
    pub channel_count: i64,
}

// =====================================================
// RPC Request Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ListMemosRequest {
    pub channel_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddMemoRequest {
    pub channel_id: String,
    pub content: String,
}

/// Used by both delete and extract.
#[derive(Debug, Serialize, Deserialize)]
pub struct MemoPositionRequest {
    pub channel_id: String,
    pub position: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearMemosRequest {
    pub channel_id: String,
    /// Must equal the service's confirmation token.
    #[serde(default)]
    pub confirmation: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackupRestoreRequest {
    pub memos: Vec<BackupEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupEntry {
    pub channel_id: String,
    pub content: String,
    pub created_at: String,
}

// =====================================================
// RPC Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> RpcResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// =====================================================
// Service Status
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub total_memos: i64,
    pub channel_count: i64,
    pub pending_confirmations: usize,
    pub channel_lanes: usize,
    pub discord_connected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memo(id: i64, content: &str) -> Memo {
        Memo {
            id,
            content: content.to_string(),
            channel_id: "discord:1".to_string(),
            created_at: "2026-01-01T00:00:00.000000Z".to_string(),
        }
    }

    #[test]
    fn test_numbered_starts_at_one() {
        let views = MemoView::numbered(vec![memo(7, "a"), memo(9, "b")]);
        assert_eq!(views[0].position, 1);
        assert_eq!(views[0].memo.id, 7);
        assert_eq!(views[1].position, 2);
        assert_eq!(views[1].memo.content, "b");
    }

    #[test]
    fn test_memo_view_serializes_flat() {
        let view = MemoView::numbered(vec![memo(3, "buy milk")]).remove(0);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["position"], 1);
        assert_eq!(json["id"], 3);
        assert_eq!(json["content"], "buy milk");
    }

    #[test]
    fn test_rpc_response_skips_empty_fields() {
        let ok = serde_json::to_value(RpcResponse::ok(5usize)).unwrap();
        assert_eq!(ok["success"], true);
        assert!(ok.get("error").is_none());

        let err = serde_json::to_value(RpcResponse::<usize>::err("boom")).unwrap();
        assert_eq!(err["success"], false);
        assert!(err.get("data").is_none());
        assert_eq!(err["error"], "boom");
    }

    #[test]
    fn test_clear_request_confirmation_defaults_empty() {
        let req: ClearMemosRequest =
            serde_json::from_str(r#"{"channel_id":"discord:1"}"#).unwrap();
        assert_eq!(req.confirmation, "");
    }
}
