//! SQLite-backed memo store.
//!
//! Memos are scoped by channel and ordered by `(created_at, id)`. Positions
//! are 1-based ranks in that ordering and are computed on every call, never
//! stored.

use crate::error::{MemoError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use group_memo_types::*;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Result as SqliteResult, params};

const MEMO_COLUMNS: &str = "id, content, channel_id, created_at";

pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    pub fn open(path: &str) -> SqliteResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.create_tables()?;
        Ok(db)
    }

    fn create_tables(&self) -> SqliteResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS group_memos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                channel_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_group_memos_channel_time
             ON group_memos(channel_id, created_at, id)",
            [],
        )?;
        Ok(())
    }

    /// All memos of a channel, oldest first.
    pub fn list(&self, channel_id: &str) -> Result<Vec<Memo>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM group_memos
             WHERE channel_id = ?1
             ORDER BY created_at ASC, id ASC",
            MEMO_COLUMNS
        ))?;
        let memos = stmt
            .query_map(params![channel_id], row_to_memo)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(memos)
    }

    pub fn count(&self, channel_id: &str) -> Result<usize> {
        let conn = self.conn.lock();
        Ok(count_impl(&conn, channel_id)?)
    }

    /// Append a memo stamped with the current time.
    pub fn add(&self, channel_id: &str, content: &str) -> Result<Memo> {
        if content.trim().is_empty() {
            return Err(MemoError::EmptyContent);
        }
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        self.insert_at(channel_id, content, &created_at)
    }

    pub(crate) fn insert_at(&self, channel_id: &str, content: &str, created_at: &str) -> Result<Memo> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO group_memos (content, channel_id, created_at) VALUES (?1, ?2, ?3)",
            params![content, channel_id, created_at],
        )?;
        Ok(Memo {
            id: conn.last_insert_rowid(),
            content: content.to_string(),
            channel_id: channel_id.to_string(),
            created_at: created_at.to_string(),
        })
    }

    /// Delete the memo at a 1-based position and return it.
    ///
    /// Resolution and delete share one transaction, and the delete targets
    /// the resolved id.
    pub fn remove_at(&self, channel_id: &str, position: i64) -> Result<Memo> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let memo = memo_at(&tx, channel_id, position)?;
        tx.execute("DELETE FROM group_memos WHERE id = ?1", params![memo.id])?;
        tx.commit()?;
        log::debug!(
            "Memo store: removed memo {} (position {}) from {}",
            memo.id,
            position,
            channel_id
        );
        Ok(memo)
    }

    /// Content of the memo at a 1-based position, without removing it.
    pub fn extract_at(&self, channel_id: &str, position: i64) -> Result<String> {
        let conn = self.conn.lock();
        Ok(memo_at(&conn, channel_id, position)?.content)
    }

    /// Remove every memo of a channel. Returns how many were removed.
    pub fn clear(&self, channel_id: &str) -> Result<usize> {
        let conn = self.conn.lock();
        let removed = conn.execute(
            "DELETE FROM group_memos WHERE channel_id = ?1",
            params![channel_id],
        )?;
        log::debug!("Memo store: cleared {} memos from {}", removed, channel_id);
        Ok(removed)
    }

    pub fn get_stats(&self) -> Result<MemoStats> {
        let conn = self.conn.lock();
        let (total_memos, channel_count) = conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT channel_id) FROM group_memos",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        Ok(MemoStats {
            total_memos,
            channel_count,
        })
    }

    pub fn export_all(&self) -> Result<Vec<BackupEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT channel_id, content, created_at FROM group_memos
             ORDER BY channel_id ASC, created_at ASC, id ASC",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(BackupEntry {
                    channel_id: row.get(0)?,
                    content: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    /// Replace the whole table with `entries`. Entries keep their original
    /// instants, rewritten in the stored timestamp format, so per-channel
    /// order survives the round trip. An unparsable timestamp rejects the
    /// whole restore and leaves the table untouched.
    pub fn clear_and_restore(&self, entries: &[BackupEntry]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM group_memos", [])?;
        let mut count = 0;
        for entry in entries {
            if entry.content.trim().is_empty() {
                log::warn!("Memo store: skipping empty memo in backup for {}", entry.channel_id);
                continue;
            }
            let created_at = normalize_timestamp(entry)?;
            tx.execute(
                "INSERT INTO group_memos (content, channel_id, created_at) VALUES (?1, ?2, ?3)",
                params![entry.content, entry.channel_id, created_at],
            )?;
            count += 1;
        }
        tx.commit()?;
        Ok(count)
    }
}

/// Fixed-width UTC microseconds, the same format `add` writes.
fn normalize_timestamp(entry: &BackupEntry) -> Result<String> {
    DateTime::parse_from_rfc3339(entry.created_at.trim())
        .map(|ts| {
            ts.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Micros, true)
        })
        .map_err(|_| MemoError::InvalidTimestamp {
            channel_id: entry.channel_id.clone(),
            value: entry.created_at.clone(),
        })
}

fn count_impl(conn: &Connection, channel_id: &str) -> SqliteResult<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM group_memos WHERE channel_id = ?1",
        params![channel_id],
        |r| r.get(0),
    )?;
    Ok(count as usize)
}

/// Resolve a 1-based position against the channel's current ordering.
fn memo_at(conn: &Connection, channel_id: &str, position: i64) -> Result<Memo> {
    let count = count_impl(conn, channel_id)?;
    if position < 1 || position as u64 > count as u64 {
        return Err(MemoError::OutOfRange { position, count });
    }
    let memo = conn
        .query_row(
            &format!(
                "SELECT {} FROM group_memos
                 WHERE channel_id = ?1
                 ORDER BY created_at ASC, id ASC
                 LIMIT 1 OFFSET ?2",
                MEMO_COLUMNS
            ),
            params![channel_id, position - 1],
            row_to_memo,
        )
        .optional()?;
    memo.ok_or(MemoError::OutOfRange { position, count })
}

fn row_to_memo(row: &rusqlite::Row) -> SqliteResult<Memo> {
    Ok(Memo {
        id: row.get(0)?,
        content: row.get(1)?,
        channel_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}
