//! Error types for the memo store and command layer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoError {
    /// Content was empty after trimming whitespace
    #[error("Please provide the content to add.")]
    EmptyContent,

    /// Position outside `[1, count]` at the time of the call
    #[error("{}", out_of_range_message(.position, .count))]
    OutOfRange { position: i64, count: usize },

    /// A restored memo carried a `created_at` that is not RFC 3339
    #[error("Invalid timestamp {value:?} for memo in {channel_id}")]
    InvalidTimestamp { channel_id: String, value: String },

    /// Underlying storage failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl MemoError {
    /// Validation errors are answered directly to the user; everything else
    /// is a fault of the single invocation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MemoError::EmptyContent
                | MemoError::OutOfRange { .. }
                | MemoError::InvalidTimestamp { .. }
        )
    }
}

fn out_of_range_message(position: &i64, count: &usize) -> String {
    if *count == 0 {
        format!(
            "Invalid memo number {}. The memo list is empty (valid range [1, 0]).",
            position
        )
    } else {
        format!(
            "Invalid memo number {}. Please enter a number between 1 and {}.",
            position, count
        )
    }
}

pub type Result<T> = std::result::Result<T, MemoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_reports_bounds() {
        let e = MemoError::OutOfRange {
            position: 5,
            count: 2,
        };
        assert_eq!(
            e.to_string(),
            "Invalid memo number 5. Please enter a number between 1 and 2."
        );
        assert!(e.is_validation());
    }

    #[test]
    fn test_out_of_range_empty_list() {
        let e = MemoError::OutOfRange {
            position: 1,
            count: 0,
        };
        assert!(e.to_string().contains("[1, 0]"));
    }

    #[test]
    fn test_invalid_timestamp_is_validation() {
        let e = MemoError::InvalidTimestamp {
            channel_id: "discord:1".to_string(),
            value: "yesterday".to_string(),
        };
        assert!(e.is_validation());
        assert!(e.to_string().contains("\"yesterday\""));
    }

    #[test]
    fn test_database_error_is_not_validation() {
        let e = MemoError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(!e.is_validation());
        assert!(e.to_string().starts_with("Database error"));
    }
}
