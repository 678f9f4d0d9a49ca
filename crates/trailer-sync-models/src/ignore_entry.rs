use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Reason recorded when no trailer could be located for a title.
pub const NO_TRAILER_REASON: &str = "No trailer available";

/// Negative-cache record for a canonical id with no trailer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IgnoreEntry {
    /// Folder the id was discovered in
    pub path: String,
    /// When the id was last checked
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

impl IgnoreEntry {
    pub fn no_trailer(path: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            timestamp: now,
            reason: NO_TRAILER_REASON.to_string(),
        }
    }

    /// Whether this entry still suppresses refreshes.
    ///
    /// With no retry interval the entry never expires.
    pub fn is_active(&self, retry_after: Option<Duration>, now: DateTime<Utc>) -> bool {
        match retry_after {
            Some(retry_after) => now < self.timestamp + retry_after,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_without_retry_is_permanent() {
        let checked = Utc::now() - Duration::days(3650);
        let entry = IgnoreEntry::no_trailer("/media/Movie {imdb-tt1}", checked);
        assert!(entry.is_active(None, Utc::now()));
        assert_eq!(entry.reason, NO_TRAILER_REASON);
    }

    #[test]
    fn test_entry_expires_after_retry_interval() {
        let now = Utc::now();
        let entry = IgnoreEntry::no_trailer("/media/x", now - Duration::days(8));
        assert!(!entry.is_active(Some(Duration::days(7)), now));
        assert!(entry.is_active(Some(Duration::days(30)), now));
    }

    #[test]
    fn test_entry_serializes_flat_record() {
        let now = Utc::now();
        let entry = IgnoreEntry::no_trailer("/media/x", now);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["path"], "/media/x");
        assert_eq!(json["reason"], NO_TRAILER_REASON);
        assert!(json["timestamp"].is_string());
    }
}
