use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A saved live feed as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub id: i64,
    pub name: String,
    pub url: String,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
}

impl FeedRecord {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// A feed that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeed {
    pub name: String,
    pub url: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in both fields! (name is empty)")]
    MissingName,
    #[error("Please fill in both fields! (URL is empty)")]
    MissingUrl,
    #[error("Please fill in both fields!")]
    MissingBoth,
}

impl NewFeed {
    /// Validates the form input and stamps the creation time.
    /// Whitespace-only values count as empty.
    pub fn new(name: &str, url: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        let url = url.trim();

        match (name.is_empty(), url.is_empty()) {
            (true, true) => return Err(ValidationError::MissingBoth),
            (true, false) => return Err(ValidationError::MissingName),
            (false, true) => return Err(ValidationError::MissingUrl),
            (false, false) => {}
        }

        Ok(Self {
            name: name.to_string(),
            url: url.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        })
    }

    pub fn into_record(self, id: i64) -> FeedRecord {
        FeedRecord {
            id,
            name: self.name,
            url: self.url,
            timestamp: self.timestamp,
        }
    }
}
