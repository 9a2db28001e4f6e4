use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A URL the monitor has already evaluated, tracked by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeenArticle {
    pub title: Option<String>,
    /// First sighting; `None` when the persisted timestamp was unparsable.
    /// Cleanup treats `None` as stale and always evicts it.
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub first_seen: Option<DateTime<Utc>>,
    pub seen_count: u64,
}

/// Whole-ledger snapshot, persisted as a single JSON blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub articles: HashMap<String, SeenArticle>,
}

impl LedgerSnapshot {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            last_updated: now,
            articles: HashMap::new(),
        }
    }
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// A processed article as persisted by the article store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub source_url: String,
    /// Advisory association derived from URL matching, never a hard key.
    pub company: Option<String>,
    pub genai_related: bool,
    pub discovered_at: DateTime<Utc>,
    pub processed_at: DateTime<Utc>,
}

/// A candidate article as yielded by the fetch collaborator, before
/// classification.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateArticle {
    pub title: String,
    pub url: String,
    pub content: String,
    pub source_url: String,
}

/// Classifier verdict with the evidence counts behind it. Transient: only
/// the boolean survives into the article record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    pub related: bool,
    pub keyword_matches: usize,
    pub pattern_matches: usize,
    pub context_matches: usize,
}

/// Totals reported to the stats sink once per monitoring run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub total_found: usize,
    pub total_relevant: usize,
    pub source_count: usize,
    pub elapsed_seconds: u64,
}

/// Snapshot-level ledger statistics.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    pub total_articles_seen: usize,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub file_size_bytes: u64,
}

// Tolerates the original storage format's free-form timestamps: anything
// that is not valid RFC 3339 loads as None instead of failing the snapshot.
fn lenient_datetime<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
