use crate::types::{ArticleRecord, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Store for processed article records, keyed by URL.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert or replace the record for its URL. A replacement updates
    /// content, summary, and the relevance flag but preserves the original
    /// discovery timestamp.
    async fn upsert(&self, record: ArticleRecord) -> Result<()>;

    /// Newest-first records, optionally restricted to GenAI-related ones.
    async fn recent(&self, limit: usize, relevant_only: bool) -> Result<Vec<ArticleRecord>>;

    async fn count(&self) -> usize;
}

/// File-backed store using the same atomic-replace discipline as the
/// ledger: the whole record list is one JSON document, rewritten via a temp
/// file and rename.
pub struct JsonArticleStore {
    path: PathBuf,
    records: RwLock<Vec<ArticleRecord>>,
}

impl JsonArticleStore {
    pub fn load<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<ArticleRecord>>(&raw) {
                Ok(records) => {
                    info!("Loaded {} article records from {}", records.len(), path.display());
                    records
                }
                Err(e) => {
                    warn!(
                        "Error parsing article store {}: {}, starting fresh",
                        path.display(),
                        e
                    );
                    Vec::new()
                }
            },
            Err(_) => {
                info!("No existing article store found: {}", path.display());
                Vec::new()
            }
        };

        Self {
            path,
            records: RwLock::new(records),
        }
    }

    fn persist(&self, records: &[ArticleRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(records)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;
        debug!("Saved {} article records to {}", records.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for JsonArticleStore {
    async fn upsert(&self, mut record: ArticleRecord) -> Result<()> {
        let mut records = self.records.write().await;

        match records.iter_mut().find(|existing| existing.url == record.url) {
            Some(existing) => {
                record.id = existing.id;
                record.discovered_at = existing.discovered_at;
                record.processed_at = Utc::now();
                *existing = record;
            }
            None => records.push(record),
        }

        self.persist(&records)
    }

    async fn recent(&self, limit: usize, relevant_only: bool) -> Result<Vec<ArticleRecord>> {
        let records = self.records.read().await;
        let mut selected: Vec<ArticleRecord> = records
            .iter()
            .filter(|record| !relevant_only || record.genai_related)
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.discovered_at.cmp(&a.discovered_at));
        selected.truncate(limit);
        Ok(selected)
    }

    async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct MemoryArticleStore {
    records: RwLock<Vec<ArticleRecord>>,
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn upsert(&self, mut record: ArticleRecord) -> Result<()> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|existing| existing.url == record.url) {
            Some(existing) => {
                record.id = existing.id;
                record.discovered_at = existing.discovered_at;
                record.processed_at = Utc::now();
                *existing = record;
            }
            None => records.push(record),
        }
        Ok(())
    }

    async fn recent(&self, limit: usize, relevant_only: bool) -> Result<Vec<ArticleRecord>> {
        let records = self.records.read().await;
        let mut selected: Vec<ArticleRecord> = records
            .iter()
            .filter(|record| !relevant_only || record.genai_related)
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.discovered_at.cmp(&a.discovered_at));
        selected.truncate(limit);
        Ok(selected)
    }

    async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}
