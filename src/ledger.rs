use crate::types::{LedgerSnapshot, LedgerStats, Result, SeenArticle};
use chrono::{Duration, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Durable record of URLs already evaluated. Single writer; every mutation
/// rewrites the whole snapshot through a temp-file + rename so readers never
/// observe a partial store and a crash mid-write leaves the previous version
/// intact.
pub struct SeenLedger {
    path: PathBuf,
    snapshot: LedgerSnapshot,
}

impl SeenLedger {
    /// Load the ledger from `path`, starting fresh when the file is missing
    /// or unreadable.
    pub fn load<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let snapshot = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<LedgerSnapshot>(&raw) {
                Ok(snapshot) => {
                    info!(
                        "Loaded {} seen articles from {}",
                        snapshot.articles.len(),
                        path.display()
                    );
                    snapshot
                }
                Err(e) => {
                    error!("Error parsing ledger {}: {}, starting fresh", path.display(), e);
                    LedgerSnapshot::new()
                }
            },
            Err(_) => {
                info!("No existing ledger found, creating new store: {}", path.display());
                LedgerSnapshot::new()
            }
        };

        Self { path, snapshot }
    }

    pub fn is_seen(&self, url: &str) -> bool {
        self.snapshot.articles.contains_key(url)
    }

    /// Record a sighting of `url`. First sighting initializes the count to
    /// 1; repeats increment it and preserve the first-seen timestamp. The
    /// snapshot is persisted before returning; a write failure keeps the
    /// in-memory state so a later write can still succeed.
    pub fn mark_seen(&mut self, url: &str, title: Option<&str>) -> Result<()> {
        match self.snapshot.articles.get_mut(url) {
            Some(existing) => {
                existing.seen_count += 1;
                if title.is_some() {
                    existing.title = title.map(|t| t.to_string());
                }
            }
            None => {
                self.snapshot.articles.insert(
                    url.to_string(),
                    SeenArticle {
                        title: title.map(|t| t.to_string()),
                        first_seen: Some(Utc::now()),
                        seen_count: 1,
                    },
                );
            }
        }
        debug!("Marked article as seen: {:?} ({})", title, url);
        self.persist()
    }

    /// Remove entries first seen before the cutoff. Entries with an
    /// unparsable first-seen timestamp are treated as corrupt and always
    /// evicted.
    pub fn cleanup(&mut self, max_age_days: u32) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(i64::from(max_age_days));
        let before = self.snapshot.articles.len();
        self.snapshot
            .articles
            .retain(|_, article| matches!(article.first_seen, Some(first) if first >= cutoff));
        let removed = before - self.snapshot.articles.len();

        if removed > 0 {
            info!("Cleaned up {} old articles", removed);
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn stats(&self) -> LedgerStats {
        let file_size_bytes = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        LedgerStats {
            total_articles_seen: self.snapshot.articles.len(),
            created_at: self.snapshot.created_at,
            last_updated: self.snapshot.last_updated,
            file_size_bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.articles.is_empty()
    }

    pub fn get(&self, url: &str) -> Option<&SeenArticle> {
        self.snapshot.articles.get(url)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&mut self) -> Result<()> {
        self.snapshot.last_updated = Utc::now();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.snapshot)?;
        let temp_path = self.path.with_extension("json.tmp");

        // Write-then-rename keeps the previous version intact on a crash.
        if let Err(e) = fs::write(&temp_path, json).and_then(|_| fs::rename(&temp_path, &self.path))
        {
            warn!("Error saving ledger {}: {}", self.path.display(), e);
            return Err(e.into());
        }

        debug!("Saved ledger to {}", self.path.display());
        Ok(())
    }
}
