use crate::classifier::GenAiClassifier;
use crate::config::MonitorConfig;
use crate::fetcher::ArticleFetcher;
use crate::ledger::SeenLedger;
use crate::sources::SourceRegistry;
use crate::stats::StatsSink;
use crate::store::ArticleStore;
use crate::summarizer::Summarizer;
use crate::types::{ArticleRecord, CandidateArticle, Result, RunStats};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Pipeline orchestrator: walks the configured sources sequentially, asks
/// the ledger "seen?", the classifier "relevant?", the summarizer
/// "condense", and writes results back to the ledger and article store.
pub struct ContentMonitor {
    config: MonitorConfig,
    fetcher: Arc<dyn ArticleFetcher>,
    classifier: GenAiClassifier,
    summarizer: Summarizer,
    ledger: SeenLedger,
    store: Arc<dyn ArticleStore>,
    registry: SourceRegistry,
    stats_sink: Arc<dyn StatsSink>,
}

impl ContentMonitor {
    pub fn new(
        config: MonitorConfig,
        fetcher: Arc<dyn ArticleFetcher>,
        summarizer: Summarizer,
        ledger: SeenLedger,
        store: Arc<dyn ArticleStore>,
        registry: SourceRegistry,
        stats_sink: Arc<dyn StatsSink>,
    ) -> Result<Self> {
        let classifier = GenAiClassifier::new(config.keywords.clone())?;
        Ok(Self {
            config,
            fetcher,
            classifier,
            summarizer,
            ledger,
            store,
            registry,
            stats_sink,
        })
    }

    /// One full monitoring pass over all configured sources. Per-source
    /// failures are logged and skipped; the pass itself only fails on
    /// conditions that make every source unprocessable.
    pub async fn run_once(&mut self) -> Result<RunStats> {
        let started = Instant::now();
        let websites = self.config.websites.clone();
        info!("Starting monitoring run over {} sources", websites.len());

        let mut total_found = 0usize;
        let mut total_relevant = 0usize;

        for (index, source_url) in websites.iter().enumerate() {
            // Politeness: fixed blocking delay between sequential fetches.
            if index > 0 && self.config.scrape_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.scrape_delay_ms)).await;
            }

            info!("Monitoring website: {}", source_url);
            let candidates = match self.fetcher.fetch(source_url).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    error!("Error processing website {}: {}", source_url, e);
                    continue;
                }
            };

            info!("Found {} articles on {}", candidates.len(), source_url);
            total_found += candidates.len();

            for candidate in candidates {
                match self.process_candidate(candidate).await {
                    Ok(true) => total_relevant += 1,
                    Ok(false) => {}
                    Err(e) => {
                        error!("Error processing candidate article: {}", e);
                    }
                }
            }
        }

        let stats = RunStats {
            total_found,
            total_relevant,
            source_count: websites.len(),
            elapsed_seconds: started.elapsed().as_secs(),
        };
        self.stats_sink.record_run(&stats);
        Ok(stats)
    }

    /// Returns Ok(true) when the candidate was new and GenAI-related.
    async fn process_candidate(&mut self, candidate: CandidateArticle) -> Result<bool> {
        if self.ledger.is_seen(&candidate.url) {
            // Seen URLs are skipped entirely: no re-classification, no
            // re-store.
            return Ok(false);
        }

        let verdict = self.classifier.classify(&candidate.content);
        let summary = if verdict.related {
            info!("New GenAI article found: {}", candidate.title);
            Some(self.summarizer.summarize(&candidate.content).await)
        } else {
            None
        };

        let company = self
            .registry
            .company_for_url(&candidate.url)
            .map(|c| c.name.clone());
        let now = Utc::now();
        let record = ArticleRecord {
            id: Uuid::new_v4(),
            url: candidate.url.clone(),
            title: candidate.title.clone(),
            content: candidate.content,
            summary,
            source_url: candidate.source_url,
            company,
            genai_related: verdict.related,
            discovered_at: now,
            processed_at: now,
        };

        // Both verdicts are stored and marked seen so no URL is ever
        // reprocessed; write failures are non-fatal to the run.
        if let Err(e) = self.store.upsert(record).await {
            warn!("Failed to store article {}: {}", candidate.url, e);
        }
        if let Err(e) = self.ledger.mark_seen(&candidate.url, Some(&candidate.title)) {
            warn!("Failed to persist ledger update for {}: {}", candidate.url, e);
        }

        Ok(verdict.related)
    }

    pub fn ledger(&self) -> &SeenLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut SeenLedger {
        &mut self.ledger
    }

    pub fn store(&self) -> Arc<dyn ArticleStore> {
        self.store.clone()
    }
}
