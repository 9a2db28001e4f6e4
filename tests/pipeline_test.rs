use async_trait::async_trait;
use genai_monitor::{
    ArticleFetcher, ArticleStore, CandidateArticle, Cadence, ContentMonitor, MemoryArticleStore,
    MemoryStatsSink, MockTextModel, MonitorConfig, MonitorError, MonitorScheduler, Result,
    RetryPolicy, SeenLedger, SourceRegistry, Summarizer, TextModel,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Fetch collaborator with canned responses per source URL.
struct MockFetcher {
    by_source: HashMap<String, Vec<CandidateArticle>>,
    failing_sources: HashSet<String>,
}

impl MockFetcher {
    fn new() -> Self {
        Self {
            by_source: HashMap::new(),
            failing_sources: HashSet::new(),
        }
    }

    fn with_articles(mut self, source_url: &str, articles: Vec<CandidateArticle>) -> Self {
        self.by_source.insert(source_url.to_string(), articles);
        self
    }

    fn with_failure(mut self, source_url: &str) -> Self {
        self.failing_sources.insert(source_url.to_string());
        self
    }
}

#[async_trait]
impl ArticleFetcher for MockFetcher {
    async fn fetch(&self, source_url: &str) -> Result<Vec<CandidateArticle>> {
        if self.failing_sources.contains(source_url) {
            return Err(MonitorError::Fetch(format!("connection refused: {}", source_url)));
        }
        Ok(self.by_source.get(source_url).cloned().unwrap_or_default())
    }
}

fn candidate(url: &str, title: &str, content: &str, source_url: &str) -> CandidateArticle {
    CandidateArticle {
        title: title.to_string(),
        url: url.to_string(),
        content: content.to_string(),
        source_url: source_url.to_string(),
    }
}

struct Harness {
    monitor: ContentMonitor,
    store: Arc<MemoryArticleStore>,
    stats: Arc<MemoryStatsSink>,
    _ledger_dir: TempDir,
}

fn harness(websites: Vec<&str>, fetcher: MockFetcher, model: MockTextModel) -> Harness {
    let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).try_init();

    let ledger_dir = TempDir::new().unwrap();
    let config = MonitorConfig {
        websites: websites.into_iter().map(|s| s.to_string()).collect(),
        scrape_delay_ms: 0,
        ..MonitorConfig::default()
    };

    let retry = RetryPolicy::new(2, Duration::from_millis(1), 2.0);
    let summarizer = Summarizer::new(Arc::new(model), retry, config.keywords.clone())
        .with_lengths(config.summary_max_len, config.summary_min_len);
    let ledger = SeenLedger::load(ledger_dir.path().join("seen.json"));
    let store = Arc::new(MemoryArticleStore::new());
    let stats = Arc::new(MemoryStatsSink::new());

    let monitor = ContentMonitor::new(
        config,
        Arc::new(fetcher),
        summarizer,
        ledger,
        store.clone(),
        SourceRegistry::with_companies(Vec::new()),
        stats.clone(),
    )
    .unwrap();

    Harness {
        monitor,
        store,
        stats,
        _ledger_dir: ledger_dir,
    }
}

const SOURCE: &str = "https://example.com/newsroom";

const GENAI_TEXT: &str = "The bank announced a generative ai initiative today. \
    Its engineers built the assistant on gpt technology. \
    A chatgpt-style interface will reach customers next quarter. \
    Executives expect meaningful productivity gains.";

#[tokio::test]
async fn relevant_article_is_processed_once_and_skipped_on_rerun() {
    let url = "https://example.com/newsroom/genai-launch";
    let fetcher = MockFetcher::new().with_articles(
        SOURCE,
        vec![candidate(url, "GenAI launch", GENAI_TEXT, SOURCE)],
    );
    let mut h = harness(vec![SOURCE], fetcher, MockTextModel::with_reply("Bank ships GenAI assistant"));

    let first = h.monitor.run_once().await.unwrap();
    assert_eq!(first.total_found, 1);
    assert_eq!(first.total_relevant, 1);

    let records = h.store.recent(10, true).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].genai_related);
    assert_eq!(records[0].summary.as_deref(), Some("Bank ships GenAI assistant."));
    assert_eq!(h.monitor.ledger().get(url).unwrap().seen_count, 1);

    // Identical second run: the URL is seen, so it is neither reclassified
    // nor re-stored, and the seen count stays at 1.
    let second = h.monitor.run_once().await.unwrap();
    assert_eq!(second.total_found, 1);
    assert_eq!(second.total_relevant, 0);
    assert_eq!(h.store.count().await, 1);
    assert_eq!(h.monitor.ledger().get(url).unwrap().seen_count, 1);

    let runs = h.stats.runs();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].source_count, 1);
}

#[tokio::test]
async fn non_relevant_articles_are_stored_and_never_reprocessed() {
    let url = "https://example.com/newsroom/earnings";
    let boring = "Quarterly revenue rose four percent on strong deposit growth. \
        The dividend was raised by two cents. Branch renovations continue in the midwest.";
    let fetcher = MockFetcher::new().with_articles(
        SOURCE,
        vec![candidate(url, "Earnings beat", boring, SOURCE)],
    );
    let mut h = harness(vec![SOURCE], fetcher, MockTextModel::with_reply("unused"));

    let stats = h.monitor.run_once().await.unwrap();
    assert_eq!(stats.total_found, 1);
    assert_eq!(stats.total_relevant, 0);

    // Stored with the flag down and no summary, and marked seen.
    let all = h.store.recent(10, false).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(!all[0].genai_related);
    assert!(all[0].summary.is_none());
    assert!(h.store.recent(10, true).await.unwrap().is_empty());
    assert!(h.monitor.ledger().is_seen(url));

    let second = h.monitor.run_once().await.unwrap();
    assert_eq!(second.total_relevant, 0);
    assert_eq!(h.monitor.ledger().get(url).unwrap().seen_count, 1);
}

#[tokio::test]
async fn failing_model_still_yields_terminated_summaries() {
    let urls = [
        "https://example.com/newsroom/one",
        "https://example.com/newsroom/two",
    ];
    let fetcher = MockFetcher::new().with_articles(
        SOURCE,
        urls.iter()
            .map(|url| candidate(url, "A GenAI story headline", GENAI_TEXT, SOURCE))
            .collect(),
    );
    let mut h = harness(vec![SOURCE], fetcher, MockTextModel::failing());

    let stats = h.monitor.run_once().await.unwrap();
    assert_eq!(stats.total_relevant, 2);

    for record in h.store.recent(10, true).await.unwrap() {
        let summary = record.summary.expect("relevant article must be summarized");
        assert!(!summary.is_empty());
        assert!(
            summary.ends_with('.') || summary.ends_with("..."),
            "summary not terminated: {:?}",
            summary
        );
    }
}

#[tokio::test]
async fn source_failure_does_not_abort_remaining_sources() {
    let good_source = "https://example.com/newsroom";
    let bad_source = "https://down.example.com/news";
    let fetcher = MockFetcher::new()
        .with_failure(bad_source)
        .with_articles(
            good_source,
            vec![candidate(
                "https://example.com/newsroom/story",
                "A GenAI story headline",
                GENAI_TEXT,
                good_source,
            )],
        );
    let mut h = harness(vec![bad_source, good_source], fetcher, MockTextModel::failing());

    let stats = h.monitor.run_once().await.unwrap();
    assert_eq!(stats.source_count, 2);
    assert_eq!(stats.total_found, 1);
    assert_eq!(stats.total_relevant, 1);
}

#[tokio::test]
async fn duplicate_candidates_within_one_run_are_processed_once() {
    let url = "https://example.com/newsroom/dup";
    let fetcher = MockFetcher::new().with_articles(
        SOURCE,
        vec![
            candidate(url, "A GenAI story headline", GENAI_TEXT, SOURCE),
            candidate(url, "A GenAI story headline", GENAI_TEXT, SOURCE),
        ],
    );
    let mut h = harness(vec![SOURCE], fetcher, MockTextModel::failing());

    let stats = h.monitor.run_once().await.unwrap();
    assert_eq!(stats.total_found, 2);
    assert_eq!(stats.total_relevant, 1);
    assert_eq!(h.store.count().await, 1);
    assert_eq!(h.monitor.ledger().get(url).unwrap().seen_count, 1);
}

#[tokio::test]
async fn scheduler_runs_immediately_and_stops_cooperatively() {
    let fetcher = MockFetcher::new().with_articles(SOURCE, Vec::new());
    let h = harness(vec![SOURCE], fetcher, MockTextModel::failing());
    let stats = h.stats.clone();

    let mut scheduler = MonitorScheduler::new(h.monitor, Cadence::Hourly)
        .with_intervals(Duration::from_millis(5), Duration::from_millis(5));
    let stop = scheduler.stop_handle();

    let handle = tokio::spawn(async move { scheduler.start().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    stop.store(true, std::sync::atomic::Ordering::SeqCst);
    handle.await.unwrap().unwrap();

    // The initial pass ran even though the hourly cadence never came due.
    assert_eq!(stats.runs().len(), 1);
}

#[tokio::test]
async fn scheduler_survives_failing_runs() {
    // Every source errors, so each run completes with zero articles rather
    // than killing the loop.
    let fetcher = MockFetcher::new().with_failure(SOURCE);
    let h = harness(vec![SOURCE], fetcher, MockTextModel::failing());
    let stats = h.stats.clone();

    let mut scheduler = MonitorScheduler::new(h.monitor, Cadence::Hourly)
        .with_intervals(Duration::from_millis(5), Duration::from_millis(5));
    let stop = scheduler.stop_handle();

    let handle = tokio::spawn(async move { scheduler.start().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    stop.store(true, std::sync::atomic::Ordering::SeqCst);
    let result = handle.await.unwrap();
    assert!(result.is_ok());
    assert_eq!(stats.runs().len(), 1);
}

#[test]
fn mock_model_shapes_are_stable() {
    // Guard the test doubles other suites rely on.
    let failing = MockTextModel::failing();
    let replying = MockTextModel::with_reply("ok");
    assert_eq!(failing.model_name(), "mock");
    assert_eq!(replying.model_name(), "mock");
}
