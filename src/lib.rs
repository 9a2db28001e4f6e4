pub mod classifier;
pub mod config;
pub mod fetcher;
pub mod ledger;
pub mod model;
pub mod monitor;
pub mod retry;
pub mod scheduler;
pub mod sources;
pub mod stats;
pub mod store;
pub mod summarizer;
pub mod types;

pub use classifier::GenAiClassifier;
pub use config::MonitorConfig;
pub use fetcher::{ArticleFetcher, FetchConfig, HttpFetcher};
pub use ledger::SeenLedger;
pub use model::{HttpTextModel, MockTextModel, TextModel};
pub use monitor::ContentMonitor;
pub use retry::RetryPolicy;
pub use scheduler::{Cadence, MonitorScheduler};
pub use sources::{Company, SourceRegistry};
pub use stats::{LogStatsSink, MemoryStatsSink, StatsSink};
pub use store::{ArticleStore, JsonArticleStore, MemoryArticleStore};
pub use summarizer::{extractive_summary, Summarizer};
pub use types::*;
