use anyhow::Context;
use clap::{Parser, Subcommand};
use genai_monitor::{
    Cadence, ContentMonitor, FetchConfig, HttpFetcher, HttpTextModel, JsonArticleStore,
    LogStatsSink, MonitorConfig, MonitorScheduler, RetryPolicy, SeenLedger, SourceRegistry,
    Summarizer,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "genai-monitor", about = "Monitors corporate web pages for generative-AI content")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single monitoring pass and exit
    Run,
    /// Run the recurring scheduler until interrupted
    Schedule {
        /// Cadence: hourly, every_2_hours, every_6_hours, daily, twice_daily, weekly
        #[arg(long)]
        cadence: Option<String>,
    },
    /// Print ledger statistics
    Stats,
    /// Remove ledger entries older than the given age
    Cleanup {
        #[arg(long, default_value_t = 30)]
        max_age_days: u32,
    },
    /// List recently stored articles
    Recent {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Include non-GenAI articles
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = MonitorConfig::from_env().context("invalid configuration")?;

    match cli.command {
        Command::Run => {
            let mut monitor = build_monitor(config)?;
            let stats = monitor.run_once().await?;
            info!(
                "Run finished: {} articles found, {} GenAI-related, {} sources",
                stats.total_found, stats.total_relevant, stats.source_count
            );
        }
        Command::Schedule { cadence } => {
            let cadence = cadence
                .map(|raw| Cadence::parse(&raw))
                .unwrap_or(config.cadence);
            let monitor = build_monitor(config)?;
            let mut scheduler = MonitorScheduler::new(monitor, cadence);

            let stop = scheduler.stop_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Received shutdown signal, finishing current cycle");
                    stop.store(true, std::sync::atomic::Ordering::SeqCst);
                }
            });

            scheduler.start().await?;
        }
        Command::Stats => {
            let ledger = SeenLedger::load(&config.ledger_path);
            let stats = ledger.stats();
            println!("Articles seen:  {}", stats.total_articles_seen);
            println!("Created at:     {}", stats.created_at);
            println!("Last updated:   {}", stats.last_updated);
            println!("Store size:     {} bytes", stats.file_size_bytes);
        }
        Command::Cleanup { max_age_days } => {
            let mut ledger = SeenLedger::load(&config.ledger_path);
            let removed = ledger.cleanup(max_age_days)?;
            info!("Removed {} entries older than {} days", removed, max_age_days);
        }
        Command::Recent { limit, all } => {
            let store = JsonArticleStore::load(&config.articles_path);
            let records = genai_monitor::ArticleStore::recent(&store, limit, !all).await?;
            for record in records {
                println!(
                    "[{}] {} ({})",
                    record.discovered_at.format("%Y-%m-%d %H:%M"),
                    record.title,
                    record.url
                );
                if let Some(summary) = &record.summary {
                    println!("    {}", summary);
                }
            }
        }
    }

    Ok(())
}

fn build_monitor(config: MonitorConfig) -> anyhow::Result<ContentMonitor> {
    let fetch_config = FetchConfig {
        timeout_secs: config.request_timeout_secs,
        max_retries: config.max_retries,
        ..FetchConfig::default()
    };
    let fetcher = Arc::new(HttpFetcher::new(fetch_config));

    let model = Arc::new(HttpTextModel::new(
        config.model_endpoint.clone(),
        config.model.clone(),
        config.model_api_key.clone(),
        config.request_timeout_secs,
    ));
    let retry = RetryPolicy::new(config.max_retries, Duration::from_secs(1), 2.0);
    let summarizer = Summarizer::new(model, retry, config.keywords.clone())
        .with_lengths(config.summary_max_len, config.summary_min_len);

    let ledger = SeenLedger::load(&config.ledger_path);
    let store = Arc::new(JsonArticleStore::load(&config.articles_path));
    let registry = SourceRegistry::load(&config.companies_path);
    let stats_sink = Arc::new(LogStatsSink::new());

    Ok(ContentMonitor::new(
        config, fetcher, summarizer, ledger, store, registry, stats_sink,
    )?)
}
