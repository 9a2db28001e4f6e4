use crate::scheduler::Cadence;
use crate::types::{MonitorError, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;
use url::Url;

/// Immutable application configuration. Built once from the environment,
/// validated at construction; invalid numeric values fall back to their
/// defaults with a warning, but an empty website list is fatal.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Listing pages to monitor for new articles.
    pub websites: Vec<String>,
    /// Lower-cased keywords driving the classifier and extractive summaries.
    pub keywords: Vec<String>,
    /// Model identifier sent to the text-generation endpoint.
    pub model: String,
    pub model_endpoint: String,
    pub model_api_key: Option<String>,
    pub summary_max_len: usize,
    pub summary_min_len: usize,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    /// Politeness delay between sequential source fetches.
    pub scrape_delay_ms: u64,
    pub ledger_path: PathBuf,
    pub articles_path: PathBuf,
    pub companies_path: PathBuf,
    pub cadence: Cadence,
}

impl MonitorConfig {
    /// Build configuration from environment variables, falling back to
    /// defaults where unset.
    pub fn from_env() -> Result<Self> {
        let websites = match env::var("WEBSITES") {
            Ok(raw) if !raw.trim().is_empty() => parse_list(&raw),
            _ => default_websites(),
        };

        let keywords = match env::var("GENAI_KEYWORDS") {
            Ok(raw) if !raw.trim().is_empty() => parse_list(&raw)
                .into_iter()
                .map(|k| k.to_lowercase())
                .collect(),
            _ => default_keywords(),
        };

        let cadence = match env::var("SCHEDULE_INTERVAL") {
            Ok(raw) => Cadence::parse(&raw),
            Err(_) => Cadence::Daily,
        };

        let config = Self {
            websites,
            keywords,
            model: env::var("SUMMARIZATION_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            model_endpoint: env::var("MODEL_ENDPOINT")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            model_api_key: env::var("OPENAI_API_KEY").ok(),
            summary_max_len: env_parse("SUMMARY_MAX_LENGTH", 150),
            summary_min_len: env_parse("SUMMARY_MIN_LENGTH", 50),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT", 30),
            max_retries: env_parse("MAX_RETRIES", 3),
            scrape_delay_ms: env_parse("SCRAPING_DELAY_MS", 2000),
            ledger_path: env::var("STORAGE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/articles_seen.json")),
            articles_path: env::var("ARTICLES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/articles.json")),
            companies_path: env::var("COMPANIES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/companies.json")),
            cadence,
        };

        config.validate()
    }

    fn validate(mut self) -> Result<Self> {
        self.websites.retain(|site| match Url::parse(site) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => true,
            _ => {
                warn!("Dropping invalid website URL from configuration: {}", site);
                false
            }
        });

        if self.websites.is_empty() {
            return Err(MonitorError::Config(
                "at least one website URL must be configured".to_string(),
            ));
        }
        if self.keywords.is_empty() {
            return Err(MonitorError::Config(
                "at least one keyword must be configured".to_string(),
            ));
        }
        if self.summary_min_len >= self.summary_max_len {
            warn!(
                "summary_min_len {} >= summary_max_len {}, using defaults",
                self.summary_min_len, self.summary_max_len
            );
            self.summary_min_len = 50;
            self.summary_max_len = 150;
        }
        Ok(self)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            websites: default_websites(),
            keywords: default_keywords(),
            model: "gpt-4o".to_string(),
            model_endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model_api_key: None,
            summary_max_len: 150,
            summary_min_len: 50,
            request_timeout_secs: 30,
            max_retries: 3,
            scrape_delay_ms: 2000,
            ledger_path: PathBuf::from("data/articles_seen.json"),
            articles_path: PathBuf::from("data/articles.json"),
            companies_path: PathBuf::from("data/companies.json"),
            cadence: Cadence::Daily,
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn env_parse<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid value for {}: {:?}, using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

/// Default monitored pages: corporate newsrooms of financial-sector
/// companies.
pub fn default_websites() -> Vec<String> {
    [
        "https://www.jpmorganchase.com/news",
        "https://www.jpmorgan.com/insights",
        "https://newsroom.bankofamerica.com",
        "https://about.bankofamerica.com/en/making-an-impact",
        "https://www.capitalone.com/about/newsroom",
        "https://www.capitalone.com/tech",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Default generative-AI keyword list used by the classifier and the
/// extractive summarizer.
pub fn default_keywords() -> Vec<String> {
    [
        "generative ai",
        "genai",
        "gpt",
        "large language model",
        "llm",
        "chatgpt",
        "claude",
        "artificial intelligence",
        "machine learning",
        "neural network",
        "transformer",
        "diffusion",
        "stable diffusion",
        "midjourney",
        "dall-e",
        "text generation",
        "image generation",
        "natural language processing",
        "nlp",
        "deep learning",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MonitorConfig::default();
        assert!(!config.websites.is_empty());
        assert_eq!(config.keywords.len(), 20);
        assert!(config.keywords.iter().all(|k| *k == k.to_lowercase()));
    }

    #[test]
    fn empty_website_list_is_fatal() {
        let config = MonitorConfig {
            websites: Vec::new(),
            ..MonitorConfig::default()
        };
        assert!(matches!(config.validate(), Err(MonitorError::Config(_))));
    }

    #[test]
    fn invalid_urls_are_dropped() {
        let config = MonitorConfig {
            websites: vec![
                "not a url".to_string(),
                "ftp://example.com".to_string(),
                "https://example.com/news".to_string(),
            ],
            ..MonitorConfig::default()
        };
        let validated = config.validate().unwrap();
        assert_eq!(validated.websites, vec!["https://example.com/news".to_string()]);
    }

    #[test]
    fn parse_list_trims_and_skips_empty() {
        assert_eq!(
            parse_list("a, b ,, c"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }
}
