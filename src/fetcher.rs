use crate::retry::RetryPolicy;
use crate::types::{CandidateArticle, MonitorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Listing pages rarely surface more useful links than this; everything
/// past the cap is noise.
const MAX_CANDIDATES_PER_PAGE: usize = 20;
const MIN_TITLE_LEN: usize = 10;
const MIN_CONTENT_LEN: usize = 100;

/// Fetch collaborator: turns a monitored source URL into candidate
/// articles. Errors are per-source; the orchestrator skips and continues.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch(&self, source_url: &str) -> Result<Vec<CandidateArticle>>;
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "GenAI-Content-Monitor/1.0".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            max_redirects: 5,
        }
    }
}

/// HTTP fetcher: downloads a listing page, extracts candidate article
/// links, then downloads and extracts each article's text.
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .expect("Failed to create HTTP client");

        let retry = RetryPolicy::new(config.max_retries, config.retry_base_delay, 2.0);

        Self { client, retry }
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .retry
            .run("page fetch", || async {
                let response = self.client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(MonitorError::Fetch(format!(
                        "HTTP {} from {}",
                        response.status(),
                        url
                    )));
                }
                Ok(response)
            })
            .await?;

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ArticleFetcher for HttpFetcher {
    async fn fetch(&self, source_url: &str) -> Result<Vec<CandidateArticle>> {
        debug!("Fetching listing page: {}", source_url);
        let listing_html = self.get_text(source_url).await?;
        let links = extract_candidate_links(&listing_html, source_url);
        debug!("Found {} candidate links on {}", links.len(), source_url);

        let mut candidates = Vec::new();
        for link in links {
            match self.get_text(&link.url).await {
                Ok(article_html) => {
                    let content = extract_content(&article_html);
                    if content.len() >= MIN_CONTENT_LEN {
                        candidates.push(CandidateArticle {
                            title: link.title,
                            url: link.url,
                            content,
                            source_url: source_url.to_string(),
                        });
                    } else {
                        debug!("Skipping {}: content too short", link.url);
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch candidate {}: {}", link.url, e);
                }
            }
        }

        info!(
            "Successfully extracted {} articles from {}",
            candidates.len(),
            source_url
        );
        Ok(candidates)
    }
}

struct CandidateLink {
    title: String,
    url: String,
}

// Parsing stays in sync helpers so the parsed document never lives across
// an await point.
fn extract_candidate_links(html: &str, base_url: &str) -> Vec<CandidateLink> {
    let document = Html::parse_document(html);
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(e) => {
            warn!("Invalid base URL {}: {}", base_url, e);
            return Vec::new();
        }
    };

    let container_selectors = [
        "article",
        ".post",
        ".entry",
        ".blog-post",
        ".article",
        ".content-item",
        ".news-item",
    ];
    let title_selectors = ["h1", "h2", "h3", ".title", ".headline"];
    let link_selector = parse_selector("a[href]");

    let mut links: Vec<CandidateLink> = Vec::new();

    for selector_str in &container_selectors {
        let Some(selector) = Selector::parse(selector_str).ok() else {
            continue;
        };
        for container in document.select(&selector) {
            let title = title_selectors.iter().find_map(|title_sel| {
                let sel = Selector::parse(title_sel).ok()?;
                container
                    .select(&sel)
                    .next()
                    .map(|el| el.text().collect::<String>().trim().to_string())
            });

            let href = link_selector.as_ref().and_then(|sel| {
                container
                    .select(sel)
                    .next()
                    .and_then(|el| el.value().attr("href"))
                    .map(|h| h.to_string())
            });

            if let (Some(title), Some(href)) = (title, href) {
                if title.len() >= MIN_TITLE_LEN {
                    if let Ok(absolute) = base.join(&href) {
                        links.push(CandidateLink {
                            title,
                            url: absolute.to_string(),
                        });
                    }
                }
            }
        }
        if !links.is_empty() {
            break;
        }
    }

    // Fallback: plain links whose anchor text looks like a headline.
    if links.is_empty() {
        if let Some(sel) = link_selector.as_ref() {
            for anchor in document.select(sel) {
                let title = anchor.text().collect::<String>().trim().to_string();
                let Some(href) = anchor.value().attr("href") else {
                    continue;
                };
                if title.len() >= MIN_TITLE_LEN {
                    if let Ok(absolute) = base.join(href) {
                        links.push(CandidateLink {
                            title,
                            url: absolute.to_string(),
                        });
                    }
                }
            }
        }
    }

    links.dedup_by(|a, b| a.url == b.url);
    links.truncate(MAX_CANDIDATES_PER_PAGE);
    links
}

fn extract_content(html: &str) -> String {
    let document = Html::parse_document(html);

    let content_selectors = [
        "article",
        "main",
        "[role=\"main\"]",
        ".content",
        "#content",
        ".post",
        ".entry",
        ".article-content",
        ".blog-post",
    ];

    for selector_str in &content_selectors {
        let Some(selector) = Selector::parse(selector_str).ok() else {
            continue;
        };
        let text: String = document
            .select(&selector)
            .flat_map(|el| el.text())
            .collect::<Vec<_>>()
            .join(" ");
        let normalized = normalize_whitespace(&text);
        if !normalized.is_empty() {
            return normalized;
        }
    }

    // Fallback to the whole body text.
    if let Some(body_sel) = Selector::parse("body").ok() {
        let text: String = document
            .select(&body_sel)
            .flat_map(|el| el.text())
            .collect::<Vec<_>>()
            .join(" ");
        return normalize_whitespace(&text);
    }

    String::new()
}

fn parse_selector(raw: &str) -> Option<Selector> {
    Selector::parse(raw).ok()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
