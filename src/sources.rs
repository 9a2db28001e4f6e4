use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use url::Url;

/// An organization whose web presence is monitored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub sector: String,
    pub websites: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Registry of monitored companies. The article→company association it
/// derives is advisory, by URL prefix or shared domain, never a hard key.
pub struct SourceRegistry {
    companies: Vec<Company>,
}

impl SourceRegistry {
    /// Load companies from a JSON file, falling back to the default
    /// financial-sector set when the file is missing or unreadable.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let companies = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Vec<Company>>(&raw) {
                Ok(companies) => {
                    info!("Loaded {} companies from {}", companies.len(), path.display());
                    companies
                }
                Err(e) => {
                    warn!("Error parsing companies file {}: {}", path.display(), e);
                    default_companies()
                }
            },
            Err(_) => default_companies(),
        };

        Self { companies }
    }

    pub fn with_companies(companies: Vec<Company>) -> Self {
        Self { companies }
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    /// All monitored website URLs across companies.
    pub fn websites(&self) -> Vec<String> {
        self.companies
            .iter()
            .flat_map(|company| company.websites.iter().cloned())
            .collect()
    }

    /// Advisory company association for an article URL: exact prefix match
    /// first, then shared domain.
    pub fn company_for_url(&self, url: &str) -> Option<&Company> {
        if let Some(company) = self
            .companies
            .iter()
            .find(|company| company.websites.iter().any(|site| url.starts_with(site.as_str())))
        {
            return Some(company);
        }

        let domain = host_of(url)?;
        self.companies.iter().find(|company| {
            company
                .websites
                .iter()
                .any(|site| host_of(site).as_deref() == Some(domain.as_str()))
        })
    }
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.to_string()))
}

/// Default monitored set: financial-sector corporate newsrooms.
pub fn default_companies() -> Vec<Company> {
    vec![
        Company {
            name: "JPMorgan Chase".to_string(),
            sector: "Banking".to_string(),
            websites: vec![
                "https://www.jpmorganchase.com/news".to_string(),
                "https://www.jpmorgan.com/insights".to_string(),
            ],
            keywords: vec![
                "artificial intelligence".to_string(),
                "machine learning".to_string(),
                "digital transformation".to_string(),
            ],
        },
        Company {
            name: "Bank of America".to_string(),
            sector: "Banking".to_string(),
            websites: vec![
                "https://newsroom.bankofamerica.com".to_string(),
                "https://about.bankofamerica.com/en/making-an-impact".to_string(),
            ],
            keywords: vec![
                "digital banking".to_string(),
                "innovation".to_string(),
                "automation".to_string(),
            ],
        },
        Company {
            name: "Capital One".to_string(),
            sector: "Banking".to_string(),
            websites: vec![
                "https://www.capitalone.com/about/newsroom".to_string(),
                "https://www.capitalone.com/tech".to_string(),
            ],
            keywords: vec![
                "machine learning".to_string(),
                "cloud".to_string(),
                "technology".to_string(),
            ],
        },
        Company {
            name: "Goldman Sachs".to_string(),
            sector: "Investment Banking".to_string(),
            websites: vec![
                "https://www.goldmansachs.com/insights".to_string(),
                "https://www.goldmansachs.com/media".to_string(),
            ],
            keywords: vec![
                "artificial intelligence".to_string(),
                "algorithmic trading".to_string(),
                "fintech".to_string(),
            ],
        },
        Company {
            name: "Morgan Stanley".to_string(),
            sector: "Investment Banking".to_string(),
            websites: vec![
                "https://www.morganstanley.com/ideas".to_string(),
                "https://www.morganstanley.com/press-releases".to_string(),
            ],
            keywords: vec![
                "technology".to_string(),
                "digital transformation".to_string(),
            ],
        },
    ]
}
