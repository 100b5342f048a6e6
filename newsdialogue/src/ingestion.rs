use anyhow::{Context, Result};
use common::{FeedConfig, FeedMode};
use feed_rs::parser;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// The most recent entry of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub content: String,
    pub link: String,
}

/// Why no news item could be produced.
#[derive(Error, Debug)]
pub enum NewsError {
    #[error("feed unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),
    #[error("feed response could not be parsed: {0}")]
    Malformed(String),
    #[error("conversion service reported status {0:?}")]
    BadStatus(Option<String>),
    #[error("feed returned no items")]
    NoItems,
}

/// Body returned by the RSS-to-JSON conversion service. Items stay untyped
/// until picked so a quirk in an older entry can't sink the response.
#[derive(Debug, Deserialize)]
struct ConverterResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    items: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ConverterItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

/// Fetches the latest item of one fixed feed. Every call is a fresh round-trip.
#[derive(Debug, Clone)]
pub struct NewsFetcher {
    client: Client,
    mode: FeedMode,
    rss_url: String,
    converter_url: String,
}

impl NewsFetcher {
    pub fn new(
        mode: FeedMode,
        rss_url: impl Into<String>,
        converter_url: impl Into<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let mut builder = Client::builder().user_agent("newsdialogue/0.1.0");
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("failed to build reqwest client")?;

        Ok(Self {
            client,
            mode,
            rss_url: rss_url.into(),
            converter_url: converter_url.into(),
        })
    }

    pub fn from_config(cfg: &FeedConfig) -> Result<Self> {
        Self::new(cfg.mode, cfg.rss_url(), cfg.converter_url(), cfg.timeout_seconds)
    }

    /// Conversion service URL with the feed address percent-encoded into `rss_url`.
    pub fn request_url(&self) -> Result<Url> {
        Url::parse_with_params(&self.converter_url, &[("rss_url", self.rss_url.as_str())])
            .with_context(|| format!("invalid converter endpoint: {}", self.converter_url))
    }

    /// Fetch the newest item. Failures are logged here and handed back to the
    /// caller, never raised past it.
    pub async fn fetch_latest(&self) -> Result<NewsItem, NewsError> {
        let start = Instant::now();
        let result = match self.mode {
            FeedMode::Converter => self.fetch_converted().await,
            FeedMode::Direct => self.fetch_direct().await,
        };

        match &result {
            Ok(item) => info!(
                title = %item.title,
                duration_ms = start.elapsed().as_millis() as u64,
                "latest news item fetched"
            ),
            Err(e) => warn!(feed = %self.rss_url, "failed to fetch news: {}", e),
        }
        result
    }

    async fn fetch_converted(&self) -> Result<NewsItem, NewsError> {
        let url = self
            .request_url()
            .map_err(|e| NewsError::Malformed(format!("{:#}", e)))?;
        debug!(%url, "requesting converted feed");

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let parsed: ConverterResponse =
            serde_json::from_str(&body).map_err(|e| NewsError::Malformed(e.to_string()))?;
        first_converted_item(parsed)
    }

    async fn fetch_direct(&self) -> Result<NewsItem, NewsError> {
        debug!(url = %self.rss_url, "requesting feed document");

        let bytes = self
            .client
            .get(&self.rss_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let feed = parser::parse(bytes.as_ref()).map_err(|e| NewsError::Malformed(e.to_string()))?;
        let entry = feed.entries.into_iter().next().ok_or(NewsError::NoItems)?;

        Ok(NewsItem {
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            content: entry.summary.map(|s| s.content).unwrap_or_default(),
            link: entry
                .links
                .into_iter()
                .next()
                .map(|l| l.href)
                .unwrap_or_default(),
        })
    }
}

fn first_converted_item(resp: ConverterResponse) -> Result<NewsItem, NewsError> {
    if resp.status.as_deref() != Some("ok") {
        return Err(NewsError::BadStatus(resp.status));
    }
    let first = resp
        .items
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or(NewsError::NoItems)?;
    let first: ConverterItem =
        serde_json::from_value(first).map_err(|e| NewsError::Malformed(e.to_string()))?;
    Ok(NewsItem {
        title: first.title.unwrap_or_default(),
        content: first.description.unwrap_or_default(),
        link: first.link.unwrap_or_default(),
    })
}
