use crate::core::config::{FeedConfig, RateLimitPolicy};
use crate::core::error::FeedError;
use crate::core::limiter::RateLimiter;
use crate::core::rates::{CurrencyRecord, RateSnapshot, Rates, Selector};
use crate::core::source::RateSource;
use anyhow::Result;
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// `<ValCurs>` root of the daily rates document.
#[derive(Debug, Deserialize)]
struct ValCurs {
    #[serde(rename = "Valute", default)]
    valutes: Vec<Valute>,
}

#[derive(Debug, Deserialize)]
struct Valute {
    #[serde(rename = "@ID")]
    id: String,
    #[serde(rename = "CharCode")]
    char_code: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Value")]
    value: String,
}

/// A parsed currency element with the feed identifier used for filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: String,
    pub record: CurrencyRecord,
}

impl From<Valute> for FeedEntry {
    fn from(v: Valute) -> Self {
        FeedEntry {
            id: v.id,
            record: CurrencyRecord::new(v.char_code, v.name, v.value),
        }
    }
}

/// Parses a daily rates document. Values are kept exactly as published.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let feed: ValCurs =
        quick_xml::de::from_str(xml).map_err(|e| FeedError::MalformedFeed(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(feed.valutes.len());
    for valute in feed.valutes {
        if !seen.insert(valute.char_code.clone()) {
            return Err(FeedError::MalformedFeed(format!(
                "duplicate currency code {}",
                valute.char_code
            )));
        }
        entries.push(FeedEntry::from(valute));
    }
    Ok(entries)
}

/// Decodes a feed body to text.
///
/// The encoding comes from a byte order mark, then the XML declaration, then
/// the `Content-Type` charset, and is UTF-8 when none of them name one.
pub fn decode_body(bytes: &[u8], charset: Option<&str>) -> Result<String, FeedError> {
    let declared = declared_encoding(bytes);
    let encoding = declared
        .as_deref()
        .or(charset)
        .and_then(|label| {
            let encoding = Encoding::for_label(label.trim().as_bytes());
            if encoding.is_none() {
                warn!("Unknown feed encoding '{label}', assuming UTF-8");
            }
            encoding
        })
        .unwrap_or(UTF_8);

    // Sniffs a BOM before falling back to `encoding`
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(FeedError::MalformedFeed(format!(
            "feed is not valid {}",
            used.name()
        )));
    }
    debug!(encoding = used.name(), "Decoded feed body");
    Ok(text.into_owned())
}

/// The `encoding` pseudo-attribute of a leading `<?xml ...?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let decl = head.trim_start_matches('\u{feff}').trim_start();
    let decl = decl.strip_prefix("<?xml")?;
    let decl = &decl[..decl.find("?>")?];

    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &rest[1..];
    Some(rest[..rest.find(quote)?].to_string())
}

/// `charset` parameter of a `Content-Type` value.
fn header_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

fn select(entries: &[FeedEntry], selector: &Selector) -> RateSnapshot {
    entries
        .iter()
        .filter(|e| selector.matches(&e.id))
        .map(|e| e.record.clone())
        .collect()
}

struct FetchState {
    limiter: RateLimiter,
    cached: Option<Vec<FeedEntry>>,
}

/// Central bank of Russia daily rates feed.
///
/// Construct one per process and share it (e.g. behind an `Arc`) so that all
/// callers go through the same rate limiter and cache.
pub struct CbrRateSource {
    url: String,
    client: reqwest::Client,
    on_rate_limit: RateLimitPolicy,
    state: Mutex<FetchState>,
}

impl CbrRateSource {
    pub fn new(url: &str, request_interval: Duration) -> Result<Self> {
        Self::with_timeout(url, request_interval, FeedConfig::default().timeout())
    }

    pub fn with_timeout(url: &str, request_interval: Duration, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("cbrfx/1.0")
            .timeout(timeout)
            .build()?;

        Ok(CbrRateSource {
            url: url.to_string(),
            client,
            on_rate_limit: RateLimitPolicy::default(),
            state: Mutex::new(FetchState {
                limiter: RateLimiter::new(request_interval),
                cached: None,
            }),
        })
    }

    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        Ok(
            Self::with_timeout(&config.url, config.request_interval()?, config.timeout())?
                .with_rate_limit_policy(config.on_rate_limit),
        )
    }

    pub fn with_rate_limit_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.on_rate_limit = policy;
        self
    }

    /// All records from the last successful fetch, if there was one.
    pub async fn cached_snapshot(&self) -> Option<RateSnapshot> {
        let state = self.state.lock().await;
        state
            .cached
            .as_deref()
            .map(|entries| select(entries, &Selector::All))
    }

    async fn download(&self) -> Result<Vec<FeedEntry>, FeedError> {
        debug!("Requesting currency rates from {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }

        let charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(header_charset)
            .map(str::to_owned);
        let bytes = response.bytes().await?;
        let body = decode_body(&bytes, charset.as_deref())?;
        parse_feed(&body)
    }

    async fn refresh(
        &self,
        state: &mut FetchState,
        selector: &Selector,
    ) -> Result<RateSnapshot, FeedError> {
        if !state.limiter.try_acquire(Instant::now()) {
            return Err(FeedError::RateLimited {
                interval: state.limiter.interval(),
            });
        }

        let entries = self.download().await?;
        let snapshot = select(&entries, selector);
        debug!(
            currencies = entries.len(),
            selected = snapshot.len(),
            "Updated cached rates"
        );
        state.cached = Some(entries);
        Ok(snapshot)
    }
}

#[async_trait]
impl RateSource for CbrRateSource {
    #[instrument(name = "CbrRatesFetch", skip(self))]
    async fn fetch(&self, selector: &Selector) -> Rates {
        // Held across the gate check, the request and the cache update
        let mut state = self.state.lock().await;

        match self.refresh(&mut state, selector).await {
            Ok(snapshot) => Rates::Snapshot(snapshot),
            Err(e @ FeedError::RateLimited { .. }) => {
                match (self.on_rate_limit, state.cached.as_deref()) {
                    (RateLimitPolicy::Cached, Some(entries)) => {
                        debug!("{e}, serving cached rates");
                        Rates::Snapshot(select(entries, selector))
                    }
                    _ => {
                        debug!("{e}");
                        Rates::Unavailable
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, url = %self.url, "Failed to fetch currency rates");
                Rates::Unavailable
            }
        }
    }
}
