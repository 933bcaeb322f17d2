use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::chart::RawBar;
use super::traits::{Quote, QuoteProvider};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// The endpoint rejects clients without a browser-looking user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Quote provider speaking the chart endpoint:
/// `GET {base}/v8/finance/chart/{symbol}?interval={i}&range={r}`.
///
/// - **Free**: no API key.
/// - **Coverage**: global equities plus `USDKRW=X` style FX pairs.
/// - The base URL is configurable so browser-hosted frontends can point at
///   the same-origin serverless proxy instead of the provider directly.
///
/// HTTP 404 and an empty `chart.result` both classify as
/// [`CoreError::SymbolNotFound`] so the quote service can retry the
/// alternate Korean market suffix.
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the provider at a different base (the serverless proxy, or a
    /// local stub in tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let builder = Client::builder().user_agent(USER_AGENT);
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(10));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        interval: &str,
        range: &str,
    ) -> Result<ChartResult, CoreError> {
        let base = &self.base_url;
        let url = format!("{base}/v8/finance/chart/{symbol}?interval={interval}&range={range}");

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CoreError::SymbolNotFound(symbol.to_string()));
        }
        if !response.status().is_success() {
            return Err(CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("HTTP {} for {symbol}", response.status()),
            });
        }

        let body: ChartResponse = response.json().await.map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to parse chart response for {symbol}: {e}"),
        })?;

        body.chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.swap_remove(0))
                }
            })
            .ok_or_else(|| CoreError::SymbolNotFound(symbol.to_string()))
    }
}

impl Default for YahooChartProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Chart endpoint response types ───────────────────────────────────

#[derive(Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    currency: Option<String>,
}

#[derive(Deserialize, Default)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteArrays>,
}

/// Arrays aligned index-for-index with `timestamp`. Entries are nullable —
/// the feed leaves holes for halted or thin buckets.
#[derive(Deserialize, Default)]
struct QuoteArrays {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for YahooChartProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn current_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let result = self.fetch_chart(symbol, "1d", "1d").await?;

        let price = result
            .meta
            .regular_market_price
            .ok_or_else(|| CoreError::SymbolNotFound(symbol.to_string()))?;

        Ok(Quote {
            price,
            currency: result.meta.currency,
        })
    }

    async fn chart(
        &self,
        symbol: &str,
        interval: &str,
        range: &str,
    ) -> Result<Vec<RawBar>, CoreError> {
        let result = self.fetch_chart(symbol, interval, range).await?;

        let quotes = result.indicators.quote.into_iter().next().unwrap_or_default();
        let at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

        let bars = result
            .timestamp
            .iter()
            .enumerate()
            .map(|(i, &ts)| RawBar {
                timestamp: ts,
                open: at(&quotes.open, i),
                high: at(&quotes.high, i),
                low: at(&quotes.low, i),
                close: at(&quotes.close, i),
                volume: quotes.volume.get(i).copied().flatten(),
            })
            .collect();

        Ok(bars)
    }
}
