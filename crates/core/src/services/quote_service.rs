use chrono::Utc;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::chart::{ChartPeriod, RawBar};
use crate::models::exchange::ExchangeRate;
use crate::models::holding::{Holding, Market};
use crate::providers::symbol::{alternate_symbol, primary_symbol, EXCHANGE_RATE_SYMBOL};
use crate::providers::traits::{Quote, QuoteProvider};

/// Result of one holding's price lookup inside a fan-out refresh.
#[derive(Debug)]
pub struct PriceResult {
    pub holding_id: Uuid,

    /// Ticker code, for the per-symbol failure warning shown to the user
    pub code: String,

    pub outcome: Result<f64, CoreError>,
}

/// Tracks a single outstanding refresh. A periodic tick that fires while
/// the previous fan-out is still unsettled must be skipped, not stacked —
/// otherwise a slow network grows concurrent request batches without bound.
#[derive(Debug, Default)]
pub struct RefreshGuard {
    in_flight: AtomicBool,
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the refresh slot. Returns `false` if one is already running.
    pub fn try_begin(&self) -> bool {
        !self.in_flight.swap(true, Ordering::SeqCst)
    }

    /// Release the slot once the fan-out has settled, success or failure.
    pub fn end(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Drives the quote gateway contract: symbol formation, the one-shot
/// alternate-suffix retry for Korean tickers, and the concurrent fan-out
/// that keeps one slow or failing quote from blocking the rest.
pub struct QuoteService;

impl QuoteService {
    pub fn new() -> Self {
        Self
    }

    /// Current price for a ticker. Korean tickers try `.KS` first and, on
    /// not-found only, retry `.KQ` exactly once before surfacing failure.
    pub async fn current_price(
        &self,
        provider: &dyn QuoteProvider,
        market: Market,
        code: &str,
    ) -> Result<Quote, CoreError> {
        let primary = primary_symbol(market, code);
        match provider.current_quote(&primary).await {
            Err(CoreError::SymbolNotFound(_)) => {
                if let Some(alternate) = alternate_symbol(market, code) {
                    log::debug!("{primary} not found, retrying as {alternate}");
                    provider.current_quote(&alternate).await
                } else {
                    Err(CoreError::SymbolNotFound(primary))
                }
            }
            other => other,
        }
    }

    /// Raw bars for a ticker over a chart period, with the same retry rule.
    pub async fn chart(
        &self,
        provider: &dyn QuoteProvider,
        market: Market,
        code: &str,
        period: ChartPeriod,
    ) -> Result<Vec<RawBar>, CoreError> {
        let primary = primary_symbol(market, code);
        match provider
            .chart(&primary, period.interval(), period.range())
            .await
        {
            Err(CoreError::SymbolNotFound(_)) => {
                if let Some(alternate) = alternate_symbol(market, code) {
                    log::debug!("chart for {primary} not found, retrying as {alternate}");
                    provider
                        .chart(&alternate, period.interval(), period.range())
                        .await
                } else {
                    Err(CoreError::SymbolNotFound(primary))
                }
            }
            other => other,
        }
    }

    /// Latest USD→KRW rate, stamped with the fetch time.
    pub async fn exchange_rate(
        &self,
        provider: &dyn QuoteProvider,
    ) -> Result<ExchangeRate, CoreError> {
        let quote = provider.current_quote(EXCHANGE_RATE_SYMBOL).await?;
        Ok(ExchangeRate::new(quote.price, Utc::now()))
    }

    /// Look up current prices for every holding concurrently. All lookups
    /// are issued at once and all settle before this returns; each failure
    /// is captured per holding instead of aborting the batch.
    pub async fn refresh_prices(
        &self,
        provider: &dyn QuoteProvider,
        holdings: &[Holding],
    ) -> Vec<PriceResult> {
        let lookups = holdings.iter().map(|h| async {
            let outcome = self
                .current_price(provider, h.market, &h.code)
                .await
                .map(|quote| quote.price);
            PriceResult {
                holding_id: h.id,
                code: h.code.clone(),
                outcome,
            }
        });

        let results = join_all(lookups).await;
        for result in &results {
            if let Err(e) = &result.outcome {
                log::warn!("price refresh failed for {}: {e}", result.code);
            }
        }
        results
    }
}

impl Default for QuoteService {
    fn default() -> Self {
        Self::new()
    }
}
