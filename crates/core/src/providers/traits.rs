use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::chart::RawBar;

/// A current-price quote for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub price: f64,

    /// Currency code reported by the endpoint, when it reports one
    pub currency: Option<String>,
}

/// Trait abstraction over the external quote source.
///
/// The production implementation speaks the chart HTTP endpoint (directly or
/// through the same-origin proxy). Tests substitute stubs to script
/// not-found responses and count fallback attempts.
///
/// Implementations must report an unknown symbol as
/// [`CoreError::SymbolNotFound`] — the quote service relies on that variant
/// to drive the Korean-market suffix retry.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Latest traded price for a fully-formed symbol (suffix included).
    async fn current_quote(&self, symbol: &str) -> Result<Quote, CoreError>;

    /// Raw OHLCV bars for a symbol over the given interval/range pair,
    /// ordered by time.
    async fn chart(
        &self,
        symbol: &str,
        interval: &str,
        range: &str,
    ) -> Result<Vec<RawBar>, CoreError>;
}
