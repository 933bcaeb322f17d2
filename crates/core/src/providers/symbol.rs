use crate::models::holding::Market;

/// Symbol the exchange-rate lookup is keyed on.
pub const EXCHANGE_RATE_SYMBOL: &str = "USDKRW=X";

/// Primary endpoint symbol for a ticker. Korean tickers default to the
/// KOSPI suffix; US tickers are used as-is.
#[must_use]
pub fn primary_symbol(market: Market, code: &str) -> String {
    match market {
        Market::Kr => format!("{code}.KS"),
        Market::Us => code.to_string(),
    }
}

/// Alternate symbol to retry on not-found. Only Korean tickers have one —
/// the KOSDAQ suffix — because whether an instrument lists on KOSPI or
/// KOSDAQ is not knowable up front.
#[must_use]
pub fn alternate_symbol(market: Market, code: &str) -> Option<String> {
    match market {
        Market::Kr => Some(format!("{code}.KQ")),
        Market::Us => None,
    }
}
