use serde::{Deserialize, Serialize};

/// Chart framing selected by the user. Each period maps to the
/// (interval, range) pair requested from the quote endpoint — the bucketing
/// itself happens upstream, this crate only derives display data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartPeriod {
    /// 30-minute view: 5-minute bars over one day (~78 bars)
    Min30,
    /// Daily view: daily bars over three months (~60 bars)
    Daily,
    /// Weekly view: daily bars over six months (~120 bars)
    Weekly,
    /// Monthly view: daily bars over two years (~480 bars)
    Monthly,
}

impl ChartPeriod {
    /// Provider interval string for this period.
    #[must_use]
    pub fn interval(&self) -> &'static str {
        match self {
            ChartPeriod::Min30 => "5m",
            ChartPeriod::Daily | ChartPeriod::Weekly | ChartPeriod::Monthly => "1d",
        }
    }

    /// Provider range string for this period.
    #[must_use]
    pub fn range(&self) -> &'static str {
        match self {
            ChartPeriod::Min30 => "1d",
            ChartPeriod::Daily => "3mo",
            ChartPeriod::Weekly => "6mo",
            ChartPeriod::Monthly => "2y",
        }
    }

    /// Intraday periods label bars by clock time, the rest by calendar day.
    #[must_use]
    pub fn is_intraday(&self) -> bool {
        matches!(self, ChartPeriod::Min30)
    }
}

/// One OHLCV bar as returned by the quote endpoint. Price fields are
/// optional because the feed leaves holes (halts, thin pre-market buckets);
/// bars missing open or close are dropped during derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

/// One display-ready candle. Immutable once derived; a series is replaced
/// wholesale on every period change, never patched incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBar {
    /// Human-readable bucket label: `H:MM` intraday, `M/D` otherwise
    pub label: String,

    /// Unix timestamp in seconds, carried through from the raw bar
    pub timestamp: i64,

    /// Prices rounded to 2 decimal places
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,

    /// `high − low`, precomputed so the renderer never recalculates it
    pub candle_range: f64,

    pub volume: u64,

    /// `close >= open`
    pub is_up: bool,

    /// Trailing simple moving averages of close. Each window populates
    /// independently once enough preceding bars exist.
    pub ma5: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub ma120: Option<f64>,
}
