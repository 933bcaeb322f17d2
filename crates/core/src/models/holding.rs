use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stock market a holding trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// Korean market (KOSPI/KOSDAQ) — prices quoted in KRW
    #[serde(rename = "KR")]
    Kr,
    /// US market — prices quoted in USD
    #[serde(rename = "US")]
    Us,
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Market::Kr => write!(f, "KR"),
            Market::Us => write!(f, "US"),
        }
    }
}

/// Brokerage account a holding is tracked under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Broker {
    Namu,
    Toss,
    Isa,
}

impl std::fmt::Display for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Broker::Namu => write!(f, "namu"),
            Broker::Toss => write!(f, "toss"),
            Broker::Isa => write!(f, "isa"),
        }
    }
}

/// Currency a holding's prices are denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "KRW")]
    Krw,
    #[serde(rename = "USD")]
    Usd,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::Krw => write!(f, "KRW"),
            Currency::Usd => write!(f, "USD"),
        }
    }
}

/// Sort key assigned to holdings that have never been reordered.
/// They compare after every explicitly ordered holding.
pub const UNORDERED_SORT_KEY: u32 = 999;

/// One owned stock/ETF position.
///
/// `current_price` starts out equal to `avg_price` and is only overwritten
/// by a quote refresh — valuation is cost-neutral until live data arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Unique identifier, stable across sessions
    pub id: Uuid,

    pub market: Market,

    pub broker: Broker,

    /// Display name (e.g., "삼성전자", "Apple Inc.")
    pub name: String,

    /// Exchange ticker without market suffix (e.g., "005930", "AAPL")
    pub code: String,

    /// Units held. Fractional shares allowed (US brokers sell fractions).
    pub quantity: f64,

    /// Average cost per unit in the holding's native currency
    pub avg_price: f64,

    /// Latest known price per unit, refreshed from the quote gateway
    pub current_price: f64,

    pub currency: Currency,

    /// Optional free-text memo
    #[serde(default)]
    pub memo: String,

    /// User-controlled display order. `None` sorts last (as [`UNORDERED_SORT_KEY`]).
    #[serde(default)]
    pub sort_order: Option<u32>,
}

impl Holding {
    pub fn new(
        market: Market,
        broker: Broker,
        name: impl Into<String>,
        code: impl Into<String>,
        quantity: f64,
        avg_price: f64,
        currency: Currency,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            market,
            broker,
            name: name.into(),
            code: code.into(),
            quantity,
            avg_price,
            current_price: avg_price,
            currency,
            memo: String::new(),
            sort_order: None,
        }
    }

    /// Display-order key: explicit sort order, or the sort-last sentinel.
    #[must_use]
    pub fn effective_sort_key(&self) -> u32 {
        self.sort_order.unwrap_or(UNORDERED_SORT_KEY)
    }

    /// Cost basis in the holding's native currency.
    #[must_use]
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.avg_price
    }

    /// Market value in the holding's native currency.
    #[must_use]
    pub fn market_value(&self) -> f64 {
        self.quantity * self.current_price
    }
}
