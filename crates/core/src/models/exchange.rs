use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seed rate used before the first successful refresh.
pub const SEED_USD_KRW: f64 = 1337.50;

/// The single USD→KRW conversion scalar. Replaced wholesale on refresh,
/// never patched — `updated_at` tells callers how stale the rate is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// KRW per 1 USD
    pub rate: f64,

    pub updated_at: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn new(rate: f64, updated_at: DateTime<Utc>) -> Self {
        Self { rate, updated_at }
    }
}
