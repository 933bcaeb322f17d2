use crate::models::holding::{Broker, Currency, Holding, Market};

/// Per-holding profit breakdown in the holding's native currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldingProfit {
    /// quantity × (current − average cost)
    pub profit: f64,

    /// Percentage return on cost. `None` when the average cost is zero —
    /// the rate is undefined and must never leak NaN into aggregates.
    pub rate: Option<f64>,
}

/// Aggregate portfolio valuation in KRW.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioTotals {
    pub value: f64,
    pub investment: f64,
    pub profit: f64,

    /// `None` when nothing is invested
    pub profit_rate: Option<f64>,
}

/// Computes per-holding and aggregate valuation figures.
///
/// Pure arithmetic over immutable inputs — no I/O, no hidden state.
/// USD-denominated holdings are converted with the supplied USD→KRW
/// multiplier before summing; KRW holdings pass through unconverted.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Profit and percentage return for one holding.
    #[must_use]
    pub fn profit_of(&self, holding: &Holding) -> HoldingProfit {
        let profit = (holding.current_price - holding.avg_price) * holding.quantity;
        let rate = if holding.avg_price == 0.0 {
            None
        } else {
            Some((holding.current_price - holding.avg_price) / holding.avg_price * 100.0)
        };
        HoldingProfit { profit, rate }
    }

    /// Total market value across holdings, in KRW.
    #[must_use]
    pub fn total_value(&self, holdings: &[Holding], usd_to_krw: f64) -> f64 {
        holdings
            .iter()
            .map(|h| Self::to_krw(h.market_value(), h.currency, usd_to_krw))
            .sum()
    }

    /// Total invested amount across holdings, in KRW.
    #[must_use]
    pub fn total_investment(&self, holdings: &[Holding], usd_to_krw: f64) -> f64 {
        holdings
            .iter()
            .map(|h| Self::to_krw(h.cost_basis(), h.currency, usd_to_krw))
            .sum()
    }

    /// Value, investment, absolute profit, and guarded overall rate.
    #[must_use]
    pub fn totals(&self, holdings: &[Holding], usd_to_krw: f64) -> PortfolioTotals {
        let value = self.total_value(holdings, usd_to_krw);
        let investment = self.total_investment(holdings, usd_to_krw);
        let profit = value - investment;
        let profit_rate = if investment == 0.0 {
            None
        } else {
            Some(profit / investment * 100.0)
        };
        PortfolioTotals {
            value,
            investment,
            profit,
            profit_rate,
        }
    }

    /// Subtotals for one broker tab. Same arithmetic, pre-filtered subset.
    #[must_use]
    pub fn totals_for_broker(
        &self,
        holdings: &[Holding],
        broker: Broker,
        usd_to_krw: f64,
    ) -> PortfolioTotals {
        let subset: Vec<Holding> = holdings
            .iter()
            .filter(|h| h.broker == broker)
            .cloned()
            .collect();
        self.totals(&subset, usd_to_krw)
    }

    /// Subtotals for one market. Same arithmetic, pre-filtered subset.
    #[must_use]
    pub fn totals_for_market(
        &self,
        holdings: &[Holding],
        market: Market,
        usd_to_krw: f64,
    ) -> PortfolioTotals {
        let subset: Vec<Holding> = holdings
            .iter()
            .filter(|h| h.market == market)
            .cloned()
            .collect();
        self.totals(&subset, usd_to_krw)
    }

    fn to_krw(value: f64, currency: Currency, usd_to_krw: f64) -> f64 {
        match currency {
            Currency::Krw => value,
            Currency::Usd => value * usd_to_krw,
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
