pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod store;

use chrono::NaiveDate;
use uuid::Uuid;

use errors::CoreError;
use models::{
    backup::{Backup, RestoreMode, RestoreReport},
    chart::{ChartBar, ChartPeriod},
    exchange::{ExchangeRate, SEED_USD_KRW},
    holding::{Broker, Currency, Holding, Market},
    ledger::{
        AssetMovement, AssetMovementKind, DebtMovement, DebtMovementKind, Transaction,
        TransactionKind, YearMonth,
    },
    settings::Settings,
};
use providers::traits::QuoteProvider;
use services::{
    chart_service::ChartService,
    ledger_service::{BudgetSummary, LedgerService},
    order_service::OrderService,
    quote_service::{QuoteService, RefreshGuard},
    valuation_service::{HoldingProfit, PortfolioTotals, ValuationService},
};
use store::traits::EntityStore;

/// Result of a price refresh request.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The fan-out ran and settled
    Completed(RefreshReport),
    /// A refresh was already in flight; this one was not started
    Skipped,
}

/// What one settled fan-out actually did.
#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Holdings whose current price was updated
    pub updated: usize,

    /// Whether the USD→KRW rate was refreshed alongside the prices
    pub rate_refreshed: bool,

    /// Per-holding failures; the rest of the batch is unaffected
    pub failures: Vec<RefreshFailure>,
}

/// One holding's failed lookup inside a refresh fan-out.
#[derive(Debug)]
pub struct RefreshFailure {
    pub holding_id: Uuid,
    pub code: String,
    pub error: CoreError,
}

/// Main entry point for the Pocket core library.
///
/// Owns the in-memory working set (the four record collections, settings,
/// the exchange rate) and the services that operate on it. Persistence and
/// quotes stay behind their trait boundaries.
///
/// Mutations are confirmed-then-applied: the store call must succeed before
/// local state changes. The one exception is reorder, which applies
/// optimistically and rolls back to the captured order if the batch persist
/// fails.
#[must_use]
pub struct PocketTracker {
    store: Box<dyn EntityStore>,
    provider: Box<dyn QuoteProvider>,

    transactions: Vec<Transaction>,
    assets: Vec<AssetMovement>,
    debts: Vec<DebtMovement>,
    holdings: Vec<Holding>,
    settings: Settings,
    exchange_rate: Option<ExchangeRate>,

    /// One outstanding refresh at a time; a tick that fires while the
    /// previous fan-out is unsettled is skipped, not queued.
    refresh_guard: RefreshGuard,

    valuation_service: ValuationService,
    chart_service: ChartService,
    order_service: OrderService,
    quote_service: QuoteService,
    ledger_service: LedgerService,
}

impl std::fmt::Debug for PocketTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PocketTracker")
            .field("transactions", &self.transactions.len())
            .field("assets", &self.assets.len())
            .field("debts", &self.debts.len())
            .field("holdings", &self.holdings.len())
            .field("settings", &self.settings)
            .field("exchange_rate", &self.exchange_rate)
            .finish()
    }
}

impl PocketTracker {
    /// Create a tracker over a store and quote provider, with default
    /// settings and empty working set. Call [`load_all`](Self::load_all)
    /// to populate from the store.
    pub fn new(store: Box<dyn EntityStore>, provider: Box<dyn QuoteProvider>) -> Self {
        Self::with_settings(store, provider, Settings::default())
    }

    /// Same as [`new`](Self::new) with explicit settings (e.g. restored
    /// from the frontend's preference storage).
    pub fn with_settings(
        store: Box<dyn EntityStore>,
        provider: Box<dyn QuoteProvider>,
        settings: Settings,
    ) -> Self {
        Self {
            store,
            provider,
            transactions: Vec::new(),
            assets: Vec::new(),
            debts: Vec::new(),
            holdings: Vec::new(),
            settings,
            exchange_rate: None,
            refresh_guard: RefreshGuard::new(),
            valuation_service: ValuationService::new(),
            chart_service: ChartService::new(),
            order_service: OrderService::new(),
            quote_service: QuoteService::new(),
            ledger_service: LedgerService::new(),
        }
    }

    /// Load every collection from the store into the working set.
    /// Holdings come back with `current_price` reset to the average cost;
    /// live prices only exist after a refresh.
    pub async fn load_all(&mut self) -> Result<(), CoreError> {
        self.transactions = self.store.list_transactions(None, None).await?;
        self.assets = self.store.list_assets(None).await?;
        self.debts = self.store.list_debts(None).await?;

        let mut holdings = self.store.list_holdings(None, None).await?;
        for holding in &mut holdings {
            holding.current_price = holding.avg_price;
        }
        self.holdings = holdings;
        Ok(())
    }

    // ── Budget Transactions ─────────────────────────────────────────

    /// Add a budget entry. Validated before any store call.
    pub async fn add_transaction(
        &mut self,
        kind: TransactionKind,
        name: impl Into<String>,
        amount: f64,
        date: NaiveDate,
        memo: impl Into<String>,
    ) -> Result<Uuid, CoreError> {
        let name = name.into();
        validate_name(&name, "transaction name")?;
        validate_amount(amount)?;

        let mut tx = Transaction::new(kind, name, amount, date);
        tx.memo = memo.into();
        let id = tx.id;

        let stored = self.store.insert_transaction(tx).await?;
        self.transactions.push(stored);
        Ok(id)
    }

    /// Replace an existing budget entry wholesale.
    pub async fn update_transaction(&mut self, updated: Transaction) -> Result<(), CoreError> {
        validate_name(&updated.name, "transaction name")?;
        validate_amount(updated.amount)?;

        let stored = self.store.update_transaction(&updated).await?;
        let slot = self
            .transactions
            .iter_mut()
            .find(|t| t.id == stored.id)
            .ok_or_else(|| CoreError::NotFound(format!("transaction {}", stored.id)))?;
        *slot = stored;
        Ok(())
    }

    /// Flip the paid/received flag on a budget entry.
    pub async fn set_transaction_completed(
        &mut self,
        id: Uuid,
        completed: bool,
    ) -> Result<(), CoreError> {
        let mut tx = self
            .transactions
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("transaction {id}")))?;
        tx.completed = completed;
        self.update_transaction(tx).await
    }

    pub async fn delete_transaction(&mut self, id: Uuid) -> Result<(), CoreError> {
        self.store.delete_transaction(id).await?;
        self.transactions.retain(|t| t.id != id);
        Ok(())
    }

    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Budget summary for one month (or all loaded entries) against the
    /// configured spending goal.
    #[must_use]
    pub fn budget_summary(&self, month: Option<YearMonth>) -> BudgetSummary {
        let scoped: Vec<Transaction> = match month {
            Some(m) => self
                .transactions
                .iter()
                .filter(|t| m.contains(t.date))
                .cloned()
                .collect(),
            None => self.transactions.clone(),
        };
        self.ledger_service
            .budget_summary(&scoped, self.settings.budget_goal)
    }

    // ── Asset Movements ─────────────────────────────────────────────

    pub async fn add_asset_movement(
        &mut self,
        kind: AssetMovementKind,
        amount: f64,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Result<Uuid, CoreError> {
        validate_amount(amount)?;

        let mut movement = AssetMovement::new(kind, amount, date);
        movement.description = description.into();
        let id = movement.id;

        let stored = self.store.insert_asset(movement).await?;
        self.assets.push(stored);
        Ok(id)
    }

    pub async fn update_asset_movement(&mut self, updated: AssetMovement) -> Result<(), CoreError> {
        validate_amount(updated.amount)?;

        let stored = self.store.update_asset(&updated).await?;
        let slot = self
            .assets
            .iter_mut()
            .find(|m| m.id == stored.id)
            .ok_or_else(|| CoreError::NotFound(format!("asset movement {}", stored.id)))?;
        *slot = stored;
        Ok(())
    }

    pub async fn delete_asset_movement(&mut self, id: Uuid) -> Result<(), CoreError> {
        self.store.delete_asset(id).await?;
        self.assets.retain(|m| m.id != id);
        Ok(())
    }

    #[must_use]
    pub fn asset_movements(&self) -> &[AssetMovement] {
        &self.assets
    }

    /// Running savings-account balance: deposits − withdrawals.
    #[must_use]
    pub fn asset_balance(&self) -> f64 {
        self.ledger_service.asset_balance(&self.assets)
    }

    // ── Debt Movements ──────────────────────────────────────────────

    pub async fn add_debt_movement(
        &mut self,
        kind: DebtMovementKind,
        amount: f64,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Result<Uuid, CoreError> {
        validate_amount(amount)?;

        let mut movement = DebtMovement::new(kind, amount, date);
        movement.description = description.into();
        let id = movement.id;

        let stored = self.store.insert_debt(movement).await?;
        self.debts.push(stored);
        Ok(id)
    }

    pub async fn update_debt_movement(&mut self, updated: DebtMovement) -> Result<(), CoreError> {
        validate_amount(updated.amount)?;

        let stored = self.store.update_debt(&updated).await?;
        let slot = self
            .debts
            .iter_mut()
            .find(|m| m.id == stored.id)
            .ok_or_else(|| CoreError::NotFound(format!("debt movement {}", stored.id)))?;
        *slot = stored;
        Ok(())
    }

    pub async fn delete_debt_movement(&mut self, id: Uuid) -> Result<(), CoreError> {
        self.store.delete_debt(id).await?;
        self.debts.retain(|m| m.id != id);
        Ok(())
    }

    #[must_use]
    pub fn debt_movements(&self) -> &[DebtMovement] {
        &self.debts
    }

    /// Outstanding debt: borrows − repayments.
    #[must_use]
    pub fn debt_outstanding(&self) -> f64 {
        self.ledger_service.debt_outstanding(&self.debts)
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Add a stock position. The current price starts at the average cost
    /// until the first quote refresh.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_holding(
        &mut self,
        market: Market,
        broker: Broker,
        name: impl Into<String>,
        code: impl Into<String>,
        quantity: f64,
        avg_price: f64,
        currency: Currency,
        memo: impl Into<String>,
    ) -> Result<Uuid, CoreError> {
        let name = name.into();
        let code = code.into();
        validate_name(&name, "holding name")?;
        validate_name(&code, "ticker code")?;
        validate_non_negative(quantity, "quantity")?;
        validate_non_negative(avg_price, "average price")?;

        let mut holding = Holding::new(market, broker, name, code, quantity, avg_price, currency);
        holding.memo = memo.into();
        let id = holding.id;

        let stored = self.store.insert_holding(holding).await?;
        self.holdings.push(stored);
        Ok(id)
    }

    /// Replace an existing holding wholesale. The current price resets to
    /// the (possibly new) average cost; the next refresh restores live data.
    pub async fn update_holding(&mut self, mut updated: Holding) -> Result<(), CoreError> {
        validate_name(&updated.name, "holding name")?;
        validate_name(&updated.code, "ticker code")?;
        validate_non_negative(updated.quantity, "quantity")?;
        validate_non_negative(updated.avg_price, "average price")?;

        updated.current_price = updated.avg_price;
        let stored = self.store.update_holding(&updated).await?;
        let slot = self
            .holdings
            .iter_mut()
            .find(|h| h.id == stored.id)
            .ok_or_else(|| CoreError::NotFound(format!("holding {}", stored.id)))?;
        *slot = stored;
        Ok(())
    }

    pub async fn delete_holding(&mut self, id: Uuid) -> Result<(), CoreError> {
        self.store.delete_holding(id).await?;
        self.holdings.retain(|h| h.id != id);
        Ok(())
    }

    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Holdings narrowed to a market/broker tab, in display order.
    #[must_use]
    pub fn holdings_filtered(
        &self,
        market: Option<Market>,
        broker: Option<Broker>,
    ) -> Vec<&Holding> {
        self.order_service.sorted(
            self.holdings
                .iter()
                .filter(|h| market.is_none_or(|m| h.market == m))
                .filter(|h| broker.is_none_or(|b| h.broker == b)),
        )
    }

    /// Get a single holding by id.
    #[must_use]
    pub fn get_holding(&self, id: Uuid) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.id == id)
    }

    // ── Reorder ─────────────────────────────────────────────────────

    /// Apply a drag reorder inside the visible (filtered) subset.
    ///
    /// The new order is applied to local state first, then persisted as a
    /// batch. If persistence fails the captured previous order is restored
    /// and the error surfaced — displayed and stored order never diverge
    /// silently.
    pub async fn reorder_holdings(
        &mut self,
        market: Option<Market>,
        broker: Option<Broker>,
        dragged: Uuid,
        target: Uuid,
    ) -> Result<(), CoreError> {
        let visible: Vec<Holding> = self
            .holdings_filtered(market, broker)
            .into_iter()
            .cloned()
            .collect();

        let updates = self.order_service.reorder(&visible, dragged, target)?;
        if updates.is_empty() {
            return Ok(());
        }

        // Capture pre-mutation keys for rollback.
        let previous: Vec<(Uuid, Option<u32>)> = updates
            .iter()
            .filter_map(|u| {
                self.holdings
                    .iter()
                    .find(|h| h.id == u.id)
                    .map(|h| (h.id, h.sort_order))
            })
            .collect();

        for update in &updates {
            if let Some(holding) = self.holdings.iter_mut().find(|h| h.id == update.id) {
                holding.sort_order = Some(update.sort_order);
            }
        }

        if let Err(e) = self.store.set_holding_orders(&updates).await {
            log::warn!("persisting reorder failed, rolling back: {e}");
            for (id, sort_order) in previous {
                if let Some(holding) = self.holdings.iter_mut().find(|h| h.id == id) {
                    holding.sort_order = sort_order;
                }
            }
            return Err(e);
        }
        Ok(())
    }

    // ── Prices & Exchange Rate ──────────────────────────────────────

    /// Refresh current prices for every holding plus the USD→KRW rate.
    ///
    /// All lookups fan out concurrently and all settle before local state
    /// changes; one slow or failing symbol never blocks the rest. A call
    /// that arrives while a previous fan-out is still unsettled is
    /// skipped.
    pub async fn refresh_prices(&mut self) -> RefreshOutcome {
        if !self.refresh_guard.try_begin() {
            return RefreshOutcome::Skipped;
        }

        let (price_results, rate_result) = futures::join!(
            self.quote_service
                .refresh_prices(self.provider.as_ref(), &self.holdings),
            self.quote_service.exchange_rate(self.provider.as_ref()),
        );

        let mut report = RefreshReport::default();

        for result in price_results {
            match result.outcome {
                Ok(price) => {
                    if let Some(holding) =
                        self.holdings.iter_mut().find(|h| h.id == result.holding_id)
                    {
                        holding.current_price = price;
                        report.updated += 1;
                    }
                }
                Err(error) => report.failures.push(RefreshFailure {
                    holding_id: result.holding_id,
                    code: result.code,
                    error,
                }),
            }
        }

        match rate_result {
            Ok(rate) => {
                self.exchange_rate = Some(rate);
                report.rate_refreshed = true;
            }
            Err(e) => log::warn!("exchange rate refresh failed: {e}"),
        }

        self.refresh_guard.end();
        RefreshOutcome::Completed(report)
    }

    /// Last refreshed exchange rate, if any refresh has succeeded.
    #[must_use]
    pub fn exchange_rate(&self) -> Option<&ExchangeRate> {
        self.exchange_rate.as_ref()
    }

    /// USD→KRW multiplier used for aggregation: the refreshed rate, or the
    /// seed rate before the first successful refresh.
    #[must_use]
    pub fn usd_to_krw(&self) -> f64 {
        self.exchange_rate
            .as_ref()
            .map_or(SEED_USD_KRW, |r| r.rate)
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Profit and guarded percentage return for one holding.
    pub fn holding_profit(&self, id: Uuid) -> Result<HoldingProfit, CoreError> {
        let holding = self
            .get_holding(id)
            .ok_or_else(|| CoreError::NotFound(format!("holding {id}")))?;
        Ok(self.valuation_service.profit_of(holding))
    }

    /// Aggregate value/investment/profit across all holdings, in KRW.
    #[must_use]
    pub fn portfolio_totals(&self) -> PortfolioTotals {
        self.valuation_service
            .totals(&self.holdings, self.usd_to_krw())
    }

    /// Subtotals for one broker tab.
    #[must_use]
    pub fn portfolio_totals_for_broker(&self, broker: Broker) -> PortfolioTotals {
        self.valuation_service
            .totals_for_broker(&self.holdings, broker, self.usd_to_krw())
    }

    /// Subtotals for one market.
    #[must_use]
    pub fn portfolio_totals_for_market(&self, market: Market) -> PortfolioTotals {
        self.valuation_service
            .totals_for_market(&self.holdings, market, self.usd_to_krw())
    }

    // ── Charts ──────────────────────────────────────────────────────

    /// Fetch raw bars for one holding over a chart period (with the Korean
    /// suffix fallback) and derive the display-ready candle series.
    pub async fn chart_for(
        &self,
        holding_id: Uuid,
        period: ChartPeriod,
    ) -> Result<Vec<ChartBar>, CoreError> {
        let holding = self
            .get_holding(holding_id)
            .ok_or_else(|| CoreError::NotFound(format!("holding {holding_id}")))?;

        let raw = self
            .quote_service
            .chart(self.provider.as_ref(), holding.market, &holding.code, period)
            .await?;

        Ok(self.chart_service.derive_series(&raw, period))
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The single settings mutation entry point.
    pub fn update_settings(&mut self, apply: impl FnOnce(&mut Settings)) {
        apply(&mut self.settings);
    }

    // ── Backup / Restore ────────────────────────────────────────────

    /// Export every stored collection into the backup document.
    pub async fn export_backup(&self) -> Result<Backup, CoreError> {
        store::backup::export_all(self.store.as_ref()).await
    }

    /// Restore a backup into the store, then reload the working set so
    /// memory reflects what was actually persisted.
    pub async fn restore_backup(
        &mut self,
        backup: Backup,
        mode: RestoreMode,
    ) -> Result<RestoreReport, CoreError> {
        let report = store::backup::import_all(self.store.as_ref(), backup, mode).await?;
        self.load_all().await?;
        Ok(report)
    }
}

// ── Validation helpers ──────────────────────────────────────────────

fn validate_name(value: &str, field: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<(), CoreError> {
    validate_non_negative(amount, "amount")
}

fn validate_non_negative(value: f64, field: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}
