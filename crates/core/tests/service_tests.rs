// ═══════════════════════════════════════════════════════════════════
// Service Tests — ValuationService, ChartService, OrderService,
// LedgerService, QuoteService (suffix fallback + fan-out)
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

use pocket_core::errors::CoreError;
use pocket_core::models::chart::{ChartPeriod, RawBar};
use pocket_core::models::holding::{Broker, Currency, Holding, Market};
use pocket_core::models::ledger::{
    AssetMovement, AssetMovementKind, DebtMovement, DebtMovementKind, Transaction,
    TransactionKind, YearMonth,
};
use pocket_core::providers::traits::{Quote, QuoteProvider};
use pocket_core::services::chart_service::ChartService;
use pocket_core::services::ledger_service::LedgerService;
use pocket_core::services::order_service::OrderService;
use pocket_core::services::quote_service::QuoteService;
use pocket_core::services::valuation_service::ValuationService;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn krw_holding(name: &str, code: &str, quantity: f64, avg: f64, current: f64) -> Holding {
    let mut h = Holding::new(Market::Kr, Broker::Namu, name, code, quantity, avg, Currency::Krw);
    h.current_price = current;
    h
}

fn usd_holding(name: &str, code: &str, quantity: f64, avg: f64, current: f64) -> Holding {
    let mut h = Holding::new(Market::Us, Broker::Toss, name, code, quantity, avg, Currency::Usd);
    h.current_price = current;
    h
}

/// Full bar with all fields present.
fn bar(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: u64) -> RawBar {
    RawBar {
        timestamp,
        open: Some(open),
        high: Some(high),
        low: Some(low),
        close: Some(close),
        volume: Some(volume),
    }
}

/// Flat daily bars with the given closes, one per day.
fn flat_bars(closes: &[f64]) -> Vec<RawBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| bar(1_735_689_600 + i as i64 * 86_400, c, c, c, c, 1_000))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════
//  Scripted quote provider — records every symbol it is asked for
// ═══════════════════════════════════════════════════════════════════

struct ScriptedProvider {
    prices: HashMap<String, f64>,
    charts: HashMap<String, Vec<RawBar>>,
    outages: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            prices: HashMap::new(),
            charts: HashMap::new(),
            outages: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    fn with_chart(mut self, symbol: &str, bars: Vec<RawBar>) -> Self {
        self.charts.insert(symbol.to_string(), bars);
        self
    }

    /// Simulate a transport failure (not a not-found) for this symbol.
    fn with_outage(mut self, symbol: &str) -> Self {
        self.outages.push(symbol.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, symbol: &str) {
        self.calls.lock().unwrap().push(symbol.to_string());
    }
}

#[async_trait]
impl QuoteProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn current_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        self.record(symbol);
        if self.outages.iter().any(|s| s == symbol) {
            return Err(CoreError::Network("connection reset".into()));
        }
        self.prices
            .get(symbol)
            .map(|&price| Quote {
                price,
                currency: None,
            })
            .ok_or_else(|| CoreError::SymbolNotFound(symbol.to_string()))
    }

    async fn chart(
        &self,
        symbol: &str,
        _interval: &str,
        _range: &str,
    ) -> Result<Vec<RawBar>, CoreError> {
        self.record(symbol);
        self.charts
            .get(symbol)
            .cloned()
            .ok_or_else(|| CoreError::SymbolNotFound(symbol.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ValuationService
// ═══════════════════════════════════════════════════════════════════

mod valuation {
    use super::*;

    #[test]
    fn profit_scenario_krw() {
        // avg 70,000 → current 73,500 × 10 shares
        let h = krw_holding("삼성전자", "005930", 10.0, 70_000.0, 73_500.0);
        let p = ValuationService::new().profit_of(&h);
        assert!((p.profit - 35_000.0).abs() < 1e-9);
        assert!((p.rate.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn profit_identity_holds_for_loss() {
        let h = usd_holding("Apple", "AAPL", 3.0, 200.0, 150.0);
        let p = ValuationService::new().profit_of(&h);
        assert!((p.profit - 3.0 * (150.0 - 200.0)).abs() < 1e-9);
        assert!((p.rate.unwrap() + 25.0).abs() < 1e-9);
    }

    #[test]
    fn zero_avg_price_has_undefined_rate_not_nan() {
        let h = krw_holding("무상주", "000000", 5.0, 0.0, 1_000.0);
        let p = ValuationService::new().profit_of(&h);
        assert!((p.profit - 5_000.0).abs() < 1e-9);
        assert_eq!(p.rate, None);
    }

    #[test]
    fn total_value_converts_usd_with_rate() {
        // 1,000,000 KRW + 100 USD at 1,400 → 1,140,000 KRW
        let holdings = vec![
            krw_holding("KR", "005930", 10.0, 90_000.0, 100_000.0),
            usd_holding("US", "AAPL", 1.0, 90.0, 100.0),
        ];
        let total = ValuationService::new().total_value(&holdings, 1_400.0);
        assert!((total - 1_140_000.0).abs() < 1e-6);
    }

    #[test]
    fn value_equals_investment_when_prices_unchanged() {
        let holdings = vec![
            krw_holding("A", "000001", 4.0, 12_345.0, 12_345.0),
            usd_holding("B", "MSFT", 2.5, 420.0, 420.0),
        ];
        let svc = ValuationService::new();
        let value = svc.total_value(&holdings, 1_350.0);
        let investment = svc.total_investment(&holdings, 1_350.0);
        assert!((value - investment).abs() < 1e-9);
    }

    #[test]
    fn totals_profit_and_rate() {
        let holdings = vec![krw_holding("A", "000001", 10.0, 100.0, 110.0)];
        let totals = ValuationService::new().totals(&holdings, 1_400.0);
        assert!((totals.value - 1_100.0).abs() < 1e-9);
        assert!((totals.investment - 1_000.0).abs() < 1e-9);
        assert!((totals.profit - 100.0).abs() < 1e-9);
        assert!((totals.profit_rate.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_portfolio_totals_have_no_rate() {
        let totals = ValuationService::new().totals(&[], 1_400.0);
        assert_eq!(totals.value, 0.0);
        assert_eq!(totals.profit_rate, None);
    }

    #[test]
    fn broker_subtotals_only_count_that_broker() {
        let holdings = vec![
            krw_holding("A", "000001", 1.0, 100.0, 100.0), // namu
            usd_holding("B", "AAPL", 1.0, 10.0, 10.0),     // toss
        ];
        let svc = ValuationService::new();
        let namu = svc.totals_for_broker(&holdings, Broker::Namu, 1_000.0);
        assert!((namu.value - 100.0).abs() < 1e-9);
        let toss = svc.totals_for_broker(&holdings, Broker::Toss, 1_000.0);
        assert!((toss.value - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn market_subtotals_only_count_that_market() {
        let holdings = vec![
            krw_holding("A", "000001", 1.0, 100.0, 100.0),
            usd_holding("B", "AAPL", 1.0, 10.0, 10.0),
        ];
        let us = ValuationService::new().totals_for_market(&holdings, Market::Us, 1_000.0);
        assert!((us.value - 10_000.0).abs() < 1e-9);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ChartService
// ═══════════════════════════════════════════════════════════════════

mod chart {
    use super::*;

    #[test]
    fn empty_input_yields_empty_series() {
        let series = ChartService::new().derive_series(&[], ChartPeriod::Daily);
        assert!(series.is_empty());
    }

    #[test]
    fn single_bar_has_no_moving_averages() {
        let series =
            ChartService::new().derive_series(&flat_bars(&[10.0]), ChartPeriod::Daily);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].ma5, None);
        assert_eq!(series[0].ma20, None);
        assert_eq!(series[0].ma60, None);
        assert_eq!(series[0].ma120, None);
    }

    #[test]
    fn ma5_scenario_five_bars() {
        // closes [10,12,11,13,14] → ma5 at the last index = 12.0, ma20 absent
        let series = ChartService::new()
            .derive_series(&flat_bars(&[10.0, 12.0, 11.0, 13.0, 14.0]), ChartPeriod::Daily);
        assert_eq!(series.len(), 5);
        assert_eq!(series[3].ma5, None);
        assert!((series[4].ma5.unwrap() - 12.0).abs() < 1e-9);
        assert_eq!(series[4].ma20, None);
    }

    #[test]
    fn ma20_boundary_nineteen_vs_twenty_bars() {
        let svc = ChartService::new();

        let closes19: Vec<f64> = (1..=19).map(f64::from).collect();
        let series = svc.derive_series(&flat_bars(&closes19), ChartPeriod::Daily);
        assert!(series.iter().all(|b| b.ma20.is_none()));

        let closes20: Vec<f64> = (1..=20).map(f64::from).collect();
        let series = svc.derive_series(&flat_bars(&closes20), ChartPeriod::Daily);
        assert!(series[..19].iter().all(|b| b.ma20.is_none()));
        // mean of 1..=20 = 10.5
        assert!((series[19].ma20.unwrap() - 10.5).abs() < 1e-9);
    }

    #[test]
    fn windows_populate_independently() {
        let closes: Vec<f64> = vec![100.0; 25];
        let series = ChartService::new().derive_series(&flat_bars(&closes), ChartPeriod::Daily);
        // Bar 10: ma5 defined, ma20 not yet.
        assert!(series[10].ma5.is_some());
        assert!(series[10].ma20.is_none());
        // Bar 24: both short windows defined, long ones still waiting.
        assert!(series[24].ma20.is_some());
        assert!(series[24].ma60.is_none());
        assert!(series[24].ma120.is_none());
    }

    #[test]
    fn derivation_is_idempotent() {
        let raw = flat_bars(&[10.0, 12.0, 11.0, 13.0, 14.0, 15.0, 16.0]);
        let svc = ChartService::new();
        let first = svc.derive_series(&raw, ChartPeriod::Daily);
        let second = svc.derive_series(&raw, ChartPeriod::Daily);
        assert_eq!(first, second);
    }

    #[test]
    fn gap_bars_are_dropped_before_ma_indexing() {
        let mut raw = flat_bars(&[10.0, 12.0, 11.0, 13.0, 14.0, 16.0]);
        raw[2].open = None; // feed hole
        let series = ChartService::new().derive_series(&raw, ChartPeriod::Daily);
        assert_eq!(series.len(), 5);
        // Cleaned closes are [10,12,13,14,16]; ma5 over them = 13.0
        assert!((series[4].ma5.unwrap() - 13.0).abs() < 1e-9);
    }

    #[test]
    fn prices_round_to_two_decimals() {
        let raw = vec![bar(1_735_689_600, 10.123, 10.789, 9.994, 10.456, 500)];
        let series = ChartService::new().derive_series(&raw, ChartPeriod::Daily);
        let b = &series[0];
        assert!((b.open - 10.12).abs() < 1e-9);
        assert!((b.high - 10.79).abs() < 1e-9);
        assert!((b.low - 9.99).abs() < 1e-9);
        assert!((b.close - 10.46).abs() < 1e-9);
        assert!((b.candle_range - (10.79 - 9.99)).abs() < 1e-9);
    }

    #[test]
    fn zero_range_bar_is_valid_flat_marker() {
        let raw = vec![bar(1_735_689_600, 50.0, 50.0, 50.0, 50.0, 0)];
        let series = ChartService::new().derive_series(&raw, ChartPeriod::Daily);
        assert_eq!(series[0].candle_range, 0.0);
        assert!(series[0].is_up); // close == open counts as up
    }

    #[test]
    fn is_up_follows_close_vs_open() {
        let raw = vec![
            bar(1_735_689_600, 10.0, 11.0, 9.0, 10.5, 1),
            bar(1_735_776_000, 10.5, 11.0, 9.0, 9.5, 1),
        ];
        let series = ChartService::new().derive_series(&raw, ChartPeriod::Daily);
        assert!(series[0].is_up);
        assert!(!series[1].is_up);
    }

    #[test]
    fn intraday_labels_are_hour_minute() {
        // 2025-01-15 13:05 UTC
        let raw = vec![bar(1_736_946_300, 10.0, 10.0, 10.0, 10.0, 1)];
        let series = ChartService::new().derive_series(&raw, ChartPeriod::Min30);
        assert_eq!(series[0].label, "13:05");
    }

    #[test]
    fn intraday_minutes_are_zero_padded() {
        // 2025-01-01 00:00 UTC
        let raw = vec![bar(1_735_689_600, 10.0, 10.0, 10.0, 10.0, 1)];
        let series = ChartService::new().derive_series(&raw, ChartPeriod::Min30);
        assert_eq!(series[0].label, "0:00");
    }

    #[test]
    fn daily_labels_are_month_slash_day() {
        // 2025-01-15 UTC
        let raw = vec![bar(1_736_899_200, 10.0, 10.0, 10.0, 10.0, 1)];
        let series = ChartService::new().derive_series(&raw, ChartPeriod::Daily);
        assert_eq!(series[0].label, "1/15");
    }

    #[test]
    fn missing_volume_defaults_to_zero() {
        let mut raw = flat_bars(&[10.0]);
        raw[0].volume = None;
        let series = ChartService::new().derive_series(&raw, ChartPeriod::Daily);
        assert_eq!(series[0].volume, 0);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  OrderService
// ═══════════════════════════════════════════════════════════════════

mod ordering {
    use super::*;

    fn three_holdings() -> Vec<Holding> {
        let mut a = krw_holding("A", "000001", 1.0, 1.0, 1.0);
        let mut b = krw_holding("B", "000002", 1.0, 1.0, 1.0);
        let mut c = krw_holding("C", "000003", 1.0, 1.0, 1.0);
        a.sort_order = Some(0);
        b.sort_order = Some(1);
        c.sort_order = Some(2);
        vec![a, b, c]
    }

    fn apply(holdings: &mut [Holding], updates: &[pocket_core::services::order_service::SortOrderUpdate]) {
        for u in updates {
            if let Some(h) = holdings.iter_mut().find(|h| h.id == u.id) {
                h.sort_order = Some(u.sort_order);
            }
        }
    }

    #[test]
    fn sorted_puts_unordered_last() {
        let mut a = krw_holding("A", "000001", 1.0, 1.0, 1.0);
        let b = krw_holding("B", "000002", 1.0, 1.0, 1.0); // no sort key
        let mut c = krw_holding("C", "000003", 1.0, 1.0, 1.0);
        a.sort_order = Some(5);
        c.sort_order = Some(1);
        let list = vec![a, b, c];

        let sorted = OrderService::new().sorted(&list);
        let names: Vec<&str> = sorted.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["C", "A", "B"]);
    }

    #[test]
    fn sorted_is_stable_for_ties() {
        let list = vec![
            krw_holding("First", "000001", 1.0, 1.0, 1.0),
            krw_holding("Second", "000002", 1.0, 1.0, 1.0),
            krw_holding("Third", "000003", 1.0, 1.0, 1.0),
        ];
        let sorted = OrderService::new().sorted(&list);
        let names: Vec<&str> = sorted.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[test]
    fn drag_first_onto_last_moves_it_to_the_end() {
        // [A,B,C], A dragged onto C → [B,C,A] renumbered 0,1,2
        let list = three_holdings();
        let updates = OrderService::new()
            .reorder(&list, list[0].id, list[2].id)
            .unwrap();

        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].id, list[1].id); // B → 0
        assert_eq!(updates[1].id, list[2].id); // C → 1
        assert_eq!(updates[2].id, list[0].id); // A → 2
        assert_eq!(
            updates.iter().map(|u| u.sort_order).collect::<Vec<_>>(),
            [0, 1, 2]
        );
    }

    #[test]
    fn drag_last_onto_first_moves_it_to_the_front() {
        let list = three_holdings();
        let updates = OrderService::new()
            .reorder(&list, list[2].id, list[0].id)
            .unwrap();
        let order: Vec<_> = updates.iter().map(|u| u.id).collect();
        assert_eq!(order, [list[2].id, list[0].id, list[1].id]);
    }

    #[test]
    fn reorder_and_back_restores_original_sequence() {
        let mut list = three_holdings();
        let original: Vec<(uuid::Uuid, Option<u32>)> =
            list.iter().map(|h| (h.id, h.sort_order)).collect();
        let (a, b, c) = (list[0].id, list[1].id, list[2].id);

        let svc = OrderService::new();

        // A → end
        let updates = svc.reorder(&list, a, c).unwrap();
        apply(&mut list, &updates);
        let display: Vec<_> = svc.sorted(&list).iter().map(|h| h.id).collect();
        assert_eq!(display, [b, c, a]);

        // A back to the front
        let visible: Vec<Holding> = svc.sorted(&list).into_iter().cloned().collect();
        let updates = svc.reorder(&visible, a, b).unwrap();
        apply(&mut list, &updates);

        let restored: Vec<(uuid::Uuid, Option<u32>)> =
            list.iter().map(|h| (h.id, h.sort_order)).collect();
        assert_eq!(restored, original);
    }

    #[test]
    fn self_drag_is_a_no_op() {
        let list = three_holdings();
        let updates = OrderService::new()
            .reorder(&list, list[1].id, list[1].id)
            .unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn drag_from_outside_the_subset_is_rejected() {
        let list = three_holdings();
        let foreign = krw_holding("X", "000099", 1.0, 1.0, 1.0);
        let err = OrderService::new()
            .reorder(&list, foreign.id, list[0].id)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn drop_target_outside_the_subset_is_rejected() {
        let list = three_holdings();
        let foreign = krw_holding("X", "000099", 1.0, 1.0, 1.0);
        let err = OrderService::new()
            .reorder(&list, list[0].id, foreign.id)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  LedgerService
// ═══════════════════════════════════════════════════════════════════

mod ledger {
    use super::*;

    fn sample_month() -> Vec<Transaction> {
        vec![
            Transaction::new(TransactionKind::Income, "Salary", 3_000_000.0, d(2025, 1, 25)),
            Transaction::new(TransactionKind::Income, "Interest", 50_000.0, d(2025, 1, 31)),
            Transaction::new(TransactionKind::Fixed, "Rent", 600_000.0, d(2025, 1, 1)),
            Transaction::new(TransactionKind::Variable, "Groceries", 250_000.0, d(2025, 1, 12)),
            Transaction::new(TransactionKind::Variable, "Dining", 150_000.0, d(2025, 1, 20)),
        ]
    }

    #[test]
    fn kind_totals() {
        let txs = sample_month();
        let svc = LedgerService::new();
        assert!((svc.total_income(&txs) - 3_050_000.0).abs() < 1e-6);
        assert!((svc.total_fixed(&txs) - 600_000.0).abs() < 1e-6);
        assert!((svc.total_variable(&txs) - 400_000.0).abs() < 1e-6);
        assert!((svc.total_expense(&txs) - 1_000_000.0).abs() < 1e-6);
        assert!((svc.balance(&txs) - 2_050_000.0).abs() < 1e-6);
    }

    #[test]
    fn budget_summary_tracks_goal() {
        let txs = sample_month();
        let summary = LedgerService::new().budget_summary(&txs, 2_000_000.0);
        assert!((summary.expense - 1_000_000.0).abs() < 1e-6);
        assert!((summary.remaining - 1_000_000.0).abs() < 1e-6);
        assert!((summary.balance - 2_050_000.0).abs() < 1e-6);
    }

    #[test]
    fn over_budget_remaining_goes_negative() {
        let txs = vec![Transaction::new(
            TransactionKind::Variable,
            "Splurge",
            500_000.0,
            d(2025, 1, 2),
        )];
        let summary = LedgerService::new().budget_summary(&txs, 300_000.0);
        assert!((summary.remaining + 200_000.0).abs() < 1e-6);
    }

    #[test]
    fn transactions_in_month_respects_window() {
        let mut txs = sample_month();
        txs.push(Transaction::new(
            TransactionKind::Variable,
            "February",
            10_000.0,
            d(2025, 2, 1),
        ));
        let scoped = LedgerService::new().transactions_in_month(&txs, YearMonth::new(2025, 1));
        assert_eq!(scoped.len(), 5);
    }

    #[test]
    fn asset_balance_is_deposits_minus_withdrawals() {
        let movements = vec![
            AssetMovement::new(AssetMovementKind::Deposit, 1_000_000.0, d(2025, 1, 1)),
            AssetMovement::new(AssetMovementKind::Deposit, 500_000.0, d(2025, 1, 10)),
            AssetMovement::new(AssetMovementKind::Withdraw, 300_000.0, d(2025, 1, 20)),
        ];
        let balance = LedgerService::new().asset_balance(&movements);
        assert!((balance - 1_200_000.0).abs() < 1e-6);
    }

    #[test]
    fn debt_outstanding_is_borrows_minus_repays() {
        let movements = vec![
            DebtMovement::new(DebtMovementKind::Borrow, 5_000_000.0, d(2024, 6, 1)),
            DebtMovement::new(DebtMovementKind::Repay, 1_500_000.0, d(2024, 12, 1)),
            DebtMovement::new(DebtMovementKind::Repay, 1_500_000.0, d(2025, 6, 1)),
        ];
        let outstanding = LedgerService::new().debt_outstanding(&movements);
        assert!((outstanding - 2_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn empty_ledgers_sum_to_zero() {
        let svc = LedgerService::new();
        assert_eq!(svc.balance(&[]), 0.0);
        assert_eq!(svc.asset_balance(&[]), 0.0);
        assert_eq!(svc.debt_outstanding(&[]), 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  QuoteService — suffix fallback & fan-out
// ═══════════════════════════════════════════════════════════════════

mod quotes {
    use super::*;

    #[tokio::test]
    async fn korean_ticker_tries_kospi_first() {
        let provider = ScriptedProvider::new().with_price("005930.KS", 73_500.0);
        let quote = QuoteService::new()
            .current_price(&provider, Market::Kr, "005930")
            .await
            .unwrap();
        assert!((quote.price - 73_500.0).abs() < 1e-9);
        assert_eq!(provider.calls(), ["005930.KS"]);
    }

    #[tokio::test]
    async fn kosdaq_listed_ticker_falls_back_once() {
        let provider = ScriptedProvider::new().with_price("035720.KQ", 45_000.0);
        let quote = QuoteService::new()
            .current_price(&provider, Market::Kr, "035720")
            .await
            .unwrap();
        assert!((quote.price - 45_000.0).abs() < 1e-9);
        assert_eq!(provider.calls(), ["035720.KS", "035720.KQ"]);
    }

    #[tokio::test]
    async fn unknown_korean_ticker_makes_exactly_two_attempts() {
        let provider = ScriptedProvider::new();
        let err = QuoteService::new()
            .current_price(&provider, Market::Kr, "999999")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::SymbolNotFound(_)));
        assert_eq!(provider.calls(), ["999999.KS", "999999.KQ"]);
    }

    #[tokio::test]
    async fn network_failure_does_not_trigger_the_suffix_retry() {
        // The alternate attempt is reserved for not-found; a transport
        // error surfaces immediately.
        let provider = ScriptedProvider::new().with_outage("005930.KS");
        let err = QuoteService::new()
            .current_price(&provider, Market::Kr, "005930")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
        assert_eq!(provider.calls(), ["005930.KS"]);
    }

    #[tokio::test]
    async fn us_ticker_has_no_alternate() {
        let provider = ScriptedProvider::new();
        let err = QuoteService::new()
            .current_price(&provider, Market::Us, "NOPE")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::SymbolNotFound(_)));
        assert_eq!(provider.calls(), ["NOPE"]);
    }

    #[tokio::test]
    async fn chart_uses_the_same_fallback_rule() {
        let provider =
            ScriptedProvider::new().with_chart("035720.KQ", flat_bars(&[1.0, 2.0, 3.0]));
        let bars = QuoteService::new()
            .chart(&provider, Market::Kr, "035720", ChartPeriod::Daily)
            .await
            .unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(provider.calls(), ["035720.KS", "035720.KQ"]);
    }

    #[tokio::test]
    async fn exchange_rate_uses_the_fx_symbol() {
        let provider = ScriptedProvider::new().with_price("USDKRW=X", 1_400.25);
        let rate = QuoteService::new().exchange_rate(&provider).await.unwrap();
        assert!((rate.rate - 1_400.25).abs() < 1e-9);
        assert_eq!(provider.calls(), ["USDKRW=X"]);
    }

    #[tokio::test]
    async fn fan_out_isolates_failures_per_holding() {
        let provider = ScriptedProvider::new()
            .with_price("005930.KS", 73_500.0)
            .with_price("AAPL", 180.0);
        let holdings = vec![
            krw_holding("삼성전자", "005930", 10.0, 70_000.0, 70_000.0),
            usd_holding("Apple", "AAPL", 2.0, 150.0, 150.0),
            krw_holding("상장폐지", "999999", 1.0, 1_000.0, 1_000.0),
        ];

        let results = QuoteService::new()
            .refresh_prices(&provider, &holdings)
            .await;

        assert_eq!(results.len(), 3);
        assert!(results[0].outcome.is_ok());
        assert!(results[1].outcome.is_ok());
        assert!(results[2].outcome.is_err());
    }

    #[tokio::test]
    async fn fan_out_over_empty_holdings_is_empty() {
        let provider = ScriptedProvider::new();
        let results = QuoteService::new().refresh_prices(&provider, &[]).await;
        assert!(results.is_empty());
        assert!(provider.calls().is_empty());
    }
}
