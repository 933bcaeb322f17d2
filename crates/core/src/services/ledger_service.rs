use crate::models::ledger::{
    AssetMovement, AssetMovementKind, DebtMovement, DebtMovementKind, Transaction,
    TransactionKind, YearMonth,
};

/// One month's budget picture against the spending goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetSummary {
    pub income: f64,
    pub fixed: f64,
    pub variable: f64,

    /// fixed + variable
    pub expense: f64,

    /// income − expense
    pub balance: f64,

    pub goal: f64,

    /// goal − expense; negative when over budget
    pub remaining: f64,
}

/// Sums over the budget, asset, and debt ledgers.
///
/// Pure arithmetic — records come pre-filtered (usually by month) and the
/// kind enum carries the sign, so every amount here is non-negative input.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    // ── Budget ──────────────────────────────────────────────────────

    #[must_use]
    pub fn total_income(&self, transactions: &[Transaction]) -> f64 {
        self.sum_kind(transactions, TransactionKind::Income)
    }

    #[must_use]
    pub fn total_fixed(&self, transactions: &[Transaction]) -> f64 {
        self.sum_kind(transactions, TransactionKind::Fixed)
    }

    #[must_use]
    pub fn total_variable(&self, transactions: &[Transaction]) -> f64 {
        self.sum_kind(transactions, TransactionKind::Variable)
    }

    #[must_use]
    pub fn total_expense(&self, transactions: &[Transaction]) -> f64 {
        self.total_fixed(transactions) + self.total_variable(transactions)
    }

    /// income − (fixed + variable)
    #[must_use]
    pub fn balance(&self, transactions: &[Transaction]) -> f64 {
        self.total_income(transactions) - self.total_expense(transactions)
    }

    /// Full monthly summary against the configured spending goal.
    #[must_use]
    pub fn budget_summary(&self, transactions: &[Transaction], goal: f64) -> BudgetSummary {
        let income = self.total_income(transactions);
        let fixed = self.total_fixed(transactions);
        let variable = self.total_variable(transactions);
        let expense = fixed + variable;
        BudgetSummary {
            income,
            fixed,
            variable,
            expense,
            balance: income - expense,
            goal,
            remaining: goal - expense,
        }
    }

    /// Transactions falling inside one month, any kind.
    #[must_use]
    pub fn transactions_in_month<'a>(
        &self,
        transactions: &'a [Transaction],
        month: YearMonth,
    ) -> Vec<&'a Transaction> {
        transactions
            .iter()
            .filter(|t| month.contains(t.date))
            .collect()
    }

    // ── Assets ──────────────────────────────────────────────────────

    /// Running account balance: Σ deposits − Σ withdrawals.
    #[must_use]
    pub fn asset_balance(&self, movements: &[AssetMovement]) -> f64 {
        movements.iter().fold(0.0, |acc, m| match m.kind {
            AssetMovementKind::Deposit => acc + m.amount,
            AssetMovementKind::Withdraw => acc - m.amount,
        })
    }

    // ── Debts ───────────────────────────────────────────────────────

    /// Outstanding debt: Σ borrows − Σ repayments.
    #[must_use]
    pub fn debt_outstanding(&self, movements: &[DebtMovement]) -> f64 {
        movements.iter().fold(0.0, |acc, m| match m.kind {
            DebtMovementKind::Borrow => acc + m.amount,
            DebtMovementKind::Repay => acc - m.amount,
        })
    }

    fn sum_kind(&self, transactions: &[Transaction], kind: TransactionKind) -> f64 {
        transactions
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .sum()
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
