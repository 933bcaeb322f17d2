use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of a budget transaction. Sign is implied by the kind:
/// income adds to the monthly balance, fixed and variable spend subtract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Fixed,
    Variable,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Fixed => write!(f, "fixed"),
            TransactionKind::Variable => write!(f, "variable"),
        }
    }
}

/// One budget ledger entry (paycheck, rent, groceries, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,

    #[serde(rename = "type")]
    pub kind: TransactionKind,

    pub name: String,

    /// Always non-negative; the kind carries the sign
    pub amount: f64,

    pub date: NaiveDate,

    /// Whether this entry has actually been paid/received this month
    #[serde(rename = "is_completed", default)]
    pub completed: bool,

    #[serde(default)]
    pub memo: String,
}

impl Transaction {
    pub fn new(kind: TransactionKind, name: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.into(),
            amount,
            date,
            completed: false,
            memo: String::new(),
        }
    }
}

/// Direction of a cash-account movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetMovementKind {
    Deposit,
    Withdraw,
}

/// One deposit/withdrawal on the savings (CMA) account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMovement {
    pub id: Uuid,

    #[serde(rename = "type")]
    pub kind: AssetMovementKind,

    pub amount: f64,

    pub date: NaiveDate,

    #[serde(default)]
    pub description: String,
}

impl AssetMovement {
    pub fn new(kind: AssetMovementKind, amount: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            date,
            description: String::new(),
        }
    }
}

/// Direction of a debt movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtMovementKind {
    Borrow,
    Repay,
}

/// One borrow/repayment against outstanding debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtMovement {
    pub id: Uuid,

    #[serde(rename = "type")]
    pub kind: DebtMovementKind,

    pub amount: f64,

    pub date: NaiveDate,

    #[serde(default)]
    pub description: String,
}

impl DebtMovement {
    pub fn new(kind: DebtMovementKind, amount: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            date,
            description: String::new(),
        }
    }
}

/// A calendar month used to window ledger queries.
/// The window is inclusive: first day of the month through its last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based month
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// First day of the month. `None` for an invalid month number.
    #[must_use]
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Last day of the month, accounting for month length and leap years.
    #[must_use]
    pub fn last_day(&self) -> Option<NaiveDate> {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.and_then(|d| d.pred_opt())
    }

    /// Whether `date` falls inside this month's inclusive window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.first_day(), self.last_day()) {
            (Some(first), Some(last)) => date >= first && date <= last,
            _ => false,
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
