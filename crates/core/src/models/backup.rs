use serde::{Deserialize, Serialize};

use super::holding::Holding;
use super::ledger::{AssetMovement, DebtMovement, Transaction};

/// Backup document format version.
pub const BACKUP_VERSION: &str = "1.0";

/// The full-export JSON document:
/// `{ version, exportedAt, data: { transactions, assets, debts, stocks } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub version: String,

    /// RFC 3339 timestamp of the export
    #[serde(rename = "exportedAt")]
    pub exported_at: String,

    pub data: BackupData,
}

/// The four persisted collections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BackupData {
    #[serde(default)]
    pub transactions: Vec<Transaction>,

    #[serde(default)]
    pub assets: Vec<AssetMovement>,

    #[serde(default)]
    pub debts: Vec<DebtMovement>,

    #[serde(default)]
    pub stocks: Vec<Holding>,
}

/// How restore treats records already in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreMode {
    /// Insert backup records alongside whatever exists
    Append,
    /// Clear every collection first, then insert
    Replace,
}

/// Per-collection counts of restored records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreReport {
    pub transactions: usize,
    pub assets: usize,
    pub debts: usize,
    pub stocks: usize,
}

impl RestoreReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.transactions + self.assets + self.debts + self.stocks
    }
}
