use chrono::Utc;

use crate::errors::CoreError;
use crate::models::backup::{Backup, BackupData, RestoreMode, RestoreReport, BACKUP_VERSION};
use super::traits::EntityStore;

/// Export every collection into the portable backup document.
pub async fn export_all(store: &dyn EntityStore) -> Result<Backup, CoreError> {
    let transactions = store.list_transactions(None, None).await?;
    let assets = store.list_assets(None).await?;
    let debts = store.list_debts(None).await?;
    let stocks = store.list_holdings(None, None).await?;

    Ok(Backup {
        version: BACKUP_VERSION.to_string(),
        exported_at: Utc::now().to_rfc3339(),
        data: BackupData {
            transactions,
            assets,
            debts,
            stocks,
        },
    })
}

/// Restore a backup document into the store.
///
/// `Replace` clears every collection first; `Append` inserts alongside
/// existing records. Returns per-collection insert counts.
pub async fn import_all(
    store: &dyn EntityStore,
    backup: Backup,
    mode: RestoreMode,
) -> Result<RestoreReport, CoreError> {
    if mode == RestoreMode::Replace {
        store.clear_all().await?;
    }

    let mut report = RestoreReport::default();

    for tx in backup.data.transactions {
        store.insert_transaction(tx).await?;
        report.transactions += 1;
    }
    for movement in backup.data.assets {
        store.insert_asset(movement).await?;
        report.assets += 1;
    }
    for movement in backup.data.debts {
        store.insert_debt(movement).await?;
        report.debts += 1;
    }
    for holding in backup.data.stocks {
        store.insert_holding(holding).await?;
        report.stocks += 1;
    }

    log::info!(
        "restore complete: {} transactions, {} assets, {} debts, {} stocks",
        report.transactions,
        report.assets,
        report.debts,
        report.stocks
    );
    Ok(report)
}

/// Parse a backup document from its JSON text.
pub fn parse_backup(json: &str) -> Result<Backup, CoreError> {
    serde_json::from_str(json)
        .map_err(|e| CoreError::Deserialization(format!("invalid backup document: {e}")))
}

/// Serialize a backup document to pretty JSON.
pub fn backup_to_json(backup: &Backup) -> Result<String, CoreError> {
    serde_json::to_string_pretty(backup)
        .map_err(|e| CoreError::Serialization(format!("failed to serialize backup: {e}")))
}

/// Write a backup document to a file on disk (native only, not WASM).
#[cfg(not(target_arch = "wasm32"))]
pub fn write_backup_file(backup: &Backup, path: &str) -> Result<(), CoreError> {
    let json = backup_to_json(backup)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read a backup document from a file on disk (native only, not WASM).
#[cfg(not(target_arch = "wasm32"))]
pub fn read_backup_file(path: &str) -> Result<Backup, CoreError> {
    let json = std::fs::read_to_string(path)?;
    parse_backup(&json)
}
