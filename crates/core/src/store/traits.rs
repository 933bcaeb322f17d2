use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::holding::{Broker, Holding, Market};
use crate::models::ledger::{AssetMovement, DebtMovement, Transaction, TransactionKind, YearMonth};
use crate::services::order_service::SortOrderUpdate;

/// Boundary to the hosted record store.
///
/// The production backing is an external managed database; [`MemoryStore`]
/// (the in-crate implementation) doubles as the offline backing and the
/// test double. The facade never touches persistence except through this
/// trait, so swapping the backend touches exactly one implementation.
///
/// [`MemoryStore`]: crate::store::memory::MemoryStore
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait EntityStore: Send + Sync {
    // ── Budget transactions ─────────────────────────────────────────

    /// List transactions, optionally narrowed by kind and/or month,
    /// ordered by date ascending.
    async fn list_transactions(
        &self,
        kind: Option<TransactionKind>,
        month: Option<YearMonth>,
    ) -> Result<Vec<Transaction>, CoreError>;

    async fn insert_transaction(&self, tx: Transaction) -> Result<Transaction, CoreError>;

    async fn update_transaction(&self, tx: &Transaction) -> Result<Transaction, CoreError>;

    async fn delete_transaction(&self, id: Uuid) -> Result<(), CoreError>;

    // ── Asset movements ─────────────────────────────────────────────

    /// List asset movements, optionally narrowed by month, date ascending.
    async fn list_assets(&self, month: Option<YearMonth>)
        -> Result<Vec<AssetMovement>, CoreError>;

    async fn insert_asset(&self, movement: AssetMovement) -> Result<AssetMovement, CoreError>;

    async fn update_asset(&self, movement: &AssetMovement) -> Result<AssetMovement, CoreError>;

    async fn delete_asset(&self, id: Uuid) -> Result<(), CoreError>;

    // ── Debt movements ──────────────────────────────────────────────

    /// List debt movements, optionally narrowed by month, date ascending.
    async fn list_debts(&self, month: Option<YearMonth>) -> Result<Vec<DebtMovement>, CoreError>;

    async fn insert_debt(&self, movement: DebtMovement) -> Result<DebtMovement, CoreError>;

    async fn update_debt(&self, movement: &DebtMovement) -> Result<DebtMovement, CoreError>;

    async fn delete_debt(&self, id: Uuid) -> Result<(), CoreError>;

    // ── Holdings ────────────────────────────────────────────────────

    /// List holdings, optionally narrowed by market and/or broker, in
    /// display order: explicit sort order ascending with unordered
    /// holdings last, ties in insertion order.
    async fn list_holdings(
        &self,
        market: Option<Market>,
        broker: Option<Broker>,
    ) -> Result<Vec<Holding>, CoreError>;

    async fn insert_holding(&self, holding: Holding) -> Result<Holding, CoreError>;

    async fn update_holding(&self, holding: &Holding) -> Result<Holding, CoreError>;

    async fn delete_holding(&self, id: Uuid) -> Result<(), CoreError>;

    /// Persist a reorder as one batch of (id, sort key) pairs.
    async fn set_holding_orders(&self, orders: &[SortOrderUpdate]) -> Result<(), CoreError>;

    // ── Bulk ────────────────────────────────────────────────────────

    /// Drop every record in every collection. Used by replace-mode restore.
    async fn clear_all(&self) -> Result<(), CoreError>;
}
