use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::holding::{Broker, Holding, Market};
use crate::models::ledger::{AssetMovement, DebtMovement, Transaction, TransactionKind, YearMonth};
use crate::services::order_service::SortOrderUpdate;
use super::traits::EntityStore;

#[derive(Default)]
struct State {
    transactions: Vec<Transaction>,
    assets: Vec<AssetMovement>,
    debts: Vec<DebtMovement>,
    /// Insertion order is preserved; display ordering is applied at list time.
    holdings: Vec<Holding>,
}

/// In-memory [`EntityStore`]. The default backing when no hosted store is
/// wired up, and the stand-in for it in tests.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl EntityStore for MemoryStore {
    async fn list_transactions(
        &self,
        kind: Option<TransactionKind>,
        month: Option<YearMonth>,
    ) -> Result<Vec<Transaction>, CoreError> {
        let state = self.lock();
        let mut out: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| kind.is_none_or(|k| t.kind == k))
            .filter(|t| month.is_none_or(|m| m.contains(t.date)))
            .cloned()
            .collect();
        out.sort_by_key(|t| t.date);
        Ok(out)
    }

    async fn insert_transaction(&self, tx: Transaction) -> Result<Transaction, CoreError> {
        self.lock().transactions.push(tx.clone());
        Ok(tx)
    }

    async fn update_transaction(&self, tx: &Transaction) -> Result<Transaction, CoreError> {
        let mut state = self.lock();
        let slot = state
            .transactions
            .iter_mut()
            .find(|t| t.id == tx.id)
            .ok_or_else(|| CoreError::NotFound(format!("transaction {}", tx.id)))?;
        *slot = tx.clone();
        Ok(tx.clone())
    }

    async fn delete_transaction(&self, id: Uuid) -> Result<(), CoreError> {
        let mut state = self.lock();
        let before = state.transactions.len();
        state.transactions.retain(|t| t.id != id);
        if state.transactions.len() == before {
            return Err(CoreError::NotFound(format!("transaction {id}")));
        }
        Ok(())
    }

    async fn list_assets(
        &self,
        month: Option<YearMonth>,
    ) -> Result<Vec<AssetMovement>, CoreError> {
        let state = self.lock();
        let mut out: Vec<AssetMovement> = state
            .assets
            .iter()
            .filter(|m| month.is_none_or(|ym| ym.contains(m.date)))
            .cloned()
            .collect();
        out.sort_by_key(|m| m.date);
        Ok(out)
    }

    async fn insert_asset(&self, movement: AssetMovement) -> Result<AssetMovement, CoreError> {
        self.lock().assets.push(movement.clone());
        Ok(movement)
    }

    async fn update_asset(&self, movement: &AssetMovement) -> Result<AssetMovement, CoreError> {
        let mut state = self.lock();
        let slot = state
            .assets
            .iter_mut()
            .find(|m| m.id == movement.id)
            .ok_or_else(|| CoreError::NotFound(format!("asset movement {}", movement.id)))?;
        *slot = movement.clone();
        Ok(movement.clone())
    }

    async fn delete_asset(&self, id: Uuid) -> Result<(), CoreError> {
        let mut state = self.lock();
        let before = state.assets.len();
        state.assets.retain(|m| m.id != id);
        if state.assets.len() == before {
            return Err(CoreError::NotFound(format!("asset movement {id}")));
        }
        Ok(())
    }

    async fn list_debts(&self, month: Option<YearMonth>) -> Result<Vec<DebtMovement>, CoreError> {
        let state = self.lock();
        let mut out: Vec<DebtMovement> = state
            .debts
            .iter()
            .filter(|m| month.is_none_or(|ym| ym.contains(m.date)))
            .cloned()
            .collect();
        out.sort_by_key(|m| m.date);
        Ok(out)
    }

    async fn insert_debt(&self, movement: DebtMovement) -> Result<DebtMovement, CoreError> {
        self.lock().debts.push(movement.clone());
        Ok(movement)
    }

    async fn update_debt(&self, movement: &DebtMovement) -> Result<DebtMovement, CoreError> {
        let mut state = self.lock();
        let slot = state
            .debts
            .iter_mut()
            .find(|m| m.id == movement.id)
            .ok_or_else(|| CoreError::NotFound(format!("debt movement {}", movement.id)))?;
        *slot = movement.clone();
        Ok(movement.clone())
    }

    async fn delete_debt(&self, id: Uuid) -> Result<(), CoreError> {
        let mut state = self.lock();
        let before = state.debts.len();
        state.debts.retain(|m| m.id != id);
        if state.debts.len() == before {
            return Err(CoreError::NotFound(format!("debt movement {id}")));
        }
        Ok(())
    }

    async fn list_holdings(
        &self,
        market: Option<Market>,
        broker: Option<Broker>,
    ) -> Result<Vec<Holding>, CoreError> {
        let state = self.lock();
        let mut out: Vec<Holding> = state
            .holdings
            .iter()
            .filter(|h| market.is_none_or(|m| h.market == m))
            .filter(|h| broker.is_none_or(|b| h.broker == b))
            .cloned()
            .collect();
        // Stable sort: explicit order first, unordered last, insertion
        // order breaks ties.
        out.sort_by_key(|h| h.effective_sort_key());
        Ok(out)
    }

    async fn insert_holding(&self, holding: Holding) -> Result<Holding, CoreError> {
        self.lock().holdings.push(holding.clone());
        Ok(holding)
    }

    async fn update_holding(&self, holding: &Holding) -> Result<Holding, CoreError> {
        let mut state = self.lock();
        let slot = state
            .holdings
            .iter_mut()
            .find(|h| h.id == holding.id)
            .ok_or_else(|| CoreError::NotFound(format!("holding {}", holding.id)))?;
        *slot = holding.clone();
        Ok(holding.clone())
    }

    async fn delete_holding(&self, id: Uuid) -> Result<(), CoreError> {
        let mut state = self.lock();
        let before = state.holdings.len();
        state.holdings.retain(|h| h.id != id);
        if state.holdings.len() == before {
            return Err(CoreError::NotFound(format!("holding {id}")));
        }
        Ok(())
    }

    async fn set_holding_orders(&self, orders: &[SortOrderUpdate]) -> Result<(), CoreError> {
        let mut state = self.lock();
        for update in orders {
            let slot = state
                .holdings
                .iter_mut()
                .find(|h| h.id == update.id)
                .ok_or_else(|| CoreError::NotFound(format!("holding {}", update.id)))?;
            slot.sort_order = Some(update.sort_order);
        }
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), CoreError> {
        let mut state = self.lock();
        state.transactions.clear();
        state.assets.clear();
        state.debts.clear();
        state.holdings.clear();
        Ok(())
    }
}
