// src/infrastructure/storage/mod.rs
// In-memory implementation of the storage collaborator interfaces,
// optionally seeded from a JSON journal document.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

use crate::domain::errors::{JournalError, JournalResult};
use crate::domain::model::{
    Account, AccountId, Simulation, Trade, TradeFilter, TradeId, TradeStatus,
};
use crate::domain::repository::{AccountRepository, SimulationRepository, TradeRepository};

/// On-disk journal document consumed by the binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalFile {
    #[serde(default)]
    pub accounts: Vec<Account>,

    #[serde(default)]
    pub trades: Vec<Trade>,

    #[serde(default)]
    pub simulations: Vec<Simulation>,
}

impl JournalFile {
    pub fn load<P: AsRef<Path>>(path: P) -> JournalResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| JournalError::Config(format!("Failed to read journal file: {}", e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| JournalError::Config(format!("Failed to parse journal file: {}", e)))
    }
}

#[derive(Debug, Default)]
struct JournalState {
    accounts: HashMap<AccountId, Account>,
    trades: HashMap<TradeId, Trade>,
    simulations: Vec<Simulation>,
    next_trade_id: TradeId,
}

/// RwLock-guarded journal store. Each operation takes the lock for its full
/// duration, so the open-conditional update in `update_trade` is atomic:
/// at most one close wins per trade.
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    inner: RwLock<JournalState>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: JournalFile) -> Self {
        let next_trade_id = data.trades.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let state = JournalState {
            accounts: data.accounts.into_iter().map(|a| (a.id, a)).collect(),
            trades: data.trades.into_iter().map(|t| (t.id, t)).collect(),
            simulations: data.simulations,
            next_trade_id,
        };
        Self {
            inner: RwLock::new(state),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> JournalResult<Self> {
        Ok(Self::with_data(JournalFile::load(path)?))
    }

    pub async fn insert_account(&self, account: Account) {
        let mut state = self.inner.write().await;
        state.accounts.insert(account.id, account);
    }

    pub async fn insert_simulation(&self, simulation: Simulation) {
        let mut state = self.inner.write().await;
        state.simulations.push(simulation);
    }
}

#[async_trait]
impl TradeRepository for InMemoryJournal {
    async fn get_trade(&self, id: TradeId) -> JournalResult<Trade> {
        let state = self.inner.read().await;
        state
            .trades
            .get(&id)
            .cloned()
            .ok_or_else(|| JournalError::NotFound(format!("trade {}", id)))
    }

    async fn list_trades(&self, account_id: Option<AccountId>) -> JournalResult<Vec<Trade>> {
        let state = self.inner.read().await;
        let mut trades: Vec<Trade> = state
            .trades
            .values()
            .filter(|t| account_id.map_or(true, |id| t.account_id == id))
            .cloned()
            .collect();
        // Newest entry first, ties broken by id so the order is stable.
        trades.sort_by(|a, b| b.entry_date.cmp(&a.entry_date).then(b.id.cmp(&a.id)));
        Ok(trades)
    }

    async fn create_trade(&self, mut trade: Trade) -> JournalResult<Trade> {
        let mut state = self.inner.write().await;
        trade.id = state.next_trade_id;
        state.next_trade_id += 1;
        state.trades.insert(trade.id, trade.clone());
        Ok(trade)
    }

    async fn update_trade(&self, id: TradeId, updated: Trade) -> JournalResult<Trade> {
        let mut state = self.inner.write().await;
        let stored = state
            .trades
            .get(&id)
            .ok_or_else(|| JournalError::NotFound(format!("trade {}", id)))?;

        // Closed rows are terminal; a late update (including a concurrent
        // second close) is rejected rather than partially applied.
        if stored.status == TradeStatus::Closed {
            return Err(JournalError::InvalidState(format!(
                "trade {} is already closed",
                id
            )));
        }

        let mut updated = updated;
        updated.id = id;
        state.trades.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_trade(&self, id: TradeId) -> JournalResult<()> {
        let mut state = self.inner.write().await;
        state
            .trades
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| JournalError::NotFound(format!("trade {}", id)))
    }
}

#[async_trait]
impl SimulationRepository for InMemoryJournal {
    async fn list_simulations(&self, filter: Option<&TradeFilter>) -> JournalResult<Vec<Simulation>> {
        let state = self.inner.read().await;
        Ok(state
            .simulations
            .iter()
            .filter(|s| filter.map_or(true, |f| f.matches_simulation(s)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AccountRepository for InMemoryJournal {
    async fn get_account(&self, id: AccountId) -> JournalResult<Account> {
        let state = self.inner.read().await;
        state
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| JournalError::NotFound(format!("account {}", id)))
    }

    async fn apply_to_balance(&self, id: AccountId, delta: Decimal) -> JournalResult<Account> {
        let mut state = self.inner.write().await;
        let account = state
            .accounts
            .get_mut(&id)
            .ok_or_else(|| JournalError::NotFound(format!("account {}", id)))?;
        account.current_balance += delta;
        Ok(account.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CloseTrade, Direction, NewTrade};
    use rust_decimal_macros::dec;

    fn account(id: AccountId) -> Account {
        Account {
            id,
            account_name: format!("account-{}", id),
            current_balance: dec!(10000),
        }
    }

    fn open_trade(account_id: AccountId) -> Trade {
        Trade::open(
            account_id,
            NewTrade {
                entry_price: dec!(2000),
                position_size: dec!(1),
                direction: Direction::Long,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = InMemoryJournal::new();
        let first = store.create_trade(open_trade(1)).await.unwrap();
        let second = store.create_trade(open_trade(1)).await.unwrap();
        assert_eq!(first.id + 1, second.id);
        assert_eq!(store.get_trade(first.id).await.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn list_trades_filters_by_account() {
        let store = InMemoryJournal::new();
        store.create_trade(open_trade(1)).await.unwrap();
        store.create_trade(open_trade(2)).await.unwrap();
        store.create_trade(open_trade(1)).await.unwrap();

        assert_eq!(store.list_trades(Some(1)).await.unwrap().len(), 2);
        assert_eq!(store.list_trades(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_rejected_once_stored_row_is_closed() {
        let store = InMemoryJournal::new();
        let trade = store.create_trade(open_trade(1)).await.unwrap();

        // Two callers race: both fetched the open row.
        let mut first = trade.clone();
        let mut second = trade.clone();
        first
            .close(CloseTrade {
                exit_price: dec!(2010),
                ..Default::default()
            })
            .unwrap();
        second
            .close(CloseTrade {
                exit_price: dec!(1990),
                ..Default::default()
            })
            .unwrap();

        store.update_trade(trade.id, first).await.unwrap();
        let err = store.update_trade(trade.id, second).await.unwrap_err();
        assert!(matches!(err, JournalError::InvalidState(_)));

        // The winning close is what persisted.
        let stored = store.get_trade(trade.id).await.unwrap();
        assert_eq!(stored.exit_price, Some(dec!(2010)));
    }

    #[tokio::test]
    async fn missing_rows_report_not_found() {
        let store = InMemoryJournal::new();
        assert!(matches!(
            store.get_trade(99).await.unwrap_err(),
            JournalError::NotFound(_)
        ));
        assert!(matches!(
            store.delete_trade(99).await.unwrap_err(),
            JournalError::NotFound(_)
        ));
        assert!(matches!(
            store.get_account(7).await.unwrap_err(),
            JournalError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn balance_applies_signed_deltas() {
        let store = InMemoryJournal::new();
        store.insert_account(account(1)).await;

        let updated = store.apply_to_balance(1, dec!(150)).await.unwrap();
        assert_eq!(updated.current_balance, dec!(10150));
        let updated = store.apply_to_balance(1, dec!(-200)).await.unwrap();
        assert_eq!(updated.current_balance, dec!(9950));
    }

    #[test]
    fn journal_file_tolerates_missing_sections() {
        let doc: JournalFile = serde_json::from_str("{}").unwrap();
        assert!(doc.accounts.is_empty());
        assert!(doc.trades.is_empty());
        assert!(doc.simulations.is_empty());
    }

    #[test]
    fn with_data_seeds_id_counter_past_existing_trades() {
        let mut trade = open_trade(1);
        trade.id = 41;
        let store = InMemoryJournal::with_data(JournalFile {
            accounts: vec![account(1)],
            trades: vec![trade],
            simulations: Vec::new(),
        });

        let state = store.inner.try_read().unwrap();
        assert_eq!(state.next_trade_id, 42);
    }
}
