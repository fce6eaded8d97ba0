// src/domain/repository/mod.rs
// Storage collaborator interfaces. The engine never talks to a database
// directly; these seams are what the surrounding system implements.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::errors::JournalResult;
use crate::domain::model::{Account, AccountId, Simulation, Trade, TradeFilter, TradeId};

/// Repository interface for trade records.
#[async_trait]
pub trait TradeRepository {
    async fn get_trade(&self, id: TradeId) -> JournalResult<Trade>;

    /// Trades for one account, or all trades, newest entry first.
    async fn list_trades(&self, account_id: Option<AccountId>) -> JournalResult<Vec<Trade>>;

    /// Persists a new trade, assigning its id.
    async fn create_trade(&self, trade: Trade) -> JournalResult<Trade>;

    /// Replaces a stored trade. The update is conditional on the stored row
    /// still being open: once a close has landed, any further update is
    /// rejected with `InvalidState`. This is what makes a concurrent second
    /// close lose cleanly instead of partially applying.
    async fn update_trade(&self, id: TradeId, updated: Trade) -> JournalResult<Trade>;

    async fn delete_trade(&self, id: TradeId) -> JournalResult<()>;
}

/// Repository interface for simulation records (read-only input to
/// analytics).
#[async_trait]
pub trait SimulationRepository {
    async fn list_simulations(&self, filter: Option<&TradeFilter>) -> JournalResult<Vec<Simulation>>;
}

/// Repository interface for accounts.
#[async_trait]
pub trait AccountRepository {
    async fn get_account(&self, id: AccountId) -> JournalResult<Account>;

    /// Applies a realized P/L delta to the account balance.
    async fn apply_to_balance(&self, id: AccountId, delta: Decimal) -> JournalResult<Account>;
}
