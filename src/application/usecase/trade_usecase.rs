// src/application/usecase/trade_usecase.rs
// Trade lifecycle use case: validation and state transitions live on the
// entity; this layer owns orchestration against the storage collaborators.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::JournalResult;
use crate::domain::model::{
    AccountId, CloseTrade, NewTrade, Trade, TradeId, TradePatch, TradeStatus,
};
use crate::domain::repository::{AccountRepository, TradeRepository};

#[async_trait]
pub trait TradeLifecycleUseCase {
    /// Opens a trade against an existing account.
    async fn create_trade(&self, account_id: AccountId, spec: NewTrade) -> JournalResult<Trade>;

    /// Closes an open trade and applies the realized result to the account
    /// balance.
    async fn close_trade(&self, id: TradeId, req: CloseTrade) -> JournalResult<Trade>;

    /// Edits a still-open trade.
    async fn update_trade(&self, id: TradeId, patch: TradePatch) -> JournalResult<Trade>;

    async fn get_trade(&self, id: TradeId) -> JournalResult<Trade>;

    async fn list_trades(&self, account_id: Option<AccountId>) -> JournalResult<Vec<Trade>>;

    /// Deletes a trade, reverting its balance contribution if it had
    /// closed with a result.
    async fn delete_trade(&self, id: TradeId) -> JournalResult<()>;
}

pub struct TradeLifecycle {
    trades: Arc<dyn TradeRepository + Send + Sync>,
    accounts: Arc<dyn AccountRepository + Send + Sync>,
}

impl TradeLifecycle {
    pub fn new(
        trades: Arc<dyn TradeRepository + Send + Sync>,
        accounts: Arc<dyn AccountRepository + Send + Sync>,
    ) -> Self {
        Self { trades, accounts }
    }
}

#[async_trait]
impl TradeLifecycleUseCase for TradeLifecycle {
    async fn create_trade(&self, account_id: AccountId, spec: NewTrade) -> JournalResult<Trade> {
        // Reject trades against unknown accounts before touching the entity.
        self.accounts.get_account(account_id).await?;

        let trade = Trade::open(account_id, spec)?;
        let trade = self.trades.create_trade(trade).await?;
        log::info!(
            "Opened trade {} ({} {} @ {})",
            trade.id,
            trade.direction,
            trade.instrument,
            trade.entry_price
        );
        Ok(trade)
    }

    async fn close_trade(&self, id: TradeId, req: CloseTrade) -> JournalResult<Trade> {
        let mut trade = self.trades.get_trade(id).await?;
        trade.close(req)?;

        // The conditional update is the single winning-close gate; the
        // balance is only touched once the close has actually landed.
        let trade = self.trades.update_trade(id, trade).await?;
        if let Some(result) = trade.result {
            self.accounts.apply_to_balance(trade.account_id, result).await?;
        }

        log::info!(
            "Closed trade {} ({}) with result {}",
            trade.id,
            trade.instrument,
            trade.result.unwrap_or_default()
        );
        Ok(trade)
    }

    async fn update_trade(&self, id: TradeId, patch: TradePatch) -> JournalResult<Trade> {
        let mut trade = self.trades.get_trade(id).await?;
        trade.apply(patch)?;
        self.trades.update_trade(id, trade).await
    }

    async fn get_trade(&self, id: TradeId) -> JournalResult<Trade> {
        self.trades.get_trade(id).await
    }

    async fn list_trades(&self, account_id: Option<AccountId>) -> JournalResult<Vec<Trade>> {
        self.trades.list_trades(account_id).await
    }

    async fn delete_trade(&self, id: TradeId) -> JournalResult<()> {
        let trade = self.trades.get_trade(id).await?;

        // A closed trade already moved the balance; removing the record
        // removes its contribution too.
        if trade.status == TradeStatus::Closed {
            if let Some(result) = trade.result {
                self.accounts
                    .apply_to_balance(trade.account_id, -result)
                    .await?;
            }
        }

        self.trades.delete_trade(id).await?;
        log::info!("Deleted trade {}", id);
        Ok(())
    }
}
