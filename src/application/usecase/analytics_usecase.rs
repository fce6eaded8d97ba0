// src/application/usecase/analytics_usecase.rs
// Performance reporting use case: narrows the record set through the
// filter layer, then hands plain outcome records to the pure aggregator.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::errors::JournalResult;
use crate::domain::model::{
    filter_trades, EquityPoint, MarketPnl, OutcomeRecord, PerformanceStats, TradeFilter,
};
use crate::domain::repository::{SimulationRepository, TradeRepository};
use crate::infrastructure::analytics::PerformanceAnalytics;

#[async_trait]
pub trait PerformanceReportUseCase {
    /// Summary statistics over the filtered closed trades and simulations.
    async fn stats(&self, filter: &TradeFilter) -> JournalResult<PerformanceStats>;

    /// Cumulative realized P/L in chronological (entry) order.
    async fn equity_curve(&self, filter: &TradeFilter) -> JournalResult<Vec<EquityPoint>>;

    /// Gross profit / absolute gross loss per market label.
    async fn profit_by_market(
        &self,
        filter: &TradeFilter,
    ) -> JournalResult<BTreeMap<String, MarketPnl>>;
}

pub struct PerformanceReporter {
    trades: Arc<dyn TradeRepository + Send + Sync>,
    simulations: Arc<dyn SimulationRepository + Send + Sync>,
    analytics: PerformanceAnalytics,
}

impl PerformanceReporter {
    pub fn new(
        trades: Arc<dyn TradeRepository + Send + Sync>,
        simulations: Arc<dyn SimulationRepository + Send + Sync>,
    ) -> Self {
        Self {
            trades,
            simulations,
            analytics: PerformanceAnalytics::new(),
        }
    }

    /// Filtered trades in chronological order followed by the filtered
    /// simulations, reduced to outcome records. Open trades pass through
    /// as undetermined records and fall out of every statistic downstream.
    async fn gather(&self, filter: &TradeFilter) -> JournalResult<Vec<OutcomeRecord>> {
        let trades = self.trades.list_trades(filter.account_id).await?;
        let mut trades = filter_trades(&trades, filter);
        // Storage lists newest-first for display; aggregation wants the
        // natural journal sequence.
        trades.sort_by(|a, b| a.entry_date.cmp(&b.entry_date).then(a.id.cmp(&b.id)));

        let mut records: Vec<OutcomeRecord> = trades.iter().map(OutcomeRecord::from).collect();
        let simulations = self.simulations.list_simulations(Some(filter)).await?;
        records.extend(simulations.iter().map(OutcomeRecord::from));
        Ok(records)
    }
}

#[async_trait]
impl PerformanceReportUseCase for PerformanceReporter {
    async fn stats(&self, filter: &TradeFilter) -> JournalResult<PerformanceStats> {
        let records = self.gather(filter).await?;
        Ok(self.analytics.compute_stats(&records))
    }

    async fn equity_curve(&self, filter: &TradeFilter) -> JournalResult<Vec<EquityPoint>> {
        let records = self.gather(filter).await?;
        Ok(self.analytics.equity_curve(&records))
    }

    async fn profit_by_market(
        &self,
        filter: &TradeFilter,
    ) -> JournalResult<BTreeMap<String, MarketPnl>> {
        let records = self.gather(filter).await?;
        Ok(self.analytics.profit_by_market(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        Account, CloseTrade, Direction, NewTrade, Simulation, SimulationResult, Trade,
    };
    use crate::infrastructure::storage::InMemoryJournal;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn seeded_store() -> Arc<InMemoryJournal> {
        let store = Arc::new(InMemoryJournal::new());
        store
            .insert_account(Account {
                id: 1,
                account_name: "main".to_string(),
                current_balance: dec!(10000),
            })
            .await;
        store
    }

    // Closed trade on `account` with the given result, entered `days_ago`.
    async fn closed_trade(
        store: &InMemoryJournal,
        account: i64,
        instrument: &str,
        days_ago: i64,
        result: Decimal,
    ) {
        let entry = Utc::now() - Duration::days(days_ago);
        let mut trade = Trade::open(
            account,
            NewTrade {
                instrument: Some(instrument.to_string()),
                entry_price: dec!(100),
                position_size: dec!(1),
                direction: Direction::Long,
                entry_date: Some(entry),
                ..Default::default()
            },
        )
        .unwrap();
        trade
            .close(CloseTrade {
                exit_price: dec!(100),
                exit_date: Some(entry + Duration::hours(4)),
                result: Some(result),
                ..Default::default()
            })
            .unwrap();
        store.create_trade(trade).await.unwrap();
    }

    async fn open_trade(store: &InMemoryJournal, account: i64) {
        let trade = Trade::open(
            account,
            NewTrade {
                entry_price: dec!(100),
                position_size: dec!(1),
                direction: Direction::Long,
                ..Default::default()
            },
        )
        .unwrap();
        store.create_trade(trade).await.unwrap();
    }

    #[tokio::test]
    async fn stats_cover_closed_trades_and_simulations_but_not_open_trades() {
        let store = seeded_store().await;
        closed_trade(&store, 1, "XAUUSD", 3, dec!(100)).await;
        closed_trade(&store, 1, "XAUUSD", 2, dec!(-40)).await;
        open_trade(&store, 1).await;
        store
            .insert_simulation(Simulation {
                id: 1,
                market: Some("XAUUSD".to_string()),
                simulation_result: Some(SimulationResult::Win),
                profit_loss: Some(dec!(60)),
            })
            .await;

        let reporter = PerformanceReporter::new(store.clone(), store.clone());
        let stats = reporter.stats(&TradeFilter::default()).await.unwrap();

        assert_eq!(stats.total_simulations, 3);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.total_profit, dec!(160));
        assert_eq!(stats.total_loss, dec!(40));
        assert_eq!(stats.profit_factor, Some(dec!(4)));
    }

    #[tokio::test]
    async fn equity_curve_follows_entry_order_not_display_order() {
        let store = seeded_store().await;
        // Inserted newest-entry-last on purpose; display order is newest
        // first, but the curve must run oldest to newest.
        closed_trade(&store, 1, "XAUUSD", 5, dec!(100)).await;
        closed_trade(&store, 1, "XAUUSD", 4, dec!(-40)).await;
        closed_trade(&store, 1, "XAUUSD", 3, dec!(60)).await;

        let reporter = PerformanceReporter::new(store.clone(), store.clone());
        let curve = reporter.equity_curve(&TradeFilter::default()).await.unwrap();

        let equities: Vec<Decimal> = curve.iter().map(|p| p.equity).collect();
        assert_eq!(equities, vec![dec!(100), dec!(60), dec!(120)]);
        assert_eq!(curve[0].sequence, 1);
        assert_eq!(curve[2].sequence, 3);
    }

    #[tokio::test]
    async fn filter_narrows_by_account_and_instrument() {
        let store = seeded_store().await;
        store
            .insert_account(Account {
                id: 2,
                account_name: "demo".to_string(),
                current_balance: dec!(5000),
            })
            .await;
        closed_trade(&store, 1, "XAUUSD", 4, dec!(80)).await;
        closed_trade(&store, 1, "EURUSD", 3, dec!(20)).await;
        closed_trade(&store, 2, "XAUUSD", 2, dec!(-30)).await;

        let reporter = PerformanceReporter::new(store.clone(), store.clone());
        let stats = reporter
            .stats(&TradeFilter {
                account_id: Some(1),
                instrument: Some("XAUUSD".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(stats.total_simulations, 1);
        assert_eq!(stats.total_profit, dec!(80));
    }

    #[tokio::test]
    async fn by_market_combines_trades_and_simulations() {
        let store = seeded_store().await;
        closed_trade(&store, 1, "Gold", 2, dec!(120)).await;
        closed_trade(&store, 1, "Gold", 1, dec!(-20)).await;
        store
            .insert_simulation(Simulation {
                id: 1,
                market: None,
                simulation_result: Some(SimulationResult::Win),
                profit_loss: Some(dec!(15)),
            })
            .await;

        let reporter = PerformanceReporter::new(store.clone(), store.clone());
        let markets = reporter
            .profit_by_market(&TradeFilter::default())
            .await
            .unwrap();

        assert_eq!(markets["Gold"].profit, dec!(120));
        assert_eq!(markets["Gold"].loss, dec!(20));
        assert_eq!(markets["Unknown"].profit, dec!(15));
    }

    #[tokio::test]
    async fn empty_journal_reports_not_applicable() {
        let store = seeded_store().await;
        let reporter = PerformanceReporter::new(store.clone(), store.clone());
        let stats = reporter.stats(&TradeFilter::default()).await.unwrap();
        assert_eq!(stats.total_simulations, 0);
        assert_eq!(stats.win_rate, None);
        assert_eq!(stats.profit_factor, None);
    }
}
