// src/main.rs
use std::sync::Arc;

use trade_journal::application::usecase::{
    PerformanceReportUseCase, PerformanceReporter, TradeLifecycle, TradeLifecycleUseCase,
};
use trade_journal::config::Config;
use trade_journal::domain::errors::JournalResult;
use trade_journal::domain::model::TradeFilter;
use trade_journal::infrastructure::storage::InMemoryJournal;

#[tokio::main]
async fn main() -> JournalResult<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting trade_journal v{}", env!("CARGO_PKG_VERSION"));

    // Load the journal store
    let store = match &config.journal.data_file {
        Some(path) => {
            log::info!("Loading journal data from {}", path);
            Arc::new(InMemoryJournal::from_file(path)?)
        }
        None => {
            log::info!("No journal data file configured; starting empty");
            Arc::new(InMemoryJournal::new())
        }
    };

    // Wire use cases
    let lifecycle = TradeLifecycle::new(store.clone(), store.clone());
    let reporter = PerformanceReporter::new(store.clone(), store.clone());

    let filter = TradeFilter {
        account_id: config.journal.report_account_id,
        ..Default::default()
    };

    // Open positions
    let trades = lifecycle.list_trades(filter.account_id).await?;
    let open: Vec<_> = trades.iter().filter(|t| t.is_open()).collect();
    if !open.is_empty() {
        log::info!("=== Open Trades ===");
        for trade in &open {
            log::info!(
                "#{} {} {} {} @ {}",
                trade.id,
                trade.instrument,
                trade.direction,
                trade.position_size,
                trade.entry_price
            );
        }
    }

    // Performance summary
    let stats = reporter.stats(&filter).await?;
    log::info!("=== Performance ===");
    log::info!(
        "Records: {} ({} wins / {} losses / {} breakeven)",
        stats.total_simulations,
        stats.wins,
        stats.losses,
        stats.breakeven
    );
    match stats.win_rate {
        Some(rate) => log::info!("Win rate: {}%", (rate * rust_decimal::Decimal::from(100)).round_dp(1)),
        None => log::info!("Win rate: n/a"),
    }
    match stats.profit_factor {
        Some(pf) => log::info!("Profit factor: {}", pf.round_dp(2)),
        None => log::info!("Profit factor: n/a"),
    }
    log::info!(
        "Gross profit: {} | Gross loss: {} | Avg win: {} | Avg loss: {}",
        stats.total_profit.round_dp(2),
        stats.total_loss.round_dp(2),
        stats.avg_win.round_dp(2),
        stats.avg_loss.round_dp(2)
    );

    // Equity curve endpoint
    let curve = reporter.equity_curve(&filter).await?;
    if let Some(last) = curve.last() {
        log::info!(
            "Equity after {} closed records: {}",
            last.sequence,
            last.equity.round_dp(2)
        );
    }

    // Per-market breakdown
    let markets = reporter.profit_by_market(&filter).await?;
    if !markets.is_empty() {
        log::info!("=== By Market ===");
        for (market, pnl) in &markets {
            log::info!(
                "{}: +{} / -{}",
                market,
                pnl.profit.round_dp(2),
                pnl.loss.round_dp(2)
            );
        }
    }

    log::info!("Report complete");
    Ok(())
}
