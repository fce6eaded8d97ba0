// src/domain/mod.rs
pub mod analysis;
pub mod errors;
pub mod model;
pub mod repository;

// Re-export common types for convenience
pub use analysis::{DailyTrend, PostAnalysis, PreAnalysis, VolumeTime};
pub use errors::{JournalError, JournalResult};
pub use model::{
    Account, AccountId, CloseTrade, Direction, EquityPoint, MarketPnl, NewTrade, Outcome,
    OutcomeRecord, PerformanceStats, Simulation, SimulationResult, Trade, TradeFilter, TradeId,
    TradePatch, TradeStatus,
};
