// src/application/usecase/mod.rs
pub mod analytics_usecase;
pub mod trade_usecase;

// Re-export public API
pub use analytics_usecase::{PerformanceReportUseCase, PerformanceReporter};
pub use trade_usecase::{TradeLifecycle, TradeLifecycleUseCase};
