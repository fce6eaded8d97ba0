// src/domain/model/mod.rs
// Core journal entities and the trade lifecycle state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::analysis::{PostAnalysis, PreAnalysis};
use crate::domain::errors::{JournalError, JournalResult};

pub type TradeId = i64;
pub type AccountId = i64;
pub type SimulationId = i64;

/// Instrument recorded when a trade request does not name one.
pub const DEFAULT_INSTRUMENT: &str = "XAUUSD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Long
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TradeStatus::Open => write!(f, "open"),
            TradeStatus::Closed => write!(f, "closed"),
        }
    }
}

/// A journaled trade. Created in `Open` state; transitions exactly once to
/// `Closed`, which is terminal. Invariant: `status == Closed` iff
/// `exit_price`, `exit_date` and `result` are all present.
///
/// Pre/post analysis are held in their persisted blob form (see
/// `domain::analysis`); storage keeps them as text columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub account_id: AccountId,
    pub instrument: String,
    pub entry_price: Decimal,
    pub position_size: Decimal,
    pub direction: Direction,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub entry_date: DateTime<Utc>,
    pub exit_price: Option<Decimal>,
    pub exit_date: Option<DateTime<Utc>>,
    pub result: Option<Decimal>,
    pub status: TradeStatus,
    pub pre_analysis: Option<String>,
    pub post_analysis: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields accepted when opening a trade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTrade {
    pub instrument: Option<String>,
    pub entry_price: Decimal,
    pub position_size: Decimal,
    pub direction: Direction,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub entry_date: Option<DateTime<Utc>>,
    pub pre_analysis: Option<PreAnalysis>,
}

/// Fields accepted when closing a trade. An explicit `result` overrides the
/// computed price-delta P/L, including an explicit zero: a trader may book
/// an outcome that differs from the raw delta (partial fills, fees) and the
/// engine must not overwrite it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloseTrade {
    pub exit_price: Decimal,
    pub exit_date: Option<DateTime<Utc>>,
    pub result: Option<Decimal>,
    pub post_analysis: Option<PostAnalysis>,
}

/// Patchable fields for a still-open trade. Entry fields may be corrected
/// while open; after close no retroactive edits are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradePatch {
    pub instrument: Option<String>,
    pub entry_price: Option<Decimal>,
    pub position_size: Option<Decimal>,
    pub direction: Option<Direction>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub entry_date: Option<DateTime<Utc>>,
}

impl Trade {
    /// Validates and builds a new open trade. The id is assigned by storage
    /// on insert.
    pub fn open(account_id: AccountId, spec: NewTrade) -> JournalResult<Trade> {
        if spec.entry_price <= Decimal::ZERO {
            return Err(JournalError::Validation(format!(
                "entry price must be positive, got {}",
                spec.entry_price
            )));
        }
        if spec.position_size <= Decimal::ZERO {
            return Err(JournalError::Validation(format!(
                "position size must be positive, got {}",
                spec.position_size
            )));
        }

        let now = Utc::now();
        Ok(Trade {
            id: 0,
            account_id,
            instrument: spec
                .instrument
                .unwrap_or_else(|| DEFAULT_INSTRUMENT.to_string()),
            entry_price: spec.entry_price,
            position_size: spec.position_size,
            direction: spec.direction,
            stop_loss: spec.stop_loss,
            take_profit: spec.take_profit,
            entry_date: spec.entry_date.unwrap_or(now),
            exit_price: None,
            exit_date: None,
            result: None,
            status: TradeStatus::Open,
            pre_analysis: spec.pre_analysis.map(|a| a.encode()),
            post_analysis: None,
            created_at: now,
            updated_at: None,
        })
    }

    /// Signed P/L for a given exit price: long profits when price rises,
    /// short when it falls. Full decimal precision; rounding belongs to
    /// presentation.
    pub fn computed_result(&self, exit_price: Decimal) -> Decimal {
        match self.direction {
            Direction::Long => (exit_price - self.entry_price) * self.position_size,
            Direction::Short => (self.entry_price - exit_price) * self.position_size,
        }
    }

    /// Transitions the trade to `Closed`. Rejects a second close with
    /// `InvalidState`; rejects a non-positive exit price or an exit date
    /// preceding the entry date with `Validation`.
    pub fn close(&mut self, req: CloseTrade) -> JournalResult<()> {
        if self.status == TradeStatus::Closed {
            return Err(JournalError::InvalidState(format!(
                "trade {} is already closed",
                self.id
            )));
        }
        if req.exit_price <= Decimal::ZERO {
            return Err(JournalError::Validation(format!(
                "exit price must be positive, got {}",
                req.exit_price
            )));
        }

        let exit_date = req.exit_date.unwrap_or_else(Utc::now);
        if exit_date < self.entry_date {
            return Err(JournalError::Validation(format!(
                "exit date {} precedes entry date {}",
                exit_date, self.entry_date
            )));
        }

        self.result = Some(match req.result {
            Some(explicit) => explicit,
            None => self.computed_result(req.exit_price),
        });
        self.exit_price = Some(req.exit_price);
        self.exit_date = Some(exit_date);
        if let Some(post) = req.post_analysis {
            self.post_analysis = Some(post.encode());
        }
        self.status = TradeStatus::Closed;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Applies edits to a still-open trade. Closed trades are immutable.
    pub fn apply(&mut self, patch: TradePatch) -> JournalResult<()> {
        if self.status == TradeStatus::Closed {
            return Err(JournalError::InvalidState(format!(
                "trade {} is closed and cannot be edited",
                self.id
            )));
        }
        if let Some(price) = patch.entry_price {
            if price <= Decimal::ZERO {
                return Err(JournalError::Validation(format!(
                    "entry price must be positive, got {}",
                    price
                )));
            }
            self.entry_price = price;
        }
        if let Some(size) = patch.position_size {
            if size <= Decimal::ZERO {
                return Err(JournalError::Validation(format!(
                    "position size must be positive, got {}",
                    size
                )));
            }
            self.position_size = size;
        }
        if let Some(instrument) = patch.instrument {
            self.instrument = instrument;
        }
        if let Some(direction) = patch.direction {
            self.direction = direction;
        }
        if let Some(stop_loss) = patch.stop_loss {
            self.stop_loss = Some(stop_loss);
        }
        if let Some(take_profit) = patch.take_profit {
            self.take_profit = Some(take_profit);
        }
        if let Some(entry_date) = patch.entry_date {
            self.entry_date = entry_date;
        }
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    /// Decoded pre-trade analysis; empty record when absent or malformed.
    pub fn decoded_pre_analysis(&self) -> PreAnalysis {
        PreAnalysis::decode(self.pre_analysis.as_deref())
    }

    /// Decoded post-trade analysis; empty record when absent or malformed.
    pub fn decoded_post_analysis(&self) -> PostAnalysis {
        PostAnalysis::decode(self.post_analysis.as_deref())
    }
}

/// Trading account. Balance mutates only through realized P/L application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub account_name: String,
    pub current_balance: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationResult {
    Win,
    Loss,
    Breakeven,
}

/// A practice/backtest record consumed by the aggregator alongside closed
/// trades. Read-only input; never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub id: SimulationId,
    pub market: Option<String>,
    pub simulation_result: Option<SimulationResult>,
    pub profit_loss: Option<Decimal>,
}

/// Win/loss classification of a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Breakeven,
}

/// The aggregator's input row: a trade or simulation reduced to its market
/// label, signed P/L and optional explicit outcome tag.
#[derive(Debug, Clone)]
pub struct OutcomeRecord {
    pub market: Option<String>,
    pub profit_loss: Option<Decimal>,
    pub tag: Option<SimulationResult>,
}

impl OutcomeRecord {
    /// Determined outcome, if any. An explicit tag wins over the P/L sign;
    /// records with neither (still-open trades, unresolved simulations)
    /// yield `None` and are excluded from every statistic.
    pub fn outcome(&self) -> Option<Outcome> {
        if let Some(tag) = self.tag {
            return Some(match tag {
                SimulationResult::Win => Outcome::Win,
                SimulationResult::Loss => Outcome::Loss,
                SimulationResult::Breakeven => Outcome::Breakeven,
            });
        }
        self.profit_loss.map(|pl| {
            if pl > Decimal::ZERO {
                Outcome::Win
            } else if pl < Decimal::ZERO {
                Outcome::Loss
            } else {
                Outcome::Breakeven
            }
        })
    }
}

impl From<&Trade> for OutcomeRecord {
    fn from(trade: &Trade) -> Self {
        // Open trades carry no outcome, whatever their fields claim.
        let profit_loss = match trade.status {
            TradeStatus::Closed => trade.result,
            TradeStatus::Open => None,
        };
        OutcomeRecord {
            market: Some(trade.instrument.clone()),
            profit_loss,
            tag: None,
        }
    }
}

impl From<&Simulation> for OutcomeRecord {
    fn from(sim: &Simulation) -> Self {
        OutcomeRecord {
            market: sim.market.clone(),
            profit_loss: sim.profit_loss,
            tag: sim.simulation_result,
        }
    }
}

/// Summary statistics over a record set. `win_rate` and `profit_factor`
/// are `None` when there is nothing to measure, so callers can render
/// "n/a" instead of a misleading zero.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PerformanceStats {
    pub total_simulations: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakeven: usize,
    pub total_profit: Decimal,
    pub total_loss: Decimal,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    pub win_rate: Option<Decimal>,
    pub profit_factor: Option<Decimal>,
}

/// One point on the cumulative equity curve, 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub sequence: usize,
    pub equity: Decimal,
}

/// Gross profit and absolute gross loss for one market.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketPnl {
    pub profit: Decimal,
    pub loss: Decimal,
}

/// Conjunctive trade filter: absent predicates match everything, supplied
/// ones must all hold. `end_date` is inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeFilter {
    pub account_id: Option<AccountId>,
    pub instrument: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl TradeFilter {
    pub fn matches(&self, trade: &Trade) -> bool {
        if let Some(account_id) = self.account_id {
            if trade.account_id != account_id {
                return false;
            }
        }
        if let Some(instrument) = &self.instrument {
            if &trade.instrument != instrument {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if trade.entry_date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if trade.entry_date > end {
                return false;
            }
        }
        true
    }

    /// Simulations carry only a market label, so just the instrument
    /// predicate applies; unlabeled records never match an instrument
    /// filter.
    pub fn matches_simulation(&self, sim: &Simulation) -> bool {
        match (&self.instrument, &sim.market) {
            (Some(wanted), Some(market)) => wanted == market,
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

/// Returns the matching subset as a new vector, preserving input order.
/// Never mutates its input.
pub fn filter_trades(trades: &[Trade], filter: &TradeFilter) -> Vec<Trade> {
    trades
        .iter()
        .filter(|t| filter.matches(t))
        .cloned()
        .collect()
}
