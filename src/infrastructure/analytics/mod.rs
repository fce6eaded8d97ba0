// src/infrastructure/analytics/mod.rs
// Stateless reduction of trade/simulation records into performance views.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::domain::model::{EquityPoint, MarketPnl, Outcome, OutcomeRecord, PerformanceStats};

/// Market label for records that carry none.
pub const UNKNOWN_MARKET: &str = "Unknown";

/// Pure calculator over outcome records. Every view is recomputed fresh
/// from its input; nothing is cached and the input is never mutated, so
/// calls are freely parallelizable.
#[derive(Debug, Default)]
pub struct PerformanceAnalytics;

impl PerformanceAnalytics {
    pub fn new() -> Self {
        Self
    }

    /// Summary statistics. Only records with a determined outcome count;
    /// breakeven records are tallied separately and belong to neither wins
    /// nor losses. Ratio denominators are guarded so an empty side yields a
    /// number (or `None` on an empty set) instead of a division error.
    pub fn compute_stats(&self, records: &[OutcomeRecord]) -> PerformanceStats {
        let mut stats = PerformanceStats::default();

        for record in records {
            let outcome = match record.outcome() {
                Some(outcome) => outcome,
                None => continue,
            };

            stats.total_simulations += 1;
            match outcome {
                Outcome::Win => stats.wins += 1,
                Outcome::Loss => stats.losses += 1,
                Outcome::Breakeven => stats.breakeven += 1,
            }

            // Gross profit/loss accumulate by sign of the realized value,
            // independent of the win/loss tag.
            if let Some(pl) = record.profit_loss {
                if pl > Decimal::ZERO {
                    stats.total_profit += pl;
                } else if pl < Decimal::ZERO {
                    stats.total_loss += pl.abs();
                }
            }
        }

        stats.avg_win = stats.total_profit / Decimal::from(stats.wins.max(1));
        stats.avg_loss = stats.total_loss / Decimal::from(stats.losses.max(1));

        if stats.total_simulations > 0 {
            stats.win_rate =
                Some(Decimal::from(stats.wins) / Decimal::from(stats.total_simulations));
            stats.profit_factor =
                Some(stats.total_profit / stats.total_loss.max(Decimal::ONE));
        }

        stats
    }

    /// Cumulative running sum of realized results in input order. Records
    /// without a determined outcome are skipped; a determined record with
    /// no priced result contributes zero but still advances the sequence.
    pub fn equity_curve(&self, records: &[OutcomeRecord]) -> Vec<EquityPoint> {
        let mut curve = Vec::new();
        let mut running = Decimal::ZERO;

        for record in records {
            if record.outcome().is_none() {
                continue;
            }
            running += record.profit_loss.unwrap_or(Decimal::ZERO);
            curve.push(EquityPoint {
                sequence: curve.len() + 1,
                equity: running,
            });
        }

        curve
    }

    /// Gross profit and absolute gross loss per market label. Unlabeled
    /// records group under `"Unknown"`; unpriced records are skipped. The
    /// reduction is commutative, so any permutation of the input produces
    /// the same map.
    pub fn profit_by_market(&self, records: &[OutcomeRecord]) -> BTreeMap<String, MarketPnl> {
        let mut markets: BTreeMap<String, MarketPnl> = BTreeMap::new();

        for record in records {
            let pl = match record.profit_loss {
                Some(pl) => pl,
                None => continue,
            };

            let label = record
                .market
                .clone()
                .unwrap_or_else(|| UNKNOWN_MARKET.to_string());
            let entry = markets.entry(label).or_default();

            if pl > Decimal::ZERO {
                entry.profit += pl;
            } else if pl < Decimal::ZERO {
                entry.loss += pl.abs();
            }
        }

        markets
    }
}
