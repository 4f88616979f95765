//! Per-game-state decision engine
//!
//! One evaluation consumes a game-state snapshot plus a fresh quote and
//! decides, independently for the home (yes) and away (no) markets, whether
//! to open or liquidate a position. Bankroll and held contracts live on the
//! engine and are mutated atomically per leg: a debit that would drive the
//! bankroll negative is reverted in full and the leg does not count.

use crate::sizing::{dynamic_kelly_fraction, kelly_stake};
use crate::stats::CombinedTable;
use crate::types::{
    Decision, EventQuote, GameState, GameStateError, Position, Side, StateKey, TradeAction,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fixed slippage buffer added on top of the full bid/ask spread when
/// computing the conservative buy price, in cents. Empirically tuned.
pub const SLIPPAGE_BUFFER_CENTS: i64 = 4;

/// Fixed execution buffer added to the ask when converting a dollar stake
/// into contracts, in dollars per contract. Empirically tuned.
pub const EXECUTION_BUFFER: f64 = 0.02;

/// Default trust in the historical model; scales the Kelly fraction.
pub const DEFAULT_MODEL_CONFIDENCE: f64 = 0.25;

/// Leverage assumed when the table has no entry for the state; 1.0 is the
/// league-average moment, which applies no discount.
const AVERAGE_LEVERAGE: f64 = 1.0;

/// Evaluation-time failures, one kind per recoverable condition.
/// None of these may corrupt table state, bankroll, or position.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no probability entry for state ({0})")]
    LookupMiss(StateKey),
    #[error("quote fetch failed: {0}")]
    QuoteFetch(String),
    #[error("insufficient bankroll: trade needs ${needed:.2}, have ${available:.2}")]
    InsufficientBankroll { needed: f64, available: f64 },
    #[error("malformed game state: {0}")]
    MalformedState(#[from] GameStateError),
    #[error("order execution failed: {0}")]
    Execution(String),
}

/// A trade leg that was considered but rejected, with the reason.
#[derive(Debug)]
pub struct SkippedLeg {
    pub action: TradeAction,
    pub error: EngineError,
}

/// Outcome of one engine invocation. `decisions` is empty on a hold cycle.
#[derive(Debug)]
pub struct Evaluation {
    pub key: StateKey,
    pub win_probability: f64,
    pub leverage_index: Option<f64>,
    pub expected_runs: Option<f64>,
    pub decisions: Vec<Decision>,
    pub skipped: Vec<SkippedLeg>,
}

/// The trading session: lookup table plus the only cross-call state
/// (bankroll and held contracts). No process-wide globals; callers own the
/// engine and pass it to each evaluation.
pub struct DecisionEngine {
    table: Arc<CombinedTable>,
    bankroll: f64,
    position: Position,
    model_confidence: f64,
}

impl DecisionEngine {
    pub fn new(table: Arc<CombinedTable>, starting_bankroll: f64, model_confidence: f64) -> Self {
        Self {
            table,
            bankroll: starting_bankroll,
            position: Position::default(),
            model_confidence,
        }
    }

    pub fn bankroll(&self) -> f64 {
        self.bankroll
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Evaluate one game-state snapshot against a quote snapshot.
    ///
    /// The home (yes) and away (no) legs are decided independently; a
    /// single snapshot can therefore produce up to two trades. Within a
    /// leg, buying and selling are mutually exclusive.
    pub fn evaluate(
        &mut self,
        state: &GameState,
        quote: &EventQuote,
    ) -> Result<Evaluation, EngineError> {
        state.validate()?;
        let key = state.state_key();

        let entry = self
            .table
            .lookup(&key)
            .ok_or(EngineError::LookupMiss(key))?;
        let win_probability = entry
            .win_probability
            .ok_or(EngineError::LookupMiss(key))?;
        let leverage = entry.leverage_index.unwrap_or(AVERAGE_LEVERAGE);

        let mut evaluation = Evaluation {
            key,
            win_probability,
            leverage_index: entry.leverage_index,
            expected_runs: entry.expected_runs,
            decisions: Vec::new(),
            skipped: Vec::new(),
        };

        debug!(
            "Evaluating {}: win prob {:.3}, leverage {:.2}",
            key, win_probability, leverage
        );

        // Home leg trades the yes side of the home market; the away leg
        // mirrors it on the no side with the complement probability.
        let market = quote.home;
        self.evaluate_leg(
            &mut evaluation,
            Side::Home,
            win_probability,
            state.inning,
            leverage,
            market.yes_ask,
            market.yes_bid,
        );
        self.evaluate_leg(
            &mut evaluation,
            Side::Away,
            1.0 - win_probability,
            state.inning,
            leverage,
            market.no_ask,
            market.no_bid,
        );

        Ok(evaluation)
    }

    /// Decide one leg. All bankroll/position reads and writes for the leg
    /// happen inside this call, so the mutation applies in full or not at
    /// all.
    fn evaluate_leg(
        &mut self,
        evaluation: &mut Evaluation,
        side: Side,
        fair: f64,
        inning: u8,
        leverage: f64,
        ask_cents: u32,
        bid_cents: u32,
    ) {
        // Conservative entry price: ask inflated by the full spread plus
        // the fixed slippage buffer.
        let spread = ask_cents as i64 - bid_cents as i64;
        let adjusted_price = (ask_cents as i64 + spread + SLIPPAGE_BUFFER_CENTS) as f64 / 100.0;
        let bid_price = bid_cents as f64 / 100.0;
        let held = match side {
            Side::Home => self.position.home_contracts,
            Side::Away => self.position.away_contracts,
        };

        if fair > adjusted_price {
            let fraction = dynamic_kelly_fraction(fair, inning, leverage, self.model_confidence);
            let unit_cost = ask_cents as f64 / 100.0 + EXECUTION_BUFFER;
            let stake = kelly_stake(fair, unit_cost, self.bankroll, fraction).stake;
            let contracts = (stake / unit_cost).round() as u32;
            if contracts == 0 {
                debug!("{} edge present but stake rounds to zero contracts", side);
                return;
            }

            let action = match side {
                Side::Home => TradeAction::BuyHome,
                Side::Away => TradeAction::BuyAway,
            };
            let cost = contracts as f64 * unit_cost;

            self.bankroll -= cost;
            if self.bankroll < 0.0 {
                // Revert the debit in full; the leg does not count.
                self.bankroll += cost;
                warn!(
                    "{} rejected: needs ${:.2}, bankroll ${:.2}",
                    action, cost, self.bankroll
                );
                evaluation.skipped.push(SkippedLeg {
                    action,
                    error: EngineError::InsufficientBankroll {
                        needed: cost,
                        available: self.bankroll,
                    },
                });
                return;
            }

            match side {
                Side::Home => self.position.home_contracts += contracts,
                Side::Away => self.position.away_contracts += contracts,
            }
            info!(
                "{}: {} contracts at ${:.2} (fair {:.3} > adjusted {:.3}), bankroll ${:.2}",
                action, contracts, unit_cost, fair, adjusted_price, self.bankroll
            );
            evaluation.decisions.push(Decision {
                action,
                contracts,
                price: unit_cost,
                resulting_bankroll: self.bankroll,
            });
        } else if held > 0 && fair < bid_price {
            // Fair value fell through the bid: liquidate the whole side.
            let action = match side {
                Side::Home => TradeAction::SellHome,
                Side::Away => TradeAction::SellAway,
            };
            self.bankroll += held as f64 * bid_price;
            match side {
                Side::Home => self.position.home_contracts = 0,
                Side::Away => self.position.away_contracts = 0,
            }
            info!(
                "{}: {} contracts at ${:.2} (fair {:.3} < bid), bankroll ${:.2}",
                action, held, bid_price, fair, self.bankroll
            );
            evaluation.decisions.push(Decision {
                action,
                contracts: held,
                price: bid_price,
                resulting_bankroll: self.bankroll,
            });
        }
    }
}
