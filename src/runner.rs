//! Session orchestration
//!
//! One task owns the engine and consumes game states from a channel, so
//! evaluations are strictly serialized: fetch quote, evaluate, mirror the
//! decisions to the executor, then take the next state. The sportsbook odds
//! poller runs as its own cancelable task and never touches the engine.

use crate::engine::{DecisionEngine, EngineError};
use crate::exchange::{order_for_decision, MarketQuoteAdapter, TradeExecutor};
use crate::feed::{OddsFeedAdapter, ReplayRecord};
use crate::odds::{expected_margin, DEFAULT_MARGIN_STD_DEV};
use crate::types::{GameState, Position};
use anyhow::Result;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// End-of-session accounting
#[derive(Debug, Clone, Copy)]
pub struct SessionSummary {
    pub bankroll: f64,
    pub position: Position,
    pub cycles: usize,
    pub trades: usize,
}

/// Drive the engine over a live game-state stream until the feed closes or
/// shutdown is signaled. A cycle that fails (quote fetch, lookup miss,
/// malformed state) is logged and skipped; the next state starts clean.
pub async fn run_session<Q, E>(
    mut engine: DecisionEngine,
    quotes: &Q,
    executor: &E,
    event_ticker: &str,
    home_market_ticker: &str,
    mut states: mpsc::Receiver<GameState>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<SessionSummary>
where
    Q: MarketQuoteAdapter,
    E: TradeExecutor,
{
    let mut cycles = 0usize;
    let mut trades = 0usize;

    loop {
        let state = tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Shutdown signaled, ending session");
                    break;
                }
                continue;
            }
            maybe = states.recv() => match maybe {
                Some(state) => state,
                None => {
                    info!("Game-state feed closed, ending session");
                    break;
                }
            },
        };

        cycles += 1;
        let quote = match quotes.quote(event_ticker).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!("{}", EngineError::QuoteFetch(format!("{e:#}")));
                continue;
            }
        };

        let evaluation = match engine.evaluate(&state, &quote) {
            Ok(evaluation) => evaluation,
            Err(e) => {
                warn!("Cycle skipped: {e}");
                continue;
            }
        };
        if let Some(runs) = evaluation.expected_runs {
            debug!("Expected runs rest of inning: {:.2}", runs);
        }

        for decision in &evaluation.decisions {
            let order = order_for_decision(decision, home_market_ticker);
            match executor.place_order(&order).await {
                Ok(receipt) => {
                    trades += 1;
                    debug!("Order {} accepted", receipt.order_id);
                }
                Err(e) => {
                    // The engine already booked the leg; surface the
                    // divergence loudly.
                    warn!("{}", EngineError::Execution(format!("{e:#}")));
                }
            }
        }
    }

    let summary = SessionSummary {
        bankroll: engine.bankroll(),
        position: engine.position(),
        cycles,
        trades,
    };
    info!(
        "Session over: bankroll ${:.2}, position {:?} after {} cycles / {} trades",
        summary.bankroll, summary.position, summary.cycles, summary.trades
    );
    Ok(summary)
}

/// Replay a recorded transcript through a fresh engine, synchronously.
pub fn replay_session(mut engine: DecisionEngine, records: &[ReplayRecord]) -> SessionSummary {
    let mut cycles = 0usize;
    let mut trades = 0usize;
    for record in records {
        cycles += 1;
        match engine.evaluate(&record.game_state, &record.quote) {
            Ok(evaluation) => {
                if let Some(runs) = evaluation.expected_runs {
                    debug!("Expected runs rest of inning: {:.2}", runs);
                }
                for decision in &evaluation.decisions {
                    trades += 1;
                    info!(
                        "{}: {} contracts at ${:.2}, bankroll ${:.2}",
                        decision.action,
                        decision.contracts,
                        decision.price,
                        decision.resulting_bankroll
                    );
                }
            }
            Err(e) => warn!("Cycle skipped: {e}"),
        }
    }
    SessionSummary {
        bankroll: engine.bankroll(),
        position: engine.position(),
        cycles,
        trades,
    }
}

/// Poll the sportsbook line on a fixed cadence and log the implied run
/// margin. Independent of the evaluation loop; cancels on shutdown.
pub async fn poll_odds<F>(feed: &F, interval: Duration, mut shutdown: watch::Receiver<bool>)
where
    F: OddsFeedAdapter,
{
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                match feed.snapshot().await {
                    Ok(Some(line)) => {
                        let margin = expected_margin(
                            line.home_spread,
                            line.away_spread,
                            line.home_odds,
                            line.away_odds,
                            DEFAULT_MARGIN_STD_DEV,
                        );
                        info!(
                            "Sportsbook line {:+}/{:+} ({}/{}): expected away margin {:.2}",
                            line.home_spread,
                            line.away_spread,
                            line.home_odds,
                            line.away_odds,
                            margin
                        );
                    }
                    Ok(None) => debug!("No sportsbook line posted"),
                    Err(e) => warn!("Odds poll failed: {e:#}"),
                }
            }
        }
    }
}
