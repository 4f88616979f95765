//! Kalshi MLB In-Game Bot Library
//!
//! A live trading engine for Kalshi MLB game-winner markets. Every pitch of
//! a tracked game is mapped onto a historical win-probability table built
//! from play-by-play data; when the table's estimate diverges far enough
//! from the quoted market, the bot opens or liquidates a Kelly-sized
//! position:
//!
//! 1. **Entry**: buy a side when its historical win probability clears the
//!    ask plus the full spread and a fixed slippage buffer.
//! 2. **Exit**: liquidate a side the moment its probability falls through
//!    the bid.
//!
//! Sizing is fractional Kelly, discounted early in the game and in
//! high-leverage moments, scaled by overall model confidence.

pub mod config;
pub mod engine;
pub mod exchange;
pub mod feed;
pub mod odds;
pub mod runner;
pub mod sizing;
pub mod stats;
pub mod types;

pub use config::Config;
pub use engine::{DecisionEngine, EngineError, Evaluation};
pub use exchange::{
    event_ticker, event_ticker_today, market_ticker, FixedQuoteAdapter, MarketQuoteAdapter,
    OrderReceipt, OrderRequest, PaperExecutor, TradeExecutor,
};
pub use feed::{FixedOddsFeed, OddsFeedAdapter, OddsSnapshot, ReplayRecord};
pub use runner::{poll_odds, replay_session, run_session, SessionSummary};
pub use stats::{build_combined_table, CombinedTable, LoadReport, TableError, TableSources};
pub use types::{Decision, EventQuote, GameState, MarketQuote, Position, Side, TradeAction};
