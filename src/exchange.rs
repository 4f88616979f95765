//! Narrow interfaces to the exchange
//!
//! The live exchange client (auth, quote retrieval, order placement) is an
//! external collaborator; the engine only ever sees these traits. Paper
//! implementations live here for replay and testing.

use crate::types::{Decision, EventQuote, TradeAction};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Which contract of a binary market an order trades
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractSide {
    Yes,
    No,
}

impl fmt::Display for ContractSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractSide::Yes => write!(f, "yes"),
            ContractSide::No => write!(f, "no"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Buy,
    Sell,
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderAction::Buy => write!(f, "buy"),
            OrderAction::Sell => write!(f, "sell"),
        }
    }
}

/// Only market orders are placed by this strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Market,
}

/// An order to mirror one engine decision at the exchange.
/// `count` is always explicit; there is no implicit position default.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub ticker: String,
    pub side: ContractSide,
    pub action: OrderAction,
    pub order_type: OrderType,
    pub count: u32,
}

#[derive(Debug, Clone)]
pub struct OrderReceipt {
    pub order_id: String,
}

/// Read-only quote source for one game event. Implementations must be
/// idempotent and side-effect-free.
pub trait MarketQuoteAdapter {
    fn quote(
        &self,
        event_ticker: &str,
    ) -> impl std::future::Future<Output = Result<EventQuote>> + Send;
}

/// Order sink. Failures propagate to the caller as errors.
pub trait TradeExecutor {
    fn place_order(
        &self,
        order: &OrderRequest,
    ) -> impl std::future::Future<Output = Result<OrderReceipt>> + Send;
}

/// Quote adapter that always returns the same snapshot (paper sessions).
#[derive(Debug, Clone)]
pub struct FixedQuoteAdapter {
    quote: EventQuote,
}

impl FixedQuoteAdapter {
    pub fn new(quote: EventQuote) -> Self {
        Self { quote }
    }
}

impl MarketQuoteAdapter for FixedQuoteAdapter {
    async fn quote(&self, _event_ticker: &str) -> Result<EventQuote> {
        Ok(self.quote)
    }
}

/// Executor that records fills in the log instead of hitting the exchange.
#[derive(Debug, Default)]
pub struct PaperExecutor {
    next_id: AtomicU64,
}

impl PaperExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TradeExecutor for PaperExecutor {
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let order_id = format!("paper-{id}");
        info!(
            "[Paper] {} {} x{} on {} ({})",
            order.action, order.side, order.count, order.ticker, order_id
        );
        Ok(OrderReceipt { order_id })
    }
}

/// Build the event ticker for today's game, e.g. `KXMLBGAME-25AUG29BOSNYY`.
pub fn event_ticker_today(away: &str, home: &str) -> String {
    event_ticker(away, home, Utc::now().date_naive())
}

pub fn event_ticker(away: &str, home: &str, date: NaiveDate) -> String {
    format!("KXMLBGAME-{}{}{}", date.format("%y%b%d"), away, home).to_uppercase()
}

/// Market ticker for one team's side of the event.
pub fn market_ticker(event_ticker: &str, team: &str) -> String {
    format!("{}-{}", event_ticker, team.to_uppercase())
}

/// Translate an engine decision into the order that mirrors it.
///
/// Both away legs trade the `no` side of the home market, matching how the
/// engine prices them.
pub fn order_for_decision(decision: &Decision, home_market_ticker: &str) -> OrderRequest {
    let (side, action) = match decision.action {
        TradeAction::BuyHome => (ContractSide::Yes, OrderAction::Buy),
        TradeAction::SellHome => (ContractSide::Yes, OrderAction::Sell),
        TradeAction::BuyAway => (ContractSide::No, OrderAction::Buy),
        TradeAction::SellAway => (ContractSide::No, OrderAction::Sell),
    };
    OrderRequest {
        ticker: home_market_ticker.to_string(),
        side,
        action,
        order_type: OrderType::Market,
        count: decision.contracts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ticker_format() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();
        assert_eq!(event_ticker("BOS", "NYY", date), "KXMLBGAME-25AUG29BOSNYY");
        assert_eq!(
            market_ticker("KXMLBGAME-25AUG29BOSNYY", "nyy"),
            "KXMLBGAME-25AUG29BOSNYY-NYY"
        );
    }

    #[test]
    fn decisions_map_to_explicit_orders() {
        let decision = Decision {
            action: TradeAction::SellAway,
            contracts: 7,
            price: 0.10,
            resulting_bankroll: 42.0,
        };
        let order = order_for_decision(&decision, "KXMLBGAME-25AUG29BOSNYY-NYY");
        assert_eq!(order.side, ContractSide::No);
        assert_eq!(order.action, OrderAction::Sell);
        assert_eq!(order.count, 7);
        assert_eq!(order.order_type, OrderType::Market);
    }
}
