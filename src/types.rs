//! Core types for the in-game betting engine

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Innings above this collapse onto one bucket in the historical table;
/// extra innings are statistically indistinguishable from the 10th.
pub const MAX_TABLE_INNING: u8 = 10;

/// Which team a record or market refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Away,
    Home,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Away => write!(f, "AWAY"),
            Side::Home => write!(f, "HOME"),
        }
    }
}

/// Base occupancy (first/second/third)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bases {
    pub first: bool,
    pub second: bool,
    pub third: bool,
}

impl Bases {
    pub fn new(first: bool, second: bool, third: bool) -> Self {
        Self { first, second, third }
    }

    pub fn empty() -> Self {
        Self::new(false, false, false)
    }

    /// Decode the 1-8 occupancy code used by the leverage source.
    pub fn from_code(code: u8) -> Option<Self> {
        let bases = match code {
            1 => Self::new(false, false, false),
            2 => Self::new(true, false, false),
            3 => Self::new(false, true, false),
            4 => Self::new(true, true, false),
            5 => Self::new(false, false, true),
            6 => Self::new(true, false, true),
            7 => Self::new(false, true, true),
            8 => Self::new(true, true, true),
            _ => return None,
        };
        Some(bases)
    }
}

impl fmt::Display for Bases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{},{})",
            self.first as u8, self.second as u8, self.third as u8
        )
    }
}

/// The balls/strikes count of an at-bat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Count {
    pub balls: u8,
    pub strikes: u8,
}

impl Count {
    pub fn new(balls: u8, strikes: u8) -> Self {
        Self { balls, strikes }
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.balls, self.strikes)
    }
}

/// Composite key into the combined historical table.
///
/// One flat key instead of a six-level nested map. `score_diff` is home
/// minus away; away-perspective source records are normalized at load time
/// so both batting sides share this convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateKey {
    /// Capped at [`MAX_TABLE_INNING`]
    pub inning: u8,
    /// Team currently batting
    pub batting_side: Side,
    pub outs: u8,
    pub bases: Bases,
    pub score_diff: i32,
    pub count: Count,
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inning {} {} batting, {} out, bases {}, diff {:+}, count {}",
            self.inning, self.batting_side, self.outs, self.bases, self.score_diff, self.count
        )
    }
}

/// A live game-state snapshot as pushed by the scoreboard feed.
///
/// Transient; one per engine invocation. The feed sends raw JSON with
/// `isTop`/`homeScores`/`awayScores` naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub inning: u8,
    pub is_top: bool,
    pub outs: u8,
    /// First/second/third occupancy as 0/1 indicators
    pub bases: [u8; 3],
    pub home_scores: u32,
    pub away_scores: u32,
    pub balls: u8,
    pub strikes: u8,
}

impl GameState {
    /// The bottom half of an inning means the home team bats.
    pub fn batting_side(&self) -> Side {
        if self.is_top {
            Side::Away
        } else {
            Side::Home
        }
    }

    pub fn score_diff(&self) -> i32 {
        self.home_scores as i32 - self.away_scores as i32
    }

    /// Reject snapshots that cannot describe a real game state.
    pub fn validate(&self) -> Result<(), GameStateError> {
        if self.inning < 1 {
            return Err(GameStateError::InvalidInning(self.inning));
        }
        if self.outs > 2 {
            return Err(GameStateError::InvalidOuts(self.outs));
        }
        if self.balls > 3 {
            return Err(GameStateError::InvalidBalls(self.balls));
        }
        if self.strikes > 2 {
            return Err(GameStateError::InvalidStrikes(self.strikes));
        }
        if self.bases.iter().any(|&b| b > 1) {
            return Err(GameStateError::InvalidBases(self.bases));
        }
        Ok(())
    }

    /// Table key for this snapshot, with the extra-inning cap applied.
    pub fn state_key(&self) -> StateKey {
        StateKey {
            inning: self.inning.min(MAX_TABLE_INNING),
            batting_side: self.batting_side(),
            outs: self.outs,
            bases: Bases::new(self.bases[0] == 1, self.bases[1] == 1, self.bases[2] == 1),
            score_diff: self.score_diff(),
            count: Count::new(self.balls, self.strikes),
        }
    }
}

/// Malformed inbound game state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameStateError {
    #[error("inning must be at least 1, got {0}")]
    InvalidInning(u8),
    #[error("outs must be 0-2, got {0}")]
    InvalidOuts(u8),
    #[error("balls must be 0-3, got {0}")]
    InvalidBalls(u8),
    #[error("strikes must be 0-2, got {0}")]
    InvalidStrikes(u8),
    #[error("base indicators must be 0 or 1, got {0:?}")]
    InvalidBases([u8; 3]),
}

/// One side of a binary market, quoted in cents (0-100)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarketQuote {
    pub yes_bid: u32,
    pub yes_ask: u32,
    pub no_bid: u32,
    pub no_ask: u32,
}

/// Quote snapshot for one game event: markets[0] = home, markets[1] = away.
/// The two yes sides are complementary in intent but not guaranteed to sum
/// to 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EventQuote {
    pub home: MarketQuote,
    pub away: MarketQuote,
}

/// Contracts currently held, one count per side. Mutated only by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub home_contracts: u32,
    pub away_contracts: u32,
}

impl Position {
    pub fn is_flat(&self) -> bool {
        self.home_contracts == 0 && self.away_contracts == 0
    }
}

/// Trade direction chosen for one leg of an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    BuyHome,
    SellHome,
    BuyAway,
    SellAway,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::BuyHome => write!(f, "buy_home"),
            TradeAction::SellHome => write!(f, "sell_home"),
            TradeAction::BuyAway => write!(f, "buy_away"),
            TradeAction::SellAway => write!(f, "sell_away"),
        }
    }
}

/// Per-evaluation decision record, suitable for logging/telemetry
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub action: TradeAction,
    pub contracts: u32,
    /// Fill price per contract in dollars, buffers included
    pub price: f64,
    pub resulting_bankroll: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bases_code_bijection() {
        // All 8 codes decode to distinct occupancies
        let mut seen = std::collections::HashSet::new();
        for code in 1..=8 {
            let bases = Bases::from_code(code).unwrap();
            assert!(seen.insert(bases));
        }
        assert_eq!(Bases::from_code(4), Some(Bases::new(true, true, false)));
        assert_eq!(Bases::from_code(0), None);
        assert_eq!(Bases::from_code(9), None);
    }

    #[test]
    fn state_key_caps_extra_innings() {
        let state = GameState {
            inning: 14,
            is_top: true,
            outs: 1,
            bases: [1, 0, 0],
            home_scores: 4,
            away_scores: 4,
            balls: 2,
            strikes: 1,
        };
        let key = state.state_key();
        assert_eq!(key.inning, 10);
        assert_eq!(key.batting_side, Side::Away);
        assert_eq!(key.score_diff, 0);
    }

    #[test]
    fn game_state_json_shape() {
        let raw = r#"{"inning":9,"isTop":false,"outs":2,"bases":[0,0,0],
            "homeScores":3,"awayScores":8,"balls":0,"strikes":0}"#;
        let state: GameState = serde_json::from_str(raw).unwrap();
        assert!(state.validate().is_ok());
        assert_eq!(state.batting_side(), Side::Home);
        assert_eq!(state.score_diff(), -5);
    }

    #[test]
    fn validate_rejects_impossible_counts() {
        let mut state = GameState {
            inning: 1,
            is_top: true,
            outs: 0,
            bases: [0, 0, 0],
            home_scores: 0,
            away_scores: 0,
            balls: 0,
            strikes: 0,
        };
        state.balls = 4;
        assert_eq!(state.validate(), Err(GameStateError::InvalidBalls(4)));
        state.balls = 0;
        state.outs = 3;
        assert_eq!(state.validate(), Err(GameStateError::InvalidOuts(3)));
    }
}
