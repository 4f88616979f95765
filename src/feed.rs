//! Inbound data feeds
//!
//! Game-state snapshots arrive as JSON lines (stdin in live mode, a file in
//! replay mode). Sportsbook odds arrive through their own adapter and are
//! polled on an independent cadence.

use crate::types::{EventQuote, GameState};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Parse one feed line into a game-state snapshot.
pub fn parse_game_state(line: &str) -> Result<GameState> {
    serde_json::from_str(line).with_context(|| format!("bad game state line: {line}"))
}

/// Read game-state lines from stdin and push them onto the evaluation
/// channel. Malformed lines are logged and skipped; the feed only stops
/// when stdin closes or the consumer goes away.
pub async fn stdin_feed(tx: mpsc::Sender<GameState>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_game_state(line) {
            Ok(state) => {
                debug!("Feed: {:?}", state);
                if tx.send(state).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("{e:#}"),
        }
    }
    Ok(())
}

/// One recorded evaluation cycle: the game state and the quote snapshot
/// that was live when it arrived.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayRecord {
    pub game_state: GameState,
    pub quote: EventQuote,
}

/// Parse a replay transcript (JSON lines). Bad lines are skipped with a
/// warning so a partially corrupt transcript still replays.
pub fn parse_replay(content: &str) -> Vec<ReplayRecord> {
    let mut records = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ReplayRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping bad replay line: {line} ({e})"),
        }
    }
    records
}

pub fn read_replay(path: &Path) -> Result<Vec<ReplayRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read replay file {}", path.display()))?;
    Ok(parse_replay(&content))
}

/// One sportsbook line for the game: spreads plus American odds per side.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsSnapshot {
    pub home_spread: f64,
    pub away_spread: f64,
    pub home_odds: f64,
    pub away_odds: f64,
}

/// Sportsbook odds source. `None` means no line is currently posted.
pub trait OddsFeedAdapter {
    fn snapshot(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<OddsSnapshot>>> + Send;
}

/// Odds feed pinned to one line (paper sessions, tests).
#[derive(Debug, Clone)]
pub struct FixedOddsFeed {
    snapshot: Option<OddsSnapshot>,
}

impl FixedOddsFeed {
    pub fn new(snapshot: Option<OddsSnapshot>) -> Self {
        Self { snapshot }
    }
}

impl OddsFeedAdapter for FixedOddsFeed {
    async fn snapshot(&self) -> Result<Option<OddsSnapshot>> {
        Ok(self.snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_state_lines_parse() {
        let line = r#"{"inning":5,"isTop":true,"outs":1,"bases":[1,1,0],
            "homeScores":2,"awayScores":3,"balls":3,"strikes":2}"#;
        let state = parse_game_state(line).unwrap();
        assert_eq!(state.inning, 5);
        assert_eq!(state.bases, [1, 1, 0]);
        assert!(parse_game_state("not json").is_err());
        assert!(parse_game_state(r#"{"inning":5}"#).is_err());
    }

    #[test]
    fn replay_skips_bad_lines() {
        let content = r#"
            {"gameState":{"inning":9,"isTop":false,"outs":2,"bases":[0,0,0],"homeScores":3,"awayScores":8,"balls":0,"strikes":0},"quote":{"home":{"yes_bid":25,"yes_ask":30,"no_bid":70,"no_ask":75},"away":{"yes_bid":70,"yes_ask":75,"no_bid":25,"no_ask":30}}}
            this line is garbage
            {"gameState":{"inning":1,"isTop":true,"outs":0,"bases":[0,0,0],"homeScores":0,"awayScores":0,"balls":0,"strikes":0},"quote":{"home":{"yes_bid":48,"yes_ask":52,"no_bid":48,"no_ask":52},"away":{"yes_bid":48,"yes_ask":52,"no_bid":48,"no_ask":52}}}
        "#;
        let records = parse_replay(content);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].game_state.inning, 9);
        assert_eq!(records[0].quote.home.yes_ask, 30);
        assert_eq!(records[1].game_state.inning, 1);
    }
}
