//! Environment-driven configuration
//!
//! Every knob has a default so a checkout with the stat files in place runs
//! with no `.env` at all.

use crate::engine::DEFAULT_MODEL_CONFIDENCE;
use crate::stats::TableSources;
use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub win_stats_path: PathBuf,
    pub leverage_path: PathBuf,
    pub run_expectancy_path: PathBuf,
    pub starting_bankroll: f64,
    pub model_confidence: f64,
    pub odds_poll_interval: Duration,
    pub paper_trading: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self {
            win_stats_path: env_or("WIN_STATS_PATH", "./statswithballsstrikes").into(),
            leverage_path: env_or("LEVERAGE_PATH", "./leverage").into(),
            run_expectancy_path: env_or(
                "RUN_EXPECTANCY_PATH",
                "./runsperinningballsstrikesstats",
            )
            .into(),
            starting_bankroll: parse_env("STARTING_BANKROLL", 100.0)?,
            model_confidence: parse_env("MODEL_CONFIDENCE", DEFAULT_MODEL_CONFIDENCE)?,
            odds_poll_interval: Duration::from_secs(parse_env(
                "ODDS_POLL_INTERVAL_SECONDS",
                7u64,
            )?),
            paper_trading: parse_env("PAPER_TRADING", true)?,
        }
        .validate()
    }

    fn validate(self) -> Result<Self> {
        if !(0.0..=1.0).contains(&self.model_confidence) {
            bail!(
                "MODEL_CONFIDENCE must be within [0, 1], got {}",
                self.model_confidence
            );
        }
        if self.starting_bankroll <= 0.0 {
            bail!(
                "STARTING_BANKROLL must be positive, got {}",
                self.starting_bankroll
            );
        }
        Ok(self)
    }

    pub fn table_sources(&self) -> TableSources {
        TableSources {
            win_stats: self.win_stats_path.clone(),
            leverage: self.leverage_path.clone(),
            run_expectancy: self.run_expectancy_path.clone(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow!("invalid {key} value {raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            win_stats_path: PathBuf::from("./statswithballsstrikes"),
            leverage_path: PathBuf::from("./leverage"),
            run_expectancy_path: PathBuf::from("./runsperinningballsstrikesstats"),
            starting_bankroll: 100.0,
            model_confidence: 0.25,
            odds_poll_interval: Duration::from_secs(7),
            paper_trading: true,
        }
    }

    #[test]
    fn validation_bounds_confidence_and_bankroll() {
        assert!(base_config().validate().is_ok());

        let mut config = base_config();
        config.model_confidence = 1.5;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.starting_bankroll = 0.0;
        assert!(config.validate().is_err());
    }
}
