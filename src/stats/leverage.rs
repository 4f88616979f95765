//! Leverage-index source
//!
//! Comma-separated records:
//!
//! ```text
//! "H"|other, inning, outs, basesCode, scoreDiff, leverage
//! ```
//!
//! `basesCode` is the 1-8 occupancy code decoded by [`Bases::from_code`].
//! The home/away sign convention mirrors the win table: away records get
//! their score differential negated. Leverage is keyed without the
//! balls/strikes count.

use super::{load_lines, read_source, SourceReport, TableError};
use crate::types::{Bases, Side, StateKey};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Count-free prefix of [`StateKey`] used by the leverage source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeverageKey {
    pub inning: u8,
    pub batting_side: Side,
    pub outs: u8,
    pub bases: Bases,
    pub score_diff: i32,
}

impl LeverageKey {
    pub fn from_state(key: &StateKey) -> Self {
        Self {
            inning: key.inning,
            batting_side: key.batting_side,
            outs: key.outs,
            bases: key.bases,
            score_diff: key.score_diff,
        }
    }
}

/// Parse one leverage record.
pub(crate) fn parse_line(line: &str) -> Result<(LeverageKey, f64), TableError> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() != 6 {
        return Err(TableError::Malformed(format!(
            "expected 6 comma-separated fields, got {}: {line}",
            parts.len()
        )));
    }

    let batting_side = if parts[0] == "\"H\"" {
        Side::Home
    } else {
        Side::Away
    };
    let inning: u8 = parts[1]
        .parse()
        .map_err(|_| TableError::Malformed(format!("bad inning in: {line}")))?;
    let outs: u8 = parts[2]
        .parse()
        .map_err(|_| TableError::Malformed(format!("bad outs in: {line}")))?;
    let code: u8 = parts[3]
        .parse()
        .map_err(|_| TableError::Malformed(format!("bad bases code in: {line}")))?;
    let bases = Bases::from_code(code)
        .ok_or_else(|| TableError::Malformed(format!("bases code out of range in: {line}")))?;
    let mut score_diff: i32 = parts[4]
        .parse()
        .map_err(|_| TableError::Malformed(format!("bad score diff in: {line}")))?;
    let leverage: f64 = parts[5]
        .parse()
        .map_err(|_| TableError::Malformed(format!("bad leverage value in: {line}")))?;

    if batting_side == Side::Away {
        score_diff = -score_diff;
    }

    let key = LeverageKey {
        inning,
        batting_side,
        outs,
        bases,
        score_diff,
    };
    Ok((key, leverage))
}

/// Load the leverage table, degrading to empty on a missing file.
pub fn load(path: &Path) -> (HashMap<LeverageKey, f64>, SourceReport) {
    let content = match read_source(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Leverage source unavailable: {}", e);
            return (
                HashMap::new(),
                SourceReport {
                    missing: true,
                    ..Default::default()
                },
            );
        }
    };
    load_lines(&content, "leverage", parse_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_home_record() {
        let (key, lev) = parse_line("\"H\",7,1,4,2,1.85").unwrap();
        assert_eq!(key.batting_side, Side::Home);
        assert_eq!(key.inning, 7);
        assert_eq!(key.outs, 1);
        assert_eq!(key.bases, Bases::new(true, true, false));
        assert_eq!(key.score_diff, 2);
        assert!((lev - 1.85).abs() < 1e-12);
    }

    #[test]
    fn away_records_negate_score_diff() {
        let (key, _) = parse_line("\"A\",3,0,1,2,0.9").unwrap();
        assert_eq!(key.batting_side, Side::Away);
        assert_eq!(key.score_diff, -2);
    }

    #[test]
    fn rejects_bad_bases_code_and_field_count() {
        assert!(parse_line("\"H\",7,1,9,2,1.85").is_err());
        assert!(parse_line("\"H\",7,1,4,2").is_err());
    }
}
