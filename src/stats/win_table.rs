//! Win-percentage-by-state source
//!
//! One record per line:
//!
//! ```text
//! (inning, homeAway, outs, (b1, b2, b3), scoreDiff, (balls, strikes)): (wins, totalGames)
//! ```
//!
//! Records with `homeAway = 0` are written from the away team's perspective
//! and are normalized on load: the probability is complemented and the score
//! differential negated, so every stored key reads as "team currently
//! batting". Innings above 10 are clamped onto the 10th-inning bucket.

use super::{load_lines, read_source, SourceReport, TableError};
use crate::types::{Bases, Count, Side, StateKey, MAX_TABLE_INNING};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\(\s*(\d+)\s*,\s*([01])\s*,\s*(\d+)\s*,\s*\(\s*([01])\s*,\s*([01])\s*,\s*([01])\s*\)\s*,\s*(-?\d+)\s*,\s*\(\s*(\d+)\s*,\s*(\d+)\s*\)\s*\)\s*:\s*\(\s*(\d+)\s*,\s*(\d+)\s*\)$",
        )
        .expect("win-table line regex")
    })
}

/// Parse one win-by-state record into its normalized key and probability.
pub(crate) fn parse_line(line: &str) -> Result<(StateKey, f64), TableError> {
    let caps = line_regex()
        .captures(line)
        .ok_or_else(|| TableError::Malformed(format!("unrecognized win record: {line}")))?;

    let field = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();
    let int = |i: usize| -> Result<i64, TableError> {
        field(i)
            .parse()
            .map_err(|_| TableError::Malformed(format!("bad integer field in: {line}")))
    };

    // Clamp before narrowing so an absurd inning lands on the extra-inning
    // bucket instead of wrapping.
    let inning = int(1)?.min(MAX_TABLE_INNING as i64) as u8;
    let is_home = field(2) == "1";
    let outs = int(3)?;
    if !(0..=2).contains(&outs) {
        return Err(TableError::Malformed(format!("outs out of range in: {line}")));
    }
    let bases = Bases::new(field(4) == "1", field(5) == "1", field(6) == "1");
    let mut score_diff = int(7)? as i32;
    let balls = int(8)?;
    let strikes = int(9)?;
    if !(0..=3).contains(&balls) || !(0..=2).contains(&strikes) {
        return Err(TableError::Malformed(format!("count out of range in: {line}")));
    }
    let count = Count::new(balls as u8, strikes as u8);
    let wins = int(10)? as f64;
    let total = int(11)? as f64;

    // Zero sample size is an explicit zero probability, not an error.
    let mut probability = if total == 0.0 { 0.0 } else { wins / total };

    // Normalize away-perspective records to the batting-team convention.
    let batting_side = if is_home {
        Side::Home
    } else {
        probability = 1.0 - probability;
        score_diff = -score_diff;
        Side::Away
    };

    let key = StateKey {
        inning,
        batting_side,
        outs: outs as u8,
        bases,
        score_diff,
        count,
    };
    Ok((key, probability))
}

/// Load the win table, degrading to empty on a missing file.
pub fn load(path: &Path) -> (HashMap<StateKey, f64>, SourceReport) {
    let content = match read_source(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Win-by-state source unavailable: {}", e);
            return (
                HashMap::new(),
                SourceReport {
                    missing: true,
                    ..Default::default()
                },
            );
        }
    };
    load_lines(&content, "win-by-state", parse_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_home_record_verbatim() {
        let (key, p) = parse_line("(9, 1, 2, (0, 0, 0), -5, (0, 0)): (30, 100)").unwrap();
        assert_eq!(key.inning, 9);
        assert_eq!(key.batting_side, Side::Home);
        assert_eq!(key.outs, 2);
        assert_eq!(key.score_diff, -5);
        assert_eq!(key.count, Count::new(0, 0));
        assert!((p - 0.30).abs() < 1e-12);
    }

    #[test]
    fn away_records_flip_probability_and_score_diff() {
        let (key, p) = parse_line("(5, 0, 1, (1, 0, 1), -3, (2, 2)): (40, 100)").unwrap();
        assert_eq!(key.batting_side, Side::Away);
        assert_eq!(key.score_diff, 3);
        assert!((p - 0.60).abs() < 1e-12);
        assert_eq!(key.bases, Bases::new(true, false, true));
    }

    #[test]
    fn zero_total_games_is_zero_probability() {
        let (_, p) = parse_line("(1, 1, 0, (0, 0, 0), 0, (0, 0)): (0, 0)").unwrap();
        assert_eq!(p, 0.0);
    }

    #[test]
    fn extra_innings_collide_on_bucket_ten_later_line_wins() {
        let content = "(10, 1, 2, (0, 0, 0), 1, (0, 0)): (50, 100)\n\
                       (15, 1, 2, (0, 0, 0), 1, (0, 0)): (70, 100)";
        let (map, report) = load_lines(content, "win-by-state", parse_line);
        assert_eq!(report.loaded, 2);
        assert_eq!(map.len(), 1);
        let key = map.keys().next().unwrap();
        assert_eq!(key.inning, 10);
        assert!((map.values().next().unwrap() - 0.70).abs() < 1e-12);
    }

    #[test]
    fn absurd_innings_clamp_instead_of_wrapping() {
        // 256 would wrap to 0 through a bare u8 cast; it must land on the
        // extra-inning bucket.
        let (key, _) = parse_line("(256, 1, 2, (0, 0, 0), 1, (0, 0)): (50, 100)").unwrap();
        assert_eq!(key.inning, MAX_TABLE_INNING);
    }

    #[test]
    fn out_of_range_state_fields_are_malformed() {
        // Three outs ends the half-inning; four balls is a walk.
        assert!(parse_line("(9, 1, 3, (0, 0, 0), 1, (0, 0)): (50, 100)").is_err());
        assert!(parse_line("(9, 1, 2, (0, 0, 0), 1, (4, 0)): (50, 100)").is_err());
        assert!(parse_line("(9, 1, 2, (0, 0, 0), 1, (0, 3)): (50, 100)").is_err());
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let content = "(9, 1, 2, (0, 0, 0), -5, (0, 0)): (30, 100)\n\
                       this is not a record\n\
                       (9, 1): (1, 2)";
        let (map, report) = load_lines(content, "win-by-state", parse_line);
        assert_eq!(map.len(), 1);
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 2);
    }
}
