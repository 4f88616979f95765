//! Historical statistics loader
//!
//! Builds the combined win-probability lookup table from three line-oriented
//! sources: win percentage by game state, leverage index, and run expectancy.
//! The win table is the superset; leverage and run-expectancy values are
//! attached where present and stored as absent otherwise. Individual bad
//! lines are logged and skipped, and a missing source file degrades to an
//! empty contribution rather than aborting the load.

pub mod leverage;
pub mod run_expectancy;
pub mod win_table;

use crate::types::StateKey;
use leverage::LeverageKey;
use run_expectancy::RunExpectancyKey;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Load-time errors. Non-fatal: the loaders log and degrade.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Value looked up per game state. Immutable once loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityEntry {
    /// Batting-team win probability; authoritative for decisions
    pub win_probability: Option<f64>,
    pub leverage_index: Option<f64>,
    pub expected_runs: Option<f64>,
}

/// The merged lookup table, keyed by composite [`StateKey`].
/// Built once at startup; read-only afterward.
#[derive(Debug, Default)]
pub struct CombinedTable {
    entries: HashMap<StateKey, ProbabilityEntry>,
}

impl CombinedTable {
    /// Assemble a table directly from entries (synthetic tables, tests).
    pub fn from_entries(entries: HashMap<StateKey, ProbabilityEntry>) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, key: &StateKey) -> Option<&ProbabilityEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-source load accounting
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceReport {
    pub loaded: usize,
    pub skipped: usize,
    pub missing: bool,
}

/// Load accounting across all three sources
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadReport {
    pub win_stats: SourceReport,
    pub leverage: SourceReport,
    pub run_expectancy: SourceReport,
}

/// Paths to the three historical stat files
#[derive(Debug, Clone)]
pub struct TableSources {
    pub win_stats: PathBuf,
    pub leverage: PathBuf,
    pub run_expectancy: PathBuf,
}

/// Build the combined table from the three sources.
///
/// Iterates every key of the win table and attaches the leverage entry
/// (keyed without the count) and the run-expectancy entry (keyed by
/// outs/bases/count only). Missing attachments are stored as `None`.
pub fn build_combined_table(sources: &TableSources) -> (CombinedTable, LoadReport) {
    let (win, win_report) = win_table::load(&sources.win_stats);
    let (lev, lev_report) = leverage::load(&sources.leverage);
    let (runs, runs_report) = run_expectancy::load(&sources.run_expectancy);

    let mut entries = HashMap::with_capacity(win.len());
    for (key, probability) in win {
        let entry = ProbabilityEntry {
            win_probability: Some(probability),
            leverage_index: lev.get(&LeverageKey::from_state(&key)).copied(),
            expected_runs: runs.get(&RunExpectancyKey::from_state(&key)).copied(),
        };
        entries.insert(key, entry);
    }

    let report = LoadReport {
        win_stats: win_report,
        leverage: lev_report,
        run_expectancy: runs_report,
    };
    info!(
        "Combined table built: {} states ({} win records, {} leverage, {} run-expectancy)",
        entries.len(),
        report.win_stats.loaded,
        report.leverage.loaded,
        report.run_expectancy.loaded
    );

    (CombinedTable { entries }, report)
}

/// Read one source file, reporting a missing/unreadable file as a
/// [`TableError::Io`] for the caller to log and degrade on.
pub(crate) fn read_source(path: &Path) -> Result<String, TableError> {
    std::fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Shared skip-and-log line loop for the three source formats.
pub(crate) fn load_lines<K, V>(
    content: &str,
    source_name: &str,
    parse: impl Fn(&str) -> Result<(K, V), TableError>,
) -> (HashMap<K, V>, SourceReport)
where
    K: std::hash::Hash + Eq,
{
    let mut map = HashMap::new();
    let mut report = SourceReport::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse(line) {
            Ok((key, value)) => {
                // Duplicate keys (including clamped extra innings) overwrite:
                // the later line wins, deterministically.
                map.insert(key, value);
                report.loaded += 1;
            }
            Err(e) => {
                warn!("Skipping bad {} line: {} ({})", source_name, line, e);
                report.skipped += 1;
            }
        }
    }

    (map, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bases, Count, Side};

    fn key(inning: u8, side: Side, outs: u8, diff: i32, balls: u8, strikes: u8) -> StateKey {
        StateKey {
            inning,
            batting_side: side,
            outs,
            bases: Bases::empty(),
            score_diff: diff,
            count: Count::new(balls, strikes),
        }
    }

    #[test]
    fn merge_attaches_leverage_and_runs_where_present() {
        let win = "(9, 1, 2, (0, 0, 0), -5, (0, 0)): (30, 100)\n\
                   (7, 1, 1, (0, 0, 0), 2, (1, 1)): (60, 100)";
        let lev = "\"H\",9,2,1,-5,1.8";
        let runs = "(2, (0, 0, 0), (0, 0)): [80, 15, 5]";

        let (win_map, _) = load_lines(win, "win", win_table::parse_line);
        let (lev_map, _) = load_lines(lev, "leverage", leverage::parse_line);
        let (runs_map, _) = load_lines(runs, "runs", run_expectancy::parse_line);

        let mut entries = HashMap::new();
        for (k, p) in win_map {
            entries.insert(
                k,
                ProbabilityEntry {
                    win_probability: Some(p),
                    leverage_index: lev_map.get(&LeverageKey::from_state(&k)).copied(),
                    expected_runs: runs_map.get(&RunExpectancyKey::from_state(&k)).copied(),
                },
            );
        }
        let table = CombinedTable { entries };

        let full = table
            .lookup(&key(9, Side::Home, 2, -5, 0, 0))
            .expect("merged entry");
        assert_eq!(full.win_probability, Some(0.30));
        assert_eq!(full.leverage_index, Some(1.8));
        // Expected runs: (0*80 + 1*15 + 2*5) / 100 = 0.25
        assert!((full.expected_runs.unwrap() - 0.25).abs() < 1e-12);

        // Second state has no leverage/run-expectancy match; win prob alone
        let partial = table
            .lookup(&key(7, Side::Home, 1, 2, 1, 1))
            .expect("win-only entry");
        assert_eq!(partial.win_probability, Some(0.60));
        assert_eq!(partial.leverage_index, None);
        assert_eq!(partial.expected_runs, None);
    }

    #[test]
    fn missing_files_degrade_to_empty_table() {
        let sources = TableSources {
            win_stats: PathBuf::from("/nonexistent/win"),
            leverage: PathBuf::from("/nonexistent/leverage"),
            run_expectancy: PathBuf::from("/nonexistent/runs"),
        };
        let (table, report) = build_combined_table(&sources);
        assert!(table.is_empty());
        assert!(report.win_stats.missing);
        assert!(report.leverage.missing);
        assert!(report.run_expectancy.missing);
    }
}
