//! Run-expectancy source
//!
//! One record per line, mapping an out/bases/count state to the observed
//! distribution of runs scored through the rest of the inning:
//!
//! ```text
//! (outs, (b1, b2, b3), (balls, strikes)): [freq0, freq1, freq2, ...]
//! ```
//!
//! The stored value is the frequency-weighted mean number of runs. This
//! source is independent of inning and score.

use super::{load_lines, read_source, SourceReport, TableError};
use crate::types::{Bases, Count, StateKey};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

/// Inning- and score-free slice of [`StateKey`] used by this source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunExpectancyKey {
    pub outs: u8,
    pub bases: Bases,
    pub count: Count,
}

impl RunExpectancyKey {
    pub fn from_state(key: &StateKey) -> Self {
        Self {
            outs: key.outs,
            bases: key.bases,
            count: key.count,
        }
    }
}

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\(\s*(\d+)\s*,\s*\(\s*([01])\s*,\s*([01])\s*,\s*([01])\s*\)\s*,\s*\(\s*(\d+)\s*,\s*(\d+)\s*\)\s*\)\s*:\s*\[([^\]]*)\]$",
        )
        .expect("run-expectancy line regex")
    })
}

/// Parse one run-expectancy record into its key and weighted-mean runs.
pub(crate) fn parse_line(line: &str) -> Result<(RunExpectancyKey, f64), TableError> {
    let caps = line_regex()
        .captures(line)
        .ok_or_else(|| TableError::Malformed(format!("unrecognized run-expectancy record: {line}")))?;

    let field = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();
    let int = |i: usize| -> Result<u8, TableError> {
        field(i)
            .parse()
            .map_err(|_| TableError::Malformed(format!("bad integer field in: {line}")))
    };

    let outs = int(1)?;
    let bases = Bases::new(field(2) == "1", field(3) == "1", field(4) == "1");
    let count = Count::new(int(5)?, int(6)?);

    let mut weighted = 0.0;
    let mut total = 0.0;
    for (i, raw) in field(7).split(',').enumerate() {
        let freq: f64 = raw
            .trim()
            .parse()
            .map_err(|_| TableError::Malformed(format!("bad frequency in: {line}")))?;
        weighted += i as f64 * freq;
        total += freq;
    }
    if total == 0.0 {
        return Err(TableError::Malformed(format!(
            "zero total frequency in: {line}"
        )));
    }

    let key = RunExpectancyKey { outs, bases, count };
    Ok((key, weighted / total))
}

/// Load the run-expectancy table, degrading to empty on a missing file.
pub fn load(path: &Path) -> (HashMap<RunExpectancyKey, f64>, SourceReport) {
    let content = match read_source(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Run-expectancy source unavailable: {}", e);
            return (
                HashMap::new(),
                SourceReport {
                    missing: true,
                    ..Default::default()
                },
            );
        }
    };
    load_lines(&content, "run-expectancy", parse_line)
}
