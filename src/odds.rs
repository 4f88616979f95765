//! Odds and probability arithmetic
//!
//! American-odds conversion, vig removal, and the sportsbook-implied run
//! margin derived through the inverse normal CDF.

use statrs::distribution::{ContinuousCDF, Normal};

/// Standard deviation of MLB margin of victory used by the implied-margin
/// model when the caller has no better estimate.
pub const DEFAULT_MARGIN_STD_DEV: f64 = 3.0;

/// Convert American odds to an implied probability (vig included).
pub fn american_to_probability(odds: f64) -> f64 {
    if odds < 0.0 {
        -odds / (-odds + 100.0)
    } else {
        100.0 / (odds + 100.0)
    }
}

/// Rescale two complementary implied probabilities so they sum to 1,
/// removing the bookmaker margin.
pub fn remove_vig(p_home: f64, p_away: f64) -> (f64, f64) {
    let total = p_home + p_away;
    (p_home / total, p_away / total)
}

/// Expected run margin in favor of the away team, derived from both sides'
/// spreads and American odds.
///
/// The vig-free probability that the away team covers its spread is mapped
/// through the inverse normal CDF to a z-score; the spread is then shifted
/// by `z * std_dev` toward (or away from) the favorite.
pub fn expected_margin(
    home_spread: f64,
    away_spread: f64,
    home_odds: f64,
    away_odds: f64,
    std_dev: f64,
) -> f64 {
    let p_home = american_to_probability(home_odds);
    let p_away = american_to_probability(away_odds);
    let (_, p_away_norm) = remove_vig(p_home, p_away);

    // P(margin <= away_spread) = 1 - P(away covers)
    let z_prob = 1.0 - p_away_norm;
    let normal = Normal::new(0.0, 1.0).expect("unit normal");
    let z = normal.inverse_cdf(z_prob);

    if away_odds < home_odds {
        // Away team is the favorite
        away_spread - z * std_dev
    } else {
        away_spread + z * std_dev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn american_conversion_known_values() {
        // -150 => 150/250 = 0.60; +150 => 100/250 = 0.40
        assert!((american_to_probability(-150.0) - 0.60).abs() < 1e-12);
        assert!((american_to_probability(150.0) - 0.40).abs() < 1e-12);
        // Even money from both directions
        assert!((american_to_probability(100.0) - 0.50).abs() < 1e-12);
        assert!((american_to_probability(-100.0) - 0.50).abs() < 1e-12);
    }

    #[test]
    fn american_conversion_monotonicity() {
        // Decreasing in positive odds
        let mut last = american_to_probability(100.0);
        for odds in [120.0, 150.0, 200.0, 400.0, 1000.0] {
            let p = american_to_probability(odds);
            assert!(p < last);
            last = p;
        }
        // Increasing in magnitude of negative odds
        let mut last = american_to_probability(-100.0);
        for odds in [-120.0, -150.0, -200.0, -400.0, -1000.0] {
            let p = american_to_probability(odds);
            assert!(p > last);
            last = p;
        }
    }

    #[test]
    fn vig_removal_sums_to_one() {
        for (h, a) in [(0.55, 0.52), (0.91, 0.13), (0.5, 0.5), (0.01, 0.99)] {
            let (ph, pa) = remove_vig(h, a);
            assert!((ph + pa - 1.0).abs() < 1e-12);
            // Relative order preserved
            assert_eq!(ph > pa, h > a);
        }
    }

    #[test]
    fn expected_margin_away_favorite() {
        // Away -188 vs home +145: away is the favorite, z < 0, margin
        // lands above the away spread.
        let margin = expected_margin(2.5, -2.5, 145.0, -188.0, DEFAULT_MARGIN_STD_DEV);
        assert!(margin > -2.5);
        assert!(margin.is_finite());
    }

    #[test]
    fn expected_margin_home_favorite_uses_opposite_shift() {
        let fav_away = expected_margin(2.5, -2.5, 145.0, -188.0, DEFAULT_MARGIN_STD_DEV);
        let fav_home = expected_margin(-2.5, 2.5, -188.0, 145.0, DEFAULT_MARGIN_STD_DEV);
        // Mirrored games imply margins of opposite sign
        assert!(fav_away * fav_home <= 0.0);
    }
}
