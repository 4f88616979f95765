//! Kelly-criterion position sizing
//!
//! Pure functions: the full-Kelly stake for a binary contract and the
//! dynamic discount schedule that decides how much of full Kelly to risk
//! for a given game state.

/// Sizing result: dollar stake plus the expected value of one contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KellyStake {
    /// Dollar amount to put at risk (0.0 = no bet)
    pub stake: f64,
    /// Expected value per unit contract at the given price
    pub expected_value: f64,
}

/// Optimal stake for buying a binary contract at `price` (dollars per
/// contract, 0-1) with estimated win probability `p`.
///
/// `fraction` scales down from full Kelly (1.0). A non-positive edge
/// returns a zero stake; the expected value is reported either way.
pub fn kelly_stake(p: f64, price: f64, bankroll: f64, fraction: f64) -> KellyStake {
    let b = (1.0 - price) / price; // net odds
    let q = 1.0 - p;
    let expected_value = p * 1.0 + q * -price;

    let raw = (b * p - q) / b;
    if raw <= 0.0 {
        return KellyStake {
            stake: 0.0,
            expected_value,
        };
    }

    KellyStake {
        stake: bankroll * raw * fraction,
        expected_value,
    }
}

/// Fraction of full Kelly to risk for the current game state.
///
/// The model is less trustworthy early in the game and in high-variance
/// (high-leverage) moments, so the fraction is discounted for both, then
/// scaled by overall model confidence and clamped to [0, 1].
///
/// `_win_prob` is part of the sizing signature but does not enter the
/// discount schedule.
pub fn dynamic_kelly_fraction(
    _win_prob: f64,
    inning: u8,
    leverage_index: f64,
    model_confidence: f64,
) -> f64 {
    let mut fraction = 1.0;

    // Early-game discount
    if inning <= 3 {
        fraction *= 0.5;
    } else if inning <= 6 {
        fraction *= 0.75;
    }

    // High-leverage discount
    if leverage_index >= 2.0 {
        fraction *= 0.5;
    } else if leverage_index >= 1.5 {
        fraction *= 0.75;
    }

    fraction *= model_confidence;

    fraction.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_bet_without_positive_edge() {
        // p equal to price: zero edge
        let result = kelly_stake(0.65, 0.65, 100.0, 1.0);
        assert_eq!(result.stake, 0.0);
        // p below price: negative edge, EV still reported
        let result = kelly_stake(0.50, 0.65, 100.0, 1.0);
        assert_eq!(result.stake, 0.0);
        let expected_ev = 0.50 * 1.0 + 0.50 * -0.65;
        assert!((result.expected_value - expected_ev).abs() < 1e-12);
    }

    #[test]
    fn positive_edge_stakes_scale_with_bankroll_and_fraction() {
        // p=0.78, price=0.65: b = 0.35/0.65, raw = (b*0.78 - 0.22)/b
        let full = kelly_stake(0.78, 0.65, 100.0, 1.0);
        assert!(full.stake > 0.0);

        let half = kelly_stake(0.78, 0.65, 100.0, 0.5);
        assert!((half.stake - full.stake / 2.0).abs() < 1e-9);

        let double_roll = kelly_stake(0.78, 0.65, 200.0, 1.0);
        assert!((double_roll.stake - full.stake * 2.0).abs() < 1e-9);

        let expected_ev = 0.78 + 0.22 * -0.65;
        assert!((full.expected_value - expected_ev).abs() < 1e-12);
    }

    #[test]
    fn dynamic_fraction_known_point() {
        // Inning 1 (x0.5), leverage 3 (x0.5), confidence 1.0 => 0.25
        let f = dynamic_kelly_fraction(0.6, 1, 3.0, 1.0);
        assert!((f - 0.25).abs() < 1e-12);
    }

    #[test]
    fn dynamic_fraction_discount_boundaries() {
        // No discounts: late inning, calm leverage, full confidence
        assert_eq!(dynamic_kelly_fraction(0.5, 9, 1.0, 1.0), 1.0);
        // Middle innings
        assert!((dynamic_kelly_fraction(0.5, 4, 1.0, 1.0) - 0.75).abs() < 1e-12);
        assert!((dynamic_kelly_fraction(0.5, 6, 1.0, 1.0) - 0.75).abs() < 1e-12);
        // Leverage band [1.5, 2)
        assert!((dynamic_kelly_fraction(0.5, 9, 1.5, 1.0) - 0.75).abs() < 1e-12);
        assert!((dynamic_kelly_fraction(0.5, 9, 1.99, 1.0) - 0.75).abs() < 1e-12);
        assert!((dynamic_kelly_fraction(0.5, 9, 2.0, 1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn dynamic_fraction_always_in_unit_interval() {
        for inning in 1..=12u8 {
            for leverage in [0.0, 0.5, 1.0, 1.5, 1.9, 2.0, 4.0] {
                for confidence in [0.0, 0.25, 0.5, 1.0] {
                    let f = dynamic_kelly_fraction(0.5, inning, leverage, confidence);
                    assert!((0.0..=1.0).contains(&f));
                }
            }
        }
    }
}
