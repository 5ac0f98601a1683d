/// Cumulative point differential against the break-even line for a whole
/// session: total points minus `return_points` for every game played.
pub fn session_point_diff(total_points: i64, game_count: usize, return_points: i32) -> i64 {
    total_points - return_points as i64 * game_count as i64
}

/// Converts a point differential into currency at `rate` per 1,000 points.
///
/// A rate of zero always settles to exactly 0.0; callers suppress currency
/// display entirely in that case rather than rendering a zero amount.
/// Fractional currency is kept; rounding happens at display time only.
pub fn settle(point_diff: i64, rate: i32) -> f64 {
    if rate == 0 {
        return 0.0;
    }
    (point_diff as f64 / 1000.0) * rate as f64
}

/// Settlement for a single game, measured against the return line.
///
/// The lifetime statistics sum this per-game form; the section summary
/// uses the cumulative form above. The two are not algebraically
/// equivalent when return points differ across sections, and that
/// divergence matches the recorded behavior on purpose.
pub fn per_game_settlement(points: i32, return_points: i32, rate: i32) -> f64 {
    settle(points as i64 - return_points as i64, rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_diff_settles_positive() {
        let diff = session_point_diff(45000, 1, 30000);
        assert_eq!(diff, 15000);
        assert_eq!(settle(diff, 50), 750.0);
    }

    #[test]
    fn negative_diff_settles_negative() {
        let diff = session_point_diff(15000, 1, 30000);
        assert_eq!(diff, -15000);
        assert_eq!(settle(diff, 50), -750.0);
    }

    #[test]
    fn diff_scales_with_game_count() {
        assert_eq!(session_point_diff(95000, 3, 30000), 5000);
        assert_eq!(session_point_diff(0, 0, 30000), 0);
    }

    #[test]
    fn rate_zero_always_settles_to_zero() {
        assert_eq!(settle(15000, 0), 0.0);
        assert_eq!(settle(-15000, 0), 0.0);
        assert_eq!(per_game_settlement(45000, 30000, 0), 0.0);
    }

    #[test]
    fn fractional_currency_is_preserved() {
        // 500 points at rate 10 is half a currency unit
        assert_eq!(settle(500, 10), 5.0);
        assert_eq!(settle(50, 10), 0.5);
    }

    #[test]
    fn per_game_form_measures_a_single_game() {
        assert_eq!(per_game_settlement(45000, 30000, 50), 750.0);
        assert_eq!(per_game_settlement(8000, 30000, 50), -1100.0);
    }
}
