// Fantasy scoring (approximate league rules).

use crate::record::{Stat, StatLine};

/// `(stat, points, per)`: each stat earns `points` for every `per` units.
/// Return TDs, two-point conversions and fumbles are not scored.
pub const SCORING: [(Stat, f64, f64); 8] = [
    (Stat::PassYards, 1.0, 50.0),
    (Stat::PassTds, 6.0, 1.0),
    (Stat::Interceptions, -2.0, 1.0),
    (Stat::RushYards, 1.0, 10.0),
    (Stat::RushTds, 6.0, 1.0),
    (Stat::Receptions, 0.25, 1.0),
    (Stat::RecYards, 1.0, 10.0),
    (Stat::RecTds, 6.0, 1.0),
];

/// Fantasy points for one season. Missing stats count as zero so the score
/// is always defined.
pub fn fantasy_points(stats: &StatLine) -> f64 {
    SCORING
        .iter()
        .map(|(stat, points, per)| stats.get(*stat).map_or(0.0, |v| v * points / per))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_scores_zero() {
        assert_eq!(fantasy_points(&StatLine::default()), 0.0);
    }

    #[test]
    fn explicit_zeros_score_zero() {
        let mut line = StatLine::default();
        for stat in Stat::ALL {
            line.set(stat, Some(0.0));
        }
        assert_eq!(fantasy_points(&line), 0.0);
    }

    #[test]
    fn passing_yards_and_touchdown() {
        let mut line = StatLine::default();
        line.set(Stat::PassYards, Some(100.0));
        line.set(Stat::PassTds, Some(1.0));
        assert_eq!(fantasy_points(&line), 8.0);
    }

    #[test]
    fn full_line_uses_every_coefficient() {
        let mut line = StatLine::default();
        line.set(Stat::PassYards, Some(250.0));
        line.set(Stat::PassTds, Some(2.0));
        line.set(Stat::Interceptions, Some(1.0));
        line.set(Stat::RushYards, Some(30.0));
        line.set(Stat::RushTds, Some(1.0));
        line.set(Stat::Receptions, Some(4.0));
        line.set(Stat::RecYards, Some(50.0));
        line.set(Stat::RecTds, Some(0.0));
        // 5 + 12 - 2 + 3 + 6 + 1 + 5 + 0
        assert!((fantasy_points(&line) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn unscored_stats_are_ignored() {
        let mut line = StatLine::default();
        line.set(Stat::GamesPlayed, Some(16.0));
        line.set(Stat::PassAttempts, Some(500.0));
        assert_eq!(fantasy_points(&line), 0.0);
    }
}
