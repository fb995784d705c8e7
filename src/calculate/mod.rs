//! Statistics calculation engine.
//!
//! Derives report values from stored league rows:
//! - Standings per season or across all seasons (regular or playoff)
//! - Head-to-head records, history and win streaks between owners
//! - Weekly matchup resolution and records going into a week
//! - Champion derivation from the playoff bracket

mod champions;
mod head_to_head;
mod standings;
mod weekly;

pub use champions::derive_champions;
pub use head_to_head::{aggregate_by_opponent, head_to_head_record, prior_record, win_streak};
pub use standings::{build_standings, tally_playoff_games, tally_records, Tally};
pub use weekly::{game_sets, team_records_before_week};

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// wins / (wins + losses + ties), 4 decimal places. Zero when no games
/// were played.
pub fn calculate_win_percentage(wins: u32, losses: u32, ties: u32) -> f64 {
    let total = wins + losses + ties;
    if total == 0 {
        0.0
    } else {
        round_to(wins as f64 / total as f64, 4)
    }
}

/// Per-game average, 2 decimal places. Zero when no games were played.
pub fn calculate_average(total: f64, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        round_to(total / games as f64, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.615384, 4), 0.6154);
        assert_eq!(round_to(92.346153, 2), 92.35);
        assert_eq!(round_to(1.0, 2), 1.0);
    }

    #[test]
    fn test_calculate_win_percentage() {
        assert_eq!(calculate_win_percentage(8, 5, 0), 0.6154);
        assert_eq!(calculate_win_percentage(3, 3, 0), 0.5);
        assert_eq!(calculate_win_percentage(1, 0, 1), 0.5);
        assert_eq!(calculate_win_percentage(0, 0, 0), 0.0);
    }

    #[test]
    fn test_win_percentage_bounds() {
        for (w, l, t) in [(0, 7, 0), (7, 0, 0), (2, 2, 2), (13, 0, 1)] {
            let pct = calculate_win_percentage(w, l, t);
            assert!((0.0..=1.0).contains(&pct));
        }
    }

    #[test]
    fn test_calculate_average() {
        assert_eq!(calculate_average(1200.50, 13), 92.35);
        assert_eq!(calculate_average(1200.50, 0), 0.0);
    }
}
