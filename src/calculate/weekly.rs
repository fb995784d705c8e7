//! Weekly matchup resolution.

use std::collections::{BTreeSet, HashMap};

use crate::models::{Matchup, TeamId, TeamRecord};

/// Distinct games in one week's rows.
///
/// Each physical game is stored once per side; this collapses them to one
/// set per game: a pair for a real game and a singleton for a bye. Sets
/// are ordered by their lowest team id.
pub fn game_sets(rows: &[Matchup]) -> Vec<BTreeSet<TeamId>> {
    let mut ordered: Vec<&Matchup> = rows.iter().collect();
    ordered.sort_by_key(|m| m.team_id);

    let mut seen: BTreeSet<TeamId> = BTreeSet::new();
    let mut sets = Vec::new();
    for m in ordered {
        if seen.contains(&m.team_id) {
            continue;
        }
        let mut set = BTreeSet::from([m.team_id]);
        if let Some(opponent) = m.opponent_team_id {
            set.insert(opponent);
        }
        seen.extend(set.iter().copied());
        sets.push(set);
    }
    sets
}

/// Each team's record from the games scored before `week`.
///
/// Every team with a row in the season gets an entry, starting at 0-0-0.
/// Results come from comparing scores; pending games and byes don't count.
pub fn team_records_before_week(matchups: &[Matchup], week: u32) -> HashMap<TeamId, TeamRecord> {
    let mut records: HashMap<TeamId, TeamRecord> = HashMap::new();
    for m in matchups {
        let record = records.entry(m.team_id).or_default();
        if m.matchup_id >= week || m.is_pending || m.is_bye {
            continue;
        }
        let Some(allowed) = m.opponent_team_score else {
            continue;
        };
        if m.team_score > allowed {
            record.wins += 1;
        } else if m.team_score < allowed {
            record.losses += 1;
        } else {
            record.ties += 1;
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{both_sides, bye};
    use pretty_assertions::assert_eq;

    fn season() -> Vec<Matchup> {
        let mut rows = Vec::new();
        rows.extend(both_sides(2020, 1, (1, "a", 100.0), (2, "b", 90.0)));
        rows.extend(both_sides(2020, 1, (3, "c", 80.0), (4, "d", 80.0)));
        rows.extend(both_sides(2020, 2, (1, "a", 70.0), (3, "c", 90.0)));
        rows.extend(both_sides(2020, 2, (2, "b", 100.0), (4, "d", 95.0)));
        rows.extend(both_sides(2020, 3, (1, "a", 100.0), (4, "d", 90.0)));
        rows.push(bye(2020, 3, (2, "b", 0.0)));
        rows.push(bye(2020, 3, (3, "c", 0.0)));
        rows
    }

    #[test]
    fn test_game_sets_collapse_both_sides() {
        let week_one: Vec<Matchup> = season()
            .into_iter()
            .filter(|m| m.matchup_id == 1)
            .collect();
        assert_eq!(
            game_sets(&week_one),
            vec![
                BTreeSet::from([TeamId(1), TeamId(2)]),
                BTreeSet::from([TeamId(3), TeamId(4)]),
            ]
        );
    }

    #[test]
    fn test_byes_are_singletons() {
        let week_three: Vec<Matchup> = season()
            .into_iter()
            .filter(|m| m.matchup_id == 3)
            .collect();
        assert_eq!(
            game_sets(&week_three),
            vec![
                BTreeSet::from([TeamId(1), TeamId(4)]),
                BTreeSet::from([TeamId(2)]),
                BTreeSet::from([TeamId(3)]),
            ]
        );
    }

    #[test]
    fn test_records_before_week() {
        let records = team_records_before_week(&season(), 3);
        assert_eq!(
            records[&TeamId(1)],
            TeamRecord {
                wins: 1,
                losses: 1,
                ties: 0
            }
        );
        assert_eq!(
            records[&TeamId(4)],
            TeamRecord {
                wins: 0,
                losses: 1,
                ties: 1
            }
        );
    }

    #[test]
    fn test_week_one_starts_empty() {
        let records = team_records_before_week(&season(), 1);
        assert_eq!(records.len(), 4);
        assert!(records.values().all(|r| *r == TeamRecord::default()));
    }
}
