//! Head-to-head records and win streaks between owners.

use std::collections::{BTreeMap, HashMap};

use crate::models::{HeadToHeadRecord, Matchup, OpponentRecord, Outcome, OwnerId, WinStreak};

fn played_before(m: &Matchup, year: i32, week: u32) -> bool {
    (m.year, m.matchup_id) < (year, week)
}

/// Lifetime record for one owner against every opponent they have faced.
///
/// `matchups` are the owner's own rows. Rows without a decided outcome are
/// skipped. Output is ordered by opponent name, then id.
pub fn aggregate_by_opponent(
    matchups: &[Matchup],
    owner_names: &HashMap<OwnerId, String>,
) -> Vec<OpponentRecord> {
    let mut by_opponent: BTreeMap<OwnerId, OpponentRecord> = BTreeMap::new();

    for m in matchups {
        let (Some(opponent), Some(outcome)) = (&m.opponent_owner_id, m.outcome()) else {
            continue;
        };
        let entry = by_opponent
            .entry(opponent.clone())
            .or_insert_with(|| OpponentRecord {
                opponent_owner_id: opponent.clone(),
                opponent_name: owner_names.get(opponent).cloned(),
                wins: 0,
                losses: 0,
                ties: 0,
            });
        match outcome {
            Outcome::Win => entry.wins += 1,
            Outcome::Loss => entry.losses += 1,
            Outcome::Tie => entry.ties += 1,
        }
    }

    let mut records: Vec<OpponentRecord> = by_opponent.into_values().collect();
    records.sort_by(|a, b| {
        a.opponent_name
            .cmp(&b.opponent_name)
            .then_with(|| a.opponent_owner_id.cmp(&b.opponent_owner_id))
    });
    records
}

/// Record between two owners going into `(year, week)`.
///
/// `history` is the pair's game history from one owner's side. Only games
/// played before `(year, week)` count; that week's game and anything later
/// are ignored even when stored.
pub fn prior_record(history: &[Matchup], year: i32, week: u32) -> HeadToHeadRecord {
    tally(history.iter().filter(|m| played_before(m, year, week)))
}

/// Record over a pair's whole history.
pub fn head_to_head_record(history: &[Matchup]) -> HeadToHeadRecord {
    tally(history.iter())
}

fn tally<'a>(games: impl Iterator<Item = &'a Matchup>) -> HeadToHeadRecord {
    let mut record = HeadToHeadRecord::default();
    for m in games {
        match m.outcome() {
            Some(Outcome::Win) => record.wins += 1,
            Some(Outcome::Loss) => record.losses += 1,
            Some(Outcome::Tie) => record.ties += 1,
            None => {}
        }
    }
    record
}

/// Current run of identical results between the two owners in `game`.
///
/// Walks the games in `history` (from `game`'s owner's side) played before
/// `(year, week)`, newest first, and counts results equal to the most recent one. The
/// holder is `game`'s team for a winning run and the opponent's team for a
/// losing run; a run of ties has no holder.
pub fn win_streak(game: &Matchup, history: &[Matchup], year: i32, week: u32) -> WinStreak {
    let mut decided: Vec<(&Matchup, Outcome)> = history
        .iter()
        .filter(|m| played_before(m, year, week))
        .filter_map(|m| m.outcome().map(|o| (m, o)))
        .collect();
    decided.sort_by(|(a, _), (b, _)| {
        b.year
            .cmp(&a.year)
            .then_with(|| b.matchup_id.cmp(&a.matchup_id))
    });

    let Some(&(_, latest)) = decided.first() else {
        return WinStreak::default();
    };

    let streak = decided
        .iter()
        .take_while(|(_, outcome)| *outcome == latest)
        .count() as u32;

    let streak_owner = match latest {
        Outcome::Win => Some(game.team_id),
        Outcome::Loss => game.opponent_team_id,
        Outcome::Tie => None,
    };

    WinStreak {
        streak,
        streak_owner,
    }
}
