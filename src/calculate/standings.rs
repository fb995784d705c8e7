//! Record aggregation and the standings table.

use std::collections::{BTreeMap, HashMap};

use super::{calculate_average, calculate_win_percentage, round_to};
use crate::models::{Champion, Matchup, Outcome, OwnerId, Record, Sacko, StandingsRow};

/// Running totals for one owner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub points_against: f64,
}

impl Tally {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    fn add_record(&mut self, record: &Record) {
        self.wins += record.wins;
        self.losses += record.losses;
        self.ties += record.ties;
        self.points_for += record.points_for;
        self.points_against += record.points_against;
    }

    fn add_game(&mut self, outcome: Outcome, scored: f64, allowed: f64) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
        self.points_for += scored;
        self.points_against += allowed;
    }
}

fn in_year(row_year: i32, year: Option<i32>) -> bool {
    year.map_or(true, |y| y == row_year)
}

/// Sum upstream regular-season records per owner, across every team the
/// owner held in the selected seasons.
pub fn tally_records(records: &[Record], year: Option<i32>) -> BTreeMap<OwnerId, Tally> {
    let mut tallies: BTreeMap<OwnerId, Tally> = BTreeMap::new();
    for record in records.iter().filter(|r| in_year(r.year, year)) {
        tallies
            .entry(record.owner_id.clone())
            .or_default()
            .add_record(record);
    }
    tallies
}

/// Tally completed playoff games against a real opponent per owner.
pub fn tally_playoff_games(matchups: &[Matchup], year: Option<i32>) -> BTreeMap<OwnerId, Tally> {
    let mut tallies: BTreeMap<OwnerId, Tally> = BTreeMap::new();
    for m in matchups
        .iter()
        .filter(|m| m.is_playoffs && in_year(m.year, year))
    {
        let Some(outcome) = m.outcome() else {
            continue;
        };
        tallies.entry(m.owner_id.clone()).or_default().add_game(
            outcome,
            m.team_score,
            m.opponent_team_score.unwrap_or(0.0),
        );
    }
    tallies
}

/// Turn per-owner tallies into a ranked standings table.
///
/// Only owners present in `tallies` appear. Championship and Sacko counts
/// are limited to `year` when one is given. Rows are ordered by win
/// percentage, then average points for, both descending.
pub fn build_standings(
    tallies: BTreeMap<OwnerId, Tally>,
    champions: &[Champion],
    sackos: &[Sacko],
    year: Option<i32>,
    owner_names: &HashMap<OwnerId, String>,
) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = tallies
        .into_iter()
        .map(|(owner_id, tally)| {
            let games = tally.games();
            let championships = champions
                .iter()
                .filter(|c| c.owner_id == owner_id && in_year(c.year, year))
                .count() as u32;
            let sacko_count = sackos
                .iter()
                .filter(|s| s.owner_id == owner_id && in_year(s.year, year))
                .count() as u32;

            StandingsRow {
                owner_name: owner_names.get(&owner_id).cloned(),
                wins: tally.wins,
                losses: tally.losses,
                ties: tally.ties,
                win_percentage: calculate_win_percentage(tally.wins, tally.losses, tally.ties),
                points_for: round_to(tally.points_for, 2),
                points_against: round_to(tally.points_against, 2),
                avg_points_for: calculate_average(tally.points_for, games),
                avg_points_against: calculate_average(tally.points_against, games),
                championships,
                sackos: sacko_count,
                owner_id,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.win_percentage
            .total_cmp(&a.win_percentage)
            .then_with(|| b.avg_points_for.total_cmp(&a.avg_points_for))
            .then_with(|| a.owner_id.cmp(&b.owner_id))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{both_sides, bye};
    use crate::models::TeamId;
    use pretty_assertions::assert_eq;

    fn record(year: i32, team: u32, owner: &str, w: u32, l: u32, pf: f64, pa: f64) -> Record {
        Record {
            year,
            team_id: TeamId(team),
            owner_id: owner.into(),
            standing: 0,
            wins: w,
            losses: l,
            ties: 0,
            points_for: pf,
            points_against: pa,
            streak_length: 0,
            streak_type: String::new(),
        }
    }

    #[test]
    fn test_owner_record_across_two_teams() {
        let records = vec![
            record(2020, 1, "a", 5, 2, 700.25, 600.00),
            record(2020, 7, "a", 3, 3, 500.25, 500.25),
        ];
        let rows = build_standings(
            tally_records(&records, Some(2020)),
            &[],
            &[],
            Some(2020),
            &HashMap::new(),
        );

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!((row.wins, row.losses, row.ties), (8, 5, 0));
        assert_eq!(row.win_percentage, 0.6154);
        assert_eq!(row.points_for, 1200.5);
        assert_eq!(row.avg_points_for, 92.35);
        assert_eq!(row.avg_points_against, 84.63);
    }

    #[test]
    fn test_owner_without_rows_is_absent() {
        let records = vec![
            record(2019, 1, "a", 7, 6, 1000.0, 1000.0),
            record(2020, 2, "b", 6, 7, 1000.0, 1000.0),
        ];
        let rows = build_standings(
            tally_records(&records, Some(2020)),
            &[],
            &[],
            Some(2020),
            &HashMap::new(),
        );
        let owners: Vec<&str> = rows.iter().map(|r| r.owner_id.as_str()).collect();
        assert_eq!(owners, vec!["b"]);
    }

    #[test]
    fn test_tie_break_on_average_points() {
        let records = vec![
            record(2020, 1, "low", 7, 6, 1100.0, 1000.0),
            record(2020, 2, "high", 7, 6, 1300.0, 1000.0),
            record(2020, 3, "best", 9, 4, 900.0, 1000.0),
        ];
        let rows = build_standings(
            tally_records(&records, None),
            &[],
            &[],
            None,
            &HashMap::new(),
        );
        let owners: Vec<&str> = rows.iter().map(|r| r.owner_id.as_str()).collect();
        assert_eq!(owners, vec!["best", "high", "low"]);
    }

    #[test]
    fn test_zero_games_is_defined_zero() {
        let records = vec![record(2021, 1, "a", 0, 0, 0.0, 0.0)];
        let rows = build_standings(
            tally_records(&records, None),
            &[],
            &[],
            None,
            &HashMap::new(),
        );
        assert_eq!(rows[0].win_percentage, 0.0);
        assert_eq!(rows[0].avg_points_for, 0.0);
    }

    #[test]
    fn test_trophy_counts_respect_year_filter() {
        let records = vec![
            record(2019, 1, "a", 8, 5, 1000.0, 900.0),
            record(2020, 1, "a", 8, 5, 1000.0, 900.0),
        ];
        let champions = vec![
            Champion {
                year: 2019,
                owner_id: "a".into(),
            },
            Champion {
                year: 2020,
                owner_id: "a".into(),
            },
        ];
        let sackos = vec![Sacko {
            year: 2019,
            owner_id: "a".into(),
        }];
        let mut names = HashMap::new();
        names.insert(OwnerId::from("a"), "Amy A".to_string());

        let overall = build_standings(
            tally_records(&records, None),
            &champions,
            &sackos,
            None,
            &names,
        );
        assert_eq!(overall[0].championships, 2);
        assert_eq!(overall[0].sackos, 1);
        assert_eq!(overall[0].owner_name.as_deref(), Some("Amy A"));

        let season = build_standings(
            tally_records(&records, Some(2020)),
            &champions,
            &sackos,
            Some(2020),
            &names,
        );
        assert_eq!(season[0].championships, 1);
        assert_eq!(season[0].sackos, 0);
    }

    #[test]
    fn test_playoff_tally_uses_completed_games() {
        let mut rows = Vec::new();
        for mut m in both_sides(2020, 14, (1, "a", 120.0), (2, "b", 100.0)) {
            m.is_playoffs = true;
            rows.push(m);
        }
        for mut m in both_sides(2020, 15, (1, "a", 90.0), (3, "c", 110.0)) {
            m.is_playoffs = true;
            rows.push(m);
        }
        let mut pending = both_sides(2020, 16, (3, "c", 10.0), (4, "d", 5.0));
        for m in pending.iter_mut() {
            m.is_playoffs = true;
            m.is_win = false;
            m.is_loss = false;
            m.is_pending = true;
        }
        rows.extend(pending);
        let mut playoff_bye = bye(2020, 14, (3, "c", 0.0));
        playoff_bye.is_playoffs = true;
        rows.push(playoff_bye);
        // regular season game, ignored in playoff mode
        rows.extend(both_sides(2020, 3, (4, "d", 100.0), (1, "a", 90.0)));

        let tallies = tally_playoff_games(&rows, Some(2020));

        let a = tallies[&OwnerId::from("a")];
        assert_eq!((a.wins, a.losses, a.ties), (1, 1, 0));
        assert_eq!(a.points_for, 210.0);
        assert_eq!(a.points_against, 210.0);

        let c = tallies[&OwnerId::from("c")];
        assert_eq!((c.wins, c.losses), (1, 0));
        assert!(!tallies.contains_key(&OwnerId::from("d")));
    }
}
