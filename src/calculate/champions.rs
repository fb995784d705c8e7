//! Champion derivation from the playoff bracket.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{Champion, Matchup, Outcome};

/// One champion per season: the winner of the decided game in the last
/// winners-bracket matchup period.
///
/// The row with the lowest team id in that period is read. A pending or
/// tied final produces no champion for the year. Seasons listed in
/// `title_periods` also need that last period to be the title game, so a
/// season still in its early playoff rounds has no champion yet.
pub fn derive_champions(
    matchups: &[Matchup],
    title_periods: &BTreeMap<i32, u32>,
) -> Vec<Champion> {
    let mut finals: BTreeMap<i32, &Matchup> = BTreeMap::new();
    for m in matchups
        .iter()
        .filter(|m| m.is_playoffs && !m.is_consolation && m.has_opponent())
    {
        finals
            .entry(m.year)
            .and_modify(|current| {
                if (m.matchup_id, std::cmp::Reverse(m.team_id))
                    > (current.matchup_id, std::cmp::Reverse(current.team_id))
                {
                    *current = m;
                }
            })
            .or_insert(m);
    }

    finals
        .into_values()
        .filter(|m| match title_periods.get(&m.year) {
            Some(&period) if m.matchup_id < period => {
                debug!(
                    "{} playoffs reached period {} of {}, no champion yet",
                    m.year, m.matchup_id, period
                );
                false
            }
            _ => true,
        })
        .filter_map(|m| {
            let owner_id = match m.outcome()? {
                Outcome::Win => m.owner_id.clone(),
                Outcome::Loss => m.opponent_owner_id.clone()?,
                Outcome::Tie => {
                    debug!("Final in {} ended in a tie, no champion", m.year);
                    return None;
                }
            };
            Some(Champion {
                year: m.year,
                owner_id,
            })
        })
        .collect()
}
