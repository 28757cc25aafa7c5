use rand::{Rng, seq::SliceRandom as _};
use serde::{Deserialize, Serialize};

use crate::{Participant, Team};

/// What to do with participants no valid team could seat.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "kebab-case")]
pub enum LeftoverDisposition {
    /// Keep them in the leftover set.
    #[default]
    #[display("leave unteamed")]
    LeaveUnteamed,
    /// Pack them, shuffled, into extra teams of at most the requested size.
    /// Extra teams may be undersized and unbalanced.
    #[display("pack into extra teams")]
    PackIntoExtraTeams,
}

/// Shuffles `leftovers` and chunks them into teams of at most `team_size`.
///
/// Teams are numbered `XT{n}` after the `existing` teams. Each team's capacity
/// equals its chunk length.
pub fn pack_extra_teams<R>(
    mut leftovers: Vec<Participant>,
    team_size: usize,
    existing: usize,
    rng: &mut R,
) -> Vec<Team>
where
    R: Rng + ?Sized,
{
    if team_size == 0 {
        return vec![];
    }
    leftovers.shuffle(rng);
    let mut teams = vec![];
    let mut members = leftovers.into_iter().peekable();
    while members.peek().is_some() {
        let chunk: Vec<_> = members.by_ref().take(team_size).collect();
        let n = existing + teams.len() + 1;
        let mut team = Team::new(format!("XT{n}"), format!("Extra Team {n}"), chunk.len());
        for member in chunk {
            // Capacity equals the chunk length.
            let _ = team.add_member(member);
        }
        if team.len() < team_size {
            tracing::warn!(
                team = %team.id(),
                size = team.len(),
                requested = team_size,
                "extra team smaller than requested size"
            );
        }
        teams.push(team);
    }
    teams
}

/// Applies `disposition` to `leftovers`, appending any extra teams to `teams`.
pub fn apply_disposition<R>(
    disposition: LeftoverDisposition,
    teams: &mut Vec<Team>,
    leftovers: &mut Vec<Participant>,
    team_size: usize,
    rng: &mut R,
) where
    R: Rng + ?Sized,
{
    if leftovers.is_empty() {
        return;
    }
    match disposition {
        LeftoverDisposition::LeaveUnteamed => {
            tracing::info!(count = leftovers.len(), "leaving participants unteamed");
        }
        LeftoverDisposition::PackIntoExtraTeams => {
            let extra = pack_extra_teams(std::mem::take(leftovers), team_size, teams.len(), rng);
            tracing::warn!(
                count = extra.len(),
                "created extra teams from leftovers (may be unbalanced)"
            );
            teams.extend(extra);
        }
    }
}
