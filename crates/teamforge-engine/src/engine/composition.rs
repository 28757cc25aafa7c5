//! Composition rules every formed team is checked against.
//!
//! - **Personality rule**, by team capacity:
//!   - 1: exactly one member
//!   - 2: one leader plus a thinker or balanced, or no leader with one thinker and one balanced
//!   - 3: exactly one leader and (at least one thinker or at least two balanced)
//!   - 4 and above: exactly one leader and one or two thinkers
//! - **Game cap**: at most [`MAX_SAME_GAME`] members sharing a preferred game.
//! - **Role floor**: at least `min(MIN_ROLES, capacity)` distinct preferred roles.

use crate::{CompositionShortfall, Participant, Team, TierCounts};

/// Maximum members of one team sharing a preferred game.
pub const MAX_SAME_GAME: usize = 2;
/// Distinct roles a team of at least this size must cover.
pub const MIN_ROLES: usize = 3;

/// Distinct roles required of a team with capacity `max_size`.
#[must_use]
pub fn role_floor(max_size: usize) -> usize {
    MIN_ROLES.min(max_size)
}

#[must_use]
pub fn satisfies_personality_rule(max_size: usize, counts: &TierCounts) -> bool {
    let leaders = counts.leaders();
    let thinkers = counts.thinkers();
    let balanced = counts.balanced();
    match max_size {
        0 | 1 => counts.total() == 1,
        2 => {
            (leaders == 1 && (thinkers >= 1 || balanced >= 1))
                || (leaders == 0 && thinkers >= 1 && balanced >= 1)
        }
        3 => leaders == 1 && (thinkers >= 1 || balanced >= 2),
        _ => leaders == 1 && (1..=2).contains(&thinkers),
    }
}

#[must_use]
pub fn team_satisfies_personality_rule(team: &Team) -> bool {
    satisfies_personality_rule(team.max_size(), &team.tier_counts())
}

#[must_use]
pub fn meets_role_floor(team: &Team) -> bool {
    team.unique_role_count() >= role_floor(team.max_size())
}

/// Whether `participant` can join `team` without exceeding the game cap.
#[must_use]
pub fn can_add(team: &Team, participant: &Participant) -> bool {
    team.count_by_game(participant.preferred_game()) < MAX_SAME_GAME
}

/// Checks the personality rule, then the role floor.
pub fn check(team: &Team) -> Result<(), CompositionShortfall> {
    if !team_satisfies_personality_rule(team) {
        return Err(CompositionShortfall::PersonalityRule {
            counts: team.tier_counts(),
        });
    }
    let required = role_floor(team.max_size());
    let roles = team.unique_role_count();
    if roles < required {
        return Err(CompositionShortfall::RoleDiversity { roles, required });
    }
    Ok(())
}

/// Whether `team` breaks the personality rule or the role floor.
#[must_use]
pub fn violates(team: &Team) -> bool {
    check(team).is_err()
}
