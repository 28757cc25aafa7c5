use crate::{CandidatePool, Participant, PersonalityTier, Team, engine::composition};

/// Tier queues searched for a replacement, in order.
pub const SEARCH_ORDER: [PersonalityTier; 3] = [
    PersonalityTier::Balanced,
    PersonalityTier::Thinker,
    PersonalityTier::Leader,
];

/// Seat index that `candidate` could take over to add a missing role.
///
/// The replaced member's role must still be covered by someone else, the
/// candidate must respect the game cap once that member leaves, and the
/// personality rule must hold after the substitution.
#[must_use]
pub fn substitution_slot(team: &Team, candidate: &Participant) -> Option<usize> {
    if team.roles().contains(candidate.preferred_role()) {
        return None;
    }
    let members = team.members();
    let others = |skip: usize| {
        members
            .iter()
            .enumerate()
            .filter(move |(j, _)| *j != skip)
            .map(|(_, m)| m)
    };
    (0..members.len()).find(|&i| {
        let outgoing = &members[i];
        let role_kept = others(i).any(|m| m.preferred_role() == outgoing.preferred_role());
        let same_game = others(i)
            .filter(|m| m.preferred_game() == candidate.preferred_game())
            .count();
        let mut counts = team.tier_counts();
        counts[outgoing.personality_tier()] -= 1;
        counts[candidate.personality_tier()] += 1;
        role_kept
            && same_game < composition::MAX_SAME_GAME
            && composition::satisfies_personality_rule(team.max_size(), &counts)
    })
}

/// Performs at most one substitution that adds a role missing from `team`.
///
/// Only candidates preferring one of the team's missing roles are considered,
/// searched in [`SEARCH_ORDER`] and in queue order within a tier. Returns the
/// displaced member, or `None` when no valid substitution exists.
pub fn repair_role_diversity(
    team: &mut Team,
    pool: &CandidatePool<'_>,
) -> Option<Participant> {
    let missing = team.roles().missing();
    if missing.is_empty() {
        return None;
    }
    SEARCH_ORDER.into_iter().find_map(|tier| {
        let (candidate, slot) = pool.claim_find_map(tier, |c| {
            if !missing.contains(&c.preferred_role()) {
                return None;
            }
            substitution_slot(team, c)
        })?;
        Some(team.replace_member(slot, candidate))
    })
}
