use serde::{Deserialize, Serialize};

use super::{
    game::Game,
    participant::{Participant, ParticipantId},
    personality::TierCounts,
    role::RoleSet,
};

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct TeamId(String);

impl From<&str> for TeamId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl TeamId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returned by [`Team::add_member`]; hands the rejected participant back.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("team {team} is full ({max_size} members), cannot add {}", rejected.id())]
pub struct TeamFullError {
    #[error(not(source))]
    pub team: TeamId,
    #[error(not(source))]
    pub max_size: usize,
    #[error(not(source))]
    pub rejected: Participant,
}

/// Returned when a deserialized team holds more members than its capacity.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("team {team} has {members} members, more than its max size {max_size}")]
pub struct OverfullTeamError {
    #[error(not(source))]
    pub team: TeamId,
    #[error(not(source))]
    pub members: usize,
    #[error(not(source))]
    pub max_size: usize,
}

/// An ordered group of participants with a fixed capacity.
///
/// All derived quantities (average skill, role coverage, tier and game counts)
/// are computed from the current members on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TeamRecord")]
pub struct Team {
    id: TeamId,
    name: String,
    members: Vec<Participant>,
    max_size: usize,
}

impl Team {
    #[must_use]
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>, max_size: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: Vec::with_capacity(max_size),
            max_size,
        }
    }

    /// Team for build slot `slot` (0-based), named `T{slot + 1}`.
    #[must_use]
    pub fn for_slot(slot: usize, max_size: usize) -> Self {
        let n = slot + 1;
        Self::new(format!("T{n}"), format!("Team {n}"), max_size)
    }

    #[must_use]
    pub fn id(&self) -> &TeamId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_size
    }

    pub fn add_member(&mut self, participant: Participant) -> Result<(), TeamFullError> {
        if self.is_full() {
            return Err(TeamFullError {
                team: self.id.clone(),
                max_size: self.max_size,
                rejected: participant,
            });
        }
        self.members.push(participant);
        Ok(())
    }

    pub fn remove_member(&mut self, id: &ParticipantId) -> Option<Participant> {
        let pos = self.members.iter().position(|m| m.id() == id)?;
        Some(self.members.remove(pos))
    }

    /// Puts `participant` in the seat at `index`, returning the previous occupant.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn replace_member(&mut self, index: usize, participant: Participant) -> Participant {
        std::mem::replace(&mut self.members[index], participant)
    }

    /// Removes every member, leaving the team empty.
    pub fn take_members(&mut self) -> Vec<Participant> {
        std::mem::take(&mut self.members)
    }

    #[must_use]
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.members.iter().any(|m| m.id() == id)
    }

    /// Mean skill of the members, or 0.0 for an empty team.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn average_skill(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        let total: u32 = self
            .members
            .iter()
            .map(|m| u32::from(m.skill_level()))
            .sum();
        f64::from(total) / self.members.len() as f64
    }

    #[must_use]
    pub fn roles(&self) -> RoleSet {
        self.members.iter().map(Participant::preferred_role).collect()
    }

    #[must_use]
    pub fn unique_role_count(&self) -> usize {
        self.roles().len()
    }

    #[must_use]
    pub fn count_by_game(&self, game: Game) -> usize {
        self.members
            .iter()
            .filter(|m| m.preferred_game() == game)
            .count()
    }

    #[must_use]
    pub fn tier_counts(&self) -> TierCounts {
        let mut counts = TierCounts::default();
        for member in &self.members {
            counts[member.personality_tier()] += 1;
        }
        counts
    }
}

/// Unvalidated wire shape; deserialization enforces the capacity.
#[derive(Deserialize)]
struct TeamRecord {
    id: TeamId,
    name: String,
    members: Vec<Participant>,
    max_size: usize,
}

impl TryFrom<TeamRecord> for Team {
    type Error = OverfullTeamError;

    fn try_from(record: TeamRecord) -> Result<Self, Self::Error> {
        if record.members.len() > record.max_size {
            return Err(OverfullTeamError {
                team: record.id,
                members: record.members.len(),
                max_size: record.max_size,
            });
        }
        Ok(Self {
            id: record.id,
            name: record.name,
            members: record.members,
            max_size: record.max_size,
        })
    }
}

/// Exchanges `a.members[ia]` and `b.members[ib]`.
///
/// Applying the same call twice restores both teams. Sizes of both teams are
/// unchanged.
pub fn swap_members(a: &mut Team, ia: usize, b: &mut Team, ib: usize) {
    std::mem::swap(&mut a.members[ia], &mut b.members[ib]);
}

/// Mutable references to two distinct teams of a slice.
///
/// # Panics
///
/// Panics if `i == j` or either index is out of bounds.
pub fn pair_mut(teams: &mut [Team], i: usize, j: usize) -> (&mut Team, &mut Team) {
    assert_ne!(i, j, "cannot borrow the same team twice");
    if i < j {
        let (left, right) = teams.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = teams.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}
