//! Data model and greedy team construction.
//!
//! - [`core`]: participants, teams, personality tiers, roles, and games
//! - [`engine`]: candidate pool, composition rules, the per-slot team builder,
//!   role-diversity repair, and leftover handling

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Why a team slot could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CompositionShortfall {
    #[display("no leader available")]
    MissingLeader,
    #[display("pool exhausted with {filled} of {required} members seated")]
    PoolExhausted { filled: usize, required: usize },
    #[display("personality rule not met ({counts})")]
    PersonalityRule {
        #[error(not(source))]
        counts: TierCounts,
    },
    #[display("only {roles} distinct roles, need {required}")]
    RoleDiversity { roles: usize, required: usize },
}

#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum FormationError {
    #[display("need at least {required} participants to form a team, got {available}")]
    InsufficientParticipants { required: usize, available: usize },
    #[display("invalid team size {_0}: must be at least 1")]
    InvalidTeamSize(#[error(not(source))] usize),
    #[display("team slot {slot} could not be formed: {reason}")]
    TeamFormationFailure {
        slot: usize,
        #[error(source)]
        reason: CompositionShortfall,
    },
}

impl FormationError {
    /// Checks that `available` participants can fill at least one team of `team_size`.
    pub fn check_input(team_size: usize, available: usize) -> Result<(), Self> {
        if team_size == 0 {
            return Err(Self::InvalidTeamSize(team_size));
        }
        if available < team_size {
            return Err(Self::InsufficientParticipants {
                required: team_size,
                available,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_check_input() {
        assert_eq!(
            FormationError::check_input(0, 10),
            Err(FormationError::InvalidTeamSize(0))
        );
        assert_eq!(
            FormationError::check_input(4, 3),
            Err(FormationError::InsufficientParticipants {
                required: 4,
                available: 3
            })
        );
        assert!(FormationError::check_input(4, 4).is_ok());
    }

    #[test]
    fn test_failure_exposes_reason_as_source() {
        let err = FormationError::TeamFormationFailure {
            slot: 2,
            reason: CompositionShortfall::MissingLeader,
        };
        assert_eq!(
            err.to_string(),
            "team slot 2 could not be formed: no leader available"
        );
        assert!(err.source().is_some());
    }
}
