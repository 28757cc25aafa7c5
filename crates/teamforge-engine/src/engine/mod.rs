//! Team formation primitives.
//!
//! - [`CandidatePool`] - per-tier shuffled queues with atomic claims
//! - [`TeamBuilder`] - greedy per-slot builder
//! - [`composition`] - personality rule, game cap, and role floor
//! - [`role_repair`] - single corrective substitution for role variety
//! - [`LeftoverDisposition`] - what happens to unseated participants
//! - [`FormationSeed`] / [`RandomnessMode`] - seeded or fresh randomness
//!
//! # Example
//!
//! ```
//! use teamforge_engine::{CandidatePool, Game, Participant, RandomnessMode, Role, TeamBuilder};
//!
//! let participants = vec![
//!     Participant::new("P1", "A", "a@x", Game::Chess, 6, Role::Strategist, 95)?,
//!     Participant::new("P2", "B", "b@x", Game::Fifa, 5, Role::Attacker, 40)?,
//!     Participant::new("P3", "C", "c@x", Game::Dota2, 7, Role::Defender, 80)?,
//! ];
//! let mut rng = RandomnessMode::default().rng();
//! let pool = CandidatePool::new(&participants, &mut rng);
//! let outcome = TeamBuilder::for_participants(3, &participants).build_all(&pool, 1, false);
//!
//! assert_eq!(outcome.teams.len(), 1);
//! assert_eq!(outcome.teams[0].len(), 3);
//! # Ok::<(), teamforge_engine::ParticipantError>(())
//! ```

pub use self::{candidate_pool::*, leftovers::*, seed::*, team_builder::*};

mod candidate_pool;
pub mod composition;
mod leftovers;
pub mod role_repair;
mod seed;
mod team_builder;
