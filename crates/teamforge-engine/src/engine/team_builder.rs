use std::{
    num::NonZeroUsize,
    sync::{
        OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

use crate::{
    CandidatePool, CompositionShortfall, FormationError, Participant, PersonalityTier, Team,
    engine::{composition, role_repair},
};

/// Target skill when there is nobody to average over.
pub const DEFAULT_TARGET_SKILL: f64 = 5.5;

/// Greedy builder for teams of one fixed size.
///
/// Each slot is filled tier by tier, preferring candidates whose skill is
/// closest to `target_skill` among those the game cap admits:
///
/// | size | fill order                                                                  |
/// |------|-----------------------------------------------------------------------------|
/// | 1    | leader, else thinker, else balanced                                         |
/// | 2    | leader + (thinker or balanced); without a leader, thinker + balanced        |
/// | 3    | leader, up to two thinkers, then balanced (topped up from any tier)         |
/// | ≥ 4  | leader, one or two thinkers, balanced, then any tier                        |
///
/// A filled team lacking role variety gets one substitution from the pool
/// (see [`role_repair`]). Slots that still break a rule fail and release
/// every participant they reserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamBuilder {
    team_size: usize,
    target_skill: f64,
}

/// A successfully built team.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltTeam {
    pub team: Team,
    /// Member swapped out by the role-diversity repair, if one happened.
    pub displaced: Option<Participant>,
}

/// A slot that failed, with everyone it had reserved.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotFailure {
    pub error: FormationError,
    pub released: Vec<Participant>,
}

/// Result of building every slot of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutcome {
    /// Built teams in slot order.
    pub teams: Vec<Team>,
    /// Participants released by failed slots or displaced by repairs.
    pub released: Vec<Participant>,
    pub failures: Vec<FormationError>,
}

impl TeamBuilder {
    #[must_use]
    pub fn new(team_size: usize, target_skill: f64) -> Self {
        Self {
            team_size,
            target_skill,
        }
    }

    /// Builder targeting the mean skill of `participants`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn for_participants(team_size: usize, participants: &[Participant]) -> Self {
        let target_skill = if participants.is_empty() {
            DEFAULT_TARGET_SKILL
        } else {
            let total: u32 = participants
                .iter()
                .map(|p| u32::from(p.skill_level()))
                .sum();
            f64::from(total) / participants.len() as f64
        };
        Self::new(team_size, target_skill)
    }

    #[must_use]
    pub fn team_size(&self) -> usize {
        self.team_size
    }

    #[must_use]
    pub fn target_skill(&self) -> f64 {
        self.target_skill
    }

    /// Builds the team for slot `slot` (0-based) from `pool`.
    pub fn build_slot(
        &self,
        slot: usize,
        pool: &CandidatePool<'_>,
    ) -> Result<BuiltTeam, SlotFailure> {
        let mut fill = Fill {
            team: Team::for_slot(slot, self.team_size),
            pool,
            target: self.target_skill,
        };
        let mut displaced = None;
        let result = fill.run(self.team_size).and_then(|()| {
            if !composition::meets_role_floor(&fill.team) {
                displaced = role_repair::repair_role_diversity(&mut fill.team, pool);
            }
            composition::check(&fill.team)
        });

        match result {
            Ok(()) => Ok(BuiltTeam {
                team: fill.team,
                displaced,
            }),
            Err(reason) => Err(fill.release(slot, reason, displaced)),
        }
    }

    /// Builds `slots` teams from `pool`.
    ///
    /// When `parallel`, at most [`thread::available_parallelism`] scoped workers
    /// take slot numbers from a shared counter. Serial builds claim in slot
    /// order and are reproducible for a given pool.
    pub fn build_all(
        &self,
        pool: &CandidatePool<'_>,
        slots: usize,
        parallel: bool,
    ) -> BuildOutcome {
        let results: Vec<_> = if parallel && slots > 1 {
            let workers = thread::available_parallelism()
                .map_or(1, NonZeroUsize::get)
                .min(slots);
            let next = AtomicUsize::new(0);
            let results: Vec<OnceLock<Result<BuiltTeam, SlotFailure>>> =
                (0..slots).map(|_| OnceLock::new()).collect();
            thread::scope(|s| {
                for _ in 0..workers {
                    s.spawn(|| {
                        loop {
                            let slot = next.fetch_add(1, Ordering::Relaxed);
                            let Some(out) = results.get(slot) else {
                                break;
                            };
                            let _ = out.set(self.build_slot(slot, pool));
                        }
                    });
                }
            });
            tracing::debug!(workers, slots, "parallel build finished");
            results.into_iter().filter_map(OnceLock::into_inner).collect()
        } else {
            (0..slots).map(|slot| self.build_slot(slot, pool)).collect()
        };

        let mut outcome = BuildOutcome::default();
        for result in results {
            match result {
                Ok(built) => {
                    outcome.teams.push(built.team);
                    outcome.released.extend(built.displaced);
                }
                Err(failure) => {
                    tracing::debug!(
                        error = %failure.error,
                        released = failure.released.len(),
                        "slot failed"
                    );
                    outcome.failures.push(failure.error);
                    outcome.released.extend(failure.released);
                }
            }
        }
        outcome
    }
}

struct Fill<'p, 'a> {
    team: Team,
    pool: &'p CandidatePool<'a>,
    target: f64,
}

impl Fill<'_, '_> {
    /// Callers claim only while the team has a free seat.
    fn seat(&mut self, participant: Option<Participant>) -> bool {
        let Some(participant) = participant else {
            return false;
        };
        let seated = self.team.add_member(participant);
        debug_assert!(seated.is_ok(), "claimed for a full team: {seated:?}");
        seated.is_ok()
    }

    /// Seats the closest admissible candidate of `tier`.
    fn closest(&mut self, tier: PersonalityTier) -> bool {
        if self.team.is_full() {
            return false;
        }
        let team = &self.team;
        let claimed = self
            .pool
            .claim_closest(tier, self.target, |p| composition::can_add(team, p));
        self.seat(claimed)
    }

    /// Seats the front of any tier that cannot break the leader or thinker limit.
    fn any(&mut self) -> bool {
        if self.team.is_full() {
            return false;
        }
        let counts = self.team.tier_counts();
        let tiers = [
            PersonalityTier::Leader,
            PersonalityTier::Thinker,
            PersonalityTier::Balanced,
        ]
        .into_iter()
        .filter(|tier| match tier {
            PersonalityTier::Leader => counts.leaders() == 0,
            PersonalityTier::Thinker => counts.thinkers() < 2,
            PersonalityTier::Balanced => true,
        });
        let claimed = self.pool.claim_any(tiers);
        self.seat(claimed)
    }

    fn run(&mut self, size: usize) -> Result<(), CompositionShortfall> {
        use PersonalityTier::{Balanced, Leader, Thinker};

        match size {
            1 => {
                let _ = self.closest(Leader) || self.closest(Thinker) || self.closest(Balanced);
            }
            2 => {
                if self.closest(Leader) {
                    let _ = self.closest(Thinker) || self.closest(Balanced);
                } else if self.closest(Thinker) {
                    self.closest(Balanced);
                }
            }
            3 => {
                if !self.closest(Leader) {
                    return Err(CompositionShortfall::MissingLeader);
                }
                let thinkers = (0..2).filter(|_| self.closest(Thinker)).count();
                match thinkers {
                    2 => {}
                    1 => {
                        let _ = self.closest(Balanced) || self.any();
                    }
                    _ => {
                        self.closest(Balanced);
                        self.closest(Balanced);
                        self.any();
                    }
                }
            }
            _ => {
                if !self.closest(Leader) {
                    return Err(CompositionShortfall::MissingLeader);
                }
                let target = if self.pool.tier_len(Thinker) >= 2 {
                    (size - 1).min(2)
                } else {
                    1
                };
                let mut thinkers = 0;
                while thinkers < target && self.closest(Thinker) {
                    thinkers += 1;
                }
                while self.closest(Balanced) {}
                while self.any() {}
            }
        }

        if !self.team.is_full() {
            return Err(CompositionShortfall::PoolExhausted {
                filled: self.team.len(),
                required: size,
            });
        }
        Ok(())
    }

    fn release(
        mut self,
        slot: usize,
        reason: CompositionShortfall,
        displaced: Option<Participant>,
    ) -> SlotFailure {
        let mut released = self.team.take_members();
        released.extend(displaced);
        SlotFailure {
            error: FormationError::TeamFormationFailure { slot, reason },
            released,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::{FormationSeed, Game, ParticipantId, RandomnessMode, Role};

    use super::*;

    fn p(id: &str, game: Game, skill: u8, role: Role, score: u8) -> Participant {
        Participant::new(id, id, format!("{id}@example.edu"), game, skill, role, score).unwrap()
    }

    /// 3 leaders, 6 thinkers, 3 balanced; enough role and game variety for three teams of four.
    fn twelve() -> Vec<Participant> {
        let games = Game::ALL;
        let mut out = vec![];
        for i in 0..3 {
            let skill = 5 + u8::try_from(i).unwrap();
            out.push(p(&format!("L{i}"), games[i], skill, Role::Strategist, 92));
        }
        for i in 0..6 {
            let skill = 3 + u8::try_from(i).unwrap();
            out.push(p(&format!("T{i}"), games[(i + 3) % 7], skill, Role::Attacker, 40));
        }
        for i in 0..3 {
            out.push(p(&format!("B{i}"), games[(i + 5) % 7], 6, Role::Defender, 80));
        }
        out
    }

    fn ids(participants: &[Participant]) -> BTreeSet<ParticipantId> {
        participants.iter().map(|p| p.id().clone()).collect()
    }

    #[test]
    fn test_twelve_participants_make_three_full_teams() {
        let participants = twelve();
        let pool = CandidatePool::new(&participants, &mut FormationSeed::DEFAULT.rng());
        let builder = TeamBuilder::for_participants(4, &participants);
        let outcome = builder.build_all(&pool, 3, false);

        assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);
        assert_eq!(outcome.teams.len(), 3);
        for team in &outcome.teams {
            assert_eq!(team.len(), 4);
            let counts = team.tier_counts();
            assert_eq!(counts.leaders(), 1);
            assert!((1..=2).contains(&counts.thinkers()));
            assert!(team.unique_role_count() >= 3);
        }
        let mut seated: Vec<_> = outcome.teams.iter().flat_map(Team::members).cloned().collect();
        seated.extend(outcome.released);
        seated.extend(pool.into_remaining());
        assert_eq!(seated.len(), 12);
        assert_eq!(ids(&seated), ids(&participants));
    }

    #[test]
    fn test_serial_build_is_reproducible() {
        let participants = twelve();
        let run = || {
            let pool = CandidatePool::new(&participants, &mut FormationSeed::from(9).rng());
            TeamBuilder::for_participants(4, &participants)
                .build_all(&pool, 3, false)
                .teams
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_parallel_build_never_duplicates() {
        let participants = twelve();
        let pool = CandidatePool::new(&participants, &mut FormationSeed::DEFAULT.rng());
        let outcome = TeamBuilder::for_participants(4, &participants).build_all(&pool, 3, true);

        let mut all: Vec<_> = outcome.teams.iter().flat_map(Team::members).cloned().collect();
        all.extend(outcome.released);
        all.extend(pool.into_remaining());
        assert_eq!(all.len(), 12);
        assert_eq!(ids(&all), ids(&participants));
    }

    #[test]
    fn test_parallel_build_with_many_slots() {
        let participants: Vec<_> = (0..20_000)
            .map(|i| {
                let score = [95, 40, 75][i % 3];
                let skill = 1 + u8::try_from(i % 10).unwrap();
                let role = Role::ALL[i % Role::LEN];
                p(&format!("P{i:05}"), Game::ALL[i % Game::LEN], skill, role, score)
            })
            .collect();
        let pool = CandidatePool::new(&participants, &mut RandomnessMode::Random.rng());
        let outcome = TeamBuilder::for_participants(1, &participants).build_all(
            &pool,
            participants.len(),
            true,
        );

        assert!(outcome.failures.is_empty(), "{:?}", outcome.failures.first());
        assert_eq!(outcome.teams.len(), participants.len());
        for (slot, team) in outcome.teams.iter().enumerate() {
            assert_eq!(team.id(), Team::for_slot(slot, 1).id());
            assert_eq!(team.len(), 1);
        }
        let seated: Vec<_> = outcome.teams.iter().flat_map(Team::members).cloned().collect();
        assert!(pool.is_empty());
        assert_eq!(ids(&seated), ids(&participants));
    }

    #[test]
    fn test_missing_leader_releases_reservations() {
        let participants = vec![
            p("T0", Game::Chess, 5, Role::Attacker, 40),
            p("T1", Game::Fifa, 5, Role::Defender, 40),
            p("B0", Game::Dota2, 5, Role::Supporter, 80),
        ];
        let pool = CandidatePool::new(&participants, &mut FormationSeed::DEFAULT.rng());
        let failure = TeamBuilder::new(3, 5.0).build_slot(0, &pool).unwrap_err();
        assert_eq!(
            failure.error,
            FormationError::TeamFormationFailure {
                slot: 0,
                reason: CompositionShortfall::MissingLeader
            }
        );
        assert!(failure.released.is_empty());
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_pool_exhausted_slot_releases_to_leftovers() {
        let participants = vec![
            p("L0", Game::Chess, 5, Role::Strategist, 95),
            p("T0", Game::Fifa, 5, Role::Attacker, 40),
        ];
        let pool = CandidatePool::new(&participants, &mut FormationSeed::DEFAULT.rng());
        let failure = TeamBuilder::new(4, 5.0).build_slot(0, &pool).unwrap_err();
        assert_eq!(
            failure.error,
            FormationError::TeamFormationFailure {
                slot: 0,
                reason: CompositionShortfall::PoolExhausted {
                    filled: 2,
                    required: 4
                }
            }
        );
        assert_eq!(failure.released.len(), 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_any_tier_never_adds_second_leader() {
        let participants = vec![
            p("L0", Game::Chess, 5, Role::Strategist, 95),
            p("L1", Game::Fifa, 5, Role::Defender, 95),
            p("T0", Game::Dota2, 5, Role::Attacker, 40),
            p("B0", Game::Valorant, 5, Role::Supporter, 80),
        ];
        let pool = CandidatePool::new(&participants, &mut FormationSeed::DEFAULT.rng());
        let failure = TeamBuilder::new(4, 5.0).build_slot(0, &pool).unwrap_err();
        assert!(matches!(
            failure.error,
            FormationError::TeamFormationFailure {
                reason: CompositionShortfall::PoolExhausted { filled: 3, .. },
                ..
            }
        ));
        assert_eq!(pool.tier_len(PersonalityTier::Leader), 1);
    }

    #[test]
    fn test_small_teams_use_capacity_role_floor() {
        let participants = vec![
            p("L0", Game::Chess, 5, Role::Strategist, 95),
            p("T0", Game::Fifa, 5, Role::Attacker, 40),
        ];
        let pool = CandidatePool::new(&participants, &mut FormationSeed::DEFAULT.rng());
        let built = TeamBuilder::new(2, 5.0).build_slot(0, &pool).unwrap();
        assert_eq!(built.team.len(), 2);
        assert!(built.displaced.is_none());

        let solo = vec![p("B0", Game::Chess, 5, Role::Supporter, 80)];
        let pool = CandidatePool::new(&solo, &mut FormationSeed::DEFAULT.rng());
        let built = TeamBuilder::new(1, 5.0).build_slot(0, &pool).unwrap();
        assert_eq!(built.team.id().as_str(), "T1");
        assert_eq!(built.team.members()[0].id().as_str(), "B0");
    }

    #[test]
    fn test_role_repair_displaces_to_released() {
        let participants = vec![
            p("L0", Game::Chess, 5, Role::Strategist, 95),
            p("T0", Game::Fifa, 5, Role::Attacker, 40),
            p("B0", Game::Dota2, 5, Role::Attacker, 80),
            p("B1", Game::Valorant, 5, Role::Strategist, 80),
            p("B2", Game::Badminton, 9, Role::Coordinator, 80),
        ];
        let pool = CandidatePool::new(&participants, &mut FormationSeed::DEFAULT.rng());
        // Target skill 5 keeps the skill-9 balanced out of the first fill.
        let outcome = TeamBuilder::new(4, 5.0).build_all(&pool, 1, false);
        assert!(outcome.failures.is_empty());
        let team = &outcome.teams[0];
        assert_eq!(team.unique_role_count(), 3);
        assert!(team.contains(&ParticipantId::from("B2")));
        assert_eq!(outcome.released.len(), 1);
        assert!(pool.is_empty());
    }
}
