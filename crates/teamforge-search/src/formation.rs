use std::fmt;

use serde::{Deserialize, Serialize};
use teamforge_engine::{
    BuildOutcome, CandidatePool, FormationError, LeftoverDisposition, Participant,
    RandomnessMode, Team, TeamBuilder, TeamId, apply_disposition, composition,
};
use teamforge_evaluator::balance;

use crate::{
    optimizer::{Optimizer, OptimizerConfig},
    rebalancer::{RebalanceConfig, Rebalancer},
};

/// Produces one candidate team set from a participant list.
pub trait FormationStrategy: fmt::Debug + Send + Sync {
    /// Forms teams of `team_size` from `participants`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot fill a single team.
    fn form(
        &self,
        participants: &[Participant],
        team_size: usize,
        mode: RandomnessMode,
    ) -> Result<Formation, FormationError>;
}

/// One complete formation: every input participant is either in `teams` or
/// in `leftovers`, exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Formation {
    pub teams: Vec<Team>,
    pub leftovers: Vec<Participant>,
    /// Slots that could not be built.
    pub failures: Vec<FormationError>,
    /// Teams dissolved after the rebalancer because they still broke a rule.
    pub culled: Vec<TeamId>,
}

impl Formation {
    /// Wraps an existing team set, e.g. a previously saved result.
    #[must_use]
    pub fn from_teams(teams: Vec<Team>, leftovers: Vec<Participant>) -> Self {
        Self {
            teams,
            leftovers,
            ..Self::default()
        }
    }

    /// Number of participants across teams and leftovers.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.teams.iter().map(Team::len).sum::<usize>() + self.leftovers.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    pub leftovers: LeftoverDisposition,
    /// Build slots on worker threads in [`RandomnessMode::Random`].
    pub parallel_build: bool,
    /// Run the skill-balance optimizer after the rebalancer.
    pub optimize: bool,
    pub rebalance: RebalanceConfig,
    pub optimizer: OptimizerConfig,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            leftovers: LeftoverDisposition::default(),
            parallel_build: true,
            optimize: false,
            rebalance: RebalanceConfig::default(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

/// Greedy slot builder followed by the personality rebalancer, the optional
/// optimizer, and leftover handling.
#[derive(Debug, Clone, Default)]
pub struct GreedyFormation {
    config: FormationConfig,
}

impl GreedyFormation {
    #[must_use]
    pub fn new(config: FormationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &FormationConfig {
        &self.config
    }
}

impl FormationStrategy for GreedyFormation {
    fn form(
        &self,
        participants: &[Participant],
        team_size: usize,
        mode: RandomnessMode,
    ) -> Result<Formation, FormationError> {
        FormationError::check_input(team_size, participants.len())?;
        let slots = participants.len() / team_size;
        let parallel = self.config.parallel_build && mode.is_random();
        tracing::info!(%mode, team_size, slots, parallel, "forming teams");

        let mut rng = mode.rng();
        let pool = CandidatePool::new(participants, &mut rng);
        let builder = TeamBuilder::for_participants(team_size, participants);
        let BuildOutcome {
            mut teams,
            released,
            failures,
        } = builder.build_all(&pool, slots, parallel);
        let mut leftovers = pool.into_remaining();
        leftovers.extend(released);

        Rebalancer::new(self.config.rebalance.clone()).rebalance(&mut teams);
        if self.config.optimize {
            Optimizer::new(self.config.optimizer.clone()).optimize(&mut teams);
        }

        let (mut kept, violating): (Vec<_>, Vec<_>) = teams
            .into_iter()
            .partition(|t| !composition::violates(t));
        let culled: Vec<TeamId> = violating.iter().map(|t| t.id().clone()).collect();
        if !violating.is_empty() {
            tracing::info!(count = violating.len(), "dissolving teams that still break a rule");
            for mut team in violating {
                leftovers.extend(team.take_members());
            }
        }

        apply_disposition(self.config.leftovers, &mut kept, &mut leftovers, team_size, &mut rng);
        log_quality(&kept);

        Ok(Formation {
            teams: kept,
            leftovers,
            failures,
            culled,
        })
    }
}

fn log_quality(teams: &[Team]) {
    let global = balance::global_average(teams);
    for team in teams {
        match composition::check(team) {
            Err(shortfall) => {
                tracing::warn!(team = %team.id(), %shortfall, "team breaks a composition rule");
            }
            Ok(()) if !balance::is_valid(team, global) => {
                tracing::warn!(
                    team = %team.id(),
                    average = team.average_skill(),
                    global,
                    "team skill far from the global average"
                );
            }
            Ok(()) => {}
        }
    }
}
