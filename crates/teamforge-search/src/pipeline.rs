use rand::Rng as _;
use serde::{Deserialize, Serialize};
use teamforge_engine::{FormationError, FormationSeed, Participant, RandomnessMode};
use teamforge_evaluator::{balance::SkillBalance, objective::ObjectiveEvaluator};

use crate::{
    DEFAULT_SPREAD_THRESHOLD,
    formation::{Formation, FormationStrategy},
    surgical::{SurgicalConfig, SurgicalReport, SwapPolisher},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on formation attempts.
    pub max_attempts: usize,
    /// Attempts run between early-stop checks.
    pub batch_size: usize,
    /// Stop after a batch once the best spread is within this fraction of the
    /// global average. `None` always runs every attempt.
    pub spread_threshold: Option<f64>,
    pub surgical: SurgicalConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::quick()
    }
}

impl PipelineConfig {
    /// A handful of attempts, then a short surgical pass.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            max_attempts: 15,
            batch_size: 15,
            spread_threshold: None,
            surgical: SurgicalConfig {
                max_swaps: 10,
                stop_below: Some(DEFAULT_SPREAD_THRESHOLD),
                ..SurgicalConfig::default()
            },
        }
    }

    /// Many attempts in batches with early stop, then a longer surgical pass.
    #[must_use]
    pub fn super_balance() -> Self {
        Self {
            max_attempts: 200,
            batch_size: 15,
            spread_threshold: Some(DEFAULT_SPREAD_THRESHOLD),
            surgical: SurgicalConfig {
                max_swaps: 25,
                stop_below: Some(DEFAULT_SPREAD_THRESHOLD),
                ..SurgicalConfig::default()
            },
        }
    }

    /// Reshuffle of an existing result; surgical swaps run to their cap.
    #[must_use]
    pub fn admin_rebalance() -> Self {
        Self {
            max_attempts: 15,
            batch_size: 15,
            spread_threshold: None,
            surgical: SurgicalConfig {
                max_swaps: 25,
                stop_below: None,
                ..SurgicalConfig::default()
            },
        }
    }

    /// Exhaustive reshuffle of an existing result.
    #[must_use]
    pub fn admin_super_balance() -> Self {
        Self {
            max_attempts: 200,
            batch_size: 15,
            spread_threshold: Some(DEFAULT_SPREAD_THRESHOLD),
            surgical: SurgicalConfig {
                max_swaps: 50,
                stop_below: None,
                ..SurgicalConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PipelineError {
    #[display("no baseline given and no attempts configured")]
    NoAttempts,
    #[display("all {attempts} formation attempts failed")]
    AllAttemptsFailed {
        attempts: usize,
        #[error(source)]
        last_error: FormationError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub formation: Formation,
    /// Score of the baseline, or [`f64::MAX`] without one.
    pub initial_score: f64,
    /// Best score before the surgical pass.
    pub best_attempt_score: f64,
    /// Score after the surgical pass.
    pub final_score: f64,
    pub attempts: usize,
    /// Attempts that beat the best score so far.
    pub improvements: usize,
    pub early_stopped: bool,
    pub surgical: SurgicalReport,
}

/// Runs a formation strategy repeatedly and keeps the lowest-scoring result.
///
/// In [`RandomnessMode::Seeded`] each attempt's seed is drawn from a master
/// generator seeded with the run seed, so a whole run is reproducible. In
/// [`RandomnessMode::Random`] every attempt draws fresh entropy.
///
/// Failed attempts are logged and skipped. The winner then goes through the
/// [`SwapPolisher`].
#[derive(Debug)]
pub struct AttemptPipeline<S, O, P> {
    strategy: S,
    objective: O,
    polisher: P,
    config: PipelineConfig,
}

impl<S, O, P> AttemptPipeline<S, O, P>
where
    S: FormationStrategy,
    O: ObjectiveEvaluator,
    P: SwapPolisher,
{
    #[must_use]
    pub fn new(strategy: S, objective: O, polisher: P, config: PipelineConfig) -> Self {
        Self {
            strategy,
            objective,
            polisher,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn objective(&self) -> &O {
        &self.objective
    }

    /// Searches for the best formation, starting from `baseline` if given.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no baseline and every attempt failed.
    pub fn run(
        &self,
        participants: &[Participant],
        team_size: usize,
        mode: RandomnessMode,
        baseline: Option<Formation>,
    ) -> Result<PipelineOutcome, PipelineError> {
        let mut best = baseline.map(|formation| {
            let score = self.objective.evaluate(&formation.teams);
            (formation, score)
        });
        let initial_score = best.as_ref().map_or(f64::MAX, |(_, score)| *score);
        let mut seeds = mode.seed().map(FormationSeed::rng);
        let batch_size = self.config.batch_size.max(1);

        let mut attempts = 0;
        let mut improvements = 0;
        let mut early_stopped = false;
        let mut last_error = None;

        tracing::info!(
            %mode,
            max_attempts = self.config.max_attempts,
            batch_size,
            initial_score,
            "starting attempt pipeline"
        );

        while attempts < self.config.max_attempts {
            let run = batch_size.min(self.config.max_attempts - attempts);
            for _ in 0..run {
                attempts += 1;
                let attempt_mode = match &mut seeds {
                    Some(rng) => RandomnessMode::Seeded(rng.random()),
                    None => RandomnessMode::Random,
                };
                match self.strategy.form(participants, team_size, attempt_mode) {
                    Ok(candidate) => {
                        let score = self.objective.evaluate(&candidate.teams);
                        let best_score = best.as_ref().map_or(f64::MAX, |(_, s)| *s);
                        if score < best_score {
                            tracing::info!(
                                attempt = attempts,
                                score,
                                previous = best_score,
                                "new best formation"
                            );
                            improvements += 1;
                            best = Some((candidate, score));
                        } else {
                            tracing::debug!(attempt = attempts, score, "attempt not better");
                        }
                    }
                    Err(error) => {
                        tracing::warn!(attempt = attempts, %error, "formation attempt failed");
                        last_error = Some(error);
                    }
                }
            }

            if let Some(threshold) = self.config.spread_threshold
                && let Some((formation, _)) = &best
                && SkillBalance::of(&formation.teams).is_some_and(|b| b.spread_within(threshold))
            {
                tracing::info!(attempts, threshold, "spread within threshold, stopping early");
                early_stopped = true;
                break;
            }
        }

        let Some((mut formation, best_attempt_score)) = best else {
            return Err(match last_error {
                Some(last_error) => PipelineError::AllAttemptsFailed { attempts, last_error },
                None => PipelineError::NoAttempts,
            });
        };
        let surgical = self.polisher.polish(&mut formation.teams);
        let final_score = self.objective.evaluate(&formation.teams);
        tracing::info!(
            attempts,
            improvements,
            best_attempt_score,
            final_score,
            surgical_swaps = surgical.swaps.len(),
            "attempt pipeline finished"
        );

        Ok(PipelineOutcome {
            formation,
            initial_score,
            best_attempt_score,
            final_score,
            attempts,
            improvements,
            early_stopped,
            surgical,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use teamforge_engine::{Game, Role};
    use teamforge_evaluator::objective::WeightedObjective;

    use super::*;
    use crate::{
        formation::GreedyFormation,
        surgical::SurgicalSwapper,
    };

    fn participants(n: usize) -> Vec<Participant> {
        let scores = [95, 40, 55, 75, 80, 60, 30, 85, 65, 92, 45, 72];
        (0..n)
            .map(|i| {
                Participant::new(
                    format!("P{i:03}"),
                    format!("Player {i}"),
                    format!("p{i}@example.edu"),
                    Game::ALL[i % Game::LEN],
                    u8::try_from(1 + (i * 7) % 10).unwrap(),
                    Role::ALL[i % Role::LEN],
                    scores[i % scores.len()],
                )
                .unwrap()
            })
            .collect()
    }

    type Greedy = AttemptPipeline<GreedyFormation, WeightedObjective, SurgicalSwapper>;

    fn pipeline(config: PipelineConfig) -> Greedy {
        let surgical = SurgicalSwapper::new(config.surgical.clone());
        let objective = WeightedObjective::default();
        AttemptPipeline::new(GreedyFormation::default(), objective, surgical, config)
    }

    #[derive(Debug, Default)]
    struct FailingStrategy {
        calls: AtomicUsize,
    }

    impl FormationStrategy for FailingStrategy {
        fn form(
            &self,
            _: &[Participant],
            team_size: usize,
            _: RandomnessMode,
        ) -> Result<Formation, FormationError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Err(FormationError::InvalidTeamSize(team_size))
        }
    }

    #[test]
    fn test_presets() {
        let quick = PipelineConfig::quick();
        assert_eq!((quick.max_attempts, quick.surgical.max_swaps), (15, 10));
        assert_eq!(quick.spread_threshold, None);
        assert_eq!(quick.surgical.stop_below, Some(0.10));

        let sup = PipelineConfig::super_balance();
        assert_eq!((sup.max_attempts, sup.batch_size, sup.surgical.max_swaps), (200, 15, 25));

        let admin = PipelineConfig::admin_rebalance();
        assert_eq!((admin.max_attempts, admin.surgical.max_swaps), (15, 25));
        assert_eq!(admin.surgical.stop_below, None);

        let admin_super = PipelineConfig::admin_super_balance();
        assert_eq!(admin_super.surgical.max_swaps, 50);
        assert_eq!(admin_super.spread_threshold, Some(0.10));
        assert_eq!(admin_super.surgical.donor_min_skill, 7);
    }

    #[test]
    fn test_seeded_run_is_reproducible() {
        let input = participants(40);
        let mode = RandomnessMode::default();
        let a = pipeline(PipelineConfig::quick()).run(&input, 5, mode, None).unwrap();
        let b = pipeline(PipelineConfig::quick()).run(&input, 5, mode, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.attempts, 15);
        assert!(a.improvements >= 1);
        assert!(a.best_attempt_score < f64::MAX);
    }

    #[test]
    fn test_participants_conserved() {
        let input = participants(57);
        let outcome = pipeline(PipelineConfig::super_balance())
            .run(&input, 5, RandomnessMode::default(), None)
            .unwrap();
        assert_eq!(outcome.formation.participant_count(), input.len());
        assert!(outcome.attempts <= 200);
        assert!(outcome.early_stopped || outcome.attempts == 200);
    }

    #[test]
    fn test_baseline_kept_when_no_attempt_beats_it() {
        let input = participants(20);
        let baseline = GreedyFormation::default()
            .form(&input, 4, RandomnessMode::default())
            .unwrap();
        let config = PipelineConfig {
            surgical: SurgicalConfig {
                max_swaps: 0,
                ..SurgicalConfig::default()
            },
            ..PipelineConfig::quick()
        };
        let strategy = FailingStrategy::default();
        let pipeline = AttemptPipeline::new(
            strategy,
            WeightedObjective::default(),
            SurgicalSwapper::new(config.surgical.clone()),
            config,
        );

        let outcome = pipeline
            .run(&input, 4, RandomnessMode::default(), Some(baseline.clone()))
            .unwrap();

        assert_eq!(outcome.formation, baseline);
        assert_eq!(outcome.improvements, 0);
        assert_eq!(outcome.initial_score, outcome.best_attempt_score);
        assert_eq!(pipeline.strategy.calls.load(Ordering::Relaxed), 15);
    }

    #[test]
    fn test_all_attempts_failing_without_baseline() {
        let pipeline = AttemptPipeline::new(
            FailingStrategy::default(),
            WeightedObjective::default(),
            SurgicalSwapper::default(),
            PipelineConfig::quick(),
        );
        let error = pipeline
            .run(&participants(10), 0, RandomnessMode::default(), None)
            .unwrap_err();
        assert_eq!(
            error,
            PipelineError::AllAttemptsFailed {
                attempts: 15,
                last_error: FormationError::InvalidTeamSize(0)
            }
        );

        let idle = AttemptPipeline::new(
            FailingStrategy::default(),
            WeightedObjective::default(),
            SurgicalSwapper::default(),
            PipelineConfig {
                max_attempts: 0,
                ..PipelineConfig::quick()
            },
        );
        assert_eq!(
            idle.run(&participants(10), 5, RandomnessMode::default(), None),
            Err(PipelineError::NoAttempts)
        );
    }

    #[test]
    fn test_zero_attempts_returns_polished_baseline() {
        let input = participants(20);
        let baseline = GreedyFormation::default()
            .form(&input, 4, RandomnessMode::default())
            .unwrap();
        let config = PipelineConfig {
            max_attempts: 0,
            ..PipelineConfig::admin_rebalance()
        };
        let outcome = pipeline(config)
            .run(&input, 4, RandomnessMode::default(), Some(baseline))
            .unwrap();
        assert_eq!(outcome.attempts, 0);
        assert_eq!(outcome.improvements, 0);
        assert_eq!(outcome.formation.participant_count(), input.len());
        assert!(outcome.surgical.spread_after <= outcome.surgical.spread_before);
    }
}
