//! Pairwise swap search that trades members between teams to improve balance.
//!
//! For every pair of teams where at least one is not well balanced, candidate
//! swaps are tried in priority order:
//!
//! 1. [`SwapPriority::RoleGap`] - the swap shrinks the pair's role deficit
//! 2. [`SwapPriority::Personality`] - the swap cures a personality violation
//! 3. [`SwapPriority::SkillSpread`] - the swap strictly lowers the pair's
//!    combined deviation from the global average
//!
//! A swap is kept only if both teams are valid afterwards; otherwise it is
//! reverted immediately.

use serde::{Deserialize, Serialize};
use teamforge_engine::{Team, composition, pair_mut, swap_members};
use teamforge_evaluator::balance;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub max_iterations: usize,
    /// Upper bound on swaps tried, accepted or not.
    pub max_attempts: usize,
    pub well_balanced_fraction: f64,
    pub valid_fraction: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            max_attempts: 10_000,
            well_balanced_fraction: balance::WELL_BALANCED_FRACTION,
            valid_fraction: balance::VALID_FRACTION,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    pub iterations: usize,
    pub attempts: usize,
    pub accepted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SwapPriority {
    #[display("role gap")]
    RoleGap,
    #[display("personality")]
    Personality,
    #[display("skill spread")]
    SkillSpread,
}

impl SwapPriority {
    pub const ALL: [Self; 3] = [Self::RoleGap, Self::Personality, Self::SkillSpread];

    fn improves(self, before: &PairState, after: &PairState) -> bool {
        match self {
            Self::RoleGap => after.role_deficit < before.role_deficit,
            Self::Personality => after.personality_violations < before.personality_violations,
            Self::SkillSpread => after.deviation < before.deviation,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PairState {
    role_deficit: usize,
    personality_violations: usize,
    deviation: f64,
}

impl PairState {
    fn of(a: &Team, b: &Team, global: f64) -> Self {
        let deficit = |t: &Team| {
            composition::role_floor(t.max_size()).saturating_sub(t.unique_role_count())
        };
        let violation = |t: &Team| usize::from(!composition::team_satisfies_personality_rule(t));
        Self {
            role_deficit: deficit(a) + deficit(b),
            personality_violations: violation(a) + violation(b),
            deviation: balance::pair_deviation(a, b, global),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    #[must_use]
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Improves `teams` in place. Never changes team sizes.
    pub fn optimize(&self, teams: &mut [Team]) -> OptimizeReport {
        let mut report = OptimizeReport::default();
        let n = teams.len();
        'outer: while report.iterations < self.config.max_iterations {
            report.iterations += 1;
            let mut improved = false;
            for i in 0..n {
                for j in (i + 1)..n {
                    if report.attempts >= self.config.max_attempts {
                        break 'outer;
                    }
                    let global = balance::global_average(teams);
                    if self.is_well_balanced(&teams[i], global)
                        && self.is_well_balanced(&teams[j], global)
                    {
                        continue;
                    }
                    if let Some(priority) = self.improve_pair(teams, i, j, &mut report.attempts) {
                        tracing::debug!(
                            team = %teams[i].id(),
                            other = %teams[j].id(),
                            %priority,
                            "optimizer swap"
                        );
                        report.accepted += 1;
                        improved = true;
                    }
                }
            }
            if !improved {
                break;
            }
        }
        tracing::info!(
            iterations = report.iterations,
            attempts = report.attempts,
            accepted = report.accepted,
            "optimizer finished"
        );
        report
    }

    fn is_well_balanced(&self, team: &Team, global: f64) -> bool {
        balance::is_balanced_within(team, global, self.config.well_balanced_fraction)
    }

    fn improve_pair(
        &self,
        teams: &mut [Team],
        i: usize,
        j: usize,
        attempts: &mut usize,
    ) -> Option<SwapPriority> {
        for priority in SwapPriority::ALL {
            let global = balance::global_average(teams);
            let before = PairState::of(&teams[i], &teams[j], global);
            for a in 0..teams[i].len() {
                for b in 0..teams[j].len() {
                    if *attempts >= self.config.max_attempts {
                        return None;
                    }
                    *attempts += 1;
                    if self.try_swap(teams, (i, a), (j, b), priority, &before) {
                        return Some(priority);
                    }
                }
            }
        }
        None
    }

    fn try_swap(
        &self,
        teams: &mut [Team],
        (i, a): (usize, usize),
        (j, b): (usize, usize),
        priority: SwapPriority,
        before: &PairState,
    ) -> bool {
        swap_at(teams, (i, a), (j, b));
        let global = balance::global_average(teams);
        let after = PairState::of(&teams[i], &teams[j], global);
        let valid = balance::is_balanced_within(&teams[i], global, self.config.valid_fraction)
            && balance::is_balanced_within(&teams[j], global, self.config.valid_fraction);
        if valid && priority.improves(before, &after) {
            return true;
        }
        swap_at(teams, (i, a), (j, b));
        false
    }
}

fn swap_at(teams: &mut [Team], (i, a): (usize, usize), (j, b): (usize, usize)) {
    let (x, y) = pair_mut(teams, i, j);
    swap_members(x, a, y, b);
}
