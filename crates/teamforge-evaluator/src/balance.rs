//! Skill-balance metrics over a team set.

use teamforge_engine::{Team, composition};
use teamforge_stats::descriptive::DescriptiveStats;

/// Fraction of the global average within which a team counts as well balanced.
pub const WELL_BALANCED_FRACTION: f64 = 0.15;
/// Fraction of the global average within which a team is still acceptable.
pub const VALID_FRACTION: f64 = 0.20;

/// Summary of team-average skills across a set of teams.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillBalance {
    /// Mean of team averages.
    pub global_average: f64,
    /// Highest team average minus lowest.
    pub spread: f64,
    /// Mean of `|team average - global average|`.
    pub mean_abs_deviation: f64,
    pub stats: DescriptiveStats,
}

impl SkillBalance {
    /// Returns `None` for an empty team set.
    #[must_use]
    pub fn of(teams: &[Team]) -> Option<Self> {
        let stats = DescriptiveStats::new(teams.iter().map(Team::average_skill))?;
        Some(Self {
            global_average: stats.mean,
            spread: stats.range(),
            mean_abs_deviation: stats.mean_abs_dev,
            stats,
        })
    }

    /// Whether the spread is at most `fraction` of a positive global average.
    #[must_use]
    pub fn spread_within(&self, fraction: f64) -> bool {
        self.global_average > 0.0 && self.spread <= self.global_average * fraction
    }
}

/// Mean of team averages, or 0.0 for an empty set.
#[must_use]
pub fn global_average(teams: &[Team]) -> f64 {
    SkillBalance::of(teams).map_or(0.0, |b| b.global_average)
}

/// Highest team average minus lowest, or 0.0 for an empty set.
#[must_use]
pub fn spread(teams: &[Team]) -> f64 {
    SkillBalance::of(teams).map_or(0.0, |b| b.spread)
}

#[must_use]
pub fn deviation(team: &Team, global_average: f64) -> f64 {
    (team.average_skill() - global_average).abs()
}

/// Combined deviation of two teams.
#[must_use]
pub fn pair_deviation(a: &Team, b: &Team, global_average: f64) -> f64 {
    deviation(a, global_average) + deviation(b, global_average)
}

/// Whether `team` meets its composition rules and sits within `fraction` of
/// the global average.
#[must_use]
pub fn is_balanced_within(team: &Team, global_average: f64, fraction: f64) -> bool {
    deviation(team, global_average) <= global_average * fraction
        && composition::meets_role_floor(team)
        && composition::team_satisfies_personality_rule(team)
}

#[must_use]
pub fn is_well_balanced(team: &Team, global_average: f64) -> bool {
    is_balanced_within(team, global_average, WELL_BALANCED_FRACTION)
}

#[must_use]
pub fn is_valid(team: &Team, global_average: f64) -> bool {
    is_balanced_within(team, global_average, VALID_FRACTION)
}
