//! Objective score for comparing candidate formations.

use std::fmt;

use serde::{Deserialize, Serialize};
use teamforge_engine::{Team, composition};

use crate::balance::{self, SkillBalance};

/// Scores a team set; lower is better.
///
/// Implementations must be pure: scoring the same teams twice yields the same value.
pub trait ObjectiveEvaluator: fmt::Debug + Send + Sync {
    fn evaluate(&self, teams: &[Team]) -> f64;
}

impl<T> ObjectiveEvaluator for Box<T>
where
    T: ObjectiveEvaluator + ?Sized,
{
    fn evaluate(&self, teams: &[Team]) -> f64 {
        (**self).evaluate(teams)
    }
}

/// Weighted sum of skill deviation, personality violations, and role gaps.
///
/// ```text
/// score = skill_weight       * mean |avg - global|
///       + personality_weight * personality_penalty * (violating teams)
///       + role_weight        * Σ max(0, role_target - distinct roles) * role_gap_penalty
/// ```
///
/// An empty team set scores [`f64::MAX`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightedObjective {
    pub skill_weight: f64,
    pub personality_weight: f64,
    pub personality_penalty: f64,
    pub role_weight: f64,
    pub role_target: usize,
    pub role_gap_penalty: f64,
}

impl Default for WeightedObjective {
    fn default() -> Self {
        Self {
            skill_weight: 1.0,
            personality_weight: 1.5,
            personality_penalty: 10.0,
            role_weight: 1.0,
            role_target: composition::MIN_ROLES,
            role_gap_penalty: 2.0,
        }
    }
}

/// The three unweighted components of a [`WeightedObjective`] score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveBreakdown {
    pub skill: f64,
    pub personality: f64,
    pub roles: f64,
}

impl WeightedObjective {
    /// Unweighted components for a non-empty team set.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn breakdown(&self, teams: &[Team]) -> Option<ObjectiveBreakdown> {
        let balance = SkillBalance::of(teams)?;
        let violating = teams
            .iter()
            .filter(|t| !composition::team_satisfies_personality_rule(t))
            .count();
        let role_gaps: usize = teams
            .iter()
            .map(|t| self.role_target.saturating_sub(t.unique_role_count()))
            .sum();
        Some(ObjectiveBreakdown {
            skill: balance.mean_abs_deviation,
            personality: violating as f64 * self.personality_penalty,
            roles: role_gaps as f64 * self.role_gap_penalty,
        })
    }

    #[must_use]
    pub fn combine(&self, breakdown: &ObjectiveBreakdown) -> f64 {
        breakdown.skill * self.skill_weight
            + breakdown.personality * self.personality_weight
            + breakdown.roles * self.role_weight
    }
}

impl ObjectiveEvaluator for WeightedObjective {
    fn evaluate(&self, teams: &[Team]) -> f64 {
        self.breakdown(teams)
            .map_or(f64::MAX, |breakdown| self.combine(&breakdown))
    }
}

/// Objective that only looks at the skill spread across teams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpreadObjective;

impl ObjectiveEvaluator for SpreadObjective {
    fn evaluate(&self, teams: &[Team]) -> f64 {
        if teams.is_empty() {
            f64::MAX
        } else {
            balance::spread(teams)
        }
    }
}

#[cfg(test)]
mod tests {
    use teamforge_engine::{Game, Participant, Role};

    use super::*;

    fn team(id: &str, members: &[(u8, Role, u8)]) -> Team {
        let mut t = Team::new(id, id, members.len());
        for (i, &(skill, role, score)) in members.iter().enumerate() {
            let p = Participant::new(
                format!("{id}-{i}"),
                "n",
                "e@example.edu",
                Game::ALL[i],
                skill,
                role,
                score,
            )
            .unwrap();
            t.add_member(p).unwrap();
        }
        t
    }

    fn valid(id: &str, skill: u8) -> Team {
        team(
            id,
            &[
                (skill, Role::Strategist, 95),
                (skill, Role::Attacker, 40),
                (skill, Role::Defender, 75),
                (skill, Role::Supporter, 75),
            ],
        )
    }

    #[test]
    fn test_empty_scores_max() {
        assert_eq!(WeightedObjective::default().evaluate(&[]), f64::MAX);
        assert_eq!(SpreadObjective.evaluate(&[]), f64::MAX);
    }

    #[test]
    fn test_balanced_valid_teams_score_zero() {
        let teams = [valid("A", 5), valid("B", 5)];
        assert_eq!(WeightedObjective::default().evaluate(&teams), 0.0);
    }

    #[test]
    fn test_penalties_add_up() {
        // Skill: averages 4 and 6, mean deviation 1.0.
        // Personality: B has two leaders -> 10 * 1.5.
        // Roles: B covers two roles -> (3 - 2) * 2.
        let teams = [
            valid("A", 4),
            team(
                "B",
                &[
                    (6, Role::Strategist, 95),
                    (6, Role::Strategist, 95),
                    (6, Role::Attacker, 40),
                    (6, Role::Attacker, 75),
                ],
            ),
        ];
        let objective = WeightedObjective::default();
        let breakdown = objective.breakdown(&teams).unwrap();
        assert!((breakdown.skill - 1.0).abs() < 1e-12);
        assert!((breakdown.personality - 10.0).abs() < 1e-12);
        assert!((breakdown.roles - 2.0).abs() < 1e-12);
        assert!((objective.evaluate(&teams) - 18.0).abs() < 1e-12);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let teams = [valid("A", 3), valid("B", 7), valid("C", 5)];
        let objective = WeightedObjective::default();
        assert_eq!(objective.evaluate(&teams), objective.evaluate(&teams));
        assert!((SpreadObjective.evaluate(&teams) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_boxed_objective_delegates() {
        let teams = [valid("A", 3), valid("B", 7)];
        let boxed: Box<dyn ObjectiveEvaluator> = Box::new(SpreadObjective);
        assert!((boxed.evaluate(&teams) - 4.0).abs() < 1e-12);
        assert_eq!(boxed.evaluate(&[]), f64::MAX);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let objective: WeightedObjective =
            serde_json::from_str(r#"{ "personality_weight": 3.0 }"#).unwrap();
        assert_eq!(objective.personality_weight, 3.0);
        assert_eq!(objective.role_target, 3);
    }
}
