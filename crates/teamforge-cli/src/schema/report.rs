use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teamforge_engine::{FormationSeed, Participant, Team, TeamId};
use teamforge_evaluator::{balance, objective::ObjectiveEvaluator};
use teamforge_search::formation::Formation;

/// Saved result of a formation or reshuffle run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationReport {
    /// Timestamp when the teams were formed (ISO 8601 format)
    pub formed_at: DateTime<Utc>,
    /// Requested members per team
    pub team_size: usize,
    /// Seed of the run, absent for unseeded runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<FormationSeed>,
    /// Objective score of `teams` (lower is better)
    pub objective: f64,
    /// Highest team average skill minus lowest
    pub spread: f64,
    pub teams: Vec<Team>,
    pub leftovers: Vec<Participant>,
    /// Team slots that could not be built
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
    /// Teams dissolved because they still broke a composition rule
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub culled: Vec<TeamId>,
}

impl FormationReport {
    pub fn new(
        formation: Formation,
        team_size: usize,
        seed: Option<FormationSeed>,
        objective: &dyn ObjectiveEvaluator,
    ) -> Self {
        Self {
            formed_at: Utc::now(),
            team_size,
            seed,
            objective: objective.evaluate(&formation.teams),
            spread: balance::spread(&formation.teams),
            failures: formation.failures.iter().map(ToString::to_string).collect(),
            culled: formation.culled,
            teams: formation.teams,
            leftovers: formation.leftovers,
        }
    }

    /// Teams and leftovers as a pipeline baseline.
    pub fn into_formation(self) -> Formation {
        Formation::from_teams(self.teams, self.leftovers)
    }

    /// Every participant in the report, teams first.
    pub fn participants(&self) -> Vec<Participant> {
        self.teams
            .iter()
            .flat_map(Team::members)
            .chain(&self.leftovers)
            .cloned()
            .collect()
    }

    pub fn print_summary(&self) {
        eprintln!("Teams formed: {}", self.teams.len());
        for team in &self.teams {
            eprintln!(
                "  {:>6} {:<16} size {} avg {:.2} roles {} {}",
                team.id(),
                team.name(),
                team.len(),
                team.average_skill(),
                team.unique_role_count(),
                team.tier_counts(),
            );
        }
        eprintln!("Leftovers: {}", self.leftovers.len());
        if !self.failures.is_empty() {
            eprintln!("Failed slots: {}", self.failures.len());
        }
        if !self.culled.is_empty() {
            eprintln!("Dissolved teams: {}", self.culled.len());
        }
        eprintln!("Objective: {:.3}", self.objective);
        eprintln!("Spread: {:.3}", self.spread);
    }
}
