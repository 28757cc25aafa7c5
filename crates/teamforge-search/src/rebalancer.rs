//! Swap search that cures personality-rule violations.
//!
//! Each pass visits teams breaking their personality rule in order and looks for
//! one one-for-one swap with another team that leaves both compliant:
//!
//! 1. every member pair between the violator and each other team
//! 2. targeted leader moves (deficit: take a donor's leader; surplus: hand an
//!    extra leader to a leaderless team)
//! 3. targeted thinker moves (deficit: take from a donor with two or more;
//!    surplus: hand an extra thinker to a team with fewer than two)
//!
//! A swap is kept only if the pair's combined deviation from the global
//! average grows by at most [`RebalanceConfig::skill_tolerance`], and neither
//! team drops below a role floor it met before. After each accepted swap the
//! validation pass restarts from the first team.

use serde::{Deserialize, Serialize};
use teamforge_engine::{PersonalityTier, Team, TeamId, composition, pair_mut, swap_members};
use teamforge_evaluator::balance;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalanceConfig {
    /// Upper bound on full passes over the team list.
    pub max_iterations: usize,
    /// Allowed growth of a pair's combined skill deviation per swap.
    pub skill_tolerance: f64,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            skill_tolerance: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebalanceReport {
    pub iterations: usize,
    pub swaps: usize,
    /// Teams that still break a composition rule, in list order.
    pub violating: Vec<TeamId>,
}

#[derive(Debug, Clone, Default)]
pub struct Rebalancer {
    config: RebalanceConfig,
}

impl Rebalancer {
    #[must_use]
    pub fn new(config: RebalanceConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RebalanceConfig {
        &self.config
    }

    /// Repairs personality-rule violations in place.
    ///
    /// Terminates after a pass without changes or after `max_iterations` passes.
    /// Remaining violators are reported, not removed.
    pub fn rebalance(&self, teams: &mut [Team]) -> RebalanceReport {
        let mut report = RebalanceReport::default();
        if teams.is_empty() {
            return report;
        }

        let mut global = balance::global_average(teams);
        loop {
            report.iterations += 1;
            let mut changed = false;
            for target in 0..teams.len() {
                if composition::team_satisfies_personality_rule(&teams[target]) {
                    continue;
                }
                if self.fix_team(teams, target, global) {
                    changed = true;
                    report.swaps += 1;
                    global = balance::global_average(teams);
                    break;
                }
            }
            if !changed || report.iterations >= self.config.max_iterations {
                break;
            }
        }

        report.violating = teams
            .iter()
            .filter(|t| composition::violates(t))
            .map(|t| t.id().clone())
            .collect();
        tracing::info!(
            iterations = report.iterations,
            swaps = report.swaps,
            violating = report.violating.len(),
            "rebalancer finished"
        );
        report
    }

    fn fix_team(&self, teams: &mut [Team], target: usize, global: f64) -> bool {
        for donor in 0..teams.len() {
            if donor == target {
                continue;
            }
            for a in 0..teams[target].len() {
                for b in 0..teams[donor].len() {
                    if self.try_swap(teams, target, a, donor, b, global) {
                        return true;
                    }
                }
            }
        }
        self.leader_move(teams, target, global) || self.thinker_move(teams, target, global)
    }

    fn leader_move(&self, teams: &mut [Team], target: usize, global: f64) -> bool {
        let leaders = teams[target].tier_counts().leaders();
        match leaders {
            0 => self.import_tier(teams, target, global, PersonalityTier::Leader, 1),
            1 => false,
            _ => self.export_tier(teams, target, global, PersonalityTier::Leader, 1),
        }
    }

    fn thinker_move(&self, teams: &mut [Team], target: usize, global: f64) -> bool {
        let thinkers = teams[target].tier_counts().thinkers();
        match thinkers {
            0 => self.import_tier(teams, target, global, PersonalityTier::Thinker, 2),
            1 | 2 => false,
            _ => self.export_tier(teams, target, global, PersonalityTier::Thinker, 2),
        }
    }

    /// Brings one `tier` member into `target` from a donor holding at least `donor_min`.
    fn import_tier(
        &self,
        teams: &mut [Team],
        target: usize,
        global: f64,
        tier: PersonalityTier,
        donor_min: usize,
    ) -> bool {
        for donor in 0..teams.len() {
            if donor == target || teams[donor].tier_counts()[tier] < donor_min {
                continue;
            }
            let Some(incoming) = position_of(&teams[donor], |t| t == tier) else {
                continue;
            };
            let Some(outbound) = position_of(&teams[target], |t| t != tier) else {
                continue;
            };
            if self.try_swap(teams, target, outbound, donor, incoming, global) {
                return true;
            }
        }
        false
    }

    /// Hands each surplus `tier` member of `target` to a receiver holding
    /// fewer than `receiver_max`.
    fn export_tier(
        &self,
        teams: &mut [Team],
        target: usize,
        global: f64,
        tier: PersonalityTier,
        receiver_max: usize,
    ) -> bool {
        let extras: Vec<usize> = (0..teams[target].len())
            .filter(|&i| teams[target].members()[i].personality_tier() == tier)
            .collect();
        for extra in extras {
            for receiver in 0..teams.len() {
                if receiver == target || teams[receiver].tier_counts()[tier] >= receiver_max {
                    continue;
                }
                let Some(outbound) = position_of(&teams[receiver], |t| t != tier) else {
                    continue;
                };
                if self.try_swap(teams, target, extra, receiver, outbound, global) {
                    return true;
                }
            }
        }
        false
    }

    /// Swaps `teams[i].members[a]` with `teams[j].members[b]`, undoing it unless accepted.
    fn try_swap(
        &self,
        teams: &mut [Team],
        i: usize,
        a: usize,
        j: usize,
        b: usize,
        global: f64,
    ) -> bool {
        let (x, y) = pair_mut(teams, i, j);
        let before = balance::pair_deviation(x, y, global);
        let floors = (
            composition::meets_role_floor(x),
            composition::meets_role_floor(y),
        );

        swap_members(x, a, y, b);

        let accepted = composition::team_satisfies_personality_rule(x)
            && composition::team_satisfies_personality_rule(y)
            && balance::pair_deviation(x, y, global) <= before + self.config.skill_tolerance
            && (!floors.0 || composition::meets_role_floor(x))
            && (!floors.1 || composition::meets_role_floor(y));
        if accepted {
            tracing::debug!(
                team = %x.id(),
                other = %y.id(),
                incoming = %x.members()[a].id(),
                outgoing = %y.members()[b].id(),
                "rebalancer swap"
            );
        } else {
            swap_members(x, a, y, b);
        }
        accepted
    }
}

fn position_of<F>(team: &Team, mut pred: F) -> Option<usize>
where
    F: FnMut(PersonalityTier) -> bool,
{
    team.members()
        .iter()
        .position(|m| pred(m.personality_tier()))
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

    #[test]
    fn test_two_leaders_and_no_leader_fixed_by_one_swap() {
        let mut teams = vec![
            team(
                "T1",
                &[
                    (5, Role::Strategist, 95),
                    (5, Role::Attacker, 92),
                    (5, Role::Defender, 40),
                    (5, Role::Supporter, 80),
                ],
            ),
            team(
                "T2",
                &[
                    (5, Role::Strategist, 40),
                    (5, Role::Attacker, 30),
                    (5, Role::Defender, 75),
                    (5, Role::Coordinator, 75),
                ],
            ),
        ];

        let report = Rebalancer::default().rebalance(&mut teams);

        assert_eq!(report.swaps, 1);
        assert!(report.violating.is_empty());
        for t in &teams {
            assert!(composition::team_satisfies_personality_rule(t));
            assert_eq!(t.len(), 4);
            assert!(t.unique_role_count() >= 3);
        }
    }

    #[test]
    fn test_swap_stays_within_skill_tolerance() {
        let mut teams = vec![
            team(
                "T1",
                &[
                    (4, Role::Strategist, 95),
                    (9, Role::Attacker, 95),
                    (4, Role::Defender, 40),
                    (4, Role::Supporter, 80),
                ],
            ),
            team(
                "T2",
                &[
                    (6, Role::Strategist, 40),
                    (6, Role::Attacker, 40),
                    (5, Role::Defender, 75),
                    (5, Role::Coordinator, 75),
                ],
            ),
        ];
        let global = balance::global_average(&teams);
        let before = balance::pair_deviation(&teams[0], &teams[1], global);

        let report = Rebalancer::default().rebalance(&mut teams);

        assert!(report.violating.is_empty());
        let after = balance::pair_deviation(&teams[0], &teams[1], global);
        assert!(after <= before + 0.5, "{after} > {before} + 0.5");
        assert_eq!(teams[0].len() + teams[1].len(), 8);
    }

    #[test]
    fn test_unfixable_team_is_reported() {
        // Three leaders and nobody to take them.
        let mut teams = vec![team(
            "T1",
            &[
                (5, Role::Strategist, 95),
                (5, Role::Attacker, 95),
                (5, Role::Defender, 95),
                (5, Role::Supporter, 40),
            ],
        )];
        let report = Rebalancer::default().rebalance(&mut teams);
        assert_eq!(report.swaps, 0);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.violating, [TeamId::from("T1")]);
    }

    #[test]
    fn test_iteration_cap() {
        let three_leaders = [
            (5, Role::Strategist, 95),
            (5, Role::Attacker, 95),
            (5, Role::Defender, 95),
        ];
        let mut teams = vec![team("T1", &three_leaders), team("T2", &three_leaders)];
        let rebalancer = Rebalancer::new(RebalanceConfig {
            max_iterations: 3,
            ..RebalanceConfig::default()
        });
        let report = rebalancer.rebalance(&mut teams);
        assert!(report.iterations <= 3);
        assert_eq!(report.violating.len(), 2);
    }
}
