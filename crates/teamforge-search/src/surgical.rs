//! Targeted strong-for-weak swaps that narrow the skill spread.

use std::fmt;

use serde::{Deserialize, Serialize};
use teamforge_engine::{ParticipantId, Team, TeamId, composition, pair_mut, swap_members};
use teamforge_evaluator::balance::{self, SkillBalance};

const SPREAD_EPSILON: f64 = 1e-9;

/// Post-processing pass over an already formed team set.
pub trait SwapPolisher: fmt::Debug + Send + Sync {
    fn polish(&self, teams: &mut [Team]) -> SurgicalReport;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurgicalConfig {
    /// Upper bound on accepted swaps.
    pub max_swaps: usize,
    /// Donor members must have at least this skill.
    pub donor_min_skill: u8,
    /// Stop before a pass once the spread is within this fraction of the global average.
    pub stop_below: Option<f64>,
}

impl Default for SurgicalConfig {
    fn default() -> Self {
        Self {
            max_swaps: 10,
            donor_min_skill: 7,
            stop_below: Some(crate::DEFAULT_SPREAD_THRESHOLD),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurgicalSwap {
    pub weak_team: TeamId,
    pub donor_team: TeamId,
    /// Moved from the weak team to the donor.
    pub weak_member: ParticipantId,
    /// Moved from the donor to the weak team.
    pub donor_member: ParticipantId,
    pub spread_after: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurgicalReport {
    pub swaps: Vec<SurgicalSwap>,
    pub spread_before: f64,
    pub spread_after: f64,
    /// Whether the pass stopped because the spread fell below `stop_below`.
    pub reached_threshold: bool,
}

/// Repeatedly trades the weakest team's weakest member for a strong member
/// of an above-average team.
///
/// Each pass:
///
/// 1. picks the team with the lowest average (first on ties) and its
///    lowest-skill member
/// 2. lists donor teams whose average is above the global average and that
///    hold a member of at least [`SurgicalConfig::donor_min_skill`], strongest
///    average first
/// 3. tries each donor's qualifying members, strongest first, and keeps the
///    first swap that leaves both teams within the composition rules and
///    either shrinks the spread or keeps it while pulling the weak team closer
///    to the global average
///
/// The pass loop ends when no swap is accepted or `max_swaps` is reached.
#[derive(Debug, Clone, Default)]
pub struct SurgicalSwapper {
    config: SurgicalConfig,
}

impl SurgicalSwapper {
    #[must_use]
    pub fn new(config: SurgicalConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SurgicalConfig {
        &self.config
    }

    fn step(&self, teams: &mut [Team], balance: &SkillBalance) -> Option<SurgicalSwap> {
        let weak = weakest_team(teams)?;
        let lowest = lowest_member(&teams[weak])?;

        let mut donors: Vec<usize> = (0..teams.len())
            .filter(|&d| {
                d != weak
                    && teams[d].average_skill() > balance.global_average
                    && teams[d]
                        .members()
                        .iter()
                        .any(|m| m.skill_level() >= self.config.donor_min_skill)
            })
            .collect();
        donors.sort_by(|&a, &b| teams[b].average_skill().total_cmp(&teams[a].average_skill()));

        for donor in donors {
            let mut candidates: Vec<usize> = (0..teams[donor].len())
                .filter(|&i| teams[donor].members()[i].skill_level() >= self.config.donor_min_skill)
                .collect();
            candidates.sort_by_key(|&i| std::cmp::Reverse(teams[donor].members()[i].skill_level()));

            for candidate in candidates {
                if let Some(swap) = try_swap(teams, (weak, lowest), (donor, candidate), balance) {
                    return Some(swap);
                }
            }
        }
        None
    }
}

impl SwapPolisher for SurgicalSwapper {
    fn polish(&self, teams: &mut [Team]) -> SurgicalReport {
        let mut report = SurgicalReport::default();
        let Some(initial) = SkillBalance::of(teams) else {
            return report;
        };
        report.spread_before = initial.spread;
        report.spread_after = initial.spread;

        while report.swaps.len() < self.config.max_swaps {
            let Some(balance) = SkillBalance::of(teams) else {
                break;
            };
            if let Some(fraction) = self.config.stop_below
                && balance.spread_within(fraction)
            {
                report.reached_threshold = true;
                break;
            }
            let Some(swap) = self.step(teams, &balance) else {
                break;
            };
            tracing::debug!(
                weak = %swap.weak_team,
                donor = %swap.donor_team,
                outgoing = %swap.weak_member,
                incoming = %swap.donor_member,
                spread = swap.spread_after,
                "surgical swap"
            );
            report.spread_after = swap.spread_after;
            report.swaps.push(swap);
        }

        tracing::info!(
            swaps = report.swaps.len(),
            spread_before = report.spread_before,
            spread_after = report.spread_after,
            "surgical swaps finished"
        );
        report
    }
}

fn weakest_team(teams: &[Team]) -> Option<usize> {
    (0..teams.len()).min_by(|&a, &b| teams[a].average_skill().total_cmp(&teams[b].average_skill()))
}

fn lowest_member(team: &Team) -> Option<usize> {
    (0..team.len()).min_by_key(|&i| team.members()[i].skill_level())
}

fn try_swap(
    teams: &mut [Team],
    (weak, w): (usize, usize),
    (donor, d): (usize, usize),
    before: &SkillBalance,
) -> Option<SurgicalSwap> {
    let weak_dev_before = balance::deviation(&teams[weak], before.global_average);

    let (x, y) = pair_mut(teams, weak, donor);
    swap_members(x, w, y, d);
    let composition_ok = !composition::violates(x) && !composition::violates(y);

    if composition_ok
        && let Some(after) = SkillBalance::of(teams)
        && improves(
            before,
            &after,
            weak_dev_before,
            balance::deviation(&teams[weak], after.global_average),
        )
    {
        return Some(SurgicalSwap {
            weak_team: teams[weak].id().clone(),
            donor_team: teams[donor].id().clone(),
            weak_member: teams[donor].members()[d].id().clone(),
            donor_member: teams[weak].members()[w].id().clone(),
            spread_after: after.spread,
        });
    }
    let (x, y) = pair_mut(teams, weak, donor);
    swap_members(x, w, y, d);
    None
}

/// Smaller spread, or equal spread with the weak team nearer the global average.
fn improves(
    before: &SkillBalance,
    after: &SkillBalance,
    weak_dev_before: f64,
    weak_dev_after: f64,
) -> bool {
    after.spread < before.spread - SPREAD_EPSILON
        || ((after.spread - before.spread).abs() <= SPREAD_EPSILON
            && weak_dev_after < weak_dev_before - SPREAD_EPSILON)
}
