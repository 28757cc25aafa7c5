use std::path::PathBuf;

use serde::Serialize;
use teamforge_engine::{Game, Participant, PersonalityTier, Role, TierCounts};
use teamforge_stats::descriptive::DescriptiveStats;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StatsArg {
    /// Participants JSON file
    #[arg(long)]
    input: PathBuf,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct InputSummary {
    participants: usize,
    tiers: Vec<(PersonalityTier, usize)>,
    roles: Vec<(Role, usize)>,
    games: Vec<(Game, usize)>,
    skill: Option<SkillSummary>,
}

#[derive(Debug, Clone, Serialize)]
struct SkillSummary {
    min: f64,
    max: f64,
    mean: f64,
    median: f64,
    std_dev: f64,
}

impl InputSummary {
    fn new(participants: &[Participant]) -> Self {
        let mut tiers = TierCounts::default();
        for p in participants {
            tiers[p.personality_tier()] += 1;
        }
        let count = |pred: &dyn Fn(&Participant) -> bool| {
            participants.iter().filter(|p| pred(p)).count()
        };
        let skills = participants.iter().map(|p| f64::from(p.skill_level()));
        let skill = DescriptiveStats::new(skills).map(|s| SkillSummary {
            min: s.min,
            max: s.max,
            mean: s.mean,
            median: s.median,
            std_dev: s.std_dev,
        });
        Self {
            participants: participants.len(),
            tiers: tiers.iter().map(|(tier, n)| (tier, *n)).collect(),
            roles: Role::ALL
                .iter()
                .map(|&role| (role, count(&|p| p.preferred_role() == role)))
                .collect(),
            games: Game::ALL
                .iter()
                .map(|&game| (game, count(&|p| p.preferred_game() == game)))
                .collect(),
            skill,
        }
    }
}

pub(crate) fn run(arg: &StatsArg) -> anyhow::Result<()> {
    let StatsArg { input, output } = arg;
    let participants = util::read_participants_file(input)?;
    let summary = InputSummary::new(&participants);

    eprintln!("Participants: {}", summary.participants);
    eprintln!("Personality tiers:");
    for (tier, n) in &summary.tiers {
        eprintln!("  {tier:<10} {n}");
    }
    eprintln!("Roles:");
    for (role, n) in &summary.roles {
        eprintln!("  {role:<12} {n}");
    }
    if let Some(skill) = &summary.skill {
        eprintln!("Skill:");
        eprintln!("  Min:    {:.0}", skill.min);
        eprintln!("  Max:    {:.0}", skill.max);
        eprintln!("  Mean:   {:.2}", skill.mean);
        eprintln!("  Median: {:.1}", skill.median);
        eprintln!("  Stddev: {:.2}", skill.std_dev);
    }

    Output::save_json(&summary, output.clone())?;
    Ok(())
}
