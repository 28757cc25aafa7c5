use std::{collections::BTreeSet, path::PathBuf};

use anyhow::{Context as _, bail, ensure};
use clap::ValueEnum;
use teamforge_engine::{Participant, ParticipantId};
use teamforge_evaluator::objective::{ObjectiveEvaluator, SpreadObjective, WeightedObjective};
use teamforge_search::{
    formation::GreedyFormation,
    pipeline::{AttemptPipeline, PipelineConfig},
    surgical::SurgicalSwapper,
};

use super::FormationArg;
use crate::{
    schema::report::FormationReport,
    util::{self, Output},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// 15 attempts, up to 10 surgical swaps
    #[default]
    Quick,
    /// Up to 200 attempts with early stop, up to 25 surgical swaps
    Super,
    /// 15 attempts, 25 surgical swaps without early stop
    Admin,
    /// Up to 200 attempts with early stop, 50 surgical swaps
    AdminSuper,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum Score {
    /// Skill deviation plus personality and role penalties
    #[default]
    Weighted,
    /// Highest team average skill minus lowest
    Spread,
}

impl Preset {
    fn config(self) -> PipelineConfig {
        match self {
            Preset::Quick => PipelineConfig::quick(),
            Preset::Super => PipelineConfig::super_balance(),
            Preset::Admin => PipelineConfig::admin_rebalance(),
            Preset::AdminSuper => PipelineConfig::admin_super_balance(),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReshuffleArg {
    /// Participants JSON file (defaults to everyone in the baseline)
    #[arg(long, required_unless_present = "baseline")]
    input: Option<PathBuf>,
    /// Previously saved report to start from
    #[arg(long)]
    baseline: Option<PathBuf>,
    /// Members per team (defaults to the baseline's team size)
    #[arg(long, required_unless_present = "baseline")]
    team_size: Option<usize>,
    #[arg(long, value_enum, default_value_t)]
    preset: Preset,
    /// Pipeline config JSON file; replaces the preset
    #[arg(long)]
    config: Option<PathBuf>,
    /// How candidate formations are compared
    #[arg(long, value_enum, default_value_t)]
    score: Score,
    /// Objective weights JSON file for the weighted score
    #[arg(long)]
    objective: Option<PathBuf>,
    /// Maximum formation attempts
    #[arg(long)]
    attempts: Option<usize>,
    /// Attempts between early-stop checks
    #[arg(long)]
    batch_size: Option<usize>,
    /// Stop early once spread is within this fraction of the average skill
    #[arg(long)]
    spread_threshold: Option<f64>,
    /// Maximum surgical swaps
    #[arg(long)]
    max_swaps: Option<usize>,
    #[clap(flatten)]
    formation: FormationArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ReshuffleArg {
    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file("pipeline config", path)?,
            None => self.preset.config(),
        };
        if let Some(attempts) = self.attempts {
            config.max_attempts = attempts;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(threshold) = self.spread_threshold {
            config.spread_threshold = Some(threshold);
        }
        if let Some(max_swaps) = self.max_swaps {
            config.surgical.max_swaps = max_swaps;
        }
        Ok(config)
    }

    fn objective(&self) -> anyhow::Result<Box<dyn ObjectiveEvaluator>> {
        match (self.score, &self.objective) {
            (Score::Weighted, Some(path)) => {
                let weights: WeightedObjective = util::read_json_file("objective", path)?;
                Ok(Box::new(weights))
            }
            (Score::Weighted, None) => Ok(Box::new(WeightedObjective::default())),
            (Score::Spread, None) => Ok(Box::new(SpreadObjective)),
            (Score::Spread, Some(_)) => bail!("--objective only applies to --score weighted"),
        }
    }
}

/// Fails unless the baseline holds exactly the input participants.
fn check_baseline_matches(
    baseline: &[Participant],
    input: &[Participant],
) -> anyhow::Result<()> {
    let ids = |participants: &[Participant]| -> BTreeSet<ParticipantId> {
        participants.iter().map(|p| p.id().clone()).collect()
    };
    let (baseline, input) = (ids(baseline), ids(input));
    let missing: Vec<_> = input.difference(&baseline).map(ToString::to_string).collect();
    let extra: Vec<_> = baseline.difference(&input).map(ToString::to_string).collect();
    ensure!(
        missing.is_empty() && extra.is_empty(),
        "baseline and input participants differ (not in baseline: [{}], not in input: [{}])",
        missing.join(", "),
        extra.join(", ")
    );
    Ok(())
}

pub(crate) fn run(arg: &ReshuffleArg) -> anyhow::Result<()> {
    let baseline = arg
        .baseline
        .as_ref()
        .map(util::read_report_file)
        .transpose()?;

    let participants = match (&arg.input, &baseline) {
        (Some(path), _) => util::read_participants_file(path)?,
        (None, Some(report)) => report.participants(),
        (None, None) => bail!("either --input or --baseline is required"),
    };
    let team_size = arg
        .team_size
        .or_else(|| baseline.as_ref().map(|r| r.team_size))
        .context("team size is unknown; pass --team-size")?;
    if let Some(report) = &baseline {
        check_baseline_matches(&report.participants(), &participants)?;
    }
    eprintln!(
        "Reshuffling {} participants into teams of {team_size}",
        participants.len()
    );

    let config = arg.pipeline_config()?;
    let mode = arg.formation.mode();
    let pipeline = AttemptPipeline::new(
        GreedyFormation::new(arg.formation.config()?),
        arg.objective()?,
        SurgicalSwapper::new(config.surgical.clone()),
        config,
    );
    let outcome = pipeline.run(
        &participants,
        team_size,
        mode,
        baseline.map(FormationReport::into_formation),
    )?;

    eprintln!(
        "Attempts: {} ({} improvements{})",
        outcome.attempts,
        outcome.improvements,
        if outcome.early_stopped { ", stopped early" } else { "" }
    );
    if outcome.initial_score < f64::MAX {
        eprintln!("Baseline objective: {:.3}", outcome.initial_score);
    }
    eprintln!("Best attempt objective: {:.3}", outcome.best_attempt_score);
    eprintln!(
        "Surgical swaps: {} (spread {:.3} -> {:.3})",
        outcome.surgical.swaps.len(),
        outcome.surgical.spread_before,
        outcome.surgical.spread_after
    );

    let report = FormationReport::new(
        outcome.formation,
        team_size,
        mode.seed(),
        pipeline.objective(),
    );
    report.print_summary();
    Output::save_json(&report, arg.output.clone())?;
    if let Some(path) = &arg.output {
        eprintln!("Report saved to {}", path.display());
    }
    Ok(())
}
