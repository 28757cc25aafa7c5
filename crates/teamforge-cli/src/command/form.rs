use std::path::PathBuf;

use teamforge_evaluator::objective::WeightedObjective;
use teamforge_search::formation::{FormationStrategy as _, GreedyFormation};

use super::FormationArg;
use crate::{
    schema::report::FormationReport,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FormArg {
    /// Participants JSON file
    #[arg(long)]
    input: PathBuf,
    /// Members per team
    #[arg(long)]
    team_size: usize,
    #[clap(flatten)]
    formation: FormationArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &FormArg) -> anyhow::Result<()> {
    let FormArg {
        input,
        team_size,
        formation,
        output,
    } = arg;
    let participants = util::read_participants_file(input)?;
    eprintln!("Loaded {} participants from {}", participants.len(), input.display());

    let mode = formation.mode();
    let strategy = GreedyFormation::new(formation.config()?);
    let result = strategy.form(&participants, *team_size, mode)?;
    for failure in &result.failures {
        tracing::warn!(%failure, "team slot failed");
    }

    let objective = WeightedObjective::default();
    let report = FormationReport::new(result, *team_size, mode.seed(), &objective);
    report.print_summary();
    Output::save_json(&report, output.clone())?;
    if let Some(path) = output {
        eprintln!("Report saved to {}", path.display());
    }
    Ok(())
}
