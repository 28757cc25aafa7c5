use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use teamforge_engine::{FormationSeed, LeftoverDisposition, RandomnessMode};
use teamforge_search::formation::FormationConfig;

use self::{form::FormArg, reshuffle::ReshuffleArg, stats::StatsArg};
use crate::util;

mod form;
mod reshuffle;
mod stats;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Form teams once from a participant list
    Form(#[clap(flatten)] FormArg),
    /// Search many formations and keep the best
    Reshuffle(#[clap(flatten)] ReshuffleArg),
    /// Summarize a participant list
    Stats(#[clap(flatten)] StatsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Form(arg) => form::run(&arg)?,
        Mode::Reshuffle(arg) => reshuffle::run(&arg)?,
        Mode::Stats(arg) => stats::run(&arg)?,
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LeftoverArg {
    /// Keep unseated participants as leftovers
    Leave,
    /// Pack unseated participants into extra teams
    Pack,
}

impl From<LeftoverArg> for LeftoverDisposition {
    fn from(arg: LeftoverArg) -> Self {
        match arg {
            LeftoverArg::Leave => LeftoverDisposition::LeaveUnteamed,
            LeftoverArg::Pack => LeftoverDisposition::PackIntoExtraTeams,
        }
    }
}

/// Options shared by every command that forms teams.
#[derive(Debug, Clone, clap::Args)]
struct FormationArg {
    /// Seed for a reproducible run (fresh randomness if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// What to do with participants no team could seat
    #[arg(long, value_enum)]
    leftovers: Option<LeftoverArg>,
    /// Run the skill-balance optimizer after rebalancing
    #[arg(long)]
    optimize: bool,
    /// Build team slots on a single thread
    #[arg(long)]
    serial: bool,
    /// Formation config JSON file; flags override its values
    #[arg(long)]
    formation_config: Option<PathBuf>,
}

impl FormationArg {
    fn mode(&self) -> RandomnessMode {
        self.seed.map_or(RandomnessMode::Random, |seed| {
            RandomnessMode::Seeded(FormationSeed::from(seed))
        })
    }

    fn config(&self) -> anyhow::Result<FormationConfig> {
        let mut config = match &self.formation_config {
            Some(path) => util::read_json_file("formation config", path)?,
            None => FormationConfig::default(),
        };
        if let Some(leftovers) = self.leftovers {
            config.leftovers = leftovers.into();
        }
        if self.optimize {
            config.optimize = true;
        }
        if self.serial {
            config.parallel_build = false;
        }
        Ok(config)
    }
}
