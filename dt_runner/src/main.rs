//! Command-line driver for the darts tournament engine.
//!
//! Simulates whole tournament classes and inspects or repairs saved
//! tournament documents.

mod config;
mod render;
mod simulate;
mod store;

use std::path::PathBuf;

use anyhow::{Error, bail};
use log::{info, warn};
use pico_args::Arguments;

use config::{Overrides, RunnerConfig};
use render::{ClassView, ReportView};
use simulate::Simulation;

const HELP: &str = "\
Run and inspect darts tournament classes

USAGE:
  dt_runner <COMMAND> [OPTIONS]

COMMANDS:
  simulate                 Play a whole class with random scores
  show                     Print a saved tournament document
  repair                   Repair a saved tournament document in place

SIMULATE OPTIONS:
  --players    N           Number of players       [default: env DT_PLAYERS or 16]
  --groups     G           Number of groups        [default: env DT_GROUPS or 4]
  --seed       S           Seed for draws and scores [default: env DT_SEED or random]
  --save       PATH        Write the finished class as JSON

SHOW / REPAIR OPTIONS:
  --file       PATH        Tournament document to read

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  DT_POST_GROUP_PHASE      none | finals | knockout
  DT_KNOCKOUT_MODE         single | double
  DT_QUALIFIERS_PER_GROUP  Players qualifying from every group
  DT_LOSERS_BRACKET        Seed the loser bracket with group-phase losers
  DT_FINALS_THEN_KNOCKOUT  Play a knockout after the round-robin finals
  DT_LEGS_TO_WIN           First to N legs
  DT_SETS_TO_WIN           First to N sets
  DT_PLAY_SETS             Decide matches in sets
  DT_SEEDING               random | positional
  DT_GAME_MODE             301 | 501 | 701 | cricket
  DT_FINISH_MODE           single-out | double-out | master-out
  Variables may also be set in a .env file in the working directory
";

enum Command {
    Simulate {
        overrides: Overrides,
        save: Option<PathBuf>,
    },
    Show {
        file: PathBuf,
    },
    Repair {
        file: PathBuf,
    },
}

fn parse_args(mut pargs: Arguments) -> Result<Command, Error> {
    let command = match pargs.subcommand()?.as_deref() {
        Some("simulate") => Command::Simulate {
            overrides: Overrides {
                players: pargs.opt_value_from_str("--players")?,
                groups: pargs.opt_value_from_str("--groups")?,
                seed: pargs.opt_value_from_str("--seed")?,
            },
            save: pargs.opt_value_from_str("--save")?,
        },
        Some("show") => Command::Show {
            file: pargs.value_from_str("--file")?,
        },
        Some("repair") => Command::Repair {
            file: pargs.value_from_str("--file")?,
        },
        Some(other) => bail!("Unknown command {other:?}, see --help"),
        None => bail!("No command given, see --help"),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        warn!("Ignoring unused arguments: {remaining:?}");
    }
    Ok(command)
}

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    env_logger::builder().format_target(false).init();

    match parse_args(pargs)? {
        Command::Simulate { overrides, save } => {
            let config = RunnerConfig::from_env(overrides)?;
            config.validate()?;
            info!(
                "Simulating {} players in {} group(s), {} after the groups",
                config.players, config.groups, config.rules.post_group_phase_mode
            );

            let class = Simulation::new(config.seed).run(&config)?;
            print!("{}", ClassView(&class));

            if let Some(path) = save {
                store::save(&path, &class)?;
            }
        }
        Command::Show { file } => {
            let (class, report) = store::load(&file)?;
            if !report.is_clean() {
                print!("{}", ReportView(&report));
            }
            print!("{}", ClassView(&class));
        }
        Command::Repair { file } => {
            let (class, report) = store::load(&file)?;
            print!("{}", ReportView(&report));
            if !report.is_clean() {
                store::save(&file, &class)?;
            }
        }
    }

    Ok(())
}
