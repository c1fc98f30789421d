use std::io::Write;

use anyhow::Error;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

mod aggregate;
use aggregate::Aggregate;

mod estimate;
use estimate::Estimate;

const NAME: &str = env!("CARGO_BIN_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tools for estimating φ over binned sequence data.
#[derive(Debug, Parser)]
#[clap(name = NAME, version = VERSION, about)]
#[clap(subcommand_required = true)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Suppress warnings.
    ///
    /// By default, only warnings are printed. By setting this flag, warnings will be disabled.
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbosity.
    ///
    /// By default, only warnings are printed. Flag can be set multiple times to increase verbosity.
    #[clap(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print CLI arguments for debugging.
    #[clap(long, hide = true, global = true)]
    debug: bool,
}

impl Cli {
    pub fn run(self) -> Result<(), Error> {
        if self.debug {
            eprintln!("{self:#?}");
        }

        let level = if self.quiet {
            log::LevelFilter::Off
        } else {
            match self.verbose {
                0 => log::LevelFilter::Warn,
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            }
        };

        match env_logger::Builder::new()
            .filter_level(level)
            .target(env_logger::Target::Stderr)
            .format(|buf, record| {
                let level = record.level().as_str().to_lowercase();
                let args = record.args();
                writeln!(buf, "[phi {level:>5}] {args}")
            })
            .try_init()
        {
            Ok(()) => (),
            Err(e) => eprintln!("failed to setup logger: {e}"),
        }

        self.command.run()
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Aggregate(Aggregate),
    Estimate(Estimate),
}

impl Command {
    fn run(self) -> Result<(), Error> {
        match self {
            Command::Aggregate(aggregate) => aggregate.run(),
            Command::Estimate(estimate) => estimate.run(),
        }
    }
}

impl TryFrom<Command> for Aggregate {
    type Error = Command;

    fn try_from(command: Command) -> Result<Self, Self::Error> {
        match command {
            Command::Aggregate(aggregate) => Ok(aggregate),
            command => Err(command),
        }
    }
}

impl TryFrom<Command> for Estimate {
    type Error = Command;

    fn try_from(command: Command) -> Result<Self, Self::Error> {
        match command {
            Command::Estimate(estimate) => Ok(estimate),
            command => Err(command),
        }
    }
}

/// Minimisation method used to estimate φ.
#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Method {
    /// Downhill simplex on φ.
    #[default]
    NelderMead,
    /// Downhill simplex on ln φ, keeping φ positive throughout.
    Constrained,
}

impl From<Method> for phi_core::estimate::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::NelderMead => Self::NelderMead,
            Method::Constrained => Self::Constrained,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.run() {
        Ok(()) => (),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
