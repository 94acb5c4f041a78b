#[macro_use]
extern crate log;

use clap::{Parser, ValueEnum};
use log::Level;
use utils::runner::{SubprocessRunner, ToolRunner};

mod commands;
mod launcher;
mod utils;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// console verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Level {
        match level {
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve a dashboard from its own virtual environment
    ///
    /// Creates `.venv` next to the script if it is missing, installs
    /// streamlit, pandas and plotly into it and runs `streamlit run` in the
    /// foreground. Stop with Ctrl+C.
    Run(commands::run::RunArgs),

    /// Prepare the environment without starting the dashboard
    Setup(commands::setup::SetupArgs),

    /// Show where the environment lives and whether it is usable
    Status(commands::status::StatusArgs),

    /// Remove the environment directory
    ///
    /// The environment is never removed automatically; this is the only way
    /// to get rid of it short of deleting it by hand.
    Clean(commands::clean::CleanArgs),
}

fn main() -> anyhow::Result<()> {
    // parse command line arguments
    let args = Args::parse();

    // init logging
    simple_logger::init_with_level(args.log_level.into())?;

    let runner: Box<dyn ToolRunner> = Box::new(SubprocessRunner::new());

    let result = match args.command {
        Commands::Run(cmd) => commands::run::run(cmd, runner.as_ref()),
        Commands::Setup(cmd) => commands::setup::run(cmd, runner.as_ref()),
        Commands::Status(cmd) => commands::status::run(cmd),
        Commands::Clean(cmd) => commands::clean::run(cmd),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}
