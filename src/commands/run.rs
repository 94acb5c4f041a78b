use std::{path::PathBuf, time::Duration};

use clap::Parser;

use super::EnvOptions;
use crate::{
    launcher::{provision_and_launch, serve::ServeOptions, LauncherError},
    utils::runner::ToolRunner,
};

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// dashboard script to serve
    target: PathBuf,

    #[command(flatten)]
    env: EnvOptions,

    /// port the dashboard listens on
    #[arg(long, env = "DASHLAUNCH_PORT", default_value_t = crate::launcher::serve::DEFAULT_PORT)]
    port: u16,

    /// address the dashboard binds to, all interfaces when unset
    #[arg(long)]
    address: Option<String>,

    /// do not open a browser window
    #[arg(long, action)]
    headless: bool,

    /// how long the server gets to shut down after Ctrl+C before it is killed
    #[arg(long, default_value_t = 5000)]
    stop_timeout_ms: u64,

    /// arguments passed through to the dashboard script
    #[arg(last = true)]
    script_args: Vec<String>,
}

pub fn run(args: RunArgs, runner: &dyn ToolRunner) -> Result<(), LauncherError> {
    info!("launching dashboard {}", args.target.display());

    let serve = ServeOptions {
        port: args.port,
        address: args.address,
        headless: args.headless,
        stop_timeout: Duration::from_millis(args.stop_timeout_ms),
        script_args: args.script_args,
    };

    provision_and_launch(&args.target, &args.env.provisioning(), &serve, runner)
}
