use std::path::PathBuf;

use clap::Parser;

use super::EnvOptions;
use crate::{
    launcher::{provision, LauncherError},
    utils::runner::ToolRunner,
};

#[derive(Parser, Debug)]
pub struct SetupArgs {
    /// dashboard script whose environment to prepare
    target: PathBuf,

    #[command(flatten)]
    env: EnvOptions,
}

pub fn run(args: SetupArgs, runner: &dyn ToolRunner) -> Result<(), LauncherError> {
    let (target, env) = provision(&args.target, &args.env.provisioning(), runner)?;
    info!(
        "environment for {} ready at {}",
        target.script().display(),
        env.venv().root().display()
    );
    Ok(())
}
