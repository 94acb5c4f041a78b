use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use super::EnvOptions;
use crate::launcher::{
    target::Target,
    venv::{EnvState, VirtualEnv},
    LauncherError,
};

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// dashboard script to inspect
    target: PathBuf,

    #[command(flatten)]
    env: EnvOptions,

    /// print the report as JSON
    #[arg(long, action)]
    json: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub script: PathBuf,
    pub workdir: PathBuf,
    pub venv: PathBuf,
    pub state: EnvState,
    pub python: Option<PathBuf>,
}

pub fn report(args: &StatusArgs) -> Result<StatusReport, LauncherError> {
    let target = Target::locate(&args.target)?;
    let venv = VirtualEnv::at(&target, &args.env.provisioning().venv_dir);
    let state = venv.state();

    Ok(StatusReport {
        script: target.script().to_path_buf(),
        workdir: target.workdir().to_path_buf(),
        venv: venv.root().to_path_buf(),
        state,
        python: (state == EnvState::Ready).then(|| venv.python()),
    })
}

pub fn run(args: StatusArgs) -> Result<(), LauncherError> {
    let report = report(&args)?;

    println!("{}", render(&report, args.json)?);
    Ok(())
}

fn render(report: &StatusReport, json: bool) -> Result<String, LauncherError> {
    if json {
        return serde_json::to_string_pretty(report)
            .map_err(|source| LauncherError::Report { source });
    }

    let mut out = format!(
        "script:      {}\nworking dir: {}\nenvironment: {} ({:?})",
        report.script.display(),
        report.workdir.display(),
        report.venv.display(),
        report.state
    );
    if let Some(python) = &report.python {
        out.push_str(&format!("\ninterpreter: {}", python.display()));
    }
    Ok(out)
}
