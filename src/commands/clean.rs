use std::{fs, path::PathBuf};

use clap::Parser;

use super::EnvOptions;
use crate::launcher::{
    target::Target,
    venv::{EnvState, VirtualEnv},
    LauncherError,
};

#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// dashboard script whose environment to remove
    target: PathBuf,

    #[command(flatten)]
    env: EnvOptions,

    /// remove the directory even if it does not look like a virtual environment
    #[arg(long, action)]
    force: bool,
}

pub fn run(args: CleanArgs) -> Result<(), LauncherError> {
    let target = Target::locate(&args.target)?;
    let venv = VirtualEnv::at(&target, &args.env.provisioning().venv_dir);
    let root = venv.root().to_path_buf();

    if venv.state() == EnvState::Absent {
        info!("no environment at {}, nothing to remove", root.display());
        return Ok(());
    }

    // never the dashboard's own directory or anything above it, --force or not
    let resolved = fs::canonicalize(&root).unwrap_or_else(|_| root.clone());
    if target.workdir().starts_with(&resolved) {
        return Err(LauncherError::Cleanup {
            path: root,
            reason: "it contains the dashboard itself".into(),
        });
    }

    if !root.is_dir() || (!venv.looks_like_venv() && !args.force) {
        return Err(LauncherError::Cleanup {
            path: root,
            reason: "not a virtual environment (use --force to remove anyway)".into(),
        });
    }

    info!("removing virtual environment at {}", root.display());
    fs::remove_dir_all(&root).map_err(|e| LauncherError::Cleanup {
        path: root.clone(),
        reason: e.to_string(),
    })?;
    Ok(())
}
