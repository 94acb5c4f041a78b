use std::{ffi::OsString, path::PathBuf};

use super::{error::LauncherError, venv::ActiveEnv};
use crate::utils::{exit_code, runner::ToolRunner};

/// The dashboard framework plus the two data libraries the dashboards import.
pub const REQUIRED_PACKAGES: [&str; 3] = ["streamlit", "pandas", "plotly"];

#[derive(Debug, Clone)]
pub struct Dependencies {
    pub packages: Vec<String>,
    /// requirements file, relative to the target directory unless absolute
    pub requirements: Option<PathBuf>,
    pub upgrade: bool,
    pub quiet: bool,
}

impl Default for Dependencies {
    fn default() -> Self {
        Dependencies {
            packages: REQUIRED_PACKAGES.iter().map(|p| p.to_string()).collect(),
            requirements: None,
            upgrade: false,
            quiet: true,
        }
    }
}

impl Dependencies {
    pub fn with_extra(mut self, extra: &[String]) -> Self {
        for pkg in extra {
            if !self.packages.contains(pkg) {
                self.packages.push(pkg.clone());
            }
        }
        self
    }

    fn pip_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["install".into()];
        if self.quiet {
            args.push("--quiet".into());
        }
        if self.upgrade {
            args.push("--upgrade".into());
        }
        args.extend(self.packages.iter().map(OsString::from));
        if let Some(req) = &self.requirements {
            args.push("-r".into());
            args.push(req.into());
        }
        args
    }
}

/// Install the packages into the environment. pip treats already satisfied
/// requirements as a no-op, so this runs on every launch.
pub fn ensure_dependencies(
    env: &ActiveEnv,
    deps: &Dependencies,
    runner: &dyn ToolRunner,
) -> Result<(), LauncherError> {
    info!("checking dependencies: {}", deps.packages.join(", "));

    let invocation = env.module("pip").args(deps.pip_args());
    let status = runner
        .run(&invocation)
        .map_err(|e| LauncherError::DependencyInstall {
            code: None,
            reason: format!("could not run `{}`: {:#}", invocation, e),
        })?;

    if !status.success() {
        return Err(LauncherError::DependencyInstall {
            code: exit_code(&status),
            reason: format!("pip exited with {:?}", status),
        });
    }

    debug!("dependencies satisfied");
    Ok(())
}
