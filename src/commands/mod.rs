pub mod clean;
pub mod run;
pub mod setup;
pub mod status;

use std::path::PathBuf;

use clap::Args;

use crate::launcher::{deps::Dependencies, Provisioning, DEFAULT_PYTHON, DEFAULT_VENV_DIR};

/// Options shared by every subcommand that touches the environment.
#[derive(Args, Debug, Clone)]
pub struct EnvOptions {
    /// environment directory, relative to the dashboard script's directory
    #[arg(long, default_value = DEFAULT_VENV_DIR)]
    venv_dir: PathBuf,

    /// interpreter used to create the environment
    #[arg(long, env = "DASHLAUNCH_PYTHON", default_value = DEFAULT_PYTHON)]
    python: PathBuf,

    /// extra package to install next to streamlit, pandas and plotly
    #[arg(long = "with", value_name = "PKG")]
    with: Vec<String>,

    /// also install from this requirements file
    #[arg(long, value_name = "FILE")]
    requirements: Option<PathBuf>,

    /// upgrade packages that are already installed
    #[arg(long, action)]
    upgrade: bool,

    /// show pip's full output
    #[arg(long, action)]
    verbose_install: bool,
}

impl EnvOptions {
    pub fn provisioning(&self) -> Provisioning {
        let deps = Dependencies {
            requirements: self.requirements.clone(),
            upgrade: self.upgrade,
            quiet: !self.verbose_install,
            ..Dependencies::default()
        }
        .with_extra(&self.with);

        Provisioning {
            venv_dir: self.venv_dir.clone(),
            python: self.python.clone(),
            deps,
        }
    }
}
