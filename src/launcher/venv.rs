use std::{
    env,
    ffi::OsString,
    iter,
    path::{Path, PathBuf},
};

use serde::Serialize;

use super::{error::LauncherError, target::Target};
use crate::utils::{
    exit_code,
    runner::{Invocation, ToolRunner},
};

const BIN_DIR: &str = "bin";
const PYTHON_EXE: &str = "python";

/// Interpreter location inside an environment rooted at `root`.
pub fn interpreter_path(root: &Path) -> PathBuf {
    root.join(BIN_DIR).join(PYTHON_EXE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvState {
    Absent,
    /// directory exists but holds no interpreter, e.g. an interrupted creation
    Partial,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    Reused,
    Created,
    Repaired,
}

/// The isolated environment next to a target script. Its state is read from
/// disk on every query.
#[derive(Debug, Clone)]
pub struct VirtualEnv {
    root: PathBuf,
}

impl VirtualEnv {
    pub fn at(target: &Target, dir: &Path) -> VirtualEnv {
        VirtualEnv {
            root: target.resolve(dir),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(BIN_DIR)
    }

    pub fn python(&self) -> PathBuf {
        interpreter_path(&self.root)
    }

    pub fn state(&self) -> EnvState {
        if self.python().is_file() {
            EnvState::Ready
        } else if self.root.exists() {
            EnvState::Partial
        } else {
            EnvState::Absent
        }
    }

    /// Whether the directory looks like something `python -m venv` produced.
    pub fn looks_like_venv(&self) -> bool {
        self.root.join("pyvenv.cfg").is_file() || self.python().is_file()
    }

    /// Create the environment unless a usable one is already there. A partial
    /// environment is completed in place; existing content is never cleared.
    pub fn ensure(
        &self,
        target: &Target,
        bootstrap_python: &Path,
        runner: &dyn ToolRunner,
    ) -> Result<Ensured, LauncherError> {
        let ensured = match self.state() {
            EnvState::Ready => {
                debug!("reusing virtual environment at {}", self.root.display());
                return Ok(Ensured::Reused);
            }
            EnvState::Partial => {
                warn!(
                    "virtual environment at {} is incomplete, repairing it",
                    self.root.display()
                );
                Ensured::Repaired
            }
            EnvState::Absent => {
                info!("creating virtual environment at {}", self.root.display());
                Ensured::Created
            }
        };

        let invocation = Invocation::new(bootstrap_python, target.workdir())
            .args(["-m", "venv"])
            .arg(self.root.as_os_str());

        let failed = |code: Option<i32>, reason: String| LauncherError::EnvironmentCreation {
            path: self.root.clone(),
            code,
            reason,
        };

        let status = runner.run(&invocation).map_err(|e| {
            failed(
                None,
                format!("could not run `{}`: {:#}", invocation, e),
            )
        })?;
        if !status.success() {
            return Err(failed(
                exit_code(&status),
                format!("`{}` exited with {:?}", invocation, status),
            ));
        }

        if self.state() != EnvState::Ready {
            return Err(failed(
                None,
                format!("no interpreter at {} after creation", self.python().display()),
            ));
        }

        Ok(ensured)
    }

    /// Scope every later sub-process to this environment.
    pub fn activate(self, target: &Target) -> ActiveEnv {
        info!("using virtual environment at {}", self.root.display());
        ActiveEnv {
            venv: self,
            workdir: target.workdir().to_path_buf(),
        }
    }
}

/// An environment that sub-processes are explicitly bound to. Instead of
/// changing our own process environment, each child gets the interpreter path
/// and the variables an activation script would set.
#[derive(Debug, Clone)]
pub struct ActiveEnv {
    venv: VirtualEnv,
    workdir: PathBuf,
}

impl ActiveEnv {
    pub fn venv(&self) -> &VirtualEnv {
        &self.venv
    }

    /// `python -m <module>` inside the environment, run from the target directory.
    pub fn module(&self, module: &str) -> Invocation {
        Invocation::new(self.venv.python(), &self.workdir)
            .args(["-m", module])
            .env("VIRTUAL_ENV", self.venv.root().as_os_str())
            .env("PATH", self.search_path())
            .env_remove("PYTHONHOME")
    }

    fn search_path(&self) -> OsString {
        let bin = self.venv.bin_dir();
        let inherited = env::var_os("PATH").unwrap_or_default();
        env::join_paths(iter::once(bin.clone()).chain(env::split_paths(&inherited)))
            .unwrap_or_else(|_| bin.into_os_string())
    }
}
