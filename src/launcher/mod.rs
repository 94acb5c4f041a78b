//! The launch pipeline:
//!
//! validate target -> enter its directory -> ensure `.venv` -> activate
//! -> ensure dependencies -> `streamlit run`
//!
//! Every stage is gated on the previous one and aborts with a
//! [`LauncherError`] on failure.

pub mod deps;
pub mod error;
pub mod serve;
pub mod target;
pub mod venv;

use std::path::{Path, PathBuf};

use self::{
    deps::{ensure_dependencies, Dependencies},
    serve::{launch, ServeOptions},
    target::Target,
    venv::{ActiveEnv, VirtualEnv},
};
use crate::utils::runner::ToolRunner;

pub use self::error::LauncherError;

pub const DEFAULT_VENV_DIR: &str = ".venv";
pub const DEFAULT_PYTHON: &str = "python3";

/// How the environment next to a target is set up.
#[derive(Debug, Clone)]
pub struct Provisioning {
    /// environment directory, relative to the target directory unless absolute
    pub venv_dir: PathBuf,
    /// interpreter used to bootstrap the environment
    pub python: PathBuf,
    pub deps: Dependencies,
}

impl Default for Provisioning {
    fn default() -> Self {
        Provisioning {
            venv_dir: PathBuf::from(DEFAULT_VENV_DIR),
            python: PathBuf::from(DEFAULT_PYTHON),
            deps: Dependencies::default(),
        }
    }
}

/// Everything up to, but not including, the launch.
pub fn provision(
    script: &Path,
    config: &Provisioning,
    runner: &dyn ToolRunner,
) -> Result<(Target, ActiveEnv), LauncherError> {
    let target = Target::locate(script)?;

    let venv = VirtualEnv::at(&target, &config.venv_dir);
    venv.ensure(&target, &config.python, runner)?;

    let env = venv.activate(&target);
    ensure_dependencies(&env, &config.deps, runner)?;

    Ok((target, env))
}

/// The whole pipeline. Blocks for as long as the dashboard runs.
pub fn provision_and_launch(
    script: &Path,
    config: &Provisioning,
    serve: &ServeOptions,
    runner: &dyn ToolRunner,
) -> Result<(), LauncherError> {
    let (target, env) = provision(script, config, runner)?;
    launch(&target, &env, serve, runner)
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::{provision, provision_and_launch, serve::ServeOptions, LauncherError, Provisioning};
    use crate::utils::runner::fake::RecordingRunner;

    #[test]
    fn test_missing_target_has_no_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();

        let err = provision_and_launch(
            &dir.path().join("missing.py"),
            &Provisioning::default(),
            &ServeOptions::default(),
            &runner,
        )
        .unwrap_err();

        assert!(matches!(err, LauncherError::MissingTarget { .. }));
        assert_eq!(err.exit_code(), 1);
        assert!(runner.calls.borrow().is_empty());
        assert!(runner.served.borrow().is_empty());
        assert!(!dir.path().join(".venv").exists());
    }

    #[test]
    fn test_second_run_reuses_environment() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("dashboard.py");
        fs::write(&script, "").unwrap();
        let runner = RecordingRunner::new();

        provision(&script, &Provisioning::default(), &runner).unwrap();
        provision(&script, &Provisioning::default(), &runner).unwrap();

        assert_eq!(runner.count_module("venv"), 1);
        assert_eq!(runner.count_module("pip"), 2);
        assert!(dir.path().join(".venv").is_dir());
    }

    #[test]
    fn test_everything_runs_in_target_directory() {
        let app = tempfile::tempdir().unwrap();
        let script = app.path().join("dashboard.py");
        fs::write(&script, "").unwrap();
        let runner = RecordingRunner::new();

        // the script path is absolute, so the caller's cwd plays no part
        provision_and_launch(
            &script,
            &Provisioning::default(),
            &ServeOptions::default(),
            &runner,
        )
        .unwrap();

        let workdir = app.path().canonicalize().unwrap();
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.cwd == workdir));
        assert!(calls[0].runs_module("venv"));
        assert_eq!(calls[0].args.last().unwrap(), workdir.join(".venv").as_os_str());
        assert!(calls[1].runs_module("pip"));
        assert!(workdir.join(".venv").is_dir());

        let served = runner.served.borrow();
        assert_eq!(served[0].cwd, workdir);
        assert!(served[0].args.iter().any(|a| a == "8501"));
    }

    #[test]
    fn test_failed_environment_stops_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("dashboard.py");
        fs::write(&script, "").unwrap();
        let runner = RecordingRunner::failing("venv", 1);

        let err = provision_and_launch(
            &script,
            &Provisioning::default(),
            &ServeOptions::default(),
            &runner,
        )
        .unwrap_err();

        assert!(matches!(err, LauncherError::EnvironmentCreation { .. }));
        assert_eq!(runner.count_module("pip"), 0);
        assert!(runner.served.borrow().is_empty());
    }

    #[test]
    fn test_failed_install_prevents_launch() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("dashboard.py");
        fs::write(&script, "").unwrap();
        let runner = RecordingRunner::failing("pip", 1);

        let err = provision_and_launch(
            &script,
            &Provisioning::default(),
            &ServeOptions::default(),
            &runner,
        )
        .unwrap_err();

        assert!(matches!(err, LauncherError::DependencyInstall { .. }));
        assert!(runner.served.borrow().is_empty());
    }
}
