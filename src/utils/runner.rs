use std::{
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use subprocess::{Exec, ExitStatus};

use super::external_prog::{RunningProgram, ServeOutcome};

/// A fully described child process: what to run, where, and with which
/// environment overrides on top of the inherited one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    pub env: Vec<(OsString, OsString)>,
    pub env_remove: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, cwd: &Path) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
            env: Vec::new(),
            env_remove: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn env_remove(mut self, key: impl Into<OsString>) -> Self {
        self.env_remove.push(key.into());
        self
    }

    /// Whether the arguments start with `-m <module>`.
    #[cfg(test)]
    pub fn runs_module(&self, module: &str) -> bool {
        self.args.len() >= 2 && self.args[0] == "-m" && self.args[1] == module
    }

    pub fn to_exec(&self) -> Exec {
        let mut exec = Exec::cmd(&self.program)
            .args(self.args.as_slice())
            .cwd(&self.cwd);
        for key in &self.env_remove {
            exec = exec.env_remove(key);
        }
        for (key, value) in &self.env {
            exec = exec.env(key, value);
        }
        exec
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Everything the launcher needs from the operating system to run external
/// tools. Setup steps use `run`, the dashboard server uses `serve`.
pub trait ToolRunner {
    /// Run a tool to completion with its output going straight to the console.
    fn run(&self, invocation: &Invocation) -> anyhow::Result<ExitStatus>;

    /// Run a program in the foreground until it exits or the user interrupts it.
    fn serve(&self, invocation: &Invocation, stop_timeout: Duration)
        -> anyhow::Result<ServeOutcome>;
}

pub struct SubprocessRunner {}

impl SubprocessRunner {
    pub fn new() -> SubprocessRunner {
        SubprocessRunner {}
    }
}

impl ToolRunner for SubprocessRunner {
    fn run(&self, invocation: &Invocation) -> anyhow::Result<ExitStatus> {
        debug!("running `{}` in {}", invocation, invocation.cwd.display());
        Ok(invocation.to_exec().join()?)
    }

    fn serve(
        &self,
        invocation: &Invocation,
        stop_timeout: Duration,
    ) -> anyhow::Result<ServeOutcome> {
        debug!("serving `{}` in {}", invocation, invocation.cwd.display());
        let name = invocation
            .program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| invocation.program.display().to_string());
        RunningProgram::start(invocation.to_exec(), &name)?.wait(stop_timeout)
    }
}


#[cfg(test)]
mod test {
    use std::{fs, time::Duration};

    use subprocess::ExitStatus;

    use super::{Invocation, SubprocessRunner, ToolRunner};
    use crate::utils::external_prog::{ServeOutcome, SIGINT_LOCK};

    #[test]
    fn test_run_uses_cwd_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("sh", dir.path())
            .args(["-c", "pwd > where.txt; echo \"$GREETING\" > env.txt"])
            .env("GREETING", "hello");

        let status = SubprocessRunner::new().run(&inv).unwrap();
        assert!(status.success());

        let written = fs::read_to_string(dir.path().join("where.txt")).unwrap();
        assert_eq!(
            fs::canonicalize(written.trim()).unwrap(),
            dir.path().canonicalize().unwrap()
        );
        let env = fs::read_to_string(dir.path().join("env.txt")).unwrap();
        assert_eq!(env.trim(), "hello");
    }

    #[test]
    fn test_env_remove_hides_variable() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("DASHLAUNCH_TEST_REMOVED", "present");
        let inv = Invocation::new("sh", dir.path())
            .args(["-c", "test -z \"$DASHLAUNCH_TEST_REMOVED\""])
            .env_remove("DASHLAUNCH_TEST_REMOVED");

        let status = SubprocessRunner::new().run(&inv).unwrap();
        assert_eq!(status, ExitStatus::Exited(0));
    }

    #[test]
    fn test_serve_reports_exit() {
        let _guard = SIGINT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("sh", dir.path()).args(["-c", "exit 4"]);
        let outcome = SubprocessRunner::new()
            .serve(&inv, Duration::from_secs(1))
            .unwrap();
        assert_eq!(outcome, ServeOutcome::Exited(ExitStatus::Exited(4)));
    }

    #[test]
    fn test_display_joins_arguments() {
        let inv = Invocation::new("/venv/bin/python", std::path::Path::new("/app"))
            .args(["-m", "pip", "install"]);
        assert_eq!(inv.to_string(), "/venv/bin/python -m pip install");
        assert!(inv.runs_module("pip"));
        assert!(!inv.runs_module("venv"));
    }
}
