use std::time::Duration;

use super::{error::LauncherError, target::Target, venv::ActiveEnv};
use crate::utils::{exit_code, external_prog::ServeOutcome, runner::ToolRunner};

pub const DEFAULT_PORT: u16 = 8501;

#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub port: u16,
    pub address: Option<String>,
    pub headless: bool,
    pub stop_timeout: Duration,
    /// forwarded to the dashboard script after `--`
    pub script_args: Vec<String>,
}

impl Default for ServeOptions {
    fn default() -> Self {
        ServeOptions {
            port: DEFAULT_PORT,
            address: None,
            headless: false,
            stop_timeout: Duration::from_secs(5),
            script_args: Vec::new(),
        }
    }
}

impl ServeOptions {
    pub fn url(&self) -> String {
        let host = match self.address.as_deref() {
            None | Some("0.0.0.0") | Some("::") | Some("") => "localhost",
            Some(addr) => addr,
        };
        format!("http://{}:{}", host, self.port)
    }
}

/// Run the dashboard through `streamlit run` in the foreground. Returns once
/// the server exits or the user interrupts it.
pub fn launch(
    target: &Target,
    env: &ActiveEnv,
    opts: &ServeOptions,
    runner: &dyn ToolRunner,
) -> Result<(), LauncherError> {
    let mut invocation = env
        .module("streamlit")
        .arg("run")
        .arg(target.script().as_os_str())
        .args(["--server.port".to_string(), opts.port.to_string()]);
    if let Some(address) = &opts.address {
        invocation = invocation.args(["--server.address", address.as_str()]);
    }
    if opts.headless {
        invocation = invocation.args(["--server.headless", "true"]);
    }
    if !opts.script_args.is_empty() {
        invocation = invocation.arg("--").args(opts.script_args.iter().cloned());
    }

    info!("starting dashboard {}", target.script().display());
    info!("dashboard available at {}", opts.url());
    info!("press Ctrl+C to stop the server");

    let outcome = runner
        .serve(&invocation, opts.stop_timeout)
        .map_err(|e| LauncherError::Launch {
            code: None,
            reason: format!("could not start `{}`: {:#}", invocation, e),
        })?;

    match outcome {
        ServeOutcome::Interrupted => {
            info!("dashboard stopped");
            Ok(())
        }
        ServeOutcome::Exited(status) if status.success() => {
            info!("dashboard exited");
            Ok(())
        }
        ServeOutcome::Exited(status) => Err(LauncherError::Launch {
            code: exit_code(&status),
            reason: format!("streamlit exited with {:?}", status),
        }),
    }
}
