use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use subprocess::{unix::PopenExt, Exec, ExitStatus, Popen};

/// How a foreground program came to an end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeOutcome {
    /// the program exited by itself
    Exited(ExitStatus),
    /// SIGINT arrived and the program was stopped on our behalf
    Interrupted,
}

pub struct RunningProgram {
    popen: Popen,
    name: String,
}

impl RunningProgram {
    pub fn start(exec: Exec, name: &str) -> anyhow::Result<RunningProgram> {
        let prog = RunningProgram {
            popen: exec.detached().popen()?,
            name: name.to_owned(),
        };
        debug!("started {} (pid {:?})", name, prog.pid());

        Ok(prog)
    }

    pub fn pid(&self) -> Option<u32> {
        self.popen.pid()
    }

    /// Block until the program exits or SIGINT is delivered to us. On SIGINT the
    /// program gets the signal forwarded and `stop_timeout` to terminate before
    /// it is killed.
    ///
    /// A terminal Ctrl+C reaches the whole process group, so the program may
    /// already be gone when we notice the flag. That still counts as an
    /// interrupt, whatever its exit status.
    pub fn wait(mut self, stop_timeout: Duration) -> anyhow::Result<ServeOutcome> {
        let stop = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&stop))?;

        loop {
            let exited = self.popen.wait_timeout(Duration::from_millis(200))?;
            if stop.load(Ordering::Relaxed) {
                break;
            }
            if let Some(status) = exited {
                return Ok(ServeOutcome::Exited(status));
            }
        }

        info!("interrupt received, stopping {}", self.name);
        let status = self.stop(stop_timeout)?;
        debug!("stopped with {:?}", status);
        Ok(ServeOutcome::Interrupted)
    }

    pub fn stop(mut self, timeout: Duration) -> anyhow::Result<ExitStatus> {
        if let Some(status) = self.popen.poll() {
            return Ok(status);
        }

        _ = self.popen.send_signal(libc::SIGINT);
        let status = match self.popen.wait_timeout(timeout)? {
            Some(status) => status,
            None => {
                warn!("{} did not stop within {:?}, killing it", self.name, timeout);
                _ = self.popen.kill();
                self.popen.wait()?
            }
        };

        Ok(status)
    }
}

/// Tests that wait for SIGINT or raise it hold this, the handler is process-wide.
#[cfg(test)]
pub static SIGINT_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
