//! External command execution
//!
//! Thin wrappers around [`std::process::Command`]. Call sites where a tool
//! may legitimately be absent (`aplay`, `ip`) use the unchecked variants and
//! degrade; load-bearing calls use the checked variants, which map failures
//! onto [`ProvisionError`].

use std::io;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::{ProvisionError, Result};

/// Captured output of a finished external command
#[derive(Debug)]
pub struct CmdOutput {
    /// Exit status (-1 if terminated by signal)
    pub status: i32,
    /// Captured stdout, lossily decoded
    pub stdout: String,
    /// Captured stderr, lossily decoded
    pub stderr: String,
}

impl CmdOutput {
    /// Whether the command exited zero
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Run a command and capture its output without judging the exit status
///
/// # Errors
///
/// Returns the spawn error when the executable cannot be started (missing
/// binary, permission). A non-zero exit is not an error at this layer.
pub fn run_unchecked(cmd: &[&str]) -> io::Result<CmdOutput> {
    run_unchecked_env(cmd, &[])
}

/// [`run_unchecked`] with extra environment variables
///
/// # Errors
///
/// Returns the spawn error when the executable cannot be started.
pub fn run_unchecked_env(cmd: &[&str], envs: &[(&str, &str)]) -> io::Result<CmdOutput> {
    debug!(command = %cmd.join(" "), "running");
    let mut command = Command::new(cmd[0]);
    command.args(&cmd[1..]);
    for (key, value) in envs {
        command.env(key, value);
    }
    let output = command.output()?;
    Ok(CmdOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a load-bearing command; any failure aborts the operation
///
/// # Errors
///
/// [`ProvisionError::CommandUnavailable`] when the executable cannot be
/// started, [`ProvisionError::CommandFailed`] on a non-zero exit.
pub fn run(cmd: &[&str]) -> Result<CmdOutput> {
    run_env(cmd, &[])
}

/// [`run`] with extra environment variables
///
/// # Errors
///
/// Same failure modes as [`run`].
pub fn run_env(cmd: &[&str], envs: &[(&str, &str)]) -> Result<CmdOutput> {
    let output =
        run_unchecked_env(cmd, envs).map_err(|source| ProvisionError::CommandUnavailable {
            command: cmd.join(" "),
            source,
        })?;
    if !output.success() {
        return Err(ProvisionError::CommandFailed {
            command: cmd.join(" "),
            status: output.status,
        });
    }
    Ok(output)
}

/// Refuse to continue unless running as root
///
/// # Errors
///
/// [`ProvisionError::NotRoot`] when the effective uid is not 0.
pub fn ensure_root() -> Result<()> {
    if nix::unistd::geteuid().is_root() {
        Ok(())
    } else {
        Err(ProvisionError::NotRoot)
    }
}

/// Locate an executable on `PATH`
#[must_use]
pub fn which(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}
