//! Best-effort invalidation of the receiver daemon's cached state
//!
//! Runs when the identity fingerprint changed: a receiver advertising a new
//! identity must not keep pairing data derived from the old one. Each step
//! is independently fallible; failures are logged and swallowed, never
//! propagated.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::paths::HostPaths;
use crate::process;

type StepResult = std::result::Result<(), String>;

/// Stop the receiver and remove its state, cache and per-user directories
pub fn clear_receiver_state(paths: &HostPaths) {
    let steps: [(&str, StepResult); 3] = [
        ("stop shairport-sync", stop_service()),
        ("remove state directories", remove_state_dirs(paths)),
        ("remove service-user directories", remove_user_dirs(paths)),
    ];
    for (step, result) in steps {
        match result {
            Ok(()) => debug!(step, "receiver cleanup step done"),
            Err(reason) => warn!(step, reason = %reason, "receiver cleanup step failed, continuing"),
        }
    }
}

fn stop_service() -> StepResult {
    // A non-zero exit is fine: the unit may not be installed yet.
    match process::run_unchecked(&["systemctl", "stop", "shairport-sync.service"]) {
        Ok(_) => Ok(()),
        Err(err) => Err(err.to_string()),
    }
}

fn remove_state_dirs(paths: &HostPaths) -> StepResult {
    let mut failures = Vec::new();
    for dir in &paths.shairport_state_dirs {
        if let Err(err) = remove_dir(dir) {
            failures.push(format!("{}: {err}", dir.display()));
        }
    }
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("; "))
    }
}

fn remove_user_dirs(paths: &HostPaths) -> StepResult {
    let Some(user) = service_user() else {
        return Ok(());
    };
    let home = paths.home_root.join(&user);
    if !home.exists() {
        return Ok(());
    }
    let mut failures = Vec::new();
    for sub in [
        home.join(".config/shairport-sync"),
        home.join(".local/share/shairport-sync"),
        home.join(".cache/shairport-sync"),
    ] {
        if let Err(err) = remove_dir(&sub) {
            failures.push(format!("{}: {err}", sub.display()));
        }
    }
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("; "))
    }
}

fn remove_dir(dir: &Path) -> std::io::Result<()> {
    if dir.exists() { fs::remove_dir_all(dir) } else { Ok(()) }
}

/// Resolve the receiver's service user, when systemd can report one
fn service_user() -> Option<String> {
    let output = process::run_unchecked(&[
        "systemctl",
        "show",
        "-p",
        "User",
        "shairport-sync.service",
    ])
    .ok()?;
    output
        .stdout
        .trim()
        .strip_prefix("User=")
        .map(|user| user.trim().to_string())
        .filter(|user| !user.is_empty())
}
