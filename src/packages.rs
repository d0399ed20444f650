//! Debian package management
//!
//! Idempotent installs: `dpkg -s` decides whether apt needs to run at all.

use tracing::info;

use crate::error::Result;
use crate::process;

/// Install a package unless dpkg already reports it
///
/// # Errors
///
/// Propagates apt failures; a missing or unhappy `dpkg` merely routes
/// through the install path.
pub fn ensure_package(name: &str) -> Result<()> {
    if let Ok(status) = process::run_unchecked(&["dpkg", "-s", name]) {
        if status.success() {
            return Ok(());
        }
    }

    info!(package = name, "installing");
    let env = [("DEBIAN_FRONTEND", "noninteractive")];
    process::run_env(&["apt-get", "update", "-y"], &env)?;
    process::run_env(&["apt-get", "install", "-y", name], &env)?;
    Ok(())
}

/// Install every package in order, stopping at the first failure
///
/// # Errors
///
/// Propagates the first [`ensure_package`] failure.
pub fn ensure_packages(names: &[&str]) -> Result<()> {
    for name in names {
        ensure_package(name)?;
    }
    Ok(())
}
