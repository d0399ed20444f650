//! systemd integration
//!
//! The unit files ship embedded in the binary and are written out on
//! install; the rest is thin `systemctl` plumbing.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::Result;
use crate::paths::HostPaths;
use crate::process;

/// Bundled unit files installed into the systemd unit directory
const UNITS: &[(&str, &str)] = &[
    (
        "airplay-wyse-identity.service",
        include_str!("../systemd/airplay-wyse-identity.service"),
    ),
    (
        "airplay-wyse-alsa-policy.service",
        include_str!("../systemd/airplay-wyse-alsa-policy.service"),
    ),
    (
        "airplay-wyse-pw-policy.service",
        include_str!("../systemd/airplay-wyse-pw-policy.service"),
    ),
];

/// Drop-in override applied to the packaged shairport unit
const SHAIRPORT_OVERRIDE: (&str, &str) = (
    "shairport-sync.service.d/airplay-wyse.conf",
    include_str!("../systemd/overrides/shairport-sync.service.d/airplay-wyse.conf"),
);

/// Write the bundled units and the shairport drop-in
///
/// # Errors
///
/// Propagates I/O failures.
pub fn install_units(paths: &HostPaths) -> Result<Vec<PathBuf>> {
    let mut installed = Vec::new();
    fs::create_dir_all(&paths.systemd_dir)?;

    for (name, content) in UNITS {
        let dest = paths.systemd_dir.join(name);
        fs::write(&dest, content)?;
        installed.push(dest);
    }

    let (name, content) = SHAIRPORT_OVERRIDE;
    let dest = paths.systemd_dir.join(name);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&dest, content)?;
    installed.push(dest);

    info!(units = installed.len(), "systemd units installed");
    Ok(installed)
}

/// `systemctl daemon-reload`
///
/// # Errors
///
/// Propagates command failures.
pub fn daemon_reload() -> Result<()> {
    process::run(&["systemctl", "daemon-reload"])?;
    Ok(())
}

/// Enable a service, optionally starting it now
///
/// # Errors
///
/// Propagates command failures unless `ignore_failure` is set, in which case
/// they are logged and swallowed.
pub fn enable(service: &str, now: bool, ignore_failure: bool) -> Result<()> {
    let mut cmd = vec!["systemctl", "enable"];
    if now {
        cmd.push("--now");
    }
    cmd.push(service);
    match process::run(&cmd) {
        Ok(_) => Ok(()),
        Err(err) if ignore_failure => {
            warn!(service, error = %err, "enable failed, continuing");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Restart a service
///
/// # Errors
///
/// Propagates command failures.
pub fn restart(service: &str) -> Result<()> {
    process::run(&["systemctl", "restart", service])?;
    Ok(())
}

/// `is-active` state of a service, "inactive" when unreportable
#[must_use]
pub fn service_status(service: &str) -> String {
    match process::run_unchecked(&["systemctl", "is-active", service]) {
        Ok(out) => {
            let state = out.stdout.trim();
            if state.is_empty() {
                "inactive".to_string()
            } else {
                state.to_string()
            }
        }
        Err(_) => "inactive".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_install_units_writes_bundled_files() {
        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under_root(dir.path());

        let installed = install_units(&paths).unwrap();
        assert_eq!(installed.len(), 4);

        let identity = paths.systemd_dir.join("airplay-wyse-identity.service");
        let unit = std::fs::read_to_string(identity).unwrap();
        assert!(unit.contains("ExecStart=/usr/local/bin/aw identity ensure"));

        let dropin = paths
            .systemd_dir
            .join("shairport-sync.service.d/airplay-wyse.conf");
        assert!(dropin.exists());
    }
}
