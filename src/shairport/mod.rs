//! Shairport stack probe and config rendering
//!
//! The receiver itself is shairport-sync plus nqptp; this module makes sure
//! both are installed, scrapes their capabilities from the version banner,
//! and renders the receiver's config file from the bundled template.

mod config;
#[cfg(test)]
mod tests;

pub use config::{DEFAULT_TEMPLATE, ShairportConfig, render_config, write_config};

use crate::error::Result;
use crate::packages;
use crate::process;

const SHAIRPORT_PKG: &str = "shairport-sync";
const NQPTP_PKG: &str = "nqptp";

/// Capabilities of the installed receiver stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackStatus {
    /// shairport-sync is installed
    pub shairport_installed: bool,
    /// nqptp is installed
    pub nqptp_installed: bool,
    /// The build advertises `AirPlay` 2 support
    pub has_airplay2: bool,
    /// The build links libsoxr for high-quality resampling
    pub has_soxr: bool,
}

/// Scrape capability tokens off a `shairport-sync -V` banner
#[must_use]
pub fn parse_capabilities(banner: &str) -> (bool, bool) {
    let has_airplay2 = banner.contains("AirPlay2");
    let has_soxr = banner.to_lowercase().contains("soxr");
    (has_airplay2, has_soxr)
}

/// Install the receiver packages and probe their capabilities
///
/// # Errors
///
/// Propagates package-installation failures; a failing version probe only
/// downgrades the reported capabilities.
pub fn ensure_stack() -> Result<StackStatus> {
    packages::ensure_packages(&[SHAIRPORT_PKG, NQPTP_PKG])?;

    let (has_airplay2, has_soxr) = match process::run_unchecked(&["shairport-sync", "-V"]) {
        Ok(out) if out.success() => {
            let banner = if out.stdout.is_empty() {
                out.stderr
            } else {
                out.stdout
            };
            parse_capabilities(&banner)
        }
        Ok(_) | Err(_) => (false, false),
    };

    Ok(StackStatus {
        shairport_installed: true,
        nqptp_installed: true,
        has_airplay2,
        has_soxr,
    })
}
