//! PipeWire clock policy
//!
//! When PipeWire is present, drop a fragment that widens the clock's allowed
//! rates (so the receiver can run at the hardware anchor) and optionally
//! pins a forced rate. Hosts without PipeWire skip the write entirely.

use std::fs;

use serde_json::{Value, json};
use tracing::info;

use crate::error::{ProvisionError, Result};
use crate::paths::HostPaths;
use crate::process;
use crate::state::StateStore;

/// Clock rates the audio server is allowed to follow
pub const ALLOWED_RATES: [u32; 4] = [44100, 48000, 88200, 96000];

const CONF_NAME: &str = "90-airplay-wyse.conf";

/// Outcome of a PipeWire policy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeWirePolicy {
    /// Whether PipeWire was detected on the host
    pub present: bool,
    /// Whether the fragment was (re)written this run
    pub changed: bool,
    /// Pinned clock rate, when one was requested
    pub force_rate: Option<u32>,
}

impl PipeWirePolicy {
    /// Persisted summary
    #[must_use]
    pub fn to_state(&self) -> Value {
        json!({
            "present": self.present,
            "changed": self.changed,
            "force_rate": self.force_rate,
        })
    }
}

/// Reject rates outside the allowed set before any mutation
///
/// # Errors
///
/// [`ProvisionError::InvalidRate`] for any rate not in [`ALLOWED_RATES`].
pub fn validate_rate(rate: u32) -> Result<()> {
    if ALLOWED_RATES.contains(&rate) {
        Ok(())
    } else {
        Err(ProvisionError::InvalidRate { rate })
    }
}

fn pipewire_present(paths: &HostPaths) -> bool {
    ["pw-cli", "pw-dump", "pipewire"]
        .iter()
        .any(|tool| process::which(tool).is_some())
        || paths.pipewire_etc_dir.exists()
}

fn render(force_rate: Option<u32>) -> String {
    let rates = ALLOWED_RATES
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    let mut out = format!(
        "# Managed by AirPlay Wyse\ncontext.properties = {{\n  default.clock.allowed-rates = [ {rates} ]\n"
    );
    if let Some(rate) = force_rate {
        out.push_str(&format!("  default.clock.force-rate = {rate}\n"));
    }
    out.push_str("}\n");
    out
}

/// Ensure the clock-policy fragment matches the requested rate
///
/// # Errors
///
/// [`ProvisionError::InvalidRate`] for a rate outside the accepted set
/// (rejected before any write); otherwise only I/O and state-commit
/// failures.
pub fn ensure_policy(
    paths: &HostPaths,
    store: &StateStore,
    force_rate: Option<u32>,
) -> Result<PipeWirePolicy> {
    if !pipewire_present(paths) {
        let policy = PipeWirePolicy {
            present: false,
            changed: false,
            force_rate: None,
        };
        store.update(&json!({"pipewire_policy": policy.to_state()}))?;
        return Ok(policy);
    }

    if let Some(rate) = force_rate {
        validate_rate(rate)?;
    }

    fs::create_dir_all(&paths.pipewire_conf_dir)?;
    let conf = paths.pipewire_conf_dir.join(CONF_NAME);
    let content = render(force_rate);

    let mut changed = false;
    let up_to_date = matches!(fs::read_to_string(&conf), Ok(existing) if existing == content);
    if !up_to_date {
        let tmp = conf.with_extension("tmp");
        fs::write(&tmp, &content)?;
        fs::rename(&tmp, &conf)?;
        changed = true;
    }

    let policy = PipeWirePolicy {
        present: true,
        changed,
        force_rate,
    };
    info!(changed, force_rate, "pipewire policy ensured");
    store.update(&json!({"pipewire_policy": policy.to_state()}))?;
    Ok(policy)
}
