//! Identity derivation
//!
//! Computes the stable identity the receiver advertises — network interface,
//! hardware-like address, protocol device id, display name — and detects
//! when a configuration-invalidating change occurred. The fingerprint
//! `{machine_id, host, mac}` persists across reboots; when it changes (or a
//! reset is forced) the receiver's cached state is cleared so stale pairing
//! data cannot survive an identity swap.

mod cleanup;
mod derive;
mod record;

pub use cleanup::clear_receiver_state;
pub use derive::{
    DEFAULT_NAME, ZERO_MAC, airplay_device_id, default_name, read_machine_id, short_hostname,
    synthetic_mac,
};
pub use record::{Fingerprint, IdentityRecord};

use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::error::Result;
use crate::netif;
use crate::paths::HostPaths;
use crate::state::{ConfigState, StateStore};

/// Environment variables consulted for the preferred interface, in order,
/// before any persisted configuration
pub const IFACE_ENV_VARS: &[&str] =
    &["AIRPLAY_WYSE_IFACE", "AIRPLAY_WYSE_INTERFACE", "AVAHI_IFACE"];

/// Outcome of an identity run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityResult {
    /// Resolved hardware address, lowercase colon-sextet
    pub mac: String,
    /// Interface chosen for advertisement
    pub interface: Option<String>,
    /// Whether this run rewrote identity state
    pub changed: bool,
    /// Whether the address was synthesized from the machine identifier
    pub synthetic: bool,
}

fn env_interface() -> Option<String> {
    IFACE_ENV_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|value| !value.is_empty()))
}

/// Ensure a stable advertised identity
///
/// Resolves interface and address, derives the dependent config fields,
/// compares the identity fingerprint against the last persisted one, and on
/// change clears the receiver's cached state and rewrites the record.
/// Config fields are persisted in one merged update, and only when at least
/// one actually changed value.
///
/// # Errors
///
/// [`crate::ProvisionError::IdentityUnavailable`] when the machine
/// identifier cannot be read; otherwise only record/state write failures.
pub fn ensure_identity(paths: &HostPaths, store: &StateStore, force: bool) -> Result<IdentityResult> {
    let state = store.load();
    let mut config = ConfigState::from_state(&state);

    let hint = env_interface().or_else(|| config.interface.clone());
    let interface = netif::choose_interface(paths, hint.as_deref());

    let machine_id = derive::read_machine_id(paths)?;

    let mut mac = config
        .hardware_address
        .clone()
        .filter(|address| !address.is_empty())
        .or_else(|| {
            interface
                .as_deref()
                .and_then(|iface| netif::link_address(paths, iface))
        })
        .unwrap_or_else(|| derive::ZERO_MAC.to_string());
    let mut synthetic = false;
    if mac.is_empty() || mac == derive::ZERO_MAC {
        mac = derive::synthetic_mac(&machine_id);
        synthetic = true;
    }
    let mac = mac.to_lowercase();

    let airplay_id = derive::airplay_device_id(&mac);

    let real_mac = if synthetic { None } else { Some(mac.as_str()) };
    let mut name = config
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| derive::default_name(real_mac));
    if name.trim().eq_ignore_ascii_case(derive::DEFAULT_NAME) {
        name = derive::default_name(real_mac);
    }

    let mut config_changed = false;
    {
        let mut set = |field: &mut Option<String>, value: Option<String>| {
            if *field != value {
                *field = value;
                config_changed = true;
            }
        };
        set(&mut config.interface, interface.clone());
        set(&mut config.hardware_address, Some(mac.clone()));
        set(&mut config.airplay_device_id, Some(airplay_id));
        set(&mut config.name, Some(name));
    }

    let record_path = paths.identity_file();
    let previous = record::load(&record_path);
    let fingerprint = Fingerprint {
        machine_id: Some(machine_id),
        host: Some(derive::short_hostname()),
        mac: Some(mac.clone()),
    };
    let changed = force || fingerprint != previous.fingerprint;

    let mut current = previous;
    if changed {
        info!(mac = %mac, force, "identity changed, invalidating receiver state");
        cleanup::clear_receiver_state(paths);
        current = IdentityRecord {
            fingerprint,
            updated: Some(Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        };
        record::save(&record_path, &current)?;
    }

    if config_changed || changed {
        store.update(&json!({
            "config": serde_json::to_value(&config)?,
            "identity": serde_json::to_value(&current)?,
        }))?;
    }

    Ok(IdentityResult {
        mac,
        interface,
        changed,
        synthetic,
    })
}
