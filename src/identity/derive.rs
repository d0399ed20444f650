//! Address, device-id and name derivation

use sha2::{Digest, Sha256};

use crate::error::{ProvisionError, Result};
use crate::paths::HostPaths;

/// Placeholder reported by interfaces with no burned-in address
pub const ZERO_MAC: &str = "00:00:00:00:00:00";

/// Bare default advertised name
pub const DEFAULT_NAME: &str = "Wyse DAC";

/// Read the host's stable machine identifier
///
/// # Errors
///
/// [`ProvisionError::IdentityUnavailable`] when the file cannot be read.
/// There is no safe synthetic fallback without it.
pub fn read_machine_id(paths: &HostPaths) -> Result<String> {
    std::fs::read_to_string(&paths.machine_id)
        .map(|raw| raw.trim().to_string())
        .map_err(|source| ProvisionError::IdentityUnavailable {
            path: paths.machine_id.display().to_string(),
            source,
        })
}

/// Short hostname: the first dot-delimited label
#[must_use]
pub fn short_hostname() -> String {
    let name = hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.split('.').next().unwrap_or_default().to_string()
}

/// Deterministic locally-administered address from the machine identifier
///
/// First byte of SHA-256(machine-id) with the locally-administered bit
/// forced on and the multicast bit off, then the digest's next five bytes;
/// lowercase colon-separated sextet.
#[must_use]
pub fn synthetic_mac(machine_id: &str) -> String {
    let digest = Sha256::digest(machine_id.as_bytes());
    let mut octets = [0u8; 6];
    octets[0] = (digest[0] | 0x02) & 0xFE;
    octets[1..].copy_from_slice(&digest[1..6]);
    octets
        .iter()
        .map(|octet| format!("{octet:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Protocol device id: colons stripped, uppercased, `0x...L`
#[must_use]
pub fn airplay_device_id(mac: &str) -> String {
    format!("0x{}L", mac.replace(':', "").to_uppercase())
}

fn mac_suffix(mac: &str) -> String {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() >= 2 {
        format!("{}{}", parts[parts.len() - 2], parts[parts.len() - 1]).to_uppercase()
    } else {
        let hex = mac.replace(':', "").to_uppercase();
        hex[hex.len().saturating_sub(4)..].to_string()
    }
}

/// Default advertised name
///
/// Suffixed with the address tail only for a real hardware address; callers
/// pass `None` for synthetic addresses, which keep the bare default.
#[must_use]
pub fn default_name(mac: Option<&str>) -> String {
    match mac {
        Some(mac) => format!("{DEFAULT_NAME}-{}", mac_suffix(mac)),
        None => DEFAULT_NAME.to_string(),
    }
}
