//! Identity record persistence

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Minimal triple whose change invalidates dependent receiver state
///
/// Compared by structural equality across runs. A missing record loads as
/// the all-none default, which never equals a freshly derived fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Stable machine identifier
    pub machine_id: Option<String>,
    /// Short hostname
    pub host: Option<String>,
    /// Lowercase colon-separated hardware address
    pub mac: Option<String>,
}

/// Persisted identity record: fingerprint plus last-change timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// The fingerprint fields, stored flat
    #[serde(flatten)]
    pub fingerprint: Fingerprint,
    /// UTC second-precision timestamp of the last identity change
    pub updated: Option<String>,
}

/// Load the record; absent or corrupt files resolve to the default
#[must_use]
pub fn load(path: &Path) -> IdentityRecord {
    fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

/// Atomically replace the record on disk
///
/// # Errors
///
/// Propagates I/O and serialization failures.
pub fn save(path: &Path, record: &IdentityRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    let mut body = serde_json::to_string_pretty(record)?;
    body.push('\n');
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
