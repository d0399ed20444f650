//! Typed views over the on-disk state document

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// The `config` sub-document: receiver settings accumulated across runs
///
/// Every field is optional so that readers of older or partial documents get
/// documented defaults instead of parse failures. Keys this version does not
/// know about are retained in `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigState {
    /// Advertised display name
    pub name: Option<String>,
    /// ALSA output device handed to the receiver (usually "default")
    pub device: Option<String>,
    /// Optional ALSA mixer control
    pub mixer: Option<String>,
    /// Network interface for service advertisement
    pub interface: Option<String>,
    /// Colon-separated lowercase hardware address
    pub hardware_address: Option<String>,
    /// Protocol device id derived from the hardware address
    pub airplay_device_id: Option<String>,
    /// Fixed output rate, set when the hardware needs resampling
    pub output_rate: Option<u32>,
    /// Whether the receiver logs playback statistics
    pub statistics: Option<bool>,
    /// Resampler selection ("soxr" when available and needed)
    pub interpolation: Option<String>,
    /// Unknown keys, preserved through load/store cycles
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigState {
    /// Extract the typed config view from a loaded state document
    ///
    /// Missing or malformed `config` keys resolve to the all-none default.
    #[must_use]
    pub fn from_state(state: &Value) -> Self {
        state
            .get("config")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }
}

/// Baseline document merged under whatever is on disk
#[must_use]
pub fn default_state() -> Value {
    json!({
        "config": {
            "name": null,
            "device": null,
            "mixer": null,
            "interface": null,
            "hardware_address": null,
            "airplay_device_id": null,
            "output_rate": null,
            "statistics": false,
            "interpolation": null,
        },
        "alsa_policy": {},
        "pipewire_policy": {},
        "identity": {},
    })
}
