//! Policy assembly and the asound.conf writer

use std::collections::BTreeSet;
use std::fs;

use serde_json::{Value, json};
use tracing::info;

use super::{enumerate, selection};
use crate::error::Result;
use crate::paths::HostPaths;
use crate::state::StateStore;

/// State key the policy summary is persisted under
pub const STATE_KEY: &str = "alsa_policy";

/// Outcome of device selection and rate anchoring
#[derive(Debug, Clone, PartialEq)]
pub struct AlsaPolicy {
    /// ALSA device handle, e.g. `hw:1,0`
    pub device: String,
    /// Sample-rate anchor, 44100 or 48000
    pub anchor_hz: u32,
    /// Whether 44.1 kHz sources need resampling to reach the anchor
    pub requires_soxr: bool,
    /// Optional mixer control
    pub mixer: Option<String>,
    /// Card index, absent for unmanaged overrides
    pub card: Option<u32>,
    /// Card identifier from procfs
    pub card_id: Option<String>,
    /// Sub-device index
    pub dev_num: Option<u32>,
    /// USB bus membership; None when unknown
    pub is_usb: Option<bool>,
    /// True iff this run altered persisted state or the asound fragment
    pub changed: bool,
}

impl AlsaPolicy {
    /// Persisted summary: everything except the transient `changed`
    #[must_use]
    pub fn to_state(&self) -> Value {
        json!({
            "device": self.device,
            "anchor_hz": self.anchor_hz,
            "requires_soxr": self.requires_soxr,
            "mixer": self.mixer,
            "card": self.card,
            "card_id": self.card_id,
            "dev_num": self.dev_num,
            "is_usb": self.is_usb,
        })
    }
}

/// Chosen device plus whatever sysfs metadata was resolvable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenDevice {
    /// Device handle passed to the receiver
    pub device: String,
    /// Card index, when the handle is managed
    pub card: Option<u32>,
    /// Sub-device index, when the handle is managed
    pub dev_num: Option<u32>,
    /// Card identifier
    pub card_id: Option<String>,
    /// USB bus membership
    pub is_usb: Option<bool>,
}

/// Parse a managed `hw:<card>,<device>` handle; anything else is opaque
pub(super) fn parse_hw(handle: &str) -> Option<(u32, u32)> {
    let rest = handle.strip_prefix("hw:")?;
    let (card, device) = rest.split_once(',')?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(card) || !digits(device) {
        return None;
    }
    Some((card.parse().ok()?, device.parse().ok()?))
}

/// Resolve the playback device, honoring a manual override
///
/// A managed override (`hw:<card>,<device>`) is trusted verbatim but still
/// gets its card id and USB status resolved from the host. An override in
/// any other syntax passes through opaquely with all metadata unknown.
/// Without an override the ranked enumeration decides; an empty enumeration
/// falls back to `hw:0,0`.
#[must_use]
pub fn choose_device(paths: &HostPaths, manual: Option<&str>) -> ChosenDevice {
    if let Some(manual) = manual {
        if let Some((card, dev_num)) = parse_hw(manual) {
            return ChosenDevice {
                device: manual.to_string(),
                card: Some(card),
                dev_num: Some(dev_num),
                card_id: enumerate::read_card_id(paths, card),
                is_usb: Some(enumerate::is_usb_card(paths, card)),
            };
        }
        return ChosenDevice {
            device: manual.to_string(),
            card: None,
            dev_num: None,
            card_id: None,
            is_usb: None,
        };
    }

    let devices = enumerate::list_playback_devices(paths);
    match selection::select(&devices) {
        Some(best) => ChosenDevice {
            device: format!("hw:{},{}", best.card, best.device),
            card: Some(best.card),
            dev_num: Some(best.device),
            card_id: Some(best.card_id.clone()),
            is_usb: Some(best.is_usb),
        },
        None => ChosenDevice {
            device: "hw:0,0".to_string(),
            card: None,
            dev_num: None,
            card_id: None,
            is_usb: None,
        },
    }
}

fn render_asound(card: Option<u32>, dev_num: Option<u32>) -> String {
    let card = card.unwrap_or(0);
    let dev_num = dev_num.unwrap_or(0);
    format!(
        "# Managed by AirPlay Wyse
pcm.airplay_wyse_hw {{
    type hw
    card {card}
    device {dev_num}
}}

pcm.!default {{
    type plug
    slave.pcm airplay_wyse_hw
}}

ctl.!default {{
    type hw
    card {card}
}}
"
    )
}

/// Regenerate the asound fragment; returns whether anything was written
///
/// Content equality short-circuits the write so an unchanged policy does not
/// trigger spurious service restarts.
fn ensure_asound(paths: &HostPaths, card: Option<u32>, dev_num: Option<u32>) -> Result<bool> {
    let content = render_asound(card, dev_num);
    if let Ok(existing) = fs::read_to_string(&paths.asound_conf) {
        if existing == content {
            return Ok(false);
        }
    }
    if let Some(parent) = paths.asound_conf.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = paths.asound_conf.with_extension("tmp");
    fs::write(&tmp, &content)?;
    fs::rename(&tmp, &paths.asound_conf)?;
    Ok(true)
}

/// Select the playback device and rate anchor, and apply both
///
/// # Errors
///
/// Enumeration and sysfs reads never fail; only the final asound write and
/// the state commit can, and those propagate unmodified.
pub fn ensure_policy(
    paths: &HostPaths,
    store: &StateStore,
    manual: Option<&str>,
) -> Result<AlsaPolicy> {
    let cached = store.load()[STATE_KEY].clone();

    let chosen = choose_device(paths, manual);
    let rates = match chosen.card {
        Some(card) => enumerate::read_rates(paths, card),
        None => BTreeSet::new(),
    };
    let (anchor_hz, requires_soxr) = selection::choose_anchor(&rates);

    let mut policy = AlsaPolicy {
        device: chosen.device,
        anchor_hz,
        requires_soxr,
        mixer: None,
        card: chosen.card,
        card_id: chosen.card_id,
        dev_num: chosen.dev_num,
        is_usb: chosen.is_usb,
        changed: false,
    };

    let rewrote = ensure_asound(paths, policy.card, policy.dev_num)?;
    policy.changed = rewrote || policy.to_state() != cached;
    info!(
        device = %policy.device,
        anchor_hz = policy.anchor_hz,
        requires_soxr = policy.requires_soxr,
        changed = policy.changed,
        "alsa policy ensured"
    );

    store.update(&json!({ "alsa_policy": policy.to_state() }))?;
    Ok(policy)
}
