//! Device ranking policy
//!
//! Pure functions: classification of a device's text labels into an output
//! class, the ranking that picks the playback device, and the sample-rate
//! anchor choice. Keeping these free of host access is what makes the
//! ordering guarantees directly testable.

use std::collections::BTreeSet;

use super::enumerate::PlaybackDevice;

/// Output class priority; lower is preferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OutputClass {
    /// Analog/headphone/speaker/DAC hints present
    Analog = 0,
    /// No hint matched
    Unknown = 1,
    /// HDMI or DisplayPort output
    Hdmi = 2,
    /// Pure digital (S/PDIF) output
    Digital = 3,
}

const ANALOG_HINTS: &[&str] = &["analog", "headphone", "speaker", "dac"];
const HDMI_HINTS: &[&str] = &["hdmi", "displayport"];
const DIGITAL_HINTS: &[&str] = &["digital", "spdif", "iec958"];

/// Classify a device by its description and card id
///
/// Case-insensitive substring match, either field counts. A device matching
/// no hint list is [`OutputClass::Unknown`].
#[must_use]
pub fn classify(description: &str, card_id: &str) -> OutputClass {
    let description = description.to_lowercase();
    let card_id = card_id.to_lowercase();
    let matched =
        |hints: &[&str]| hints.iter().any(|hint| description.contains(hint) || card_id.contains(hint));

    if matched(ANALOG_HINTS) {
        OutputClass::Analog
    } else if matched(HDMI_HINTS) {
        OutputClass::Hdmi
    } else if matched(DIGITAL_HINTS) {
        OutputClass::Digital
    } else {
        OutputClass::Unknown
    }
}

/// Pick the preferred playback device
///
/// USB cards always beat onboard audio; within the same bus kind the output
/// class decides; remaining ties go to the lowest `(card, device)` pair so
/// the result is deterministic across runs.
#[must_use]
pub fn select(devices: &[PlaybackDevice]) -> Option<&PlaybackDevice> {
    devices.iter().min_by_key(|device| {
        (
            u8::from(!device.is_usb),
            classify(&device.description, &device.card_id),
            device.card,
            device.device,
        )
    })
}

/// Choose the sample-rate anchor for a set of supported rates
///
/// Returns `(anchor_hz, requires_soxr)`. 44100 wins when supported; 48000 is
/// the fallback anchor and forces resampling of 44.1 kHz sources; an
/// unreadable/empty rate set defaults to 44100 with no resampling.
#[must_use]
pub fn choose_anchor(rates: &BTreeSet<u32>) -> (u32, bool) {
    let anchor = if rates.contains(&44100) {
        44100
    } else if rates.contains(&48000) {
        48000
    } else {
        44100
    };
    let requires_soxr = anchor == 48000 && !rates.contains(&44100);
    (anchor, requires_soxr)
}
