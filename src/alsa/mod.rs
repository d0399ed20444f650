//! ALSA device policy
//!
//! Enumerates playback hardware, ranks it by a fixed priority policy, picks
//! the sample-rate anchor, and pins the winner as the system default output
//! via `/etc/asound.conf`. Selection is pure; all host access lives in
//! [`enumerate`] and the config writer.

mod enumerate;
mod policy;
mod selection;

pub use enumerate::{
    PlaybackDevice, is_usb_card, list_playback_devices, parse_listing, read_card_id, read_rates,
};
pub use policy::{AlsaPolicy, ChosenDevice, STATE_KEY, choose_device, ensure_policy};
pub use selection::{OutputClass, choose_anchor, classify, select};
