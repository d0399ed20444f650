//! Hardware enumeration
//!
//! Scrapes `aplay -l` and the sound sysfs/procfs trees. The `aplay` line
//! format is an external interface, not a stable API; [`parse_listing`] is
//! the one place to touch if its output drifts. Every absence here degrades
//! to empty/unknown — enumeration never fails the caller.

use std::collections::BTreeSet;
use std::fs;

use tracing::debug;

use crate::paths::HostPaths;
use crate::process;

/// One playback device discovered on the host, rebuilt fresh each run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackDevice {
    /// Card index, stable per boot
    pub card: u32,
    /// Short OS-assigned card identifier
    pub card_id: String,
    /// Sub-device within the card
    pub device: u32,
    /// Free-text label, may be empty
    pub description: String,
    /// Whether the card sits on the USB bus
    pub is_usb: bool,
}

/// List playback devices via `aplay -l`
///
/// A missing tool or non-zero exit yields an empty list.
#[must_use]
pub fn list_playback_devices(paths: &HostPaths) -> Vec<PlaybackDevice> {
    let output = match process::run_unchecked(&["aplay", "-l"]) {
        Ok(out) if out.success() => out.stdout,
        Ok(_) | Err(_) => {
            debug!("aplay unavailable, no playback devices listed");
            return Vec::new();
        }
    };
    let mut devices = parse_listing(&output);
    for device in &mut devices {
        device.is_usb = is_usb_card(paths, device.card);
    }
    devices
}

/// Parse the `card N: ID [...], device M: Desc [Alias]` lines of `aplay -l`
///
/// `is_usb` is left false; [`list_playback_devices`] fills it from sysfs.
/// Lines that do not match the pattern are skipped.
#[must_use]
pub fn parse_listing(output: &str) -> Vec<PlaybackDevice> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<PlaybackDevice> {
    let rest = line.trim_start().strip_prefix("card ")?;
    let (card, rest) = rest.split_once(':')?;
    let card = card.trim().parse().ok()?;

    let rest = rest.trim_start();
    let card_id: String = rest
        .chars()
        .take_while(|&c| !c.is_whitespace() && c != ',')
        .collect();
    if card_id.is_empty() {
        return None;
    }

    // Take the last "device N:" occurrence that parses; card aliases may
    // themselves contain the word.
    let (device, tail) = rest
        .match_indices("device ")
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .find_map(|(pos, _)| {
        let after = &rest[pos + "device ".len()..];
        let (number, tail) = after.split_once(':')?;
        let device: u32 = number.trim().parse().ok()?;
        Some((device, tail))
    })?;

    // Description runs from the device label to the next bracketed alias.
    let description = tail.split('[').next().unwrap_or_default().trim().to_string();

    Some(PlaybackDevice {
        card,
        card_id,
        device,
        description,
        is_usb: false,
    })
}

/// Whether the card's bus metadata marks it as USB
///
/// True iff both vendor-id and product-id files are exposed.
#[must_use]
pub fn is_usb_card(paths: &HostPaths, card: u32) -> bool {
    let device = paths
        .sys_class_sound
        .join(format!("card{card}"))
        .join("device");
    device.join("idVendor").exists() && device.join("idProduct").exists()
}

/// Supported sample rates scraped from the card's stream status files
///
/// Missing files yield an empty set, never an error.
#[must_use]
pub fn read_rates(paths: &HostPaths, card: u32) -> BTreeSet<u32> {
    let mut rates = BTreeSet::new();
    let base = paths.proc_asound.join(format!("card{card}"));
    let Ok(entries) = fs::read_dir(&base) else {
        return rates;
    };
    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with("stream") {
            continue;
        }
        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue;
        };
        collect_rates(&content, &mut rates);
    }
    rates
}

/// Pull every 4-6 digit token off the first `Rates:` line
fn collect_rates(content: &str, rates: &mut BTreeSet<u32>) {
    let Some(line) = content
        .lines()
        .find_map(|line| line.trim_start().strip_prefix("Rates:"))
    else {
        return;
    };
    for token in line.split(|c: char| !c.is_ascii_digit()) {
        if (4..=6).contains(&token.len()) {
            if let Ok(rate) = token.parse::<u32>() {
                rates.insert(rate);
            }
        }
    }
}

/// The card's short identifier from procfs, absent when unreadable
#[must_use]
pub fn read_card_id(paths: &HostPaths, card: u32) -> Option<String> {
    let path = paths.proc_asound.join(format!("card{card}")).join("id");
    let id = fs::read_to_string(path).ok()?;
    let id = id.trim();
    if id.is_empty() { None } else { Some(id.to_string()) }
}
