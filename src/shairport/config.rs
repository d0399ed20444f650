//! Receiver config rendering
//!
//! Simple `{{PLACEHOLDER}}` substitution over the bundled template, then a
//! pass that drops optional directives whose value is empty — shairport's
//! parser rejects blank values for several of them.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::state::ConfigState;

/// Bundled minimal config template
pub const DEFAULT_TEMPLATE: &str = include_str!("../../cfg/shairport-sync.minimal.conf.tmpl");

/// Optional directives, dropped when their placeholder rendered empty
const OPTIONAL_DIRECTIVES: &[(&str, &str)] = &[
    ("ALSA_MIXER", "mixer_control_name"),
    ("ALSA_OUTPUT_RATE", "output_rate"),
    ("INTERPOLATION", "interpolation"),
    ("AVAHI_IFACE", "interface"),
    ("HW_ADDR", "hardware_address"),
    ("STATISTICS", "statistics"),
    ("AIRPLAY_DEVICE_ID", "airplay_device_id"),
];

/// Values substituted into the receiver config template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShairportConfig {
    /// Advertised name
    pub name: String,
    /// ALSA output device
    pub device: String,
    /// Optional mixer control
    pub mixer: Option<String>,
    /// Advertisement interface
    pub interface: Option<String>,
    /// Hardware address override for the advertiser
    pub hardware_address: Option<String>,
    /// Fixed output rate, set when resampling is required
    pub output_rate: Option<u32>,
    /// Whether playback statistics are logged
    pub statistics: bool,
    /// Resampler selection
    pub interpolation: Option<String>,
    /// Protocol device id
    pub airplay_device_id: Option<String>,
}

impl ShairportConfig {
    /// Build from the persisted config document, applying defaults
    #[must_use]
    pub fn from_config(config: &ConfigState) -> Self {
        Self {
            name: config
                .name
                .clone()
                .unwrap_or_else(|| "Wyse DAC".to_string()),
            device: config
                .device
                .clone()
                .unwrap_or_else(|| "default".to_string()),
            mixer: config.mixer.clone(),
            interface: config.interface.clone(),
            hardware_address: config.hardware_address.clone(),
            output_rate: config.output_rate,
            statistics: config.statistics.unwrap_or(false),
            interpolation: config.interpolation.clone(),
            airplay_device_id: config.airplay_device_id.clone(),
        }
    }

    fn context(&self) -> Vec<(&'static str, String)> {
        vec![
            ("AIRPLAY_NAME", self.name.clone()),
            ("ALSA_DEVICE", self.device.clone()),
            ("ALSA_MIXER", self.mixer.clone().unwrap_or_default()),
            ("AVAHI_IFACE", self.interface.clone().unwrap_or_default()),
            (
                "HW_ADDR",
                self.hardware_address.clone().unwrap_or_default(),
            ),
            (
                "ALSA_OUTPUT_RATE",
                self.output_rate.map(|rate| rate.to_string()).unwrap_or_default(),
            ),
            (
                "STATISTICS",
                if self.statistics {
                    "yes".to_string()
                } else {
                    String::new()
                },
            ),
            (
                "INTERPOLATION",
                self.interpolation.clone().unwrap_or_default(),
            ),
            (
                "AIRPLAY_DEVICE_ID",
                self.airplay_device_id.clone().unwrap_or_default(),
            ),
        ]
    }
}

/// Render the receiver config from a template
#[must_use]
pub fn render_config(config: &ShairportConfig, template: &str) -> String {
    let context = config.context();
    let mut text = template.to_string();
    for (key, value) in &context {
        text = text.replace(&format!("{{{{{key}}}}}"), value);
    }
    strip_optional_lines(&text, &context)
}

fn strip_optional_lines(rendered: &str, context: &[(&'static str, String)]) -> String {
    let empty_directives: Vec<&str> = OPTIONAL_DIRECTIVES
        .iter()
        .filter(|(key, _)| {
            context
                .iter()
                .any(|(context_key, value)| context_key == key && value.is_empty())
        })
        .map(|(_, directive)| *directive)
        .collect();

    let mut out = String::new();
    for line in rendered.lines() {
        let directive = line.trim_start_matches([' ', '\t']);
        if empty_directives
            .iter()
            .any(|prefix| directive.starts_with(prefix))
        {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Atomically replace the receiver config on disk
///
/// # Errors
///
/// Propagates I/O failures.
pub fn write_config(target: &Path, text: &str) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = target.with_extension("tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, target)?;
    Ok(())
}
