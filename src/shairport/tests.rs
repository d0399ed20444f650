use tempfile::TempDir;

use super::*;
use crate::state::ConfigState;

fn minimal_config() -> ShairportConfig {
    ShairportConfig {
        name: "Wyse DAC-2233".to_string(),
        device: "default".to_string(),
        mixer: None,
        interface: None,
        hardware_address: None,
        output_rate: None,
        statistics: false,
        interpolation: None,
        airplay_device_id: None,
    }
}

#[test]
fn test_parse_capabilities_pinned_banner() {
    // Literal -V banner from the Debian AirPlay 2 build.
    let banner = "4.3.2-3-g6f0e7bbe-AirPlay2-OpenSSL-Avahi-ALSA-soxr-metadata-sysconfdir:/etc\n";
    assert_eq!(parse_capabilities(banner), (true, true));

    let classic = "3.3.8-OpenSSL-Avahi-ALSA-sysconfdir:/etc\n";
    assert_eq!(parse_capabilities(classic), (false, false));
    assert_eq!(parse_capabilities(""), (false, false));
}

#[test]
fn test_render_strips_empty_optional_directives() {
    let rendered = render_config(&minimal_config(), DEFAULT_TEMPLATE);

    assert!(rendered.contains("name = \"Wyse DAC-2233\";"));
    assert!(rendered.contains("output_device = \"default\";"));
    for directive in [
        "mixer_control_name",
        "output_rate",
        "interpolation",
        "interface",
        "hardware_address",
        "statistics",
        "airplay_device_id",
    ] {
        assert!(
            !rendered.contains(directive),
            "empty optional directive {directive} must be stripped"
        );
    }
    assert!(!rendered.contains("{{"), "no unexpanded placeholders");
}

#[test]
fn test_render_keeps_populated_optional_directives() {
    let config = ShairportConfig {
        mixer: Some("PCM".to_string()),
        interface: Some("enp1s0".to_string()),
        hardware_address: Some("aa:bb:cc:11:22:33".to_string()),
        output_rate: Some(48000),
        statistics: true,
        interpolation: Some("soxr".to_string()),
        airplay_device_id: Some("0xAABBCC112233L".to_string()),
        ..minimal_config()
    };
    let rendered = render_config(&config, DEFAULT_TEMPLATE);

    assert!(rendered.contains("mixer_control_name = \"PCM\";"));
    assert!(rendered.contains("interface = \"enp1s0\";"));
    assert!(rendered.contains("hardware_address = \"aa:bb:cc:11:22:33\";"));
    assert!(rendered.contains("output_rate = 48000;"));
    assert!(rendered.contains("statistics = \"yes\";"));
    assert!(rendered.contains("interpolation = \"soxr\";"));
    assert!(rendered.contains("airplay_device_id = \"0xAABBCC112233L\";"));
}

#[test]
fn test_from_config_applies_defaults() {
    let config = ShairportConfig::from_config(&ConfigState::default());
    assert_eq!(config.name, "Wyse DAC");
    assert_eq!(config.device, "default");
    assert!(!config.statistics);
    assert_eq!(config.mixer, None);
}

#[test]
fn test_write_config_is_atomic() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("etc").join("shairport-sync.conf");

    write_config(&target, "general = {};\n").unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "general = {};\n");
    assert!(!target.with_extension("tmp").exists());
}
