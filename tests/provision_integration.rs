//! End-to-end provisioning runs against a temp-dir host root

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use airplay_wyse::state::ConfigState;
use airplay_wyse::{HostPaths, StateStore, alsa, identity, shairport};

fn fake_host(dir: &TempDir) -> (HostPaths, StateStore) {
    let paths = HostPaths::under_root(dir.path());

    fs::create_dir_all(paths.machine_id.parent().unwrap()).unwrap();
    fs::write(&paths.machine_id, "f00f00f00f00f00f00f00f00f00f00f0\n").unwrap();

    // One wired interface with a real address
    let net = paths.sys_class_net.join("awtest0");
    fs::create_dir_all(&net).unwrap();
    fs::write(net.join("operstate"), "up\n").unwrap();
    fs::write(net.join("carrier"), "1\n").unwrap();
    fs::write(net.join("address"), "aa:bb:cc:11:22:33\n").unwrap();

    // One USB DAC on card 1 supporting both anchors
    let sys = paths.sys_class_sound.join("card1").join("device");
    fs::create_dir_all(&sys).unwrap();
    fs::write(sys.join("idVendor"), "262a\n").unwrap();
    fs::write(sys.join("idProduct"), "1048\n").unwrap();
    let proc_dir = paths.proc_asound.join("card1");
    fs::create_dir_all(&proc_dir).unwrap();
    fs::write(proc_dir.join("id"), "Device\n").unwrap();
    fs::write(
        proc_dir.join("stream0"),
        "Playback:\n  Interface 1\n    Rates: 44100, 48000\n",
    )
    .unwrap();

    let store = StateStore::new(&paths);
    (paths, store)
}

fn render(paths: &HostPaths, store: &StateStore) -> String {
    let config = ConfigState::from_state(&store.load());
    let rendered = shairport::render_config(
        &shairport::ShairportConfig::from_config(&config),
        shairport::DEFAULT_TEMPLATE,
    );
    shairport::write_config(&paths.shairport_conf, &rendered).unwrap();
    rendered
}

#[test]
fn full_provisioning_round_trip() {
    let dir = TempDir::new().unwrap();
    let (paths, store) = fake_host(&dir);

    let policy = alsa::ensure_policy(&paths, &store, Some("hw:1,0")).unwrap();
    assert_eq!(policy.device, "hw:1,0");
    assert_eq!(policy.anchor_hz, 44100);
    assert!(!policy.requires_soxr);
    assert_eq!(policy.is_usb, Some(true));
    assert!(policy.changed);

    let result = identity::ensure_identity(&paths, &store, false).unwrap();
    assert!(result.changed);
    assert!(!result.synthetic);
    assert_eq!(result.mac, "aa:bb:cc:11:22:33");

    // What the CLI layers on top before rendering
    store
        .update(&json!({"config": {"device": "default"}}))
        .unwrap();
    let rendered = render(&paths, &store);
    assert!(rendered.contains("name = \"Wyse DAC-2233\";"));
    assert!(rendered.contains("output_device = \"default\";"));
    assert!(rendered.contains("hardware_address = \"aa:bb:cc:11:22:33\";"));
    assert!(rendered.contains("airplay_device_id = \"0xAABBCC112233L\";"));
    assert!(rendered.contains("interface = \"awtest0\";"));

    // Second run against the unchanged host is a complete no-op
    let policy = alsa::ensure_policy(&paths, &store, Some("hw:1,0")).unwrap();
    assert!(!policy.changed);
    let result = identity::ensure_identity(&paths, &store, false).unwrap();
    assert!(!result.changed);
    assert_eq!(render(&paths, &store), rendered);
}

#[test]
fn identity_swap_triggers_receiver_invalidation() {
    let dir = TempDir::new().unwrap();
    let (paths, store) = fake_host(&dir);

    identity::ensure_identity(&paths, &store, false).unwrap();

    // Receiver has accumulated pairing state since
    let stale = &paths.shairport_state_dirs[0];
    fs::create_dir_all(stale).unwrap();
    fs::write(stale.join("pairing.bin"), "stale").unwrap();

    // Same host, same identity: state survives
    identity::ensure_identity(&paths, &store, false).unwrap();
    assert!(stale.exists());

    // Cloned image lands on a different machine-id: state is invalidated
    fs::write(&paths.machine_id, "0123456789abcdef0123456789abcdef\n").unwrap();
    let result = identity::ensure_identity(&paths, &store, false).unwrap();
    assert!(result.changed);
    assert!(!stale.exists());
}

#[test]
fn state_document_survives_both_engines() {
    let dir = TempDir::new().unwrap();
    let (paths, store) = fake_host(&dir);

    // A foreign tool wrote extra state before us
    store
        .update(&json!({"inventory": {"site": "lab-4"}}))
        .unwrap();

    alsa::ensure_policy(&paths, &store, Some("hw:1,0")).unwrap();
    identity::ensure_identity(&paths, &store, false).unwrap();

    let state = store.load();
    assert_eq!(state["inventory"]["site"], json!("lab-4"));
    assert_eq!(state["alsa_policy"]["device"], json!("hw:1,0"));
    assert_eq!(state["identity"]["mac"], json!("aa:bb:cc:11:22:33"));
    assert_eq!(state["config"]["hardware_address"], json!("aa:bb:cc:11:22:33"));
}
