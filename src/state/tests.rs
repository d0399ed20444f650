use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::paths::HostPaths;

fn store_in(dir: &TempDir) -> StateStore {
    StateStore::new(&HostPaths::under_root(dir.path()))
}

#[test]
fn test_merge_scalar_overwrites() {
    let base = json!({"a": 1, "b": "x"});
    let updates = json!({"b": "y"});
    assert_eq!(merge(&base, &updates), json!({"a": 1, "b": "y"}));
}

#[test]
fn test_merge_objects_recursively() {
    let base = json!({"config": {"name": "Wyse DAC", "mixer": null}});
    let updates = json!({"config": {"mixer": "PCM"}});
    assert_eq!(
        merge(&base, &updates),
        json!({"config": {"name": "Wyse DAC", "mixer": "PCM"}})
    );
}

#[test]
fn test_merge_object_replaces_scalar() {
    let base = json!({"identity": null});
    let updates = json!({"identity": {"mac": "aa:bb"}});
    assert_eq!(merge(&base, &updates), json!({"identity": {"mac": "aa:bb"}}));
}

#[test]
fn test_load_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let state = store_in(&dir).load();
    assert_eq!(state["config"]["name"], json!(null));
    assert_eq!(state["alsa_policy"], json!({}));
    assert_eq!(state["pipewire_policy"], json!({}));
    assert_eq!(state["identity"], json!({}));
}

#[test]
fn test_load_corrupt_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let paths = HostPaths::under_root(dir.path());
    std::fs::create_dir_all(&paths.state_dir).unwrap();
    std::fs::write(paths.state_file(), "{not json").unwrap();
    assert_eq!(store.load()["config"]["statistics"], json!(false));
}

#[test]
fn test_update_round_trips() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store
        .update(&json!({"config": {"name": "Kitchen"}}))
        .unwrap();
    store
        .update(&json!({"alsa_policy": {"device": "hw:1,0"}}))
        .unwrap();

    let state = store.load();
    assert_eq!(state["config"]["name"], json!("Kitchen"));
    assert_eq!(state["alsa_policy"]["device"], json!("hw:1,0"));
    // Untouched defaults survive both updates
    assert_eq!(state["config"]["mixer"], json!(null));
}

#[test]
fn test_update_preserves_unknown_keys() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store
        .update(&json!({"future_key": {"nested": true}, "config": {"custom": 7}}))
        .unwrap();
    store.update(&json!({"config": {"name": "Den"}})).unwrap();

    let state = store.load();
    assert_eq!(state["future_key"]["nested"], json!(true));
    assert_eq!(state["config"]["custom"], json!(7));
    assert_eq!(state["config"]["name"], json!("Den"));
}

#[test]
fn test_save_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.update(&json!({"config": {"name": "Attic"}})).unwrap();

    let paths = HostPaths::under_root(dir.path());
    assert!(paths.state_file().exists());
    assert!(!paths.state_file().with_extension("tmp").exists());
}

#[test]
fn test_config_view_defaults() {
    let config = ConfigState::from_state(&json!({}));
    assert_eq!(config, ConfigState::default());

    let config = ConfigState::from_state(&json!({"config": {"name": "Loft", "later": 1}}));
    assert_eq!(config.name.as_deref(), Some("Loft"));
    assert_eq!(config.extra["later"], json!(1));
}
