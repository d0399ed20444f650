//! Host filesystem locations
//!
//! Every path the tool reads or writes, gathered into one value constructed
//! per invocation. Engines receive a `&HostPaths` instead of reaching for
//! fixed locations, which is what lets the test suite run against a temp
//! directory posing as the host root.

use std::path::{Path, PathBuf};

/// All host locations used by a provisioning run
#[derive(Debug, Clone)]
pub struct HostPaths {
    /// Durable state directory (`/var/lib/airplay-wyse`)
    pub state_dir: PathBuf,
    /// System ALSA config fragment (`/etc/asound.conf`)
    pub asound_conf: PathBuf,
    /// PipeWire drop-in directory (`/etc/pipewire/pipewire.conf.d`)
    pub pipewire_conf_dir: PathBuf,
    /// PipeWire presence marker (`/etc/pipewire`)
    pub pipewire_etc_dir: PathBuf,
    /// Rendered receiver config (`/etc/shairport-sync.conf`)
    pub shairport_conf: PathBuf,
    /// Network interface sysfs root (`/sys/class/net`)
    pub sys_class_net: PathBuf,
    /// Sound card sysfs root (`/sys/class/sound`)
    pub sys_class_sound: PathBuf,
    /// ALSA procfs root (`/proc/asound`)
    pub proc_asound: PathBuf,
    /// Stable machine identifier (`/etc/machine-id`)
    pub machine_id: PathBuf,
    /// systemd unit directory (`/etc/systemd/system`)
    pub systemd_dir: PathBuf,
    /// Receiver daemon state/cache directories removed on identity change
    pub shairport_state_dirs: Vec<PathBuf>,
    /// Parent of service-user home directories (`/home`)
    pub home_root: PathBuf,
}

impl HostPaths {
    /// Locations on the real host
    #[must_use]
    pub fn new() -> Self {
        Self::under_root(Path::new("/"))
    }

    /// The same layout relative to an arbitrary root, for tests
    #[must_use]
    pub fn under_root(root: &Path) -> Self {
        Self {
            state_dir: root.join("var/lib/airplay-wyse"),
            asound_conf: root.join("etc/asound.conf"),
            pipewire_conf_dir: root.join("etc/pipewire/pipewire.conf.d"),
            pipewire_etc_dir: root.join("etc/pipewire"),
            shairport_conf: root.join("etc/shairport-sync.conf"),
            sys_class_net: root.join("sys/class/net"),
            sys_class_sound: root.join("sys/class/sound"),
            proc_asound: root.join("proc/asound"),
            machine_id: root.join("etc/machine-id"),
            systemd_dir: root.join("etc/systemd/system"),
            shairport_state_dirs: vec![
                root.join("var/lib/shairport-sync"),
                root.join("var/cache/shairport-sync"),
                root.join("var/lib/shairport"),
                root.join("var/cache/shairport"),
            ],
            home_root: root.join("home"),
        }
    }

    /// Path of the persistent state document
    #[must_use]
    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join("config.json")
    }

    /// Path of the identity record
    #[must_use]
    pub fn identity_file(&self) -> PathBuf {
        self.state_dir.join("instance.json")
    }
}

impl Default for HostPaths {
    fn default() -> Self {
        Self::new()
    }
}
