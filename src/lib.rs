//! # airplay-wyse
//!
//! Provision and maintain a shairport-sync `AirPlay` 2 receiver on a Linux
//! host (originally Dell Wyse thin clients with USB DACs).
//!
//! ## What it does
//!
//! - Enumerates ALSA playback hardware and picks an output device and
//!   sample-rate anchor by a fixed priority policy
//! - Derives a stable network identity (interface, hardware address,
//!   `AirPlay` device id, advertised name) that survives reboots and
//!   re-provisioning
//! - Tunes the PipeWire clock policy and pins the chosen ALSA device as the
//!   system default
//! - Renders `/etc/shairport-sync.conf` and installs the systemd units that
//!   keep the receiver running
//!
//! Everything is idempotent: re-running against an unchanged host writes
//! nothing and reports `changed = false`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use airplay_wyse::{HostPaths, StateStore, alsa};
//!
//! # fn example() -> airplay_wyse::Result<()> {
//! let paths = HostPaths::default();
//! let store = StateStore::new(&paths);
//! let policy = alsa::ensure_policy(&paths, &store, None)?;
//! println!("{} anchored at {} Hz", policy.device, policy.anchor_hz);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The crate is a library plus one `aw` binary. Engines never reach for
//! fixed paths directly: every host location lives in [`HostPaths`],
//! constructed once per invocation, so tests can re-root the whole tool in a
//! temp dir.
//!
//! Runs are single-threaded, synchronous and uncoordinated: there is no
//! locking around the state store, so overlapping invocations race on file
//! writes. That is accepted — this is an operator-triggered provisioning
//! step, not a service. Crash safety is limited to the temp-file-plus-rename
//! commit on every persisted file.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Error types
pub mod error;
/// Host filesystem locations
pub mod paths;
/// Persistent state document
pub mod state;

/// ALSA device policy
pub mod alsa;
/// Identity derivation
pub mod identity;
/// Network interface selection
pub mod netif;
/// PipeWire clock policy
pub mod pipewire;
/// Shairport stack probe and config rendering
pub mod shairport;

/// Debian package management
pub mod packages;
/// External command execution
pub mod process;
/// systemd integration
pub mod systemd;

// Re-exports
pub use error::{ProvisionError, Result};
pub use paths::HostPaths;
pub use state::StateStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
