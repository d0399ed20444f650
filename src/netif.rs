//! Network interface selection
//!
//! Picks the interface used for identity derivation and service
//! advertisement via a fixed fallback chain: explicit request, the kernel's
//! default route, then progressively weaker sysfs heuristics. State reads
//! that fail count as absent, never as errors.

use std::fs;

use tracing::debug;

use crate::paths::HostPaths;
use crate::process;

/// Enumerate interface names, sorted for deterministic fallback order
#[must_use]
pub fn list_interfaces(paths: &HostPaths) -> Vec<String> {
    let Ok(entries) = fs::read_dir(&paths.sys_class_net) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn read_attr(paths: &HostPaths, iface: &str, attr: &str) -> Option<String> {
    fs::read_to_string(paths.sys_class_net.join(iface).join(attr))
        .ok()
        .map(|value| value.trim().to_string())
}

/// Operational state as reported by the kernel ("up", "down", ...)
#[must_use]
pub fn operstate(paths: &HostPaths, iface: &str) -> Option<String> {
    read_attr(paths, iface, "operstate")
}

/// Carrier flag ("1" when a link is detected)
#[must_use]
pub fn carrier(paths: &HostPaths, iface: &str) -> Option<String> {
    read_attr(paths, iface, "carrier")
}

/// Link-layer address, lowercase; empty reads resolve to absent
#[must_use]
pub fn link_address(paths: &HostPaths, iface: &str) -> Option<String> {
    let value = read_attr(paths, iface, "address")?;
    if value.is_empty() {
        None
    } else {
        Some(value.to_lowercase())
    }
}

fn exists(paths: &HostPaths, iface: &str) -> bool {
    paths.sys_class_net.join(iface).exists()
}

/// Extract every `dev` operand from `default` route lines, in order
#[must_use]
pub fn parse_default_routes(output: &str) -> Vec<String> {
    let mut devices = Vec::new();
    for line in output.lines() {
        let Some(rest) = line.strip_prefix("default ") else {
            continue;
        };
        let mut parts = rest.split_whitespace();
        while let Some(part) = parts.next() {
            if part == "dev" {
                if let Some(device) = parts.next() {
                    devices.push(device.to_string());
                }
                break;
            }
        }
    }
    devices
}

/// Interface named by the kernel's default route, when enumerable
fn default_route_interface(paths: &HostPaths) -> Option<String> {
    let output = process::run_unchecked(&["ip", "route"]).ok()?;
    if !output.success() {
        return None;
    }
    parse_default_routes(&output.stdout)
        .into_iter()
        .find(|candidate| exists(paths, candidate))
}

/// Choose the interface used for identity and advertisement
///
/// Fallback chain, first match wins: `explicit` (if enumerable), the default
/// route's device, first non-loopback up-with-carrier, first non-loopback
/// up, first non-loopback, `None`.
#[must_use]
pub fn choose_interface(paths: &HostPaths, explicit: Option<&str>) -> Option<String> {
    if let Some(explicit) = explicit {
        if exists(paths, explicit) {
            return Some(explicit.to_string());
        }
        debug!(interface = explicit, "requested interface not present, falling back");
    }

    if let Some(via_route) = default_route_interface(paths) {
        return Some(via_route);
    }

    let candidates: Vec<String> = list_interfaces(paths)
        .into_iter()
        .filter(|iface| iface != "lo")
        .collect();

    if let Some(iface) = candidates.iter().find(|iface| {
        operstate(paths, iface).as_deref() == Some("up")
            && carrier(paths, iface).as_deref() == Some("1")
    }) {
        return Some(iface.clone());
    }

    if let Some(iface) = candidates
        .iter()
        .find(|iface| operstate(paths, iface).as_deref() == Some("up"))
    {
        return Some(iface.clone());
    }

    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    // Interface names chosen so a default route on the build host can never
    // collide with the fake sysfs tree.
    fn fake_iface(paths: &HostPaths, name: &str, operstate: Option<&str>, carrier: Option<&str>) {
        let dir = paths.sys_class_net.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        if let Some(state) = operstate {
            std::fs::write(dir.join("operstate"), format!("{state}\n")).unwrap();
        }
        if let Some(carrier) = carrier {
            std::fs::write(dir.join("carrier"), format!("{carrier}\n")).unwrap();
        }
    }

    #[test]
    fn test_parse_default_routes_pinned_sample() {
        let output = "\
default via 192.168.1.1 dev enp1s0 proto dhcp src 192.168.1.23 metric 100
192.168.1.0/24 dev enp1s0 proto kernel scope link src 192.168.1.23
";
        assert_eq!(parse_default_routes(output), vec!["enp1s0".to_string()]);
    }

    #[test]
    fn test_parse_default_routes_multiple_and_none() {
        let output = "\
default via 10.0.0.1 dev awtest0 metric 100
default via 10.0.0.2 dev awtest1 metric 200
10.0.0.0/24 dev awtest0 proto kernel scope link
";
        assert_eq!(
            parse_default_routes(output),
            vec!["awtest0".to_string(), "awtest1".to_string()]
        );
        assert!(parse_default_routes("10.0.0.0/24 dev eth0 scope link\n").is_empty());
        assert!(parse_default_routes("default via 10.0.0.1\n").is_empty());
    }

    #[test]
    fn test_choose_prefers_explicit_when_present() {
        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under_root(dir.path());
        fake_iface(&paths, "awtest0", Some("up"), Some("1"));
        fake_iface(&paths, "awtest1", Some("up"), Some("1"));

        assert_eq!(
            choose_interface(&paths, Some("awtest1")).as_deref(),
            Some("awtest1")
        );
    }

    #[test]
    fn test_choose_ignores_unknown_explicit() {
        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under_root(dir.path());
        fake_iface(&paths, "awtest0", Some("up"), Some("1"));

        assert_eq!(
            choose_interface(&paths, Some("nope0")).as_deref(),
            Some("awtest0")
        );
    }

    #[test]
    fn test_choose_prefers_carrier_over_plain_up() {
        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under_root(dir.path());
        fake_iface(&paths, "awtest0", Some("up"), Some("0"));
        fake_iface(&paths, "awtest1", Some("up"), Some("1"));

        assert_eq!(choose_interface(&paths, None).as_deref(), Some("awtest1"));
    }

    #[test]
    fn test_choose_falls_back_to_up_then_any() {
        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under_root(dir.path());
        fake_iface(&paths, "awtest0", Some("down"), None);
        fake_iface(&paths, "awtest1", Some("up"), None);
        assert_eq!(choose_interface(&paths, None).as_deref(), Some("awtest1"));

        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under_root(dir.path());
        fake_iface(&paths, "awtest0", Some("down"), None);
        fake_iface(&paths, "awtest1", None, None);
        assert_eq!(choose_interface(&paths, None).as_deref(), Some("awtest0"));
    }

    #[test]
    fn test_choose_skips_loopback_and_handles_empty() {
        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under_root(dir.path());
        fake_iface(&paths, "lo", Some("unknown"), None);
        assert_eq!(choose_interface(&paths, None), None);

        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under_root(dir.path());
        assert_eq!(choose_interface(&paths, None), None);
    }

    #[test]
    fn test_link_address_lowercases_and_rejects_empty() {
        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under_root(dir.path());
        fake_iface(&paths, "awtest0", None, None);
        std::fs::write(
            paths.sys_class_net.join("awtest0").join("address"),
            "AA:BB:CC:11:22:33\n",
        )
        .unwrap();
        fake_iface(&paths, "awtest1", None, None);
        std::fs::write(paths.sys_class_net.join("awtest1").join("address"), "\n").unwrap();

        assert_eq!(
            link_address(&paths, "awtest0").as_deref(),
            Some("aa:bb:cc:11:22:33")
        );
        assert_eq!(link_address(&paths, "awtest1"), None);
        assert_eq!(link_address(&paths, "missing0"), None);
    }
}
