//! `aw` command-line entrypoint

use std::process::ExitCode;

use clap::{Args, CommandFactory, Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use airplay_wyse::state::ConfigState;
use airplay_wyse::{
    HostPaths, ProvisionError, Result, StateStore, alsa, identity, packages, pipewire, process,
    shairport, systemd,
};

#[derive(Parser)]
#[command(name = "aw", version, about = "Manage AirPlay Wyse setup and diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args)]
struct CommonConfigArgs {
    /// Shairport advertised name
    #[arg(long)]
    name: Option<String>,

    /// Preferred ALSA hardware device (hw:X,Y)
    #[arg(long)]
    device: Option<String>,

    /// Optional ALSA mixer control
    #[arg(long)]
    mixer: Option<String>,

    /// Preferred network interface for mDNS
    #[arg(long)]
    interface: Option<String>,
}

#[derive(Args)]
struct SetupArgs {
    #[command(flatten)]
    common: CommonConfigArgs,

    /// Reset AirPlay identity
    #[arg(long)]
    force_identity: bool,

    /// Enable Shairport statistics output
    #[arg(long, conflicts_with = "no_statistics")]
    statistics: bool,

    /// Disable Shairport statistics even if previously enabled
    #[arg(long)]
    no_statistics: bool,

    /// Pin PipeWire clock to a specific rate
    #[arg(long)]
    force_rate: Option<u32>,
}

#[derive(Args)]
struct ApplyArgs {
    #[command(flatten)]
    common: CommonConfigArgs,

    /// Reset AirPlay identity
    #[arg(long)]
    force_identity: bool,

    /// Enable Shairport statistics output
    #[arg(long, conflicts_with = "no_statistics")]
    statistics: bool,

    /// Disable Shairport statistics
    #[arg(long)]
    no_statistics: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Install and configure AirPlay Wyse
    Setup(SetupArgs),

    /// Re-render configuration with updated options
    Apply(ApplyArgs),

    /// Identity management commands
    Identity {
        #[command(subcommand)]
        command: IdentityCommand,
    },

    /// Ensure ALSA policy is applied
    PolicyAlsa {
        /// Explicit ALSA hw device (e.g. hw:1,0)
        #[arg(long)]
        device: Option<String>,

        /// Print JSON summary
        #[arg(long)]
        json: bool,
    },

    /// Ensure PipeWire policy is applied
    PolicyPipewire {
        /// Pin PipeWire clock to a specific rate
        #[arg(long)]
        force_rate: Option<u32>,

        /// Print JSON summary
        #[arg(long)]
        json: bool,
    },

    /// Systemd integration
    Systemd {
        #[command(subcommand)]
        command: SystemdCommand,
    },

    /// Emit a condensed health snapshot
    Health {
        /// Return JSON payload
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum IdentityCommand {
    /// Ensure AirPlay identity is sane
    Ensure {
        /// Force identity reset
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum SystemdCommand {
    /// Install/refresh systemd units
    Install,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("aw: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Setup(args) => handle_setup(&args),
        Command::Apply(args) => handle_apply(&args),
        Command::Identity {
            command: IdentityCommand::Ensure { force },
        } => handle_identity(force),
        Command::PolicyAlsa { device, json } => handle_policy_alsa(device.as_deref(), json),
        Command::PolicyPipewire { force_rate, json } => handle_policy_pipewire(force_rate, json),
        Command::Systemd {
            command: SystemdCommand::Install,
        } => handle_systemd_install(),
        Command::Health { json } => handle_health(json),
    }
}

fn handle_setup(args: &SetupArgs) -> Result<()> {
    process::ensure_root()?;
    if let Some(rate) = args.force_rate {
        pipewire::validate_rate(rate)?;
    }

    packages::ensure_packages(&["jq", "alsa-utils", "avahi-daemon"])?;
    let stack = shairport::ensure_stack()?;
    if !stack.has_airplay2 {
        return Err(ProvisionError::Stack {
            message: "shairport-sync does not report AirPlay 2 support".to_string(),
        });
    }

    let paths = HostPaths::new();
    let store = StateStore::new(&paths);

    let alsa_policy = alsa::ensure_policy(&paths, &store, args.common.device.as_deref())?;
    let pipewire_policy = pipewire::ensure_policy(&paths, &store, args.force_rate)?;

    if alsa_policy.requires_soxr && !stack.has_soxr {
        return Err(ProvisionError::Stack {
            message: "shairport-sync lacks libsoxr while hardware needs 48 kHz anchor"
                .to_string(),
        });
    }

    let statistics = statistics_flag(args.statistics, args.no_statistics);
    store.update(&json!({
        "config": config_updates(&args.common, &alsa_policy, &stack, statistics)
    }))?;

    identity::ensure_identity(&paths, &store, args.force_identity)?;
    render_and_write_config(&paths, &store)?;

    systemd::install_units(&paths)?;
    systemd::daemon_reload()?;
    systemd::enable("avahi-daemon.service", true, true)?;
    systemd::enable("nqptp.service", true, true)?;
    systemd::enable("airplay-wyse-alsa-policy.service", false, true)?;
    systemd::enable("airplay-wyse-pw-policy.service", false, true)?;
    systemd::enable("airplay-wyse-identity.service", false, true)?;
    systemd::enable("shairport-sync.service", true, false)?;

    println!("Setup complete");
    println!(
        "  ALSA device: {} (anchor {} Hz)",
        alsa_policy.device, alsa_policy.anchor_hz
    );
    if pipewire_policy.present {
        let rates = pipewire::ALLOWED_RATES
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let force = pipewire_policy
            .force_rate
            .map_or_else(|| "auto".to_string(), |rate| rate.to_string());
        println!("  PipeWire allowed rates: {rates} (force={force})");
    }
    Ok(())
}

fn handle_apply(args: &ApplyArgs) -> Result<()> {
    process::ensure_root()?;

    let stack = shairport::ensure_stack()?;
    if !stack.has_airplay2 {
        return Err(ProvisionError::Stack {
            message: "shairport-sync does not report AirPlay 2 support".to_string(),
        });
    }

    let paths = HostPaths::new();
    let store = StateStore::new(&paths);

    let alsa_policy = alsa::ensure_policy(&paths, &store, args.common.device.as_deref())?;
    if alsa_policy.requires_soxr && !stack.has_soxr {
        return Err(ProvisionError::Stack {
            message: "shairport-sync lacks libsoxr while hardware needs 48 kHz anchor"
                .to_string(),
        });
    }

    let statistics = statistics_flag(args.statistics, args.no_statistics);
    store.update(&json!({
        "config": config_updates(&args.common, &alsa_policy, &stack, statistics)
    }))?;

    identity::ensure_identity(&paths, &store, args.force_identity)?;
    render_and_write_config(&paths, &store)?;
    systemd::restart("shairport-sync.service")?;

    println!("Configuration applied");
    Ok(())
}

fn handle_identity(force: bool) -> Result<()> {
    process::ensure_root()?;

    let paths = HostPaths::new();
    let store = StateStore::new(&paths);
    let result = identity::ensure_identity(&paths, &store, force)?;
    render_and_write_config(&paths, &store)?;

    let payload = json!({
        "mac": result.mac,
        "interface": result.interface,
        "changed": result.changed,
        "synthetic": result.synthetic,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn handle_policy_alsa(device: Option<&str>, as_json: bool) -> Result<()> {
    process::ensure_root()?;

    let paths = HostPaths::new();
    let store = StateStore::new(&paths);
    let policy = alsa::ensure_policy(&paths, &store, device)?;

    if as_json {
        let mut payload = policy.to_state();
        payload["changed"] = json!(policy.changed);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        let usb = match policy.is_usb {
            Some(true) => "true",
            Some(false) => "false",
            None => "unknown",
        };
        println!(
            "ALSA device: {} (anchor {} Hz, usb={usb})",
            policy.device, policy.anchor_hz
        );
        if policy.requires_soxr {
            println!("  Note: requires libsoxr resampling");
        }
    }
    Ok(())
}

fn handle_policy_pipewire(force_rate: Option<u32>, as_json: bool) -> Result<()> {
    process::ensure_root()?;

    let paths = HostPaths::new();
    let store = StateStore::new(&paths);
    let policy = pipewire::ensure_policy(&paths, &store, force_rate)?;

    if as_json {
        let payload = json!({
            "present": policy.present,
            "changed": policy.changed,
            "force_rate": policy.force_rate,
            "allowed_rates": pipewire::ALLOWED_RATES,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if policy.present {
        let force = policy
            .force_rate
            .map_or_else(|| "auto".to_string(), |rate| rate.to_string());
        println!(
            "PipeWire policy ensured (force={force}, changed={})",
            policy.changed
        );
    } else {
        println!("PipeWire not detected; policy skipped");
    }
    Ok(())
}

fn handle_systemd_install() -> Result<()> {
    process::ensure_root()?;

    let paths = HostPaths::new();
    systemd::install_units(&paths)?;
    systemd::daemon_reload()?;
    println!("Systemd units refreshed");
    Ok(())
}

fn handle_health(as_json: bool) -> Result<()> {
    let summary = [
        ("nqptp", systemd::service_status("nqptp.service")),
        ("shairport", systemd::service_status("shairport-sync.service")),
        (
            "identity",
            systemd::service_status("airplay-wyse-identity.service"),
        ),
    ];

    if as_json {
        let mut payload = serde_json::Map::new();
        for (key, value) in summary {
            payload.insert(key.to_string(), json!(value));
        }
        println!("{}", serde_json::to_string_pretty(&Value::Object(payload))?);
    } else {
        println!("Health summary:");
        for (key, value) in summary {
            println!("  {key}: {value}");
        }
    }
    Ok(())
}

fn statistics_flag(enable: bool, disable: bool) -> Option<bool> {
    if enable {
        Some(true)
    } else if disable {
        Some(false)
    } else {
        None
    }
}

fn config_updates(
    common: &CommonConfigArgs,
    policy: &alsa::AlsaPolicy,
    stack: &shairport::StackStatus,
    statistics: Option<bool>,
) -> Value {
    let mut config = serde_json::Map::new();
    if let Some(name) = &common.name {
        config.insert("name".to_string(), json!(name));
    }
    if let Some(mixer) = &common.mixer {
        config.insert("mixer".to_string(), json!(mixer));
    }
    if let Some(interface) = &common.interface {
        config.insert("interface".to_string(), json!(interface));
    }
    config.insert("device".to_string(), json!("default"));
    config.insert(
        "output_rate".to_string(),
        if policy.requires_soxr {
            json!(policy.anchor_hz)
        } else {
            Value::Null
        },
    );
    config.insert(
        "interpolation".to_string(),
        if policy.requires_soxr && stack.has_soxr {
            json!("soxr")
        } else {
            Value::Null
        },
    );
    if let Some(statistics) = statistics {
        config.insert("statistics".to_string(), json!(statistics));
    }
    Value::Object(config)
}

fn render_and_write_config(paths: &HostPaths, store: &StateStore) -> Result<()> {
    let config = ConfigState::from_state(&store.load());
    let shairport_config = shairport::ShairportConfig::from_config(&config);
    let rendered = shairport::render_config(&shairport_config, shairport::DEFAULT_TEMPLATE);
    shairport::write_config(&paths.shairport_conf, &rendered)
}
