//! octofand - Octo telemetry daemon
//!
//! Reads status reports from the Octo's hidraw node, keeps the latest
//! decoded snapshot and publishes it as a JSON status document.

mod publisher;
mod reader;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{error, info, warn};

use of_core::constants::{env, paths};
use of_core::{load_config, OctoConfig, OctoDevice};

use publisher::Publisher;
use reader::ReaderStats;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Command Line
// ============================================================================

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    device: Option<PathBuf>,
}

#[derive(Debug, PartialEq)]
enum Command {
    Run(Args),
    Help,
    Version,
}

fn parse_args<I>(args: I) -> anyhow::Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-v" | "--version" => return Ok(Command::Version),
            "-c" | "--config" => {
                let path = args.next().context("--config requires a path argument")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "-d" | "--device" => {
                let path = args.next().context("--device requires a path argument")?;
                parsed.device = Some(PathBuf::from(path));
            }
            other => bail!("Unknown argument: {}", other),
        }
    }

    Ok(Command::Run(parsed))
}

fn print_help() {
    eprintln!("octofand {} - Aquacomputer Octo telemetry daemon", VERSION);
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    octofand [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -c, --config PATH   Config file (default: {})", paths::config_file().display());
    eprintln!("    -d, --device PATH   hidraw node of the Octo (overrides config)");
    eprintln!("    -v, --version       Print version");
    eprintln!("    -h, --help          Print this help");
    eprintln!();
    eprintln!("ENVIRONMENT:");
    eprintln!("    {}         Log filter (trace, debug, info, warn, error)", env::LOG);
}

fn print_version() {
    println!("octofand {}", VERSION);
}

// ============================================================================
// Logging
// ============================================================================

/// Journald when the socket exists, stdout otherwise. Returns the sink name.
fn init_logging(filter: &str) -> &'static str {
    let mut use_journald = std::path::Path::new(paths::JOURNALD_SOCKET).exists();

    if use_journald {
        match tracing_journald::layer() {
            Ok(journald_layer) => {
                use tracing_subscriber::prelude::*;
                tracing_subscriber::registry()
                    .with(journald_layer)
                    .with(tracing_subscriber::EnvFilter::new(filter))
                    .init();
            }
            Err(e) => {
                eprintln!("Failed to create journald layer: {}, falling back to stdout", e);
                use_journald = false;
                init_stdout(filter);
            }
        }
    } else {
        init_stdout(filter);
    }

    if use_journald {
        "systemd journal"
    } else {
        "stdout"
    }
}

fn init_stdout(filter: &str) {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(filter)
        .init();
}

/// A non-blank `OCTOFAN_LOG` wins over the config's level
fn log_filter(env_value: Option<&str>, config: &OctoConfig) -> String {
    match env_value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => config.daemon.log_level.clone(),
    }
}

fn resolve_device(args: &Args, config: &OctoConfig) -> anyhow::Result<PathBuf> {
    args.device
        .clone()
        .or_else(|| config.device.hidraw_path.clone())
        .context("No hidraw device given: use --device or set device.hidraw_path")
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("PANIC at {}: {}", location, message);
    }));

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print_help();
            return Ok(());
        }
        Ok(Command::Version) => {
            print_version();
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    let config_path = args.config.clone().unwrap_or_else(paths::config_file);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    let filter = log_filter(std::env::var(env::LOG).ok().as_deref(), &config);
    let sink = init_logging(&filter);

    info!("STARTUP: octofand {} starting", VERSION);
    info!("STARTUP: Logging to {}", sink);
    info!("STARTUP: Config: {}", config_path.display());

    let device_path = resolve_device(&args, &config)?;
    let device = Arc::new(
        OctoDevice::from_settings(&config.device).context("Failed to set up device")?,
    );
    let status_path = config.daemon.status_file.clone();

    info!("STARTUP: Device: {}", device_path.display());
    match &status_path {
        Some(path) => info!("STARTUP: Status file: {}", path.display()),
        None => info!("STARTUP: No status file configured - publishing disabled"),
    }
    info!(
        "STARTUP: Freshness window {} ms, publish interval {} ms",
        config.device.freshness_window_ms, config.daemon.publish_interval_ms
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_signal = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("SIGNAL: Received SIGINT/SIGTERM - initiating shutdown");
        shutdown_signal.store(true, Ordering::SeqCst);
    }) {
        warn!("Failed to set signal handler: {}. Shutdown via signals may not work cleanly.", e);
    }

    let stats = Arc::new(ReaderStats::default());

    // The reader thread is not joined: it may be blocked in read() until the
    // next report, and process exit tears it down.
    reader::spawn_reader(device.clone(), device_path, stats.clone(), shutdown.clone())
        .context("Failed to spawn reader thread")?;

    let publisher_handle = tokio::spawn(publisher::run_publisher(
        device,
        Publisher::new(status_path),
        config.daemon.publish_interval(),
        stats.clone(),
        shutdown.clone(),
    ));

    if let Err(e) = publisher_handle.await {
        error!("Publisher task failed: {}", e);
    }

    let (applied, ignored, malformed, reopens) = stats.summary();
    info!(
        "SHUTDOWN: {} reports applied, {} ignored, {} malformed, {} reopens",
        applied, ignored, malformed, reopens
    );
    info!("SHUTDOWN: Daemon terminated gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_defaults() {
        assert_eq!(parse_args(args(&[])).unwrap(), Command::Run(Args::default()));
    }

    #[test]
    fn test_parse_args_paths() {
        let cmd = parse_args(args(&["-c", "/tmp/o.json", "--device", "/dev/hidraw3"])).unwrap();
        assert_eq!(
            cmd,
            Command::Run(Args {
                config: Some(PathBuf::from("/tmp/o.json")),
                device: Some(PathBuf::from("/dev/hidraw3")),
            })
        );
    }

    #[test]
    fn test_parse_args_flags() {
        assert_eq!(parse_args(args(&["-h"])).unwrap(), Command::Help);
        assert_eq!(parse_args(args(&["--version"])).unwrap(), Command::Version);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(args(&["--device"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_resolve_device_prefers_argument() {
        let mut config = OctoConfig::default();
        config.device.hidraw_path = Some(PathBuf::from("/dev/hidraw1"));

        let from_config = resolve_device(&Args::default(), &config).unwrap();
        assert_eq!(from_config, PathBuf::from("/dev/hidraw1"));

        let cli = Args {
            device: Some(PathBuf::from("/dev/hidraw9")),
            ..Default::default()
        };
        assert_eq!(resolve_device(&cli, &config).unwrap(), PathBuf::from("/dev/hidraw9"));

        assert!(resolve_device(&Args::default(), &OctoConfig::default()).is_err());
    }

    #[test]
    fn test_null_status_file_disables_publishing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"daemon": {"status_file": null}}"#).unwrap();

        let config = load_config(&path).unwrap();
        let publisher = Publisher::new(config.daemon.status_file.clone());
        assert!(publisher.status_file().is_none());

        let defaults = OctoConfig::default();
        assert_eq!(
            Publisher::new(defaults.daemon.status_file.clone()).status_file(),
            Some(std::path::Path::new(paths::STATUS_FILE))
        );
    }

    #[test]
    fn test_log_filter_ignores_blank_env() {
        let mut config = OctoConfig::default();
        config.daemon.log_level = "debug".to_string();

        assert_eq!(log_filter(Some("trace"), &config), "trace");
        assert_eq!(log_filter(Some(""), &config), "debug");
        assert_eq!(log_filter(Some("   "), &config), "debug");
        assert_eq!(log_filter(None, &config), "debug");
    }
}
