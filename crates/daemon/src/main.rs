//! bottompin
//!
//! Keeps a window pinned to the bottom of the z-order.
//!
//! Responsibilities:
//! - Load configuration and apply command-line overrides
//! - Initialize logging
//! - Resolve the target window from a handle or a title
//! - Run a pin controller until Ctrl+C

mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use config::Config;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "bottompin")]
#[command(author, version, about = "Keep a window pinned to the bottom of the z-order")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pin a window to the bottom until Ctrl+C
    Pin(PinArgs),
    /// Print the effective configuration
    Config {
        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
        /// Read configuration from this file instead of the standard locations
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct PinArgs {
    /// Window handle, decimal or 0x-prefixed hex
    #[arg(long, required_unless_present = "title", conflicts_with = "title")]
    hwnd: Option<String>,
    /// Exact title of the window to pin
    #[arg(long)]
    title: Option<String>,
    /// Target left edge in pixels
    #[arg(long, allow_negative_numbers = true)]
    x: Option<i32>,
    /// Target top edge in pixels
    #[arg(long, allow_negative_numbers = true)]
    y: Option<i32>,
    /// Target width in pixels
    #[arg(long)]
    width: Option<i32>,
    /// Target height in pixels
    #[arg(long)]
    height: Option<i32>,
    /// Delay between polls in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Keep the window in the taskbar and Alt-Tab
    #[arg(long)]
    no_hide: bool,
    /// Read configuration from this file instead of the standard locations
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl PinArgs {
    /// Command-line values win over the configuration file, field by field.
    fn apply_overrides(&self, config: &mut Config) {
        let geometry = &mut config.pin.geometry;
        geometry.x = self.x.or(geometry.x);
        geometry.y = self.y.or(geometry.y);
        geometry.width = self.width.or(geometry.width);
        geometry.height = self.height.or(geometry.height);

        if let Some(interval) = self.interval_ms {
            config.pin.poll_interval_ms = interval;
        }
        if self.no_hide {
            config.pin.hide_from_task_switcher = false;
        }
        if let Some(level) = &self.log_level {
            config.logging.log_level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Pin(args) => run_pin(args).await,
        Commands::Config { json, config } => print_config(config.as_deref(), json),
    }
}

/// Load from an explicit path (errors are fatal) or the standard locations
/// (errors fall back to defaults).
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_path(path),
        None => Ok(Config::load().unwrap_or_else(|e| {
            // Can't use tracing yet, fall back to eprintln
            eprintln!("Failed to load configuration: {:#}. Using defaults.", e);
            Config::default()
        })),
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.logging.level()).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn print_config(path: Option<&Path>, json: bool) -> Result<()> {
    let mut config = load_config(path)?;
    for w in config.validate() {
        eprintln!("Config: {} - {}", w.field, w.message);
    }

    let rendered = if json {
        serde_json::to_string_pretty(&config)?
    } else {
        toml::to_string_pretty(&config)?
    };
    println!("{}", rendered);
    Ok(())
}

async fn run_pin(args: PinArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    let config_warnings = config.validate();

    init_logging(&config)?;
    for w in &config_warnings {
        warn!("Config: {} - {}", w.field, w.message);
    }

    pin_until_ctrl_c(&args, &config).await
}

#[cfg(windows)]
async fn pin_until_ctrl_c(args: &PinArgs, config: &Config) -> Result<()> {
    use anyhow::Context;
    use bottompin_core::PinController;
    use bottompin_platform_win32::{find_window_by_title, parse_window_id, Win32WindowSystem};
    use std::sync::Arc;
    use tracing::info;

    info!("bottompin starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let window = match (&args.hwnd, &args.title) {
        (Some(hwnd), _) => parse_window_id(hwnd)?,
        (None, Some(title)) => find_window_by_title(title)?,
        (None, None) => anyhow::bail!("either --hwnd or --title is required"),
    };

    info!(
        "Configuration loaded: poll_interval_ms={}, hide_from_task_switcher={}, geometry={:?}",
        config.pin.poll_interval_ms, config.pin.hide_from_task_switcher, config.pin.geometry
    );

    let mut pin = PinController::new(window, Arc::new(Win32WindowSystem), config.pin_options());
    let pin_loop = pin.lock(config.pin.geometry);

    info!("Ready. Press Ctrl+C to release window {:#x}.", window);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    info!("Ctrl+C received, releasing window...");

    pin.unlock();
    pin_loop.await.context("Pin loop terminated abnormally")?;

    info!("bottompin stopped");
    Ok(())
}

#[cfg(not(windows))]
async fn pin_until_ctrl_c(_args: &PinArgs, _config: &Config) -> Result<()> {
    anyhow::bail!("pinning windows is only supported on Windows")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse_pin(args: &[&str]) -> PinArgs {
        let cli = Cli::try_parse_from(args).expect("valid arguments");
        match cli.command {
            Commands::Pin(args) => args,
            Commands::Config { .. } => panic!("expected pin command"),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pin_requires_a_window() {
        assert!(Cli::try_parse_from(["bottompin", "pin"]).is_err());
        assert!(Cli::try_parse_from(["bottompin", "pin", "--hwnd", "1", "--title", "x"]).is_err());
    }

    #[test]
    fn test_pin_parses_negative_position() {
        let args = parse_pin(&["bottompin", "pin", "--hwnd", "0x10", "--x", "-1920", "--y", "0"]);
        assert_eq!(args.hwnd.as_deref(), Some("0x10"));
        assert_eq!(args.x, Some(-1920));
        assert_eq!(args.y, Some(0));
        assert_eq!(args.width, None);
    }

    #[test]
    fn test_overrides_merge_field_by_field() {
        let mut config = Config::default();
        config.pin.geometry.y = Some(40);
        config.pin.geometry.height = Some(300);

        let args = parse_pin(&[
            "bottompin", "pin", "--title", "Clock", "--x", "100", "--width", "200",
            "--interval-ms", "250", "--no-hide", "--log-level", "debug",
        ]);
        args.apply_overrides(&mut config);

        assert_eq!(config.pin.geometry.x, Some(100));
        assert_eq!(config.pin.geometry.y, Some(40));
        assert_eq!(config.pin.geometry.width, Some(200));
        assert_eq!(config.pin.geometry.height, Some(300));
        assert_eq!(config.pin.poll_interval_ms, 250);
        assert!(!config.pin.hide_from_task_switcher);
        assert_eq!(config.logging.log_level, "debug");
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let mut config = Config::default();
        let args = parse_pin(&["bottompin", "pin", "--hwnd", "42"]);
        args.apply_overrides(&mut config);
        assert!(config.pin.hide_from_task_switcher);
        assert_eq!(config.pin.poll_interval_ms, 100);
        assert!(config.pin.geometry.is_unconstrained());
    }

    #[test]
    fn test_config_command_parses() {
        let cli = Cli::try_parse_from(["bottompin", "config", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Config { json: true, config: None }));
    }
}
