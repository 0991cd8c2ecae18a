//! Capacitimer Link command-line entry point.
//!
//! Runs the integration without a button panel, using [`ConsoleHost`] so that
//! status and variable updates appear in the log.
//!
//! ```text
//! capacitimer-link [--host H] watch              follow the timer until Ctrl+C
//! capacitimer-link [--host H] send set_timer -o minutes=10 -o keepRunning=true
//! capacitimer-link [--host H] save-config        write the effective config file
//! ```
//!
//! Settings come from the TOML config file; flags (or their environment
//! variables) override individual fields.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use capacitimer_link::application::host::{OptionValue, OptionValues, PassthroughInterpolator};
use capacitimer_link::application::send_command::CommandOutcome;
use capacitimer_link::infrastructure::console_host::ConsoleHost;
use capacitimer_link::infrastructure::storage::config::{
    config_file_path, load_config_from, save_config_to,
};
use capacitimer_link::infrastructure::storage::AppConfig;
use capacitimer_link::ModuleInstance;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Control a Capacitimer countdown server.
#[derive(Debug, Parser)]
#[command(name = "capacitimer-link", version)]
struct Cli {
    /// Config file to read instead of the platform default.
    #[arg(long, env = "CAPACITIMER_CONFIG")]
    config: Option<PathBuf>,

    /// Server host name or IP address.
    #[arg(long, env = "CAPACITIMER_HOST")]
    host: Option<String>,

    /// HTTP port of the server's REST API.
    #[arg(long, env = "CAPACITIMER_HTTP_PORT")]
    http_port: Option<u16>,

    /// WebSocket port of the server's push channel.
    #[arg(long, env = "CAPACITIMER_WS_PORT")]
    ws_port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Connect and log timer updates until interrupted.
    Watch,

    /// Run one action and exit.
    Send {
        /// Action id, e.g. `start_timer` or `set_timer`.
        action: String,

        /// Action option as `key=value`; repeatable.
        #[arg(short, long = "option", value_parser = parse_option)]
        options: Vec<(String, OptionValue)>,
    },

    /// Write the effective configuration to the config file.
    SaveConfig,
}

impl Cli {
    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config_file_path().context("locating config file"),
        }
    }

    /// Applies flag overrides on top of the file contents.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.module.host = Some(host.clone());
        }
        if let Some(port) = self.http_port {
            config.module.http_port = port;
        }
        if let Some(port) = self.ws_port {
            config.module.ws_port = port;
        }
    }
}

/// Parses `key=value`.  `true`/`false` become checkboxes, numbers become
/// numbers, anything else stays text.
fn parse_option(raw: &str) -> Result<(String, OptionValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty option name in '{raw}'"));
    }
    let value = match value {
        "true" => OptionValue::Bool(true),
        "false" => OptionValue::Bool(false),
        other => match other.parse::<f64>() {
            Ok(n) if n.is_finite() => OptionValue::Number(n),
            _ => OptionValue::Text(other.to_string()),
        },
    };
    Ok((key.to_string(), value))
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = cli.config_path()?;
    let mut config = load_config_from(&path)
        .with_context(|| format!("loading config from {}", path.display()))?;
    cli.apply_overrides(&mut config);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    match cli.command {
        Command::Watch => watch(config).await,
        Command::Send { action, options } => send(config, &action, options).await,
        Command::SaveConfig => {
            save_config_to(&config, &path)
                .with_context(|| format!("writing config to {}", path.display()))?;
            info!("configuration written to {}", path.display());
            Ok(())
        }
    }
}

fn build_instance(config: AppConfig) -> anyhow::Result<ModuleInstance> {
    let instance = ModuleInstance::connect(
        config.module,
        Arc::new(ConsoleHost::new()),
        Arc::new(PassthroughInterpolator),
    )
    .context("building HTTP client")?;
    Ok(instance.with_discovery_prefix(config.discovery_prefix))
}

async fn watch(config: AppConfig) -> anyhow::Result<()> {
    let mut instance = build_instance(config)?;
    instance.init().await;
    info!("Capacitimer Link running; press Ctrl+C to stop");

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => warn!("failed to listen for Ctrl+C: {e}"),
    }

    instance.destroy().await;
    info!("Capacitimer Link stopped");
    Ok(())
}

async fn send(
    config: AppConfig,
    action: &str,
    options: Vec<(String, OptionValue)>,
) -> anyhow::Result<()> {
    let instance = build_instance(config)?;
    // toggle_timer decides from local state, so fetch it first.
    if let Err(e) = instance.refresh_timer().await {
        warn!("could not fetch current timer: {e}");
    }

    let options: OptionValues = options.into_iter().collect();
    match instance.run_action(action, &options).await {
        Some(CommandOutcome::Rejected(reason)) => bail!(
            "server rejected {action}: {}",
            reason.as_deref().unwrap_or("no reason given")
        ),
        Some(_) => Ok(()),
        None => bail!("{action} failed"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
