//! HRCC Slider
//!
//! Sends 14-bit MIDI CC values to a firmware device over its WebSocket server.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hrcc_slider::cli;
use hrcc_slider::config::AppConfig;
use hrcc_slider::connection::ConnectionHandle;
use hrcc_slider::page;

/// HRCC Slider - drive high-resolution MIDI CC sliders on a WebSocket device
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Device host (overrides config)
    #[arg(long, env = "HRCC_HOST")]
    host: Option<String>,

    /// Device WebSocket port (overrides config)
    #[arg(short, long, env = "HRCC_PORT")]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also write logs to daily files in this directory
    #[arg(long, env = "HRCC_LOG_DIR")]
    log_dir: Option<String>,

    /// Print the embedded slider page for the configured controls and exit
    #[arg(long)]
    render_page: bool,

    /// Write the effective configuration (defaults plus overrides) to the config path and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let _log_guard = init_logging(&args.log_level, args.log_dir.as_deref())?;

    let mut config = AppConfig::load_or_default(&args.config).await?;
    if let Some(host) = args.host {
        config.device.host = host;
    }
    if let Some(port) = args.port {
        config.device.port = port;
    }
    config.validate()?;

    if args.write_config {
        config.save(&args.config).await?;
        info!("Configuration written to {}", args.config);
        return Ok(());
    }

    let bank = config.control_bank()?;

    if args.render_page {
        let controls: Vec<_> = bank.iter().cloned().collect();
        println!("{}", page::render(&controls, config.device.port));
        return Ok(());
    }

    info!("Starting HRCC Slider...");
    info!("Device: {}", config.ws_url());

    let handle = ConnectionHandle::spawn_ws(config.ws_url());
    handle.start();

    let repl_handle = handle.clone();
    tokio::task::spawn_blocking(move || cli::run_repl(repl_handle, bank, &config))
        .await
        .context("REPL task panicked")??;

    if let Some(status) = handle.status().await {
        if status.pending > 0 {
            info!("Exiting with {} unsent message(s)", status.pending);
        }
    }
    handle.shutdown();

    info!("HRCC Slider shutdown complete");
    Ok(())
}

fn init_logging(level: &str, log_dir: Option<&str>) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir))?;
            let appender = tracing_appender::rolling::daily(dir, "hrcc-slider.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}
