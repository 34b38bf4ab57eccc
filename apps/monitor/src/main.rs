use cleanbot_monitor::console::{issue, parse_command};
use cleanbot_monitor::dashboard::Dashboard;
use cleanbot_monitor::error::MonitorError;
use cleanbot_monitor::logger::initialize as LoggerInitialize;

use bridge_client::config::BRIDGE_URL_ENV;
use bridge_client::{BridgeConfig, ConnectionManager};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tokio::signal;
use tokio::sync::mpsc;

const APP_DIR_NAME: &str = "cleanbot";
const LOG_DIR_NAME: &str = "logs";

#[tokio::main]
async fn main() -> Result<(), MonitorError> {
    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(LOG_DIR_NAME))
        .ok_or_else(|| MonitorError::Monitor {
            message: "Failed to get log directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    create_dir_all(&log_dir).map_err(|e| MonitorError::Monitor {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir)?;

    info!("Cleanbot monitor starting");
    info!("Log directory: {}", log_dir.display());

    let config_dir = BridgeConfig::default_dir()?;
    let config = BridgeConfig::load_with_env(&config_dir)?;

    let url = config.default_url.clone().ok_or_else(|| MonitorError::NoUrl {
        message: format!(
            "Please enter the bridge IP or URL first (default_url in {}/bridge.toml or {BRIDGE_URL_ENV})",
            config_dir.display()
        ),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let manager = ConnectionManager::new(&config);
    let (events_tx, mut events) = mpsc::unbounded_channel();
    manager.connect(&url, events_tx)?;

    let mut dashboard = Dashboard::default();
    let mut lines = BufReader::new(stdin()).lines();
    let mut console_open = true;

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            Some(event) = events.recv() => {
                dashboard.handle(event);
            }
            line = lines.next_line(), if console_open => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(command)) => {
                        issue(&manager, &command);
                    }
                    Ok(None) => {}
                    Err(e) => warn!("{e}"),
                },
                Ok(None) => {
                    info!("Console input closed, monitoring only");
                    console_open = false;
                }
                Err(e) => {
                    warn!("Console read failed: {e}");
                    console_open = false;
                }
            },
        }
    }

    manager.disconnect();
    info!("Cleanbot monitor stopped");
    Ok(())
}
