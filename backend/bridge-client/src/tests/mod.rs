mod config;
mod telemetry;
