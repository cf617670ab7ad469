//! deadmand: Prometheus dead man's switch daemon.
//!
//! Polls a Prometheus server for active alerts and pings a healthchecks.io
//! style service: success when nothing is firing, failure otherwise.
//!
//! # Usage
//!
//! ```text
//! deadmand -u 5a1b6c2e-... -p http://prometheus:9090 -i 5m -t 30s
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use deadman_check::config::DEFAULT_HEALTHCHECKS_BASE_URL;
use deadman_check::{CheckConfig, HealthCheck, parse_duration, run_check_loop};
use reqwest::Url;
use tokio::sync::watch;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "deadmand",
    about = "Report Prometheus alert state to a dead man's switch",
    version
)]
struct Cli {
    /// Check UUID on the healthchecks service.
    #[arg(short = 'u', long, env = "DEADMAN_CHECK_UUID")]
    check_uuid: String,

    /// Base URL of the healthchecks service.
    #[arg(
        short = 'b',
        long,
        env = "DEADMAN_HEALTHCHECKS_BASE_URL",
        default_value = DEFAULT_HEALTHCHECKS_BASE_URL
    )]
    healthchecks_base_url: Url,

    /// Base URL of the Prometheus server.
    #[arg(short = 'p', long, env = "DEADMAN_PROMETHEUS_BASE_URL")]
    prometheus_base_url: Url,

    /// Timeout for each request (e.g. 30s, 500ms).
    #[arg(
        short = 't',
        long,
        env = "DEADMAN_TIMEOUT",
        default_value = "30s",
        value_parser = parse_duration
    )]
    timeout: Duration,

    /// Time between checks (e.g. 5m, 1m30s).
    #[arg(
        short = 'i',
        long,
        env = "DEADMAN_INTERVAL",
        default_value = "5m",
        value_parser = parse_duration
    )]
    interval: Duration,

    /// Log output format.
    #[arg(long, env = "DEADMAN_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl Cli {
    fn into_config(self) -> CheckConfig {
        CheckConfig::new(
            self.check_uuid,
            self.healthchecks_base_url,
            self.prometheus_base_url,
        )
        .with_timeout(self.timeout)
        .with_interval(self.interval)
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("info,deadman_check=debug,deadmand=debug")
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = cli.into_config();
    config.validate()?;

    // One client for the whole process so every call shares its pool.
    let client = reqwest::Client::builder()
        .user_agent(concat!("deadmand/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let check = Arc::new(HealthCheck::new(config, client));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let loop_handle = tokio::spawn(run_check_loop(check, shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
    loop_handle.await?;

    info!("deadmand stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["deadmand", "-u", "abc", "-p", "http://prometheus:9090"])
            .unwrap();
        let config = cli.into_config();
        assert_eq!(config.check_uuid, "abc");
        assert_eq!(config.healthchecks_base_url.as_str(), "https://hc-ping.com/");
        assert_eq!(config.prometheus_base_url.as_str(), "http://prometheus:9090/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.interval, Duration::from_secs(300));
    }

    #[test]
    fn cli_overrides() {
        let cli = Cli::try_parse_from([
            "deadmand",
            "--check-uuid",
            "abc",
            "--healthchecks-base-url",
            "http://hc.internal:8000/ping",
            "--prometheus-base-url",
            "http://prometheus:9090",
            "--timeout",
            "10s",
            "--interval",
            "1m30s",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        let config = cli.into_config();
        assert_eq!(config.healthchecks_base_url.as_str(), "http://hc.internal:8000/ping");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.interval, Duration::from_secs(90));
    }

    #[test]
    fn cli_rejects_bad_duration() {
        let result = Cli::try_parse_from([
            "deadmand",
            "-u",
            "abc",
            "-p",
            "http://prometheus:9090",
            "-t",
            "soon",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_requires_prometheus_url() {
        assert!(Cli::try_parse_from(["deadmand", "-u", "abc"]).is_err());
    }
}
