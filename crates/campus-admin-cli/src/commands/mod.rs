//! CLI command definitions and dispatch.

pub mod config;
pub mod listen;
pub mod login;
pub mod send;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tracing::{debug, error};

use campus_admin_core::Credential;
use campus_admin_core::config::AppConfig;
use campus_admin_core::error::AppError;
use campus_admin_realtime::metrics::MetricsSnapshot;

use crate::output::OutputFormat;

/// Environment variable read when `--token` is absent.
pub const TOKEN_ENV: &str = "CAMPUS_ADMIN_TOKEN";

/// Campus marketplace admin: live push-channel client
#[derive(Debug, Parser)]
#[command(name = "campus-admin", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Connect and print live events
    Listen(listen::ListenArgs),
    /// Send one frame over the push channel
    Send(send::SendArgs),
    /// Sign in and print the credential
    Login(login::LoginArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Commands {
    /// Subcommand name for logs. Arguments are left out; they may carry secrets.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Listen(_) => "listen",
            Self::Send(_) => "send",
            Self::Login(_) => "login",
            Self::Config(_) => "config",
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let command = self.command.name();
        debug!(command, config = %self.config, "Running command");

        let result = match &self.command {
            Commands::Listen(args) => listen::execute(args, &self.config, self.format).await,
            Commands::Send(args) => send::execute(args, &self.config, self.format).await,
            Commands::Login(args) => login::execute(args, &self.config, self.format).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        };

        match &result {
            Ok(()) => debug!(command, "Command finished"),
            Err(e) => error!(command, kind = %e.kind, error = %e.message, "Command failed"),
        }
        result
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: pick the credential from the flag, then the environment.
pub fn resolve_token(flag: Option<&str>) -> Result<Credential, AppError> {
    select_token(flag, std::env::var(TOKEN_ENV).ok())
}

fn select_token(flag: Option<&str>, env: Option<String>) -> Result<Credential, AppError> {
    flag.map(str::to_string)
        .or(env)
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .map(Credential::new)
        .ok_or_else(|| {
            AppError::authentication(format!(
                "No credential: pass --token or set {TOKEN_ENV} (see `campus-admin login`)"
            ))
        })
}

/// One counter in the metrics table.
#[derive(Debug, Serialize, Tabled)]
pub struct MetricRow {
    /// Counter name
    #[tabled(rename = "Metric")]
    pub name: &'static str,
    /// Value
    #[tabled(rename = "Value")]
    pub value: u64,
}

/// Flatten a metrics snapshot into table rows.
pub fn metric_rows(snapshot: &MetricsSnapshot) -> Vec<MetricRow> {
    vec![
        MetricRow { name: "connections_opened", value: snapshot.connections_opened },
        MetricRow { name: "frames_received", value: snapshot.frames_received },
        MetricRow { name: "frames_malformed", value: snapshot.frames_malformed },
        MetricRow { name: "frames_sent", value: snapshot.frames_sent },
        MetricRow { name: "sends_dropped", value: snapshot.sends_dropped },
        MetricRow { name: "reconnects_scheduled", value: snapshot.reconnects_scheduled },
        MetricRow { name: "listener_panics", value: snapshot.listener_panics },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_over_env() {
        let token = select_token(Some("flag"), Some("env".to_string())).unwrap();
        assert_eq!(token.as_str(), "flag");
    }

    #[test]
    fn test_env_fallback() {
        let token = select_token(None, Some(" env-token \n".to_string())).unwrap();
        assert_eq!(token.as_str(), "env-token");
    }

    #[test]
    fn test_missing_token_is_error() {
        let err = select_token(None, None).unwrap_err();
        assert!(err.is_authentication());
        assert!(select_token(Some("  "), None).is_err());
    }

    #[test]
    fn test_cli_parses_listen() {
        let cli = Cli::try_parse_from([
            "campus-admin",
            "--format",
            "json",
            "listen",
            "--event",
            "new-deal",
            "--event",
            "new-user",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Listen(args) => assert_eq!(args.events, vec!["new-deal", "new-user"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_command_name_omits_arguments() {
        let cli = Cli::try_parse_from(["campus-admin", "send", "--event", "ping", "--token", "secret"]).unwrap();
        assert_eq!(cli.command.name(), "send");
    }

    #[test]
    fn test_metric_rows_cover_snapshot() {
        let snapshot = MetricsSnapshot {
            frames_received: 3,
            ..MetricsSnapshot::default()
        };
        let rows = metric_rows(&snapshot);
        assert_eq!(rows.len(), 7);
        assert!(rows.iter().any(|r| r.name == "frames_received" && r.value == 3));
    }
}
