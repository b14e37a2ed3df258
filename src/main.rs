//! Campus admin live feed.
//!
//! Signs the admin in from a stored credential, keeps the push channel bound
//! to the session, and logs dashboard updates as they arrive.

mod feed;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use campus_admin_auth::{AuthClient, AuthSession};
use campus_admin_core::Credential;
use campus_admin_core::config::AppConfig;
use campus_admin_core::config::logging::LogFormat;
use campus_admin_core::error::AppError;
use campus_admin_realtime::{RealtimeService, SessionBinding};

use feed::DashboardFeed;

/// Credential adopted at startup.
const TOKEN_ENV: &str = "CAMPUS_ADMIN_TOKEN";

/// How often the feed totals are logged.
const SUMMARY_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Feed error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("CAMPUS_ADMIN_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main feed run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting campus-admin-feed v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Push channel and dashboard state ────────────────
    let realtime = RealtimeService::new(&config.realtime);
    let feed = DashboardFeed::attach(&realtime);

    // ── Step 2: Session, bound to the push channel ──────────────
    let session = Arc::new(AuthSession::new(AuthClient::new(&config.api)?));
    let binding = SessionBinding::spawn(realtime.clone(), session.subscribe());

    // ── Step 3: Adopt the stored credential ─────────────────────
    let token = std::env::var(TOKEN_ENV).map_err(|_| {
        AppError::authentication(format!(
            "{TOKEN_ENV} is not set; sign in with `campus-admin login` first"
        ))
    })?;
    let admin = session.restore(Credential::new(token.trim())).await?;
    tracing::info!(admin_id = %admin.id, role = %admin.role, "Session restored");

    // ── Step 4: Run until Ctrl-C ────────────────────────────────
    let mut summary = tokio::time::interval(SUMMARY_INTERVAL);
    summary.tick().await;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = summary.tick() => {
                let state = feed.snapshot();
                tracing::info!(
                    connected = state.connected,
                    completed_deals = state.completed_deals,
                    active_listings = state.active_listings,
                    total_users = state.total_users,
                    reported_issues = state.reported_issues,
                    "Dashboard totals"
                );
            }
        }
    }

    // ── Shutdown ────────────────────────────────────────────────
    drop(binding);
    realtime.shutdown().await;
    tracing::info!(metrics = ?realtime.metrics(), "Feed stopped");
    Ok(())
}
