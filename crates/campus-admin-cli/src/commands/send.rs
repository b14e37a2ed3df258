//! `campus-admin send`: push one frame and exit.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use serde_json::Value;
use tokio::sync::Notify;
use tracing::{info, warn};

use campus_admin_core::error::AppError;
use campus_admin_core::events::EventKind;
use campus_admin_realtime::{Listener, RealtimeService};

use crate::output::{self, OutputFormat};

/// Arguments for send
#[derive(Debug, Args)]
pub struct SendArgs {
    /// Event name
    #[arg(short, long)]
    pub event: String,
    /// JSON payload
    #[arg(short, long, default_value = "null")]
    pub payload: String,
    /// Credential (falls back to CAMPUS_ADMIN_TOKEN)
    #[arg(short, long)]
    pub token: Option<String>,
}

/// Execute send
pub async fn execute(args: &SendArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let payload: Value = serde_json::from_str(&args.payload)
        .map_err(|e| AppError::validation(format!("--payload is not valid JSON: {e}")))?;
    let config = super::load_config(config_path)?;
    let credential = super::resolve_token(args.token.as_deref())?;
    let service = RealtimeService::new(&config.realtime);

    let opened = Arc::new(Notify::new());
    let signal = opened.clone();
    let _connected = service.listen(
        EventKind::Connected.as_str(),
        Listener::new(move |_| signal.notify_one()),
    );

    service.connect(credential);
    let wait = config.realtime.connect_timeout() + Duration::from_secs(1);
    if tokio::time::timeout(wait, opened.notified()).await.is_err() {
        warn!(timeout_secs = wait.as_secs(), "Push channel did not open in time");
        service.shutdown().await;
        return Err(AppError::transport(format!(
            "Push channel did not open within {}s",
            wait.as_secs()
        )));
    }

    service.send(&args.event, &payload);
    service.shutdown().await;
    info!(event = %args.event, "Frame flushed and channel closed");

    let metrics = service.metrics();
    if metrics.frames_sent == 1 {
        output::print_success(&format!("Sent '{}'", args.event));
        Ok(())
    } else {
        output::print_list(&super::metric_rows(&metrics), format);
        Err(AppError::transport(format!("Frame '{}' was dropped", args.event)))
    }
}
