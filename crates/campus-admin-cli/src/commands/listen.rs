//! `campus-admin listen`: print live events until Ctrl-C.

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;

use campus_admin_core::error::AppError;
use campus_admin_core::events::EventKind;
use campus_admin_realtime::{RealtimeService, ServerEvent};

use crate::output::{self, OutputFormat};

/// Arguments for listen
#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Event to print (repeatable). Defaults to every marketplace event.
    #[arg(short, long = "event")]
    pub events: Vec<String>,
    /// Credential (falls back to CAMPUS_ADMIN_TOKEN)
    #[arg(short, long)]
    pub token: Option<String>,
}

/// One printed event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventLine {
    received_at: DateTime<Utc>,
    event: String,
    summary: String,
}

/// Execute listen
pub async fn execute(args: &ListenArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let credential = super::resolve_token(args.token.as_deref())?;
    let service = RealtimeService::new(&config.realtime);

    let mut names: Vec<String> = if args.events.is_empty() {
        EventKind::WIRE.iter().map(|kind| kind.to_string()).collect()
    } else {
        args.events.clone()
    };
    for kind in EventKind::SYNTHETIC {
        if !names.iter().any(|name| name == kind.as_str()) {
            names.push(kind.to_string());
        }
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let _subscriptions: Vec<_> = names
        .iter()
        .map(|name| {
            let tx = tx.clone();
            service.listen_event(name.clone(), move |event| {
                let _ = tx.send(event);
            })
        })
        .collect();
    drop(tx);

    info!(events = ?names, "Subscribed; connecting");
    service.connect(credential);
    output::print_success(&format!("Listening on {} (Ctrl-C to stop)", config.realtime.ws_url));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => {
                let Some(event) = event else { break };
                let line = EventLine {
                    received_at: Utc::now(),
                    event: event.event_type().to_string(),
                    summary: event.summary(),
                };
                let text = format!("{} {:<16} {}", line.received_at.format("%H:%M:%S"), line.event, line.summary);
                output::print_line(&text, &line, format);

                if let ServerEvent::ReconnectFailed { .. } = event {
                    output::print_warning("Push channel gave up reconnecting");
                    break;
                }
            }
        }
    }

    service.shutdown().await;
    info!(state = %service.state(), "Listener stopped");
    output::print_list(&super::metric_rows(&service.metrics()), format);
    Ok(())
}
