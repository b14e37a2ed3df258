//! In-process connector for tests. Outcomes are scripted per open; once the
//! script runs out every open is accepted.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

use campus_admin_core::error::AppError;

use super::transport::{Connector, Transport, TransportEvent};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Outcome {
    Accept,
    Refuse,
}

/// Test-side ends of an accepted fake connection.
#[derive(Debug)]
pub(crate) struct FakeLink {
    inbound: mpsc::UnboundedSender<TransportEvent>,
    outbound: mpsc::UnboundedReceiver<String>,
}

#[derive(Debug, Default)]
pub(crate) struct FakeConnector {
    script: Mutex<VecDeque<Outcome>>,
    opened: AtomicUsize,
    pub(crate) urls: Mutex<Vec<Url>>,
    links: Mutex<Vec<FakeLink>>,
}

impl FakeConnector {
    pub(crate) fn scripted(script: impl IntoIterator<Item = Outcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        })
    }

    pub(crate) fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub(crate) fn push(&self, index: usize, event: TransportEvent) {
        self.links.lock().unwrap()[index].inbound.send(event).unwrap();
    }

    pub(crate) fn try_sent(&self, index: usize) -> Option<String> {
        self.links.lock().unwrap()[index].outbound.try_recv().ok()
    }
}

pub(crate) struct FakeTransport {
    inbound: mpsc::UnboundedReceiver<TransportEvent>,
    outbound: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl Connector for FakeConnector {
    async fn open(&self, url: &Url) -> Result<Box<dyn Transport>, AppError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.clone());
        let outcome = self.script.lock().unwrap().pop_front().unwrap_or(Outcome::Accept);
        match outcome {
            Outcome::Refuse => Err(AppError::transport("connection refused")),
            Outcome::Accept => {
                let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
                let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
                self.links.lock().unwrap().push(FakeLink {
                    inbound: inbound_tx,
                    outbound: outbound_rx,
                });
                Ok(Box::new(FakeTransport {
                    inbound: inbound_rx,
                    outbound: outbound_tx,
                }))
            }
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn recv(&mut self) -> Option<TransportEvent> {
        self.inbound.recv().await
    }

    async fn send(&mut self, text: String) -> Result<(), AppError> {
        self.outbound
            .send(text)
            .map_err(|_| AppError::transport("peer gone"))
    }

    async fn close(&mut self) {}
}
