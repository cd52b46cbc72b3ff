//! Event stream
//!
//! Holds the WebSocket to the host's event endpoint: IDENTIFY, wait for
//! READY, PING every ten seconds, and forward every EVENT to the
//! dispatcher. Any failure reconnects after the configured delay, resuming
//! from the last sequence number seen.

use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use waifu_common::SatoriConfig;

use crate::error::{SatoriError, SatoriResult};
use crate::protocol::{Event, OpCode, ReadyBody, Signal};

/// Keep-alive period
const PING_INTERVAL: Duration = Duration::from_secs(10);

/// Time allowed between IDENTIFY and READY
const READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Reconnecting event subscription
#[derive(Debug)]
pub struct EventStream {
    config: SatoriConfig,
    last_sn: Option<u64>,
}

impl EventStream {
    pub fn new(config: SatoriConfig) -> Self {
        Self {
            config,
            last_sn: None,
        }
    }

    /// Run the connection loop until the receiver is dropped
    pub fn spawn(mut self, tx: mpsc::Sender<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match self.run_once(&tx).await {
                    Ok(()) => {
                        tracing::info!("Event receiver dropped, stopping event stream");
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Event stream error, reconnecting...");
                        tokio::time::sleep(Duration::from_millis(self.config.reconnect_delay_ms))
                            .await;
                    }
                }
            }
        })
    }

    /// One connection lifetime
    ///
    /// Returns `Ok(())` only when the receiver is gone.
    async fn run_once(&mut self, tx: &mpsc::Sender<Event>) -> SatoriResult<()> {
        let url = self.config.events_url();
        let (ws, _) = connect_async(url.as_str()).await?;
        let (mut sink, mut stream) = ws.split();
        tracing::info!(url = %url, "Connected to event stream");

        let identify = Signal::identify(self.config.token.clone(), self.last_sn);
        sink.send(WsMessage::Text(identify.to_json()?)).await?;

        let ready = timeout(READY_TIMEOUT, await_ready(&mut stream))
            .await
            .map_err(|_| SatoriError::protocol("timed out waiting for READY"))??;
        tracing::info!(logins = ready.logins.len(), "Event stream ready");

        let mut ping = interval_at(Instant::now() + PING_INTERVAL, PING_INTERVAL);
        loop {
            tokio::select! {
                _ = ping.tick() => {
                    sink.send(WsMessage::Text(Signal::ping().to_json()?)).await?;
                }
                frame = stream.next() => {
                    let text = match frame {
                        Some(Ok(WsMessage::Text(text))) => text,
                        Some(Ok(WsMessage::Close(_))) | None => return Err(SatoriError::Closed),
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(e.into()),
                    };
                    if let Some(event) = self.accept(&text) {
                        if tx.send(event).await.is_err() {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Decode a text frame, returning the event it carries, if any
    ///
    /// Frames that fail to decode are logged and skipped.
    fn accept(&mut self, text: &str) -> Option<Event> {
        let signal = match Signal::from_json(text) {
            Ok(signal) => signal,
            Err(e) => {
                tracing::warn!(error = %e, "Undecodable frame");
                return None;
            }
        };
        match signal.op {
            OpCode::Event => {
                let Some(event) = signal.as_event() else {
                    tracing::warn!("Undecodable event body");
                    return None;
                };
                if let Some(sn) = event.sn {
                    self.last_sn = Some(self.last_sn.map_or(sn, |last| last.max(sn)));
                }
                Some(event)
            }
            OpCode::Pong => {
                tracing::trace!("Pong");
                None
            }
            op if op.is_client_op() => {
                tracing::warn!(op = %op, "Host sent a bot-only signal");
                None
            }
            op => {
                tracing::debug!(op = %op, "Ignoring signal");
                None
            }
        }
    }
}

/// Skip frames until the host answers IDENTIFY with READY
async fn await_ready<S>(stream: &mut S) -> SatoriResult<ReadyBody>
where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        if let WsMessage::Text(text) = frame? {
            if let Some(ready) = Signal::from_json(&text)?.as_ready() {
                return Ok(ready);
            }
        }
    }
    Err(SatoriError::Closed)
}
