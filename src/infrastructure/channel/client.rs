//! Websocket session loop: join, heartbeat, forward pushes, reconnect

use std::time::Duration;

use std::fmt::Display;

use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::oneshot;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::frame::{classify, Frame, Inbound};
use crate::session::live::LiveMessage;

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub url: String,
    pub heartbeat: Duration,
    pub reconnect_delay: Duration,
}

impl ChannelConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            heartbeat: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Message(LiveMessage),
    Disconnected(String),
}

enum SessionEnd {
    Stopped,
    Lost(String),
}

/// Keep `topic` joined until `stop` fires (or its sender is dropped).
///
/// Every snapshot or partial on the topic is handed to `on_event`. A lost
/// connection is reported once and retried after `reconnect_delay`.
pub async fn run_channel<F>(
    config: ChannelConfig,
    topic: String,
    mut stop: oneshot::Receiver<()>,
    mut on_event: F,
) where
    F: FnMut(ChannelEvent) + Send,
{
    let mut reference = 0u64;
    loop {
        match session(&config, &topic, &mut reference, &mut stop, &mut on_event).await {
            SessionEnd::Stopped => {
                debug!(%topic, "channel stopped");
                return;
            }
            SessionEnd::Lost(reason) => {
                warn!(%topic, %reason, delay_secs = config.reconnect_delay.as_secs(), "channel lost, reconnecting");
                on_event(ChannelEvent::Disconnected(reason));
            }
        }

        tokio::select! {
            _ = &mut stop => return,
            _ = tokio::time::sleep(config.reconnect_delay) => {}
        }
    }
}

async fn session<F>(
    config: &ChannelConfig,
    topic: &str,
    reference: &mut u64,
    stop: &mut oneshot::Receiver<()>,
    on_event: &mut F,
) -> SessionEnd
where
    F: FnMut(ChannelEvent) + Send,
{
    let (socket, _) = match connect_async(config.url.as_str()).await {
        Ok(connected) => connected,
        Err(err) => return SessionEnd::Lost(format!("connect failed: {err}")),
    };
    info!(url = %config.url, %topic, "channel connected");
    let (mut sink, mut stream) = socket.split();

    *reference += 1;
    if let Err(err) = sink.send(encode(&Frame::join(topic, *reference))).await {
        return SessionEnd::Lost(format!("join failed: {err}"));
    }

    let mut heartbeat = tokio::time::interval(config.heartbeat);
    // The first tick completes immediately.
    heartbeat.tick().await;

    loop {
        tokio::select! {
            _ = &mut *stop => {
                *reference += 1;
                send_best_effort(&mut sink, encode(&Frame::leave(topic, *reference)), "leave").await;
                if let Err(err) = sink.close().await {
                    debug!(%topic, error = %err, "socket close failed");
                }
                return SessionEnd::Stopped;
            }
            _ = heartbeat.tick() => {
                *reference += 1;
                if let Err(err) = sink.send(encode(&Frame::heartbeat(*reference))).await {
                    return SessionEnd::Lost(format!("heartbeat failed: {err}"));
                }
            }
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let frame = match serde_json::from_str::<Frame>(&text) {
                        Ok(frame) => frame,
                        Err(err) => {
                            warn!(error = %err, "undecodable channel frame");
                            continue;
                        }
                    };
                    if frame.topic != topic {
                        continue;
                    }
                    match classify(frame) {
                        Inbound::Live(message) => {
                            debug!(%topic, "live message");
                            on_event(ChannelEvent::Message(message));
                        }
                        Inbound::JoinRejected(reason) => {
                            return SessionEnd::Lost(format!("join rejected: {reason}"));
                        }
                        Inbound::Closed => return SessionEnd::Lost("closed by server".to_string()),
                        Inbound::Ignore => {}
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    send_best_effort(&mut sink, Message::Pong(data), "pong").await;
                }
                Some(Ok(Message::Close(_))) | None => {
                    return SessionEnd::Lost("socket closed".to_string());
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return SessionEnd::Lost(err.to_string()),
            }
        }
    }
}

/// Send a frame whose loss the session survives. Returns whether it went out.
async fn send_best_effort<S>(sink: &mut S, message: Message, what: &str) -> bool
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    match sink.send(message).await {
        Ok(()) => true,
        Err(err) => {
            debug!(frame = what, error = %err, "channel send failed");
            false
        }
    }
}

fn encode(frame: &Frame) -> Message {
    // Serializing a Frame is infallible.
    Message::Text(serde_json::to_string(frame).unwrap_or_default())
}
