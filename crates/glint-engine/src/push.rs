use std::time::Duration;

use futures::StreamExt;
use glint_core::{PushFrame, PUSH_EVENT_TAKEOVER_OFF, PUSH_EVENT_TAKEOVER_ON};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};

use crate::engine::EngineCommand;

/// Consecutive failed connection attempts before giving up.
pub const RECONNECT_ATTEMPTS: u32 = 5;
/// Delay between connection attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Listens on the push channel and forwards takeover events to the
/// engine. Purely latency-reducing: when the channel is down the poller
/// still converges on the same state, so exhausting the reconnect budget
/// ends the listener instead of the engine.
pub struct PushListener {
    url: String,
    commands: mpsc::Sender<EngineCommand>,
    max_attempts: u32,
    reconnect_delay: Duration,
}

impl PushListener {
    pub fn new(url: impl Into<String>, commands: mpsc::Sender<EngineCommand>) -> Self {
        Self {
            url: url.into(),
            commands,
            max_attempts: RECONNECT_ATTEMPTS,
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    pub async fn run(self) {
        let mut failures = 0;
        while failures < self.max_attempts {
            match connect_async(self.url.as_str()).await {
                Ok((stream, _response)) => {
                    info!(url = %self.url, "push channel connected");
                    failures = 0;
                    self.read_frames(stream).await;
                    info!("push channel disconnected");
                }
                Err(e) => {
                    failures += 1;
                    debug!(error = %e, attempt = failures, "push channel connect failed");
                }
            }
            if self.commands.is_closed() {
                return;
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
        info!(
            attempts = self.max_attempts,
            "push channel unavailable, polling covers takeover detection"
        );
    }

    async fn read_frames(&self, stream: WebSocketStream<MaybeTlsStream<TcpStream>>) {
        let (_write, mut read) = stream.split();
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => self.dispatch(&text).await,
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!(error = %e, "push channel read error");
                    break;
                }
            }
        }
    }

    /// Decode one frame and forward it. Unknown events and malformed
    /// frames are dropped; the channel is advisory.
    async fn dispatch(&self, text: &str) {
        let frame: PushFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                debug!(error = %e, "ignoring malformed push frame");
                return;
            }
        };
        match frame.event.as_str() {
            PUSH_EVENT_TAKEOVER_ON => {
                if let Some(directive) = frame.data.takeover_directive() {
                    let _ = self.commands.send(EngineCommand::Activate(directive)).await;
                } else {
                    debug!("takeover-on frame without a target");
                }
            }
            PUSH_EVENT_TAKEOVER_OFF => {
                let _ = self.commands.send(EngineCommand::Deactivate).await;
            }
            other => trace!(event = other, "ignoring push event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use glint_core::TakeoverDirective;

    use super::*;

    fn listener() -> (PushListener, mpsc::Receiver<EngineCommand>) {
        let (tx, rx) = mpsc::channel(8);
        (PushListener::new("ws://127.0.0.1:5000/socket", tx), rx)
    }

    #[tokio::test]
    async fn takeover_on_frame_forwards_activate() {
        let (listener, mut rx) = listener();
        listener
            .dispatch(r#"{"event":"fallback_on","data":{"file":"promo.html","type":"file"}}"#)
            .await;

        match rx.try_recv().unwrap() {
            EngineCommand::Activate(TakeoverDirective::File(file)) => {
                assert_eq!(file, "promo.html");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test]
    async fn takeover_on_url_frame_forwards_navigation() {
        let (listener, mut rx) = listener();
        listener
            .dispatch(r#"{"event":"fallback_on","data":{"url":"https://p.example","type":"url"}}"#)
            .await;

        match rx.try_recv().unwrap() {
            EngineCommand::Activate(TakeoverDirective::Url(url)) => {
                assert_eq!(url, "https://p.example");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test]
    async fn takeover_off_frame_forwards_deactivate() {
        let (listener, mut rx) = listener();
        listener.dispatch(r#"{"event":"fallback_off"}"#).await;

        assert!(matches!(rx.try_recv().unwrap(), EngineCommand::Deactivate));
    }

    #[tokio::test]
    async fn malformed_and_unknown_frames_are_dropped() {
        let (listener, mut rx) = listener();
        listener.dispatch("not json at all").await;
        listener.dispatch(r#"{"event":"heartbeat"}"#).await;
        listener
            .dispatch(r#"{"event":"fallback_on","data":{}}"#)
            .await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn gives_up_after_bounded_attempts() {
        let (tx, _rx) = mpsc::channel(8);
        let listener = PushListener {
            // Nothing listens here; every connect attempt fails fast.
            url: "ws://127.0.0.1:1/socket".to_string(),
            commands: tx,
            max_attempts: 2,
            reconnect_delay: Duration::from_millis(1),
        };
        // Completes instead of retrying forever.
        listener.run().await;
    }
}
