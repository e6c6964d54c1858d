use std::time::Duration;

use futures::{SinkExt, StreamExt};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, interval_at};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::{ClientError, Result, SESSION_COOKIE};

pub(crate) const HEARTBEAT_PERIOD: Duration = Duration::from_secs(10);
const KEEPALIVE: &str = "ok";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Closed locally through [`Subscription::cancel`] or by dropping it.
    Cancelled,
    ServerClosed,
    Error(String),
}

/// Receives decoded stream messages on the subscription's task.
pub trait StreamHandler<T>: Send + 'static {
    fn on_message(&mut self, message: T);

    fn on_close(&mut self, _reason: &CloseReason) {}
}

impl<T, F> StreamHandler<T> for F
where
    F: FnMut(T) + Send + 'static,
{
    fn on_message(&mut self, message: T) {
        self(message)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Handshake {
    /// Send a keepalive every period, starting one period after open.
    Heartbeat(Duration),
    /// Send a single keepalive right after open.
    Greeting,
}

/// A live stream. Dropping it closes the socket.
pub struct Subscription {
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<CloseReason>,
}

impl Subscription {
    pub(crate) fn spawn<T, H>(socket: Socket, handler: H, handshake: Handshake) -> Self
    where
        T: DeserializeOwned + Send + 'static,
        H: StreamHandler<T>,
    {
        let (cancel, cancelled) = oneshot::channel();
        let task = tokio::spawn(run(socket, handler, cancelled, handshake));
        Self {
            cancel: Some(cancel),
            task,
        }
    }

    /// Closes the socket with a normal close frame and waits for the task.
    pub async fn cancel(mut self) -> CloseReason {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        join(self.task).await
    }

    /// Waits until the server ends the stream.
    pub async fn closed(self) -> CloseReason {
        let Subscription { cancel, task } = self;
        let reason = join(task).await;
        drop(cancel);
        reason
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn join(task: JoinHandle<CloseReason>) -> CloseReason {
    task.await
        .unwrap_or_else(|err| CloseReason::Error(format!("stream task failed: {err}")))
}

pub(crate) async fn connect(url: Url, session: Option<String>) -> Result<Socket> {
    let mut request = url.as_str().into_client_request()?;
    if let Some(token) = session {
        let cookie = HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}"))
            .map_err(|err| ClientError::Login(format!("unusable session token: {err}")))?;
        request.headers_mut().insert(COOKIE, cookie);
    }

    let (socket, _) = tokio_tungstenite::connect_async(request).await?;
    debug!(%url, "websocket connected");
    Ok(socket)
}

async fn run<T, H>(
    mut socket: Socket,
    mut handler: H,
    mut cancelled: oneshot::Receiver<()>,
    handshake: Handshake,
) -> CloseReason
where
    T: DeserializeOwned,
    H: StreamHandler<T>,
{
    let mut heartbeat = match handshake {
        Handshake::Heartbeat(period) => Some(interval_at(Instant::now() + period, period)),
        Handshake::Greeting => None,
    };

    let reason = match handshake {
        Handshake::Greeting => socket.send(Message::Text(KEEPALIVE.into())).await.err(),
        Handshake::Heartbeat(_) => None,
    }
    .map(|err| CloseReason::Error(err.to_string()));

    let reason = match reason {
        Some(reason) => reason,
        None => loop {
            tokio::select! {
                _ = &mut cancelled => {
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: "".into(),
                    };
                    if let Err(err) = socket.close(Some(frame)).await {
                        debug!(error = %err, "close handshake failed");
                    }
                    break CloseReason::Cancelled;
                }
                _ = tick(&mut heartbeat) => {
                    if let Err(err) = socket.send(Message::Text(KEEPALIVE.into())).await {
                        break CloseReason::Error(err.to_string());
                    }
                }
                frame = socket.next() => match frame {
                    Some(Ok(Message::Text(text))) => match serde_json::from_str::<T>(&text) {
                        Ok(message) => handler.on_message(message),
                        Err(err) => warn!(error = %err, "skipping undecodable stream message"),
                    },
                    Some(Ok(Message::Close(_))) | None => break CloseReason::ServerClosed,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => break CloseReason::Error(err.to_string()),
                },
            }
        },
    };

    debug!(?reason, "websocket stream finished");
    handler.on_close(&reason);
    reason
}

async fn tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
