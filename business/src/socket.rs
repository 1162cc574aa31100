//! Reconnecting WebSocket client for live status pushes.
//!
//! A [`ReconnectingSocket`] owns at most one live connection and one pending
//! reconnect timer. When the server closes the connection it reconnects after
//! a fixed interval, up to a fixed number of attempts; a successful open
//! resets the count. [`ReconnectingSocket::disconnect`] (or dropping the
//! socket) stops reconnecting and closes the connection.
//!
//! The session token, when there is one, is appended to the URL as `token`.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use verifymc_states::{StateCell, StateReader, TaskSlot};

use crate::session::SessionStore;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketOptions {
    pub auto_reconnect: bool,
    pub reconnect_interval: Duration,
    pub max_reconnect_attempts: u32,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            reconnect_interval: Duration::from_secs(3),
            max_reconnect_attempts: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SocketState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl From<SocketMessage> for Message {
    fn from(message: SocketMessage) -> Self {
        match message {
            SocketMessage::Text(text) => Message::Text(text.into()),
            SocketMessage::Binary(data) => Message::Binary(data.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    Connected,
    Message(SocketMessage),
    Error(String),
    Disconnected,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SocketError {
    #[error("socket is not connected")]
    NotConnected,
    #[error("failed to connect: {0}")]
    Connect(String),
    #[error("failed to send: {0}")]
    Send(String),
}

/// Append `token` as a query parameter unless the URL already carries one.
pub fn append_token(url: &str, token: Option<&str>) -> String {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return url.to_owned();
    };
    if url.contains("token=") {
        return url.to_owned();
    }

    let token = urlencoding::encode(token);
    if url.contains('?') {
        format!("{url}&token={token}")
    } else if url.ends_with('/') {
        format!("{url}?token={token}")
    } else {
        format!("{url}/?token={token}")
    }
}

type UrlFactory = dyn Fn() -> String + Send + Sync;

/// Marker owner for the reconnect timer.
struct Reconnect;

pub struct ReconnectingSocket {
    inner: Arc<Inner>,
}

struct Inner {
    url_factory: Box<UrlFactory>,
    session: Option<Arc<SessionStore>>,
    options: SocketOptions,
    state: StateCell<SocketState>,
    events: broadcast::Sender<SocketEvent>,
    outgoing: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    connection: Mutex<Option<CancellationToken>>,
    generation: AtomicU64,
    should_reconnect: AtomicBool,
    attempts: AtomicU32,
    reconnect: TaskSlot,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ReconnectingSocket {
    /// A socket for a fixed URL.
    pub fn new(url: impl Into<String>, options: SocketOptions) -> Self {
        let url = url.into();
        Self::with_url_factory(move || url.clone(), options)
    }

    /// A socket whose URL is recomputed on every (re)connect.
    pub fn with_url_factory<F>(url_factory: F, options: SocketOptions) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                url_factory: Box::new(url_factory),
                session: None,
                options,
                state: StateCell::new(SocketState::Disconnected),
                events,
                outgoing: Mutex::new(None),
                connection: Mutex::new(None),
                generation: AtomicU64::new(0),
                should_reconnect: AtomicBool::new(true),
                attempts: AtomicU32::new(0),
                reconnect: TaskSlot::new::<Reconnect>(),
            }),
        }
    }

    /// Take the auth token from `session`. Only valid before the socket is shared.
    pub fn with_session(mut self, session: Arc<SessionStore>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.session = Some(session);
        }
        self
    }

    pub fn state(&self) -> SocketState {
        self.inner.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == SocketState::Connected
    }

    pub fn subscribe_state(&self) -> StateReader<SocketState> {
        self.inner.state.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SocketEvent> {
        self.inner.events.subscribe()
    }

    /// Reconnect attempts made since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.attempts.load(Ordering::Acquire)
    }

    /// Open the connection. Does nothing while connecting or connected.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(&self) {
        Inner::connect(&self.inner);
    }

    /// Close the connection and stop reconnecting.
    pub fn disconnect(&self) {
        self.inner.disconnect();
    }

    pub fn send(&self, message: SocketMessage) -> Result<(), SocketError> {
        if !self.is_connected() {
            warn!("ReconnectingSocket: send while not connected");
            return Err(SocketError::NotConnected);
        }
        let outgoing = lock(&self.inner.outgoing);
        let Some(sender) = outgoing.as_ref() else {
            warn!("ReconnectingSocket: send while not connected");
            return Err(SocketError::NotConnected);
        };
        sender
            .send(message.into())
            .map_err(|e| SocketError::Send(e.to_string()))
    }

    pub fn send_text(&self, text: impl Into<String>) -> Result<(), SocketError> {
        self.send(SocketMessage::Text(text.into()))
    }
}

impl Drop for ReconnectingSocket {
    fn drop(&mut self) {
        self.inner.disconnect();
    }
}

impl Inner {
    fn emit(&self, event: SocketEvent) {
        // No subscribers is fine.
        self.events.send(event).ok();
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    fn url(&self) -> String {
        let token = self.session.as_ref().and_then(|session| session.token());
        append_token(&(self.url_factory)(), token.as_deref())
    }

    fn connect(this: &Arc<Self>) {
        this.should_reconnect.store(true, Ordering::Release);
        if this.state.get() != SocketState::Disconnected {
            debug!("ReconnectingSocket: already connecting or connected");
            return;
        }

        let generation = this.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let cancel = CancellationToken::new();
        if let Some(previous) = lock(&this.connection).replace(cancel.clone()) {
            previous.cancel();
        }
        this.state.set(SocketState::Connecting);

        let url = this.url();
        let inner = Arc::clone(this);
        tokio::spawn(async move {
            inner.run(url, generation, cancel).await;
        });
    }

    fn disconnect(&self) {
        {
            // Reconnects already scheduled for the old generation become no-ops.
            let mut connection = lock(&self.connection);
            self.should_reconnect.store(false, Ordering::Release);
            self.generation.fetch_add(1, Ordering::AcqRel);
            if let Some(connection) = connection.take() {
                connection.cancel();
            }
        }
        self.reconnect.cancel();
        lock(&self.outgoing).take();
        if self.state.get() != SocketState::Disconnected {
            self.state.set(SocketState::Disconnected);
            self.emit(SocketEvent::Disconnected);
        }
    }

    async fn run(self: Arc<Self>, url: String, generation: u64, cancel: CancellationToken) {
        debug!("ReconnectingSocket: connecting to {}", redact_token(&url));

        let connected = tokio::select! {
            () = cancel.cancelled() => return,
            result = tokio_tungstenite::connect_async(url.as_str()) => result,
        };

        let stream = match connected {
            Ok((stream, _response)) => stream,
            Err(err) => {
                warn!("ReconnectingSocket: connect failed: {err}");
                if self.is_current(generation) {
                    self.emit(SocketEvent::Error(SocketError::Connect(err.to_string()).to_string()));
                    self.closed(generation);
                }
                return;
            }
        };

        if !self.is_current(generation) || cancel.is_cancelled() {
            return;
        }

        let (sender, mut outgoing) = mpsc::unbounded_channel::<Message>();
        *lock(&self.outgoing) = Some(sender);
        self.attempts.store(0, Ordering::Release);
        self.state.set(SocketState::Connected);
        info!("ReconnectingSocket: connected");
        self.emit(SocketEvent::Connected);

        let (mut write, mut read) = stream.split();
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    write.send(Message::Close(None)).await.ok();
                    break;
                }
                Some(message) = outgoing.recv() => {
                    if let Err(err) = write.send(message).await {
                        warn!("ReconnectingSocket: send failed: {err}");
                        self.emit(SocketEvent::Error(SocketError::Send(err.to_string()).to_string()));
                        break;
                    }
                }
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        self.emit(SocketEvent::Message(SocketMessage::Text(text.as_str().to_owned())));
                    }
                    Some(Ok(Message::Binary(data))) => {
                        self.emit(SocketEvent::Message(SocketMessage::Binary(data.to_vec())));
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // Pings are answered by tungstenite.
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!("ReconnectingSocket: connection error: {err}");
                        self.emit(SocketEvent::Error(err.to_string()));
                        break;
                    }
                },
            }
        }

        if self.is_current(generation) {
            lock(&self.outgoing).take();
            self.closed(generation);
        }
    }

    /// The connection of `generation` is gone: report it and maybe reconnect.
    fn closed(self: &Arc<Self>, generation: u64) {
        self.state.set(SocketState::Disconnected);
        self.emit(SocketEvent::Disconnected);

        if !self.should_reconnect.load(Ordering::Acquire) || !self.options.auto_reconnect {
            return;
        }
        let attempts = self.attempts.load(Ordering::Acquire);
        if attempts >= self.options.max_reconnect_attempts {
            info!("ReconnectingSocket: giving up after {attempts} reconnect attempts");
            return;
        }

        let weak = Arc::downgrade(self);
        self.reconnect
            .schedule(self.options.reconnect_interval, async move {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if !inner.is_current(generation) {
                    return;
                }
                let attempt = inner.attempts.fetch_add(1, Ordering::AcqRel) + 1;
                debug!("ReconnectingSocket: reconnect attempt {attempt}");
                Inner::connect(&inner);
            });
    }
}

/// Hide the token value when logging a URL.
fn redact_token(url: &str) -> String {
    match url.find("token=") {
        Some(start) => {
            let value_start = start + "token=".len();
            let end = url[value_start..]
                .find('&')
                .map_or(url.len(), |offset| value_start + offset);
            format!("{}token=***{}", &url[..start], &url[end..])
        }
        None => url.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_token_separators() {
        assert_eq!(
            append_token("ws://host/ws?room=1", Some("abc")),
            "ws://host/ws?room=1&token=abc"
        );
        assert_eq!(
            append_token("ws://host/ws/", Some("abc")),
            "ws://host/ws/?token=abc"
        );
        assert_eq!(
            append_token("ws://host:8081", Some("abc")),
            "ws://host:8081/?token=abc"
        );
    }

    #[test]
    fn test_append_token_skips_existing_or_missing_token() {
        assert_eq!(
            append_token("ws://host/?token=old", Some("new")),
            "ws://host/?token=old"
        );
        assert_eq!(append_token("ws://host/", None), "ws://host/");
        assert_eq!(append_token("ws://host/", Some("")), "ws://host/");
    }

    #[test]
    fn test_append_token_encodes_value() {
        assert_eq!(
            append_token("ws://host/", Some("a b+c")),
            "ws://host/?token=a%20b%2Bc"
        );
    }

    #[test]
    fn test_redact_token() {
        assert_eq!(
            redact_token("ws://host/?token=secret&room=1"),
            "ws://host/?token=***&room=1"
        );
        assert_eq!(redact_token("ws://host/?token=secret"), "ws://host/?token=***");
        assert_eq!(redact_token("ws://host/"), "ws://host/");
    }

    #[test]
    fn test_send_requires_connection() {
        let socket = ReconnectingSocket::new("ws://127.0.0.1:9/", SocketOptions::default());
        assert_eq!(socket.state(), SocketState::Disconnected);
        assert_eq!(socket.send_text("hi"), Err(SocketError::NotConnected));
    }
}
