use crate::channel::{Channel, ChannelBuilder, ChannelState};
use crate::error::RealtimeError;
use crate::message::{ChannelEvent, RealtimeMessage};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, trace, warn};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Phoenix serializer version spoken by this client
const PROTOCOL_VSN: &str = "1.0.0";

/// Socket connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Options for [`RealtimeClient`]
#[derive(Debug, Clone)]
pub struct RealtimeClientOptions {
    /// Heartbeat period in milliseconds
    pub heartbeat_interval: u64,
    /// Websocket handshake timeout in milliseconds
    pub connect_timeout: u64,
}

impl Default for RealtimeClientOptions {
    fn default() -> Self {
        Self {
            heartbeat_interval: 30000,
            connect_timeout: 10000,
        }
    }
}

type Channels = Arc<RwLock<HashMap<String, Arc<Channel>>>>;
type SocketSender = Arc<RwLock<Option<mpsc::Sender<Message>>>>;

/// Websocket client multiplexing any number of channels over one socket.
///
/// Cloning is cheap; clones share the socket and channel table.
#[derive(Clone)]
pub struct RealtimeClient {
    url: String,
    key: String,
    next_ref: Arc<AtomicU32>,
    pub(crate) channels: Channels,
    socket: SocketSender,
    options: RealtimeClientOptions,
    state: Arc<RwLock<ConnectionState>>,
    state_change: broadcast::Sender<ConnectionState>,
    pub(crate) access_token: Arc<RwLock<Option<String>>>,
    reader_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RealtimeClient {
    /// Create a client with default options. `url` is the project base URL
    /// (`https://xyz.supabase.co`) or a full websocket endpoint.
    pub fn new(url: &str, key: &str) -> Self {
        Self::new_with_options(url, key, RealtimeClientOptions::default())
    }

    pub fn new_with_options(url: &str, key: &str, options: RealtimeClientOptions) -> Self {
        let (state_change, _) = broadcast::channel(16);
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            next_ref: Arc::new(AtomicU32::new(1)),
            channels: Arc::new(RwLock::new(HashMap::new())),
            socket: Arc::new(RwLock::new(None)),
            options,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            state_change,
            access_token: Arc::new(RwLock::new(None)),
            reader_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Set the user token sent with subsequent channel joins
    pub async fn set_auth(&self, token: Option<String>) {
        debug!("Setting realtime auth token (is_some: {})", token.is_some());
        *self.access_token.write().await = token;
    }

    pub fn on_state_change(&self) -> broadcast::Receiver<ConnectionState> {
        self.state_change.subscribe()
    }

    pub async fn get_connection_state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Start building a channel. The topic is prefixed with `realtime:`.
    pub fn channel(&self, name: &str) -> ChannelBuilder<'_> {
        ChannelBuilder::new(self, &topic_for(name))
    }

    /// Join state of a channel, or `None` if it was never subscribed
    pub async fn channel_state(&self, name: &str) -> Option<ChannelState> {
        let channel = self.channels.read().await.get(&topic_for(name)).cloned();
        match channel {
            Some(channel) => Some(channel.state().await),
            None => None,
        }
    }

    /// Join state of every registered channel, keyed by full topic
    pub async fn channel_states(&self) -> Vec<(String, ChannelState)> {
        let channels: Vec<Arc<Channel>> = self.channels.read().await.values().cloned().collect();
        let mut states = Vec::with_capacity(channels.len());
        for channel in channels {
            states.push((channel.topic().to_string(), channel.state().await));
        }
        states
    }

    /// Websocket endpoint derived from the configured URL
    pub fn endpoint_url(&self) -> Result<Url, RealtimeError> {
        let mut url = Url::parse(&self.url)?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            s => {
                return Err(RealtimeError::ConnectionError(format!(
                    "Unsupported URL scheme: {}",
                    s
                )))
            }
        };
        url.set_scheme(scheme).map_err(|_| {
            RealtimeError::ConnectionError(format!("Cannot use scheme {} for {}", scheme, self.url))
        })?;

        if !url.path().ends_with("/websocket") {
            let path = format!("{}/realtime/v1/websocket", url.path().trim_end_matches('/'));
            url.set_path(&path);
        }
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("apikey", &self.key)
            .append_pair("vsn", PROTOCOL_VSN);
        Ok(url)
    }

    pub(crate) fn next_ref(&self) -> String {
        self.next_ref.fetch_add(1, Ordering::SeqCst).to_string()
    }

    /// Open the socket and start the reader and writer tasks.
    /// Returns immediately if already connected or connecting.
    pub async fn connect(&self) -> Result<(), RealtimeError> {
        {
            let mut state = self.state.write().await;
            if *state != ConnectionState::Disconnected {
                trace!("connect() skipped, state is {:?}", *state);
                return Ok(());
            }
            *state = ConnectionState::Connecting;
            let _ = self.state_change.send(ConnectionState::Connecting);
        }

        let ws_url = match self.endpoint_url() {
            Ok(url) => url,
            Err(e) => {
                self.set_connection_state(ConnectionState::Disconnected).await;
                return Err(e);
            }
        };
        info!("Connecting to realtime endpoint {}", ws_url.host_str().unwrap_or_default());

        let handshake = timeout(
            Duration::from_millis(self.options.connect_timeout),
            connect_async(ws_url.as_str()),
        )
        .await;
        let ws_stream = match handshake {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => {
                error!("WebSocket connection failed: {}", e);
                self.set_connection_state(ConnectionState::Disconnected).await;
                return Err(RealtimeError::WebSocketError(e));
            }
            Err(_) => {
                self.set_connection_state(ConnectionState::Disconnected).await;
                return Err(RealtimeError::ConnectionError(format!(
                    "Timed out after {}ms waiting for websocket handshake",
                    self.options.connect_timeout
                )));
            }
        };

        let (mut write, mut read) = ws_stream.split();
        let (socket_tx, mut socket_rx) = mpsc::channel::<Message>(100);
        *self.socket.write().await = Some(socket_tx.clone());

        tokio::spawn(async move {
            while let Some(message) = socket_rx.recv().await {
                let closing = matches!(message, Message::Close(_));
                if let Err(e) = write.send(message).await {
                    error!("WebSocket send error: {}", e);
                    break;
                }
                if closing {
                    break;
                }
            }
            debug!("Realtime writer task finished");
        });

        let client = self.clone();
        let period = Duration::from_millis(self.options.heartbeat_interval.max(1));
        let reader = tokio::spawn(async move {
            let mut heartbeat = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    msg = read.next() => match msg {
                        Some(Ok(Message::Text(text))) => client.route(&text).await,
                        Some(Ok(Message::Close(frame))) => {
                            debug!("Realtime socket closed by server: {:?}", frame);
                            break;
                        }
                        Some(Ok(other)) => trace!("Ignoring non-text frame: {:?}", other),
                        Some(Err(e)) => {
                            error!("WebSocket read error: {}", e);
                            break;
                        }
                        None => break,
                    },
                    _ = heartbeat.tick() => {
                        let frame = json!({
                            "topic": "phoenix",
                            "event": ChannelEvent::Heartbeat,
                            "payload": {},
                            "ref": client.next_ref(),
                        });
                        trace!("Sending heartbeat");
                        if socket_tx.send(Message::Text(frame.to_string())).await.is_err() {
                            warn!("Heartbeat failed, writer is gone");
                            break;
                        }
                    }
                }
            }
            drop(socket_tx);
            client.teardown().await;
        });
        *self
            .reader_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(reader);

        self.set_connection_state(ConnectionState::Connected).await;
        Ok(())
    }

    /// Close the socket. Every channel is marked closed.
    pub async fn disconnect(&self) -> Result<(), RealtimeError> {
        info!("Disconnecting realtime client");
        let reader = self
            .reader_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(reader) = reader {
            reader.abort();
        }
        if let Some(socket_tx) = self.socket.read().await.as_ref() {
            let _ = socket_tx.send(Message::Close(None)).await;
        }
        self.teardown().await;
        Ok(())
    }

    /// Leave a channel and forget it
    pub async fn remove_channel(&self, name: &str) -> Result<(), RealtimeError> {
        let topic = topic_for(name);
        let channel = self.channels.write().await.remove(&topic);
        if let Some(channel) = channel {
            channel.set_state(ChannelState::Leaving).await;
            if self.get_connection_state().await == ConnectionState::Connected {
                self.send_message(json!({
                    "topic": topic,
                    "event": ChannelEvent::PhoenixLeave,
                    "payload": {},
                    "ref": self.next_ref(),
                }))
                .await?;
            }
            channel.set_state(ChannelState::Closed).await;
        }
        Ok(())
    }

    pub(crate) async fn send_message(&self, message: serde_json::Value) -> Result<(), RealtimeError> {
        trace!("Sending realtime frame: {}", message);
        let socket = self.socket.read().await;
        match socket.as_ref() {
            Some(socket_tx) => socket_tx
                .send(Message::Text(message.to_string()))
                .await
                .map_err(RealtimeError::from),
            None => Err(RealtimeError::ConnectionError(
                "Client socket unavailable".to_string(),
            )),
        }
    }

    async fn route(&self, text: &str) {
        let message = match serde_json::from_str::<RealtimeMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                error!("Failed to parse realtime frame: {}. Raw: {}", e, text);
                return;
            }
        };

        if message.topic == "phoenix" {
            trace!("Heartbeat reply: {:?}", message.payload);
            return;
        }

        let channel = self.channels.read().await.get(&message.topic).cloned();
        match channel {
            Some(channel) => channel.handle_message(message).await,
            None => warn!("Message for unknown topic {}", message.topic),
        }
    }

    async fn teardown(&self) {
        *self.socket.write().await = None;
        let channels: Vec<Arc<Channel>> = self.channels.read().await.values().cloned().collect();
        for channel in channels {
            channel.set_state(ChannelState::Closed).await;
        }
        self.set_connection_state(ConnectionState::Disconnected).await;
    }

    async fn set_connection_state(&self, state: ConnectionState) {
        let mut current = self.state.write().await;
        if *current != state {
            debug!("Realtime state {:?} -> {:?}", *current, state);
            *current = state;
            let _ = self.state_change.send(state);
        }
    }
}

fn topic_for(name: &str) -> String {
    if name.starts_with("realtime:") {
        name.to_string()
    } else {
        format!("realtime:{}", name)
    }
}

impl From<mpsc::error::SendError<Message>> for RealtimeError {
    fn from(err: mpsc::error::SendError<Message>) -> Self {
        RealtimeError::ConnectionError(format!("Failed to send message to socket task: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_https_base() {
        let client = RealtimeClient::new("https://abc.supabase.co/", "anon");
        let url = client.endpoint_url().unwrap();
        assert_eq!(
            url.as_str(),
            "wss://abc.supabase.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );
    }

    #[test]
    fn test_endpoint_keeps_explicit_websocket_path() {
        let client = RealtimeClient::new("http://127.0.0.1:4000/socket/websocket", "k");
        let url = client.endpoint_url().unwrap();
        assert_eq!(url.scheme(), "ws");
        assert_eq!(url.path(), "/socket/websocket");
    }

    #[test]
    fn test_endpoint_rejects_other_schemes() {
        let client = RealtimeClient::new("ftp://example.com", "k");
        assert!(matches!(
            client.endpoint_url(),
            Err(RealtimeError::ConnectionError(_))
        ));
    }

    #[test]
    fn test_topic_prefix() {
        assert_eq!(topic_for("bookings_changes"), "realtime:bookings_changes");
        assert_eq!(topic_for("realtime:x"), "realtime:x");
    }

    #[tokio::test]
    async fn test_unknown_channel_state() {
        let client = RealtimeClient::new("http://localhost:54321", "k");
        assert_eq!(client.get_connection_state().await, ConnectionState::Disconnected);
        assert!(client.channel_state("users_changes").await.is_none());
    }
}
