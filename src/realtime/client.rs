use super::channel::{ChannelStatus, RealtimeChannel, RealtimeChannelOptions};
use super::connection::{ConnectionManager, ConnectionState, WsStream};
use super::heartbeat::HeartbeatManager;
use super::message::RealtimeMessage;
use super::router::MessageRouter;
use crate::infrastructure::TaskManager;
use crate::types::{HEARTBEAT_INTERVAL, REALTIME_TIMEOUT, Result, SupabaseError, VSN};
use futures::stream::{SplitStream, StreamExt};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Receiver of refreshed access tokens.
///
/// The composed [`Client`](crate::Client) forwards every credential change to
/// its realtime handle through this trait; the call must not block.
pub trait RealtimeAuth: Send + Sync + 'static {
    fn set_auth(&self, token: &str);
}

#[derive(Debug, Clone, Default)]
pub struct RealtimeClientOptions {
    pub api_key: String,
    /// Connect timeout in milliseconds
    pub timeout: Option<u64>,
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: Option<u64>,
    /// Token sent when joining channels; the API key is used when absent
    pub access_token: Option<String>,
}

/// Consolidated mutable state for RealtimeClient
pub(crate) struct RealtimeState {
    pub ref_counter: u64,
    pub pending_heartbeat_ref: Option<String>,
    pub channels: Vec<Arc<RealtimeChannel>>,
    pub tasks: TaskManager,
}

pub(crate) struct RealtimeInner {
    endpoint: String,
    options: RealtimeClientOptions,
    access_token: watch::Sender<Option<String>>,
    pub(crate) connection: Arc<ConnectionManager>,
    pub(crate) state: RwLock<RealtimeState>,
}

impl RealtimeInner {
    pub(crate) async fn make_ref(&self) -> String {
        let mut state = self.state.write().await;
        state.ref_counter += 1;
        state.ref_counter.to_string()
    }

    pub(crate) async fn push(&self, message: RealtimeMessage) -> Result<()> {
        if !self.connection.is_connected().await {
            return Err(SupabaseError::NotConnected);
        }
        self.connection.send_message(message).await
    }

    pub(crate) fn access_token(&self) -> Option<String> {
        self.access_token
            .borrow()
            .clone()
            .or_else(|| Some(self.options.api_key.clone()))
    }

    pub(crate) async fn find_channel(&self, topic: &str) -> Option<Arc<RealtimeChannel>> {
        self.state
            .read()
            .await
            .channels
            .iter()
            .find(|channel| channel.topic() == topic)
            .cloned()
    }
}

/// WebSocket client for Supabase Realtime.
///
/// Construction never touches the network; call [`connect()`](Self::connect)
/// to open the socket. Clones share the connection and the channel registry.
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<RealtimeInner>,
}

impl std::fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("endpoint", &self.inner.endpoint)
            .finish_non_exhaustive()
    }
}

impl RealtimeClient {
    /// Creates a client for `endpoint` (e.g. `wss://<project>.supabase.co/realtime/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Config`] when the API key is empty and
    /// [`SupabaseError::UrlParse`] when the endpoint is malformed.
    pub fn new(endpoint: impl Into<String>, options: RealtimeClientOptions) -> Result<Self> {
        let endpoint = endpoint.into();

        if options.api_key.is_empty() {
            return Err(SupabaseError::config("API key is required"));
        }
        Url::parse(&endpoint)?;

        let (access_token, _) = watch::channel(options.access_token.clone());

        Ok(Self {
            inner: Arc::new(RealtimeInner {
                endpoint,
                options,
                access_token,
                connection: Arc::new(ConnectionManager::new()),
                state: RwLock::new(RealtimeState {
                    ref_counter: 0,
                    pending_heartbeat_ref: None,
                    channels: Vec::new(),
                    tasks: TaskManager::new(),
                }),
            }),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    pub fn api_key(&self) -> &str {
        &self.inner.options.api_key
    }

    /// Token used for channel joins
    pub fn access_token(&self) -> Option<String> {
        self.inner.access_token()
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.connection.is_connected().await
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.inner.connection.state().await
    }

    /// Opens the WebSocket and starts the read and heartbeat tasks.
    /// Returns immediately when already connected or connecting.
    pub async fn connect(&self) -> Result<()> {
        let connection = Arc::clone(&self.inner.connection);
        {
            let state = connection.state().await;
            if state == ConnectionState::Open || state == ConnectionState::Connecting {
                return Ok(());
            }
        }
        connection.set_state(ConnectionState::Connecting).await;

        let url = self.build_endpoint_url()?;
        tracing::info!("Connecting to {}", self.inner.endpoint);

        let timeout = Duration::from_millis(self.inner.options.timeout.unwrap_or(REALTIME_TIMEOUT));
        let handshake = tokio_tungstenite::connect_async(url.as_str());
        let ws_stream = match tokio::time::timeout(timeout, handshake).await {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => {
                connection.set_state(ConnectionState::Closed).await;
                return Err(e.into());
            }
            Err(_) => {
                connection.set_state(ConnectionState::Closed).await;
                return Err(SupabaseError::Timeout);
            }
        };
        let (write_half, read_half) = ws_stream.split();
        connection.set_writer(write_half).await;

        let heartbeat_interval = self
            .inner
            .options
            .heartbeat_interval
            .unwrap_or(HEARTBEAT_INTERVAL);
        let heartbeat = HeartbeatManager::new(Arc::downgrade(&self.inner))
            .with_interval(Duration::from_millis(heartbeat_interval));
        let router = MessageRouter::new(Arc::downgrade(&self.inner));

        {
            let mut state = self.inner.state.write().await;
            state.pending_heartbeat_ref = None;
            state
                .tasks
                .spawn("realtime read loop", read_loop(read_half, router, Arc::clone(&connection)));
            state.tasks.spawn("realtime heartbeat", heartbeat.run());
            state.tasks.spawn(
                "realtime token pusher",
                push_tokens(Arc::downgrade(&self.inner), self.inner.access_token.subscribe()),
            );
        }

        connection.set_state(ConnectionState::Open).await;
        tracing::info!("Connected to realtime server");
        Ok(())
    }

    /// Closes the socket and stops background tasks. Channels stay registered.
    pub async fn disconnect(&self) -> Result<()> {
        if self.inner.connection.state().await == ConnectionState::Closed {
            return Ok(());
        }

        tracing::info!("Disconnecting from realtime server");
        {
            let mut state = self.inner.state.write().await;
            state.tasks.abort_all();
            state.pending_heartbeat_ref = None;
        }

        self.inner.connection.close().await?;
        tracing::info!("Disconnected from realtime server");
        Ok(())
    }

    /// Creates or retrieves the channel for `topic` (the `realtime:` prefix is added)
    pub async fn channel(
        &self,
        topic: &str,
        options: RealtimeChannelOptions,
    ) -> Arc<RealtimeChannel> {
        let full_topic = format!("realtime:{}", topic);

        let mut state = self.inner.state.write().await;
        if let Some(existing) = state.channels.iter().find(|c| c.topic() == full_topic) {
            return Arc::clone(existing);
        }

        let channel = Arc::new(RealtimeChannel::new(
            full_topic,
            Arc::downgrade(&self.inner),
            options,
        ));
        state.channels.push(Arc::clone(&channel));
        channel
    }

    pub async fn get_channels(&self) -> Vec<Arc<RealtimeChannel>> {
        self.inner.state.read().await.channels.clone()
    }

    /// Leaves and forgets a channel; the socket is closed once no channels remain
    pub async fn remove_channel(&self, channel: &Arc<RealtimeChannel>) -> Result<()> {
        if channel.status().await != ChannelStatus::Closed {
            channel.unsubscribe().await?;
        }

        let remaining = {
            let mut state = self.inner.state.write().await;
            state.channels.retain(|c| !Arc::ptr_eq(c, channel));
            state.channels.len()
        };

        if remaining == 0 {
            self.disconnect().await?;
        }
        Ok(())
    }

    pub async fn remove_all_channels(&self) -> Result<()> {
        let channels = std::mem::take(&mut self.inner.state.write().await.channels);
        for channel in &channels {
            if channel.status().await != ChannelStatus::Closed {
                channel.unsubscribe().await?;
            }
        }
        self.disconnect().await
    }

    fn build_endpoint_url(&self) -> Result<Url> {
        let endpoint = self.inner.endpoint.trim_end_matches('/');
        let endpoint = if endpoint.ends_with("/websocket") {
            endpoint.to_string()
        } else {
            format!("{}/websocket", endpoint)
        };

        let mut url = Url::parse(&endpoint)?;
        url.query_pairs_mut()
            .append_pair("apikey", &self.inner.options.api_key)
            .append_pair("vsn", VSN);
        Ok(url)
    }
}

impl RealtimeAuth for RealtimeClient {
    /// Stores the token for future joins. While connected, the token pusher
    /// forwards the latest value to every joined channel.
    fn set_auth(&self, token: &str) {
        self.inner.access_token.send_replace(Some(token.to_string()));
    }
}

/// Forwards token updates to joined channels, one at a time and always the
/// latest value, so channels never end up holding a superseded token.
async fn push_tokens(client: Weak<RealtimeInner>, mut tokens: watch::Receiver<Option<String>>) {
    while tokens.changed().await.is_ok() {
        let token = tokens.borrow_and_update().clone();
        let Some(token) = token else {
            continue;
        };
        let Some(inner) = client.upgrade() else {
            break;
        };

        let channels = inner.state.read().await.channels.clone();
        for channel in channels {
            if let Err(e) = channel.push_access_token(&token).await {
                tracing::warn!("Failed to push access token to {}: {}", channel.topic(), e);
            }
        }
    }
    tracing::debug!("Token pusher finished");
}

async fn read_loop(
    mut read_half: SplitStream<WsStream>,
    router: MessageRouter,
    connection: Arc<ConnectionManager>,
) {
    tracing::debug!("Starting read task");
    while let Some(msg_result) = read_half.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match serde_json::from_str::<RealtimeMessage>(&text) {
                Ok(message) => router.route(message).await,
                Err(e) => tracing::error!("Failed to parse message: {} - Raw: {}", e, text),
            },
            Ok(Message::Close(frame)) => {
                match frame {
                    Some(frame) => tracing::warn!(
                        "Server closed connection: code={:?}, reason='{}'",
                        frame.code,
                        frame.reason
                    ),
                    None => tracing::warn!("Server closed connection without close frame"),
                }
                connection.set_state(ConnectionState::Closed).await;
                break;
            }
            Ok(Message::Binary(data)) => {
                tracing::warn!("Received unexpected binary message ({} bytes)", data.len());
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("WebSocket read error: {}", e);
                connection.set_state(ConnectionState::Closed).await;
                break;
            }
        }
    }
    tracing::debug!("Read task finished");
}
