use super::message::RealtimeMessage;
use crate::types::{Result, SupabaseError};
use futures::SinkExt;
use futures::stream::SplitSink;
use tokio::net::TcpStream;
use tokio::sync::RwLock;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Connecting,
    Open,
    Closing,
}

/// Owns the write half of the socket and the connection state
pub struct ConnectionManager {
    ws_write: RwLock<Option<WsSink>>,
    state: RwLock<ConnectionState>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            ws_write: RwLock::new(None),
            state: RwLock::new(ConnectionState::Closed),
        }
    }

    /// Sets the WebSocket write sink (called after successful connection)
    pub async fn set_writer(&self, writer: WsSink) {
        *self.ws_write.write().await = Some(writer);
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    pub async fn set_state(&self, new_state: ConnectionState) {
        *self.state.write().await = new_state;
    }

    pub async fn is_connected(&self) -> bool {
        *self.state.read().await == ConnectionState::Open
    }

    /// Sends a message through the WebSocket connection
    pub async fn send_message(&self, msg: RealtimeMessage) -> Result<()> {
        let json = serde_json::to_string(&msg)?;

        let mut ws_guard = self.ws_write.write().await;
        let ws = ws_guard.as_mut().ok_or(SupabaseError::NotConnected)?;
        ws.send(Message::Text(json.into())).await?;
        Ok(())
    }

    /// Closes the WebSocket connection gracefully
    pub async fn close(&self) -> Result<()> {
        self.set_state(ConnectionState::Closing).await;

        let writer = self.ws_write.write().await.take();
        let result = match writer {
            Some(mut ws) => ws.close().await.map_err(Into::into),
            None => Ok(()),
        };

        self.set_state(ConnectionState::Closed).await;
        result
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::ChannelEvent;

    #[tokio::test]
    async fn test_close_without_socket() {
        let connection = ConnectionManager::new();
        connection.set_state(ConnectionState::Open).await;
        assert!(connection.is_connected().await);

        connection.close().await.unwrap();
        assert_eq!(connection.state().await, ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_send_without_socket_fails() {
        let connection = ConnectionManager::new();
        connection.set_state(ConnectionState::Open).await;

        let message = RealtimeMessage::new(
            "realtime:room",
            ChannelEvent::AccessToken,
            serde_json::json!({ "access_token": "jwt" }),
        );
        let err = connection.send_message(message).await.unwrap_err();
        assert!(matches!(err, SupabaseError::NotConnected));
    }
}
