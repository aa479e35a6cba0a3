use super::client::RealtimeInner;
use super::message::{ChannelEvent, RealtimeMessage, SystemEvent};
use crate::types::{Result, SupabaseError};
use serde::Serialize;
use std::sync::{Arc, Weak};
use tokio::sync::{RwLock, mpsc};

const BINDING_BUFFER: usize = 100;

/// Configuration options for a realtime channel.
#[derive(Debug, Clone, Default)]
pub struct RealtimeChannelOptions {
    /// Whether to receive your own broadcast messages. Default: `false`.
    pub broadcast_self: bool,
    /// Whether to receive acknowledgments for broadcast messages. Default: `false`.
    pub broadcast_ack: bool,
    /// Unique key for presence tracking.
    pub presence_key: Option<String>,
    /// Whether this is a private channel requiring authorization. Default: `false`.
    pub is_private: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Closed,
    Errored,
    Joined,
    Joining,
    Leaving,
}

#[derive(Debug, Serialize)]
struct BroadcastConfig {
    #[serde(rename = "self")]
    self_: bool,
    ack: bool,
}

#[derive(Debug, Serialize)]
struct PresenceConfig {
    key: String,
}

#[derive(Debug, Serialize)]
struct ChannelJoinConfig {
    broadcast: BroadcastConfig,
    presence: PresenceConfig,
    private: bool,
}

/// Payload of `phx_join`
#[derive(Debug, Serialize)]
struct JoinPayload {
    config: ChannelJoinConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
}

struct EventBinding {
    event: ChannelEvent,
    sender: mpsc::Sender<serde_json::Value>,
}

struct ChannelState {
    status: ChannelStatus,
    bindings: Vec<EventBinding>,
    join_ref: Option<String>,
}

/// A topic on the realtime socket.
pub struct RealtimeChannel {
    topic: String,
    client: Weak<RealtimeInner>,
    state: RwLock<ChannelState>,
    options: RealtimeChannelOptions,
}

impl RealtimeChannel {
    pub(crate) fn new(
        topic: String,
        client: Weak<RealtimeInner>,
        options: RealtimeChannelOptions,
    ) -> Self {
        Self {
            topic,
            client,
            state: RwLock::new(ChannelState {
                status: ChannelStatus::Closed,
                bindings: Vec::new(),
                join_ref: None,
            }),
            options,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub async fn status(&self) -> ChannelStatus {
        self.state.read().await.status
    }

    fn client(&self) -> Result<Arc<RealtimeInner>> {
        self.client.upgrade().ok_or(SupabaseError::NotConnected)
    }

    /// Returns a receiver for payloads of `event` arriving on this topic
    pub async fn on(&self, event: impl Into<ChannelEvent>) -> mpsc::Receiver<serde_json::Value> {
        let (sender, rx) = mpsc::channel(BINDING_BUFFER);
        self.state.write().await.bindings.push(EventBinding {
            event: event.into(),
            sender,
        });
        rx
    }

    /// Joins the topic, authorizing with the client's current access token
    pub async fn subscribe(&self) -> Result<()> {
        let client = self.client()?;
        let registered = client
            .find_channel(&self.topic)
            .await
            .is_some_and(|channel| std::ptr::eq(Arc::as_ptr(&channel), self));
        if !registered {
            return Err(SupabaseError::Channel(format!(
                "{} was removed from its client",
                self.topic
            )));
        }
        {
            let mut state = self.state.write().await;
            if state.status == ChannelStatus::Joined || state.status == ChannelStatus::Joining {
                return Ok(());
            }
            state.status = ChannelStatus::Joining;
        }

        let payload = JoinPayload {
            config: ChannelJoinConfig {
                broadcast: BroadcastConfig {
                    self_: self.options.broadcast_self,
                    ack: self.options.broadcast_ack,
                },
                presence: PresenceConfig {
                    key: self.options.presence_key.clone().unwrap_or_default(),
                },
                private: self.options.is_private,
            },
            access_token: client.access_token(),
        };

        let join_ref = client.make_ref().await;
        let message = RealtimeMessage::new(
            self.topic.clone(),
            ChannelEvent::System(SystemEvent::Join),
            serde_json::to_value(&payload)?,
        )
        .with_ref(join_ref.clone())
        .with_join_ref(Some(join_ref.clone()));

        tracing::info!("Subscribing to channel: {}", self.topic);
        if let Err(e) = client.push(message).await {
            self.state.write().await.status = ChannelStatus::Closed;
            return Err(e);
        }

        let mut state = self.state.write().await;
        state.status = ChannelStatus::Joined;
        state.join_ref = Some(join_ref);
        Ok(())
    }

    pub async fn unsubscribe(&self) -> Result<()> {
        let join_ref = {
            let mut state = self.state.write().await;
            if state.status == ChannelStatus::Closed {
                return Ok(());
            }
            state.status = ChannelStatus::Leaving;
            state.join_ref.take()
        };

        tracing::info!("Unsubscribing from channel: {}", self.topic);
        let result = match self.client() {
            Ok(client) => {
                let message = RealtimeMessage::new(
                    self.topic.clone(),
                    ChannelEvent::System(SystemEvent::Leave),
                    serde_json::json!({}),
                )
                .with_ref(client.make_ref().await)
                .with_join_ref(join_ref);
                client.push(message).await
            }
            Err(e) => Err(e),
        };

        self.state.write().await.status = ChannelStatus::Closed;
        match result {
            // Leaving a dead socket still leaves the channel
            Err(SupabaseError::NotConnected) => Ok(()),
            other => other,
        }
    }

    /// Sends a refreshed token to the server for an already joined channel
    pub(crate) async fn push_access_token(&self, token: &str) -> Result<()> {
        let join_ref = {
            let state = self.state.read().await;
            if state.status != ChannelStatus::Joined {
                return Ok(());
            }
            state.join_ref.clone()
        };

        let client = self.client()?;
        let message = RealtimeMessage::new(
            self.topic.clone(),
            ChannelEvent::AccessToken,
            serde_json::json!({ "access_token": token }),
        )
        .with_ref(client.make_ref().await)
        .with_join_ref(join_ref);

        tracing::debug!("Pushing access token to channel {}", self.topic);
        client.push(message).await
    }

    pub(crate) async fn join_ref(&self) -> Option<String> {
        self.state.read().await.join_ref.clone()
    }

    pub(crate) async fn set_status(&self, status: ChannelStatus) {
        self.state.write().await.status = status;
    }

    /// Delivers a payload to every binding for `event`
    pub(crate) async fn trigger(&self, event: &ChannelEvent, payload: &serde_json::Value) {
        let state = self.state.read().await;
        for binding in state.bindings.iter().filter(|b| &b.event == event) {
            if let Err(e) = binding.sender.send(payload.clone()).await {
                tracing::warn!(
                    "Failed to deliver event '{}' on {}: {}",
                    event,
                    self.topic,
                    e
                );
            }
        }
    }
}

impl std::fmt::Debug for RealtimeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeChannel")
            .field("topic", &self.topic)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_payload_serialization() {
        let payload = JoinPayload {
            config: ChannelJoinConfig {
                broadcast: BroadcastConfig {
                    self_: true,
                    ack: false,
                },
                presence: PresenceConfig {
                    key: "user-123".to_string(),
                },
                private: false,
            },
            access_token: Some("jwt".to_string()),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["config"]["broadcast"]["self"], true);
        assert_eq!(json["config"]["broadcast"]["ack"], false);
        assert_eq!(json["config"]["presence"]["key"], "user-123");
        assert_eq!(json["config"]["private"], false);
        assert_eq!(json["access_token"], "jwt");
    }

    #[tokio::test]
    async fn test_trigger_delivers_matching_bindings() {
        let channel =
            RealtimeChannel::new("realtime:room".to_string(), Weak::new(), Default::default());
        let mut rx = channel.on("new_message").await;
        let mut other = channel.on("other").await;

        channel
            .trigger(&ChannelEvent::parse("new_message"), &serde_json::json!({ "n": 1 }))
            .await;

        assert_eq!(rx.recv().await.unwrap()["n"], 1);
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_subscribe_without_client_fails() {
        let channel =
            RealtimeChannel::new("realtime:room".to_string(), Weak::new(), Default::default());
        let err = channel.subscribe().await.unwrap_err();
        assert!(matches!(err, SupabaseError::NotConnected));
    }
}
