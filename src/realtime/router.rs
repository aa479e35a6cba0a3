use super::channel::ChannelStatus;
use super::client::RealtimeInner;
use super::message::{ChannelEvent, RealtimeMessage, SystemEvent};
use crate::types::PHOENIX_TOPIC;
use std::sync::Weak;

/// Routes incoming messages to heartbeat tracking and channel bindings
pub(crate) struct MessageRouter {
    client: Weak<RealtimeInner>,
}

impl MessageRouter {
    pub fn new(client: Weak<RealtimeInner>) -> Self {
        Self { client }
    }

    pub async fn route(&self, message: RealtimeMessage) {
        let Some(client) = self.client.upgrade() else {
            return;
        };

        tracing::debug!(
            "Routing message: topic={}, event={}",
            message.topic,
            message.event
        );

        if message.topic == PHOENIX_TOPIC {
            if message.event == ChannelEvent::System(SystemEvent::Reply) {
                self.handle_heartbeat_ack(&client, &message).await;
            }
            return;
        }

        let Some(channel) = client.find_channel(&message.topic).await else {
            tracing::debug!("Message for unknown topic: {}", message.topic);
            return;
        };

        match message.event {
            ChannelEvent::System(SystemEvent::Reply) => {
                let is_join_reply =
                    message.r#ref.is_some() && message.r#ref == channel.join_ref().await;
                let status = message.payload.get("status").and_then(|v| v.as_str());
                if is_join_reply && status != Some("ok") {
                    tracing::warn!(
                        "Join rejected for {}: {}",
                        message.topic,
                        message.payload.get("response").cloned().unwrap_or_default()
                    );
                    channel.set_status(ChannelStatus::Errored).await;
                }
            }
            ChannelEvent::System(SystemEvent::Close) => {
                tracing::info!("Channel closed by server: {}", message.topic);
                channel.set_status(ChannelStatus::Closed).await;
            }
            ChannelEvent::System(SystemEvent::Error) => {
                tracing::warn!("Channel error on {}", message.topic);
                channel.set_status(ChannelStatus::Errored).await;
            }
            _ => {}
        }

        channel.trigger(&message.event, &message.payload).await;
    }

    async fn handle_heartbeat_ack(&self, client: &RealtimeInner, message: &RealtimeMessage) {
        let Some(msg_ref) = &message.r#ref else {
            return;
        };

        let mut state = client.state.write().await;
        if state.pending_heartbeat_ref.as_ref() == Some(msg_ref) {
            state.pending_heartbeat_ref = None;
            tracing::debug!("Received heartbeat ack for ref {}", msg_ref);
        }
    }
}
