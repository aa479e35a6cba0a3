use super::client::RealtimeInner;
use super::message::{ChannelEvent, RealtimeMessage, SystemEvent};
use crate::types::{HEARTBEAT_INTERVAL, PHOENIX_TOPIC};
use std::sync::Weak;
use std::time::Duration;
use tokio::time;

/// Periodic `heartbeat` sender; an unanswered heartbeat closes the connection
pub(crate) struct HeartbeatManager {
    interval: Duration,
    client: Weak<RealtimeInner>,
}

impl HeartbeatManager {
    pub fn new(client: Weak<RealtimeInner>) -> Self {
        Self {
            interval: Duration::from_millis(HEARTBEAT_INTERVAL),
            client,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub async fn run(self) {
        let mut interval_timer = time::interval(self.interval);
        interval_timer.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
        // The first tick completes immediately
        interval_timer.tick().await;

        loop {
            interval_timer.tick().await;

            let Some(client) = self.client.upgrade() else {
                break;
            };
            if !client.connection.is_connected().await {
                continue;
            }

            let timed_out = client.state.read().await.pending_heartbeat_ref.is_some();
            if timed_out {
                tracing::warn!("Heartbeat timeout, closing connection");
                client.state.write().await.pending_heartbeat_ref = None;
                if let Err(e) = client.connection.close().await {
                    tracing::error!("Failed to close connection after heartbeat timeout: {}", e);
                }
                continue;
            }

            let heartbeat_ref = client.make_ref().await;
            let message = RealtimeMessage::new(
                PHOENIX_TOPIC,
                ChannelEvent::System(SystemEvent::Heartbeat),
                serde_json::json!({}),
            )
            .with_ref(heartbeat_ref.clone());

            match client.connection.send_message(message).await {
                Ok(()) => {
                    client.state.write().await.pending_heartbeat_ref = Some(heartbeat_ref.clone());
                    tracing::debug!("Sent heartbeat with ref {}", heartbeat_ref);
                }
                Err(e) => tracing::error!("Failed to send heartbeat: {}", e),
            }
        }
    }
}
