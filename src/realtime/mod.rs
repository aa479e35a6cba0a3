// Realtime module - Phoenix channel socket used by the composed client
mod channel;
mod client;
mod connection;
mod heartbeat;
mod message;
mod router;

pub use channel::{ChannelStatus, RealtimeChannel, RealtimeChannelOptions};
pub use client::{RealtimeAuth, RealtimeClient, RealtimeClientOptions};
pub use connection::ConnectionState;
pub use message::{ChannelEvent, RealtimeMessage, SystemEvent};
