mod client;
mod types;

pub use client::{AuthClient, Subscription};
pub use types::{AuthChangeEvent, AuthResponse, Session, User};
