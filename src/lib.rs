//! # Supabase Rust
//!
//! An unofficial Rust client for Supabase. One [`Client`] composes the
//! PostgREST, Auth, Storage, Functions and Realtime sub-clients and keeps their
//! credentials in sync: when the auth client signs in, refreshes or signs out,
//! the new bearer token is written to every sub-client and forwarded to the
//! realtime socket.
//!
//! ## Example
//!
//! ```no_run
//! use supabase_rs::create_client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = create_client(
//!         "https://your-project.supabase.co",
//!         "your-anon-key.jwt.signature",
//!         None,
//!     )
//!     .await?;
//!
//!     client
//!         .auth()
//!         .sign_in_with_password("user@example.com", "password")
//!         .await?;
//!
//!     // Runs with the user's token
//!     let todos = client.table("todos").select("*").execute().await?;
//!     println!("{}", todos.data);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod functions;
pub mod infrastructure;
pub mod postgrest;
pub mod realtime;
pub mod storage;
pub mod types;

pub use auth::{AuthChangeEvent, AuthClient, Session, Subscription, User};
pub use client::{Client, ClientOptions, Endpoints, create_client};
pub use config::SupabaseConfig;
pub use functions::{FunctionsClient, InvokeOptions};
pub use infrastructure::SharedHeaders;
pub use postgrest::{CountMethod, PostgrestClient, PostgrestResponse, QueryBuilder};
pub use realtime::{
    RealtimeAuth, RealtimeChannel, RealtimeChannelOptions, RealtimeClient, RealtimeClientOptions,
};
pub use storage::{Bucket, BucketApi, StorageClient};
pub use types::{Result, SupabaseError};
