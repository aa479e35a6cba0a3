mod builder;
mod client;

pub use builder::{CountMethod, PostgrestResponse, QueryBuilder};
pub use client::PostgrestClient;
