mod client;

pub use client::{FunctionsClient, InvokeOptions};
