mod client;

pub use client::{Bucket, BucketApi, StorageClient};
