use crate::infrastructure::{SharedHeaders, build_http_client, check_response, join_url};
use crate::types::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Client for the storage service
#[derive(Debug, Clone)]
pub struct StorageClient {
    url: String,
    headers: SharedHeaders,
    http: reqwest::Client,
}

impl StorageClient {
    pub fn new(url: impl Into<String>, headers: SharedHeaders, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            headers,
            http: build_http_client(timeout)?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &SharedHeaders {
        &self.headers
    }

    pub async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let response = self.get("bucket").send().await?;
        Ok(check_response(response).await?.json().await?)
    }

    pub async fn get_bucket(&self, id: &str) -> Result<Bucket> {
        let response = self.get(&format!("bucket/{}", id)).send().await?;
        Ok(check_response(response).await?.json().await?)
    }

    /// Handle for the objects of one bucket
    pub fn from(&self, bucket_id: &str) -> BucketApi {
        BucketApi {
            client: self.clone(),
            bucket_id: bucket_id.to_string(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(join_url(&self.url, path))
            .headers(self.headers.snapshot())
    }
}

#[derive(Debug, Clone)]
pub struct BucketApi {
    client: StorageClient,
    bucket_id: String,
}

impl BucketApi {
    pub fn bucket_id(&self) -> &str {
        &self.bucket_id
    }

    pub async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&format!("object/{}/{}", self.bucket_id, path.trim_start_matches('/')))
            .send()
            .await?;
        let bytes = check_response(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// URL of an object in a public bucket; no request is made
    pub fn get_public_url(&self, path: &str) -> String {
        join_url(
            &self.client.url,
            &format!("object/public/{}/{}", self.bucket_id, path.trim_start_matches('/')),
        )
    }
}
