use crate::infrastructure::{SharedHeaders, build_http_client, check_response, join_url};
use crate::types::{Result, SupabaseError};
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};
use std::collections::HashMap;
use std::time::Duration;

/// Per-call options for [`FunctionsClient::invoke`]
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    pub method: Method,
    pub body: Option<serde_json::Value>,
    /// Extra headers, overriding the client headers of the same name
    pub headers: HashMap<String, String>,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            method: Method::POST,
            body: None,
            headers: HashMap::new(),
        }
    }
}

impl InvokeOptions {
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Client for edge functions
#[derive(Debug, Clone)]
pub struct FunctionsClient {
    url: String,
    headers: SharedHeaders,
    http: reqwest::Client,
}

impl FunctionsClient {
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

    pub fn set_auth(&self, token: &str) -> Result<()> {
        self.headers.set_bearer(token)
    }

    /// Invokes a function and returns the raw response body
    pub async fn invoke(&self, function_name: &str, options: InvokeOptions) -> Result<Vec<u8>> {
        if function_name.trim().is_empty() {
            return Err(SupabaseError::config("function name is required"));
        }

        let mut headers = self.headers.snapshot();
        for (name, value) in &options.headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        let mut request = self
            .http
            .request(options.method, join_url(&self.url, function_name))
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        tracing::debug!("Invoking function {}", function_name);
        let response = check_response(request.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
