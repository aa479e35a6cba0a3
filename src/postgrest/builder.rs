use crate::infrastructure::{SharedHeaders, check_response};
use crate::types::{
    Result,
    constants::headers::{ACCEPT_PROFILE, CONTENT_PROFILE, PREFER},
};
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};
use serde::Serialize;

/// Row count strategy requested through the `Prefer` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMethod {
    Exact,
    Planned,
    Estimated,
}

impl CountMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Planned => "planned",
            Self::Estimated => "estimated",
        }
    }
}

/// Response of an executed query
#[derive(Debug, Clone, PartialEq)]
pub struct PostgrestResponse {
    pub status: u16,
    /// Decoded JSON body, `Null` for empty bodies
    pub data: serde_json::Value,
    /// Total row count from `Content-Range`, when a count was requested
    pub count: Option<u64>,
}

/// A single request against a table, view or function.
///
/// Only the request shape needed by the composed client is provided: verb,
/// column selection, equality filters and a row limit.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    http: reqwest::Client,
    url: String,
    schema: String,
    headers: SharedHeaders,
    method: Method,
    params: Vec<(String, String)>,
    prefer: Vec<String>,
    body: Option<serde_json::Value>,
}

impl QueryBuilder {
    pub(crate) fn new(
        http: reqwest::Client,
        url: String,
        schema: String,
        headers: SharedHeaders,
        method: Method,
    ) -> Self {
        Self {
            http,
            url,
            schema,
            headers,
            method,
            params: Vec::new(),
            prefer: Vec::new(),
            body: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub(crate) fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Columns to return. Keeps the verb of a preceding write, so
    /// `delete().select("id")` still deletes and returns the removed rows.
    pub fn select(mut self, columns: &str) -> Self {
        if self.method == Method::HEAD {
            self.method = Method::GET;
        }
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    pub fn insert<T: Serialize>(self, values: &T) -> Result<Self> {
        self.write(Method::POST, values, &["return=representation"])
    }

    pub fn upsert<T: Serialize>(self, values: &T) -> Result<Self> {
        self.write(
            Method::POST,
            values,
            &["return=representation", "resolution=merge-duplicates"],
        )
    }

    pub fn update<T: Serialize>(self, values: &T) -> Result<Self> {
        self.write(Method::PATCH, values, &["return=representation"])
    }

    pub fn delete(mut self) -> Self {
        self.method = Method::DELETE;
        self.prefer.push("return=representation".to_string());
        self
    }

    fn write<T: Serialize>(mut self, method: Method, values: &T, prefer: &[&str]) -> Result<Self> {
        self.method = method;
        self.body = Some(serde_json::to_value(values)?);
        self.prefer.extend(prefer.iter().map(|p| p.to_string()));
        Ok(self)
    }

    /// Keeps rows where `column` equals `value`
    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.params
            .push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.params.push(("limit".to_string(), count.to_string()));
        self
    }

    pub fn count(mut self, method: CountMethod) -> Self {
        self.prefer.push(format!("count={}", method.as_str()));
        self
    }

    /// Sends the request with the header state current at this moment
    pub async fn execute(self) -> Result<PostgrestResponse> {
        let mut headers = self.headers.snapshot();

        let profile = if self.method == Method::GET || self.method == Method::HEAD {
            ACCEPT_PROFILE
        } else {
            CONTENT_PROFILE
        };
        headers.insert(
            HeaderName::from_bytes(profile.as_bytes())?,
            HeaderValue::from_str(&self.schema)?,
        );
        if !self.prefer.is_empty() {
            headers.insert(
                HeaderName::from_bytes(PREFER.as_bytes())?,
                HeaderValue::from_str(&self.prefer.join(","))?,
            );
        }

        tracing::debug!("{} {}", self.method, self.url);
        let mut request = self
            .http
            .request(self.method, &self.url)
            .headers(headers)
            .query(&self.params);
        if let Some(body) = &self.body {
            request = request.json(body);
        }

        let response = check_response(request.send().await?).await?;
        let status = response.status().as_u16();
        let count = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);

        let text = response.text().await?;
        let data = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        Ok(PostgrestResponse {
            status,
            data,
            count,
        })
    }
}

/// Extracts the total from `Content-Range: 0-24/573`; `*` means unknown
fn parse_content_range_total(range: &str) -> Option<u64> {
    range.rsplit_once('/').and_then(|(_, total)| total.parse().ok())
}
